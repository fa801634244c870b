use std::cmp::min;
use std::ops::Index;

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    hash: u64,
    next: usize,
}

/// Append-only hash-consing table.
///
/// Values live in a dense vector and are chained into a fixed number of buckets
/// (`2^min(bits, 16)`). Nothing is ever removed: an index handed out by
/// [`Table::find_or_insert_with`] stays valid for the lifetime of the table.
///
/// Index 0 is a sentinel, so a bucket head of 0 means "empty bucket" and a `next` of 0 means
/// "end of chain".
#[derive(Debug, Clone)]
pub struct Table<T> {
    data: Vec<Option<Entry<T>>>,
    buckets: Vec<usize>,
    bitmask: u64,
}

impl<T> Table<T> {
    /// Create a new table with `2^min(bits, 16)` buckets.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Table bits should be in the range 0..=31");

        let buckets_bits = min(bits, 16);
        let buckets_size = 1 << buckets_bits;

        Self {
            data: vec![None], // sentinel
            buckets: vec![0; buckets_size],
            bitmask: (buckets_size - 1) as u64,
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.data.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of buckets.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_index(&self, hash: u64) -> usize {
        (hash & self.bitmask) as usize
    }

    fn entry(&self, index: usize) -> &Entry<T> {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].as_ref().expect("non-sentinel entries are always occupied")
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        &self.entry(index).value
    }

    /// Find the index of a value with the given hash that satisfies `eq`.
    pub fn find(&self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<usize> {
        let mut index = self.buckets[self.bucket_index(hash)];
        while index != 0 {
            let entry = self.entry(index);
            if entry.hash == hash && eq(&entry.value) {
                return Some(index);
            }
            index = entry.next;
        }
        None
    }

    /// Return the index of the value matching `eq`, creating it with `make` if absent.
    ///
    /// `make` receives the index the new value will occupy.
    pub fn find_or_insert_with(&mut self, hash: u64, eq: impl Fn(&T) -> bool, make: impl FnOnce(usize) -> T) -> usize {
        if let Some(index) = self.find(hash, eq) {
            return index;
        }

        let index = self.data.len();
        let bucket = self.bucket_index(hash);
        // Prepend to the chain.
        let next = self.buckets[bucket];
        self.data.push(Some(Entry {
            value: make(index),
            hash,
            next,
        }));
        self.buckets[bucket] = index;
        index
    }

    /// Iterate over all stored values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter().skip(1).flatten().map(|entry| &entry.value)
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table::new(12)
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}
