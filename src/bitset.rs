//! Fixed-width bit set used for machine states and factor masks.
//!
//! Every bit corresponds to one base proposition of a compiled network, so all sets built
//! for the same network share the same width. Binary operations require equal widths.

use std::fmt;

/// A bit set of fixed width backed by a vector of u64 words.
///
/// Bits beyond `width` are always zero, which keeps [`BitSet::invert`] and equality exact.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    /// Storage: each u64 holds 64 bits
    words: Vec<u64>,
    /// Number of addressable bits
    width: usize,
}

impl BitSet {
    /// Number of bits per word.
    const BITS_PER_WORD: usize = 64;

    /// Creates a new empty bit set with the given width (in bits).
    pub fn new(width: usize) -> Self {
        let num_words = width.div_ceil(Self::BITS_PER_WORD);
        Self {
            words: vec![0; num_words],
            width,
        }
    }

    /// Creates a bit set of the given width with every bit set.
    pub fn full(width: usize) -> Self {
        let mut bs = Self::new(width);
        bs.invert();
        bs
    }

    /// Returns the width in bits.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of set bits.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if no bits are set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns true if every bit in the width is set.
    pub fn is_full(&self) -> bool {
        self.len() == self.width
    }

    /// Gets the word index and bit position for a given bit index.
    #[inline]
    fn word_and_bit(&self, index: usize) -> (usize, usize) {
        assert!(index < self.width, "Bit index {} out of range for width {}", index, self.width);
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    /// Returns true if the bit at the given index is set.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        let (word_idx, bit_idx) = self.word_and_bit(index);
        (self.words[word_idx] & (1u64 << bit_idx)) != 0
    }

    /// Sets the bit at the given index. Returns true if the bit was not previously set.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        let (word_idx, bit_idx) = self.word_and_bit(index);
        let mask = 1u64 << bit_idx;
        let was_clear = (self.words[word_idx] & mask) == 0;
        self.words[word_idx] |= mask;
        was_clear
    }

    /// Clears the bit at the given index. Returns true if the bit was previously set.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        let (word_idx, bit_idx) = self.word_and_bit(index);
        let mask = 1u64 << bit_idx;
        let was_set = (self.words[word_idx] & mask) != 0;
        self.words[word_idx] &= !mask;
        was_set
    }

    /// Clears all bits.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Flips every bit within the width.
    pub fn invert(&mut self) {
        for word in &mut self.words {
            *word = !*word;
        }
        self.clear_tail();
    }

    /// Returns the complement of this set.
    pub fn inverted(&self) -> Self {
        let mut result = self.clone();
        result.invert();
        result
    }

    /// In-place intersection.
    pub fn intersect_with(&mut self, other: &BitSet) {
        self.check_width(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= *b;
        }
    }

    /// In-place union.
    pub fn union_with(&mut self, other: &BitSet) {
        self.check_width(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= *b;
        }
    }

    /// Returns the intersection of two sets.
    pub fn and(&self, other: &BitSet) -> BitSet {
        let mut result = self.clone();
        result.intersect_with(other);
        result
    }

    /// Returns the union of two sets.
    pub fn or(&self, other: &BitSet) -> BitSet {
        let mut result = self.clone();
        result.union_with(other);
        result
    }

    fn check_width(&self, other: &BitSet) {
        assert_eq!(self.width, other.width, "Bit set widths differ");
    }

    /// Zero the unused high bits of the last word.
    fn clear_tail(&mut self) {
        let rem = self.width % Self::BITS_PER_WORD;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }

    /// Extends the bit set by setting all bits from an iterator.
    pub fn extend(&mut self, iter: impl IntoIterator<Item = usize>) {
        for index in iter {
            self.insert(index);
        }
    }

    /// Returns an iterator over all set bit indices.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            bitset: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitSet[{}]", self.width)?;
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Iterator over set bits in a BitSet.
pub struct BitSetIter<'a> {
    bitset: &'a BitSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                return Some(self.word_idx * BitSet::BITS_PER_WORD + bit_idx);
            }

            self.word_idx += 1;
            if self.word_idx >= self.bitset.words.len() {
                return None;
            }
            self.current_word = self.bitset.words[self.word_idx];
        }
    }
}
