/// [Szudzik pairing function][szudzik-pairing], wrapping on overflow.
///
/// ```text
/// (a, b) -> if (a<b) then (b^2 + a) else (a^2 + a + b)
/// ```
///
/// For inputs below `2^32` this is a bijection. Larger inputs (nested term hashes) wrap, which
/// keeps the function total at the cost of occasional collisions.
///
/// [szudzik-pairing]: http://szudzik.com/ElegantPairing.pdf
pub fn pairing_szudzik(a: u64, b: u64) -> u64 {
    if a < b {
        b.wrapping_mul(b).wrapping_add(a)
    } else {
        a.wrapping_mul(a).wrapping_add(a).wrapping_add(b)
    }
}

/// [Pairing function][pairing] for two `u64` values.
///
/// [pairing]: https://en.wikipedia.org/wiki/Pairing_function
pub fn pairing2(a: u64, b: u64) -> u64 {
    pairing_szudzik(a, b)
}

/// Pairing function for three `u64` values.
pub fn pairing3(a: u64, b: u64, c: u64) -> u64 {
    pairing2(pairing2(a, b), c)
}

/// Folds a sequence of hashes into one, seeded with the sequence length.
pub fn pairing_seq(items: impl ExactSizeIterator<Item = u64>) -> u64 {
    let len = items.len() as u64;
    items.fold(len, pairing2)
}

/// Structural hash used by the intern tables.
///
/// Unlike [`std::hash::Hash`], this produces the bucket key directly, so equal values must
/// produce equal hashes without going through a `Hasher`.
pub trait StructHash {
    fn struct_hash(&self) -> u64;
}
