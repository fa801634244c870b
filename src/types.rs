//! Type-safe handles for network entities.
//!
//! Base propositions, legal moves, roles and factors are all referred to by small integer
//! handles. The newtypes keep the index spaces apart so a move index can never be used
//! as a state bit.
use std::fmt;

/// A base proposition handle (0-indexed).
///
/// The index doubles as the proposition's bit position in every [`BitSet`](crate::bitset::BitSet)
/// state of the owning network.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PropId(u32);

impl PropId {
    pub const fn new(index: u32) -> Self {
        PropId(index)
    }

    /// Returns the bit index of this proposition.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// A legal move handle (0-indexed into the network's master move list).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MoveId(u32);

impl MoveId {
    pub const fn new(index: u32) -> Self {
        MoveId(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// A factor identifier.
///
/// Factors compare by identity: two factors are the same factor iff their ids are equal.
/// Ids are handed out by [`FactorRegistry`](crate::registry::FactorRegistry) and stored on
/// propositions and moves as a non-owning back-reference. Each registry counts from zero, so
/// an id only identifies a factor within its own registry.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FactorId(u32);

impl FactorId {
    pub const fn new(id: u32) -> Self {
        FactorId(id)
    }

    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FactorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}
