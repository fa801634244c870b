use std::fmt::{Debug, Display, Formatter};
use std::ops::Not;

use crate::types::PropId;

/// A (possibly negated) wire in a proposition network.
///
/// A signal is a constant, a base proposition (a state bit) or the output of a gate. The
/// lowest bit is the negation flag, so `!s` is a single xor.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Signal(u32);

const BASE: u32 = 1 << 31; // 0x8000_0000

// Constructors
impl Signal {
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn one() -> Self {
        Self(1)
    }

    /// The state bit of a base proposition.
    pub const fn from_base(prop: PropId) -> Self {
        assert!((prop.index() as u32) < (BASE >> 1), "Proposition index too large for a signal");
        Self(BASE | ((prop.index() as u32) << 1))
    }

    /// The output of gate `gate` (0-indexed).
    pub const fn from_gate(gate: u32) -> Self {
        // Note: index 0 is reserved for constants.
        assert!(gate + 1 < (BASE >> 1), "Gate index too large for a signal");
        Self((gate + 1) << 1)
    }
}

// Getters
impl Signal {
    const fn index(&self) -> u32 {
        (self.0 & !BASE) >> 1
    }

    pub const fn base(&self) -> PropId {
        assert!(self.is_base());
        PropId::new(self.index())
    }

    pub const fn gate(&self) -> u32 {
        assert!(self.is_gate());
        self.index() - 1
    }
}

// Checks
impl Signal {
    pub const fn is_base(&self) -> bool {
        self.0 & BASE != 0
    }

    pub const fn is_const(&self) -> bool {
        !self.is_base() && self.index() == 0
    }

    pub const fn is_gate(&self) -> bool {
        !self.is_base() && !self.is_const()
    }

    pub const fn is_negated(&self) -> bool {
        // True for complement and for constant one.
        self.0 & 1 != 0
    }
}

impl From<bool> for Signal {
    fn from(b: bool) -> Self {
        if b {
            Self::one()
        } else {
            Self::zero()
        }
    }
}

impl From<PropId> for Signal {
    fn from(prop: PropId) -> Self {
        Self::from_base(prop)
    }
}

impl Not for Signal {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self(self.0 ^ 1)
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_const() {
            write!(f, "{}", self.0 & 1)
        } else {
            if self.is_negated() {
                write!(f, "!")?;
            }
            if self.is_base() {
                write!(f, "{}", self.base())
            } else {
                write!(f, "g{}", self.gate())
            }
        }
    }
}

impl Debug for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
