//! Filtered views of the machine state.
//!
//! A search works either on the whole game ([`StateViewFilter::PassThrough`]) or on one factor
//! of it ([`StateViewFilter::Factor`]). In the factored view, moves owned by other factors are
//! hidden, and a role left with nothing to do is given a synthetic [`FilteredMove::PseudoNoop`].

use std::fmt;

use crate::bitset::BitSet;
use crate::factor::Factor;
use crate::network::{CompiledNetwork, LegalMoveInfo, LegalMoveSet, Role};

/// A move offered by a filter.
#[derive(Debug, Copy, Clone)]
pub enum FilteredMove<'a> {
    Legal(&'a LegalMoveInfo),
    /// Stands in for the moves of other factors; it has no effect on this factor's state.
    PseudoNoop,
}

impl<'a> FilteredMove<'a> {
    pub fn info(&self) -> Option<&'a LegalMoveInfo> {
        match *self {
            FilteredMove::Legal(info) => Some(info),
            FilteredMove::PseudoNoop => None,
        }
    }

    pub fn is_pseudo_noop(&self) -> bool {
        matches!(self, FilteredMove::PseudoNoop)
    }
}

impl PartialEq for FilteredMove<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FilteredMove::Legal(a), FilteredMove::Legal(b)) => a.id() == b.id(),
            (FilteredMove::PseudoNoop, FilteredMove::PseudoNoop) => true,
            _ => false,
        }
    }
}

impl Eq for FilteredMove<'_> {}

impl fmt::Display for FilteredMove<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilteredMove::Legal(info) => fmt::Display::fmt(info.get_move(), f),
            FilteredMove::PseudoNoop => write!(f, "<pseudo-noop>"),
        }
    }
}

/// How a search sees the machine state.
#[derive(Debug, Copy, Clone, Default)]
pub enum StateViewFilter<'f> {
    /// The unfiltered game.
    #[default]
    PassThrough,
    /// Only the moves visible in one factor.
    Factor(&'f Factor),
}

impl<'f> From<&'f Factor> for StateViewFilter<'f> {
    fn from(factor: &'f Factor) -> Self {
        StateViewFilter::Factor(factor)
    }
}

impl<'f> StateViewFilter<'f> {
    pub fn factor(&self) -> Option<&'f Factor> {
        match *self {
            StateViewFilter::PassThrough => None,
            StateViewFilter::Factor(factor) => Some(factor),
        }
    }

    /// Terminality as seen through the filter.
    ///
    /// Factors are only coupled through shared state, so both variants defer to the
    /// network's own terminal test.
    pub fn is_filtered_terminal(&self, state: &BitSet, network: &impl CompiledNetwork) -> bool {
        network.is_terminal(state)
    }

    /// Number of choices `role` has in `moves`, as seen through the filter.
    pub fn filtered_move_count(
        &self,
        _state: &BitSet,
        moves: &LegalMoveSet<'_>,
        role: usize,
        include_forced_pseudo_noop: bool,
    ) -> usize {
        match self {
            StateViewFilter::PassThrough => moves.num_choices(role),
            StateViewFilter::Factor(factor) => factor.filtered_moves_size(moves.contents(role), include_forced_pseudo_noop),
        }
    }

    /// Like [`filtered_move_count`](Self::filtered_move_count), looking the role up by name.
    ///
    /// # Panics
    ///
    /// Panics if `role` is not a role of the move set.
    pub fn filtered_move_count_for_role(
        &self,
        state: &BitSet,
        moves: &LegalMoveSet<'_>,
        role: &Role,
        include_forced_pseudo_noop: bool,
    ) -> usize {
        let index = moves
            .role_index(role)
            .unwrap_or_else(|| panic!("Unknown role {}", role));
        self.filtered_move_count(state, moves, index, include_forced_pseudo_noop)
    }

    /// Advance `iter` to the next move visible through the filter.
    ///
    /// The pass-through view returns `None` once `iter` is exhausted; a factor view never
    /// does, falling back to [`FilteredMove::PseudoNoop`].
    pub fn next_filtered_move<'a>(
        &self,
        iter: &mut impl Iterator<Item = &'a LegalMoveInfo>,
    ) -> Option<FilteredMove<'a>> {
        match self {
            StateViewFilter::PassThrough => iter.next().map(FilteredMove::Legal),
            StateViewFilter::Factor(factor) => Some(factor.next_filtered_move(iter)),
        }
    }
}
