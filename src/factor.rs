//! Factors: independent partitions of a game's proposition network.
//!
//! A factor is one block of a partitioning of the base propositions (and the legal moves that
//! drive them) into disjoint sets between which there are no causal links and no coupling
//! through terminal or goal conditions. Each factor can then be searched on its own while
//! still sharing the full machine state.
//!
//! # Lifecycle
//!
//! Factors are built in two phases, enforced by the type system:
//!
//! 1. **Building**: a [`FactorBuilder`] collects propositions and moves with
//!    [`add_all`](FactorBuilder::add_all) and [`add_all_moves`](FactorBuilder::add_all_moves).
//!    Ownership is then recorded on the network (see [`FactorBuilder::claim`]).
//! 2. **Sealed**: [`FactorBuilder::complete`] consumes the builder, computes the state masks
//!    from the network's full base-proposition set, caches the move set, and returns an
//!    immutable [`Factor`] that can be shared between search threads.
//!
//! A sealed factor has no mutating methods, so adding to it fails to compile:
//!
//! ```compile_fail
//! use ggp_factor::factor::FactorBuilder;
//! use ggp_factor::network::PropNet;
//! use ggp_factor::types::{FactorId, PropId};
//!
//! let net = PropNet::new();
//! let factor = FactorBuilder::new(FactorId::new(0)).complete(&net);
//! factor.add_all([PropId::new(0)]);
//! ```
//!
//! and a builder can only be completed once:
//!
//! ```compile_fail
//! use ggp_factor::factor::FactorBuilder;
//! use ggp_factor::network::PropNet;
//! use ggp_factor::types::FactorId;
//!
//! let net = PropNet::new();
//! let builder = FactorBuilder::new(FactorId::new(0));
//! let first = builder.complete(&net);
//! let second = builder.complete(&net);
//! ```
//!
//! # Persistence
//!
//! A factor is saved as `v1~<prop>,<prop>,...~<move>,<move>,...`, where propositions are the
//! rendered base-proposition sentences and moves are
//! [`LegalMoveInfo::to_persistent_string`] encodings. Only the ownership is saved; masks and
//! moves are rebuilt by completing the reloaded builder against the network.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};

use crate::bitset::BitSet;
use crate::error::FactorParseError;
use crate::filter::FilteredMove;
use crate::network::{BaseProposition, CompiledNetwork, LegalMoveInfo, Move, PropNet};
use crate::types::{FactorId, MoveId, PropId};

const VERSION_TAG: &str = "v1";

/// A factor under construction.
#[derive(Debug, Clone)]
pub struct FactorBuilder {
    id: FactorId,
    components: HashSet<PropId>,
    move_infos: HashSet<MoveId>,
    always_include_pseudo_noop: bool,
}

impl FactorBuilder {
    pub fn new(id: FactorId) -> Self {
        Self {
            id,
            components: HashSet::new(),
            move_infos: HashSet::new(),
            always_include_pseudo_noop: false,
        }
    }

    /// Load a factor saved by [`Factor::to_persistent_string`].
    ///
    /// Every proposition and move named in `saved` must match an entry of `props` or
    /// `moves`; if several entries match, the first one is used. The loaded builder must still be claimed and completed before use.
    pub fn from_persistent_string(
        id: FactorId,
        saved: &str,
        props: &[BaseProposition],
        moves: &[LegalMoveInfo],
    ) -> Result<Self, FactorParseError> {
        let rest = saved
            .strip_prefix(VERSION_TAG)
            .and_then(|s| s.strip_prefix('~'))
            .ok_or_else(|| FactorParseError::UnsupportedVersion {
                found: saved.split('~').next().unwrap_or_default().to_string(),
            })?;

        let parts: Vec<&str> = rest.split('~').collect();
        if parts.len() != 2 {
            return Err(FactorParseError::SeparatorCount { count: parts.len() - 1 });
        }

        // On duplicate names the first entry wins.
        let mut by_name: HashMap<&str, PropId> = HashMap::new();
        for p in props {
            by_name.entry(p.name().as_str()).or_insert(p.id());
        }
        let mut by_encoding: HashMap<&str, MoveId> = HashMap::new();
        for m in moves {
            by_encoding.entry(m.to_persistent_string()).or_insert(m.id());
        }

        let mut builder = Self::new(id);
        for name in split_list(parts[0]) {
            let prop = by_name
                .get(name)
                .ok_or_else(|| FactorParseError::UnknownProposition { name: name.to_string() })?;
            builder.components.insert(*prop);
        }
        for encoding in split_list(parts[1]) {
            let mov = by_encoding.get(encoding).ok_or_else(|| FactorParseError::UnknownMove {
                encoding: encoding.to_string(),
            })?;
            builder.move_infos.insert(*mov);
        }

        debug!(
            "loaded factor {}: {} propositions, {} moves",
            id,
            builder.components.len(),
            builder.move_infos.len()
        );
        Ok(builder)
    }

    pub fn id(&self) -> FactorId {
        self.id
    }

    /// Add propositions to the factor. Duplicates are absorbed.
    pub fn add_all(&mut self, props: impl IntoIterator<Item = PropId>) {
        self.components.extend(props);
    }

    /// Add legal moves to the factor. Duplicates are absorbed.
    pub fn add_all_moves(&mut self, moves: impl IntoIterator<Item = MoveId>) {
        self.move_infos.extend(moves);
    }

    /// Absorb another candidate factor into this one.
    pub fn merge(&mut self, other: FactorBuilder) {
        debug!("merging factor {} into {}", other.id, self.id);
        self.components.extend(other.components);
        self.move_infos.extend(other.move_infos);
        self.always_include_pseudo_noop |= other.always_include_pseudo_noop;
    }

    pub fn components(&self) -> &HashSet<PropId> {
        &self.components
    }

    pub fn move_infos(&self) -> &HashSet<MoveId> {
        &self.move_infos
    }

    /// Whether the factor already owns any of the given propositions.
    pub fn contains_any(&self, props: impl IntoIterator<Item = PropId>) -> bool {
        props.into_iter().any(|p| self.components.contains(&p))
    }

    pub fn set_always_include_pseudo_noop(&mut self, include: bool) {
        self.always_include_pseudo_noop = include;
    }

    /// Record this factor as the owner of its propositions and moves on `net`.
    pub fn claim(&self, net: &mut PropNet) {
        net.assign_factor(self.id, self.components.iter().copied(), self.move_infos.iter().copied());
    }

    pub fn to_persistent_string(&self, network: &impl CompiledNetwork) -> String {
        persistent_string(&self.components, &self.move_infos, network)
    }

    /// Log the contents of this factor at debug level.
    pub fn dump(&self, network: &impl CompiledNetwork) {
        dump(self.id, &self.components, &self.move_infos, network);
    }

    /// Seal the factor.
    ///
    /// Builds the factor-specific mask (this factor's propositions) and the general mask
    /// (those plus every proposition owned by no factor) from the owning-factor
    /// back-references on `network`, caches their complements, and derives the move set.
    pub fn complete(self, network: &impl CompiledNetwork) -> Factor {
        let mut specific = network.create_empty_state();
        let mut general = network.create_empty_state();

        for prop in network.base_propositions() {
            match prop.factor() {
                Some(f) if f == self.id => {
                    specific.insert(prop.id().index());
                    general.insert(prop.id().index());
                }
                None => {
                    general.insert(prop.id().index());
                }
                Some(_) => {}
            }
        }

        let unclaimed = self
            .components
            .iter()
            .filter(|&&p| network.base_proposition(p).factor() != Some(self.id))
            .count();
        if unclaimed > 0 {
            warn!(
                "factor {} owns {} propositions not assigned to it on the network",
                self.id, unclaimed
            );
        }

        let inverse_specific = specific.inverted();
        let inverse_general = general.inverted();

        let moves: HashSet<Move> = self
            .move_infos
            .iter()
            .map(|&id| network.move_info(id).get_move().clone())
            .collect();

        debug!(
            "complete factor {}: {} specific bits, {} general bits, {} moves",
            self.id,
            specific.len(),
            general.len(),
            moves.len()
        );

        Factor {
            id: self.id,
            components: self.components,
            move_infos: self.move_infos,
            moves,
            state_mask: general,
            specific_state_mask: specific,
            inverse_state_mask: inverse_general,
            inverse_specific_state_mask: inverse_specific,
            always_include_pseudo_noop: AtomicBool::new(self.always_include_pseudo_noop),
        }
    }
}

/// A sealed factor.
///
/// All data is fixed at [`FactorBuilder::complete`]; only the pseudo-no-op flag can change
/// afterwards, and it is atomic, so a `&Factor` can be shared freely between threads.
#[derive(Debug)]
pub struct Factor {
    id: FactorId,
    components: HashSet<PropId>,
    move_infos: HashSet<MoveId>,
    moves: HashSet<Move>,
    state_mask: BitSet,
    specific_state_mask: BitSet,
    inverse_state_mask: BitSet,
    inverse_specific_state_mask: BitSet,
    always_include_pseudo_noop: AtomicBool,
}

impl Factor {
    pub fn id(&self) -> FactorId {
        self.id
    }

    pub fn components(&self) -> &HashSet<PropId> {
        &self.components
    }

    /// The legal moves that belong to this factor.
    pub fn move_infos(&self) -> &HashSet<MoveId> {
        &self.move_infos
    }

    pub fn moves(&self) -> &HashSet<Move> {
        &self.moves
    }

    /// The state bits relevant to this factor.
    ///
    /// With `specific_only`, only the factor's own propositions; otherwise also the
    /// propositions shared by all factors.
    pub fn state_mask(&self, specific_only: bool) -> &BitSet {
        if specific_only {
            &self.specific_state_mask
        } else {
            &self.state_mask
        }
    }

    /// Complement of [`state_mask`](Self::state_mask).
    pub fn inverse_state_mask(&self, specific_only: bool) -> &BitSet {
        if specific_only {
            &self.inverse_specific_state_mask
        } else {
            &self.inverse_state_mask
        }
    }

    /// Whether filtering should offer a pseudo-no-op even when the role has other moves.
    pub fn always_include_pseudo_noop(&self) -> bool {
        self.always_include_pseudo_noop.load(Ordering::Relaxed)
    }

    pub fn set_always_include_pseudo_noop(&self, include: bool) {
        self.always_include_pseudo_noop.store(include, Ordering::Relaxed);
    }

    /// Whether a move is visible in this factor: owned by it, or not factored at all.
    pub fn is_visible(&self, info: &LegalMoveInfo) -> bool {
        match info.factor() {
            None => true,
            Some(f) => f == self.id,
        }
    }

    /// Number of moves visible in this factor, counting a pseudo-no-op where one is due.
    ///
    /// A pseudo-no-op is counted when no move is visible, or when `include_forced_pseudo_noop`
    /// is requested, the always-include flag is set, and none of the visible moves is already
    /// no-op-like (no input proposition, or unfactored).
    pub fn filtered_moves_size<'a>(
        &self,
        moves: impl IntoIterator<Item = &'a LegalMoveInfo>,
        include_forced_pseudo_noop: bool,
    ) -> usize {
        let mut count = 0;
        let mut noop_found = false;
        for info in moves {
            if self.is_visible(info) {
                count += 1;
                if info.input().is_none() || info.factor().is_none() {
                    noop_found = true;
                }
            }
        }

        if count == 0 || (include_forced_pseudo_noop && !noop_found && self.always_include_pseudo_noop()) {
            count += 1;
        }
        count
    }

    /// Advance `iter` to the next move visible in this factor.
    ///
    /// Once the iterator is exhausted the remaining choice must be the forced no-op, so
    /// [`FilteredMove::PseudoNoop`] is returned.
    pub fn next_filtered_move<'a>(&self, iter: &mut impl Iterator<Item = &'a LegalMoveInfo>) -> FilteredMove<'a> {
        iter.find(|info| self.is_visible(info))
            .map_or(FilteredMove::PseudoNoop, FilteredMove::Legal)
    }

    pub fn to_persistent_string(&self, network: &impl CompiledNetwork) -> String {
        persistent_string(&self.components, &self.move_infos, network)
    }

    /// Log the contents of this factor at debug level.
    pub fn dump(&self, network: &impl CompiledNetwork) {
        dump(self.id, &self.components, &self.move_infos, network);
    }
}

/// Factors are equal when their ids are. Ids are only unique within one
/// [`FactorRegistry`](crate::registry::FactorRegistry), so factors from different registries
/// (or different networks) must not be compared.
impl PartialEq for Factor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Factor {}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    // An empty segment is an empty list, not one empty name.
    list.split(',').filter(move |_| !list.is_empty())
}

fn sorted<T: Copy + Ord>(set: &HashSet<T>) -> Vec<T> {
    let mut items: Vec<T> = set.iter().copied().collect();
    items.sort_unstable();
    items
}

fn persistent_string(components: &HashSet<PropId>, move_infos: &HashSet<MoveId>, network: &impl CompiledNetwork) -> String {
    let props: Vec<&str> = sorted(components)
        .into_iter()
        .map(|p| network.base_proposition(p).name().as_str())
        .collect();
    let moves: Vec<&str> = sorted(move_infos)
        .into_iter()
        .map(|m| network.move_info(m).to_persistent_string())
        .collect();
    format!("{}~{}~{}", VERSION_TAG, props.join(","), moves.join(","))
}

fn dump(id: FactorId, components: &HashSet<PropId>, move_infos: &HashSet<MoveId>, network: &impl CompiledNetwork) {
    debug!("Factor {} base props:", id);
    for p in sorted(components) {
        debug!("  {}", network.base_proposition(p).name());
    }
    debug!("Factor {} moves:", id);
    for m in sorted(move_infos) {
        debug!("  {}", network.move_info(m).get_move());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::TermPool;
    use crate::registry::FactorRegistry;
    use crate::signal::Signal;

    use test_log::test;

    /// Two independent light switches `a` and `b`, toggled by one player, plus a shared
    /// `step` counter. Terminal when both lights are on.
    struct Switches {
        net: PropNet,
        on_a: PropId,
        on_b: PropId,
        step: PropId,
        toggle_a: MoveId,
        toggle_b: MoveId,
        noop: MoveId,
    }

    fn switches(pool: &TermPool) -> Switches {
        let mut net = PropNet::new();
        let player = net.add_role(pool.atom("player"));
        let on_a = net.add_base(pool.ground_sentence("on", &["a"]));
        let on_b = net.add_base(pool.ground_sentence("on", &["b"]));
        let step = net.add_base(pool.ground_sentence("step", &["1"]));
        let both = net.circuit_mut().and(on_a.into(), on_b.into());
        net.set_terminal(both);

        let toggle = |x: &str| Move::new(pool.compound(pool.atom("toggle"), [pool.atom(x).into()]));
        let does = |x: &str| {
            let mv = pool.compound(pool.atom("toggle"), [pool.atom(x).into()]);
            let body = [pool.atom("player").into(), mv];
            Some(pool.relation(&pool.atom("does"), &body))
        };
        let toggle_a = net.add_move(player, toggle("a"), does("a"), Signal::one());
        let toggle_b = net.add_move(player, toggle("b"), does("b"), Signal::one());
        let noop = net.add_move(player, Move::new(pool.atom("noop").into()), None, Signal::one());

        Switches {
            net,
            on_a,
            on_b,
            step,
            toggle_a,
            toggle_b,
            noop,
        }
    }

    fn factor_pair(s: &mut Switches) -> (Factor, Factor) {
        let mut fa = FactorBuilder::new(FactorId::new(0));
        fa.add_all([s.on_a]);
        fa.add_all_moves([s.toggle_a]);
        let mut fb = FactorBuilder::new(FactorId::new(1));
        fb.add_all([s.on_b]);
        fb.add_all_moves([s.toggle_b]);
        fa.claim(&mut s.net);
        fb.claim(&mut s.net);
        (fa.complete(&s.net), fb.complete(&s.net))
    }

    #[test]
    fn test_builder_set_semantics() {
        let mut b = FactorBuilder::new(FactorId::new(3));
        b.add_all([PropId::new(1), PropId::new(2), PropId::new(1)]);
        b.add_all_moves([MoveId::new(0), MoveId::new(0)]);
        assert_eq!(b.components().len(), 2);
        assert_eq!(b.move_infos().len(), 1);
        assert!(b.contains_any([PropId::new(5), PropId::new(2)]));
        assert!(!b.contains_any([PropId::new(5)]));
        assert!(!b.contains_any(std::iter::empty()));
    }

    #[test]
    fn test_merge() {
        let mut a = FactorBuilder::new(FactorId::new(0));
        a.add_all([PropId::new(0)]);
        let mut b = FactorBuilder::new(FactorId::new(1));
        b.add_all([PropId::new(1)]);
        b.add_all_moves([MoveId::new(4)]);
        b.set_always_include_pseudo_noop(true);
        a.merge(b);
        assert_eq!(a.id(), FactorId::new(0));
        assert!(a.contains_any([PropId::new(1)]));
        assert!(a.move_infos().contains(&MoveId::new(4)));
        assert!(a.always_include_pseudo_noop);
    }

    #[test]
    fn test_masks() {
        let pool = TermPool::default();
        let mut s = switches(&pool);
        let (fa, fb) = factor_pair(&mut s);

        let bits = |m: &BitSet| m.iter().collect::<Vec<_>>();
        assert_eq!(bits(fa.state_mask(true)), vec![s.on_a.index()]);
        assert_eq!(bits(fa.state_mask(false)), vec![s.on_a.index(), s.step.index()]);
        assert_eq!(bits(fb.state_mask(true)), vec![s.on_b.index()]);
        assert_eq!(bits(fb.state_mask(false)), vec![s.on_b.index(), s.step.index()]);
        assert_eq!(bits(fa.inverse_state_mask(true)), vec![s.on_b.index(), s.step.index()]);
        assert_eq!(bits(fa.inverse_state_mask(false)), vec![s.on_b.index()]);
    }

    #[test]
    fn test_mask_complement_law() {
        let pool = TermPool::default();
        let mut s = switches(&pool);
        let (fa, fb) = factor_pair(&mut s);
        for f in [&fa, &fb] {
            for specific in [true, false] {
                let mask = f.state_mask(specific);
                let inv = f.inverse_state_mask(specific);
                assert!(mask.and(inv).is_empty());
                assert!(mask.or(inv).is_full());
                assert_eq!(mask.width(), s.net.num_bases());
            }
        }
    }

    #[test]
    fn test_moves_derived_on_complete() {
        let pool = TermPool::default();
        let mut s = switches(&pool);
        let (fa, _) = factor_pair(&mut s);
        assert_eq!(fa.move_infos().len(), 1);
        assert!(fa.move_infos().contains(&s.toggle_a));
        let expected = s.net.move_info(s.toggle_a).get_move().clone();
        assert_eq!(fa.moves().len(), 1);
        assert!(fa.moves().contains(&expected));
    }

    #[test]
    fn test_unassigned_factor_has_only_shared_bits() {
        // Building without claiming: the network never names this factor.
        let pool = TermPool::default();
        let s = switches(&pool);
        let mut b = FactorBuilder::new(FactorId::new(9));
        b.add_all([s.on_a]);
        let f = b.complete(&s.net);
        assert!(f.state_mask(true).is_empty());
        assert!(f.state_mask(false).is_full());
    }

    #[test]
    fn test_filtered_moves_size() {
        let pool = TermPool::default();
        let mut s = switches(&pool);
        let (fa, _) = factor_pair(&mut s);
        let state = s.net.create_empty_state();
        let legal = s.net.legal_moves(&state);

        // toggle_a (own) + noop (unfactored); toggle_b hidden.
        assert_eq!(fa.filtered_moves_size(legal.contents(0), false), 2);
        // noop already offers a no-op-like move, so no forced extra.
        fa.set_always_include_pseudo_noop(true);
        assert_eq!(fa.filtered_moves_size(legal.contents(0), true), 2);
    }

    #[test]
    fn test_forced_pseudo_noop_when_no_noop_like_move() {
        let pool = TermPool::default();
        let mut s = switches(&pool);
        let (fa, _) = factor_pair(&mut s);
        let infos = [s.net.move_info(s.toggle_a), s.net.move_info(s.toggle_b)];

        assert_eq!(fa.filtered_moves_size(infos, true), 1);
        fa.set_always_include_pseudo_noop(true);
        assert_eq!(fa.filtered_moves_size(infos, false), 1);
        assert_eq!(fa.filtered_moves_size(infos, true), 2);
    }

    #[test]
    fn test_pseudo_noop_when_all_moves_foreign() {
        let pool = TermPool::default();
        let mut s = switches(&pool);
        let (fa, _) = factor_pair(&mut s);
        fa.set_always_include_pseudo_noop(true);
        let only_b = [s.net.move_info(s.toggle_b)];

        assert_eq!(fa.filtered_moves_size(only_b, true), 1);
        let mut iter = only_b.into_iter();
        assert_eq!(fa.next_filtered_move(&mut iter), FilteredMove::PseudoNoop);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_next_filtered_move_skips_foreign() {
        let pool = TermPool::default();
        let mut s = switches(&pool);
        let (fa, fb) = factor_pair(&mut s);
        let state = s.net.create_empty_state();
        let legal = s.net.legal_moves(&state);

        let mut iter = legal.contents(0);
        let first = fb.next_filtered_move(&mut iter);
        assert_eq!(first.info().map(|i| i.id()), Some(s.toggle_b));
        let second = fb.next_filtered_move(&mut iter);
        assert_eq!(second.info().map(|i| i.id()), Some(s.noop));
        assert_eq!(fb.next_filtered_move(&mut iter), FilteredMove::PseudoNoop);

        let mut iter = legal.contents(0);
        assert_eq!(fa.next_filtered_move(&mut iter).info().map(|i| i.id()), Some(s.toggle_a));
    }

    #[test]
    fn test_persistent_string_format() {
        let pool = TermPool::default();
        let mut s = switches(&pool);
        let mut b = FactorBuilder::new(FactorId::new(0));
        b.add_all([s.step, s.on_a]);
        b.add_all_moves([s.noop, s.toggle_a]);
        b.claim(&mut s.net);
        let saved = b.to_persistent_string(&s.net);
        assert_eq!(saved, "v1~( on a ),( step 1 )~player:( toggle a ),player:noop");
        assert_eq!(b.complete(&s.net).to_persistent_string(&s.net), saved);
    }

    #[test]
    fn test_persistence_roundtrip() {
        let pool = TermPool::default();
        let mut s = switches(&pool);
        let (fa, _) = factor_pair(&mut s);
        let saved = fa.to_persistent_string(&s.net);

        // Reload into a fresh session: clear ownership, parse, claim, complete.
        s.net.clear_factors();
        let reloaded = FactorBuilder::from_persistent_string(
            FactorId::new(0),
            &saved,
            s.net.base_propositions(),
            s.net.move_infos(),
        )
        .unwrap();
        assert_eq!(reloaded.components(), fa.components());
        assert_eq!(reloaded.move_infos(), fa.move_infos());
        reloaded.claim(&mut s.net);
        // Factor b's propositions were forgotten too; reclaim them.
        s.net.assign_factor(FactorId::new(1), [s.on_b], [s.toggle_b]);
        let fa2 = reloaded.complete(&s.net);

        for specific in [true, false] {
            assert_eq!(fa2.state_mask(specific), fa.state_mask(specific));
            assert_eq!(fa2.inverse_state_mask(specific), fa.inverse_state_mask(specific));
        }
        assert_eq!(fa2.moves(), fa.moves());
    }

    #[test]
    fn test_parse_rejects_wrong_version() {
        let pool = TermPool::default();
        let s = switches(&pool);
        let err = FactorBuilder::from_persistent_string(
            FactorId::new(0),
            "v2~( on a )~player:noop",
            s.net.base_propositions(),
            s.net.move_infos(),
        )
        .unwrap_err();
        assert_eq!(err, FactorParseError::UnsupportedVersion { found: "v2".to_string() });

        let err = FactorBuilder::from_persistent_string(FactorId::new(0), "v2~A~m1", &[], &[]).unwrap_err();
        assert!(matches!(err, FactorParseError::UnsupportedVersion { .. }));
        let err = FactorBuilder::from_persistent_string(FactorId::new(0), "v1", &[], &[]).unwrap_err();
        assert!(matches!(err, FactorParseError::UnsupportedVersion { .. }));
    }

    #[test]
    fn test_parse_rejects_separator_count() {
        let err = FactorBuilder::from_persistent_string(FactorId::new(0), "v1~A", &[], &[]).unwrap_err();
        assert_eq!(err, FactorParseError::SeparatorCount { count: 0 });
        let err = FactorBuilder::from_persistent_string(FactorId::new(0), "v1~A~b~c", &[], &[]).unwrap_err();
        assert_eq!(err, FactorParseError::SeparatorCount { count: 2 });
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        let pool = TermPool::default();
        let s = switches(&pool);
        let props = s.net.base_propositions();
        let moves = s.net.move_infos();

        let err = FactorBuilder::from_persistent_string(FactorId::new(0), "v1~( on c )~player:noop", props, moves)
            .unwrap_err();
        assert_eq!(err, FactorParseError::UnknownProposition { name: "( on c )".to_string() });

        let err = FactorBuilder::from_persistent_string(FactorId::new(0), "v1~( on a )~robot:noop", props, moves)
            .unwrap_err();
        assert_eq!(err, FactorParseError::UnknownMove { encoding: "robot:noop".to_string() });

        // A stray comma is an empty (unknown) name.
        let err = FactorBuilder::from_persistent_string(FactorId::new(0), "v1~( on a ),~", props, moves)
            .unwrap_err();
        assert_eq!(err, FactorParseError::UnknownProposition { name: String::new() });
    }

    #[test]
    fn test_empty_lists_roundtrip() {
        let pool = TermPool::default();
        let s = switches(&pool);
        let b = FactorBuilder::new(FactorId::new(0));
        let saved = b.to_persistent_string(&s.net);
        assert_eq!(saved, "v1~~");
        let loaded =
            FactorBuilder::from_persistent_string(FactorId::new(0), &saved, s.net.base_propositions(), s.net.move_infos())
                .unwrap();
        assert!(loaded.components().is_empty());
        assert!(loaded.move_infos().is_empty());
    }

    #[test]
    fn test_factor_identity() {
        let pool = TermPool::default();
        let mut s = switches(&pool);
        let (fa, fb) = factor_pair(&mut s);
        assert_eq!(fa, fa);
        assert_ne!(fa, fb);
    }

    #[test]
    fn test_sealed_factor_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<Factor>();

        let pool = TermPool::default();
        let mut s = switches(&pool);
        let (fa, _) = factor_pair(&mut s);
        let expected = fa.state_mask(false).clone();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    assert_eq!(fa.state_mask(false), &expected);
                    assert!(fa.state_mask(true).contains(s.on_a.index()));
                });
            }
        });
    }

    #[test]
    #[should_panic(expected = "clashes with the factor format")]
    fn test_proposition_name_with_separator_rejected() {
        // "( cell a,b )" would be split into "( cell a" and "b )" on reload.
        let pool = TermPool::default();
        let mut net = PropNet::new();
        net.add_base(pool.ground_sentence("cell", &["a,b"]));
    }

    #[test]
    #[should_panic(expected = "clashes with the factor format")]
    fn test_move_encoding_with_separator_rejected() {
        let pool = TermPool::default();
        let mut net = PropNet::new();
        let robot = net.add_role(pool.atom("robot"));
        net.add_move(robot, Move::new(pool.atom("go~left").into()), None, Signal::one());
    }

    #[test]
    fn test_saved_names_survive_reload() {
        // Every name the network accepts must come back from its own save.
        let pool = TermPool::default();
        let mut net = PropNet::new();
        let robot = net.add_role(pool.atom("robot"));
        let cell = net.add_base(pool.ground_sentence("cell", &["a", "b"]));
        let nested = pool.compound(pool.atom("f"), [pool.atom("x").into()]);
        let other = net.add_base(pool.relation(&pool.atom("holds"), &[nested]));
        let go = net.add_move(robot, Move::new(pool.atom("go").into()), None, Signal::one());

        let mut b = FactorBuilder::new(FactorId::new(0));
        b.add_all([cell, other]);
        b.add_all_moves([go]);
        b.claim(&mut net);
        let saved = b.to_persistent_string(&net);
        assert_eq!(saved, "v1~( cell a b ),( holds ( f x ) )~robot:go");

        let loaded =
            FactorBuilder::from_persistent_string(FactorId::new(0), &saved, net.base_propositions(), net.move_infos())
                .unwrap();
        assert_eq!(loaded.components(), b.components());
        assert_eq!(loaded.move_infos(), b.move_infos());
    }

    #[test]
    fn test_parse_resolves_duplicates_to_first_entry() {
        let pool = TermPool::default();
        let s = switches(&pool);

        // A second network listing the same names in a different order.
        let mut other = PropNet::new();
        other.add_role(pool.atom("player"));
        other.add_base(pool.ground_sentence("step", &["1"]));
        other.add_move(0, Move::new(pool.atom("noop").into()), None, Signal::one());

        let props: Vec<BaseProposition> = s.net.base_propositions().iter().chain(other.base_propositions()).cloned().collect();
        let moves: Vec<LegalMoveInfo> = s.net.move_infos().iter().chain(other.move_infos()).cloned().collect();
        let loaded = FactorBuilder::from_persistent_string(FactorId::new(0), "v1~( step 1 )~player:noop", &props, &moves)
            .unwrap();
        assert_eq!(loaded.components().iter().copied().collect::<Vec<_>>(), vec![s.step]);
        assert_eq!(loaded.move_infos().iter().copied().collect::<Vec<_>>(), vec![s.noop]);

        let props: Vec<BaseProposition> = other.base_propositions().iter().chain(s.net.base_propositions()).cloned().collect();
        let loaded = FactorBuilder::from_persistent_string(FactorId::new(0), "v1~( step 1 )~", &props, &[]).unwrap();
        assert_eq!(loaded.components().iter().copied().collect::<Vec<_>>(), vec![PropId::new(0)]);
    }

    #[test]
    fn test_missing_separator_message() {
        let err = FactorBuilder::from_persistent_string(FactorId::new(0), "v1", &[], &[]).unwrap_err();
        assert_eq!(err.to_string(), "Expected `v1~` prefix, found `v1`");
        let err = FactorBuilder::from_persistent_string(FactorId::new(0), "v2~A~m1", &[], &[]).unwrap_err();
        assert_eq!(err.to_string(), "Expected `v1~` prefix, found `v2`");
    }

    #[test]
    fn test_identity_is_per_registry() {
        // Two registries both start at id 0; their factors are only comparable within one.
        let pool = TermPool::default();
        let mut s = switches(&pool);
        let mut first = FactorRegistry::new();
        let mut second = FactorRegistry::new();
        let mut a = first.new_factor();
        a.add_all([s.on_a]);
        a.claim(&mut s.net);
        let a = a.complete(&s.net);
        let elsewhere = switches(&pool);
        let b = second.new_factor().complete(&elsewhere.net);
        assert_eq!(a.id(), b.id());
        assert_eq!(a, b);
        assert_ne!(a.state_mask(true), b.state_mask(true));
    }
}
