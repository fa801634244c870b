//! The compiled proposition network as seen by the factor layer.
//!
//! Compilation and optimisation of the rules into a network happen elsewhere. This module
//! defines what the factor layer consumes: the [`CompiledNetwork`] trait, the per-proposition
//! and per-move cross-reference records that carry the owning-factor back-reference, and the
//! [`LegalMoveSet`] produced for a state.
//!
//! [`PropNet`] is a plain in-memory implementation built from a [`Circuit`]; it is what the
//! tests and demos use, and a convenient target for a real compiler.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::bitset::BitSet;
use crate::gate::Circuit;
use crate::sentence::Sentence;
use crate::signal::Signal;
use crate::term::{Atom, Term};
use crate::types::{FactorId, MoveId, PropId};

/// A player in the game.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Role(Atom);

impl Role {
    pub fn new(name: Atom) -> Self {
        Role(name)
    }

    pub fn name(&self) -> &Atom {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A move as submitted by a player, e.g. `( mark 1 1 )` or `noop`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Move(Term);

impl Move {
    pub fn new(term: Term) -> Self {
        Move(term)
    }

    pub fn term(&self) -> &Term {
        &self.0
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Cross-reference record for one base proposition.
#[derive(Debug, Clone)]
pub struct BaseProposition {
    id: PropId,
    name: Sentence,
    factor: Option<FactorId>,
}

impl BaseProposition {
    pub fn id(&self) -> PropId {
        self.id
    }

    pub fn name(&self) -> &Sentence {
        &self.name
    }

    /// The factor that owns this proposition; `None` if it is shared by all factors.
    pub fn factor(&self) -> Option<FactorId> {
        self.factor
    }
}

/// Cross-reference record for one legal move.
#[derive(Debug, Clone)]
pub struct LegalMoveInfo {
    id: MoveId,
    role: usize,
    mov: Move,
    factor: Option<FactorId>,
    input: Option<Sentence>,
    legal: Signal,
    persistent: String,
}

impl LegalMoveInfo {
    pub fn id(&self) -> MoveId {
        self.id
    }

    /// Index of the role making this move.
    pub fn role(&self) -> usize {
        self.role
    }

    pub fn get_move(&self) -> &Move {
        &self.mov
    }

    /// The factor that owns this move; `None` if unfactored.
    pub fn factor(&self) -> Option<FactorId> {
        self.factor
    }

    /// The `does` proposition fed by this move. `None` marks a no-op-like move.
    pub fn input(&self) -> Option<&Sentence> {
        self.input.as_ref()
    }

    /// Legality condition.
    pub fn legal(&self) -> Signal {
        self.legal
    }

    /// Stable textual encoding, `<role>:<move>`, used when persisting factors.
    pub fn to_persistent_string(&self) -> &str {
        &self.persistent
    }
}

/// The legal moves of every role in one state.
#[derive(Debug, Clone)]
pub struct LegalMoveSet<'n> {
    infos: &'n [LegalMoveInfo],
    roles: &'n [Role],
    choices: Vec<Vec<MoveId>>,
}

impl<'n> LegalMoveSet<'n> {
    pub fn new(infos: &'n [LegalMoveInfo], roles: &'n [Role]) -> Self {
        Self {
            infos,
            roles,
            choices: vec![Vec::new(); roles.len()],
        }
    }

    /// Record `id` as legal for its role.
    pub fn add(&mut self, id: MoveId) {
        let info = &self.infos[id.index()];
        self.choices[info.role()].push(id);
    }

    pub fn num_roles(&self) -> usize {
        self.roles.len()
    }

    pub fn role_index(&self, role: &Role) -> Option<usize> {
        self.roles.iter().position(|r| r == role)
    }

    pub fn num_choices(&self, role: usize) -> usize {
        self.choices[role].len()
    }

    /// The legal moves of `role`, in the order they were added.
    pub fn contents(&self, role: usize) -> impl ExactSizeIterator<Item = &'n LegalMoveInfo> + '_ {
        let infos = self.infos;
        self.choices[role].iter().map(move |id| &infos[id.index()])
    }
}

/// What the factor layer needs from a compiled network.
pub trait CompiledNetwork {
    fn roles(&self) -> &[Role];

    /// Every base proposition, indexed by [`PropId`].
    fn base_propositions(&self) -> &[BaseProposition];

    /// Every legal-move record, indexed by [`MoveId`].
    fn move_infos(&self) -> &[LegalMoveInfo];

    fn is_terminal(&self, state: &BitSet) -> bool;

    fn legal_moves(&self, state: &BitSet) -> LegalMoveSet<'_>;

    /// An all-false state sized to the network's state space.
    fn create_empty_state(&self) -> BitSet {
        BitSet::new(self.base_propositions().len())
    }

    fn base_proposition(&self, id: PropId) -> &BaseProposition {
        &self.base_propositions()[id.index()]
    }

    fn move_info(&self, id: MoveId) -> &LegalMoveInfo {
        &self.move_infos()[id.index()]
    }
}

/// In-memory proposition network.
#[derive(Debug, Clone)]
pub struct PropNet {
    roles: Vec<Role>,
    bases: Vec<BaseProposition>,
    by_name: HashMap<Sentence, PropId>,
    moves: Vec<LegalMoveInfo>,
    circuit: Circuit,
    terminal: Signal,
}

impl Default for PropNet {
    fn default() -> Self {
        Self::new()
    }
}

impl PropNet {
    pub fn new() -> Self {
        Self {
            roles: Vec::new(),
            bases: Vec::new(),
            by_name: HashMap::new(),
            moves: Vec::new(),
            circuit: Circuit::new(),
            terminal: Signal::zero(),
        }
    }

    pub fn num_bases(&self) -> usize {
        self.bases.len()
    }

    pub fn num_moves(&self) -> usize {
        self.moves.len()
    }

    pub fn add_role(&mut self, name: Atom) -> usize {
        self.roles.push(Role::new(name));
        self.roles.len() - 1
    }

    /// Add a base proposition. Adding an existing name returns the existing id.
    ///
    /// # Panics
    ///
    /// Panics if the rendered name contains `,` or `~`, which the saved factor format
    /// reserves as separators.
    pub fn add_base(&mut self, name: Sentence) -> PropId {
        if let Some(&id) = self.by_name.get(&name) {
            return id;
        }
        assert_persistable("Proposition", name.as_str());
        let id = PropId::new(self.bases.len() as u32);
        debug!("add_base: {} = {}", id, name);
        self.by_name.insert(name.clone(), id);
        self.bases.push(BaseProposition { id, name, factor: None });
        id
    }

    /// Add a legal move for `role`, legal whenever `legal` holds.
    ///
    /// # Panics
    ///
    /// Panics if `role` is out of range, or if the move encoding `<role>:<move>` contains
    /// `,` or `~`.
    pub fn add_move(&mut self, role: usize, mov: Move, input: Option<Sentence>, legal: Signal) -> MoveId {
        assert!(role < self.roles.len(), "Unknown role index {}", role);
        let id = MoveId::new(self.moves.len() as u32);
        let persistent = format!("{}:{}", self.roles[role], mov);
        assert_persistable("Move encoding", &persistent);
        debug!("add_move: {} = {}", id, persistent);
        self.moves.push(LegalMoveInfo {
            id,
            role,
            mov,
            factor: None,
            input,
            legal,
            persistent,
        });
        id
    }

    pub fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }

    pub fn set_terminal(&mut self, terminal: Signal) {
        self.terminal = terminal;
    }

    pub fn base_proposition_by_name(&self, name: &Sentence) -> Option<&BaseProposition> {
        self.by_name.get(name).map(|id| &self.bases[id.index()])
    }

    /// Record `factor` as the owner of the given propositions and moves.
    ///
    /// This is the output contract of factor analysis: after all factors are assigned,
    /// every proposition and move not claimed by any factor is shared.
    pub fn assign_factor(
        &mut self,
        factor: FactorId,
        props: impl IntoIterator<Item = PropId>,
        moves: impl IntoIterator<Item = MoveId>,
    ) {
        for p in props {
            self.bases[p.index()].factor = Some(factor);
        }
        for m in moves {
            self.moves[m.index()].factor = Some(factor);
        }
    }

    /// Forget every factor assignment.
    pub fn clear_factors(&mut self) {
        for b in &mut self.bases {
            b.factor = None;
        }
        for m in &mut self.moves {
            m.factor = None;
        }
    }

    /// Build a state with the given propositions true.
    pub fn state_of(&self, props: impl IntoIterator<Item = PropId>) -> BitSet {
        let mut state = self.create_empty_state();
        state.extend(props.into_iter().map(PropId::index));
        state
    }
}

fn assert_persistable(what: &str, text: &str) {
    assert!(
        !text.contains(&[',', '~'][..]),
        "{} {:?} clashes with the factor format",
        what,
        text
    );
}

impl CompiledNetwork for PropNet {
    fn roles(&self) -> &[Role] {
        &self.roles
    }

    fn base_propositions(&self) -> &[BaseProposition] {
        &self.bases
    }

    fn move_infos(&self) -> &[LegalMoveInfo] {
        &self.moves
    }

    fn is_terminal(&self, state: &BitSet) -> bool {
        self.circuit.eval(self.terminal, state)
    }

    fn legal_moves(&self, state: &BitSet) -> LegalMoveSet<'_> {
        let mut set = LegalMoveSet::new(&self.moves, &self.roles);
        for info in &self.moves {
            if self.circuit.eval(info.legal, state) {
                set.add(info.id);
            }
        }
        set
    }
}
