//! # ggp-factor: Factored proposition networks for general game playing
//!
//! **`ggp-factor`** holds game rules as canonical terms and splits a compiled game into
//! **factors**: independent sub-games that a search can explore separately while sharing
//! one machine state.
//!
//! ## What is a factor?
//!
//! A compiled game is a proposition network: a boolean circuit whose base propositions are
//! the bits of the game state. Many games are really several games played side by side (two
//! boards, one move per turn on either). A factor is one block of a partition of the base
//! propositions, together with the legal moves that drive them, such that no causal link and
//! no terminal or goal condition couples it to another block. Propositions that belong to no
//! factor are shared by all of them.
//!
//! ## Key Features
//!
//! - **Pool-Centric Terms**: All atoms and sentences are created through a
//!   [`TermPool`][crate::pool::TermPool], which interns them. Equal sentences are the same
//!   object, so comparison is a pointer check.
//! - **Typestate Factors**: A [`FactorBuilder`][crate::factor::FactorBuilder] is consumed when
//!   sealed into a [`Factor`][crate::factor::Factor]. Mutating a sealed factor, or sealing a
//!   builder twice, does not compile.
//! - **Bit-Vector Masks**: Each factor carries state masks over the full state, for its own
//!   propositions and for those plus the shared ones, with their complements precomputed.
//! - **Filtered Views**: A [`StateViewFilter`][crate::filter::StateViewFilter] hides moves of
//!   other factors and synthesises a pseudo-no-op where a role has nothing left to do.
//! - **Persistence**: Factor assignments save to a compact, versioned text form and load back.
//!
//! ## Basic Usage
//!
//! ```rust
//! use ggp_factor::network::{Move, PropNet};
//! use ggp_factor::pool::TermPool;
//! use ggp_factor::registry::FactorRegistry;
//! use ggp_factor::signal::Signal;
//!
//! // 1. Intern the game's sentences
//! let pool = TermPool::default();
//!
//! // 2. Build a network: one role, two independent lights
//! let mut net = PropNet::new();
//! let player = net.add_role(pool.atom("player"));
//! let a = net.add_base(pool.ground_sentence("lit", &["a"]));
//! let b = net.add_base(pool.ground_sentence("lit", &["b"]));
//! let flip_a = net.add_move(player, Move::new(pool.atom("flip_a").into()), None, !Signal::from(a));
//! let flip_b = net.add_move(player, Move::new(pool.atom("flip_b").into()), None, !Signal::from(b));
//!
//! // 3. Partition it, record ownership on the network, and seal
//! let mut registry = FactorRegistry::new();
//! let mut fa = registry.new_factor();
//! fa.add_all([a]);
//! fa.add_all_moves([flip_a]);
//! let mut fb = registry.new_factor();
//! fb.add_all([b]);
//! fb.add_all_moves([flip_b]);
//! fa.claim(&mut net);
//! fb.claim(&mut net);
//! let factors = registry.seal_all(vec![fa, fb], &net);
//! registry.check_disjoint(&factors).unwrap();
//!
//! // 4. Query
//! assert!(factors[0].state_mask(true).contains(a.index()));
//! assert!(!factors[1].state_mask(true).contains(a.index()));
//!
//! // 5. Save the partition
//! let saved = registry.save(&factors, &net);
//! assert_eq!(saved.lines().next(), Some("v1~( lit a )~player:flip_a"));
//! ```
//!
//! ## Core Components
//!
//! - **[`pool`]**, **[`term`]**, **[`sentence`]**: The canonical term model.
//! - **[`network`]**: What the factor layer needs from a compiled network, and a small
//!   in-memory [`PropNet`][crate::network::PropNet] built on the [`gate`] circuit.
//! - **[`factor`]**: Factor building, sealing, masks, move filtering and persistence.
//! - **[`filter`]**: Pass-through and factored views of the state.
//! - **[`registry`]**: Id allocation and whole-partition operations.
//! - **[`validator`]**: Game validation by test compilation.

pub mod bitset;
pub mod error;
pub mod factor;
pub mod filter;
pub mod gate;
pub mod network;
pub mod pool;
pub mod registry;
pub mod sentence;
pub mod signal;
pub mod table;
pub mod term;
pub mod types;
pub mod utils;
pub mod validator;
