//! The term pool: interning for atoms and hash-consing for sentences.
//!
//! All canonical objects are created through a [`TermPool`]. The pool is an explicit context
//! object rather than a process-wide singleton; its canonical objects stay valid (and
//! canonical) for as long as the pool lives, which is typically the lifetime of the compiled
//! network built from the rules.
//!
//! Building is single-threaded, so the pool uses `RefCell` interior mutability and
//! `&self` constructors. The objects it hands out are `Send + Sync`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;

use log::debug;

use crate::sentence::{Sentence, SentenceKind};
use crate::table::Table;
use crate::term::{body_hash, Atom, Compound, Term, Variable};
use crate::utils::{pairing2, pairing3};

pub struct TermPool {
    atoms: RefCell<HashMap<Box<str>, Atom>>,
    sentences: RefCell<Table<Sentence>>,
}

impl TermPool {
    /// Create a pool whose sentence table has `2^min(bits, 16)` buckets.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Pool bits should be in the range 0..=31");
        Self {
            atoms: RefCell::new(HashMap::new()),
            sentences: RefCell::new(Table::new(bits)),
        }
    }
}

impl Default for TermPool {
    fn default() -> Self {
        TermPool::new(12)
    }
}

impl Debug for TermPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sentences = self.sentences.borrow();
        f.debug_struct("TermPool")
            .field("atoms", &self.num_atoms())
            .field("sentences", &sentences.len())
            .field("buckets", &sentences.num_buckets())
            .finish()
    }
}

impl TermPool {
    pub fn num_atoms(&self) -> usize {
        self.atoms.borrow().len()
    }

    pub fn num_sentences(&self) -> usize {
        self.sentences.borrow().len()
    }

    /// Return the unique atom for `text`.
    pub fn atom(&self, text: &str) -> Atom {
        if let Some(atom) = self.atoms.borrow().get(text) {
            return atom.clone();
        }
        let mut atoms = self.atoms.borrow_mut();
        let atom = Atom::new(atoms.len() as u32, text);
        debug!("atom: new {:?} = #{}", text, atom.id());
        atoms.insert(text.into(), atom.clone());
        atom
    }

    pub fn variable(&self, name: &str) -> Variable {
        Variable::new(name)
    }

    /// Build a compound term. The compound itself is not canonicalised.
    pub fn compound(&self, name: Atom, body: impl IntoIterator<Item = Term>) -> Term {
        let body: Box<[Term]> = body.into_iter().collect();
        Term::Compound(std::sync::Arc::new(Compound::new(name, body)))
    }

    /// The canonical proposition sentence for `name`.
    pub fn proposition(&self, name: &Atom) -> Sentence {
        let hash = pairing2(0, name.id() as u64);
        let mut table = self.sentences.borrow_mut();
        let index = table.find_or_insert_with(
            hash,
            |s| matches!(s.kind(), SentenceKind::Proposition(n) if n == name),
            |index| {
                debug!("proposition: new {} = #{}", name, index);
                Sentence::new(index as u32, SentenceKind::Proposition(name.clone()))
            },
        );
        table[index].clone()
    }

    /// The canonical relation sentence for `( name body... )`.
    pub fn relation(&self, name: &Atom, body: &[Term]) -> Sentence {
        let hash = pairing3(1, name.id() as u64, body_hash(body));
        let mut table = self.sentences.borrow_mut();
        let index = table.find_or_insert_with(
            hash,
            |s| matches!(s.kind(), SentenceKind::Relation { name: n, body: b } if n == name && &**b == body),
            |index| {
                debug!("relation: new #{} for {}", index, name);
                Sentence::new(
                    index as u32,
                    SentenceKind::Relation {
                        name: name.clone(),
                        body: body.into(),
                    },
                )
            },
        );
        table[index].clone()
    }

    /// Convenience constructor for a ground sentence whose arguments are all atoms.
    ///
    /// An empty `args` yields a proposition.
    pub fn ground_sentence(&self, name: &str, args: &[&str]) -> Sentence {
        let name = self.atom(name);
        if args.is_empty() {
            return self.proposition(&name);
        }
        let body: Vec<Term> = args.iter().map(|a| Term::Atom(self.atom(a))).collect();
        self.relation(&name, &body)
    }

    /// All sentences created so far, in creation order.
    pub fn sentences(&self) -> Vec<Sentence> {
        self.sentences.borrow().iter().cloned().collect()
    }
}
