//! Canonical GDL terms.
//!
//! A [`Term`] is an [`Atom`], a [`Variable`] or a [`Compound`]. Terms are immutable once built
//! and cheap to clone (all variants are reference counted), so they can be shared freely
//! between search threads.
//!
//! Atoms are interned by a [`TermPool`](crate::pool::TermPool): two atoms created from equal
//! text through the same pool are the *same* object, and equality on atoms is an identity
//! check. Compounds are not canonicalised themselves; only their conversion to a
//! [`Sentence`](crate::sentence::Sentence) is.
//!
//! Compounds carry two write-once caches: ground-ness and the rendered text. Both are pure
//! functions of the (immutable) structure, so the first computation is stored permanently
//! and never invalidated.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::error::TermError;
use crate::pool::TermPool;
use crate::sentence::Sentence;
use crate::utils::{pairing2, pairing3, pairing_seq, StructHash};

#[derive(Debug)]
struct AtomData {
    id: u32,
    text: Box<str>,
}

/// An interned constant symbol.
///
/// Only a [`TermPool`] creates atoms. Equality is pointer identity, so atoms from different
/// pools never compare equal even if their text matches.
#[derive(Clone)]
pub struct Atom(Arc<AtomData>);

impl Atom {
    pub(crate) fn new(id: u32, text: &str) -> Self {
        Atom(Arc::new(AtomData { id, text: text.into() }))
    }

    /// Pool-local identifier of this atom.
    pub fn id(&self) -> u32 {
        self.0.id
    }

    pub fn text(&self) -> &str {
        &self.0.text
    }

    pub fn ptr_eq(&self, other: &Atom) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({:?})", self.text())
    }
}

/// A logic variable such as `?x`. Never ground.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Variable(Arc<str>);

impl Variable {
    pub(crate) fn new(name: &str) -> Self {
        Variable(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Variable({:?})", self.name())
    }
}

/// A function term `( name arg1 arg2 ... )`.
pub struct Compound {
    name: Atom,
    body: Box<[Term]>,
    ground: OnceLock<bool>,
    rendered: OnceLock<String>,
}

impl Compound {
    pub(crate) fn new(name: Atom, body: Box<[Term]>) -> Self {
        Self {
            name,
            body,
            ground: OnceLock::new(),
            rendered: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &Atom {
        &self.name
    }

    pub fn body(&self) -> &[Term] {
        &self.body
    }

    pub fn arity(&self) -> usize {
        self.body.len()
    }

    /// True iff every argument is ground. Computed on first call, then cached.
    pub fn is_ground(&self) -> bool {
        *self.ground.get_or_init(|| self.body.iter().all(Term::is_ground))
    }

    /// Whether the ground-ness cache has been filled.
    pub fn is_ground_cached(&self) -> bool {
        self.ground.get().is_some()
    }

    /// Rendered form, computed once.
    pub fn as_str(&self) -> &str {
        self.rendered.get_or_init(|| render_relation(&self.name, &self.body))
    }
}

pub(crate) fn render_relation(name: &Atom, body: &[Term]) -> String {
    let mut s = String::with_capacity(4 + name.text().len() + body.len() * 4);
    s.push_str("( ");
    s.push_str(name.text());
    s.push(' ');
    for term in body {
        s.push_str(&term.to_string());
        s.push(' ');
    }
    s.push(')');
    s
}

impl PartialEq for Compound {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || (self.name == other.name && self.body == other.body)
    }
}

impl Eq for Compound {}

impl Hash for Compound {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.body.hash(state);
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compound")
            .field("name", &self.name)
            .field("body", &self.body)
            .finish()
    }
}

/// A GDL term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Atom(Atom),
    Variable(Variable),
    Compound(Arc<Compound>),
}

impl Term {
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Atom(_) => true,
            Term::Variable(_) => false,
            Term::Compound(c) => c.is_ground(),
        }
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Term::Atom(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Term::Compound(c) => Some(c.as_ref()),
            _ => None,
        }
    }

    /// Convert to the canonical sentence with the same structure.
    ///
    /// Repeated conversions of structurally equal terms through the same pool return the
    /// identical [`Sentence`]. Variables have no sentence form.
    pub fn to_sentence(&self, pool: &TermPool) -> Result<Sentence, TermError> {
        match self {
            Term::Atom(a) => Ok(pool.proposition(a)),
            Term::Compound(c) => Ok(pool.relation(c.name(), c.body())),
            Term::Variable(_) => Err(TermError::NotASentence { term: self.to_string() }),
        }
    }
}

impl From<Atom> for Term {
    fn from(atom: Atom) -> Self {
        Term::Atom(atom)
    }
}

impl From<Variable> for Term {
    fn from(var: Variable) -> Self {
        Term::Variable(var)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(a) => fmt::Display::fmt(a, f),
            Term::Variable(v) => fmt::Display::fmt(v, f),
            Term::Compound(c) => fmt::Display::fmt(c, f),
        }
    }
}

impl StructHash for Term {
    fn struct_hash(&self) -> u64 {
        match self {
            Term::Atom(a) => pairing2(0, a.id() as u64),
            Term::Variable(v) => pairing2(1, pairing_seq(v.name().bytes().map(u64::from))),
            Term::Compound(c) => pairing3(2, c.name().id() as u64, body_hash(c.body())),
        }
    }
}

pub(crate) fn body_hash(body: &[Term]) -> u64 {
    pairing_seq(body.iter().map(StructHash::struct_hash))
}
