//! Canonical sentences.
//!
//! A [`Sentence`] is the top-level fact form of a term: a bare proposition (`terminal`) or a
//! relation (`( cell 1 1 b )`). Sentences only come from a [`TermPool`](crate::pool::TermPool),
//! which keeps at most one sentence per distinct structure, so sentence equality and hashing
//! are identity based.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::term::{render_relation, Atom, Compound, Term};

#[derive(Debug)]
pub(crate) enum SentenceKind {
    Proposition(Atom),
    Relation { name: Atom, body: Box<[Term]> },
}

#[derive(Debug)]
struct SentenceData {
    id: u32,
    kind: SentenceKind,
    ground: OnceLock<bool>,
    rendered: OnceLock<String>,
}

#[derive(Clone)]
pub struct Sentence(Arc<SentenceData>);

impl Sentence {
    pub(crate) fn new(id: u32, kind: SentenceKind) -> Self {
        Sentence(Arc::new(SentenceData {
            id,
            kind,
            ground: OnceLock::new(),
            rendered: OnceLock::new(),
        }))
    }

    pub(crate) fn kind(&self) -> &SentenceKind {
        &self.0.kind
    }

    /// Pool-local identifier of this sentence.
    pub fn id(&self) -> u32 {
        self.0.id
    }

    pub fn name(&self) -> &Atom {
        match &self.0.kind {
            SentenceKind::Proposition(name) => name,
            SentenceKind::Relation { name, .. } => name,
        }
    }

    /// Arguments of a relation; empty for a proposition.
    pub fn body(&self) -> &[Term] {
        match &self.0.kind {
            SentenceKind::Proposition(_) => &[],
            SentenceKind::Relation { body, .. } => body,
        }
    }

    pub fn arity(&self) -> usize {
        self.body().len()
    }

    pub fn is_proposition(&self) -> bool {
        matches!(self.0.kind, SentenceKind::Proposition(_))
    }

    pub fn is_ground(&self) -> bool {
        *self.0.ground.get_or_init(|| self.body().iter().all(Term::is_ground))
    }

    /// The term with the same structure as this sentence.
    pub fn to_term(&self) -> Term {
        match &self.0.kind {
            SentenceKind::Proposition(name) => Term::Atom(name.clone()),
            SentenceKind::Relation { name, body } => Term::Compound(Arc::new(Compound::new(name.clone(), body.clone()))),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.rendered.get_or_init(|| match &self.0.kind {
            SentenceKind::Proposition(name) => name.text().to_string(),
            SentenceKind::Relation { name, body } => render_relation(name, body),
        })
    }

    pub fn ptr_eq(&self, other: &Sentence) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Sentence {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Sentence {}

impl Hash for Sentence {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sentence#{}({})", self.0.id, self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::TermPool;
    use crate::term::Term;

    #[test]
    fn test_proposition_sentence() {
        let pool = TermPool::default();
        let terminal = pool.atom("terminal");
        let s1 = Term::from(terminal.clone()).to_sentence(&pool).unwrap();
        let s2 = Term::from(pool.atom("terminal")).to_sentence(&pool).unwrap();
        assert!(s1.ptr_eq(&s2));
        assert!(s1.is_proposition());
        assert_eq!(s1.name(), &terminal);
        assert_eq!(s1.arity(), 0);
        assert_eq!(s1.to_string(), "terminal");
    }

    #[test]
    fn test_relation_sentence_canonical() {
        let pool = TermPool::default();
        let mk = || pool.compound(pool.atom("cell"), [pool.atom("1").into(), pool.atom("b").into()]);
        let t1 = mk();
        let t2 = mk();
        let s1 = t1.to_sentence(&pool).unwrap();
        let s2 = t2.to_sentence(&pool).unwrap();
        let s3 = t1.to_sentence(&pool).unwrap();
        assert!(s1.ptr_eq(&s2));
        assert!(s1.ptr_eq(&s3));
        assert_eq!(s1.to_string(), "( cell 1 b )");
        assert_eq!(s1.arity(), 2);
        assert!(s1.is_ground());
    }

    #[test]
    fn test_relation_and_proposition_with_same_name_differ() {
        let pool = TermPool::default();
        let name = pool.atom("step");
        let p = pool.proposition(&name);
        let r = pool.relation(&name, &[]);
        assert_ne!(p, r);
        assert_eq!(p.to_string(), "step");
        assert_eq!(r.to_string(), "( step )");
    }

    #[test]
    fn test_to_term_roundtrip() {
        let pool = TermPool::default();
        let t = pool.compound(pool.atom("f"), [pool.variable("?x").into()]);
        let s = t.to_sentence(&pool).unwrap();
        assert!(!s.is_ground());
        assert_eq!(s.to_term(), t);
        assert!(s.to_term().to_sentence(&pool).unwrap().ptr_eq(&s));
    }
}
