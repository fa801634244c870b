//! Error types.

use thiserror::Error;

use crate::types::{FactorId, PropId};

/// Boxed error produced by an external collaborator (e.g. a network compiler).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TermError {
    #[error("Term `{term}` cannot be converted to a sentence")]
    NotASentence { term: String },
}

/// Failure to load a factor from its persisted form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FactorParseError {
    #[error("Expected `v1~` prefix, found `{found}`")]
    UnsupportedVersion { found: String },

    #[error("Expected exactly one `~` after the version tag, found {count}")]
    SeparatorCount { count: usize },

    #[error("Failed to find proposition `{name}`")]
    UnknownProposition { name: String },

    #[error("Failed to find move `{encoding}`")]
    UnknownMove { encoding: String },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Proposition {prop} is specific to both {first} and {second}")]
    Overlap { prop: PropId, first: FactorId, second: FactorId },

    #[error("Bad factor on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: FactorParseError,
    },
}

/// A game description failed validation.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("Got no network from the compiler")]
    NoNetwork,

    #[error("Network compilation failed: {source}")]
    Compilation {
        #[source]
        source: BoxError,
    },
}
