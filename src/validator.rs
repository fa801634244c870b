//! Game validation by test compilation.
//!
//! A game description is accepted when a network compiler can turn its rules into a network.
//! The compiler itself lives outside this crate and plugs in through [`NetworkCompiler`].

use std::fmt;

use log::{debug, warn};

use crate::error::{BoxError, ValidatorError};
use crate::sentence::Sentence;

/// Compiles game rules into a proposition network.
pub trait NetworkCompiler {
    type Network;

    /// Compile `rules`. `Ok(None)` means the compiler gave up without an error.
    fn compile(&self, rules: &[Sentence]) -> Result<Option<Self::Network>, BoxError>;
}

/// A non-fatal problem found in a game description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorWarning {
    message: String,
}

impl ValidatorWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidatorWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Checks a game description.
pub trait GameValidator {
    fn check_validity(&self, rules: &[Sentence]) -> Result<Vec<ValidatorWarning>, ValidatorError>;
}

/// Validates a game by compiling it with `C`.
///
/// Any compiler failure, including a compiler that produces nothing, is a validation error.
/// Success carries no warnings.
#[derive(Debug, Clone, Default)]
pub struct Validator<C> {
    compiler: C,
}

impl<C: NetworkCompiler> Validator<C> {
    pub fn new(compiler: C) -> Self {
        Self { compiler }
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }
}

impl<C: NetworkCompiler> GameValidator for Validator<C> {
    fn check_validity(&self, rules: &[Sentence]) -> Result<Vec<ValidatorWarning>, ValidatorError> {
        debug!("check_validity: {} rules", rules.len());
        match self.compiler.compile(rules) {
            Ok(Some(_)) => Ok(Vec::new()),
            Ok(None) => {
                warn!("validation failed: compiler produced no network");
                Err(ValidatorError::NoNetwork)
            }
            Err(source) => {
                warn!("validation failed: {}", source);
                Err(ValidatorError::Compilation { source })
            }
        }
    }
}
