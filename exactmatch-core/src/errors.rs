//! errors.rs - Error types for the exactmatch-core library.
//!
//! Two classes of failure exist. `ExtractError` is signature-local: it discards
//! one signature and is reported as a diagnostic, never aborting a run.
//! `ExactmatchError` covers everything that prevents a run from being set up
//! at all (bad rewrite rules, unreadable configuration).
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// A failure while decoding or extracting a single signature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExtractError {
    #[error("malformed hex span '{span}' at offset {offset}")]
    MalformedHexSpan { offset: usize, span: String },

    #[error("unterminated hex span opened at offset {offset}")]
    UnterminatedHexSpan { offset: usize },

    #[error("malformed quantifier '{quantifier}' at offset {offset}")]
    MalformedQuantifier { offset: usize, quantifier: String },

    #[error("signature is empty")]
    EmptySignature,

    #[error("character {character:?} at offset {offset} does not fit in one byte")]
    UnencodableCharacter { offset: usize, character: char },
}

impl ExtractError {
    /// Stable name of the error kind, used in diagnostics and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::MalformedHexSpan { .. } => "MalformedHexSpan",
            ExtractError::UnterminatedHexSpan { .. } => "UnterminatedHexSpan",
            ExtractError::MalformedQuantifier { .. } => "MalformedQuantifier",
            ExtractError::EmptySignature => "EmptySignature",
            ExtractError::UnencodableCharacter { .. } => "UnencodableCharacter",
        }
    }
}

/// A rule line the scanner could not attribute to a rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("line {line}: {signatures} signature(s) found but no sid")]
    MissingRuleId { line: usize, signatures: usize },

    #[error("line {line}: sid '{value}' is not a valid integer")]
    InvalidRuleId { line: usize, value: String },
}

/// Errors that stop an extraction run from being configured.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExactmatchError {
    #[error("Failed to compile rewrite rule '{0}': {1}")]
    RuleCompilationError(String, regex::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
