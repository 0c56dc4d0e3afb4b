//! High-level CDISC Library operations over a [`LibrarySource`].

use std::error::Error;
use std::fmt;

use crate::client::{LibrarySource, SourceError};

pub mod adam;
pub mod bc;
pub mod cdash;
pub mod ct;
pub mod ig;
mod locate;
pub mod search;
pub mod standards;
pub mod version;

pub use standards::{CtStandard, IgProduct, MatchMode};

/// Failure surfaced by a library operation.
///
/// Transport and decode problems arrive wrapped from the source layer; the
/// remaining variants are produced before or after the network round trip.
#[derive(Debug)]
pub enum LibraryError {
    Source(SourceError),
    InvalidStandard { given: String },
    InvalidMatchMode { given: String },
    MissingParameter(&'static str),
    NoVersionsFound { subject: String, samples: Vec<String> },
    VariableNotFound { variable: String, scope: String },
    NoCodelists { standard: String, version: String },
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(err) => write!(f, "{err}"),
            Self::InvalidStandard { given } => write!(
                f,
                "invalid standard '{given}'; supported values are: {}",
                CtStandard::supported_values()
            ),
            Self::InvalidMatchMode { given } => write!(
                f,
                "codelist_type must be either 'ID' or 'CodelistCode', got '{given}'"
            ),
            Self::MissingParameter(name) => write!(f, "missing required parameter: {name}"),
            Self::NoVersionsFound { subject, samples } => {
                write!(f, "no versions found for {subject}")?;
                if !samples.is_empty() {
                    write!(f, "; sample entries seen: {}", samples.join(", "))?;
                }
                Ok(())
            }
            Self::VariableNotFound { variable, scope } => {
                write!(f, "variable '{variable}' not found in {scope}")
            }
            Self::NoCodelists { standard, version } => write!(
                f,
                "no codelists found in the {standard} CT package version {version}"
            ),
        }
    }
}

impl Error for LibraryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SourceError> for LibraryError {
    fn from(err: SourceError) -> Self {
        Self::Source(err)
    }
}

/// The library control plane: every tool operation is a method on this type,
/// parameterized over the fetch source so the lookup logic stays testable.
pub struct CdiscLibrary<S: LibrarySource> {
    source: S,
}

impl<S: LibrarySource> CdiscLibrary<S> {
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    pub(crate) const fn source(&self) -> &S {
        &self.source
    }
}
