//! Core types and lookup services for cdisc-mcp.
//!
//! This crate owns the HTTP fetch layer for the CDISC Library API, the
//! version resolvers for date- and ordinal-versioned standards, and the
//! flattened metadata lookups the tool surface is built from.

pub mod client;
pub mod library;

pub use client::{HeaderOverrides, HttpLibraryClient, LibraryConfig, LibrarySource, SourceError};
pub use library::{CdiscLibrary, CtStandard, IgProduct, LibraryError, MatchMode};
