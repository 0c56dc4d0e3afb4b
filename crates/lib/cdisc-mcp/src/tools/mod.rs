//! MCP tool modules.
//!
//! Tools are grouped by standard: controlled terminology, the three
//! implementation guides, ADaM data structures, biomedical concepts, and
//! library-wide search.

pub mod adam;
pub mod bc;
pub mod cdash;
pub mod ct;
pub mod sdtm;
pub mod search;
pub mod send;
