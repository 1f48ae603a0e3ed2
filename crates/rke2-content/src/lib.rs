//! Config fragment handling for the RKE2 cluster provider
//!
//! Converts free-form YAML/JSON options into canonical JSON, merges
//! layered config fragments the way the node applies them at boot,
//! and writes the merged result atomically.

pub mod convert;
pub mod error;
pub mod io;
pub mod merge;

pub use convert::{canonical_json, yaml_to_json};
pub use error::{Error, Result};
pub use merge::{merge_directory, merge_fragments, merge_into};
