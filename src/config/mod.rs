// src/config/mod.rs

//! Build-description file handling.
//!
//! The build file (TOML, `Mergewatch.toml` by default) declares the global
//! build options plus the merge tasks. Loading is split the usual way:
//! [`model::RawBuildFile`] is the direct serde mapping, [`validate`] converts
//! it into the checked [`model::BuildFile`] via `TryFrom`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_build_file_path, load_and_validate, load_from_path};
pub use model::{
    BabelSection, BuildFile, BuildOptions, CommandSpec, MergeEntry, OptionsSection,
    RawBuildFile, RawMergeEntry,
};
