//! Typed object/weapon/armor templates built from `gameini` blocks.
//!
//! A load parses every input, merges repeated blocks, builds records into a
//! [`Repository`] and then fills unset object fields from their parent
//! template.

pub mod builder;
pub mod database;
pub mod error;
pub mod inherit;
pub mod options;
pub mod process;
pub mod repository;
pub mod types;

pub use builder::{BuiltRecord, build_armor, build_object, build_record, build_weapon};
pub use database::TemplateDatabase;
pub use error::{Error, Result};
pub use inherit::{INHERITED_FIELDS, InheritedField, Resolution, inherit_from, resolve};
pub use options::LoadOptions;
pub use process::{
    LoadProgress, LoadReport, discover_files, load_directory, load_directory_with_progress,
    load_file, load_files_with_progress, load_text,
};
pub use repository::{Repository, RepositoryCounts};
pub use types::{
    ArmorRecord, AudioCues, Geometry, ModuleLists, ObjectRecord, RecordKind, RecordRef,
    WeaponRecord,
};
