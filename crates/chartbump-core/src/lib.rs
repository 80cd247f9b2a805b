//! chartbump core - keeps Argo CD Application chart versions current
//!
//! This crate provides everything except the network transport and the
//! command line:
//! - `yaml`: comment-preserving YAML documents
//! - `manifest`: Application kind, annotation and targetRevision accessors
//! - `version`: dotted-integer version ordering
//! - `discovery`: annotated manifest lookup in a directory
//! - `resolver`: latest stable version from a pluggable source
//! - `persist`: write-in-place and diff preview policies
//! - `update`: the per-manifest update pipeline

pub mod config;
pub mod discovery;
pub mod error;
pub mod manifest;
pub mod persist;
pub mod resolver;
pub mod update;
pub mod version;
pub mod yaml;

pub use config::Config;
pub use discovery::{ChartInfo, discover};
pub use error::{CoreError, Result};
pub use persist::{DiffPreview, DiffTool, FileWriter, Persister};
pub use resolver::{VersionResolver, VersionSource};
pub use update::{UpdateResult, UpdateStatus, Updater};
