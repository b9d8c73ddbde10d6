//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O.
//! Types and functions here can be unit tested without mocking.

pub mod deploy;
pub mod diff;
pub mod manifest;
pub mod ports;
pub mod variables;
pub mod version;

// Re-export commonly used types
pub use deploy::{
    DeployOptions, DeployPhase, DeployReport, SkipDrain, UpdateRequest, UploadOutcome,
    UploadRequest,
};
pub use diff::{ChangeMarker, DiffLine};
pub use manifest::{ManifestDocument, ReleaseSpec};
pub use ports::{RecordStore, ReleaseUploader, Ui, VariableSource};
pub use variables::{VarKv, VariableSet};
pub use version::ParsedVersion;
