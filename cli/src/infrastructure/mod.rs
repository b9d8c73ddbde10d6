//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that interacts with external systems:
//! - Director API (diff, update, releases, tasks)
//! - Vars files on disk

pub mod director;
pub mod vars_file;

// Re-export commonly used types
pub use director::{DirectorClient, DirectorDeployment, DirectorReleaseUploader};
pub use vars_file::VarsFile;
