//! File organizer (C9): destination filename generation, conflict
//! resolution, and atomic move/copy with checksum verification, recorded
//! to an append-only operation history.

pub mod conflict;
pub mod error;
pub mod fs_utils;
pub mod history;
pub mod naming;
pub mod organizer;
pub mod sanitize;

pub use conflict::{resolve, Resolution};
pub use error::{OrganizeError, OrganizeResult};
pub use fs_utils::{copy_file_verified, move_file};
pub use history::OperationHistory;
pub use naming::{generate_filename, generate_filename_at, CustomNamer, GeneratedName};
pub use organizer::{FileOrganizer, OrganizeConfig, RequestedOp};
pub use sanitize::sanitize_filename;
