//! working tree access: enumeration and destructive synchronization helpers

pub mod scan;
pub mod write;

pub use scan::{is_metadata_path, normalize_path, scan, validate_path, WorkspaceFile};
pub use write::{move_into_place, prune_empty_dirs, remove_path, write_file};
