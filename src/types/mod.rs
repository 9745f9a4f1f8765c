mod record;
mod snapshot;

pub use record::{Object, Ref, StagedFile};
pub use snapshot::{FileEntry, Snapshot, SnapshotFile};
