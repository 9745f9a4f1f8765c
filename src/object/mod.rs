pub mod blob;
pub mod snapshot;

pub use blob::{
    delete_object, get_object, list_object_hashes, object_exists, put_object, read_object,
};
pub use snapshot::{
    build_snapshot, canonical_snapshot_text, compare_file_sets, compute_snapshot_hash,
    get_snapshot, list_snapshot_files, list_snapshots, snapshot_entries, snapshot_exists,
};
