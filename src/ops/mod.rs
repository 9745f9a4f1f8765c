//! high-level operations on kuro repositories

mod add;
mod branch;
mod bundle;
mod checkout;
mod commit;
mod fsck;
mod log;
mod remove;
mod status;

pub use add::{add, AddReport};
pub use branch::{create_branch, delete_branch, list_branches, BranchInfo};
pub use bundle::{bundle, Bundle, BundleMetadata, BundleObject};
pub use checkout::{
    checkout, reconcile, resolve_target, CheckoutOptions, CheckoutOutcome, CheckoutTarget,
    ReconcileStats,
};
pub use commit::{commit, CommitOutcome};
pub use fsck::{fsck, FsckReport, MissingObject, MissingParent};
pub use log::{log, History, LogEntry};
pub use remove::unstage;
pub use status::{status, Status};
