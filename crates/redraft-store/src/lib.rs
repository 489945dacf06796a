//! Redraft Store — object storage boundary and persisted job records.

pub mod jobs;
pub mod storage;

pub use jobs::{JobCompletion, JobStatus, JobStore, RewriteJob};
pub use storage::{FsStorage, Storage};
