//! Per-project write serialization.
//!
//! Phase, timeline, and material mutations all read-modify-write the same
//! project aggregate, so concurrent mutations for the same project id must
//! not interleave. Mutations for different projects proceed in parallel, and
//! reads are never blocked.

use std::collections::HashMap;
use std::sync::Arc;

use roofline_core::types::DbId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-project async mutexes.
///
/// A lock entry is created on first use and kept for the life of the
/// process; the planner horizon is low hundreds of projects, so the map
/// stays small.
#[derive(Default)]
pub struct ProjectLocks {
    inner: Mutex<HashMap<DbId, Arc<Mutex<()>>>>,
}

impl ProjectLocks {
    /// Acquire the write lock for one project, waiting behind any in-flight
    /// mutation on the same id.
    pub async fn acquire(&self, project_id: DbId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            Arc::clone(map.entry(project_id).or_default())
        };
        lock.lock_owned().await
    }
}
