//! Per-photo edit metadata ("photo work") and its update queue.
//!
//! A [`PhotoWork`] records the non-destructive edit operations applied to a
//! photo plus its flag marker. Callers never read or write the record directly
//! while an update is in flight; all mutations go through [`WorkQueue`].

pub mod queue;

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::db::Photo;

pub use queue::WorkQueue;

/// Edit state for a single photo: named edit operations with parameters that
/// are opaque to this layer, plus the flag marker. An empty record serializes
/// to `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoWork {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub edits: BTreeMap<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub flagged: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl PhotoWork {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty() && !self.flagged
    }

    /// Set or replace the parameters of one edit operation.
    pub fn set_edit(&mut self, name: impl Into<String>, params: serde_json::Value) {
        self.edits.insert(name.into(), params);
    }

    /// Remove one edit operation, if present.
    pub fn clear_edit(&mut self, name: &str) {
        self.edits.remove(name);
    }
}

/// Persistence collaborator for photo work records, keyed by the photo's
/// master path.
pub trait WorkStore: Send + Sync + 'static {
    /// Resolve the currently persisted work for a photo, or an empty default
    /// if none exists. Fails only on genuine I/O or parse errors.
    fn fetch_photo_work(&self, path: &Path) -> impl Future<Output = Result<PhotoWork>> + Send;

    /// Persist the full record. Overwrite semantics, no partial merge.
    fn store_photo_work(
        &self,
        path: &Path,
        work: &PhotoWork,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Thumbnail regeneration trigger. Fire-and-forget from the queue's view:
/// failures are logged, never propagated to the caller that queued the update.
pub trait ThumbnailSink: Send + Sync + 'static {
    fn on_photo_work_changed(&self, photo: &Photo) -> impl Future<Output = Result<()>> + Send;
}
