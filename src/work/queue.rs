//! Coalescing queue for photo work updates.
//!
//! Mutation requests that arrive for a photo path while a fetch of its
//! current work record is in flight join that fetch instead of starting a
//! second one. This closes the read-modify-write race on the async record:
//! two overlapping fetch-modify-store cycles for the same path could
//! otherwise drop one caller's change.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::db::Photo;
use crate::store::{Action, AppStore};

use super::{PhotoWork, ThumbnailSink, WorkStore};

type Mutation = Box<dyn FnOnce(&mut PhotoWork) + Send>;

/// Mutations buffered while a fetch for the same photo path is in flight.
/// Invariant: at most one batch exists per path at any time.
struct PendingBatch {
    photo: Photo,
    mutations: Vec<Mutation>,
}

pub struct WorkQueue<S, T> {
    inner: Arc<Inner<S, T>>,
}

struct Inner<S, T> {
    store: Arc<S>,
    thumbnails: Arc<T>,
    app: Arc<AppStore>,
    pending: Mutex<HashMap<String, PendingBatch>>,
}

impl<S, T> Clone for WorkQueue<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: WorkStore, T: ThumbnailSink> WorkQueue<S, T> {
    pub fn new(store: Arc<S>, thumbnails: Arc<T>, app: Arc<AppStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                thumbnails,
                app,
                pending: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Enqueue `mutate` against the photo's current work record and return
    /// immediately. Side effects are eventually consistent: once the fetch
    /// for this path resolves, every queued mutation is applied in submission
    /// order, the result is dispatched into the application store, persisted,
    /// and the thumbnail is regenerated when anything besides the flag
    /// changed. Nothing is reported back to the caller; a failed fetch drops
    /// the whole batch.
    pub fn request_update(
        &self,
        photo: &Photo,
        mutate: impl FnOnce(&mut PhotoWork) + Send + 'static,
    ) {
        let mut pending = self.inner.pending.lock().unwrap();
        if let Some(batch) = pending.get_mut(&photo.path) {
            batch.mutations.push(Box::new(mutate));
            return;
        }

        pending.insert(
            photo.path.clone(),
            PendingBatch {
                photo: photo.clone(),
                mutations: vec![Box::new(mutate)],
            },
        );
        drop(pending);

        let inner = Arc::clone(&self.inner);
        let path = photo.path.clone();
        tokio::spawn(async move {
            inner.run_cycle(path).await;
        });
    }

    /// Number of photo paths with a cycle currently in flight.
    pub fn pending_len(&self) -> usize {
        self.inner.pending.lock().unwrap().len()
    }
}

impl<S: WorkStore, T: ThumbnailSink> Inner<S, T> {
    async fn run_cycle(self: Arc<Self>, path: String) {
        let mut work = match self.store.fetch_photo_work(Path::new(&path)).await {
            Ok(work) => work,
            Err(e) => {
                // The whole batch is dropped; callers re-issue if they want a
                // retry. Clearing the slot lets the next request start fresh.
                self.pending.lock().unwrap().remove(&path);
                tracing::error!(
                    path = %path,
                    error = %e,
                    "fetching photo work failed, discarding queued updates"
                );
                return;
            }
        };

        // Take the batch out of the registry. Mutations arriving from here on
        // start a new cycle against the record we are about to persist.
        let batch = match self.pending.lock().unwrap().remove(&path) {
            Some(batch) => batch,
            None => return,
        };

        let before = work.clone();
        for mutate in batch.mutations {
            mutate(&mut work);
        }

        // Flagging alone never needs a new thumbnail, so neutralize the
        // marker on the snapshot before comparing.
        let mut reference = before;
        reference.flagged = work.flagged;
        let thumbnail_stale = reference != work;

        self.app.dispatch(Action::PhotoWorkChanged {
            path: path.clone(),
            work: work.clone(),
        });

        // Persistence and invalidation run concurrently and independently;
        // neither failure rolls back the store dispatch above or re-opens the
        // registry slot.
        let persist = async {
            if let Err(e) = self.store.store_photo_work(Path::new(&path), &work).await {
                tracing::error!(path = %path, error = %e, "persisting photo work failed");
            }
        };
        let invalidate = async {
            if thumbnail_stale {
                if let Err(e) = self.thumbnails.on_photo_work_changed(&batch.photo).await {
                    tracing::error!(
                        path = %batch.photo.path,
                        error = %e,
                        "thumbnail regeneration failed"
                    );
                }
            }
        };
        tokio::join!(persist, invalidate);
    }
}
