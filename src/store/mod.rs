//! Centralized application store.
//!
//! Actions are folded into immutable state slices by pure reducers and the
//! resulting state is broadcast synchronously to every subscriber before
//! `dispatch` returns. Last write wins per slice.

pub mod detail;
pub mod library;

use std::sync::{Arc, Mutex};

use crate::db::{DateCount, LibraryFilter, Photo, PhotoSection, Tag};
use crate::work::PhotoWork;

pub use detail::{DetailPhoto, DetailState};
pub use library::LibraryState;

/// An event folded into the application state.
#[derive(Debug, Clone)]
pub enum Action {
    /// A fresh section query finished for `filter`.
    SectionsLoaded {
        filter: LibraryFilter,
        sections: Vec<PhotoSection>,
    },
    /// Updated photo records to patch into every slice that shows them.
    PhotosChanged { photos: Vec<Photo> },
    /// A photo's work record changed (flag, crop, rotation, ...).
    PhotoWorkChanged { path: String, work: PhotoWork },
    TagsLoaded { tags: Vec<Tag> },
    DevicesLoaded { devices: Vec<String> },
    DatesLoaded { dates: Vec<DateCount> },
    FilterChanged { filter: LibraryFilter },
    DetailOpened {
        photo: Photo,
        work: PhotoWork,
        tags: Vec<String>,
    },
    DetailClosed,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub library: LibraryState,
    pub detail: DetailState,
}

type Subscriber = Arc<dyn Fn(&AppState, &Action) + Send + Sync>;

pub struct AppStore {
    state: Mutex<Arc<AppState>>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl AppStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Arc::new(AppState::default())),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Fold `action` into the state and notify every subscriber before
    /// returning.
    pub fn dispatch(&self, action: Action) {
        let next = {
            let mut state = self.state.lock().unwrap();
            let folded = AppState {
                library: library::reduce(&state.library, &action),
                detail: detail::reduce(&state.detail, &action),
            };
            *state = Arc::new(folded);
            Arc::clone(&state)
        };

        // Snapshot the subscriber list so a callback may itself dispatch.
        let subscribers: Vec<Subscriber> = self.subscribers.lock().unwrap().clone();
        for subscriber in &subscribers {
            subscriber(&next, &action);
        }
    }

    pub fn subscribe(&self, subscriber: impl Fn(&AppState, &Action) + Send + Sync + 'static) {
        self.subscribers.lock().unwrap().push(Arc::new(subscriber));
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state.lock().unwrap())
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn dispatch_notifies_subscribers_synchronously() {
        let store = AppStore::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        store.subscribe(move |state, _action| {
            assert_eq!(state.library.filter, LibraryFilter::Flagged);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.dispatch(Action::FilterChanged {
            filter: LibraryFilter::Flagged,
        });

        // The broadcast completed before dispatch returned.
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(store.state().library.filter, LibraryFilter::Flagged);
    }

    #[test]
    fn later_dispatch_wins() {
        let store = AppStore::new();
        store.dispatch(Action::DevicesLoaded {
            devices: vec!["M6".to_string()],
        });
        store.dispatch(Action::DevicesLoaded {
            devices: vec!["X100V".to_string()],
        });
        assert_eq!(store.state().library.devices, vec!["X100V"]);
    }
}
