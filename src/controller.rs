//! Library controller: issues database queries and dispatches the results
//! into the application store. Flag changes additionally ride the work queue
//! so they inherit its coalescing guarantee.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::db::{Database, LibraryFilter, Photo};
use crate::store::{Action, AppStore};
use crate::thumbnails::ThumbnailManager;
use crate::walker;
use crate::work::{PhotoWork, WorkQueue};

pub struct LibraryController {
    config: Config,
    db: Arc<Database>,
    store: Arc<AppStore>,
    thumbnails: Arc<ThumbnailManager>,
    work: WorkQueue<Database, ThumbnailManager>,
}

impl LibraryController {
    pub fn new(config: Config, db: Arc<Database>, store: Arc<AppStore>) -> Self {
        let thumbnails = Arc::new(ThumbnailManager::new(&config.thumbnails));
        let work = WorkQueue::new(
            Arc::clone(&db),
            Arc::clone(&thumbnails),
            Arc::clone(&store),
        );
        Self {
            config,
            db,
            store,
            thumbnails,
            work,
        }
    }

    pub fn work_queue(&self) -> &WorkQueue<Database, ThumbnailManager> {
        &self.work
    }

    /// Queue a photo work mutation; mutations for the same photo path
    /// coalesce into one fetch-modify-store cycle.
    pub fn update_photo_work(
        &self,
        photo: &Photo,
        mutate: impl FnOnce(&mut PhotoWork) + Send + 'static,
    ) {
        self.work.request_update(photo, mutate);
    }

    // ------------------------------------------------------------------
    // Section and shelf queries
    // ------------------------------------------------------------------

    /// Re-query the sections for the currently active filter.
    pub fn fetch_sections(&self) -> Result<()> {
        let filter = self.store.state().library.filter.clone();
        let sections = self.db.query_sections(&filter)?;
        self.store.dispatch(Action::SectionsLoaded { filter, sections });
        Ok(())
    }

    pub fn set_filter(&self, filter: LibraryFilter) -> Result<()> {
        self.store.dispatch(Action::FilterChanged {
            filter: filter.clone(),
        });
        let sections = self.db.query_sections(&filter)?;
        self.store.dispatch(Action::SectionsLoaded { filter, sections });
        Ok(())
    }

    pub fn fetch_tags(&self) -> Result<()> {
        let tags = self.db.get_all_tags()?;
        self.store.dispatch(Action::TagsLoaded { tags });
        Ok(())
    }

    pub fn fetch_devices(&self) -> Result<()> {
        let devices = self.db.query_devices()?;
        self.store.dispatch(Action::DevicesLoaded { devices });
        Ok(())
    }

    pub fn fetch_dates(&self) -> Result<()> {
        let dates = self.db.query_dates()?;
        self.store.dispatch(Action::DatesLoaded { dates });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Flags
    // ------------------------------------------------------------------

    /// Flag or unflag a set of photos. The work-record change rides the
    /// coalescing queue; the denormalized column is written directly and the
    /// updated records are rebroadcast.
    pub fn set_photos_flagged(&self, photos: &[Photo], flagged: bool) -> Result<()> {
        for photo in photos {
            self.work
                .request_update(photo, move |work| work.flagged = flagged);
        }
        let ids: Vec<i64> = photos.iter().map(|p| p.id).collect();
        self.db.set_photos_flagged(&ids, flagged)?;
        self.rebroadcast(&ids)
    }

    pub fn toggle_photo_flagged(&self, photo: &Photo) -> Result<()> {
        self.set_photos_flagged(std::slice::from_ref(photo), !photo.flagged)
    }

    // ------------------------------------------------------------------
    // Trash
    // ------------------------------------------------------------------

    pub fn move_to_trash(&self, photos: &[Photo]) -> Result<()> {
        let ids: Vec<i64> = photos.iter().map(|p| p.id).collect();
        self.db.set_photos_trashed(&ids, true)?;
        self.rebroadcast(&ids)
    }

    pub fn restore_from_trash(&self, photos: &[Photo]) -> Result<()> {
        let ids: Vec<i64> = photos.iter().map(|p| p.id).collect();
        self.db.set_photos_trashed(&ids, false)?;
        self.rebroadcast(&ids)
    }

    /// Permanently delete all trashed photos; returns how many were removed.
    pub fn empty_trash(&self) -> Result<usize> {
        let paths = self.db.empty_trash()?;
        for path in &paths {
            if let Err(e) = self.thumbnails.remove(Path::new(path)) {
                tracing::warn!(path = %path, error = %e, "could not drop cached thumbnail");
            }
        }
        self.fetch_sections()?;
        Ok(paths.len())
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    pub fn set_photo_tags(&self, photo: &Photo, names: &[String]) -> Result<()> {
        self.db.set_photo_tags(photo.id, names)?;
        self.fetch_tags()?;

        let showing = self
            .store
            .state()
            .detail
            .current
            .as_ref()
            .map(|c| c.photo.id);
        if showing == Some(photo.id) {
            self.open_detail(photo.id)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Detail view
    // ------------------------------------------------------------------

    pub fn open_detail(&self, photo_id: i64) -> Result<()> {
        let photo = self
            .db
            .get_photo_by_id(photo_id)?
            .ok_or_else(|| anyhow!("no photo with id {photo_id}"))?;
        let work = self.db.get_photo_work(Path::new(&photo.path))?;
        let tags = self.db.get_photo_tags(photo_id)?;
        self.store.dispatch(Action::DetailOpened { photo, work, tags });
        Ok(())
    }

    pub fn close_detail(&self) {
        self.store.dispatch(Action::DetailClosed);
    }

    // ------------------------------------------------------------------
    // Import
    // ------------------------------------------------------------------

    /// Walk `root` and register every image file not yet in the library, then
    /// refresh the section view. Returns the number of new photos.
    pub fn import_directory(&self, root: &Path) -> Result<usize> {
        let files = walker::walk_directory(root, &self.config.walker.excluded_names)?;

        let mut imported = 0;
        for file in files {
            let Some(ext) = file.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            let ext = ext.to_lowercase();
            if !self.config.library.image_extensions.iter().any(|e| *e == ext) {
                continue;
            }

            let path = file.to_string_lossy().to_string();
            if self.db.photo_exists(&path)? {
                continue;
            }

            let metadata = std::fs::metadata(&file)?;
            let modified_at = metadata
                .modified()
                .ok()
                .map(|t| DateTime::<Utc>::from(t).to_rfc3339());
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let directory = file
                .parent()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default();

            self.db.insert_basic_photo(
                &path,
                &filename,
                &directory,
                metadata.len() as i64,
                modified_at.as_deref(),
            )?;
            imported += 1;
        }

        if imported > 0 {
            self.fetch_sections()?;
        }
        Ok(imported)
    }

    fn rebroadcast(&self, ids: &[i64]) -> Result<()> {
        let photos = self.db.get_photos_by_ids(ids)?;
        self.store.dispatch(Action::PhotosChanged { photos });
        Ok(())
    }
}
