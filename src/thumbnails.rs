//! Thumbnail cache with hash-derived names and invalidation on work changes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::ThumbnailConfig;
use crate::db::Photo;
use crate::work::ThumbnailSink;

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("thumbnail cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not decode source image: {0}")]
    Image(#[from] image::ImageError),
}

pub struct ThumbnailManager {
    cache_dir: PathBuf,
    size: u32,
}

impl ThumbnailManager {
    pub fn new(config: &ThumbnailConfig) -> Self {
        Self {
            cache_dir: config.path.clone(),
            size: config.size,
        }
    }

    fn ensure_cache_dir(&self) -> Result<(), ThumbnailError> {
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    /// Cache filename derived from a hash of the original path, so cache
    /// entries never collide across directories.
    fn cache_path(&self, original: &Path) -> PathBuf {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        original.to_string_lossy().hash(&mut hasher);
        let hash = hasher.finish();

        self.cache_dir.join(format!("{:016x}.jpg", hash))
    }

    pub fn get_cached_path(&self, original: &Path) -> Option<PathBuf> {
        let cache_path = self.cache_path(original);
        if cache_path.exists() {
            Some(cache_path)
        } else {
            None
        }
    }

    /// Generate (or reuse) the cached thumbnail for `original`.
    pub fn generate(&self, original: &Path) -> Result<PathBuf, ThumbnailError> {
        self.ensure_cache_dir()?;

        let cache_path = self.cache_path(original);
        if cache_path.exists() {
            return Ok(cache_path);
        }

        let img = image::open(original)?;
        let thumbnail = img.thumbnail(self.size, self.size);
        thumbnail.save(&cache_path)?;

        Ok(cache_path)
    }

    /// Drop the stale cache entry and regenerate from the original file.
    pub fn invalidate(&self, original: &Path) -> Result<PathBuf, ThumbnailError> {
        let cache_path = self.cache_path(original);
        if cache_path.exists() {
            fs::remove_file(&cache_path)?;
        }
        self.generate(original)
    }

    /// Remove the cache entry for a photo that left the library.
    pub fn remove(&self, original: &Path) -> Result<(), ThumbnailError> {
        let cache_path = self.cache_path(original);
        if cache_path.exists() {
            fs::remove_file(&cache_path)?;
        }
        Ok(())
    }
}

impl ThumbnailSink for ThumbnailManager {
    async fn on_photo_work_changed(&self, photo: &Photo) -> Result<()> {
        self.invalidate(Path::new(&photo.path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThumbnailConfig;
    use tempfile::tempdir;

    fn write_test_image(path: &Path) {
        let img = image::RgbImage::from_pixel(64, 48, image::Rgb([120, 20, 200]));
        img.save(path).unwrap();
    }

    fn manager(cache: &Path) -> ThumbnailManager {
        ThumbnailManager::new(&ThumbnailConfig {
            path: cache.to_path_buf(),
            size: 16,
        })
    }

    #[test]
    fn generate_caches_and_reuses() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("photo.png");
        write_test_image(&original);
        let mgr = manager(&dir.path().join("cache"));

        assert!(mgr.get_cached_path(&original).is_none());
        let first = mgr.generate(&original).unwrap();
        assert!(first.exists());
        assert_eq!(mgr.generate(&original).unwrap(), first);
        assert_eq!(mgr.get_cached_path(&original).unwrap(), first);
    }

    #[test]
    fn invalidate_replaces_the_cache_entry() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("photo.png");
        write_test_image(&original);
        let mgr = manager(&dir.path().join("cache"));

        let cached = mgr.generate(&original).unwrap();
        let regenerated = mgr.invalidate(&original).unwrap();
        assert_eq!(cached, regenerated);
        assert!(regenerated.exists());
    }

    #[test]
    fn remove_clears_the_entry() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("photo.png");
        write_test_image(&original);
        let mgr = manager(&dir.path().join("cache"));

        let cached = mgr.generate(&original).unwrap();
        mgr.remove(&original).unwrap();
        assert!(!cached.exists());
        // Removing again is a no-op.
        mgr.remove(&original).unwrap();
    }
}
