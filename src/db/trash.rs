//! Trash workflow over the denormalized `trashed` marker.

use anyhow::Result;

use super::Database;

#[derive(Debug, Clone)]
pub struct TrashedPhoto {
    pub id: i64,
    pub path: String,
    pub filename: String,
    pub trashed_at: Option<String>,
}

impl Database {
    /// Set or clear the trashed marker for a set of photos. Trashing stamps
    /// `trashed_at`; restoring clears it.
    pub fn set_photos_trashed(&self, ids: &[i64], trashed: bool) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = if trashed {
            format!(
                "UPDATE photos SET trashed = 1, trashed_at = CURRENT_TIMESTAMP \
                 WHERE id IN ({placeholders})"
            )
        } else {
            format!(
                "UPDATE photos SET trashed = 0, trashed_at = NULL WHERE id IN ({placeholders})"
            )
        };
        let conn = self.conn.lock().unwrap();
        conn.execute(&sql, rusqlite::params_from_iter(ids.iter()))?;
        Ok(())
    }

    pub fn get_trashed_photos(&self) -> Result<Vec<TrashedPhoto>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, path, filename, trashed_at FROM photos
            WHERE trashed = 1
            ORDER BY trashed_at DESC, id DESC
            "#,
        )?;
        let photos = stmt
            .query_map([], |row| {
                Ok(TrashedPhoto {
                    id: row.get(0)?,
                    path: row.get(1)?,
                    filename: row.get(2)?,
                    trashed_at: row.get(3)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(photos)
    }

    /// Permanently delete every trashed photo along with its work record and
    /// tag links. Returns the deleted master paths so callers can drop any
    /// cached thumbnails.
    pub fn empty_trash(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT path FROM photos WHERE trashed = 1")?;
        let paths: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);

        conn.execute(
            "DELETE FROM photo_work WHERE photo_path IN (SELECT path FROM photos WHERE trashed = 1)",
            [],
        )?;
        conn.execute(
            "DELETE FROM photo_tags WHERE photo_id IN (SELECT id FROM photos WHERE trashed = 1)",
            [],
        )?;
        conn.execute("DELETE FROM photos WHERE trashed = 1", [])?;
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LibraryFilter;
    use crate::work::PhotoWork;
    use std::path::Path;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    #[test]
    fn trash_and_restore_roundtrip() {
        let db = test_db();
        let id = db
            .insert_basic_photo("/photos/a.jpg", "a.jpg", "/photos", 10, None)
            .unwrap();

        db.set_photos_trashed(&[id], true).unwrap();
        let trashed = db.get_trashed_photos().unwrap();
        assert_eq!(trashed.len(), 1);
        assert!(trashed[0].trashed_at.is_some());
        assert!(db.query_sections(&LibraryFilter::All).unwrap().is_empty());

        db.set_photos_trashed(&[id], false).unwrap();
        assert!(db.get_trashed_photos().unwrap().is_empty());
        let photo = db.get_photo_by_id(id).unwrap().unwrap();
        assert!(!photo.trashed);
    }

    #[test]
    fn empty_trash_deletes_rows_and_work_records() {
        let db = test_db();
        let keep = db
            .insert_basic_photo("/photos/keep.jpg", "keep.jpg", "/photos", 10, None)
            .unwrap();
        let gone = db
            .insert_basic_photo("/photos/gone.jpg", "gone.jpg", "/photos", 10, None)
            .unwrap();
        let mut work = PhotoWork::default();
        work.flagged = true;
        db.set_photo_work(Path::new("/photos/gone.jpg"), &work)
            .unwrap();
        db.set_photos_trashed(&[gone], true).unwrap();

        let deleted = db.empty_trash().unwrap();
        assert_eq!(deleted, vec!["/photos/gone.jpg".to_string()]);
        assert!(db.get_photo_by_id(gone).unwrap().is_none());
        assert!(db.get_photo_by_id(keep).unwrap().is_some());
        // The orphaned work record went with the row.
        assert!(db
            .get_photo_work(Path::new("/photos/gone.jpg"))
            .unwrap()
            .is_empty());
    }
}
