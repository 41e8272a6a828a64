//! Photo work persistence: path-keyed JSON records with overwrite semantics.

use std::path::Path;

use anyhow::{Context, Result};

use super::Database;
use crate::work::{PhotoWork, WorkStore};

impl Database {
    /// The persisted work for a photo, or an empty record if none exists.
    pub fn get_photo_work(&self, path: &Path) -> Result<PhotoWork> {
        let path_str = path.to_string_lossy();
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            "SELECT work FROM photo_work WHERE photo_path = ?",
            [path_str.as_ref()],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(json) => serde_json::from_str(&json)
                .with_context(|| format!("invalid photo work record for {}", path.display())),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(PhotoWork::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the full record, replacing whatever was stored before.
    pub fn set_photo_work(&self, path: &Path, work: &PhotoWork) -> Result<()> {
        let path_str = path.to_string_lossy();
        let json = serde_json::to_string(work)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO photo_work (photo_path, work, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(photo_path)
            DO UPDATE SET work = excluded.work, updated_at = CURRENT_TIMESTAMP
            "#,
            rusqlite::params![path_str.as_ref(), json],
        )?;
        Ok(())
    }
}

impl WorkStore for Database {
    async fn fetch_photo_work(&self, path: &Path) -> Result<PhotoWork> {
        self.get_photo_work(path)
    }

    async fn store_photo_work(&self, path: &Path, work: &PhotoWork) -> Result<()> {
        self.set_photo_work(path, work)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_record_resolves_to_empty_default() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();

        let work = db.get_photo_work(Path::new("/photos/none.jpg")).unwrap();
        assert!(work.is_empty());
    }

    #[test]
    fn overwrites_existing_record() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let path = Path::new("/photos/a.jpg");

        let mut work = PhotoWork::default();
        work.set_edit("crop", json!({"left": 3}));
        work.flagged = true;
        db.set_photo_work(path, &work).unwrap();
        assert_eq!(db.get_photo_work(path).unwrap(), work);

        // Full overwrite: the crop edit must not survive a store of a record
        // without it.
        let mut replacement = PhotoWork::default();
        replacement.set_edit("rotate", json!(90));
        db.set_photo_work(path, &replacement).unwrap();

        let loaded = db.get_photo_work(path).unwrap();
        assert_eq!(loaded, replacement);
        assert!(!loaded.edits.contains_key("crop"));
        assert!(!loaded.flagged);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        {
            let conn = db.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO photo_work (photo_path, work) VALUES (?, ?)",
                rusqlite::params!["/photos/bad.jpg", "{not json"],
            )
            .unwrap();
        }
        assert!(db.get_photo_work(Path::new("/photos/bad.jpg")).is_err());
    }
}
