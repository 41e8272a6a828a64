//! Photo records, library filters and section queries.

use anyhow::Result;
use rusqlite::types::Value;

use super::Database;

/// A photo row. `flagged` and `trashed` are denormalized copies of the state
/// the work record and trash workflow maintain, kept on the row so library
/// queries never have to parse work JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Photo {
    pub id: i64,
    pub path: String,
    pub filename: String,
    pub directory: String,
    pub size_bytes: i64,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub taken_at: Option<String>,
    pub modified_at: Option<String>,
    pub imported_at: Option<String>,
    pub flagged: bool,
    pub trashed: bool,
}

/// A run of photos sharing a capture day, newest day first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoSection {
    pub day: String,
    pub photos: Vec<Photo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateCount {
    pub day: String,
    pub count: i64,
}

/// Which slice of the library a view shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LibraryFilter {
    #[default]
    All,
    Flagged,
    Trash,
    Tag(i64),
    Device(String),
    Date(String),
}

impl LibraryFilter {
    /// Whether a photo record still belongs in a view filtered by `self`.
    /// Tag, device and date membership is not derivable from the record
    /// alone, so those filters only enforce the trash axis here.
    pub fn matches(&self, photo: &Photo) -> bool {
        match self {
            LibraryFilter::Trash => photo.trashed,
            LibraryFilter::Flagged => photo.flagged && !photo.trashed,
            _ => !photo.trashed,
        }
    }
}

const PHOTO_COLUMNS: &str = "id, path, filename, directory, size_bytes, width, height, \
     camera_make, camera_model, taken_at, modified_at, imported_at, flagged, trashed";

// Photos with no capture date group under the file or import date.
const SECTION_DAY: &str = "COALESCE(date(taken_at), date(modified_at), date(imported_at), 'unknown')";

fn photo_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Photo> {
    Ok(Photo {
        id: row.get(0)?,
        path: row.get(1)?,
        filename: row.get(2)?,
        directory: row.get(3)?,
        size_bytes: row.get(4)?,
        width: row.get(5)?,
        height: row.get(6)?,
        camera_make: row.get(7)?,
        camera_model: row.get(8)?,
        taken_at: row.get(9)?,
        modified_at: row.get(10)?,
        imported_at: row.get(11)?,
        flagged: row.get::<_, i64>(12)? != 0,
        trashed: row.get::<_, i64>(13)? != 0,
    })
}

impl Database {
    pub fn insert_basic_photo(
        &self,
        path: &str,
        filename: &str,
        directory: &str,
        size_bytes: i64,
        modified_at: Option<&str>,
    ) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO photos (path, filename, directory, size_bytes, modified_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
            rusqlite::params![path, filename, directory, size_bytes, modified_at],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Hook for the scanner: fill in the metadata columns of an existing row.
    pub fn update_photo_metadata(
        &self,
        path: &str,
        taken_at: Option<&str>,
        camera_make: Option<&str>,
        camera_model: Option<&str>,
        width: Option<i64>,
        height: Option<i64>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            UPDATE photos
            SET taken_at = ?, camera_make = ?, camera_model = ?, width = ?, height = ?
            WHERE path = ?
            "#,
            rusqlite::params![taken_at, camera_make, camera_model, width, height, path],
        )?;
        Ok(())
    }

    pub fn photo_exists(&self, path: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM photos WHERE path = ?",
            [path],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn get_photo_by_path(&self, path: &str) -> Result<Option<Photo>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE path = ?");
        let result = conn.query_row(&sql, [path], photo_from_row);
        match result {
            Ok(photo) => Ok(Some(photo)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_photo_by_id(&self, id: i64) -> Result<Option<Photo>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE id = ?");
        let result = conn.query_row(&sql, [id], photo_from_row);
        match result {
            Ok(photo) => Ok(Some(photo)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_photos_by_ids(&self, ids: &[i64]) -> Result<Vec<Photo>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql =
            format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE id IN ({placeholders}) ORDER BY id");
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let photos = stmt
            .query_map(rusqlite::params_from_iter(ids.iter()), photo_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(photos)
    }

    /// Photos matching `filter`, grouped into day sections, newest day first.
    pub fn query_sections(&self, filter: &LibraryFilter) -> Result<Vec<PhotoSection>> {
        let mut params: Vec<Value> = Vec::new();
        let where_clause = match filter {
            LibraryFilter::All => "trashed = 0".to_string(),
            LibraryFilter::Flagged => "flagged = 1 AND trashed = 0".to_string(),
            LibraryFilter::Trash => "trashed = 1".to_string(),
            LibraryFilter::Tag(id) => {
                params.push((*id).into());
                "trashed = 0 AND id IN (SELECT photo_id FROM photo_tags WHERE tag_id = ?)"
                    .to_string()
            }
            LibraryFilter::Device(model) => {
                params.push(model.clone().into());
                "trashed = 0 AND camera_model = ?".to_string()
            }
            LibraryFilter::Date(day) => {
                params.push(day.clone().into());
                format!("trashed = 0 AND {SECTION_DAY} = ?")
            }
        };

        let sql = format!(
            "SELECT {PHOTO_COLUMNS}, {SECTION_DAY} AS day \
             FROM photos WHERE {where_clause} \
             ORDER BY day DESC, taken_at ASC, id ASC"
        );

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params), |row| {
            let photo = photo_from_row(row)?;
            let day: String = row.get(14)?;
            Ok((day, photo))
        })?;

        let mut sections: Vec<PhotoSection> = Vec::new();
        for row in rows {
            let (day, photo) = row?;
            match sections.last_mut() {
                Some(section) if section.day == day => section.photos.push(photo),
                _ => sections.push(PhotoSection {
                    day,
                    photos: vec![photo],
                }),
            }
        }
        Ok(sections)
    }

    /// Distinct camera models seen in the (untrashed) library.
    pub fn query_devices(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT camera_model FROM photos
            WHERE camera_model IS NOT NULL AND trashed = 0
            ORDER BY camera_model
            "#,
        )?;
        let devices = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(devices)
    }

    /// Capture days present in the (untrashed) library with their photo
    /// counts, newest first.
    pub fn query_dates(&self) -> Result<Vec<DateCount>> {
        let sql = format!(
            "SELECT {SECTION_DAY} AS day, COUNT(*) FROM photos \
             WHERE trashed = 0 GROUP BY day ORDER BY day DESC"
        );
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let dates = stmt
            .query_map([], |row| {
                Ok(DateCount {
                    day: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(dates)
    }

    /// Write the denormalized flag column for a set of photos.
    pub fn set_photos_flagged(&self, ids: &[i64], flagged: bool) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("UPDATE photos SET flagged = ? WHERE id IN ({placeholders})");
        let mut params: Vec<Value> = vec![(flagged as i64).into()];
        params.extend(ids.iter().map(|id| Value::from(*id)));
        let conn = self.conn.lock().unwrap();
        conn.execute(&sql, rusqlite::params_from_iter(params))?;
        Ok(())
    }
}
