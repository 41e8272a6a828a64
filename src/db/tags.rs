//! User tags.

use anyhow::Result;
use rusqlite::params;

use super::Database;

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub photo_count: i64,
}

impl Database {
    pub fn get_all_tags(&self) -> Result<Vec<Tag>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT t.id, t.name, COUNT(pt.photo_id)
            FROM tags t
            LEFT JOIN photo_tags pt ON pt.tag_id = t.id
            GROUP BY t.id
            ORDER BY t.name
            "#,
        )?;
        let tags = stmt
            .query_map([], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    photo_count: row.get(2)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(tags)
    }

    pub fn get_or_create_tag(&self, name: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute("INSERT OR IGNORE INTO tags (name) VALUES (?)", [name])?;
        let id = conn.query_row("SELECT id FROM tags WHERE name = ?", [name], |row| {
            row.get(0)
        })?;
        Ok(id)
    }

    /// Replace the photo's tag set with `names`, creating tags as needed.
    pub fn set_photo_tags(&self, photo_id: i64, names: &[String]) -> Result<()> {
        let mut tag_ids = Vec::with_capacity(names.len());
        for name in names {
            tag_ids.push(self.get_or_create_tag(name)?);
        }

        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM photo_tags WHERE photo_id = ?", [photo_id])?;
        for tag_id in tag_ids {
            conn.execute(
                "INSERT OR IGNORE INTO photo_tags (photo_id, tag_id) VALUES (?, ?)",
                params![photo_id, tag_id],
            )?;
        }
        Ok(())
    }

    pub fn get_photo_tags(&self, photo_id: i64) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT t.name FROM tags t
            JOIN photo_tags pt ON pt.tag_id = t.id
            WHERE pt.photo_id = ?
            ORDER BY t.name
            "#,
        )?;
        let names = stmt
            .query_map([photo_id], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let db = test_db();
        let first = db.get_or_create_tag("vacation").unwrap();
        let second = db.get_or_create_tag("vacation").unwrap();
        assert_eq!(first, second);
        assert_eq!(db.get_all_tags().unwrap().len(), 1);
    }

    #[test]
    fn set_photo_tags_replaces_the_whole_set() {
        let db = test_db();
        let id = db
            .insert_basic_photo("/photos/a.jpg", "a.jpg", "/photos", 10, None)
            .unwrap();

        db.set_photo_tags(id, &["beach".to_string(), "family".to_string()])
            .unwrap();
        assert_eq!(db.get_photo_tags(id).unwrap(), vec!["beach", "family"]);

        db.set_photo_tags(id, &["family".to_string()]).unwrap();
        assert_eq!(db.get_photo_tags(id).unwrap(), vec!["family"]);

        let counts = db.get_all_tags().unwrap();
        let beach = counts.iter().find(|t| t.name == "beach").unwrap();
        assert_eq!(beach.photo_count, 0);
    }
}
