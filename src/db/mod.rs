//! SQLite persistence layer.

mod schema;
pub mod photos;
pub mod tags;
pub mod trash;
pub mod work;

use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use rusqlite::Connection;

pub use photos::{DateCount, LibraryFilter, Photo, PhotoSection};
pub use tags::Tag;
pub use trash::TrashedPhoto;

/// Handle to the library database. The connection sits behind a mutex so the
/// handle can be shared across tasks; statements never hold the lock across
/// an await point.
pub struct Database {
    pub(crate) conn: Mutex<Connection>,
}

impl Database {
    /// Open the database file, creating parent directories as needed.
    /// [`Database::initialize`] must run before first use.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database for tests and ephemeral sessions.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(schema::SCHEMA)?;
        for migration in schema::MIGRATIONS {
            // Additive migrations; an error means the column already exists.
            let _ = conn.execute(migration, []);
        }
        Ok(())
    }
}
