use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode};
use std::cell::RefCell;
use std::path::PathBuf;

use super::data::{Photo, Project};
use crate::error::{Result, SnapError};

/// The PhotoStore manages the SQLite catalog database.
/// It stores project records and the encoded photos belonging to them,
/// and is the single place where series ordering (`seq`) is assigned.
///
/// The connection lives behind a `RefCell` so that multi-statement
/// operations (cascade delete, compute-seq-and-insert) can run inside a
/// transaction from `&self` methods. The core is single-threaded, so the
/// only discipline required is not holding a borrow across a call back
/// into the store.
pub struct PhotoStore {
    conn: RefCell<Connection>,
    db_path: Option<PathBuf>,
}

impl PhotoStore {
    /// Open (or create) the catalog in the user's data directory:
    /// - Linux: ~/.local/share/edgy-snapper/edgy_snapper.db
    /// - macOS: ~/Library/Application Support/edgy-snapper/edgy_snapper.db
    /// - Windows: %APPDATA%\edgy-snapper\edgy_snapper.db
    pub fn open() -> Result<Self> {
        Self::open_at(Self::default_db_path())
    }

    /// Open (or create) the catalog at an explicit path.
    pub fn open_at(db_path: PathBuf) -> Result<Self> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .expect("Failed to create application data directory");
        }

        let conn = Connection::open(&db_path)?;
        println!("📁 Database initialized at: {}", db_path.display());

        let store = PhotoStore {
            conn: RefCell::new(conn),
            db_path: Some(db_path),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Open a throwaway in-memory catalog. Used by tests and useful for
    /// ephemeral sessions.
    pub fn open_in_memory() -> Result<Self> {
        let store = PhotoStore {
            conn: RefCell::new(Connection::open_in_memory()?),
            db_path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Get the path where the database is stored by default
    fn default_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .expect("Could not determine user data directory");

        path.push("edgy-snapper");
        path.push("edgy_snapper.db");
        path
    }

    /// Initialize the database schema.
    /// Creates all necessary tables and indexes if they don't exist.
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.borrow();

        // Cascade delete relies on SQLite actually enforcing foreign keys
        conn.execute_batch("PRAGMA foreign_keys = ON")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS projects (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                name              TEXT NOT NULL UNIQUE,
                created_at        INTEGER NOT NULL,
                last_modified_at  INTEGER NOT NULL,
                last_seq          INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        // Photos carry their encoded bytes directly; `seq` is the series
        // position, drawn from the owning project's `last_seq` counter.
        // The counter only ever grows, so a deleted photo's seq is never
        // handed out again
        conn.execute(
            "CREATE TABLE IF NOT EXISTS photos (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id    INTEGER NOT NULL
                              REFERENCES projects(id) ON DELETE CASCADE,
                data          BLOB NOT NULL,
                width         INTEGER NOT NULL,
                height        INTEGER NOT NULL,
                front_camera  INTEGER NOT NULL DEFAULT 0,
                seq           INTEGER NOT NULL,
                captured_at   INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_photos_project
             ON photos(project_id, seq)",
            [],
        )?;

        Ok(())
    }

    /// Get the path to the database file (None for in-memory catalogs)
    pub fn path(&self) -> Option<&PathBuf> {
        self.db_path.as_ref()
    }

    // ========== Projects ==========

    /// Create a new project. Fails with `DuplicateName` if a project with
    /// the exact same name already exists.
    pub fn create_project(&self, name: &str) -> Result<i64> {
        let now = Utc::now().timestamp_millis();
        let conn = self.conn.borrow();

        let result = conn.execute(
            "INSERT INTO projects (name, created_at, last_modified_at)
             VALUES (?1, ?2, ?2)",
            params![name, now],
        );

        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(SnapError::DuplicateName(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get all projects. No ordering is guaranteed here; callers sort.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT id, name, created_at, last_modified_at FROM projects",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Project {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: millis_to_datetime(row.get(2)?),
                last_modified_at: millis_to_datetime(row.get(3)?),
            })
        })?;

        let mut projects = Vec::new();
        for project in rows {
            projects.push(project?);
        }
        Ok(projects)
    }

    /// Fetch a single project by id.
    pub fn get_project(&self, id: i64) -> Result<Project> {
        let conn = self.conn.borrow();
        conn.query_row(
            "SELECT id, name, created_at, last_modified_at
             FROM projects WHERE id = ?1",
            [id],
            |row| {
                Ok(Project {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: millis_to_datetime(row.get(2)?),
                    last_modified_at: millis_to_datetime(row.get(3)?),
                })
            },
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => SnapError::NotFound("project"),
            other => other.into(),
        })
    }

    /// Delete a project and all of its photos as one atomic unit.
    /// Fails with `NotFound` (store unchanged) if the project does not exist.
    pub fn delete_project(&self, id: i64) -> Result<()> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;

        // The FK cascade would cover this, but deleting explicitly keeps
        // the operation correct even if a future connection forgets the
        // foreign_keys pragma
        tx.execute("DELETE FROM photos WHERE project_id = ?1", [id])?;
        let changed = tx.execute("DELETE FROM projects WHERE id = ?1", [id])?;

        if changed == 0 {
            // Dropping the transaction rolls back the photo delete
            return Err(SnapError::NotFound("project"));
        }

        tx.commit()?;
        Ok(())
    }

    /// Get a count of projects in the catalog
    pub fn project_count(&self) -> Result<i64> {
        let conn = self.conn.borrow();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;
        Ok(count)
    }

    // ========== Photos ==========

    /// Append a photo to a project's series.
    ///
    /// The next `seq` comes from the project's `last_seq` counter,
    /// bumped and read inside a single transaction, so two back-to-back
    /// adds can never collide and a seq freed by deletion is never
    /// reassigned. The owning project's `last_modified_at` is touched
    /// in the same statement.
    pub fn add_photo(
        &self,
        project_id: i64,
        bytes: &[u8],
        width: u32,
        height: u32,
        from_front_camera: bool,
        captured_at: DateTime<Utc>,
    ) -> Result<i64> {
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;

        // Doubles as the existence check: zero rows touched means the
        // project id is stale
        let touched = tx.execute(
            "UPDATE projects
             SET last_modified_at = ?1, last_seq = last_seq + 1
             WHERE id = ?2",
            params![Utc::now().timestamp_millis(), project_id],
        )?;
        if touched == 0 {
            return Err(SnapError::NotFound("project"));
        }

        let seq: i64 = tx.query_row(
            "SELECT last_seq FROM projects WHERE id = ?1",
            [project_id],
            |row| row.get(0),
        )?;

        tx.execute(
            "INSERT INTO photos (project_id, data, width, height, front_camera, seq, captured_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                project_id,
                bytes,
                width,
                height,
                from_front_camera,
                seq,
                captured_at.timestamp_millis(),
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;
        Ok(id)
    }

    /// Get all photos for a project, sorted ascending by series position.
    pub fn list_photos(&self, project_id: i64) -> Result<Vec<Photo>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT id, project_id, data, width, height, front_camera, seq, captured_at
             FROM photos WHERE project_id = ?1 ORDER BY seq ASC",
        )?;

        let rows = stmt.query_map([project_id], |row| {
            Ok(Photo {
                id: row.get(0)?,
                project_id: row.get(1)?,
                image_bytes: row.get(2)?,
                width: row.get(3)?,
                height: row.get(4)?,
                from_front_camera: row.get(5)?,
                seq: row.get(6)?,
                captured_at: millis_to_datetime(row.get(7)?),
            })
        })?;

        let mut photos = Vec::new();
        for photo in rows {
            photos.push(photo?);
        }
        Ok(photos)
    }

    /// Delete exactly one photo. Remaining `seq` values are not renumbered.
    pub fn delete_photo(&self, id: i64) -> Result<()> {
        let conn = self.conn.borrow();
        let changed = conn.execute("DELETE FROM photos WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(SnapError::NotFound("photo"));
        }
        Ok(())
    }

    /// Get a count of photos in one project
    pub fn photo_count(&self, project_id: i64) -> Result<i64> {
        let conn = self.conn.borrow();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM photos WHERE project_id = ?1",
            [project_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::UNIX_EPOCH)
}

impl std::fmt::Debug for PhotoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}
