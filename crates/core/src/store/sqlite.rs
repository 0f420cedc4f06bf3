//! SQLite-backed user and task stores.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::info;

use super::{
    ImageStatistics, ImageTask, NewImageStatistics, NewImageTask, NewUser, StoreError, TaskStore,
    User, UserStore,
};

fn open(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| StoreError::Database(e.to_string()))?;
    Ok(conn)
}

fn open_in_memory() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| StoreError::Database(e.to_string()))?;
    Ok(conn)
}

/// A timestamp that fails to parse is row corruption; surfacing it keeps
/// the creation ordering the queries rely on trustworthy.
fn parse_timestamp(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    )
}

/// SQLite-backed user store.
pub struct SqliteUserStore {
    conn: Mutex<Connection>,
}

impl SqliteUserStore {
    /// Create a new store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let created_at_str: String = row.get(5)?;
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            password_hash: row.get(4)?,
            created_at: parse_timestamp(&created_at_str)?,
        })
    }
}

const USER_COLUMNS: &str = "id, email, first_name, last_name, password_hash, created_at";

impl UserStore for SqliteUserStore {
    fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (id, email, first_name, last_name, password_hash, created_at) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                id,
                new.email,
                new.first_name,
                new.last_name,
                new.password_hash,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::Conflict(format!("email already registered: {}", new.email))
            } else {
                StoreError::Database(e.to_string())
            }
        })?;

        info!(user_id = %id, "created user");

        Ok(User {
            id,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            password_hash: new.password_hash,
            created_at: now,
        })
    }

    fn get_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
            params![id],
            Self::row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Database(e.to_string())),
        }
    }

    fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"),
            params![email],
            Self::row_to_user,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Database(e.to_string())),
        }
    }
}

/// SQLite-backed task store.
pub struct SqliteTaskStore {
    conn: Mutex<Connection>,
}

impl SqliteTaskStore {
    /// Create a new store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS image_tasks (
                id TEXT PRIMARY KEY,
                job_id TEXT NOT NULL,
                storage_key TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_image_tasks_job_id ON image_tasks(job_id);
            CREATE INDEX IF NOT EXISTS idx_image_tasks_owner_id ON image_tasks(owner_id);

            CREATE TABLE IF NOT EXISTS image_statistics (
                id TEXT PRIMARY KEY,
                task_id TEXT NOT NULL REFERENCES image_tasks(id) ON DELETE CASCADE,
                width INTEGER NOT NULL,
                height INTEGER NOT NULL,
                size_bytes INTEGER NOT NULL,
                processing_time REAL NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_image_statistics_task_id ON image_statistics(task_id);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<ImageTask> {
        let created_at_str: String = row.get(4)?;
        Ok(ImageTask {
            id: row.get(0)?,
            job_id: row.get(1)?,
            storage_key: row.get(2)?,
            owner_id: row.get(3)?,
            created_at: parse_timestamp(&created_at_str)?,
        })
    }

    fn row_to_statistics(row: &rusqlite::Row) -> rusqlite::Result<ImageStatistics> {
        Ok(ImageStatistics {
            id: row.get(0)?,
            task_id: row.get(1)?,
            width: row.get(2)?,
            height: row.get(3)?,
            size_bytes: row.get(4)?,
            processing_time: row.get(5)?,
        })
    }
}

const TASK_COLUMNS: &str = "id, job_id, storage_key, owner_id, created_at";
const STATS_COLUMNS: &str = "id, task_id, width, height, size_bytes, processing_time";

impl TaskStore for SqliteTaskStore {
    fn create_task(&self, new: NewImageTask) -> Result<ImageTask, StoreError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO image_tasks (id, job_id, storage_key, owner_id, created_at) VALUES (?, ?, ?, ?, ?)",
            params![id, new.job_id, new.storage_key, new.owner_id, now.to_rfc3339()],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(ImageTask {
            id,
            job_id: new.job_id,
            storage_key: new.storage_key,
            owner_id: new.owner_id,
            created_at: now,
        })
    }

    fn create_statistics(&self, new: NewImageStatistics) -> Result<ImageStatistics, StoreError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO image_statistics (id, task_id, width, height, size_bytes, processing_time) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                id,
                new.task_id,
                new.width,
                new.height,
                new.size_bytes,
                new.processing_time,
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::Conflict(format!("no task row for statistics: {}", new.task_id))
            } else {
                StoreError::Database(e.to_string())
            }
        })?;

        Ok(ImageStatistics {
            id,
            task_id: new.task_id,
            width: new.width,
            height: new.height,
            size_bytes: new.size_bytes,
            processing_time: new.processing_time,
        })
    }

    fn tasks_by_job(&self, job_id: &str) -> Result<Vec<ImageTask>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM image_tasks WHERE job_id = ? ORDER BY created_at ASC"
            ))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![job_id], Self::row_to_task)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn tasks_by_owner(&self, owner_id: &str) -> Result<Vec<ImageTask>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM image_tasks WHERE owner_id = ? ORDER BY created_at ASC"
            ))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![owner_id], Self::row_to_task)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn statistics_for_task(&self, task_id: &str) -> Result<Option<ImageStatistics>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            &format!("SELECT {STATS_COLUMNS} FROM image_statistics WHERE task_id = ?"),
            params![task_id],
            Self::row_to_statistics,
        );

        match result {
            Ok(stats) => Ok(Some(stats)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Database(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_store() -> SqliteUserStore {
        SqliteUserStore::in_memory().unwrap()
    }

    fn task_store() -> SqliteTaskStore {
        SqliteTaskStore::in_memory().unwrap()
    }

    fn test_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password_hash: "salt$hash".to_string(),
        }
    }

    fn test_task(job_id: &str, key: &str, owner: &str) -> NewImageTask {
        NewImageTask {
            job_id: job_id.to_string(),
            storage_key: key.to_string(),
            owner_id: owner.to_string(),
        }
    }

    #[test]
    fn test_create_and_get_user() {
        let store = user_store();
        let created = store.create(test_user("a@example.com")).unwrap();
        assert!(!created.id.is_empty());

        let by_id = store.get_by_id(&created.id).unwrap().unwrap();
        assert_eq!(by_id.email, "a@example.com");

        let by_email = store.get_by_email("a@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
    }

    #[test]
    fn test_get_nonexistent_user() {
        let store = user_store();
        assert!(store.get_by_id("nope").unwrap().is_none());
        assert!(store.get_by_email("nope@example.com").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_conflicts() {
        let store = user_store();
        store.create(test_user("a@example.com")).unwrap();
        let result = store.create(test_user("a@example.com"));
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[test]
    fn test_create_task_and_fetch_by_job() {
        let store = task_store();
        store
            .create_task(test_task("job-1", "cat_original.jpg", "user-a"))
            .unwrap();
        store
            .create_task(test_task("job-1", "cat_rotated.jpg", "user-a"))
            .unwrap();
        store
            .create_task(test_task("job-2", "dog_original.png", "user-b"))
            .unwrap();

        let tasks = store.tasks_by_job("job-1").unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.owner_id == "user-a"));
    }

    #[test]
    fn test_tasks_by_owner_ordered() {
        let store = task_store();
        for i in 0..3 {
            store
                .create_task(test_task(
                    &format!("job-{i}"),
                    &format!("img{i}_original.jpg"),
                    "user-a",
                ))
                .unwrap();
        }
        store
            .create_task(test_task("job-x", "other_original.jpg", "user-b"))
            .unwrap();

        let tasks = store.tasks_by_owner("user-a").unwrap();
        assert_eq!(tasks.len(), 3);
        for window in tasks.windows(2) {
            assert!(window[0].created_at <= window[1].created_at);
        }
    }

    #[test]
    fn test_tasks_by_job_empty() {
        let store = task_store();
        assert!(store.tasks_by_job("missing").unwrap().is_empty());
    }

    #[test]
    fn test_statistics_roundtrip() {
        let store = task_store();
        let task = store
            .create_task(test_task("job-1", "cat_original.jpg", "user-a"))
            .unwrap();

        let stats = store
            .create_statistics(NewImageStatistics {
                task_id: task.id.clone(),
                width: 640,
                height: 480,
                size_bytes: 12_345,
                processing_time: 0.42,
            })
            .unwrap();

        let fetched = store.statistics_for_task(&task.id).unwrap().unwrap();
        assert_eq!(fetched.id, stats.id);
        assert_eq!(fetched.width, 640);
        assert_eq!(fetched.height, 480);
        assert_eq!(fetched.size_bytes, 12_345);
        assert!((fetched.processing_time - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn test_statistics_require_task_row() {
        let store = task_store();
        let result = store.create_statistics(NewImageStatistics {
            task_id: "missing".to_string(),
            width: 1,
            height: 1,
            size_bytes: 1,
            processing_time: 0.0,
        });
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[test]
    fn test_file_based_stores_share_database() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("darkroom.db");

        let users = SqliteUserStore::new(&db_path).unwrap();
        let tasks = SqliteTaskStore::new(&db_path).unwrap();

        let user = users.create(test_user("a@example.com")).unwrap();
        tasks
            .create_task(test_task("job-1", "cat_original.jpg", &user.id))
            .unwrap();

        assert!(db_path.exists());
        assert_eq!(tasks.tasks_by_owner(&user.id).unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_timestamp_surfaces_as_error() {
        let store = task_store();
        store
            .conn
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO image_tasks (id, job_id, storage_key, owner_id, created_at) VALUES (?, ?, ?, ?, ?)",
                params!["task-1", "job-1", "cat_original.jpg", "user-a", "not-a-timestamp"],
            )
            .unwrap();

        let result = store.tasks_by_job("job-1");
        assert!(matches!(result, Err(StoreError::Database(_))));
    }
}
