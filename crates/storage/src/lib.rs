use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{migrate::MigrateError, sqlite::SqlitePoolOptions, SqlitePool};
use thiserror::Error;
use uuid::Uuid;

use empdir_core::types::EmployeeDocument;

/// Top-level database handle that owns the SQLite connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Establishes a new SQLite connection pool for the provided connection string.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(StorageError::Connect)?;

        apply_pragmas(&pool).await?;

        Ok(Self { pool })
    }

    /// Applies migrations located under `migrations/`.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;
        Ok(())
    }

    /// Returns a handle to operate on employee documents.
    pub fn employees(&self) -> EmployeeRepository {
        EmployeeRepository {
            pool: self.pool.clone(),
        }
    }

    /// Exposes the inner pool when lower level access is required.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn apply_pragmas(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::query("PRAGMA foreign_keys = ON;")
        .execute(pool)
        .await
        .map_err(StorageError::Pragma)?;

    sqlx::query("PRAGMA journal_mode = WAL;")
        .fetch_one(pool)
        .await
        .map_err(StorageError::Pragma)?;

    sqlx::query("PRAGMA synchronous = NORMAL;")
        .execute(pool)
        .await
        .map_err(StorageError::Pragma)?;

    sqlx::query("PRAGMA busy_timeout = 5000;")
        .execute(pool)
        .await
        .map_err(StorageError::Pragma)?;

    Ok(())
}

/// General storage level errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to sqlite: {0}")]
    Connect(sqlx::Error),
    #[error("failed to apply pragma: {0}")]
    Pragma(sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migration(MigrateError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository for the `employees` document table.
///
/// Documents are persisted as JSON in `doc_json`; the email is mirrored into
/// its own uniquely indexed column so duplicate emails are rejected
/// atomically on write and keyed lookups stay indexed.
#[derive(Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    /// Loads the document with the given id, if present.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<EmployeeDocument>, EmployeeStoreError> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            "SELECT id, doc_json FROM employees WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(EmployeeRow::into_domain).transpose()
    }

    /// Loads the document with the given email, if present.
    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<EmployeeDocument>, EmployeeStoreError> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            "SELECT id, doc_json FROM employees WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(EmployeeRow::into_domain).transpose()
    }

    /// Lists every stored document ordered by creation time.
    pub async fn find_all(&self) -> Result<Vec<EmployeeDocument>, EmployeeStoreError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            "SELECT id, doc_json FROM employees ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EmployeeRow::into_domain).collect()
    }

    /// Saves a document, assigning a fresh id when none is set.
    ///
    /// An existing id replaces the stored document in place; the email
    /// uniqueness index rejects a write that would duplicate another
    /// record's email.
    pub async fn save(
        &self,
        document: EmployeeDocument,
        now: DateTime<Utc>,
    ) -> Result<EmployeeDocument, EmployeeStoreError> {
        let mut document = document;
        if document.id.is_none() {
            document.id = Some(Uuid::new_v4().to_string());
        }
        let doc_json = serde_json::to_string(&document)?;
        let timestamp = to_rfc3339(now);

        let result = sqlx::query(
            "INSERT INTO employees (id, email, doc_json, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE \
             SET email = excluded.email, \
                 doc_json = excluded.doc_json, \
                 updated_at = excluded.updated_at",
        )
        .bind(document.id.as_deref())
        .bind(&document.email)
        .bind(&doc_json)
        .bind(&timestamp)
        .bind(&timestamp)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(document),
            Err(sqlx::Error::Database(db_err)) => {
                if db_err.code().as_deref() == Some("2067") {
                    Err(EmployeeStoreError::DuplicateEmail)
                } else {
                    Err(EmployeeStoreError::Database(sqlx::Error::Database(db_err)))
                }
            }
            Err(err) => Err(EmployeeStoreError::Database(err)),
        }
    }

    /// Deletes the stored document backing the provided record.
    pub async fn delete(&self, document: &EmployeeDocument) -> Result<(), EmployeeStoreError> {
        let Some(id) = document.id.as_deref() else {
            return Err(EmployeeStoreError::MissingId);
        };

        sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Columns needed to rebuild a domain document from the `employees` table.
#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    id: String,
    doc_json: String,
}

impl EmployeeRow {
    /// Decodes the JSON body into a domain document. The id column is
    /// authoritative over whatever the body carries.
    fn into_domain(self) -> Result<EmployeeDocument, EmployeeStoreError> {
        let mut document: EmployeeDocument = serde_json::from_str(&self.doc_json)?;
        document.id = Some(self.id);
        Ok(document)
    }
}

/// Errors that can occur while reading or mutating employee documents.
#[derive(Debug, Error)]
pub enum EmployeeStoreError {
    #[error("employee with the same email already exists")]
    DuplicateEmail,
    #[error("employee document has no id")]
    MissingId,
    #[error("failed to decode employee document: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for EmployeeStoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

fn to_rfc3339(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use empdir_core::types::{Address, Phone};

    async fn setup_db() -> Database {
        let url = format!(
            "sqlite:file:empdir-test-{}?mode=memory&cache=shared",
            Uuid::new_v4()
        );
        let db = Database::connect(&url).await.expect("connect");
        db.run_migrations().await.expect("migrations");
        db
    }

    fn document(email: &str) -> EmployeeDocument {
        EmployeeDocument {
            id: None,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            address: Some(Address {
                street: "123 Main St".to_string(),
                city: "New York".to_string(),
                state: "NY".to_string(),
                zip: "10001".to_string(),
            }),
            phones: Some(vec![Phone {
                phone_type: "home".to_string(),
                number: "123-456-7890".to_string(),
            }]),
        }
    }

    #[tokio::test]
    async fn save_assigns_an_id_when_absent() {
        let repo = setup_db().await.employees();

        let saved = repo
            .save(document("john.doe@example.com"), Utc::now())
            .await
            .expect("save succeeds");

        let id = saved.id.expect("id assigned");
        assert!(!id.is_empty());

        let loaded = repo
            .find_by_id(&id)
            .await
            .expect("lookup succeeds")
            .expect("document present");
        assert_eq!(loaded.email, "john.doe@example.com");
    }

    #[tokio::test]
    async fn save_rejects_duplicate_email() {
        let repo = setup_db().await.employees();

        repo.save(document("john.doe@example.com"), Utc::now())
            .await
            .expect("first save succeeds");

        let outcome = repo.save(document("john.doe@example.com"), Utc::now()).await;
        assert!(matches!(outcome, Err(EmployeeStoreError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn save_with_existing_id_replaces_the_document() {
        let repo = setup_db().await.employees();

        let saved = repo
            .save(document("john.doe@example.com"), Utc::now())
            .await
            .expect("save succeeds");

        let mut updated = saved.clone();
        updated.first_name = "Johnny".to_string();
        updated.email = "johnny.doe@example.com".to_string();
        repo.save(updated, Utc::now()).await.expect("replace succeeds");

        let loaded = repo
            .find_by_id(saved.id.as_deref().expect("id assigned"))
            .await
            .expect("lookup succeeds")
            .expect("document present");
        assert_eq!(loaded.first_name, "Johnny");
        assert_eq!(loaded.email, "johnny.doe@example.com");

        let all = repo.find_all().await.expect("list succeeds");
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn find_by_email_uses_the_indexed_column() {
        let repo = setup_db().await.employees();

        repo.save(document("jane.smith@example.com"), Utc::now())
            .await
            .expect("save succeeds");

        let found = repo
            .find_by_email("jane.smith@example.com")
            .await
            .expect("lookup succeeds");
        assert!(found.is_some());

        let missing = repo
            .find_by_email("nobody@example.com")
            .await
            .expect("lookup succeeds");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn find_all_preserves_insertion_order() {
        let repo = setup_db().await.employees();

        let first = Utc::now();
        let second = first + chrono::Duration::milliseconds(5);
        repo.save(document("a@example.com"), first)
            .await
            .expect("save succeeds");
        repo.save(document("b@example.com"), second)
            .await
            .expect("save succeeds");

        let all = repo.find_all().await.expect("list succeeds");
        let emails: Vec<&str> = all.iter().map(|doc| doc.email.as_str()).collect();
        assert_eq!(emails, vec!["a@example.com", "b@example.com"]);
    }

    #[tokio::test]
    async fn delete_removes_the_document() {
        let repo = setup_db().await.employees();

        let saved = repo
            .save(document("john.doe@example.com"), Utc::now())
            .await
            .expect("save succeeds");

        repo.delete(&saved).await.expect("delete succeeds");

        let loaded = repo
            .find_by_id(saved.id.as_deref().expect("id assigned"))
            .await
            .expect("lookup succeeds");
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn delete_requires_an_id() {
        let repo = setup_db().await.employees();

        let outcome = repo.delete(&document("john.doe@example.com")).await;
        assert!(matches!(outcome, Err(EmployeeStoreError::MissingId)));
    }

    #[tokio::test]
    async fn migrations_apply_on_a_file_database() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empdir.db");
        let url = format!("sqlite:{}?mode=rwc", path.display());

        let db = Database::connect(&url).await.expect("connect");
        db.run_migrations().await.expect("migrations");

        let tables: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'employees'",
        )
        .fetch_one(db.pool())
        .await
        .expect("fetch tables");
        assert_eq!(tables.0, 1);
    }
}
