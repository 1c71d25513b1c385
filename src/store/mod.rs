use anyhow::Result;
use async_trait::async_trait;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePool, Row, Sqlite};

pub mod state;

/// The persisted collections. Each maps to one document table; everything
/// else the app tracks (roster assignments, notifications, regulations)
/// lives in memory only and reseeds on restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Branches,
    Users,
    ShiftRecords,
    LeaveRequests,
}

impl Collection {
    fn table(self) -> &'static str {
        match self {
            Collection::Branches => "branches",
            Collection::Users => "users",
            Collection::ShiftRecords => "shift_records",
            Collection::LeaveRequests => "leave_requests",
        }
    }
}

/// Durable document storage behind the in-memory working set. The app only
/// ever fetches whole collections and upserts documents by id, so the
/// store surface is deliberately that narrow.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<serde_json::Value>>;
    async fn upsert_many(
        &self,
        collection: Collection,
        documents: &[(String, serde_json::Value)],
    ) -> Result<()>;
    async fn delete(&self, collection: Collection, id: &str) -> Result<()>;
}

pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        log::info!("Creating database {}", database_url);
        Sqlite::create_database(database_url).await?;
    }

    let pool = SqlitePool::connect(database_url).await?;

    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// SQLite-backed document store: one row per document, JSON in the `data`
/// column, upserts keyed on `id`.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<serde_json::Value>> {
        let query = format!("SELECT data FROM {} ORDER BY id", collection.table());
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let data: String = row.try_get("data")?;
            documents.push(serde_json::from_str(&data)?);
        }
        Ok(documents)
    }

    async fn upsert_many(
        &self,
        collection: Collection,
        documents: &[(String, serde_json::Value)],
    ) -> Result<()> {
        let query = format!(
            "INSERT INTO {} (id, data) VALUES (?, ?) \
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
            collection.table()
        );
        let mut tx = self.pool.begin().await?;
        for (id, document) in documents {
            sqlx::query(&query)
                .bind(id)
                .bind(document.to_string())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let query = format!("DELETE FROM {} WHERE id = ?", collection.table());
        sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(())
    }
}
