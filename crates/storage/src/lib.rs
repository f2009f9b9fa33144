use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{Collection, RecordId};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

/// One row of a record table; `detail` is the `quantity` or `note` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: RecordId,
    pub name: String,
    pub detail: String,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // every pooled connection to `:memory:` would open its own empty database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn list_records(&self, collection: Collection) -> Result<Vec<StoredRecord>> {
        let sql = format!(
            "SELECT id, name, {detail} FROM {table} ORDER BY id ASC",
            detail = collection.detail_field(),
            table = collection.as_str(),
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("failed to list {collection}"))?;
        Ok(rows
            .into_iter()
            .map(|r| StoredRecord {
                id: RecordId(r.get::<i64, _>(0)),
                name: r.get::<String, _>(1),
                detail: r.get::<String, _>(2),
            })
            .collect())
    }

    pub async fn insert_record(
        &self,
        collection: Collection,
        name: &str,
        detail: &str,
    ) -> Result<RecordId> {
        let sql = format!(
            "INSERT INTO {table} (name, {detail}) VALUES (?, ?) RETURNING id",
            table = collection.as_str(),
            detail = collection.detail_field(),
        );
        let rec = sqlx::query(&sql)
            .bind(name)
            .bind(detail)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("failed to insert into {collection}"))?;
        Ok(RecordId(rec.get::<i64, _>(0)))
    }

    /// Overwrites whichever fields are `Some`. Returns `false` when no row has `id`.
    pub async fn update_record(
        &self,
        collection: Collection,
        id: RecordId,
        name: Option<&str>,
        detail: Option<&str>,
    ) -> Result<bool> {
        let sql = format!(
            "UPDATE {table} SET name = COALESCE(?, name), {detail} = COALESCE(?, {detail}) WHERE id = ?",
            table = collection.as_str(),
            detail = collection.detail_field(),
        );
        let result = sqlx::query(&sql)
            .bind(name)
            .bind(detail)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to update {collection} {id}"))?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `false` when no row has `id`.
    pub async fn delete_record(&self, collection: Collection, id: RecordId) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", collection.as_str());
        let result = sqlx::query(&sql)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete {collection} {id}"))?;
        Ok(result.rows_affected() > 0)
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.contains(":memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
