//! SQLite-backed append-only tables

use std::path::{Path, PathBuf};

use sales_data_core::{Column, ColumnData, DataType, RecordBatch, Value};
use serde_json::{Map, Value as JsonValue};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column as _, ConnectOptions, Connection, Row, TypeInfo, ValueRef};

use crate::error::{Error, Result};

/// Name of the row identifier column assigned on append
pub const ID_COLUMN: &str = "id";

/// Check that `name` is a plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier(name.to_string()))
    }
}

fn sql_type(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Boolean | DataType::Int64 => "INTEGER",
        DataType::Float64 => "REAL",
        DataType::String | DataType::Date => "TEXT",
    }
}

/// Outcome of one append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendSummary {
    /// Id given to the first appended row
    pub first_id: i64,

    /// Number of rows appended
    pub rows: usize,
}

/// Bounds of one page read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// Inclusive lower bound on `created_at`
    pub start: String,

    /// Inclusive upper bound on `created_at`
    pub end: String,

    /// Only rows with an id strictly greater than this are returned
    pub cursor: i64,

    /// Maximum number of rows
    pub limit: u32,
}

/// A file-backed SQLite database holding append-only tables
///
/// Every operation opens its own connection. The file and its parent
/// directories are created on first use.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Store backed by the database file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self) -> Result<SqliteConnection> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let created = !tokio::fs::try_exists(&self.path).await.unwrap_or(false);
        let connection = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
            .connect()
            .await?;
        if created {
            tracing::info!(path = %self.path.display(), "database file created");
        }
        Ok(connection)
    }

    async fn exists(connection: &mut SqliteConnection, table: &str) -> Result<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table)
                .fetch_optional(&mut *connection)
                .await?;
        Ok(found.is_some())
    }

    async fn count(connection: &mut SqliteConnection, table: &str) -> Result<i64> {
        if !Self::exists(connection, table).await? {
            return Ok(0);
        }
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{table}\""))
            .fetch_one(&mut *connection)
            .await?;
        Ok(count)
    }

    /// Whether `table` exists
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        validate_identifier(table)?;
        let mut connection = self.connect().await?;
        Self::exists(&mut connection, table).await
    }

    /// Number of rows in `table`, 0 if the table does not exist
    pub async fn count_rows(&self, table: &str) -> Result<i64> {
        validate_identifier(table)?;
        let mut connection = self.connect().await?;
        Self::count(&mut connection, table).await
    }

    /// Append `batch` to `table` inside one transaction
    ///
    /// An `id` column is prepended with values `count + 1 + position`, where
    /// `count` is the number of rows already in the table. The table is created
    /// from the batch's columns if it does not exist.
    pub async fn append(&self, table: &str, batch: &RecordBatch) -> Result<AppendSummary> {
        validate_identifier(table)?;
        for name in batch.schema().names() {
            validate_identifier(name)?;
        }
        if batch.schema().contains(ID_COLUMN) {
            return Err(Error::ReservedColumn(ID_COLUMN.to_string()));
        }

        let mut connection = self.connect().await?;
        let mut tx = connection.begin().await?;

        let offset = Self::count(&mut *tx, table).await?;
        let rows = batch.num_rows();
        let ids = (0..rows)
            .map(|position| i64::try_from(position).map(|p| Some(offset + 1 + p)))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| sales_data_core::Error::InvalidArgument(e.to_string()))?;
        let batch = batch
            .clone()
            .insert_column(0, Column::new(ID_COLUMN, ColumnData::Int64(ids)))?;

        let definitions = batch
            .schema()
            .fields()
            .iter()
            .map(|f| format!("\"{}\" {}", f.name(), sql_type(*f.data_type())))
            .collect::<Vec<_>>()
            .join(", ");
        sqlx::query(&format!("CREATE TABLE IF NOT EXISTS \"{table}\" ({definitions})"))
            .execute(&mut *tx)
            .await?;

        let names = batch
            .schema()
            .names()
            .iter()
            .map(|n| format!("\"{n}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; batch.num_columns()].join(", ");
        let insert = format!("INSERT INTO \"{table}\" ({names}) VALUES ({placeholders})");

        for row in 0..rows {
            let mut query = sqlx::query(&insert);
            for value in batch.row(row)? {
                query = match value {
                    Value::Null => query.bind(None::<String>),
                    Value::Boolean(v) => query.bind(v),
                    Value::Int64(v) => query.bind(v),
                    Value::Float64(v) => query.bind(v),
                    Value::String(v) => query.bind(v),
                    Value::Date(v) => query.bind(v.format("%Y-%m-%d").to_string()),
                };
            }
            query.execute(&mut *tx).await?;
        }

        tx.commit().await?;
        tracing::debug!(table, rows, first_id = offset + 1, "appended rows");

        Ok(AppendSummary {
            first_id: offset + 1,
            rows,
        })
    }

    /// Read one page of `table` ordered by `(id, created_at)`
    pub async fn query_page(
        &self,
        table: &str,
        page: &PageQuery,
    ) -> Result<Vec<Map<String, JsonValue>>> {
        validate_identifier(table)?;
        let mut connection = self.connect().await?;

        let sql = format!(
            "SELECT * FROM \"{table}\" \
             WHERE created_at >= ? AND created_at <= ? AND {ID_COLUMN} > ? \
             ORDER BY {ID_COLUMN}, created_at LIMIT ?"
        );
        let rows = sqlx::query(&sql)
            .bind(page.start.as_str())
            .bind(page.end.as_str())
            .bind(page.cursor)
            .bind(page.limit)
            .fetch_all(&mut connection)
            .await?;

        rows.iter().map(row_to_json).collect()
    }
}

fn row_to_json(row: &SqliteRow) -> Result<Map<String, JsonValue>> {
    let mut record = Map::new();

    for (index, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            JsonValue::Null
        } else {
            let type_name = raw.type_info().name().to_string();
            match type_name.as_str() {
                "INTEGER" => JsonValue::from(row.try_get::<i64, _>(index)?),
                "REAL" => serde_json::Number::from_f64(row.try_get::<f64, _>(index)?)
                    .map_or(JsonValue::Null, JsonValue::Number),
                _ => JsonValue::String(row.try_get::<String, _>(index)?),
            }
        };
        record.insert(column.name().to_string(), value);
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use test_case::test_case;

    fn batch(products: &[&str], created_at: &str) -> RecordBatch {
        let rows = products.len();
        RecordBatch::from_columns(vec![
            Column::new(
                "product",
                ColumnData::String(products.iter().map(|p| Some((*p).to_string())).collect()),
            ),
            Column::constant("amount", &Value::Float64(1.5), rows),
            Column::constant(
                "sale_date",
                &Value::Date(NaiveDate::from_ymd_opt(2023, 9, 5).unwrap()),
                rows,
            ),
            Column::constant("created_at", &Value::String(created_at.into()), rows),
        ])
        .unwrap()
    }

    fn everything(limit: u32) -> PageQuery {
        PageQuery {
            start: "0000".into(),
            end: "9999".into(),
            cursor: 0,
            limit,
        }
    }

    #[test_case("sales", true)]
    #[test_case("_dq_2", true)]
    #[test_case("2sales", false)]
    #[test_case("sales; DROP TABLE x", false)]
    #[test_case("", false)]
    fn test_validate_identifier(name: &str, valid: bool) {
        assert_eq!(validate_identifier(name).is_ok(), valid);
    }

    #[tokio::test]
    async fn test_append_creates_file_and_continues_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db").join("pipeline.db"));

        assert_eq!(store.count_rows("sales").await.unwrap(), 0);
        assert!(store.path().exists());

        let first = store
            .append("sales", &batch(&["a", "b", "c"], "2024-01-01 00:00:00.000000"))
            .await
            .unwrap();
        assert_eq!(first, AppendSummary { first_id: 1, rows: 3 });

        let second = store
            .append("sales", &batch(&["d", "e"], "2024-01-01 00:00:00.000000"))
            .await
            .unwrap();
        assert_eq!(second.first_id, 4);
        assert_eq!(store.count_rows("sales").await.unwrap(), 5);

        let rows = store.query_page("sales", &everything(10)).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(rows[3]["product"], "d");
        assert_eq!(rows[0]["sale_date"], "2023-09-05");
        assert_eq!(rows[0]["amount"], 1.5);
        assert_eq!(rows[0].keys().next().map(String::as_str), Some("id"));
    }

    #[tokio::test]
    async fn test_query_page_honours_cursor_and_dates() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("pipeline.db"));
        store.append("sales", &batch(&["old"], "2023-12-31 23:59:59.000000")).await.unwrap();
        store
            .append("sales", &batch(&["a", "b", "c"], "2024-01-01 10:00:00.000000"))
            .await
            .unwrap();

        let page = PageQuery {
            start: "2024-01-01 00:00:00.000000".into(),
            end: "2024-01-02 00:00:00.000000".into(),
            cursor: 0,
            limit: 2,
        };
        let first = store.query_page("sales", &page).await.unwrap();
        assert_eq!(first.iter().map(|r| r["id"].as_i64().unwrap()).collect::<Vec<_>>(), vec![2, 3]);

        let next = PageQuery { cursor: 3, ..page };
        let second = store.query_page("sales", &next).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0]["product"], "c");
    }

    #[tokio::test]
    async fn test_rejects_bad_names_and_missing_tables() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("pipeline.db"));

        assert!(matches!(
            store.append("bad name", &batch(&["a"], "x")).await,
            Err(Error::InvalidIdentifier(_))
        ));
        assert!(matches!(
            store.query_page("missing", &everything(5)).await,
            Err(Error::Sql(_))
        ));
        assert!(!store.table_exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_batch_with_id_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("pipeline.db"));
        let batch =
            RecordBatch::from_columns(vec![Column::constant("id", &Value::Int64(1), 1)]).unwrap();

        assert!(matches!(store.append("t", &batch).await, Err(Error::ReservedColumn(_))));
    }
}
