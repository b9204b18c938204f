//! SQLite submission store
//!
//! Append-only persistence for priced submissions:
//! - Connection pooling
//! - Automatic migrations
//! - WAL mode for concurrent reads/writes

use crate::error::AppError;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// A submission about to be persisted. Inputs plus computed outputs; the
/// store assigns the id and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub process: String,
    pub supplier: String,
    pub material_thickness: f64,
    pub foam_thickness: f64,
    pub bladder_type: String,
    pub panel_config: Option<i64>,
    pub quantity: i64,
    pub base_per_unit_usd: f64,
    pub total_usd: f64,
    pub currency: Option<String>,
    pub converted_total: Option<f64>,
}

/// A persisted submission row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Submission {
    pub id: i64,
    pub created_at: String,
    pub process: String,
    pub supplier: String,
    pub material_thickness: f64,
    pub foam_thickness: f64,
    pub bladder_type: String,
    pub panel_config: Option<i64>,
    pub quantity: i64,
    pub base_per_unit_usd: f64,
    pub total_usd: f64,
    pub currency: Option<String>,
    pub converted_total: Option<f64>,
}

/// Submission store handle
///
/// Manages the SQLite connection pool. Only append and list operations exist;
/// rows are never mutated.
pub struct SubmissionStore {
    pool: SqlitePool,
}

impl SubmissionStore {
    /// Open (creating if missing) the database and run migrations.
    ///
    /// # Arguments
    ///
    /// * `database_url` - SQLite database URL (e.g., "sqlite:./data/costing.db")
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .context("Failed to connect to submissions database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run submissions database migrations")?;

        tracing::info!("Submissions database ready");
        Ok(Self { pool })
    }

    /// Insert one submission. Atomic per record; returns the assigned id,
    /// which SQLite keeps monotonic and never reuses for AUTOINCREMENT keys.
    pub async fn append(&self, submission: &NewSubmission) -> Result<i64, AppError> {
        let created_at = Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string();

        let result = sqlx::query(
            "INSERT INTO submissions (
                created_at, process, supplier, material_thickness, foam_thickness,
                bladder_type, panel_config, quantity,
                base_per_unit_usd, total_usd, currency, converted_total
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&created_at)
        .bind(&submission.process)
        .bind(&submission.supplier)
        .bind(submission.material_thickness)
        .bind(submission.foam_thickness)
        .bind(&submission.bladder_type)
        .bind(submission.panel_config)
        .bind(submission.quantity)
        .bind(submission.base_per_unit_usd)
        .bind(submission.total_usd)
        .bind(&submission.currency)
        .bind(submission.converted_total)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// All submissions, most recent first.
    pub async fn list_all(&self) -> Result<Vec<Submission>, AppError> {
        let rows = sqlx::query_as::<_, Submission>(
            "SELECT id, created_at, process, supplier, material_thickness, foam_thickness,
                    bladder_type, panel_config, quantity,
                    base_per_unit_usd, total_usd, currency, converted_total
             FROM submissions
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
