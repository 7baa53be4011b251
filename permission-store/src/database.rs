use async_trait::async_trait;
use permissions::{PermissionError, PermissionRepository, PermissionRule, RuleAction};
use sqlx::{migrate::MigrateDatabase, Pool, Row, Sqlite, SqlitePool};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{Result, StoreError};

/// Configuration for the permission store
#[derive(Debug, Clone)]
pub struct PermissionStoreConfig {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connection_timeout: u64,
}

impl Default for PermissionStoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/permissions/permissions.db"),
            max_connections: 5,
            connection_timeout: 30,
        }
    }
}

/// SQLite-backed storage for per-user permission rules.
///
/// Rules are read back in insertion order; the ability builder depends on
/// that ordering for override precedence. Rule mutations do not touch the
/// permission cache — callers that change a user's rules should invalidate
/// that user's cache entry themselves.
pub struct PermissionDatabase {
    pool: Pool<Sqlite>,
    #[allow(dead_code)]
    config: PermissionStoreConfig,
}

impl PermissionDatabase {
    /// Initialize the permission database
    pub async fn new(config: PermissionStoreConfig) -> Result<Self> {
        // Ensure the directory exists
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Create database URL
        let db_url = format!("sqlite:{}", config.database_path.display());

        // Create database if it doesn't exist
        if !Sqlite::database_exists(&db_url).await.unwrap_or(false) {
            info!(
                "Creating permission database at: {}",
                config.database_path.display()
            );
            Sqlite::create_database(&db_url).await.map_err(|e| {
                StoreError::Initialization(format!("Failed to create database: {}", e))
            })?;
        }

        // Create connection pool
        let pool = SqlitePool::connect_with(
            sqlx::sqlite::SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true),
        )
        .await?;

        let db = Self { pool, config };

        // Run migrations
        db.run_migrations().await?;

        info!("Permission database initialized successfully");

        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<()> {
        info!("Running permission database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS permission_rules (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                action TEXT NOT NULL,
                subject TEXT NOT NULL,
                condition TEXT,
                inverted INTEGER NOT NULL DEFAULT 0,
                reason TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_permission_rules_user_id ON permission_rules (user_id)",
        )
        .execute(&self.pool)
        .await?;

        info!("Permission database migrations completed");

        Ok(())
    }

    /// Get the database pool for external use
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Store a new permission rule
    pub async fn create_rule(&self, rule: &PermissionRule) -> Result<()> {
        debug!(
            "Creating permission rule {} for user_id={}",
            rule.id, rule.user_id
        );

        sqlx::query(
            r#"
            INSERT INTO permission_rules (id, user_id, action, subject, condition, inverted, reason)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&rule.id)
        .bind(&rule.user_id)
        .bind(rule.action.as_str())
        .bind(&rule.subject)
        .bind(&rule.condition)
        .bind(rule.inverted)
        .bind(&rule.reason)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a single rule by id
    pub async fn get_rule(&self, rule_id: &str) -> Result<PermissionRule> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, action, subject, condition, inverted, reason
            FROM permission_rules
            WHERE id = ?
            "#,
        )
        .bind(rule_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::RuleNotFound(rule_id.to_string()))?;

        rule_from_row(&row)
    }

    /// Update an existing rule in place
    pub async fn update_rule(&self, rule: &PermissionRule) -> Result<()> {
        debug!("Updating permission rule {}", rule.id);

        let result = sqlx::query(
            r#"
            UPDATE permission_rules
            SET action = ?, subject = ?, condition = ?, inverted = ?, reason = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(rule.action.as_str())
        .bind(&rule.subject)
        .bind(&rule.condition)
        .bind(rule.inverted)
        .bind(&rule.reason)
        .bind(&rule.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RuleNotFound(rule.id.clone()));
        }

        Ok(())
    }

    /// Delete a rule by id. Returns whether a rule was removed.
    pub async fn delete_rule(&self, rule_id: &str) -> Result<bool> {
        debug!("Deleting permission rule {}", rule_id);

        let result = sqlx::query("DELETE FROM permission_rules WHERE id = ?")
            .bind(rule_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List every rule belonging to a user, in insertion order.
    pub async fn list_user_rules(&self, user_id: &str) -> Result<Vec<PermissionRule>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, action, subject, condition, inverted, reason
            FROM permission_rules
            WHERE user_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut rules = Vec::with_capacity(rows.len());
        for row in &rows {
            rules.push(rule_from_row(row)?);
        }

        debug!("Loaded {} rules for user_id={}", rules.len(), user_id);

        Ok(rules)
    }
}

fn rule_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<PermissionRule> {
    let action_raw: String = row.try_get("action")?;
    let action = RuleAction::from_str(&action_raw)
        .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

    Ok(PermissionRule {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        action,
        subject: row.try_get("subject")?,
        condition: row.try_get("condition")?,
        inverted: row.try_get("inverted")?,
        reason: row.try_get("reason")?,
    })
}

#[async_trait]
impl PermissionRepository for PermissionDatabase {
    async fn find_user_permissions(
        &self,
        user_id: &str,
    ) -> std::result::Result<Vec<PermissionRule>, PermissionError> {
        self.list_user_rules(user_id)
            .await
            .map_err(PermissionError::from)
    }
}
