use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::models::{Project, ProjectFields};

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(config.database_url())?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(self.get_pool()).await?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, description, deadline, person, client, contact,
                   achievements, price, finished
            FROM projects
            ORDER BY id ASC
            "#,
        )
        .fetch_all(self.get_pool())
        .await
    }

    pub async fn create_project(&self, fields: &ProjectFields) -> Result<Project, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (title, description, deadline, person, client, contact,
                                  achievements, price, finished)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, title, description, deadline, person, client, contact,
                      achievements, price, finished
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.deadline)
        .bind(&fields.person)
        .bind(&fields.client)
        .bind(&fields.contact)
        .bind(fields.achievements)
        .bind(fields.price)
        .bind(fields.finished)
        .fetch_one(self.get_pool())
        .await
    }

    /// Overwrite every field of a project. `None` when no row has `id`.
    pub async fn update_project(&self, id: i64, fields: &ProjectFields) -> Result<Option<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET title = $1, description = $2, deadline = $3, person = $4, client = $5,
                contact = $6, achievements = $7, price = $8, finished = $9
            WHERE id = $10
            RETURNING id, title, description, deadline, person, client, contact,
                      achievements, price, finished
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.deadline)
        .bind(&fields.person)
        .bind(&fields.client)
        .bind(&fields.contact)
        .bind(fields.achievements)
        .bind(fields.price)
        .bind(fields.finished)
        .bind(id)
        .fetch_optional(self.get_pool())
        .await
    }

    /// Returns the number of rows removed, 0 when `id` was already gone
    pub async fn delete_project(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(result.rows_affected())
    }

    /// A private in-memory store. One connection, kept for the pool's life,
    /// since every new in-memory connection would open an empty database.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }
}

/// Initialize the database connection pool and bring the schema up to date
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config).await?;
    db.migrate().await?;

    Ok(db)
}
