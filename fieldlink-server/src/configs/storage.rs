use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Error, SqlitePool};

use crate::configs::schema::SchemaManager;
use crate::configs::settings::Database;

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(database: Database, schema_manager: SchemaManager) -> Result<Self, Error> {
        let mut options = SqlitePoolOptions::new()
            .min_connections(1) // in memory db might drop connection when 0
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(30));

        if database.url.contains(":memory:") {
            // every connection to `:memory:` opens a separate database
            options = options.max_connections(1).idle_timeout(None).max_lifetime(None);
        }

        let pool = options.connect(&database.url).await?;

        Self::create_schema(&pool, &schema_manager, &database).await?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_schema(pool: &SqlitePool, schema: &SchemaManager, database: &Database) -> Result<(), Error> {
        if database.clean_start {
            for statement in schema.dispose_schema() {
                sqlx::raw_sql(&statement).execute(pool).await?;
            }

            tracing::warn!("perform a clean boot: clean and recreate schema");
        }

        for statement in schema.create_schema() {
            sqlx::raw_sql(&statement).execute(pool).await?;
        }

        tracing::debug!("schema ready at {}", database.url);

        Ok(())
    }
}
