//! Connection setup and schema bootstrapping.
//!
//! ```rust,ignore
//! let db = DatabaseInitializer::connect(DatabaseConfig::from_env()?).await?;
//! db.initialize([db.table_for(user::Entity)]).await?;
//! let conn = db.connection().clone();
//! ```

use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
    sea_query::{Table, TableCreateStatement},
};

use crate::config::DatabaseConfig;

pub struct DatabaseInitializer {
    config: DatabaseConfig,
    db: DatabaseConnection,
}

impl DatabaseInitializer {
    /// Open the connection pool described by `config`.
    ///
    /// # Errors
    /// Propagates connection failures.
    pub async fn connect(config: DatabaseConfig) -> Result<Self, DbErr> {
        let db = Database::connect(config.connect_options()).await?;
        tracing::info!(
            backend = ?db.get_database_backend(),
            test_mode = config.test_mode,
            "Created database connection"
        );
        Ok(Self { config, db })
    }

    #[must_use]
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Run `SELECT 1`; failures are logged, not returned.
    pub async fn check_connection(&self) -> bool {
        match self.db.execute_unprepared("SELECT 1").await {
            Ok(_) => {
                tracing::info!("Database connection successful");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Database connection failed");
                false
            }
        }
    }

    /// `CREATE TABLE IF NOT EXISTS` statement derived from `entity`.
    #[must_use]
    pub fn table_for<E: EntityTrait>(&self, entity: E) -> TableCreateStatement {
        let backend = self.db.get_database_backend();
        let mut stmt = Schema::new(backend).create_table_from_entity(entity);
        stmt.if_not_exists();
        stmt
    }

    /// # Errors
    /// Propagates database errors.
    pub async fn create_table<E: EntityTrait>(&self, entity: E) -> Result<(), DbErr> {
        let stmt = self.table_for(entity);
        self.create_tables([stmt]).await
    }

    /// # Errors
    /// Stops at the first statement that fails.
    pub async fn create_tables(
        &self,
        tables: impl IntoIterator<Item = TableCreateStatement>,
    ) -> Result<(), DbErr> {
        let backend = self.db.get_database_backend();
        let mut created = 0_usize;
        for stmt in tables {
            self.db.execute(backend.build(&stmt)).await?;
            created += 1;
        }
        tracing::info!(tables = created, "Database tables created successfully");
        Ok(())
    }

    /// `DROP TABLE IF EXISTS` for `entity`.
    ///
    /// # Errors
    /// Propagates database errors.
    pub async fn drop_table<E: EntityTrait>(&self, entity: E) -> Result<(), DbErr> {
        let backend = self.db.get_database_backend();
        let stmt = Table::drop().table(entity).if_exists().to_owned();
        self.db.execute(backend.build(&stmt)).await?;
        tracing::info!(table = entity.table_name(), "Database table dropped");
        Ok(())
    }

    /// Check the connection, then create `tables`.
    ///
    /// # Errors
    /// `DbErr::Conn` when the connection check fails, otherwise whatever
    /// table creation returns.
    pub async fn initialize(
        &self,
        tables: impl IntoIterator<Item = TableCreateStatement>,
    ) -> Result<(), DbErr> {
        tracing::info!("Initializing database...");
        if !self.check_connection().await {
            return Err(DbErr::Conn(sea_orm::RuntimeErr::Internal(
                "Failed to connect to database".to_string(),
            )));
        }
        self.create_tables(tables).await?;
        tracing::info!("Database initialization completed");
        Ok(())
    }

    /// # Errors
    /// Propagates errors from closing the pool.
    pub async fn close(self) -> Result<(), DbErr> {
        self.db.close().await?;
        tracing::info!("Database connections closed");
        Ok(())
    }
}
