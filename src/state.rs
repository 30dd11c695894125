use std::sync::Arc;

use anyhow::Context;
use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Client, Database, IndexModel,
};
use tracing::{info, warn};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let client = Client::with_uri_str(&config.mongo_uri)
            .await
            .context("parse mongo connection string")?;
        let db = client.database(&config.database);

        match client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
        {
            Ok(_) => info!("mongodb connected"),
            Err(e) => warn!(error = %e, "mongodb ping failed; continuing"),
        }

        let state = Self { db, config };
        if let Err(e) = state.ensure_indexes().await {
            warn!(error = %e, "index creation failed; continuing");
        }
        Ok(state)
    }

    pub fn from_parts(db: Database, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    /// Unique username, plus the lookup indexes the task list and stats
    /// queries lean on.
    async fn ensure_indexes(&self) -> anyhow::Result<()> {
        let users = self.db.collection::<Document>("users");
        users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                None,
            )
            .await?;

        let tasks = self.db.collection::<Document>("tasks");
        tasks
            .create_index(
                IndexModel::builder().keys(doc! { "user_id": 1 }).build(),
                None,
            )
            .await?;
        tasks
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user_id": 1, "created_at": -1 })
                    .build(),
                None,
            )
            .await?;

        info!("indexes ensured");
        Ok(())
    }

    #[cfg(test)]
    pub async fn fake() -> Self {
        use crate::config::JwtConfig;

        // The driver connects lazily, so no live server is needed here.
        let client = Client::with_uri_str("mongodb://localhost:27017")
            .await
            .expect("lazy client should construct");
        let config = Arc::new(AppConfig {
            mongo_uri: "mongodb://localhost:27017".into(),
            database: "tasknest_test".into(),
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_hours: 24,
            },
        });
        Self::from_parts(client.database("tasknest_test"), config)
    }
}
