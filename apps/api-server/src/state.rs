//! Application state - shared across all handlers.

use std::sync::Arc;

use agora_core::ports::{PostRepository, TokenService, UserRepository, VoteStore};
use agora_core::{FeedService, PostService, RetryPolicy, VoteService};
use agora_infra::{InMemoryStore, JwtTokenService};

#[cfg(feature = "postgres")]
use agora_infra::{
    DatabaseConnections, PostgresPostRepository, PostgresUserRepository, PostgresVoteStore,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub feed: FeedService,
    pub posts: PostService,
    pub votes: VoteService,
    pub tokens: Arc<dyn TokenService>,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                match DatabaseConnections::init(db_config).await {
                    Ok(connections) => {
                        let conn = Arc::new(connections);
                        let mut state = Self::from_stores(
                            Arc::new(PostgresPostRepository::new(conn.main.clone())),
                            Arc::new(PostgresUserRepository::new(conn.main.clone())),
                            Arc::new(PostgresVoteStore::new(conn.main.clone())),
                            config.vote_retry.clone(),
                            tokens,
                        );
                        state.db = Some(conn);
                        tracing::info!("Application state initialized (postgres)");
                        return state;
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory store");

        let store = InMemoryStore::new();
        seed_demo_user(&store).await;
        let state = Self::in_memory(store, config.vote_retry.clone(), tokens);
        tracing::info!("Application state initialized (in-memory)");
        state
    }

    /// Wire the services over explicit store handles.
    pub fn from_stores(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        ledger: Arc<dyn VoteStore>,
        vote_retry: RetryPolicy,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            feed: FeedService::new(posts.clone()),
            posts: PostService::new(posts, users, ledger.clone()),
            votes: VoteService::new(ledger, vote_retry),
            tokens,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// Serve every port from one in-memory store.
    pub fn in_memory(
        store: InMemoryStore,
        vote_retry: RetryPolicy,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        let store = Arc::new(store);
        Self::from_stores(store.clone(), store.clone(), store, vote_retry, tokens)
    }

    /// Name of the backing store, for the health endpoint.
    pub fn store_kind(&self) -> &'static str {
        #[cfg(feature = "postgres")]
        {
            if self.db.is_some() {
                return "postgres";
            }
        }
        "in-memory"
    }

    /// Whether the backing store answers. The in-memory store always does.
    pub async fn store_reachable(&self) -> bool {
        #[cfg(feature = "postgres")]
        {
            if let Some(db) = &self.db {
                return match db.ping().await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("Database ping failed: {}", e);
                        false
                    }
                };
            }
        }
        true
    }
}

/// Users are provisioned upstream; without a database there is nobody to
/// author posts, so the first id gets a placeholder account.
async fn seed_demo_user(store: &InMemoryStore) {
    match store.insert_user("demo", "demo@agora.local").await {
        Ok(user) => tracing::warn!(user_id = user.id, "Seeded in-memory demo user"),
        Err(e) => tracing::error!("Failed to seed demo user: {}", e),
    }
}
