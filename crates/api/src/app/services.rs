use std::sync::Arc;

use anyhow::Context;

use bankapi_auth::{TokenConfig, TokenService};
use bankapi_infra::{
    AccountStore, AppConfig, InMemoryAccountStore, PostgresAccountStore, StoreBackend,
};

/// Shared handler dependencies, cloned into every request via `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn AccountStore>,
    pub tokens: TokenService,
}

impl AppServices {
    pub fn new(store: Arc<dyn AccountStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// In-memory store, e.g. for tests and local runs.
    pub fn in_memory(tokens: TokenService) -> Self {
        Self::new(Arc::new(InMemoryAccountStore::new()), tokens)
    }
}

impl core::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppServices")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

pub fn token_service(config: &AppConfig) -> TokenService {
    let ttl = config.token_ttl_secs.and_then(|secs| {
        let ttl = i64::try_from(secs).ok().and_then(chrono::Duration::try_seconds);
        if ttl.is_none() {
            tracing::warn!(secs, "TOKEN_TTL_SECS out of range; issuing non-expiring tokens");
        }
        ttl
    });

    TokenService::new(TokenConfig {
        signing_key: config.jwt_secret.clone(),
        ttl,
    })
}

/// Wire the configured store backend and token service.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let tokens = token_service(config);

    let store: Arc<dyn AccountStore> = match &config.store {
        StoreBackend::InMemory => Arc::new(InMemoryAccountStore::new()),
        StoreBackend::Postgres(db) => {
            let store = PostgresAccountStore::connect(db)
                .await
                .context("failed to connect to DATABASE_URL")?;
            store
                .init()
                .await
                .context("failed to create accounts table")?;
            Arc::new(store)
        }
    };

    Ok(AppServices::new(store, tokens))
}
