use crate::config::ClientConfig;
use crate::fetch::Fetcher;
use crate::repository::{Credentials, ReadingRepository};
use crate::state::LocalDataCache;
use crate::storage::CacheStore;
use tracing::info;

pub fn repository(config: &ClientConfig) -> ReadingRepository {
    let fetcher =
        Fetcher::new(reqwest::Client::new()).with_retry_policy(config.max_retries, config.retry_delay);
    ReadingRepository::new(fetcher, config.api_url.clone())
}

/// Builds the session cache for a signed-in user. Call `initialize` on it next.
pub fn sign_in(config: &ClientConfig, credentials: Credentials) -> LocalDataCache {
    info!(user_id = credentials.user_id(), "starting session");
    LocalDataCache::new(
        repository(config),
        CacheStore::new(config.cache_dir.clone()),
        credentials,
    )
}

pub async fn sign_out(cache: LocalDataCache) -> std::io::Result<()> {
    info!(user_id = cache.credentials().user_id(), "ending session");
    cache.teardown().await
}
