//! OAuth access token cache

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Refresh this long before the provider-declared expiry
const EXPIRY_SKEW: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct CachedToken {
    value: String,
    valid_until: Instant,
}

/// Single-slot token cache
///
/// Holding the lock across the refresh keeps concurrent callers from
/// hammering `/oauth/token`; the second caller sees the fresh token.
#[derive(Default)]
pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token, or run `refresh` and cache its result
    ///
    /// `refresh` yields `(token, expires_in_secs)`.
    pub async fn get_or_refresh<F, Fut, E>(&self, refresh: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<(String, u64), E>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_ref() {
            if Instant::now() < cached.valid_until {
                return Ok(cached.value.clone());
            }
        }

        let (value, expires_in) = refresh().await?;
        let ttl = Duration::from_secs(expires_in).saturating_sub(EXPIRY_SKEW);
        *slot = Some(CachedToken {
            value: value.clone(),
            valid_until: Instant::now() + ttl,
        });
        Ok(value)
    }

    /// Drop the cached token (after the API rejected it)
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn caches_until_expiry() {
        let cache = TokenCache::new();
        let calls = &AtomicUsize::new(0);

        for _ in 0..3 {
            let token = cache
                .get_or_refresh(|| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(("tok".to_string(), 3600))
                })
                .await
                .unwrap();
            assert_eq!(token, "tok");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn short_lived_tokens_are_not_reused() {
        let cache = TokenCache::new();
        let calls = &AtomicUsize::new(0);

        // expires_in below the skew → zero ttl
        for _ in 0..2 {
            cache
                .get_or_refresh(|| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(("tok".to_string(), 30))
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refresh() {
        let cache = TokenCache::new();
        let calls = &AtomicUsize::new(0);
        let refresh = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(("tok".to_string(), 3600))
        };

        cache.get_or_refresh(refresh).await.unwrap();
        cache.invalidate().await;
        cache.get_or_refresh(refresh).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_errors_are_not_cached() {
        let cache = TokenCache::new();
        let err = cache
            .get_or_refresh(|| async { Err::<(String, u64), _>("denied") })
            .await;
        assert_eq!(err, Err("denied"));
        let ok = cache
            .get_or_refresh(|| async { Ok::<_, &str>(("tok".to_string(), 3600)) })
            .await;
        assert_eq!(ok, Ok("tok".to_string()));
    }
}
