//! Resilient token acquisition
//!
//! Nothing useful can happen without a token, so acquisition retries without
//! bound. The first attempt reuses whatever session the identity endpoint
//! already holds; every attempt after a failure asks for a refreshed session
//! instead, since a stale session is the most common reason the first
//! attempt fails.

use std::future::Future;
use std::time::Duration;

use grid_api::{AccessToken, SessionMode};

/// Retry `request` until it yields a token.
///
/// `request` is invoked with [`SessionMode::Fresh`] on the first attempt and
/// [`SessionMode::Refresh`] on every attempt after a failure. Failures are
/// logged and followed by one `retry_interval` sleep; this function only
/// returns on success.
pub async fn acquire_token<F, Fut>(mut request: F, retry_interval: Duration) -> AccessToken
where
    F: FnMut(SessionMode) -> Fut,
    Fut: Future<Output = grid_api::Result<AccessToken>>,
{
    let mut mode = SessionMode::Fresh;
    let mut attempt: u32 = 1;
    loop {
        match request(mode).await {
            Ok(token) => {
                tracing::info!(
                    attempt,
                    user = token.user.as_deref().unwrap_or("<unknown>"),
                    expires_on = %token.expires_on,
                    "acquired token"
                );
                return token;
            }
            Err(e) => {
                tracing::error!(attempt, error = %e, "token acquisition failed, will retry");
                mode = SessionMode::Refresh;
                attempt += 1;
                tokio::time::sleep(retry_interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use grid_api::ApiError;
    use std::sync::{Arc, Mutex};

    fn token() -> AccessToken {
        AccessToken {
            token: "tok".into(),
            expires_on: Utc::now(),
            user: Some("ops@example.test".into()),
        }
    }

    #[tokio::test]
    async fn test_first_attempt_success_uses_fresh_session() {
        let modes = Arc::new(Mutex::new(Vec::new()));
        let seen = modes.clone();
        let acquired = acquire_token(
            move |mode| {
                seen.lock().unwrap().push(mode);
                std::future::ready(Ok(token()))
            },
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(acquired.token, "tok");
        assert_eq!(*modes.lock().unwrap(), vec![SessionMode::Fresh]);
    }

    #[tokio::test]
    async fn test_switches_to_refresh_after_first_failure() {
        let modes = Arc::new(Mutex::new(Vec::new()));
        let seen = modes.clone();
        let mut calls = 0;
        let acquired = acquire_token(
            move |mode| {
                seen.lock().unwrap().push(mode);
                calls += 1;
                std::future::ready(if calls < 3 {
                    Err(ApiError::ServerError {
                        message: "identity endpoint busy".into(),
                    })
                } else {
                    Ok(token())
                })
            },
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(acquired.user.as_deref(), Some("ops@example.test"));
        assert_eq!(
            *modes.lock().unwrap(),
            vec![SessionMode::Fresh, SessionMode::Refresh, SessionMode::Refresh]
        );
    }
}
