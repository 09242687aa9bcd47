//! OAuth token state for the external music catalog service.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicAuth {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry, milliseconds since the Unix epoch.
    pub expires_at_ms: i64,
    pub user_id: String,
}

impl MusicAuth {
    /// Token is considered fresh if it has more than this much time left.
    pub const EARLY_REFRESH_WINDOW_MS: i64 = 5 * 60 * 1000;

    pub fn needs_refresh(&self, now_ms: i64) -> bool {
        self.expires_at_ms - now_ms <= Self::EARLY_REFRESH_WINDOW_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(expires_at_ms: i64) -> MusicAuth {
        MusicAuth {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            expires_at_ms,
            user_id: "u1".into(),
        }
    }

    #[test]
    fn fresh_token_outside_refresh_window_is_not_refreshed() {
        let now = 1_000_000;
        let a = auth(now + MusicAuth::EARLY_REFRESH_WINDOW_MS + 1);
        assert!(!a.needs_refresh(now));
    }

    #[test]
    fn token_within_refresh_window_is_refreshed() {
        let now = 1_000_000;
        let a = auth(now + MusicAuth::EARLY_REFRESH_WINDOW_MS - 1);
        assert!(a.needs_refresh(now));
    }

    #[test]
    fn expired_token_is_refreshed() {
        let now = 1_000_000;
        let a = auth(now - 1);
        assert!(a.needs_refresh(now));
    }
}
