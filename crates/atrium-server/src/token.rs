//! Locally issued JWT access and refresh tokens.

use jsonwebtoken::{Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};
use crate::state::{JwtKeys, UserRecord};

/// Access token lifetime (1 hour).
pub const ACCESS_TOKEN_TTL_SECS: u64 = 60 * 60;

/// Refresh token lifetime (7 days).
pub const REFRESH_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Claims carried by both token kinds.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    /// Expiry, Unix seconds.
    pub exp: u64,
}

/// Current Unix time in seconds.
pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Sign a token for `user` expiring `ttl_secs` from now.
pub fn issue(keys: &JwtKeys, user: &UserRecord, ttl_secs: u64) -> Result<String> {
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        exp: now_secs() + ttl_secs,
    };

    jsonwebtoken::encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|e| ServerError::Internal(format!("Failed to sign token: {}", e)))
}

/// Verify a token and return its claims. Any failure — bad signature,
/// garbled input, expired — comes back as `None`.
pub fn verify(keys: &JwtKeys, token: &str) -> Option<Claims> {
    jsonwebtoken::decode::<Claims>(token, &keys.decoding, &Validation::default())
        .map(|data| data.claims)
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> UserRecord {
        UserRecord {
            id: "1".to_string(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password_hash: String::new(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let keys = JwtKeys::from_secret("test-secret");
        let token = issue(&keys, &test_user(), ACCESS_TOKEN_TTL_SECS).unwrap();

        let claims = verify(&keys, &token).unwrap();
        assert_eq!(claims.sub, "1");
        assert_eq!(claims.email, "test@example.com");
        assert!(claims.exp > now_secs());
    }

    #[test]
    fn test_garbled_token_is_rejected() {
        let keys = JwtKeys::from_secret("test-secret");
        assert!(verify(&keys, "not-a-jwt").is_none());
        assert!(verify(&keys, "").is_none());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let keys = JwtKeys::from_secret("test-secret");
        let token = issue(&keys, &test_user(), ACCESS_TOKEN_TTL_SECS).unwrap();

        let other = JwtKeys::from_secret("different-secret");
        assert!(verify(&other, &token).is_none());
    }
}
