//! Application state shared across handlers.

use std::sync::Arc;

use atrium_types::User;
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};

/// Keys for signing and verifying locally issued tokens.
pub struct JwtKeys {
    pub(crate) encoding: EncodingKey,
    pub(crate) decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// A stored user record with its password hash.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

impl UserRecord {
    /// The wire-facing snapshot of this user.
    pub fn snapshot(&self) -> User {
        User {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            created_at: self.created_at.clone(),
        }
    }

    /// Verify a cleartext password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

/// In-memory user directory.
///
/// Stands in for a real database; holds the development seed user.
#[derive(Debug)]
pub struct UserDirectory {
    users: Vec<UserRecord>,
}

impl UserDirectory {
    /// Directory holding the seeded development user
    /// (`test@example.com` / `password123`).
    pub fn seeded() -> Result<Self> {
        let hash = bcrypt::hash("password123", bcrypt::DEFAULT_COST)
            .map_err(|e| ServerError::Internal(format!("Failed to hash seed password: {}", e)))?;

        Ok(Self {
            users: vec![UserRecord {
                id: "1".to_string(),
                username: "testuser".to_string(),
                email: "test@example.com".to_string(),
                password_hash: hash,
                created_at: chrono::Utc::now().to_rfc3339(),
            }],
        })
    }

    pub fn find_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.id == id)
    }
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Outbound HTTP client for the proxy routes.
    pub http: reqwest::Client,

    /// User directory for the local auth routes.
    pub users: Arc<UserDirectory>,

    /// Token signing/verification keys.
    pub keys: Arc<JwtKeys>,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let keys = JwtKeys::from_secret(&config.jwt_secret);
        Ok(Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
            users: Arc::new(UserDirectory::seeded()?),
            keys: Arc::new(keys),
        })
    }
}
