//! Session-state persistence.
//!
//! The persisted session record is a single shared slot: last writer wins,
//! with no cross-process notification. Rather than reaching into ambient
//! global storage, the auth service is handed a [`SessionStore`]
//! implementation with explicit load/save/clear operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use atrium_types::SessionState;
use tokio::sync::RwLock;

use crate::error::{AuthError, Result};

/// File name of the persisted session record within the data directory.
pub const SESSION_FILE: &str = "session-state.json";

/// Marker file recording that a login has been attempted at least once.
/// Backs the navigation guard's first-visit flag; survives logout.
pub const LOGIN_MARKER_FILE: &str = ".login-attempted";

// ─────────────────────────────────────────────────────────────────────────────
// SessionStore trait
// ─────────────────────────────────────────────────────────────────────────────

/// Repository for the persisted session state.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Load the persisted state. Returns the logged-out state when nothing
    /// has been persisted yet.
    async fn load(&self) -> Result<SessionState>;

    /// Persist a new state, replacing the previous record wholesale.
    async fn save(&self, state: &SessionState) -> Result<()>;

    /// Remove the persisted state.
    async fn clear(&self) -> Result<()>;

    /// Record that a login has been attempted. Not undone by `clear`.
    async fn record_login_attempt(&self) -> Result<()>;

    /// Whether any login attempt has ever been recorded.
    async fn login_attempted(&self) -> bool;
}

/// Shared session store for use across async contexts.
pub type SharedSessionStore = Arc<dyn SessionStore>;

// ─────────────────────────────────────────────────────────────────────────────
// FileSessionStore
// ─────────────────────────────────────────────────────────────────────────────

/// File-backed session store for production use.
///
/// Keeps an in-process cache so repeated loads between writes do not hit
/// the filesystem.
#[derive(Debug)]
pub struct FileSessionStore {
    session_path: PathBuf,
    marker_path: PathBuf,
    cached: Arc<RwLock<Option<SessionState>>>,
}

impl FileSessionStore {
    /// Create a store rooted at the given data directory.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            session_path: data_dir.join(SESSION_FILE),
            marker_path: data_dir.join(LOGIN_MARKER_FILE),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Path of the persisted session record.
    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.session_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AuthError::Storage(format!("Failed to create data directory: {}", e)))?;
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<SessionState> {
        {
            let cache = self.cached.read().await;
            if let Some(state) = cache.as_ref() {
                return Ok(state.clone());
            }
        }

        if !self.session_path.exists() {
            return Ok(SessionState::unauthenticated());
        }

        let content = std::fs::read_to_string(&self.session_path)
            .map_err(|e| AuthError::Storage(format!("Failed to read session file: {}", e)))?;

        let state: SessionState = serde_json::from_str(&content)
            .map_err(|e| AuthError::Serialization(format!("Failed to parse session file: {}", e)))?;

        let mut cache = self.cached.write().await;
        *cache = Some(state.clone());

        Ok(state)
    }

    async fn save(&self, state: &SessionState) -> Result<()> {
        self.ensure_parent()?;

        let json = serde_json::to_string_pretty(state)
            .map_err(|e| AuthError::Serialization(format!("Failed to serialize session: {}", e)))?;

        std::fs::write(&self.session_path, json)
            .map_err(|e| AuthError::Storage(format!("Failed to write session file: {}", e)))?;

        let mut cache = self.cached.write().await;
        *cache = Some(state.clone());

        tracing::debug!(path = %self.session_path.display(), "Session state saved");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if self.session_path.exists() {
            std::fs::remove_file(&self.session_path)
                .map_err(|e| AuthError::Storage(format!("Failed to remove session file: {}", e)))?;
        }
        let mut cache = self.cached.write().await;
        *cache = None;
        tracing::debug!("Session state cleared");
        Ok(())
    }

    async fn record_login_attempt(&self) -> Result<()> {
        self.ensure_parent()?;
        std::fs::write(&self.marker_path, b"")
            .map_err(|e| AuthError::Storage(format!("Failed to write login marker: {}", e)))?;
        Ok(())
    }

    async fn login_attempted(&self) -> bool {
        self.marker_path.exists()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// InMemorySessionStore (for testing)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory session store for testing.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    state: RwLock<Option<SessionState>>,
    attempted: std::sync::atomic::AtomicBool,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out with a persisted state already in place.
    pub fn with_state(state: SessionState) -> Self {
        Self {
            state: RwLock::new(Some(state)),
            attempted: std::sync::atomic::AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self) -> Result<SessionState> {
        let state = self.state.read().await;
        Ok(state.clone().unwrap_or_else(SessionState::unauthenticated))
    }

    async fn save(&self, state: &SessionState) -> Result<()> {
        let mut slot = self.state.write().await;
        *slot = Some(state.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut slot = self.state.write().await;
        *slot = None;
        Ok(())
    }

    async fn record_login_attempt(&self) -> Result<()> {
        self.attempted
            .store(true, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    async fn login_attempted(&self) -> bool {
        self.attempted.load(std::sync::atomic::Ordering::SeqCst)
    }
}

/// Create a shared file-backed session store.
pub fn create_session_store(data_dir: &Path) -> SharedSessionStore {
    Arc::new(FileSessionStore::new(data_dir))
}

/// Create a shared in-memory session store (for testing).
pub fn create_memory_session_store() -> SharedSessionStore {
    Arc::new(InMemorySessionStore::new())
}
