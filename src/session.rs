//! # Repository Sessions
//!
//! A [`RepositorySession`] binds a configuration to the local repository
//! manager selected for it. Selection runs once, when the session is opened,
//! and the manager is reused for the lifetime of the session.
//!
//! Sessions are opened and ended through a [`SessionRegistry`]. Components
//! that keep per-session state register on-end handlers; ending the session
//! runs them in reverse registration order and reports every failure
//! together.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::debug;

use crate::artifact::LocalRepository;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::manager::LocalRepositoryManager;
use crate::provider::LocalRepositoryProvider;
use crate::sync::{SyncContext, SyncContextFactory};

type EndHandler = Box<dyn FnOnce() -> Result<()> + Send>;

/// An open session over one local repository
#[derive(Debug, Clone)]
pub struct RepositorySession {
    id: u64,
    config: Arc<SessionConfig>,
    manager: Arc<dyn LocalRepositoryManager>,
    manager_name: String,
    sync: SyncContextFactory,
}

impl RepositorySession {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn manager(&self) -> &dyn LocalRepositoryManager {
        self.manager.as_ref()
    }

    /// Registry name of the selected manager factory.
    pub fn manager_name(&self) -> &str {
        &self.manager_name
    }

    pub fn repository(&self) -> &LocalRepository {
        self.manager.repository()
    }

    /// A new, not yet acquired, sync context.
    pub fn sync_context(&self, shared: bool) -> SyncContext {
        self.sync.new_context(shared)
    }
}

/// Tracks open sessions and their on-end handlers
pub struct SessionRegistry {
    next_id: AtomicU64,
    handlers: Mutex<HashMap<u64, Vec<EndHandler>>>,
    sync: SyncContextFactory,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(SyncContextFactory::new())
    }
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("next_id", &self.next_id)
            .field("active", &self.active_sessions())
            .finish()
    }
}

impl SessionRegistry {
    pub fn new(sync: SyncContextFactory) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            handlers: Mutex::new(HashMap::new()),
            sync,
        }
    }

    fn lock_handlers(&self) -> Result<std::sync::MutexGuard<'_, HashMap<u64, Vec<EndHandler>>>> {
        self.handlers.lock().map_err(|_| Error::LockPoisoned {
            context: "session registry".to_string(),
        })
    }

    /// Opens a session, selecting the manager of `repository`.
    pub fn open(
        &self,
        config: SessionConfig,
        provider: &LocalRepositoryProvider,
        repository: &LocalRepository,
    ) -> Result<RepositorySession> {
        let selected = provider.new_manager(&config, repository)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock_handlers()?.insert(id, Vec::new());
        debug!("Opened session {} on {}", id, repository);
        Ok(RepositorySession {
            id,
            config: Arc::new(config),
            manager: Arc::from(selected.value),
            manager_name: selected.name,
            sync: self.sync.clone(),
        })
    }

    pub fn is_active(&self, session: &RepositorySession) -> bool {
        self.lock_handlers()
            .map(|handlers| handlers.contains_key(&session.id))
            .unwrap_or(false)
    }

    pub fn active_sessions(&self) -> usize {
        self.lock_handlers().map(|handlers| handlers.len()).unwrap_or(0)
    }

    /// Registers a handler to run when `session` ends.
    pub fn add_on_end_handler(
        &self,
        session: &RepositorySession,
        handler: impl FnOnce() -> Result<()> + Send + 'static,
    ) -> Result<()> {
        let mut handlers = self.lock_handlers()?;
        let entry = handlers.get_mut(&session.id).ok_or_else(|| Error::Session {
            message: format!("session {} is not active", session.id),
        })?;
        entry.push(Box::new(handler));
        Ok(())
    }

    /// Ends `session`, running its handlers newest first.
    ///
    /// Every handler runs even when an earlier one fails; the failures are
    /// returned together as [`Error::SessionEnd`].
    pub fn end(&self, session: RepositorySession) -> Result<()> {
        let handlers = self
            .lock_handlers()?
            .remove(&session.id)
            .ok_or_else(|| Error::Session {
                message: format!("session {} is not active", session.id),
            })?;

        let count = handlers.len();
        let errors: Vec<Error> = handlers
            .into_iter()
            .rev()
            .filter_map(|handler| handler().err())
            .collect();
        debug!(
            "Ended session {}: {} handler(s), {} failed",
            session.id,
            count,
            errors.len()
        );
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::SessionEnd {
                session: session.id,
                errors,
            })
        }
    }
}
