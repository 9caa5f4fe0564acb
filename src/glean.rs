//! The Glean context: native store, dispatcher and initialization state.

use crate::core::{Config, GleanError, Result};
use crate::dispatcher::Dispatcher;
use crate::native::{InMemoryStore, NativeHandle, NativeStore};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

static GLOBAL_GLEAN: OnceCell<Glean> = OnceCell::new();
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

struct GleanInner {
    id: u64,
    config: Config,
    store: Arc<dyn NativeStore>,
    dispatcher: Dispatcher,
    initialized: AtomicBool,
}

/// Shared handle to one recording context. Cloning is cheap.
///
/// Every metric declared against an instance records through that
/// instance's single serial dispatcher.
#[derive(Clone)]
pub struct Glean {
    inner: Arc<GleanInner>,
}

impl Glean {
    /// Start a context on top of `store`. It begins uninitialized: metrics
    /// can be declared, but nothing records until [`Glean::initialize`].
    pub fn new(config: Config, store: Arc<dyn NativeStore>) -> Result<Self> {
        config.validate()?;
        let dispatcher = Dispatcher::new(&config.dispatcher)?;
        store.set_upload_enabled(config.upload_enabled);

        let id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed);
        debug!(instance = id, testing_mode = config.testing_mode, "Glean context created");

        Ok(Self {
            inner: Arc::new(GleanInner {
                id,
                config,
                store,
                dispatcher,
                initialized: AtomicBool::new(false),
            }),
        })
    }

    /// Context backed by a fresh [`InMemoryStore`].
    pub fn in_memory(config: Config) -> Result<Self> {
        Self::new(config, Arc::new(InMemoryStore::new()))
    }

    /// Install the process-wide context. Fails if one is already installed.
    pub fn init_global(config: Config, store: Arc<dyn NativeStore>) -> Result<&'static Glean> {
        let glean = Self::new(config, store)?;
        GLOBAL_GLEAN
            .set(glean)
            .map_err(|_| GleanError::config("global Glean instance is already installed"))?;
        Self::global()
    }

    /// The process-wide context, created with defaults on first use.
    pub fn global() -> Result<&'static Glean> {
        GLOBAL_GLEAN.get_or_try_init(|| Self::in_memory(Config::default()))
    }

    /// Mark the context initialized; recording gates may open from now on.
    pub fn initialize(&self) {
        if !self.inner.initialized.swap(true, Ordering::AcqRel) {
            info!(instance = self.inner.id, "Glean initialized");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::Acquire)
    }

    /// Enable or disable recording for every metric of this context.
    pub fn set_upload_enabled(&self, enabled: bool) {
        self.inner.store.set_upload_enabled(enabled);
        info!(instance = self.inner.id, enabled, "Upload enabled changed");
    }

    /// Gate check run on the caller's thread before any recording work.
    pub fn should_record(&self, handle: NativeHandle) -> bool {
        self.is_initialized() && self.inner.store.should_record(handle)
    }

    /// Run the queued work and stop the dispatcher.
    pub fn shutdown(&self) -> Result<()> {
        self.inner.dispatcher.shutdown()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    pub(crate) fn store(&self) -> &Arc<dyn NativeStore> {
        &self.inner.store
    }

    pub(crate) fn instance_id(&self) -> u64 {
        self.inner.id
    }
}

impl std::fmt::Debug for Glean {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Glean")
            .field("instance", &self.inner.id)
            .field("initialized", &self.is_initialized())
            .field("dispatcher", &self.inner.dispatcher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigBuilder;

    #[test]
    fn test_starts_uninitialized() {
        let glean = Glean::in_memory(Config::default()).unwrap();
        assert!(!glean.is_initialized());

        glean.initialize();
        glean.initialize();
        assert!(glean.is_initialized());
    }

    #[test]
    fn test_instances_get_distinct_ids() {
        let a = Glean::in_memory(Config::default()).unwrap();
        let b = Glean::in_memory(Config::default()).unwrap();
        assert_ne!(a.instance_id(), b.instance_id());
        assert_eq!(a.instance_id(), a.clone().instance_id());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = ConfigBuilder::new().build().unwrap();
        config.dispatcher.thread_name = String::new();
        assert!(Glean::in_memory(config).is_err());
    }

    #[test]
    fn test_global_instance_is_shared() {
        let first = Glean::global().unwrap();
        let second = Glean::global().unwrap();
        assert_eq!(first.instance_id(), second.instance_id());
    }
}
