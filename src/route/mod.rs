//! Route store: the canonical configuration and its URL fragment mirror
//!
//! The store owns the current [`Configuration`] snapshot. Navigation that
//! originates outside the store (link loads, back/forward) decodes the
//! fragment and pushes the result to every subscriber; this is the only path
//! that triggers a render. Local edits go the other way through `commit`
//! (written at once) or `commit_debounced` (coalesced, last value wins) and
//! never reach subscribers.

pub mod debounce;
pub mod location;

pub use debounce::Debouncer;
pub use location::{Location, MemoryLocation, NavigationEvent, Origin};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::codec::ConfigCodec;
use crate::model::{ConfigUpdate, Configuration};
use crate::{Error, Result};

/// Callback receiving every configuration loaded from the location
pub type RouteListener = Arc<dyn Fn(&Arc<Configuration>) + Send + Sync>;

/// Where view-side edits are forwarded
pub trait RouteSink: Send + Sync {
    /// Merge and write immediately
    fn commit(&self, update: ConfigUpdate);

    /// Merge now, write once the stream goes quiet
    fn commit_debounced(&self, update: ConfigUpdate);
}

struct StoreInner {
    codec: ConfigCodec,
    location: Arc<dyn Location>,
    current: Mutex<Arc<Configuration>>,
    listeners: Mutex<Vec<RouteListener>>,
    debouncer: Debouncer,
    handle: Handle,
    loads: AtomicUsize,
}

/// Cheaply cloneable handle to the shared store
#[derive(Clone)]
pub struct RouteStore {
    inner: Arc<StoreInner>,
}

impl RouteStore {
    /// Create a store on the current tokio runtime
    ///
    /// The snapshot starts at the codec defaults until
    /// [`RouteStore::load_from_location`] runs.
    pub fn new(codec: ConfigCodec, location: Arc<dyn Location>, commit_interval: Duration) -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| Error::Runtime(e.to_string()))?;
        let initial = Arc::new(codec.defaults().values.clone());
        Ok(Self {
            inner: Arc::new(StoreInner {
                codec,
                location,
                current: Mutex::new(initial),
                listeners: Mutex::new(Vec::new()),
                debouncer: Debouncer::with_handle(commit_interval, handle.clone()),
                handle,
                loads: AtomicUsize::new(0),
            }),
        })
    }

    /// The current snapshot
    pub fn current(&self) -> Arc<Configuration> {
        Arc::clone(&self.lock_current())
    }

    pub fn location(&self) -> &Arc<dyn Location> {
        &self.inner.location
    }

    pub fn codec(&self) -> &ConfigCodec {
        &self.inner.codec
    }

    /// How many times the render path has run
    pub fn load_count(&self) -> usize {
        self.inner.loads.load(Ordering::SeqCst)
    }

    /// Register a render-path subscriber
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&Arc<Configuration>) + Send + Sync + 'static,
    {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Decode the location, replace the snapshot and notify subscribers
    pub fn load_from_location(&self) -> Arc<Configuration> {
        let fragment = self.inner.location.fragment();
        let config = Arc::new(self.inner.codec.decode_fragment(&fragment));
        // navigation supersedes any local write still waiting
        self.inner.debouncer.cancel();
        *self.lock_current() = Arc::clone(&config);
        self.inner.loads.fetch_add(1, Ordering::SeqCst);
        debug!("route loaded from #{}", fragment);

        let listeners: Vec<RouteListener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener(&config);
        }
        config
    }

    /// React to a location change; returns true when it caused a render
    pub fn handle_navigation(&self, event: &NavigationEvent) -> bool {
        match event.origin {
            Origin::SelfAuthored => {
                debug!("ignoring self-authored route change #{}", event.fragment);
                false
            }
            Origin::External => {
                self.load_from_location();
                true
            }
        }
    }

    /// Follow location changes on a background task
    pub fn listen(&self) -> JoinHandle<()> {
        let mut events = self.inner.location.subscribe();
        let store = self.clone();
        self.inner.handle.spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        store.handle_navigation(&event);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!("route listener missed {} navigation event(s), reloading", missed);
                        store.load_from_location();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Merge `update` and write the route immediately
    pub fn commit(&self, update: ConfigUpdate) -> Arc<Configuration> {
        let config = self.apply(&update);
        self.inner.debouncer.cancel();
        self.write(&config);
        config
    }

    /// Merge `update` now and write once no further update arrives for the
    /// commit interval
    pub fn commit_debounced(&self, update: ConfigUpdate) -> Arc<Configuration> {
        let config = self.apply(&update);
        let store = self.clone();
        self.inner.debouncer.schedule(move || {
            store.write(&store.current());
        });
        config
    }

    /// Write any pending change now; returns true if the location changed
    pub fn flush(&self) -> bool {
        self.inner.debouncer.cancel();
        self.write(&self.current())
    }

    fn apply(&self, update: &ConfigUpdate) -> Arc<Configuration> {
        let mut current = self.lock_current();
        let next = Arc::new(current.merged(update));
        *current = Arc::clone(&next);
        next
    }

    fn write(&self, config: &Configuration) -> bool {
        let fragment = self.inner.codec.encode_fragment(config);
        if fragment == self.inner.location.fragment() {
            debug!("route unchanged, skipping write");
            return false;
        }
        self.inner.location.write_fragment(&fragment, Origin::SelfAuthored);
        info!("route committed: #{}", fragment);
        true
    }

    fn lock_current(&self) -> MutexGuard<'_, Arc<Configuration>> {
        self.inner.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RouteSink for RouteStore {
    fn commit(&self, update: ConfigUpdate) {
        RouteStore::commit(self, update);
    }

    fn commit_debounced(&self, update: ConfigUpdate) {
        RouteStore::commit_debounced(self, update);
    }
}
