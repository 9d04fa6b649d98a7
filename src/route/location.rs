//! The addressable location a route lives in
//!
//! [`MemoryLocation`] stands in for the browser address bar: it keeps a URL
//! with a fragment, a back/forward history and a broadcast of navigation
//! events. Every event carries an [`Origin`] tag so listeners can tell their
//! own writes apart from navigation the user caused.

use std::sync::{Mutex, PoisonError};

use log::debug;
use tokio::sync::broadcast;
use url::Url;

use crate::Result;

/// Who caused a location change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Link load, back/forward, manual edit of the address
    External,
    /// A write issued by the route store itself
    SelfAuthored,
}

/// A change of the location fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    /// Fragment text without the leading `#`
    pub fragment: String,
    pub origin: Origin,
}

/// Storage for the route fragment plus its change notifications
pub trait Location: Send + Sync {
    /// Current fragment without the leading `#` (empty when absent)
    fn fragment(&self) -> String;

    /// Write a new fragment, recording a history entry and announcing it
    fn write_fragment(&self, fragment: &str, origin: Origin);

    /// Receive every subsequent fragment change
    fn subscribe(&self) -> broadcast::Receiver<NavigationEvent>;
}

const EVENT_CAPACITY: usize = 64;

struct LocationState {
    url: Url,
    /// Fragments visited, oldest first; `cursor` indexes the current one
    history: Vec<String>,
    cursor: usize,
    self_writes: usize,
}

/// In-memory location with a browser-like history
pub struct MemoryLocation {
    state: Mutex<LocationState>,
    events: broadcast::Sender<NavigationEvent>,
}

impl MemoryLocation {
    /// Open a location at `href`, fragment included
    pub fn new(href: &str) -> Result<Self> {
        let url = Url::parse(href)?;
        let fragment = url.fragment().unwrap_or_default().to_string();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            state: Mutex::new(LocationState {
                url,
                history: vec![fragment],
                cursor: 0,
                self_writes: 0,
            }),
            events,
        })
    }

    /// A blank page with the given fragment
    pub fn with_fragment(fragment: &str) -> Self {
        let mut url = Url::parse("about:blank").expect("static URL parses");
        set_fragment(&mut url, fragment);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(LocationState {
                history: vec![url.fragment().unwrap_or_default().to_string()],
                url,
                cursor: 0,
                self_writes: 0,
            }),
            events,
        }
    }

    pub fn href(&self) -> String {
        self.lock().url.to_string()
    }

    /// Simulate the user following a link to `fragment`
    pub fn navigate(&self, fragment: &str) {
        self.write_fragment(fragment, Origin::External);
    }

    /// Step back in history; returns false at the oldest entry
    pub fn back(&self) -> bool {
        self.step(-1)
    }

    /// Step forward in history; returns false at the newest entry
    pub fn forward(&self) -> bool {
        self.step(1)
    }

    /// Number of history entries
    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    /// Number of writes tagged [`Origin::SelfAuthored`]
    pub fn self_writes(&self) -> usize {
        self.lock().self_writes
    }

    fn step(&self, delta: isize) -> bool {
        let fragment = {
            let mut state = self.lock();
            let target = state.cursor as isize + delta;
            if target < 0 || target as usize >= state.history.len() {
                return false;
            }
            state.cursor = target as usize;
            let fragment = state.history[state.cursor].clone();
            set_fragment(&mut state.url, &fragment);
            fragment
        };
        self.announce(fragment, Origin::External);
        true
    }

    fn announce(&self, fragment: String, origin: Origin) {
        // no receivers is fine: nobody is listening yet
        if self.events.send(NavigationEvent { fragment, origin }).is_err() {
            debug!("location change with no listeners");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LocationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Location for MemoryLocation {
    fn fragment(&self) -> String {
        self.lock().url.fragment().unwrap_or_default().to_string()
    }

    fn write_fragment(&self, fragment: &str, origin: Origin) {
        let stored = {
            let mut state = self.lock();
            set_fragment(&mut state.url, fragment);
            let stored = state.url.fragment().unwrap_or_default().to_string();
            // a new entry drops any forward history
            let keep = state.cursor + 1;
            state.history.truncate(keep);
            state.history.push(stored.clone());
            state.cursor = state.history.len() - 1;
            if origin == Origin::SelfAuthored {
                state.self_writes += 1;
            }
            stored
        };
        self.announce(stored, origin);
    }

    fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.events.subscribe()
    }
}

fn set_fragment(url: &mut Url, fragment: &str) {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    if fragment.is_empty() {
        url.set_fragment(None);
    } else {
        url.set_fragment(Some(fragment));
    }
}
