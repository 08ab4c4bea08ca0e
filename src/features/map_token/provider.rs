use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::features::map_token::source::TokenSource;

/// Lifecycle of the map access token for one tile surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    /// No request issued yet
    NotRequested,
    Loading,
    Ready(String),
    Error(String),
}

impl TokenState {
    pub fn status(&self) -> &'static str {
        match self {
            TokenState::NotRequested => "notRequested",
            TokenState::Loading => "loading",
            TokenState::Ready(_) => "ready",
            TokenState::Error(_) => "error",
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            TokenState::Ready(token) => Some(token),
            _ => None,
        }
    }
}

/// Fetches the tile surface token at most once per request cycle.
///
/// The first `ensure_started` issues a single request on a spawned task.
/// `Error` is terminal: only `reload` issues another request. After
/// `teardown` (or drop) a pending request is aborted and no result is
/// committed.
pub struct MapTokenProvider {
    source: Arc<dyn TokenSource>,
    state: Arc<watch::Sender<TokenState>>,
    task: Mutex<Option<JoinHandle<()>>>,
    cancelled: Arc<AtomicBool>,
}

impl MapTokenProvider {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        let (state, _) = watch::channel(TokenState::NotRequested);
        Self {
            source,
            state: Arc::new(state),
            task: Mutex::new(None),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> TokenState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TokenState> {
        self.state.subscribe()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Issue the request on first need. Returns whether a request was started.
    pub fn ensure_started(&self) -> bool {
        let cancelled = &self.cancelled;
        let started = self.state.send_if_modified(|state| {
            if cancelled.load(Ordering::Acquire) || *state != TokenState::NotRequested {
                return false;
            }
            *state = TokenState::Loading;
            true
        });

        if started {
            self.spawn_fetch();
        }
        started
    }

    /// User-initiated retry. Ignored while a request is in flight.
    pub fn reload(&self) -> bool {
        let cancelled = &self.cancelled;
        let started = self.state.send_if_modified(|state| {
            if cancelled.load(Ordering::Acquire) || *state == TokenState::Loading {
                return false;
            }
            *state = TokenState::Loading;
            true
        });

        if started {
            tracing::info!("Reloading map token on request");
            self.spawn_fetch();
        }
        started
    }

    /// Cancel any pending request. The state is frozen afterwards.
    pub fn teardown(&self) {
        // Flag under the channel lock so an in-flight commit either lands
        // before teardown or observes the flag.
        let cancelled = &self.cancelled;
        self.state.send_if_modified(|_| {
            cancelled.store(true, Ordering::Release);
            false
        });

        let pending = match self.task.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = pending {
            if !handle.is_finished() {
                tracing::debug!("Cancelling pending map token request");
            }
            handle.abort();
        }
    }

    fn spawn_fetch(&self) {
        let source = self.source.clone();
        let state = self.state.clone();
        let cancelled = self.cancelled.clone();

        let handle = tokio::spawn(async move {
            let result = source.fetch_token().await;

            state.send_if_modified(move |current| {
                if cancelled.load(Ordering::Acquire) {
                    tracing::debug!("Discarding map token result after teardown");
                    return false;
                }
                *current = match result {
                    Ok(token) => TokenState::Ready(token),
                    Err(e) => {
                        tracing::warn!("Map token request failed: {}", e);
                        TokenState::Error(e.to_string())
                    }
                };
                true
            });
        });

        let previous = match self.task.lock() {
            Ok(mut slot) => slot.replace(handle),
            Err(poisoned) => poisoned.into_inner().replace(handle),
        };
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

impl Drop for MapTokenProvider {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for MapTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapTokenProvider")
            .field("state", &*self.state.borrow())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
