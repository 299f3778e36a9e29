//! One-slot buffered error channel.
//!
//! The engine may record an error before anyone is listening. The box keeps
//! that error until the first subscriber shows up and hands it over exactly
//! once, after which it is inert.

use crate::cat::error::CatError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Callback invoked with the surfaced error.
pub type ErrorListener = Box<dyn FnOnce(CatError) + Send>;

enum State {
    /// No error yet. Listeners registered here receive the error live.
    Empty { listeners: Vec<ErrorListener> },
    /// Error recorded with nobody listening.
    Buffered(CatError),
    /// The error reached a subscriber; nothing further will ever be delivered.
    Delivered,
}

/// Shared one-slot error buffer between an output sink and its stream.
///
/// Cloning is cheap (Arc clone); all clones observe the same state.
#[derive(Clone)]
pub struct ErrorBox {
    state: Arc<Mutex<State>>,
}

impl ErrorBox {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::Empty {
                listeners: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `error`. Only the first recorded error is kept.
    ///
    /// Returns `false` if an error had already been recorded.
    pub fn record(&self, error: CatError) -> bool {
        let listeners = {
            let mut state = self.lock();
            let listeners = match &mut *state {
                State::Empty { listeners } => std::mem::take(listeners),
                State::Buffered(_) | State::Delivered => return false,
            };
            if listeners.is_empty() {
                *state = State::Buffered(error);
                return true;
            }
            *state = State::Delivered;
            listeners
        };

        for listener in listeners {
            listener(error.clone());
        }
        true
    }

    /// Register an error listener.
    ///
    /// A buffered error is delivered to the first subscriber immediately.
    /// With no error yet, the listener waits for the live one.
    pub fn subscribe(&self, listener: ErrorListener) {
        let buffered = {
            let mut state = self.lock();
            match &mut *state {
                State::Empty { listeners } => {
                    listeners.push(listener);
                    return;
                }
                State::Delivered => return,
                State::Buffered(_) => {}
            }
            std::mem::replace(&mut *state, State::Delivered)
        };

        if let State::Buffered(error) = buffered {
            listener(error);
        }
    }

    /// Take a buffered error nobody has observed yet.
    pub fn take(&self) -> Option<CatError> {
        let mut state = self.lock();
        if !matches!(*state, State::Buffered(_)) {
            return None;
        }
        match std::mem::replace(&mut *state, State::Delivered) {
            State::Buffered(error) => Some(error),
            _ => None,
        }
    }
}

impl Default for ErrorBox {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ErrorBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.lock() {
            State::Empty { .. } => "empty",
            State::Buffered(_) => "buffered",
            State::Delivered => "delivered",
        };
        f.debug_struct("ErrorBox").field("state", &state).finish()
    }
}
