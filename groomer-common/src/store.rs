//! Observer store with typed actions
//!
//! A [`Store`] owns one piece of application state and broadcasts the full
//! current state to every subscriber after each mutation. The only way to
//! mutate it is [`Store::dispatch`], and the action type is fixed by the
//! state type through [`StoreState::Action`], so a store can never react to
//! an action that was meant for another store.
//!
//! # Broadcast semantics
//!
//! - Broadcasts are synchronous: `dispatch` returns after every subscriber ran
//! - Subscribers are notified in registration order
//! - Subscribers added or removed during a broadcast take effect from the
//!   next broadcast
//! - A subscriber may dispatch again from inside its callback; the nested
//!   broadcast completes before the outer one continues
//!
//! # Examples
//!
//! ```
//! use groomer_common::store::{Store, StoreState};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Debug, Clone, Default)]
//! struct Counter(u32);
//!
//! enum CounterAction {
//!     Increment,
//! }
//!
//! impl StoreState for Counter {
//!     type Action = CounterAction;
//!
//!     fn reduce(&mut self, action: CounterAction) {
//!         match action {
//!             CounterAction::Increment => self.0 += 1,
//!         }
//!     }
//! }
//!
//! let store = Store::<Counter>::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! store.subscribe(move |state: &Counter| sink.lock().unwrap().push(state.0));
//!
//! store.dispatch(CounterAction::Increment);
//! store.dispatch(CounterAction::Increment);
//!
//! assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// State held by a [`Store`]
///
/// Implementors declare which actions they accept and how each one changes
/// the state. `reduce` must not block.
pub trait StoreState: Clone + Default + Send + 'static {
    /// Actions accepted by this state
    type Action;

    /// Apply one action to the state
    fn reduce(&mut self, action: Self::Action);
}

/// Handle returned by [`Store::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// In-memory state holder broadcasting its full state on every mutation
pub struct Store<S: StoreState> {
    state: Mutex<S>,
    listeners: Mutex<Vec<(SubscriptionId, Listener<S>)>>,
    next_id: AtomicU64,
}

impl<S: StoreState> Store<S> {
    /// Create a store holding `S::default()`
    pub fn new() -> Self {
        Self::with_state(S::default())
    }

    /// Create a store holding the given initial state
    pub fn with_state(state: S) -> Self {
        Self {
            state: Mutex::new(state),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a subscriber
    ///
    /// The subscriber is not called with the current state on registration;
    /// it sees the state after the next dispatch.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners).push((id, Arc::new(listener)));
        tracing::trace!(subscription = id.0, "Store subscriber registered");
        id
    }

    /// Remove a subscriber
    ///
    /// Returns `false` if the id was not (or no longer) registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Apply an action, then broadcast the resulting state
    pub fn dispatch(&self, action: S::Action) {
        let snapshot = {
            let mut state = lock(&self.state);
            state.reduce(action);
            state.clone()
        };

        // Listeners run without any store lock held so they may subscribe,
        // unsubscribe or dispatch from inside the callback.
        let listeners: Vec<Listener<S>> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(&snapshot);
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> S {
        lock(&self.state).clone()
    }
}

impl<S: StoreState> Default for Store<S> {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking subscriber never holds these locks, and reduce() leaves the
    // state consistent, so a poisoned guard is still usable.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
