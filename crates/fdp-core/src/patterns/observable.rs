//! Observer / Observable pattern.
//!
//! The library's notification mechanism for market data:
//! * An **Observable** object notifies registered **Observer**s whenever its
//!   state changes (e.g. a process whose volatility is bumped).
//! * Observers react by calling `update()` — typically marking a cached
//!   result stale.
//!
//! Registration is always explicit: whoever shares an observable with a
//! consumer decides whether (and when) to wire the notification.  Interior
//! mutability (`RefCell`) lets registration and notification work through
//! `&self` references, matching the shared-`Arc` usage across the workspace.
//!
//! The execution model is single-threaded; a given observable and its
//! observers must not be shared across threads without external
//! synchronisation.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// An object that can notify interested parties when it changes.
///
/// Implementors hold a list of `Weak` references to registered [`Observer`]s
/// and call `notify_observers()` whenever their state changes.
///
/// All methods take `&self` (not `&mut self`) to support shared ownership
/// patterns — interior mutability is used for the observer list.
pub trait Observable {
    /// Register an observer to receive future change notifications.
    fn register_observer(&self, observer: Weak<dyn Observer>);

    /// Remove a previously registered observer.
    fn unregister_observer(&self, observer: &Weak<dyn Observer>);

    /// Notify all currently registered observers that this object has changed.
    fn notify_observers(&self);
}

/// An object that reacts to changes in [`Observable`]s it has subscribed to.
pub trait Observer {
    /// Called by every observable this observer is registered with when that
    /// observable changes state.
    fn update(&self);
}

/// A helper struct that can be embedded in any type to provide the standard
/// observer-list management.
///
/// Uses interior mutability via `RefCell` so that `register`, `unregister`,
/// and `notify` all work through `&self` references.
pub struct ObservableImpl {
    observers: RefCell<Vec<Weak<dyn Observer>>>,
}

impl Default for ObservableImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ObservableImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableImpl")
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}

impl ObservableImpl {
    /// Create a new, empty observable implementation.
    pub fn new() -> Self {
        Self {
            observers: RefCell::new(Vec::new()),
        }
    }

    /// Register an observer.
    pub fn register(&self, observer: Weak<dyn Observer>) {
        self.observers.borrow_mut().push(observer);
    }

    /// Remove an observer (by pointer equality of the `Weak`).
    pub fn unregister(&self, observer: &Weak<dyn Observer>) {
        self.observers
            .borrow_mut()
            .retain(|o| !Weak::ptr_eq(o, observer));
    }

    /// Notify all live observers, removing dead `Weak` references as we go.
    pub fn notify(&self) {
        // Collect live observers first, then call update outside the borrow
        let observers: Vec<Rc<dyn Observer>> = self
            .observers
            .borrow()
            .iter()
            .filter_map(|w| w.upgrade())
            .collect();
        // Prune dead references
        self.observers
            .borrow_mut()
            .retain(|w| w.upgrade().is_some());
        for obs in observers {
            obs.update();
        }
    }

    /// Number of currently registered (possibly dead) observers.
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingObserver {
        count: Cell<u32>,
    }

    impl Observer for CountingObserver {
        fn update(&self) {
            self.count.set(self.count.get() + 1);
        }
    }

    #[test]
    fn register_and_notify() {
        let obs = Rc::new(CountingObserver {
            count: Cell::new(0),
        });
        let observable = ObservableImpl::new();
        observable.register(Rc::downgrade(&obs) as Weak<dyn Observer>);
        observable.notify();
        assert_eq!(obs.count.get(), 1);
        observable.notify();
        assert_eq!(obs.count.get(), 2);
    }

    #[test]
    fn dead_observer_pruned() {
        let observable = ObservableImpl::new();
        {
            let obs = Rc::new(CountingObserver {
                count: Cell::new(0),
            });
            observable.register(Rc::downgrade(&obs) as Weak<dyn Observer>);
        }
        // obs dropped — notify should prune it
        observable.notify();
        assert_eq!(observable.observer_count(), 0);
    }

    #[test]
    fn unregister() {
        let obs = Rc::new(CountingObserver {
            count: Cell::new(0),
        });
        let weak = Rc::downgrade(&obs) as Weak<dyn Observer>;
        let observable = ObservableImpl::new();
        observable.register(weak.clone());
        observable.unregister(&weak);
        observable.notify();
        assert_eq!(obs.count.get(), 0);
    }
}
