use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use super::{Inner, Observable};

/// Explicitly owned set of observables.
///
/// Create one at startup, hand it to whatever needs to create observables,
/// and [`clear`](Self::clear) it at shutdown. The registry only holds weak
/// references, so dropping an observable elsewhere removes it from the set.
pub struct ObservableRegistry<T> {
    members: RefCell<Vec<Weak<RefCell<Inner<T>>>>>,
}

impl<T: 'static> Default for ObservableRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> ObservableRegistry<T> {
    pub fn new() -> Self {
        Self {
            members: RefCell::new(Vec::new()),
        }
    }

    /// Create a new observable tracked by this registry.
    pub fn create(&self) -> Observable<T> {
        let obs = Observable::new();
        self.members.borrow_mut().push(Rc::downgrade(&obs.inner));
        obs
    }

    fn live(&self) -> Vec<Observable<T>> {
        let mut members = self.members.borrow_mut();
        members.retain(|w| w.strong_count() > 0);
        members
            .iter()
            .filter_map(Weak::upgrade)
            .map(|inner| Observable { inner })
            .collect()
    }

    /// Number of tracked observables still alive.
    pub fn live_count(&self) -> usize {
        self.live().len()
    }

    /// Deliver `value` to every live tracked observable.
    pub fn notify_all(&self, value: &T) {
        for obs in self.live() {
            obs.notify_all(value, None);
        }
    }

    /// Remove every listener from every tracked observable and forget them.
    pub fn clear(&self) {
        let live = self.live();
        debug!("clearing {} registered observables", live.len());
        for obs in &live {
            obs.clear();
        }
        self.members.borrow_mut().clear();
    }
}
