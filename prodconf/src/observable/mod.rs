//! Single-value broadcast channel.
//!
//! [`Observable<T>`] is a cloneable handle to shared, single-threaded
//! listener state (`Rc<RefCell<..>>`). Listeners are identified by the
//! [`ListenerId`] returned at registration and may be tagged with an
//! [`OriginToken`]; `notify_all` skips listeners tagged with the token of the
//! notification's origin. Two observables can be [linked](Observable::link)
//! so a value raised on either side reaches the listeners of both, without
//! bouncing back.
//!
//! # Re-entrancy
//!
//! Callbacks are snapshotted before delivery, so a callback may listen,
//! stop listening or notify again; such changes apply to the next
//! notification. A cycle of links (A-B-C-A) forwards forever and must be
//! avoided by callers.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
    sync::atomic::{AtomicU64, Ordering},
};

mod registry;

pub use registry::ObservableRegistry;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identity of a notification source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OriginToken(u64);

impl OriginToken {
    /// Allocate a fresh, process-unique token.
    pub fn new() -> Self {
        OriginToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for OriginToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`Observable::listen`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<T> = Rc<dyn Fn(&T)>;

struct Listener<T> {
    id: ListenerId,
    origin: Option<OriginToken>,
    callback: Callback<T>,
}

struct Link<T> {
    peer: OriginToken,
    local: ListenerId,
    remote: ListenerId,
    peer_inner: Weak<RefCell<Inner<T>>>,
}

struct Inner<T> {
    token: OriginToken,
    next_id: u64,
    listeners: Vec<Listener<T>>,
    links: Vec<Link<T>>,
}

impl<T> Inner<T> {
    fn add(&mut self, origin: Option<OriginToken>, callback: Callback<T>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            origin,
            callback,
        });
        id
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }
}

/// Shared publish/subscribe channel for values of type `T`.
///
/// Cloning creates a new handle to the **same** listener set.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("token", &inner.token)
            .field("listeners", &inner.listeners.len())
            .field("links", &inner.links.len())
            .finish()
    }
}

impl<T: 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Observable<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                token: OriginToken::new(),
                next_id: 0,
                listeners: Vec::new(),
                links: Vec::new(),
            })),
        }
    }

    /// Token identifying this observable as a notification origin.
    pub fn token(&self) -> OriginToken {
        self.inner.borrow().token
    }

    /// Register a callback for every notification.
    pub fn listen(&self, callback: impl Fn(&T) + 'static) -> ListenerId {
        self.inner.borrow_mut().add(None, Rc::new(callback))
    }

    /// Register a callback that is skipped for notifications raised by `origin`.
    pub fn listen_from(&self, origin: OriginToken, callback: impl Fn(&T) + 'static) -> ListenerId {
        self.inner.borrow_mut().add(Some(origin), Rc::new(callback))
    }

    /// Unregister a callback. Returns `false` if it was not registered.
    pub fn stop_listen(&self, id: ListenerId) -> bool {
        self.inner.borrow_mut().remove(id)
    }

    /// Deliver `value` to every listener not tagged with `origin`.
    pub fn notify_all(&self, value: &T, origin: Option<OriginToken>) {
        let callbacks: Vec<Callback<T>> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter(|l| origin.is_none() || l.origin != origin)
            .map(|l| Rc::clone(&l.callback))
            .collect();

        for callback in callbacks {
            callback(value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn has_listeners(&self) -> bool {
        !self.inner.borrow().listeners.is_empty()
    }

    /// Whether both handles point to the same observable.
    pub fn ptr_eq(&self, other: &Observable<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Forward notifications in both directions between `self` and `other`.
    ///
    /// Each forwarder is tagged with the peer's token and re-raises with its
    /// own token, so a forwarded value is never sent back to where it came
    /// from. Linking an already linked pair, or an observable to itself, does
    /// nothing.
    pub fn link(&self, other: &Observable<T>) {
        if self.ptr_eq(other) || self.is_linked(other) {
            return;
        }

        let self_token = self.token();
        let other_token = other.token();

        let to_other = Rc::downgrade(&other.inner);
        let local = self.listen_from(other_token, move |value| {
            if let Some(inner) = to_other.upgrade() {
                Observable { inner }.notify_all(value, Some(self_token));
            }
        });

        let to_self = Rc::downgrade(&self.inner);
        let remote = other.listen_from(self_token, move |value| {
            if let Some(inner) = to_self.upgrade() {
                Observable { inner }.notify_all(value, Some(other_token));
            }
        });

        self.inner.borrow_mut().links.push(Link {
            peer: other_token,
            local,
            remote,
            peer_inner: Rc::downgrade(&other.inner),
        });
        other.inner.borrow_mut().links.push(Link {
            peer: self_token,
            local: remote,
            remote: local,
            peer_inner: Rc::downgrade(&self.inner),
        });
        trace!("linked observables {self_token:?} <-> {other_token:?}");
    }

    pub fn is_linked(&self, other: &Observable<T>) -> bool {
        let other_token = other.token();
        self.inner.borrow().links.iter().any(|l| l.peer == other_token)
    }

    /// Remove exactly the forwarders created by [`link`](Self::link).
    ///
    /// Works from either side of the link. Returns `false` when the two
    /// observables were not linked.
    pub fn unlink(&self, other: &Observable<T>) -> bool {
        let other_token = other.token();
        let link = {
            let mut inner = self.inner.borrow_mut();
            let Some(pos) = inner.links.iter().position(|l| l.peer == other_token) else {
                return false;
            };
            inner.links.remove(pos)
        };

        self.inner.borrow_mut().remove(link.local);
        Self::detach_peer(&link, self.token());
        true
    }

    /// Drop the peer's forwarder and its record of a link to `token`.
    fn detach_peer(link: &Link<T>, token: OriginToken) {
        if let Some(peer_inner) = link.peer_inner.upgrade() {
            let mut peer = peer_inner.borrow_mut();
            peer.remove(link.remote);
            peer.links.retain(|l| l.peer != token);
        }
    }

    /// Drop every listener and undo every link on both sides.
    pub fn clear(&self) {
        let token = self.token();
        let links = {
            let mut inner = self.inner.borrow_mut();
            inner.listeners.clear();
            std::mem::take(&mut inner.links)
        };
        for link in &links {
            Self::detach_peer(link, token);
        }
    }
}
