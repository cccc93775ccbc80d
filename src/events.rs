//! One-shot event listeners.
//!
//! Media and image elements announce state changes (seek finished, enough
//! data buffered, image decoded) through an [`EventTarget`]. Waiting code
//! calls [`EventTarget::listen`] and awaits the returned [`EventListener`].
//!
//! Every listener fires at most once and is removed from the target when it
//! fires or when it is dropped, so repeated waits on the same element never
//! accumulate stale handlers.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use tokio::sync::oneshot;

struct Registration<E> {
    id: u64,
    kind: E,
    sender: oneshot::Sender<()>,
}

struct Registry<E> {
    next_id: u64,
    listeners: Vec<Registration<E>>,
}

/// A set of pending one-shot listeners, keyed by event kind.
///
/// Cloning an `EventTarget` yields a handle to the same listener set, which
/// lets background work dispatch events on behalf of an element.
///
/// # Example
///
/// ```
/// use framegrab::{EventTarget, MediaEvent};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let events = EventTarget::new();
/// let seeked = events.listen(MediaEvent::Seeked);
/// assert_eq!(events.listener_count(MediaEvent::Seeked), 1);
///
/// events.dispatch(MediaEvent::Seeked);
/// seeked.await;
/// assert_eq!(events.listener_count(MediaEvent::Seeked), 0);
/// # }
/// ```
pub struct EventTarget<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> Clone for EventTarget<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E: Debug + Copy + PartialEq> Debug for EventTarget<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let registry = lock(&self.registry);
        let kinds: Vec<E> = registry.listeners.iter().map(|entry| entry.kind).collect();
        f.debug_struct("EventTarget")
            .field("listeners", &kinds)
            .finish()
    }
}

impl<E: Copy + PartialEq> Default for EventTarget<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Copy + PartialEq> EventTarget<E> {
    /// Create a target with no listeners.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register a one-shot listener for `kind`.
    pub fn listen(&self, kind: E) -> EventListener<E> {
        let (sender, receiver) = oneshot::channel();
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push(Registration { id, kind, sender });

        EventListener {
            id,
            registry: Arc::clone(&self.registry),
            receiver,
        }
    }

    /// Fire every listener registered for `kind` and remove them.
    ///
    /// Returns the number of listeners that were notified.
    pub fn dispatch(&self, kind: E) -> usize {
        let fired: Vec<Registration<E>> = {
            let mut registry = lock(&self.registry);
            let (fired, kept) = registry
                .listeners
                .drain(..)
                .partition(|entry| entry.kind == kind);
            registry.listeners = kept;
            fired
        };

        fired
            .into_iter()
            .map(|entry| entry.sender.send(()).is_ok())
            .filter(|&sent| sent)
            .count()
    }

    /// Number of listeners currently waiting for `kind`.
    pub fn listener_count(&self, kind: E) -> usize {
        lock(&self.registry)
            .listeners
            .iter()
            .filter(|entry| entry.kind == kind)
            .count()
    }
}

/// A pending one-shot listener.
///
/// Resolves once its event is dispatched. If the event never fires the
/// listener stays pending. Dropping it unregisters it from its target.
pub struct EventListener<E> {
    id: u64,
    registry: Arc<Mutex<Registry<E>>>,
    receiver: oneshot::Receiver<()>,
}

impl<E> Debug for EventListener<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("EventListener")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl<E> Future for EventListener<E> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(())) => Poll::Ready(()),
            // The target went away without firing; nothing can wake us now.
            Poll::Ready(Err(_)) | Poll::Pending => Poll::Pending,
        }
    }
}

impl<E> Drop for EventListener<E> {
    fn drop(&mut self) {
        lock(&self.registry)
            .listeners
            .retain(|entry| entry.id != self.id);
    }
}

fn lock<E>(registry: &Mutex<Registry<E>>) -> MutexGuard<'_, Registry<E>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Kind {
        Ping,
        Pong,
    }

    #[tokio::test]
    async fn dispatch_fires_only_matching_kind() {
        let events = EventTarget::new();
        let ping = events.listen(Kind::Ping);
        let _pong = events.listen(Kind::Pong);

        assert_eq!(events.dispatch(Kind::Ping), 1);
        ping.await;
        assert_eq!(events.listener_count(Kind::Ping), 0);
        assert_eq!(events.listener_count(Kind::Pong), 1);
    }

    #[test]
    fn dropping_listener_unregisters_it() {
        let events = EventTarget::new();
        let listener = events.listen(Kind::Ping);
        assert_eq!(events.listener_count(Kind::Ping), 1);
        drop(listener);
        assert_eq!(events.listener_count(Kind::Ping), 0);
        assert_eq!(events.dispatch(Kind::Ping), 0);
    }

    #[test]
    fn listeners_fire_once() {
        let events = EventTarget::new();
        let _listener = events.listen(Kind::Pong);
        assert_eq!(events.dispatch(Kind::Pong), 1);
        assert_eq!(events.dispatch(Kind::Pong), 0);
    }

    #[test]
    fn clones_share_listeners() {
        let events = EventTarget::new();
        let handle = events.clone();
        let _listener = events.listen(Kind::Ping);
        assert_eq!(handle.listener_count(Kind::Ping), 1);
    }
}
