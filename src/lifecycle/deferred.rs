//! Single-assignment deferred values.
//!
//! A [`Deferred`] pairs a oneshot sender with a [`LifecyclePromise`], a
//! cloneable future that every holder can await for the same value. Resolving
//! consumes the `Deferred`, so a value can be delivered at most once. Dropping
//! an unresolved `Deferred` settles its promise with `None`.

use crate::domain::ModalResult;
use futures::channel::oneshot;
use futures::future::Shared;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Cloneable future resolving to a modal's result.
///
/// All clones observe the same value. Awaiting after settlement yields the
/// settled value immediately.
#[derive(Clone)]
#[must_use = "promises do nothing unless awaited"]
pub struct LifecyclePromise {
    inner: Shared<oneshot::Receiver<ModalResult>>,
}

impl LifecyclePromise {
    /// Returns a promise that is already settled with `value`.
    pub fn resolved(value: ModalResult) -> Self {
        let deferred = Deferred::new();
        let promise = deferred.promise();
        deferred.resolve(value);
        promise
    }

    /// Returns the settled value, or `None` while pending.
    ///
    /// The outer `Option` is settlement; the inner one is the result itself.
    #[must_use]
    pub fn peek(&self) -> Option<ModalResult> {
        if let Some(settled) = self.inner.peek() {
            return Some(settled.clone().unwrap_or(None));
        }
        // Shared only caches its output once polled.
        self.inner
            .clone()
            .now_or_never()
            .map(|settled| settled.unwrap_or(None))
    }

    /// Returns `true` once the promise has a value.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.peek().is_some()
    }
}

impl Future for LifecyclePromise {
    type Output = ModalResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner)
            .poll(cx)
            .map(|settled| settled.unwrap_or(None))
    }
}

impl fmt::Debug for LifecyclePromise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecyclePromise")
            .field("settled", &self.peek())
            .finish()
    }
}

/// Resolver half of a [`LifecyclePromise`].
pub struct Deferred {
    sender: oneshot::Sender<ModalResult>,
    promise: LifecyclePromise,
}

impl Deferred {
    pub fn new() -> Self {
        let (sender, receiver) = oneshot::channel();
        Self {
            sender,
            promise: LifecyclePromise {
                inner: receiver.shared(),
            },
        }
    }

    /// Returns a handle to the promise this deferred settles.
    pub fn promise(&self) -> LifecyclePromise {
        self.promise.clone()
    }

    /// Settles the promise with `value`.
    pub fn resolve(self, value: ModalResult) {
        // Every holder may have dropped its promise; nothing to deliver then.
        let _ = self.sender.send(value);
    }
}

impl Default for Deferred {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}
