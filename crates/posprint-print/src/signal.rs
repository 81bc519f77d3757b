// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-resolution bridge from SDK callbacks to a future.
//
// Vendor listeners may fire more than once, from any thread. A `Resolver`
// hands the first value to the waiting task and swallows the rest.

use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;

pub(crate) struct Resolver<T> {
    tx: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> Resolver<T> {
    /// A fresh resolver and the receiver that observes its first value.
    pub(crate) fn channel() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        let resolver = Self {
            tx: Mutex::new(Some(tx)),
        };
        (resolver, rx)
    }

    /// Deliver `value` if nothing has been delivered yet.
    ///
    /// Returns false when an earlier value already won. A receiver that has
    /// gone away (e.g. after a timeout) still counts as resolved.
    pub(crate) fn resolve(&self, value: T) -> bool {
        let sender = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(tx) => {
                let _ = tx.send(value);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_value_wins() {
        let (resolver, rx) = Resolver::channel();
        assert!(resolver.resolve(1));
        assert!(!resolver.resolve(2));
        assert_eq!(rx.await.expect("value"), 1);
    }

    #[test]
    fn resolving_after_receiver_dropped_is_quiet() {
        let (resolver, rx) = Resolver::<u8>::channel();
        drop(rx);
        assert!(resolver.resolve(9));
        assert!(!resolver.resolve(9));
    }
}
