//! Listener bookkeeping for providers that hand out a value per handler
//! (a JS closure, or nothing when only de-duplication is needed).

use std::cell::RefCell;

use super::{same_handler, EventHandler};
use crate::core::error::Result;
use crate::core::types::WalletEvent;

struct Entry<T> {
    event: WalletEvent,
    handler: EventHandler,
    token: T,
}

/// Registered `(event, handler)` pairs, at most one entry per pair.
pub struct Listeners<T> {
    entries: RefCell<Vec<Entry<T>>>,
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, event: WalletEvent, handler: &EventHandler) -> bool {
        self.position(event, handler).is_some()
    }

    fn position(&self, event: WalletEvent, handler: &EventHandler) -> Option<usize> {
        self.entries
            .borrow()
            .iter()
            .position(|e| e.event == event && same_handler(&e.handler, handler))
    }

    /// Register `handler` through `attach` unless the pair is already known.
    /// Nothing is recorded when `attach` fails.
    pub fn attach<F>(&self, event: WalletEvent, handler: EventHandler, attach: F) -> Result<bool>
    where
        F: FnOnce(&EventHandler) -> Result<T>,
    {
        if self.contains(event, &handler) {
            return Ok(false);
        }
        let token = attach(&handler)?;
        self.entries.borrow_mut().push(Entry {
            event,
            handler,
            token,
        });
        Ok(true)
    }

    /// Unregister through `detach`. The entry (and its token) stays alive
    /// until `detach` succeeds. `Ok(false)` when the pair was never attached.
    pub fn detach<F>(&self, event: WalletEvent, handler: &EventHandler, detach: F) -> Result<bool>
    where
        F: FnOnce(&T) -> Result<()>,
    {
        let Some(position) = self.position(event, handler) else {
            return Ok(false);
        };
        {
            let entries = self.entries.borrow();
            detach(&entries[position].token)?;
        }
        self.entries.borrow_mut().remove(position);
        Ok(true)
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}
