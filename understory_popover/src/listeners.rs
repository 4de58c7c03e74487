// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener bookkeeping for one popover instance.
//!
//! Every registration the controller makes goes through a [`ListenerSet`], so
//! that each exit path (close, rebind, destroy) can release exactly what was
//! installed. Registering a kind twice on the same target reaches the host only
//! once; removing a kind that was never registered is a no-op.

use alloc::vec::Vec;

use crate::host::{Host, Listen, ListenTarget};

/// Active listener registrations, merged per target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenerSet<E> {
    entries: Vec<(ListenTarget<E>, Listen)>,
}

impl<E> Default for ListenerSet<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E: Clone + PartialEq> ListenerSet<E> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kinds currently registered at `target`.
    pub fn kinds(&self, target: &ListenTarget<E>) -> Listen {
        self.entries
            .iter()
            .find(|(t, _)| t == target)
            .map(|(_, k)| *k)
            .unwrap_or_default()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register `kinds` at `target`, forwarding only the kinds not yet present.
    pub fn add<H: Host<Element = E>>(&mut self, host: &mut H, target: ListenTarget<E>, kinds: Listen) {
        let pos = match self.entries.iter().position(|(t, _)| *t == target) {
            Some(pos) => pos,
            None => {
                self.entries.push((target, Listen::empty()));
                self.entries.len() - 1
            }
        };
        let entry = &mut self.entries[pos];
        let fresh = kinds - entry.1;
        if !fresh.is_empty() {
            host.listen(&entry.0, fresh);
            entry.1 |= fresh;
        }
    }

    /// Unregister `kinds` at `target`, forwarding only the kinds actually present.
    pub fn remove<H: Host<Element = E>>(&mut self, host: &mut H, target: &ListenTarget<E>, kinds: Listen) {
        let Some(pos) = self.entries.iter().position(|(t, _)| t == target) else {
            return;
        };
        let present = self.entries[pos].1 & kinds;
        if !present.is_empty() {
            host.unlisten(target, present);
            self.entries[pos].1 -= present;
        }
        if self.entries[pos].1.is_empty() {
            self.entries.swap_remove(pos);
        }
    }

    /// Unregister everything at `target`.
    pub fn remove_target<H: Host<Element = E>>(&mut self, host: &mut H, target: &ListenTarget<E>) {
        self.remove(host, target, Listen::all());
    }

    /// Unregister everything.
    pub fn clear<H: Host<Element = E>>(&mut self, host: &mut H) {
        for (target, kinds) in self.entries.drain(..) {
            host.unlisten(&target, kinds);
        }
    }
}
