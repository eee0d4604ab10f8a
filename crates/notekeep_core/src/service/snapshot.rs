//! Snapshot publication for note store observers.
//!
//! # Responsibility
//! - Hold the immutable collection view handed to observers.
//! - Track callback and channel subscribers and fan snapshots out to them.
//!
//! # Invariants
//! - A published snapshot is never mutated afterwards.
//! - Channel subscribers whose receiver is gone are pruned on publish.
//! - Subscription ids are never reused within one store.

use crate::model::note::Note;
use std::ops::Deref;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Full ordered note collection at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSnapshot(Arc<[Note]>);

impl NoteSnapshot {
    pub fn new(notes: &[Note]) -> Self {
        Self(Arc::from(notes))
    }

    /// Copies the snapshot into an owned vector.
    pub fn to_vec(&self) -> Vec<Note> {
        self.0.to_vec()
    }
}

impl Deref for NoteSnapshot {
    type Target = [Note];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum Subscriber {
    Callback(Box<dyn FnMut(&NoteSnapshot)>),
    Channel(Sender<NoteSnapshot>),
}

#[derive(Default)]
pub(crate) struct SubscriberSet {
    next_id: u64,
    entries: Vec<(SubscriptionId, Subscriber)>,
}

impl SubscriberSet {
    pub(crate) fn add_callback(
        &mut self,
        callback: impl FnMut(&NoteSnapshot) + 'static,
    ) -> SubscriptionId {
        self.insert(Subscriber::Callback(Box::new(callback)))
    }

    pub(crate) fn add_channel(&mut self) -> (SubscriptionId, Receiver<NoteSnapshot>) {
        let (tx, rx) = mpsc::channel();
        (self.insert(Subscriber::Channel(tx)), rx)
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Delivers `snapshot` to every live subscriber in subscription order.
    ///
    /// Returns the number of subscribers that received it.
    pub(crate) fn publish(&mut self, snapshot: &NoteSnapshot) -> usize {
        let mut delivered = 0;
        self.entries.retain_mut(|(_, subscriber)| {
            let alive = match subscriber {
                Subscriber::Callback(callback) => {
                    callback(snapshot);
                    true
                }
                Subscriber::Channel(tx) => tx.send(snapshot.clone()).is_ok(),
            };
            if alive {
                delivered += 1;
            }
            alive
        });
        delivered
    }

    fn insert(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, subscriber));
        id
    }
}
