//! Single slot, latest-wins handoff between submitters and the worker.
//!
//! A [`Mailbox`] holds at most one pending item. Submitting while an item is
//! still pending replaces it, so memory stays constant no matter how fast
//! submissions arrive and the retriever only ever sees the freshest item. It is
//! deliberately not a queue.
//!
//! Condition variables are only used to avoid busy waiting. The retriever is
//! signalled on `ready` when the slot goes from empty to occupied. An overwrite
//! finds the slot already occupied, so it signals nothing. Threads sleeping in
//! [`Mailbox::wait_closed`] park on a separate `closed` condvar and never
//! swallow a signal meant for a retriever.

use std::{
    fmt,
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};

// Ticket
//------------------------------------------------------------------------------

/// Sequence number of an accepted submission.
///
/// Tickets are handed out under the slot lock, so their order is exactly the
/// order in which submissions overwrote each other.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An item taken from the mailbox, tagged with its ticket.
#[derive(Debug, PartialEq, Eq)]
pub struct Envelope<T> {
    pub ticket: Ticket,
    pub item: T,
}

/// Returned by [`Mailbox::submit`] once the mailbox is closed. Carries the
/// rejected item back to the caller.
#[derive(Debug, PartialEq, Eq)]
pub struct MailboxClosed<T>(pub T);

impl<T> fmt::Display for MailboxClosed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mailbox is closed")
    }
}

impl<T: fmt::Debug> std::error::Error for MailboxClosed<T> {}

// Mailbox
//------------------------------------------------------------------------------

struct Slot<T> {
    pending: Option<Envelope<T>>,
    next_ticket: u64,
    superseded: u64,
    closed: bool,
}

pub struct Mailbox<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
    closed: Condvar,
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot { pending: None, next_ticket: 1, superseded: 0, closed: false }),
            ready: Condvar::new(),
            closed: Condvar::new(),
        }
    }

    /// Stores `item` as the only pending item, dropping any item that hasn't
    /// been taken yet. Never waits for the retriever.
    pub fn submit(&self, item: T) -> Result<Ticket, MailboxClosed<T>> {
        let mut slot = self.slot.lock();
        if slot.closed {
            return Err(MailboxClosed(item));
        }

        let ticket = Ticket(slot.next_ticket);
        slot.next_ticket += 1;

        let was_empty = match slot.pending.replace(Envelope { ticket, item }) {
            Some(stale) => {
                slot.superseded += 1;
                tracing::trace!(%ticket, superseded = %stale.ticket, "Replaced pending item");
                false
            }
            None => true,
        };
        drop(slot);

        if was_empty {
            self.ready.notify_one();
        }
        Ok(ticket)
    }

    /// Blocks until an item is available and removes it.
    ///
    /// Returns `None` once the mailbox is closed, even if an item is pending.
    pub fn take(&self) -> Option<Envelope<T>> {
        let mut slot = self.slot.lock();
        loop {
            if slot.closed {
                return None;
            }
            if let Some(envelope) = slot.pending.take() {
                return Some(envelope);
            }
            self.ready.wait(&mut slot);
        }
    }

    pub fn try_take(&self) -> Option<Envelope<T>> {
        let mut slot = self.slot.lock();
        if slot.closed {
            return None;
        }
        slot.pending.take()
    }

    /// Stops the mailbox. Pending items are dropped, blocked and future
    /// [`take`](Self::take) calls return `None`, and submissions are refused.
    pub fn close(&self) {
        let mut slot = self.slot.lock();
        if slot.closed {
            return;
        }
        slot.closed = true;
        slot.pending = None;
        drop(slot);
        self.ready.notify_all();
        self.closed.notify_all();
    }

    /// Sleeps for up to `timeout`, returning early with `true` if the mailbox
    /// gets closed.
    pub fn wait_closed(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock();
        while !slot.closed {
            if self.closed.wait_until(&mut slot, deadline).timed_out() {
                break;
            }
        }
        slot.closed
    }

    pub fn is_closed(&self) -> bool {
        self.slot.lock().closed
    }

    pub fn has_pending(&self) -> bool {
        self.slot.lock().pending.is_some()
    }

    /// Number of submissions overwritten before anyone took them.
    pub fn superseded(&self) -> u64 {
        self.slot.lock().superseded
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Mailbox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.lock();
        f.debug_struct("Mailbox")
            .field("pending", &slot.pending.as_ref().map(|e| e.ticket))
            .field("next_ticket", &slot.next_ticket)
            .field("superseded", &slot.superseded)
            .field("closed", &slot.closed)
            .finish()
    }
}
