//! Per-actor bounded FIFO (§4.1).
//!
//! A `Mailbox` is plain `VecDeque`-backed storage with no synchronization of
//! its own: every access happens while the caller holds the system-wide
//! lock (see [`crate::dispatcher::Dispatcher`]), exactly as the distilled
//! spec requires ("Mailboxes are not thread-safe in isolation").
//!
//! Messages are moved into the deque directly and own their storage until
//! popped — no extra heap cell per message the way a naive copy-in/copy-out
//! port of the C original would need (see SPEC_FULL.md's "Mailbox ownership"
//! note).

use std::collections::VecDeque;

use slog::crit;

use crate::message::Message;

pub struct Mailbox {
    capacity: usize,
    queue: VecDeque<Message>,
}

impl Mailbox {
    pub fn with_capacity(capacity: usize) -> Self {
        Mailbox {
            capacity,
            queue: VecDeque::with_capacity(capacity.min(64)),
        }
    }

    /// Pushes a message onto the tail. A full mailbox means some sender is
    /// running away with no back-pressure policy defined (§7 point 3) — we
    /// log at `crit` and abort the process rather than return an error
    /// nobody asked the caller to expect.
    pub fn push(&mut self, msg: Message, log: &slog::Logger) {
        if self.queue.len() >= self.capacity {
            crit!(log, "mailbox full, aborting process"; "capacity" => self.capacity);
            std::process::abort();
        }
        self.queue.push_back(msg);
    }

    pub fn pop(&mut self) -> Option<Message> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
