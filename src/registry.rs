//! Append-only, densely-indexed collection of actor records (§4.2).

use std::any::Any;
use std::sync::Arc;

use crate::id::ActorId;
use crate::mailbox::Mailbox;
use crate::message::Role;

pub struct ActorRecord {
    pub id: ActorId,
    pub role: Arc<Role>,
    pub user_state: Box<dyn Any + Send>,
    pub mailbox: Mailbox,
    /// True iff a ticket for this actor is currently outstanding in the
    /// worker pool (invariant 1, §3).
    pub scheduled: bool,
    /// Only ever transitions false -> true (invariant 3, §3).
    pub dead: bool,
}

/// Ids are dense from zero and never reused; `add` is the only mutator, so
/// `get`/`get_mut` can be a direct index (§4.2).
#[derive(Default)]
pub struct ActorRegistry {
    records: Vec<ActorRecord>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        ActorRegistry { records: Vec::new() }
    }

    pub fn add(&mut self, role: Arc<Role>, user_state: Box<dyn Any + Send>, mailbox_capacity: usize) -> ActorId {
        let id = ActorId::new(self.records.len() as u64);
        self.records.push(ActorRecord {
            id,
            role,
            user_state,
            mailbox: Mailbox::with_capacity(mailbox_capacity),
            scheduled: false,
            dead: false,
        });
        id
    }

    pub fn get(&self, id: ActorId) -> Option<&ActorRecord> {
        self.records.get(id.index())
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut ActorRecord> {
        self.records.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Walked exactly once, at system teardown: runs each role's destructor
    /// (if any) over that actor's final user state, then leaves an empty
    /// placeholder behind. Records themselves are never removed (invariant 4).
    pub fn run_destructors(&mut self) {
        for record in self.records.iter_mut() {
            if let Some(destructor) = &record.role.destructor {
                let state = std::mem::replace(&mut record.user_state, Box::new(()));
                destructor(state);
            }
        }
    }
}
