//! The scheduling discipline (§4.4): enqueue-and-maybe-schedule on `send`,
//! pop-dispatch-and-maybe-reschedule on `run_actor`.
//!
//! A single [`std::sync::Mutex`] protects the registry, every actor's
//! `scheduled`/`dead` flags, every mailbox, and the `active_actors` counter
//! (§5). This is the same coarse-grained design `original_source/cacti.c`
//! uses (`lock_actor_queues` guarding everything, `notify_all_dead` as the
//! quiescence condition variable) and the same "take the actor out from
//! behind the lock, run it lock-free, put it back" technique the teacher's
//! `kernel::mailbox::run_mailbox` uses for its own (differently-shaped)
//! mailbox-draining loop.

use std::cell::Cell;
use std::sync::{Arc, Condvar, Mutex, Once, Weak};

use slog::{debug, trace, warn};
use uuid::Uuid;

use crate::context::ActorContext;
use crate::error::SendError;
use crate::id::ActorId;
use crate::message::{Message, Payload, Role, SPAWN, TERMINATE};
use crate::registry::ActorRegistry;
use crate::system::ActorSystem;
use crate::worker_pool::WorkerPool;

thread_local! {
    static CURRENT_ACTOR: Cell<Option<ActorId>> = Cell::new(None);
}

pub(crate) fn current_actor() -> Option<ActorId> {
    CURRENT_ACTOR.with(Cell::get)
}

struct SharedState {
    registry: ActorRegistry,
    active_actors: u64,
}

pub(crate) struct Dispatcher {
    id: Uuid,
    state: Mutex<SharedState>,
    quiescent: Condvar,
    pool: WorkerPool,
    log: slog::Logger,
    mailbox_capacity: usize,
    torn_down: Once,
}

impl Dispatcher {
    /// Builds the dispatcher and its worker pool together: the pool's job
    /// closure needs a way to call back into `run_actor`, and the dispatcher
    /// needs the pool to exist before it can schedule anything. `Weak` (via
    /// `Arc::new_cyclic`) breaks the ownership cycle that would otherwise
    /// leak the dispatcher forever.
    pub(crate) fn new(pool_size: usize, mailbox_capacity: usize, log: slog::Logger) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Dispatcher>| {
            let weak = weak.clone();
            let pool_log = log.clone();
            let pool = WorkerPool::new(
                pool_size,
                move |id| {
                    if let Some(dispatcher) = weak.upgrade() {
                        dispatcher.run_actor(id);
                    }
                },
                pool_log,
            );

            Dispatcher {
                id: Uuid::new_v4(),
                state: Mutex::new(SharedState {
                    registry: ActorRegistry::new(),
                    active_actors: 0,
                }),
                quiescent: Condvar::new(),
                pool,
                log,
                mailbox_capacity,
                torn_down: Once::new(),
            }
        })
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn log(&self) -> &slog::Logger {
        &self.log
    }

    /// Creates the root actor and bumps `active_actors`. Caller is
    /// responsible for sending the initial `HELLO`.
    pub(crate) fn create_root(&self, role: Arc<Role>) -> ActorId {
        let mut state = self.state.lock().unwrap();
        let root = state.registry.add(role, Box::new(()), self.mailbox_capacity);
        state.active_actors += 1;
        root
    }

    pub(crate) fn actor_count(&self) -> usize {
        self.state.lock().unwrap().registry.len()
    }

    /// `send(id, msg)` (§4.4). The push and the scheduling decision happen
    /// in the same critical section — that's what guarantees invariant 1
    /// (exactly one outstanding ticket per non-idle actor).
    pub(crate) fn send(&self, id: ActorId, msg: Message) -> Result<(), SendError> {
        let mut state = self.state.lock().unwrap();

        if id.index() >= state.registry.len() {
            warn!(self.log, "send to unknown actor refused"; "id" => id.value());
            return Err(SendError::NoSuchActor);
        }

        let record = state.registry.get_mut(id).expect("checked above");
        if record.dead {
            warn!(self.log, "send to dead actor refused"; "id" => id.value());
            return Err(SendError::RecipientDead);
        }

        record.mailbox.push(msg, &self.log);

        if !record.scheduled {
            record.scheduled = true;
            trace!(self.log, "ticket scheduled"; "id" => id.value());
            self.pool.schedule(id);
        }

        Ok(())
    }

    /// `run_actor(id)` (§4.4), the job registered with the worker pool.
    fn run_actor(self: &Arc<Self>, id: ActorId) {
        CURRENT_ACTOR.with(|c| c.set(Some(id)));

        let msg = {
            let mut state = self.state.lock().unwrap();
            let record = state
                .registry
                .get_mut(id)
                .expect("a ticket always refers to a live registry slot");
            let msg = record
                .mailbox
                .pop()
                .expect("a ticket is only ever submitted when the mailbox is non-empty");
            record.scheduled = false;
            msg
        };

        match msg.msg_type {
            TERMINATE => self.handle_terminate(id),
            SPAWN => self.handle_spawn(id, msg.payload),
            msg_type => self.handle_user_message(id, msg_type, &msg.payload),
        }

        self.reschedule_or_retire(id);

        CURRENT_ACTOR.with(|c| c.set(None));
    }

    fn handle_terminate(&self, id: ActorId) {
        let mut state = self.state.lock().unwrap();
        state.registry.get_mut(id).expect("actor exists").dead = true;
        debug!(self.log, "actor terminated"; "id" => id.value());
    }

    fn handle_spawn(&self, parent: ActorId, payload: Payload) {
        let role = match payload {
            Payload::Role(role) => role,
            _ => {
                warn!(self.log, "SPAWN delivered without a role payload, ignoring"; "parent" => parent.value());
                return;
            }
        };

        let child = {
            let mut state = self.state.lock().unwrap();
            let child = state.registry.add(role, Box::new(()), self.mailbox_capacity);
            state.active_actors += 1;
            child
        };
        debug!(self.log, "actor spawned"; "parent" => parent.value(), "child" => child.value());

        // HELLO is delivered through the ordinary send path, not specially:
        // the parent's lock has already been released, matching the
        // original's create-then-unlock-then-send ordering.
        let _ = self.send(child, Message::hello(Some(parent)));
    }

    fn handle_user_message(self: &Arc<Self>, id: ActorId, msg_type: u32, payload: &Payload) {
        // Role is immutable once built, so cloning the Arc alongside taking
        // user_state (one lock) is enough: no need to re-fetch it later.
        let prepared = {
            let mut state = self.state.lock().unwrap();
            let record = state.registry.get_mut(id).expect("actor exists");
            if record.role.handler_for(msg_type).is_some() {
                let role = record.role.clone();
                let user_state = std::mem::replace(&mut record.user_state, Box::new(()));
                Some((role, user_state))
            } else {
                None
            }
        };

        let (role, mut user_state) = match prepared {
            Some(prepared) => prepared,
            None => {
                let state = self.state.lock().unwrap();
                let unknown = state
                    .registry
                    .get(id)
                    .expect("actor exists")
                    .role
                    .is_unknown_type(msg_type);
                drop(state);

                // A genuinely out-of-range type indicates a sender holding a
                // stale assumption about this role's shape; a role is free to
                // leave any in-range, non-reserved slot unbound (HELLO most
                // commonly) without that being a bug.
                debug_assert!(!unknown, "message type {msg_type} is outside actor {id}'s dispatch table");
                if unknown {
                    warn!(self.log, "dropping message with an out-of-range type"; "id" => id.value(), "type" => msg_type);
                } else {
                    debug!(self.log, "dropping message with no registered handler"; "id" => id.value(), "type" => msg_type);
                }
                return;
            }
        };

        let handler = role
            .handler_for(msg_type)
            .expect("handler presence was already confirmed above");

        let ctx = ActorContext::new(ActorSystem::from_dispatcher(Arc::clone(self)), id);
        handler(&mut user_state, &ctx, payload);

        let mut state = self.state.lock().unwrap();
        state.registry.get_mut(id).expect("actor exists").user_state = user_state;
    }

    fn reschedule_or_retire(&self, id: ActorId) {
        let mut state = self.state.lock().unwrap();
        let should_schedule = {
            let record = state.registry.get_mut(id).expect("actor exists");
            if !record.mailbox.is_empty() && !record.scheduled {
                record.scheduled = true;
                true
            } else {
                if record.dead && record.mailbox.is_empty() {
                    state.active_actors -= 1;
                    let remaining = state.active_actors;
                    debug!(self.log, "actor quiesced"; "id" => id.value(), "active_actors" => remaining);
                    if remaining == 0 {
                        self.quiescent.notify_all();
                    }
                }
                false
            }
        };

        if should_schedule {
            trace!(self.log, "ticket re-scheduled"; "id" => id.value());
            self.pool.schedule(id);
        }
    }

    /// Blocks until `active_actors == 0`, then tears down exactly once.
    pub(crate) fn join(&self) {
        let mut state = self.state.lock().unwrap();
        while state.active_actors > 0 {
            state = self.quiescent.wait(state).unwrap();
        }
        drop(state);

        self.torn_down.call_once(|| {
            let mut state = self.state.lock().unwrap();
            state.registry.run_destructors();
            drop(state);
            self.pool.shutdown();
        });
    }
}
