//! The data model shared by every actor: messages, payloads and roles (§3).

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::context::ActorContext;
use crate::id::ActorId;

/// Recipient marks itself dead; subsequent sends are refused.
pub const TERMINATE: u32 = 0;
/// Payload is a [`Role`] reference; the runtime creates a child actor with
/// that role and auto-sends `HELLO` to it.
pub const SPAWN: u32 = 1;
/// First message a newly created actor ever receives. Payload carries the
/// parent's id, or `None` for the root actor. Delivered through the normal
/// `send` path, so a role that cares about it registers a handler for it
/// like any other message type.
pub const HELLO: u32 = 2;

/// A handler closure: given the actor's user state, the context (for
/// `send`/`self_id`), and the incoming payload, react and optionally mutate
/// state.
///
/// The distilled spec describes roles as "an ordered sequence of function
/// references". A bare C-style `fn` pointer can't capture anything, which
/// makes it awkward to give two actors built from the same `Role` their own
/// private configuration (see the spawn-chain test). We generalize this to
/// `Box<dyn Fn(..) + Send + Sync>`, the idiomatic Rust reading of "a
/// callable slot in a dispatch table" — still one fixed slot per message
/// type, bound once at actor creation, never reassigned afterwards.
///
/// The state parameter is `&mut Box<dyn Any + Send>` rather than `&mut dyn
/// Any`, mirroring the original `void **stateptr` — a freshly created actor
/// starts with an empty placeholder state, and its first handler (typically
/// the `HELLO` handler) is expected to install real state by assigning
/// through the reference.
pub type Handler = Box<dyn Fn(&mut Box<dyn Any + Send>, &ActorContext, &Payload) + Send + Sync>;

/// Invoked once per actor at system teardown, with that actor's final user
/// state. If a role doesn't supply one, the state is simply dropped.
pub type Destructor = Box<dyn Fn(Box<dyn Any + Send>) + Send + Sync>;

/// An immutable dispatch table bound at actor creation time and shared
/// read-only by every actor created with it (invariant: roles never change
/// after [`RoleBuilder::build`]).
pub struct Role {
    handlers: Vec<Option<Handler>>,
    pub(crate) destructor: Option<Destructor>,
}

impl Role {
    /// Total number of slots in the dispatch table, including the reserved
    /// `TERMINATE`/`SPAWN` slots which are always empty (the dispatcher
    /// intercepts those message types before consulting the table).
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub(crate) fn handler_for(&self, msg_type: u32) -> Option<&Handler> {
        self.handlers.get(msg_type as usize).and_then(|slot| slot.as_ref())
    }

    /// True iff `msg_type` falls outside the dispatch table entirely — as
    /// opposed to landing on a slot within range that simply has nothing
    /// registered (e.g. an unbound `HELLO`), which is a normal, expected
    /// shape for a role and not a sign of anything wrong.
    pub(crate) fn is_unknown_type(&self, msg_type: u32) -> bool {
        msg_type as usize >= self.handlers.len()
    }
}

/// Builds a [`Role`] one message type at a time.
#[derive(Default)]
pub struct RoleBuilder {
    handlers: BTreeMap<u32, Handler>,
    destructor: Option<Destructor>,
}

impl RoleBuilder {
    pub fn new() -> Self {
        RoleBuilder {
            handlers: BTreeMap::new(),
            destructor: None,
        }
    }

    /// Registers the handler for `msg_type`. `TERMINATE` (0) and `SPAWN` (1)
    /// are reserved and intercepted by the dispatcher; registering a handler
    /// for either is a programming error caught immediately.
    pub fn on<F>(mut self, msg_type: u32, handler: F) -> Self
    where
        F: Fn(&mut Box<dyn Any + Send>, &ActorContext, &Payload) + Send + Sync + 'static,
    {
        assert!(
            msg_type >= HELLO,
            "message types 0 (TERMINATE) and 1 (SPAWN) are intercepted by the runtime and cannot be registered"
        );
        self.handlers.insert(msg_type, Box::new(handler));
        self
    }

    /// Registers the destructor invoked over this role's actors' final
    /// state at system teardown.
    pub fn with_destructor<F>(mut self, destructor: F) -> Self
    where
        F: Fn(Box<dyn Any + Send>) + Send + Sync + 'static,
    {
        self.destructor = Some(Box::new(destructor));
        self
    }

    pub fn build(self) -> Arc<Role> {
        let highest = self.handlers.keys().copied().max().unwrap_or(HELLO);
        let mut handlers: Vec<Option<Handler>> = Vec::new();
        handlers.resize_with((highest + 1) as usize, || None);
        for (msg_type, handler) in self.handlers {
            handlers[msg_type as usize] = Some(handler);
        }
        Arc::new(Role {
            handlers,
            destructor: self.destructor,
        })
    }
}

/// The payload carried by a message: either an opaque byte block, or one of
/// the two handle shapes the runtime itself constructs (a spawned `Role`, or
/// a parent id for `HELLO`).
pub enum Payload {
    Empty,
    Bytes(Arc<[u8]>),
    Role(Arc<Role>),
    ActorId(Option<ActorId>),
}

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Bytes(b) => b,
            _ => &[],
        }
    }

    /// The `size` field of the abstract message model.
    pub fn size(&self) -> usize {
        match self {
            Payload::Empty => 0,
            Payload::Bytes(b) => b.len(),
            Payload::Role(_) => std::mem::size_of::<Arc<Role>>(),
            Payload::ActorId(_) => std::mem::size_of::<Option<ActorId>>(),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(Arc::from(bytes))
    }
}

/// An immutable message: `type`, `size`, and `payload` (§3).
pub struct Message {
    pub msg_type: u32,
    pub payload: Payload,
}

impl Message {
    pub fn new(msg_type: u32, payload: Payload) -> Self {
        Message { msg_type, payload }
    }

    pub fn terminate() -> Self {
        Message {
            msg_type: TERMINATE,
            payload: Payload::Empty,
        }
    }

    pub fn spawn(role: Arc<Role>) -> Self {
        Message {
            msg_type: SPAWN,
            payload: Payload::Role(role),
        }
    }

    pub fn hello(parent: Option<ActorId>) -> Self {
        Message {
            msg_type: HELLO,
            payload: Payload::ActorId(parent),
        }
    }

    pub fn size(&self) -> usize {
        self.payload.size()
    }
}
