//! The handle passed to every handler invocation, giving it access to `send`
//! and its own id without the runtime needing to inspect user state.

use crate::error::SendError;
use crate::id::ActorId;
use crate::message::Message;
use crate::system::ActorSystem;

pub struct ActorContext {
    system: ActorSystem,
    self_id: ActorId,
}

impl ActorContext {
    pub(crate) fn new(system: ActorSystem, self_id: ActorId) -> Self {
        ActorContext { system, self_id }
    }

    /// The id of the actor currently handling a message, equivalent to
    /// calling [`crate::system::actor_id_self`] from inside the handler.
    pub fn self_id(&self) -> ActorId {
        self.self_id
    }

    pub fn send(&self, id: ActorId, msg: Message) -> Result<(), SendError> {
        self.system.send(id, msg)
    }

    pub fn system(&self) -> &ActorSystem {
        &self.system
    }
}
