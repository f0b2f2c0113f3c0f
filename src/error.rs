//! Error taxonomy for the runtime (§7 of the design).
//!
//! The abstract protocol this crate implements reports failures as dense
//! negative integers (`0` success, `-1`, `-2`, ...). We keep that contract
//! documented on each variant but surface it through `thiserror`-derived
//! enums, the way the rest of the ambient stack reports errors, rather than
//! as bare `i32`s.

use thiserror::Error;

/// Failure of [`crate::system::ActorSystem::send`].
///
/// Corresponds to the two negative `send_message` codes in the abstract API:
/// `RecipientDead` is `-1`, `NoSuchActor` is `-2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    /// The recipient already processed `TERMINATE` and will accept no more messages.
    #[error("recipient actor has already terminated")]
    RecipientDead,
    /// No actor has ever been assigned this id.
    #[error("no such actor")]
    NoSuchActor,
}

/// Failure of [`crate::system::ActorSystem::create`] / `create_with_config`.
///
/// Each variant corresponds to one of the distinct negative init-step codes
/// the abstract `create_system` entry point returns.
#[derive(Debug, Error)]
pub enum CreateError {
    /// `pool_size` was configured as zero; a system with no workers can never
    /// make progress.
    #[error("pool_size must be at least 1")]
    InvalidPoolSize,
    /// `mailbox_capacity` was configured below the compile-time floor.
    #[error("mailbox_capacity must be at least {minimum} (configured {configured})")]
    InvalidMailboxCapacity { configured: usize, minimum: usize },
    /// The root actor's initial `HELLO` could not be delivered. Under normal
    /// operation this cannot happen (the registry was just created and the
    /// root id was just issued), so seeing this means the runtime itself is
    /// broken, not user error.
    #[error("failed to deliver the initial HELLO to the root actor: {0}")]
    RootHelloFailed(#[source] SendError),
}
