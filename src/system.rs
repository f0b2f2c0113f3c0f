//! The public handle to a running actor system (§4.1, §4.5).

use std::sync::Arc;

use slog::{info, o};
use uuid::Uuid;

use crate::config::SystemConfig;
use crate::dispatcher::{self, Dispatcher};
use crate::error::{CreateError, SendError};
use crate::id::ActorId;
use crate::message::{Message, Role};

/// A cheap, cloneable handle shared by every [`crate::context::ActorContext`]
/// and returned by [`ActorSystem::create`]. Dropping every clone does not
/// tear the system down early — only [`ActorSystem::join`] does that, and
/// only once all actors have quiesced (§4.5).
#[derive(Clone)]
pub struct ActorSystem {
    inner: Arc<Dispatcher>,
}

impl ActorSystem {
    /// The library default: discards everything. The teacher's own
    /// `ActorSystem::new` always builds its own terminal/file logger from
    /// config before constructing a system; a leaf crate like this one has
    /// no business picking a drain for its embedder, so the real default is
    /// silence and [`ActorSystem::create_with`] is how a binary wires in
    /// `slog-term`/`slog-async` or anything else.
    fn default_log() -> slog::Logger {
        slog::Logger::root(slog::Discard, o!("crate" => "dispatch-actors"))
    }

    /// Creates a system with configuration loaded via [`SystemConfig::load`]
    /// (§4.6) and a logger that discards everything, then spawns the root
    /// actor with `role` and delivers its `HELLO` (parent `None`). Use
    /// [`ActorSystem::create_with`] to supply a real drain.
    pub fn create(role: Arc<Role>) -> Result<Self, CreateError> {
        Self::create_with(role, SystemConfig::load(), Self::default_log())
    }

    /// As [`ActorSystem::create`], but with an explicit configuration and
    /// logger — the entry point integration tests use to keep output quiet
    /// and pool sizes deterministic.
    pub fn create_with(role: Arc<Role>, config: SystemConfig, log: slog::Logger) -> Result<Self, CreateError> {
        if config.pool_size == 0 {
            return Err(CreateError::InvalidPoolSize);
        }
        if config.mailbox_capacity < crate::config::MIN_MAILBOX_CAPACITY {
            return Err(CreateError::InvalidMailboxCapacity {
                configured: config.mailbox_capacity,
                minimum: crate::config::MIN_MAILBOX_CAPACITY,
            });
        }

        info!(log, "starting actor system"; "pool_size" => config.pool_size, "mailbox_capacity" => config.mailbox_capacity);

        let dispatcher = Dispatcher::new(config.pool_size, config.mailbox_capacity, log);
        info!(dispatcher.log(), "assigned system id"; "id" => dispatcher.id().to_string());
        let root = dispatcher.create_root(role);
        let system = ActorSystem { inner: dispatcher };

        system
            .send(root, Message::hello(None))
            .map_err(CreateError::RootHelloFailed)?;

        Ok(system)
    }

    pub(crate) fn from_dispatcher(inner: Arc<Dispatcher>) -> Self {
        ActorSystem { inner }
    }

    /// The root actor's id — always `ActorId::new(0)`, but named for clarity
    /// at call sites.
    pub fn root_id(&self) -> ActorId {
        ActorId::new(0)
    }

    /// A random id assigned once at creation, distinguishing this running
    /// system from any other — handy for correlating log output when more
    /// than one system is alive in the same process (e.g. in tests).
    pub fn id(&self) -> Uuid {
        self.inner.id()
    }

    pub fn send(&self, id: ActorId, msg: Message) -> Result<(), SendError> {
        self.inner.send(id, msg)
    }

    /// Number of actors ever created, live or dead (§4.2) — dead actors are
    /// never removed, so this only grows.
    pub fn actor_count(&self) -> usize {
        self.inner.actor_count()
    }

    /// Blocks the calling thread until every actor has gone quiescent
    /// (§4.5), then runs role destructors and shuts the worker pool down.
    /// Safe to call from multiple threads or more than once: teardown itself
    /// runs exactly once.
    pub fn join(&self) {
        self.inner.join();
    }
}

/// The id of the actor currently executing on the calling (worker) thread,
/// or `None` if called from outside a handler.
pub fn actor_id_self() -> Option<ActorId> {
    dispatcher::current_actor()
}
