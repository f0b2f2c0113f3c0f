#![crate_name = "dispatch_actors"]
#![deny(clippy::all)]
#![allow(clippy::new_ret_no_self)]

//! A minimal actor runtime.
//!
//! Actors are addressed by [`ActorId`], communicate only by sending
//! [`Message`]s through an [`ActorSystem`], and are dispatched one message at
//! a time onto a fixed pool of worker threads — never two messages for the
//! same actor concurrently, never unbounded thread growth under load.
//!
//! ```no_run
//! use dispatch_actors::{ActorSystem, RoleBuilder};
//!
//! let role = RoleBuilder::new()
//!     .on(2 /* HELLO */, |_state, ctx, _payload| {
//!         println!("actor {} says hello", ctx.self_id());
//!     })
//!     .build();
//!
//! let system = ActorSystem::create(role).unwrap();
//! system.join();
//! ```

mod config;
mod context;
mod dispatcher;
mod error;
mod id;
mod mailbox;
mod message;
mod registry;
mod system;
mod worker_pool;

pub use crate::config::SystemConfig;
pub use crate::context::ActorContext;
pub use crate::error::{CreateError, SendError};
pub use crate::id::ActorId;
pub use crate::message::{Destructor, Handler, Message, Payload, Role, RoleBuilder, HELLO, SPAWN, TERMINATE};
pub use crate::system::{actor_id_self, ActorSystem};
pub use uuid::Uuid;
