//! Configuration loading (§4.6, §6.4).
//!
//! `pool_size` and `mailbox_capacity` are compile-time constants in the
//! abstract spec. This crate keeps that contract (there is a hard floor,
//! [`MIN_MAILBOX_CAPACITY`]) but, in the teacher's `load_config()` style,
//! lets an operator override the defaults through an optional TOML file and
//! environment variables rather than requiring a recompile.

use std::env;

use config::{Config as RawConfig, Environment, File};

/// Mailbox capacity is a compile-time constant `>= 1024` (invariant 5, §3).
pub const MIN_MAILBOX_CAPACITY: usize = 1024;

#[derive(Clone, Debug)]
pub struct SystemConfig {
    pub pool_size: usize,
    pub mailbox_capacity: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            pool_size: num_cpus::get().max(1),
            mailbox_capacity: MIN_MAILBOX_CAPACITY,
        }
    }
}

impl SystemConfig {
    /// Loads defaults, then an optional file (path from `ACTORS_CONF`,
    /// defaulting to `config/actors.toml`), then environment variables
    /// prefixed `ACTORS_` (e.g. `ACTORS_POOL_SIZE=8`). A missing or
    /// unreadable file is ignored, matching the teacher's `load_config()`
    /// treatment of its own `RIKER_CONF` file — this never fails, it only
    /// ever falls back to [`SystemConfig::default`].
    pub fn load() -> Self {
        let defaults = SystemConfig::default();
        match Self::try_load(&defaults) {
            Ok(cfg) => cfg,
            Err(_) => defaults,
        }
    }

    fn try_load(defaults: &SystemConfig) -> Result<Self, config::ConfigError> {
        let path = env::var("ACTORS_CONF").unwrap_or_else(|_| "config/actors.toml".into());

        let raw = RawConfig::builder()
            .set_default("pool_size", defaults.pool_size as i64)?
            .set_default("mailbox_capacity", defaults.mailbox_capacity as i64)?
            .add_source(File::with_name(&path).required(false))
            .add_source(Environment::with_prefix("ACTORS"))
            .build()?;

        Ok(SystemConfig {
            pool_size: raw.get_int("pool_size")? as usize,
            mailbox_capacity: raw.get_int("mailbox_capacity")? as usize,
        })
    }
}
