use std::fmt;

/// A stable, dense integer identifying an actor within one [`crate::system::ActorSystem`].
///
/// Ids are assigned by the registry in creation order starting at zero and are
/// never reused (see the registry's append-only invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u64);

impl ActorId {
    /// Builds an id from a raw integer. Exposed so callers can address an id
    /// that may or may not exist (e.g. to exercise the "unknown id" refusal).
    pub fn new(value: u64) -> Self {
        ActorId(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ActorId {
    fn from(value: u64) -> Self {
        ActorId(value)
    }
}
