//! Interactive editing: the authoring state machine and the session that owns template snapshots.

pub(crate) mod controller;
pub(crate) mod session;
