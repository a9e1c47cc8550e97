//! Shared transform helpers.

pub(crate) mod preview;
