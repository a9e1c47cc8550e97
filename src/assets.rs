//! Asset reference resolution.

pub(crate) mod catalog;
