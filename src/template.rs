//! Template data model: canvas, layers, zones, and the edits that change them.

pub(crate) mod condition;
pub(crate) mod dsl;
pub(crate) mod model;
pub(crate) mod mutation;
pub(crate) mod zones;
