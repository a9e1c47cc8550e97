//! Text measurement.

pub(crate) mod metrics;
