//! Template + data -> render plan.

pub(crate) mod placement;
pub(crate) mod plan;
