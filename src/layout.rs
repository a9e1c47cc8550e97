//! Layout of zone content inside zone boxes.

pub(crate) mod text;
