//! Route handlers module.

pub mod status;
