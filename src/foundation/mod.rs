//! Shared primitives: frame/time types, colors, math helpers and the crate error taxonomy.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod math;
