//! CLI command implementations.

pub(crate) mod merge;
pub(crate) mod plan;
pub(crate) mod search;
pub(crate) mod source;
