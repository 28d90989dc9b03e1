//! Oracle implementations backing the core's resolver and API-diff seams.

pub mod clirr;
pub mod types;
