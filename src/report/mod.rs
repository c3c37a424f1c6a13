//! Report renderers for comparison results.
//!
//! - [`terminal`]: colored summary box plus one table per drift class and pair;
//!   respects `--verbose` / `--quiet`.
//! - [`json`]: the full [`crate::models::RunReport`] as pretty-printed JSON.

pub mod json;
pub mod terminal;
