//! Version resolution.
//!
//! - [`property`]: follows `${...}` / `project.ext[...]` indirections through
//!   layered property scopes (local → parent → root).
//! - [`managed`]: looks up effective versions in Maven `dependencyManagement`.

pub mod managed;
pub mod property;
