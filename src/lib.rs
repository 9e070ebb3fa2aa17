//! Template functions for schema-driven code generation.
//!
//! Provides:
//! - `model`: the introspected schema handed to templates
//! - `sql`: column lists, placeholders and WHERE/SET clauses
//! - `types`: Go type qualification and conversion expressions
//! - `bridge`, `proto`: protobuf messages and model <-> protobuf conversions
//! - `funcs`: the named function table templates call into
//!
//! Every function hangs off a [`Generator`], created once per generation run.

pub mod bridge;
pub mod config;
pub mod diagnostics;
pub mod dialect;
pub mod error;
pub mod funcs;
pub mod generator;
pub mod model;
pub mod naming;
pub mod proto;
pub mod resolver;
pub mod sql;
pub mod types;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use generator::Generator;

pub mod prelude {
    pub use crate::config::{Config, MethodsConfig};
    pub use crate::dialect::{Dialect, Loader};
    pub use crate::error::{Error, Result};
    pub use crate::funcs::{Arg, Output, FUNCTIONS};
    pub use crate::generator::Generator;
    pub use crate::model::*;
    pub use crate::resolver::Scope;
}
