//! Compiles loosely-typed field definitions into a cross-referenced type
//! graph and checks data values against it.
//!
//! Raw definitions (`Def`) pass through the `Preprocessor` into `TypeNode`
//! trees, are bound into named `Schema`s, and are linked inside a `Model`
//! that resolves entity references and computes a dependency order.

// public exports are one module level down
pub mod config;
pub mod def;
pub mod error;
pub mod model;
pub mod node;
pub mod path;
pub mod preprocess;
pub mod resolve;
pub mod rule;
pub mod schema;
pub mod types;
pub mod value;

pub use error::{Error, Result};

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, builders, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        config::LinkConfig,
        def::Def,
        model::{Model, ModelSource},
        node::TypeNode,
        resolve::{Namespaces, Resolver},
        schema::{CheckResult, Kind, Schema},
        types::{TypeDescriptor, TypeRegistry},
        value::Value,
    };
}
