//! Rule-tree based request optimization for Prebid Server.
//!
//! # Overview
//!
//! A declarative [`Conf`] lists one *schema function* per tree level and a set of rules. Each rule
//! gives one expected outcome per level plus a terminal *result function*. [`build_rules_tree`]
//! compiles the configuration into an immutable [`Rules`] tree once; the tree is then evaluated
//! against every incoming [`RequestWrapper`], walking the edge that matches each level's outcome
//! until a result function rewrites the request (e.g. sets `device.ip` or excludes bidders).
//!
//! Schema functions only get a shared reference to the request ([`SchemaFunction`]); result
//! functions are the only ones handed a mutable one ([`ResultFunction`]). A single [`Rules`]
//! instance can therefore be shared between threads evaluating different requests.
//!
//! A request whose outcome has no matching edge is left untouched. This is normal: a rule set
//! doesn't have to be exhaustive.
//!
//! [`Rules::evaluate`] descends recursively and [`execute_flat`] walks the same tree
//! iteratively; both produce the same outcome and mutation.
//!
//! [`OptimizationModule`] wraps a hot-swappable [`RulesStore`] for use inside a request pipeline.
//!
//! # Error Handling
//!
//! Errors are represented by the [`Error`] enum. Configuration problems (malformed JSON, unknown
//! function names, invalid arguments, rules that don't fit the schema) are reported when the tree
//! is built, never during evaluation.
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate with the
//! `prebid_optimization` target.

#![warn(rustdoc::missing_crate_level_docs)]

mod builder;
mod conf;
mod config;
mod error;
mod eval;
pub mod functions;
mod module;
mod registry;
mod request;
mod rules;
mod rules_store;

pub use builder::{build_rules_tree, build_rules_tree_with};
pub use conf::{Conf, ResultConf, Rule, Schema};
pub use config::ModuleConfig;
pub use error::{Error, Result};
pub use eval::execute_flat;
pub use functions::{ResultFunction, SchemaFunction};
pub use module::OptimizationModule;
pub use registry::{new_result_function_factory, new_schema_function_factory, FunctionRegistry};
pub use request::{
    App, BidRequest, Channel, Device, Geo, Imp, PrebidExt, RequestExt, RequestWrapper, Site,
};
pub use rules::{Node, Rules};
pub use rules_store::RulesStore;
