//! A GraphQL gateway that fronts a REST entity lookup service.
//!
//! Inbound queries are parsed and validated against a fixed schema, the root
//! `entity` field is resolved with a single upstream HTTP fetch, and the
//! decoded record is projected through the schema's field accessors into a
//! `{data, errors}` response envelope. Resolution is eager: all I/O happens
//! once, before any field projection begins.

mod configuration;
mod error;
mod executor;
pub mod graphql;
pub mod json_ext;
mod record;
mod resolver;
mod schema;
mod server;
mod upstream;

pub use configuration::Configuration;
pub use error::SchemaError;
pub use error::ServiceBuildError;
pub use error::ValidationErrors;
pub use executor::Executor;
pub use server::app;
