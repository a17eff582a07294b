//! The graph schema exposed to clients.

use apollo_compiler::Schema;
use apollo_compiler::validation::Valid;

use crate::error::SchemaError;

/// The schema SDL.
///
/// This declares the curated subset of the upstream entity record that is
/// exposed to clients; adding a field here requires a matching accessor in
/// the executor's projection.
const SDL: &str = r#"
type Query {
  "Look up one entity by its upstream numeric identifier."
  entity(id: Int!): Entity
}

type Entity {
  id: Int
  name: String
  weight: Int
  forms: [Form]
  abilities: [Ability]
}

"A name plus the URL of the upstream resource it refers to."
type Form {
  url: String
  name: String
}

type Ability {
  slot: Int
  is_hidden: Boolean
  ability: Form
}
"#;

/// The compiled schema, built once at startup and shared read-only across
/// concurrent query executions.
#[derive(Debug)]
pub(crate) struct ApiSchema {
    schema: Valid<Schema>,
}

impl ApiSchema {
    pub(crate) fn new() -> Result<Self, SchemaError> {
        let schema = Schema::parse_and_validate(SDL, "entity.graphql")
            .map_err(|err| SchemaError::Validate(err.into()))?;
        Ok(Self { schema })
    }

    pub(crate) fn compiler_schema(&self) -> &Valid<Schema> {
        &self.schema
    }
}
