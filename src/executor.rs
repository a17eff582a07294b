//! The query executor: parse, validate, resolve, project.
//!
//! Execution is eager: the root resolver performs the single upstream fetch
//! before any field projection begins, and every field accessor below is a
//! pure read of the resolved [`EntityRecord`].

use apollo_compiler::ExecutableDocument;
use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::executable;
use apollo_compiler::executable::DirectiveList;
use apollo_compiler::executable::Field;
use apollo_compiler::executable::Operation;
use apollo_compiler::executable::Selection;
use apollo_compiler::executable::SelectionSet;
use indexmap::IndexMap;
use serde_json_bytes::Value;

use crate::Configuration;
use crate::error::ParseErrors;
use crate::error::ServiceBuildError;
use crate::error::ValidationErrors;
use crate::graphql;
use crate::graphql::IntoGraphQLErrors;
use crate::json_ext::Object;
use crate::json_ext::Path;
use crate::record::AbilityEntry;
use crate::record::EntityRecord;
use crate::record::NamedResource;
use crate::resolver::EntityResolver;
use crate::schema::ApiSchema;
use crate::upstream::UpstreamClient;

/// Executes GraphQL queries against the gateway schema.
///
/// Holds the compiled schema and the root resolver; both are read-only, so
/// one executor is safely shared across concurrent query executions.
#[derive(Debug)]
pub struct Executor {
    schema: ApiSchema,
    resolver: EntityResolver,
}

impl Executor {
    pub fn new(configuration: &Configuration) -> Result<Self, ServiceBuildError> {
        let schema = ApiSchema::new()?;
        let upstream = UpstreamClient::new(configuration.upstream_url.clone())
            .map_err(|err| ServiceBuildError::UpstreamClient(err.to_string()))?;
        Ok(Self {
            schema,
            resolver: EntityResolver::new(upstream),
        })
    }

    /// Execute one GraphQL request and produce the response envelope.
    ///
    /// Parse or validation failures return an envelope with no data and the
    /// resolver is never invoked; resolution failures null the field and
    /// record the error, leaving the rest of the envelope well-formed.
    #[tracing::instrument(skip_all, level = "debug")]
    pub async fn execute(&self, request: graphql::Request) -> graphql::Response {
        let Some(query) = request.query.as_deref() else {
            return graphql::Response::from_errors(vec![
                graphql::Error::builder()
                    .message("must provide a query string")
                    .extension_code("GRAPHQL_PARSING_FAILED")
                    .build(),
            ]);
        };

        let document =
            match ExecutableDocument::parse(self.schema.compiler_schema(), query, "query.graphql")
            {
                Ok(document) => document,
                Err(errors) => {
                    let errors = ParseErrors::from(errors);
                    tracing::debug!(%errors, "query parsing failed");
                    return graphql::Response::from_errors(errors.into_graphql_errors());
                }
            };

        let document = match document.validate(self.schema.compiler_schema()) {
            Ok(document) => document,
            Err(errors) => {
                let errors = ValidationErrors::from(errors);
                tracing::debug!(%errors, "query validation failed");
                return graphql::Response::from_errors(errors.into_graphql_errors());
            }
        };

        let operation = match document.operations.get(request.operation_name.as_deref()) {
            Ok(operation) => operation,
            Err(_) => {
                let message = match request.operation_name.as_deref() {
                    Some(name) => format!("unknown operation named \"{name}\""),
                    None => "an operation name is required when the document declares multiple \
                             operations"
                        .to_string(),
                };
                return graphql::Response::from_errors(vec![
                    graphql::Error::builder()
                        .message(message)
                        .extension_code("GRAPHQL_VALIDATION_FAILED")
                        .build(),
                ]);
            }
        };

        if !operation.variables.is_empty() {
            return graphql::Response::from_errors(vec![
                graphql::Error::builder()
                    .message(
                        "variables are not supported; inline the argument values into the query",
                    )
                    .extension_code("GRAPHQL_VALIDATION_FAILED")
                    .build(),
            ]);
        }

        let (data, errors) = self.execute_root(&document, operation).await;
        graphql::Response::builder()
            .data(Value::Object(data))
            .errors(errors)
            .build()
    }

    /// Execute the root selection set. Each `entity` occurrence performs its
    /// own resolution; a failed resolution nulls that response key only.
    async fn execute_root(
        &self,
        document: &ExecutableDocument,
        operation: &Node<Operation>,
    ) -> (Object, Vec<graphql::Error>) {
        let mut data = Object::default();
        let mut errors = Vec::new();

        for (response_key, fields) in collect_fields(document, &[&operation.selection_set], "Query")
        {
            let field = fields[0];
            match field.name.as_str() {
                "__typename" => {
                    data.insert(response_key.as_str(), "Query".into());
                }
                "entity" => match entity_id_argument(field) {
                    Ok(id) => match self.resolver.resolve(id).await {
                        Ok(record) => {
                            data.insert(
                                response_key.as_str(),
                                project_entity(document, &record, &fields),
                            );
                        }
                        Err(err) => {
                            tracing::debug!(error = %err, entity.id = id, "entity resolution failed");
                            errors
                                .push(err.to_graphql_error(Some(Path::from(response_key.as_str()))));
                            data.insert(response_key.as_str(), Value::Null);
                        }
                    },
                    Err(error) => {
                        errors.push(error);
                        data.insert(response_key.as_str(), Value::Null);
                    }
                },
                "__schema" | "__type" => {
                    errors.push(
                        graphql::Error::builder()
                            .message("introspection is not supported")
                            .extension_code("INTROSPECTION_NOT_SUPPORTED")
                            .build(),
                    );
                    data.insert(response_key.as_str(), Value::Null);
                }
                other => {
                    // validation guarantees the field exists on Query
                    tracing::debug!(field = other, "unexpected root field survived validation");
                    data.insert(response_key.as_str(), Value::Null);
                }
            }
        }

        (data, errors)
    }
}

/// Bind the `id: Int!` argument of an `entity` field.
///
/// Validation has already checked the argument against the schema; the
/// remaining failure modes are an out-of-range Int literal and the
/// unsupported variable indirection.
fn entity_id_argument(field: &Node<Field>) -> Result<i32, graphql::Error> {
    let argument = field
        .arguments
        .iter()
        .find(|argument| argument.name.as_str() == "id");
    match argument.map(|argument| argument.value.as_ref()) {
        Some(executable::Value::Int(value)) => value.try_to_i32().map_err(|_| {
            graphql::Error::builder()
                .message("`id` argument is out of range for Int")
                .extension_code("GRAPHQL_VALIDATION_FAILED")
                .build()
        }),
        _ => Err(graphql::Error::builder()
            .message("`id` argument must be provided as an Int literal")
            .extension_code("GRAPHQL_VALIDATION_FAILED")
            .build()),
    }
}

/// Collect the fields selected on `type_name` across one or more selection
/// sets, flattening fragment spreads and inline fragments, in selection
/// order.
///
/// Duplicate response keys are grouped together so their sub-selections can
/// be merged, per the GraphQL field-collection rules.
fn collect_fields<'a>(
    document: &'a ExecutableDocument,
    selection_sets: &[&'a SelectionSet],
    type_name: &str,
) -> IndexMap<&'a Name, Vec<&'a Node<Field>>> {
    let mut fields = IndexMap::new();
    for selection_set in selection_sets {
        collect_into(document, selection_set, type_name, &mut fields);
    }
    fields
}

fn collect_into<'a>(
    document: &'a ExecutableDocument,
    selection_set: &'a SelectionSet,
    type_name: &str,
    fields: &mut IndexMap<&'a Name, Vec<&'a Node<Field>>>,
) {
    for selection in &selection_set.selections {
        match selection {
            Selection::Field(field) => {
                if is_included(&field.directives) {
                    fields.entry(field.response_key()).or_default().push(field);
                }
            }
            Selection::InlineFragment(inline) => {
                let applies = inline
                    .type_condition
                    .as_ref()
                    .is_none_or(|condition| condition.as_str() == type_name);
                if applies && is_included(&inline.directives) {
                    collect_into(document, &inline.selection_set, type_name, fields);
                }
            }
            Selection::FragmentSpread(spread) => {
                let Some(fragment) = document.fragments.get(&spread.fragment_name) else {
                    // validation guarantees the fragment exists
                    continue;
                };
                if fragment.selection_set.ty.as_str() == type_name && is_included(&spread.directives)
                {
                    collect_into(document, &fragment.selection_set, type_name, fields);
                }
            }
        }
    }
}

/// Evaluate constant `@skip`/`@include` directives. Variables are rejected
/// before execution, so any condition present is a Boolean literal.
fn is_included(directives: &DirectiveList) -> bool {
    if directive_condition(directives, "skip") == Some(true) {
        return false;
    }
    if directive_condition(directives, "include") == Some(false) {
        return false;
    }
    true
}

fn directive_condition(directives: &DirectiveList, name: &str) -> Option<bool> {
    match directives.get(name)?.specified_argument_by_name("if")?.as_ref() {
        executable::Value::Boolean(condition) => Some(*condition),
        _ => None,
    }
}

/// Project an entity record through the merged occurrences of one `entity`
/// field, shaping the output exactly to the client's selection.
fn project_entity(
    document: &ExecutableDocument,
    record: &EntityRecord,
    occurrences: &[&Node<Field>],
) -> Value {
    let selection_sets: Vec<&SelectionSet> = occurrences
        .iter()
        .map(|field| &field.selection_set)
        .collect();
    let mut output = Object::default();
    for (response_key, fields) in collect_fields(document, &selection_sets, "Entity") {
        let value = match fields[0].name.as_str() {
            "__typename" => "Entity".into(),
            "id" => record.id.into(),
            "name" => record.name.as_str().into(),
            "weight" => record.weight.into(),
            "forms" => Value::Array(
                record
                    .forms
                    .iter()
                    .map(|form| project_resource(document, form, &fields, "Form"))
                    .collect(),
            ),
            "abilities" => Value::Array(
                record
                    .abilities
                    .iter()
                    .map(|entry| project_ability(document, entry, &fields))
                    .collect(),
            ),
            other => {
                // validation guarantees the field exists on Entity
                tracing::debug!(field = other, "unexpected Entity field survived validation");
                Value::Null
            }
        };
        output.insert(response_key.as_str(), value);
    }
    Value::Object(output)
}

fn project_ability(
    document: &ExecutableDocument,
    entry: &AbilityEntry,
    occurrences: &[&Node<Field>],
) -> Value {
    let selection_sets: Vec<&SelectionSet> = occurrences
        .iter()
        .map(|field| &field.selection_set)
        .collect();
    let mut output = Object::default();
    for (response_key, fields) in collect_fields(document, &selection_sets, "Ability") {
        let value = match fields[0].name.as_str() {
            "__typename" => "Ability".into(),
            "slot" => entry.slot.into(),
            "is_hidden" => entry.is_hidden.into(),
            "ability" => project_resource(document, &entry.ability, &fields, "Form"),
            other => {
                tracing::debug!(field = other, "unexpected Ability field survived validation");
                Value::Null
            }
        };
        output.insert(response_key.as_str(), value);
    }
    Value::Object(output)
}

fn project_resource(
    document: &ExecutableDocument,
    resource: &NamedResource,
    occurrences: &[&Node<Field>],
    type_name: &str,
) -> Value {
    let selection_sets: Vec<&SelectionSet> = occurrences
        .iter()
        .map(|field| &field.selection_set)
        .collect();
    let mut output = Object::default();
    for (response_key, fields) in collect_fields(document, &selection_sets, type_name) {
        let value = match fields[0].name.as_str() {
            "__typename" => type_name.into(),
            "url" => resource.url.as_str().into(),
            "name" => resource.name.as_str().into(),
            other => {
                tracing::debug!(field = other, "unexpected resource field survived validation");
                Value::Null
            }
        };
        output.insert(response_key.as_str(), value);
    }
    Value::Object(output)
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;

    fn sample_record() -> EntityRecord {
        EntityRecord {
            id: 1,
            name: "bulbasaur".to_string(),
            weight: 69,
            forms: vec![NamedResource {
                name: "bulbasaur".to_string(),
                url: "https://lookup.example/api/v2/pokemon-form/1/".to_string(),
            }],
            abilities: vec![
                AbilityEntry {
                    slot: 1,
                    is_hidden: false,
                    ability: NamedResource {
                        name: "overgrow".to_string(),
                        url: "https://lookup.example/api/v2/ability/65/".to_string(),
                    },
                },
                AbilityEntry {
                    slot: 3,
                    is_hidden: true,
                    ability: NamedResource {
                        name: "chlorophyll".to_string(),
                        url: "https://lookup.example/api/v2/ability/34/".to_string(),
                    },
                },
            ],
            ..Default::default()
        }
    }

    /// Parse and validate `query`, then project `record` through its single
    /// root `entity` field.
    fn project(query: &str, record: &EntityRecord) -> Value {
        let schema = ApiSchema::new().expect("schema compiles");
        let document =
            ExecutableDocument::parse_and_validate(schema.compiler_schema(), query, "query.graphql")
                .expect("query is valid");
        let operation = document.operations.get(None).expect("single operation");
        let grouped = collect_fields(&document, &[&operation.selection_set], "Query");
        let (response_key, fields) = grouped.into_iter().next().expect("one root field");
        assert_eq!(fields[0].name.as_str(), "entity", "root field {response_key} is entity");
        project_entity(&document, record, &fields)
    }

    #[test]
    fn projection_is_exact() {
        let projected = project("{ entity(id: 1) { id } }", &sample_record());
        assert_eq!(projected, json!({ "id": 1 }));
    }

    #[test]
    fn projection_follows_selection_order_and_aliases() {
        let projected = project("{ entity(id: 1) { nick: name id } }", &sample_record());
        assert_eq!(projected, json!({ "nick": "bulbasaur", "id": 1 }));
        let keys: Vec<&str> = projected
            .as_object()
            .expect("projection is an object")
            .keys()
            .map(|key| key.as_str())
            .collect();
        assert_eq!(keys, ["nick", "id"]);
    }

    #[test]
    fn projection_resolves_nested_lists() {
        let projected = project(
            "{ entity(id: 1) { abilities { slot is_hidden ability { name } } } }",
            &sample_record(),
        );
        assert_eq!(
            projected,
            json!({
                "abilities": [
                    { "slot": 1, "is_hidden": false, "ability": { "name": "overgrow" } },
                    { "slot": 3, "is_hidden": true, "ability": { "name": "chlorophyll" } },
                ]
            })
        );
    }

    #[test]
    fn projection_flattens_fragments_and_merges_duplicate_keys() {
        let projected = project(
            "query {
                entity(id: 1) {
                    ...urls
                    forms { name }
                    ... on Entity { __typename }
                }
            }
            fragment urls on Entity {
                forms { url }
            }",
            &sample_record(),
        );
        assert_eq!(
            projected,
            json!({
                "forms": [{
                    "url": "https://lookup.example/api/v2/pokemon-form/1/",
                    "name": "bulbasaur",
                }],
                "__typename": "Entity",
            })
        );
    }

    #[test]
    fn projection_honors_constant_skip_and_include() {
        let projected = project(
            "{ entity(id: 1) { name @skip(if: true) id @include(if: true) weight @include(if: false) } }",
            &sample_record(),
        );
        assert_eq!(projected, json!({ "id": 1 }));
    }

    #[tokio::test]
    async fn unknown_field_fails_validation_with_no_data() {
        let executor = Executor::new(&Configuration::default()).expect("executor builds");
        let response = executor
            .execute(
                graphql::Request::builder()
                    .query("{ entity(id: 1) { color } }".to_string())
                    .build(),
            )
            .await;
        assert_eq!(response.data, None);
        assert!(!response.errors.is_empty());
        assert_eq!(
            response.errors[0].extension_code().as_deref(),
            Some("GRAPHQL_VALIDATION_FAILED")
        );
    }

    #[tokio::test]
    async fn malformed_query_fails_parsing_with_locations() {
        let executor = Executor::new(&Configuration::default()).expect("executor builds");
        let response = executor
            .execute(
                graphql::Request::builder()
                    .query("{ entity(id: 1) { name }".to_string())
                    .build(),
            )
            .await;
        assert_eq!(response.data, None);
        assert!(!response.errors.is_empty());
        assert_eq!(
            response.errors[0].extension_code().as_deref(),
            Some("GRAPHQL_PARSING_FAILED")
        );
        assert!(!response.errors[0].locations.is_empty());
    }

    #[tokio::test]
    async fn missing_query_string_is_reported_in_band() {
        let executor = Executor::new(&Configuration::default()).expect("executor builds");
        let response = executor.execute(graphql::Request::builder().build()).await;
        assert_eq!(response.data, None);
        assert_eq!(response.errors[0].message, "must provide a query string");
    }

    #[tokio::test]
    async fn variable_documents_are_rejected_before_resolution() {
        let executor = Executor::new(&Configuration::default()).expect("executor builds");
        let response = executor
            .execute(
                graphql::Request::builder()
                    .query("query Lookup($id: Int!) { entity(id: $id) { name } }".to_string())
                    .build(),
            )
            .await;
        assert_eq!(response.data, None);
        assert!(response.errors[0].message.contains("variables are not supported"));
    }

    #[tokio::test]
    async fn multiple_operations_require_an_operation_name() {
        let executor = Executor::new(&Configuration::default()).expect("executor builds");
        let response = executor
            .execute(
                graphql::Request::builder()
                    .query(
                        "query A { entity(id: 1) { name } } query B { entity(id: 2) { name } }"
                            .to_string(),
                    )
                    .build(),
            )
            .await;
        assert_eq!(response.data, None);
        assert!(!response.errors.is_empty());
    }

    #[tokio::test]
    async fn unknown_operation_name_is_an_error() {
        let executor = Executor::new(&Configuration::default()).expect("executor builds");
        let response = executor
            .execute(
                graphql::Request::builder()
                    .query("query A { entity(id: 1) { name } }".to_string())
                    .operation_name("Nope".to_string())
                    .build(),
            )
            .await;
        assert_eq!(response.data, None);
        assert!(response.errors[0].message.contains("Nope"));
    }
}
