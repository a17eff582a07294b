use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::ByteString;
use serde_json_bytes::Map;
use serde_json_bytes::Value;

use super::Error;
use crate::json_ext::Object;

/// A GraphQL response envelope.
///
/// `data` is absent (not `null`) when the request failed before execution
/// began; `errors` is omitted from the wire when empty.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// The response data.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<Value>,

    /// The optional graphql errors encountered.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<Error>,

    /// The optional graphql extensions.
    #[serde(skip_serializing_if = "Object::is_empty", default)]
    pub extensions: Object,
}

#[buildstructor::buildstructor]
impl Response {
    /// Constructor
    #[builder(visibility = "pub")]
    fn new(data: Option<Value>, errors: Vec<Error>, extensions: Map<ByteString, Value>) -> Self {
        Self {
            data,
            errors,
            extensions,
        }
    }
}

impl Response {
    /// A response that failed before execution began: no data, only errors.
    pub(crate) fn from_errors(errors: Vec<Error>) -> Self {
        Self {
            errors,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;

    #[test]
    fn response_omits_empty_members_on_the_wire() {
        let response = Response::builder()
            .data(json!({ "entity": { "name": "aurorix" } }))
            .build();
        let serialized = serde_json::to_value(&response).expect("response serializes");
        assert_eq!(
            serialized,
            serde_json::json!({ "data": { "entity": { "name": "aurorix" } } })
        );
    }

    #[test]
    fn failed_response_carries_only_errors() {
        let response =
            Response::from_errors(vec![Error::builder().message("malformed query").build()]);
        let serialized = serde_json::to_value(&response).expect("response serializes");
        assert_eq!(
            serialized,
            serde_json::json!({ "errors": [{ "message": "malformed query" }] })
        );
    }

    #[test]
    fn response_deserializes_data_and_errors() {
        let response: Response = serde_json::from_str(
            r#"{"data": {"entity": null}, "errors": [{"message": "boom"}]}"#,
        )
        .expect("response deserializes");
        assert_eq!(response.data, Some(json!({ "entity": null })));
        assert_eq!(response.errors.len(), 1);
        assert!(response.extensions.is_empty());
    }
}
