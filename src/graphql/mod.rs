//! Types related to GraphQL requests, responses, etc.

mod request;
mod response;

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::ByteString;
use serde_json_bytes::Map as JsonMap;
use serde_json_bytes::Value;

pub use crate::json_ext::Object;
pub use crate::json_ext::Path;
pub use request::Request;
pub use response::Response;

/// The error location
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// The line number
    pub line: u32,
    /// The column number
    pub column: u32,
}

/// A [GraphQL error](https://spec.graphql.org/October2021/#sec-Errors)
/// as may be found in the `errors` field of a GraphQL [`Response`].
///
/// Converted to (or from) JSON with serde.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Error {
    /// The error message.
    pub message: String,

    /// The locations of the error in the GraphQL document of the originating
    /// request.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,

    /// If this is a field error, the JSON path to that field in
    /// [`Response::data`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Path>,

    /// The optional GraphQL extensions for this error.
    #[serde(skip_serializing_if = "Object::is_empty")]
    pub extensions: Object,
}

#[buildstructor::buildstructor]
impl Error {
    /// Returns a builder that builds a GraphQL [`Error`] from its components.
    ///
    /// `.message()` is required; `.locations()`, `.path()`, `.extensions()`
    /// and `.extension_code()` are optional. The extension code lands under
    /// the `code` key of the extension map unless that key is already set.
    #[builder(visibility = "pub")]
    fn new(
        message: String,
        locations: Vec<Location>,
        path: Option<Path>,
        extension_code: Option<String>,
        // Skip the `Object` type alias in order to use buildstructor's map special-casing
        mut extensions: JsonMap<ByteString, Value>,
    ) -> Self {
        if let Some(code) = extension_code {
            extensions
                .entry("code")
                .or_insert(Value::String(ByteString::from(code)));
        }
        Self {
            message,
            locations,
            path,
            extensions,
        }
    }
}

impl Error {
    /// Extract the error code from [`Error::extensions`] as a String if it is set.
    pub fn extension_code(&self) -> Option<String> {
        self.extensions.get("code").and_then(|code| match code {
            Value::String(s) => Some(s.as_str().to_owned()),
            Value::Number(n) => Some(n.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) | Value::Bool(_) => None,
        })
    }
}

/// Displays (only) the error message.
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

/// Trait used to convert expected errors into a list of GraphQL errors
pub(crate) trait IntoGraphQLErrors {
    fn into_graphql_errors(self) -> Vec<Error>;
}

/// Trait used to get the `extensions.code` value for an error
pub(crate) trait ErrorExtension {
    fn extension_code(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_inserts_extension_code() {
        let error = Error::builder()
            .message("upstream went away")
            .extension_code("UPSTREAM_HTTP_ERROR")
            .build();
        assert_eq!(error.extension_code().as_deref(), Some("UPSTREAM_HTTP_ERROR"));
        assert_eq!(error.to_string(), "upstream went away");
    }

    #[test]
    fn builder_does_not_overwrite_existing_code() {
        let mut extensions = Object::new();
        extensions.insert("code", "ALREADY_SET".into());
        let error = Error::builder()
            .message("boom")
            .extensions(extensions)
            .extension_code("IGNORED")
            .build();
        assert_eq!(error.extension_code().as_deref(), Some("ALREADY_SET"));
    }

    #[test]
    fn error_serializes_without_empty_members() {
        let error = Error::builder().message("boom").build();
        let serialized = serde_json::to_value(&error).expect("error serializes");
        assert_eq!(serialized, serde_json::json!({ "message": "boom" }));
    }

    #[test]
    fn error_deserializes_location_and_path() {
        let error: Error = serde_json::from_value(serde_json::json!({
            "message": "boom",
            "locations": [{ "line": 1, "column": 2 }],
            "path": ["entity", "forms", 0],
        }))
        .expect("error deserializes");
        assert_eq!(error.locations, vec![Location { line: 1, column: 2 }]);
        assert_eq!(error.path, Some(Path::from("entity/forms/0")));
    }
}
