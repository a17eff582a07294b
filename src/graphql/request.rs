use serde::Deserialize;
use serde::Serialize;

/// A GraphQL `Request` as extracted by the HTTP layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// The GraphQL query string.
    ///
    /// For historical purposes, the term "query" is commonly used to refer
    /// to *any* GraphQL operation; this gateway's schema only declares
    /// queries.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub query: Option<String>,

    /// The (optional) GraphQL operation name.
    ///
    /// When specified, this name must match the name of an operation in the
    /// GraphQL document. When excluded, there must exist only a single
    /// operation in the GraphQL document. Typically, this value is provided
    /// as the `operationName` on an HTTP-sourced GraphQL request.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub operation_name: Option<String>,
}

#[buildstructor::buildstructor]
impl Request {
    /// This is the constructor (or builder) to use when constructing a
    /// GraphQL `Request`.
    #[builder(visibility = "pub")]
    fn new(query: Option<String>, operation_name: Option<String>) -> Self {
        Self {
            query,
            operation_name,
        }
    }
}
