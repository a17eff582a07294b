//! Gateway errors.

use std::fmt;

use apollo_compiler::response::GraphQLError;
use apollo_compiler::validation::DiagnosticList;
use apollo_compiler::validation::WithErrors;
use displaydoc::Display;
use serde::Serialize;
use thiserror::Error;

use crate::graphql;
use crate::graphql::ErrorExtension;
use crate::graphql::IntoGraphQLErrors;
use crate::graphql::Location as ErrorLocation;
use crate::json_ext::Path;

/// Error types for entity resolution.
///
/// Note that these are not actually returned to the client, but are instead
/// converted to JSON for [`graphql::Error`].
#[derive(Error, Display, Debug, Clone, Serialize, Eq, PartialEq)]
#[serde(untagged)]
#[ignore_extra_doc_attributes]
pub(crate) enum FetchError {
    /// HTTP fetch failed from upstream: {reason}
    ///
    /// note that this relates to a transport error and not a GraphQL error
    UpstreamHttpError {
        status_code: Option<u16>,

        /// The reason the fetch failed.
        reason: String,
    },

    /// upstream response was malformed at `{path}`: {reason}
    UpstreamMalformedResponse {
        /// JSON path of the offending field in the upstream payload.
        path: String,

        /// The reason decoding failed.
        reason: String,
    },
}

impl FetchError {
    /// Convert the fetch error to a GraphQL error.
    pub(crate) fn to_graphql_error(&self, path: Option<Path>) -> graphql::Error {
        let mut extensions = serde_json_bytes::to_value(self)
            .ok()
            .and_then(|value| value.as_object().cloned())
            .unwrap_or_default();
        extensions
            .entry("code")
            .or_insert_with(|| self.extension_code().into());
        if let FetchError::UpstreamHttpError { status_code, .. } = self {
            extensions.remove("status_code");
            if let Some(status_code) = status_code {
                extensions.insert("http", serde_json_bytes::json!({ "status": status_code }));
            }
        }

        let builder = graphql::Error::builder()
            .message(self.to_string())
            .extensions(extensions);
        match path {
            Some(path) => builder.path(path).build(),
            None => builder.build(),
        }
    }
}

impl ErrorExtension for FetchError {
    fn extension_code(&self) -> String {
        match self {
            FetchError::UpstreamHttpError { .. } => "UPSTREAM_HTTP_ERROR",
            FetchError::UpstreamMalformedResponse { .. } => "UPSTREAM_MALFORMED_RESPONSE",
        }
        .to_string()
    }
}

/// Collection of query parsing errors.
#[derive(Debug, Clone)]
pub(crate) struct ParseErrors {
    pub(crate) errors: Vec<GraphQLError>,
}

impl From<DiagnosticList> for ParseErrors {
    fn from(errors: DiagnosticList) -> Self {
        Self {
            errors: errors.iter().map(|e| e.unstable_to_json_compat()).collect(),
        }
    }
}

impl<T> From<WithErrors<T>> for ParseErrors {
    fn from(WithErrors { errors, .. }: WithErrors<T>) -> Self {
        errors.into()
    }
}

impl IntoGraphQLErrors for ParseErrors {
    fn into_graphql_errors(self) -> Vec<graphql::Error> {
        self.errors
            .iter()
            .map(|diagnostic| {
                graphql::Error::builder()
                    .message(diagnostic.message.to_string())
                    .locations(
                        diagnostic
                            .locations
                            .iter()
                            .map(|loc| ErrorLocation {
                                line: loc.line as u32,
                                column: loc.column as u32,
                            })
                            .collect::<Vec<_>>(),
                    )
                    .extension_code("GRAPHQL_PARSING_FAILED")
                    .build()
            })
            .collect()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut errors = self.errors.iter();
        for (i, error) in errors.by_ref().take(5).enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", error.message)?;
        }
        let remaining = errors.count();
        if remaining > 0 {
            write!(f, "\n...and {remaining} other errors")?;
        }
        Ok(())
    }
}

/// Collection of query validation errors.
#[derive(Debug, Clone)]
pub struct ValidationErrors {
    pub errors: Vec<GraphQLError>,
}

impl From<DiagnosticList> for ValidationErrors {
    fn from(errors: DiagnosticList) -> Self {
        Self {
            errors: errors.iter().map(|e| e.unstable_to_json_compat()).collect(),
        }
    }
}

impl<T> From<WithErrors<T>> for ValidationErrors {
    fn from(WithErrors { errors, .. }: WithErrors<T>) -> Self {
        errors.into()
    }
}

impl IntoGraphQLErrors for ValidationErrors {
    fn into_graphql_errors(self) -> Vec<graphql::Error> {
        self.errors
            .iter()
            .map(|diagnostic| {
                graphql::Error::builder()
                    .message(diagnostic.message.to_string())
                    .locations(
                        diagnostic
                            .locations
                            .iter()
                            .map(|loc| ErrorLocation {
                                line: loc.line as u32,
                                column: loc.column as u32,
                            })
                            .collect::<Vec<_>>(),
                    )
                    .extension_code("GRAPHQL_VALIDATION_FAILED")
                    .build()
            })
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            if let Some(location) = error.locations.first() {
                write!(
                    f,
                    "[{}:{}] {}",
                    location.line, location.column, error.message
                )?;
            } else {
                write!(f, "{}", error.message)?;
            }
        }
        Ok(())
    }
}

/// Error in the schema.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum SchemaError {
    /// GraphQL validation error: {0}
    Validate(ValidationErrors),
}

/// Error types for gateway building.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ServiceBuildError {
    /// schema error: {0}
    Schema(#[from] SchemaError),

    /// couldn't build the upstream HTTP client: {0}
    UpstreamClient(String),
}
