//! JSON value helpers shared by the GraphQL wire types.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::ByteString;
use serde_json_bytes::Map;
use serde_json_bytes::Value;

/// A JSON object as it appears in response `data`, `extensions` and error
/// extension maps.
pub type Object = Map<ByteString, Value>;

/// One step in a [`Path`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathElement {
    /// An index into a list value.
    Index(usize),

    /// A key into an object value.
    Key(String),
}

/// A path into the response data, as carried by the `path` member of a
/// GraphQL error.
///
/// Serializes as the mixed string/number array mandated by the GraphQL
/// spec, e.g. `["entity", "forms", 0, "name"]`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(pub Vec<PathElement>);

impl From<&str> for Path {
    /// Builds a path from a `/`-separated string; numeric segments become
    /// list indices.
    fn from(s: &str) -> Self {
        Self(
            s.split('/')
                .filter(|segment| !segment.is_empty())
                .map(|segment| {
                    segment
                        .parse::<usize>()
                        .map_or_else(|_| PathElement::Key(segment.to_string()), PathElement::Index)
                })
                .collect(),
        )
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            match element {
                PathElement::Index(index) => write!(f, "{index}")?,
                PathElement::Key(key) => f.write_str(key)?,
            }
        }
        Ok(())
    }
}
