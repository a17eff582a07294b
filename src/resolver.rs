//! The root field resolver.

use crate::error::FetchError;
use crate::record::EntityRecord;
use crate::upstream::UpstreamClient;

/// Resolves the root `entity` field: one upstream fetch, then one decode.
///
/// This is the sole I/O boundary of query execution. A resolution either
/// yields a complete [`EntityRecord`] for the executor to project fields
/// from, or an error; no partially-filled record is ever exposed.
#[derive(Clone, Debug)]
pub(crate) struct EntityResolver {
    upstream: UpstreamClient,
}

impl EntityResolver {
    pub(crate) fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    pub(crate) async fn resolve(&self, id: i32) -> Result<EntityRecord, FetchError> {
        let raw = self.upstream.fetch(id).await?;
        let record = EntityRecord::from_bytes(&raw)?;
        tracing::debug!(entity.id = record.id, entity.name = %record.name, "resolved upstream entity");
        Ok(record)
    }
}
