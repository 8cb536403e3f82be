//! Search index side effects. Failures are counted and logged, never
//! returned.

use metrics::counter;
use tracing::warn;

use crate::common::DocumentId;
use crate::kernel::metrics::SEARCH_FAILURES;
use crate::kernel::ServerDeps;

pub async fn index_document(deps: &ServerDeps, id: &DocumentId) {
    if let Err(e) = deps.search.upsert(id).await {
        counter!(SEARCH_FAILURES).increment(1);
        warn!(document_id = %id, error = %e, "search upsert failed");
    }
}

pub async fn unindex_document(deps: &ServerDeps, id: &DocumentId) {
    if let Err(e) = deps.search.remove(id).await {
        counter!(SEARCH_FAILURES).increment(1);
        warn!(document_id = %id, error = %e, "search remove failed");
    }
}
