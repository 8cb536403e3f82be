//! Posts, trades and comments stored as draft/published document pairs.

pub mod actions;
pub mod models;
pub mod store;
pub mod sync;

pub use actions::*;
pub use models::{
    Document, DocumentFilter, DocumentKind, DocumentPatch, FieldPatch, MemberRef,
    ModerationStatus, NewDocument, Relation, RelationSet, Variant,
};
pub use store::DocumentStore;
pub use sync::{sync_fields, sync_mutation, sync_relations, PublishedWrite, SyncOutcome};
