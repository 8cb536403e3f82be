pub mod document;
pub mod document_queries;

pub use document::{
    Document, DocumentFilter, DocumentKind, DocumentPatch, FieldPatch, MemberRef,
    ModerationStatus, NewDocument, Relation, RelationSet, Variant,
};
