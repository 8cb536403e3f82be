pub mod indexing;
pub mod lifecycle;
pub mod read;

pub use indexing::{index_document, unindex_document};
pub use lifecycle::{
    create_document, delete_document, publish_document, update_document, CreateDocument,
    UpdateDocument,
};
pub use read::{
    fetch_for_viewer, fetch_public_document, list_comments, list_published,
    moderation_categories, resolve_document, ListDocuments,
};
