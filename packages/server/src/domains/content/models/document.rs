use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::common::{CategoryId, DocumentId, MemberId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Post,
    Trade,
    Comment,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Trade => "trade",
            Self::Comment => "comment",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "post" => Ok(Self::Post),
            "trade" => Ok(Self::Trade),
            "comment" => Ok(Self::Comment),
            other => anyhow::bail!("unknown document kind: {other}"),
        }
    }
}

/// Physical row backing a logical document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Draft,
    Published,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            other => anyhow::bail!("unknown variant: {other}"),
        }
    }
}

/// Document-level moderation flag. Absence (`None`) means unmoderated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModerationStatus {
    #[serde(rename = "block-comment")]
    BlockComment,
    #[serde(rename = "delete")]
    Delete,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlockComment => "block-comment",
            Self::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "block-comment" => Ok(Self::BlockComment),
            "delete" => Ok(Self::Delete),
            other => anyhow::bail!("unknown moderation status: {other}"),
        }
    }
}

/// One variant of a logical document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Row id of this variant.
    pub id: i64,
    pub document_id: DocumentId,
    pub variant: Variant,
    pub kind: DocumentKind,
    pub title: Option<String>,
    /// Ticker symbol for trade journal entries.
    pub symbol: Option<String>,
    pub body: String,
    pub author_id: Option<MemberId>,
    pub category_ids: Vec<CategoryId>,
    pub tags: Vec<String>,
    /// For comments: the post or trade being discussed.
    pub target_document_id: Option<DocumentId>,
    /// For replies: the comment being replied to.
    pub parent_document_id: Option<DocumentId>,
    pub moderation_status: Option<ModerationStatus>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn is_published(&self) -> bool {
        self.variant == Variant::Published || self.published_at.is_some()
    }

    pub fn is_hidden(&self) -> bool {
        self.moderation_status == Some(ModerationStatus::Delete)
    }

    pub fn comments_blocked(&self) -> bool {
        self.moderation_status == Some(ModerationStatus::BlockComment)
    }

    pub fn is_owned_by(&self, member: MemberId) -> bool {
        self.author_id == Some(member)
    }

    /// How the content is referred to in notification text.
    pub fn subject(&self) -> String {
        match (self.kind, self.symbol.as_deref(), self.title.as_deref()) {
            (DocumentKind::Trade, Some(symbol), _) => format!("{symbol} trade"),
            (_, _, Some(title)) => format!("\"{title}\""),
            (DocumentKind::Comment, _, _) => "a comment".to_string(),
            (DocumentKind::Trade, None, None) => "a trade".to_string(),
            (DocumentKind::Post, _, None) => "a post".to_string(),
        }
    }

    /// Overlay the draft-owned state (relations and moderation) onto this
    /// row. Moderators and owners always write the draft first, so it is the
    /// source of truth for these fields.
    pub fn with_relations_from(mut self, draft: &Document) -> Self {
        self.author_id = draft.author_id;
        self.category_ids = draft.category_ids.clone();
        self.tags = draft.tags.clone();
        self.moderation_status = draft.moderation_status;
        self
    }
}

/// Input to the document-creation primitive. Creates the draft variant.
///
/// Author and tags are not accepted here; they are applied after creation
/// through [`RelationSet`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct NewDocument {
    #[builder(default = DocumentId::generate())]
    pub document_id: DocumentId,
    pub kind: DocumentKind,
    #[builder(default, setter(strip_option))]
    pub title: Option<String>,
    #[builder(default, setter(strip_option))]
    pub symbol: Option<String>,
    #[builder(setter(into))]
    pub body: String,
    #[builder(default)]
    pub category_ids: Vec<CategoryId>,
    #[builder(default, setter(strip_option))]
    pub target_document_id: Option<DocumentId>,
    #[builder(default, setter(strip_option))]
    pub parent_document_id: Option<DocumentId>,
}

/// Reference to a member as it arrives from callers: either a bare id or an
/// already-loaded member object. Resolved to an id before reaching a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relation {
    Id(MemberId),
    Loaded(MemberRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRef {
    pub id: MemberId,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Relation {
    pub fn id(&self) -> MemberId {
        match self {
            Self::Id(id) => *id,
            Self::Loaded(member) => member.id,
        }
    }
}

impl From<MemberId> for Relation {
    fn from(id: MemberId) -> Self {
        Self::Id(id)
    }
}

/// Field-level changes written through `DocumentStore::update`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub title: Option<String>,
    pub symbol: Option<String>,
    pub body: Option<String>,
    pub category_ids: Option<Vec<CategoryId>>,
    /// `Some(None)` clears moderation.
    pub moderation_status: Option<Option<ModerationStatus>>,
}

impl FieldPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, doc: &mut Document) {
        if let Some(title) = &self.title {
            doc.title = Some(title.clone());
        }
        if let Some(symbol) = &self.symbol {
            doc.symbol = Some(symbol.clone());
        }
        if let Some(body) = &self.body {
            doc.body = body.clone();
        }
        if let Some(categories) = &self.category_ids {
            doc.category_ids = categories.clone();
        }
        if let Some(status) = self.moderation_status {
            doc.moderation_status = status;
        }
    }
}

/// Relation changes written through `DocumentStore::set_relations`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationSet {
    pub author_id: Option<MemberId>,
    pub tags: Option<Vec<String>>,
}

impl RelationSet {
    pub fn is_empty(&self) -> bool {
        self.author_id.is_none() && self.tags.is_none()
    }

    pub fn apply_to(&self, doc: &mut Document) {
        if let Some(author) = self.author_id {
            doc.author_id = Some(author);
        }
        if let Some(tags) = &self.tags {
            doc.tags = tags.clone();
        }
    }
}

/// A mutation of a logical document as requested by a caller.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub symbol: Option<String>,
    pub body: Option<String>,
    pub category_ids: Option<Vec<CategoryId>>,
    pub moderation_status: Option<Option<ModerationStatus>>,
    pub author: Option<Relation>,
    pub tags: Option<Vec<String>>,
}

impl DocumentPatch {
    pub fn moderation(status: Option<ModerationStatus>) -> Self {
        Self {
            moderation_status: Some(status),
            ..Self::default()
        }
    }

    /// Separate body fields from the relations the creation/update primitive
    /// does not accept.
    pub fn split(self) -> (FieldPatch, RelationSet) {
        (
            FieldPatch {
                title: self.title,
                symbol: self.symbol,
                body: self.body,
                category_ids: self.category_ids,
                moderation_status: self.moderation_status,
            },
            RelationSet {
                author_id: self.author.as_ref().map(Relation::id),
                tags: self.tags,
            },
        )
    }
}

/// Row filter for listings.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub kind: Option<DocumentKind>,
    /// Any of these kinds. Combined with `kind` when both are set.
    pub kinds: Option<Vec<DocumentKind>>,
    pub category_id: Option<CategoryId>,
    pub author_id: Option<MemberId>,
    pub target_document_id: Option<DocumentId>,
    pub document_ids: Option<Vec<DocumentId>>,
    /// Skip rows whose own moderation status is `delete`.
    pub exclude_hidden: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl DocumentFilter {
    pub fn matches(&self, doc: &Document) -> bool {
        self.kind.map_or(true, |k| doc.kind == k)
            && self.kinds.as_ref().map_or(true, |ks| ks.contains(&doc.kind))
            && !(self.exclude_hidden && doc.is_hidden())
            && self
                .category_id
                .map_or(true, |c| doc.category_ids.contains(&c))
            && self.author_id.map_or(true, |a| doc.author_id == Some(a))
            && self
                .target_document_id
                .as_ref()
                .map_or(true, |t| doc.target_document_id.as_ref() == Some(t))
            && self
                .document_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&doc.document_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_accepts_raw_id_or_object() {
        let id = MemberId::new();

        let raw: Relation = serde_json::from_value(serde_json::json!(id.to_string())).unwrap();
        let loaded: Relation = serde_json::from_value(serde_json::json!({
            "id": id.to_string(),
            "displayName": "alice"
        }))
        .unwrap();

        assert_eq!(raw.id(), id);
        assert_eq!(loaded.id(), id);
    }

    #[test]
    fn test_split_moves_author_and_tags_out_of_fields() {
        let author = MemberId::new();
        let patch = DocumentPatch {
            body: Some("hello".into()),
            author: Some(author.into()),
            tags: Some(vec!["macro".into()]),
            ..Default::default()
        };

        let (fields, relations) = patch.split();
        assert_eq!(fields.body.as_deref(), Some("hello"));
        assert_eq!(relations.author_id, Some(author));
        assert_eq!(relations.tags, Some(vec!["macro".to_string()]));
    }

    #[test]
    fn test_moderation_status_serializes_with_hyphen() {
        assert_eq!(
            serde_json::to_value(Some(ModerationStatus::BlockComment)).unwrap(),
            serde_json::json!("block-comment")
        );
        assert_eq!(
            serde_json::to_value(None::<ModerationStatus>).unwrap(),
            serde_json::Value::Null
        );
    }
}
