//! Postgres queries for document variants.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::document::{
    Document, DocumentFilter, DocumentKind, FieldPatch, ModerationStatus, NewDocument,
    RelationSet, Variant,
};
use crate::common::{CategoryId, DocumentId, MemberId};

#[derive(FromRow)]
struct DocumentRow {
    id: i64,
    document_id: DocumentId,
    variant: String,
    kind: String,
    title: Option<String>,
    symbol: Option<String>,
    body: String,
    author_id: Option<MemberId>,
    category_ids: Vec<CategoryId>,
    tags: Vec<String>,
    target_document_id: Option<DocumentId>,
    parent_document_id: Option<DocumentId>,
    moderation_status: Option<String>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = anyhow::Error;

    fn try_from(row: DocumentRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            document_id: row.document_id,
            variant: Variant::parse(&row.variant)?,
            kind: DocumentKind::parse(&row.kind)?,
            title: row.title,
            symbol: row.symbol,
            body: row.body,
            author_id: row.author_id,
            category_ids: row.category_ids,
            tags: row.tags,
            target_document_id: row.target_document_id,
            parent_document_id: row.parent_document_id,
            moderation_status: row
                .moderation_status
                .as_deref()
                .map(ModerationStatus::parse)
                .transpose()?,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn convert(row: Option<DocumentRow>) -> Result<Option<Document>> {
    row.map(Document::try_from).transpose()
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &DocumentFilter, variant: Variant) {
    builder.push(" WHERE variant = ");
    builder.push_bind(variant.as_str());
    if let Some(kind) = filter.kind {
        builder.push(" AND kind = ");
        builder.push_bind(kind.as_str());
    }
    if let Some(kinds) = &filter.kinds {
        let kinds: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();
        builder.push(" AND kind = ANY(");
        builder.push_bind(kinds);
        builder.push(")");
    }
    if filter.exclude_hidden {
        builder.push(" AND moderation_status IS DISTINCT FROM ");
        builder.push_bind(ModerationStatus::Delete.as_str());
    }
    if let Some(category_id) = filter.category_id {
        builder.push(" AND ");
        builder.push_bind(category_id);
        builder.push(" = ANY(category_ids)");
    }
    if let Some(author_id) = filter.author_id {
        builder.push(" AND author_id = ");
        builder.push_bind(author_id);
    }
    if let Some(target) = &filter.target_document_id {
        builder.push(" AND target_document_id = ");
        builder.push_bind(target.as_str().to_string());
    }
    if let Some(ids) = &filter.document_ids {
        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        builder.push(" AND document_id = ANY(");
        builder.push_bind(ids);
        builder.push(")");
    }
}

impl Document {
    pub async fn find_one(
        document_id: &DocumentId,
        variant: Variant,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT * FROM documents WHERE document_id = $1 AND variant = $2",
        )
        .bind(document_id.as_str())
        .bind(variant.as_str())
        .fetch_optional(pool)
        .await?;
        convert(row)
    }

    pub async fn find_many(
        filter: &DocumentFilter,
        variant: Variant,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM documents");
        push_filter(&mut builder, filter, variant);
        builder.push(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = filter.limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }
        if let Some(offset) = filter.offset {
            builder.push(" OFFSET ");
            builder.push_bind(offset);
        }

        builder
            .build_query_as::<DocumentRow>()
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(Self::try_from)
            .collect()
    }

    pub async fn count(filter: &DocumentFilter, variant: Variant, pool: &PgPool) -> Result<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM documents");
        push_filter(&mut builder, filter, variant);
        builder
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn create_draft(data: &NewDocument, pool: &PgPool) -> Result<Self> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "INSERT INTO documents
                (document_id, variant, kind, title, symbol, body, category_ids,
                 target_document_id, parent_document_id)
             VALUES ($1, 'draft', $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(data.document_id.as_str())
        .bind(data.kind.as_str())
        .bind(&data.title)
        .bind(&data.symbol)
        .bind(&data.body)
        .bind(data.category_ids.clone())
        .bind(data.target_document_id.as_ref().map(|d| d.as_str().to_string()))
        .bind(data.parent_document_id.as_ref().map(|d| d.as_str().to_string()))
        .fetch_one(pool)
        .await
        .context("Failed to create draft document")?;
        Self::try_from(row)
    }

    /// Copy the draft into the published variant, creating it when absent.
    /// The first publish timestamp is kept on later publishes.
    pub async fn publish_from_draft(
        document_id: &DocumentId,
        published_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "INSERT INTO documents
                (document_id, variant, kind, title, symbol, body, author_id, category_ids, tags,
                 target_document_id, parent_document_id, moderation_status, published_at,
                 created_at, updated_at)
             SELECT document_id, 'published', kind, title, symbol, body, author_id, category_ids,
                    tags, target_document_id, parent_document_id, moderation_status, $2,
                    created_at, NOW()
             FROM documents
             WHERE document_id = $1 AND variant = 'draft'
             ON CONFLICT (document_id, variant) DO UPDATE SET
                title = EXCLUDED.title,
                symbol = EXCLUDED.symbol,
                body = EXCLUDED.body,
                author_id = EXCLUDED.author_id,
                category_ids = EXCLUDED.category_ids,
                tags = EXCLUDED.tags,
                moderation_status = EXCLUDED.moderation_status,
                published_at = COALESCE(documents.published_at, EXCLUDED.published_at),
                updated_at = NOW()
             RETURNING *",
        )
        .bind(document_id.as_str())
        .bind(published_at)
        .fetch_optional(pool)
        .await
        .context("Failed to publish document")?;
        convert(row)
    }

    pub async fn update_fields(
        document_id: &DocumentId,
        variant: Variant,
        patch: &FieldPatch,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let (set_moderation, moderation) = match patch.moderation_status {
            Some(status) => (true, status.map(|s| s.as_str())),
            None => (false, None),
        };

        let row = sqlx::query_as::<_, DocumentRow>(
            "UPDATE documents SET
                title = COALESCE($3, title),
                symbol = COALESCE($4, symbol),
                body = COALESCE($5, body),
                category_ids = COALESCE($6, category_ids),
                moderation_status = CASE WHEN $7 THEN $8 ELSE moderation_status END,
                updated_at = NOW()
             WHERE document_id = $1 AND variant = $2
             RETURNING *",
        )
        .bind(document_id.as_str())
        .bind(variant.as_str())
        .bind(&patch.title)
        .bind(&patch.symbol)
        .bind(&patch.body)
        .bind(patch.category_ids.clone())
        .bind(set_moderation)
        .bind(moderation)
        .fetch_optional(pool)
        .await
        .context("Failed to update document")?;
        convert(row)
    }

    pub async fn update_relations(
        document_id: &DocumentId,
        variant: Variant,
        relations: &RelationSet,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "UPDATE documents SET
                author_id = COALESCE($3, author_id),
                tags = COALESCE($4, tags),
                updated_at = NOW()
             WHERE document_id = $1 AND variant = $2
             RETURNING *",
        )
        .bind(document_id.as_str())
        .bind(variant.as_str())
        .bind(relations.author_id)
        .bind(relations.tags.clone())
        .fetch_optional(pool)
        .await
        .context("Failed to set document relations")?;
        convert(row)
    }

    /// Remove every variant. Returns the number of rows deleted.
    pub async fn delete_all_variants(document_id: &DocumentId, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM documents WHERE document_id = $1")
            .bind(document_id.as_str())
            .execute(pool)
            .await
            .context("Failed to delete document")?;
        Ok(result.rows_affected())
    }
}
