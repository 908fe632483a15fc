use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    api::error,
    modules::taxonomy::{
        model::{CategoryTagRow, CategoryWithTags, TagRow, TagWithCategories},
        repository::{FilterCategoryRepository, FilterValueRepository, TagRepository},
        schema::{FilterCategoryEntity, FilterValueEntity, TagEntity},
    },
};

#[derive(Clone)]
pub struct TaxonomyRepositoryPg {
    pool: sqlx::PgPool,
}

impl TaxonomyRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_all_tags_exist<'e, E>(
        &self,
        tag_ids: &[Uuid],
        tx: E,
    ) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let mut unique = tag_ids.to_vec();
        unique.sort();
        unique.dedup();

        let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE id = ANY($1)")
            .bind(&unique)
            .fetch_one(tx)
            .await?;

        if found as usize != unique.len() {
            return Err(error::SystemError::not_found("Tag not found"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl TagRepository for TaxonomyRepositoryPg {
    async fn find_tag(&self, id: &Uuid) -> Result<Option<TagEntity>, error::SystemError> {
        let tag = sqlx::query_as::<_, TagEntity>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn find_tags_by_ids(&self, ids: &[Uuid]) -> Result<Vec<TagEntity>, error::SystemError> {
        let tags = sqlx::query_as::<_, TagEntity>("SELECT * FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    async fn find_all_tags(&self) -> Result<Vec<TagWithCategories>, error::SystemError> {
        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT
                t.id,
                t.name,
                t.created_at,
                COALESCE(
                    array_agg(ct.category_id) FILTER (WHERE ct.category_id IS NOT NULL),
                    '{}'
                ) AS category_ids
            FROM tags t
            LEFT JOIN category_tags ct ON ct.tag_id = t.id
            GROUP BY t.id
            ORDER BY t.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TagWithCategories::from).collect())
    }

    async fn create_tag(
        &self,
        tag: &TagEntity,
        category_ids: &[Uuid],
    ) -> Result<TagEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, TagEntity>(
            "INSERT INTO tags (id, name, created_at) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(tag.id)
        .bind(&tag.name)
        .bind(tag.created_at)
        .fetch_one(&mut *tx)
        .await?;

        if !category_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO category_tags (category_id, tag_id)
                SELECT category_id, $2 FROM unnest($1::uuid[]) AS category_id
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(category_ids)
            .bind(tag.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(entity)
    }

    async fn rename_tag(&self, id: &Uuid, name: &str) -> Result<TagEntity, error::SystemError> {
        let tag = sqlx::query_as::<_, TagEntity>(
            "UPDATE tags SET name = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Tag not found"))?;
        Ok(tag)
    }

    async fn delete_tag(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }
}

#[async_trait::async_trait]
impl FilterCategoryRepository for TaxonomyRepositoryPg {
    async fn find_category(
        &self,
        id: &Uuid,
    ) -> Result<Option<FilterCategoryEntity>, error::SystemError> {
        let category =
            sqlx::query_as::<_, FilterCategoryEntity>("SELECT * FROM filter_categories WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(category)
    }

    async fn create_category(
        &self,
        category: &FilterCategoryEntity,
    ) -> Result<FilterCategoryEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, FilterCategoryEntity>(
            "INSERT INTO filter_categories (id, name, created_at) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(category.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(entity)
    }

    async fn rename_category(
        &self,
        id: &Uuid,
        name: &str,
    ) -> Result<FilterCategoryEntity, error::SystemError> {
        let category = sqlx::query_as::<_, FilterCategoryEntity>(
            "UPDATE filter_categories SET name = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Filter category not found"))?;
        Ok(category)
    }

    async fn delete_category(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        // category_tags, filter_values and their assignments cascade by foreign key
        let rows = sqlx::query("DELETE FROM filter_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    async fn link_tags(&self, category_id: &Uuid, tag_ids: &[Uuid]) -> Result<(), error::SystemError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM filter_categories WHERE id = $1 FOR UPDATE")
            .bind(category_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Filter category not found"))?;

        self.ensure_all_tags_exist(tag_ids, &mut *tx).await?;

        sqlx::query(
            r#"
            INSERT INTO category_tags (category_id, tag_id)
            SELECT $1, tag_id FROM unnest($2::uuid[]) AS tag_id
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(category_id)
        .bind(tag_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn unlink_tags(
        &self,
        category_id: &Uuid,
        tag_ids: &[Uuid],
    ) -> Result<(), error::SystemError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM filter_categories WHERE id = $1 FOR UPDATE")
            .bind(category_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Filter category not found"))?;

        self.ensure_all_tags_exist(tag_ids, &mut *tx).await?;

        sqlx::query("DELETE FROM category_tags WHERE category_id = $1 AND tag_id = ANY($2)")
            .bind(category_id)
            .bind(tag_ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_categories_with_tags(&self) -> Result<Vec<CategoryWithTags>, error::SystemError> {
        let (categories, links) = tokio::try_join!(
            sqlx::query_as::<_, FilterCategoryEntity>(
                "SELECT * FROM filter_categories ORDER BY name ASC",
            )
            .fetch_all(&self.pool),
            sqlx::query_as::<_, CategoryTagRow>(
                r#"
                SELECT ct.category_id, t.id, t.name, t.created_at
                FROM category_tags ct
                JOIN tags t ON t.id = ct.tag_id
                ORDER BY t.name ASC
                "#,
            )
            .fetch_all(&self.pool),
        )?;

        let mut tag_map = links.into_iter().fold(
            HashMap::<Uuid, Vec<TagEntity>>::new(),
            |mut acc, row| {
                acc.entry(row.category_id).or_default().push(TagEntity {
                    id: row.id,
                    name: row.name,
                    created_at: row.created_at,
                });
                acc
            },
        );

        Ok(categories
            .into_iter()
            .map(|category| {
                let tags = tag_map.remove(&category.id).unwrap_or_default();
                CategoryWithTags { category, tags }
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl FilterValueRepository for TaxonomyRepositoryPg {
    async fn find_values(
        &self,
        category_id: Option<&Uuid>,
    ) -> Result<Vec<FilterValueEntity>, error::SystemError> {
        let values = sqlx::query_as::<_, FilterValueEntity>(
            r#"
            SELECT * FROM filter_values
            WHERE ($1::uuid IS NULL OR category_id = $1)
            ORDER BY value ASC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(values)
    }

    async fn find_values_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<FilterValueEntity>, error::SystemError> {
        let values =
            sqlx::query_as::<_, FilterValueEntity>("SELECT * FROM filter_values WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(values)
    }

    async fn create_value(
        &self,
        value: &FilterValueEntity,
    ) -> Result<FilterValueEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, FilterValueEntity>(
            r#"
            INSERT INTO filter_values (id, category_id, value, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(value.id)
        .bind(value.category_id)
        .bind(&value.value)
        .bind(value.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(entity)
    }

    async fn delete_value(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM filter_values WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }
}
