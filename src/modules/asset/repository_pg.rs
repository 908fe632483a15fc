use std::collections::HashMap;

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        asset::{
            model::{AssetQuery, SortBy, SortOrder},
            repository::AssetRepository,
            schema::{AssetEntity, AssetMetadata, FilterAssignment},
        },
        version::model::NewVersion,
    },
};

#[derive(Clone)]
pub struct AssetRepositoryPg {
    pool: sqlx::PgPool,
}

fn like_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &AssetQuery) {
    builder.push(" WHERE TRUE");

    if let Some(term) = query.search_term() {
        let pattern = like_pattern(&term);
        builder
            .push(" AND (LOWER(a.name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR EXISTS (SELECT 1 FROM unnest(a.tags) AS t WHERE LOWER(t) LIKE ")
            .push_bind(pattern.clone())
            .push(") OR LOWER(a.metadata->>'description') LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(folder_id) = query.folder_id {
        builder.push(" AND a.folder_id = ").push_bind(folder_id);
    }
    if !query.mime_types.is_empty() {
        builder.push(" AND a.mime_type = ANY(").push_bind(query.mime_types.clone()).push(")");
    }
    if !query.tags.is_empty() {
        builder.push(" AND a.tags && ").push_bind(query.tags.clone());
    }
}

impl AssetRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    async fn attach_assignments(
        &self,
        mut assets: Vec<AssetEntity>,
    ) -> Result<Vec<AssetEntity>, error::SystemError> {
        if assets.is_empty() {
            return Ok(assets);
        }
        let ids: Vec<Uuid> = assets.iter().map(|a| a.id).collect();
        let rows = sqlx::query_as::<_, FilterAssignment>(
            r#"
            SELECT asset_id, filter_value_id, assigned_at
            FROM asset_filter_assignments
            WHERE asset_id = ANY($1)
            ORDER BY assigned_at ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_asset = rows.into_iter().fold(
            HashMap::<Uuid, Vec<FilterAssignment>>::new(),
            |mut acc, row| {
                acc.entry(row.asset_id).or_default().push(row);
                acc
            },
        );
        for asset in &mut assets {
            asset.filter_assignments = by_asset.remove(&asset.id).unwrap_or_default();
        }
        Ok(assets)
    }

    async fn reload(&self, id: &Uuid) -> Result<AssetEntity, error::SystemError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Asset not found"))
    }
}

#[async_trait::async_trait]
impl AssetRepository for AssetRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<AssetEntity>, error::SystemError> {
        let asset = sqlx::query_as::<_, AssetEntity>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match asset {
            Some(asset) => Ok(self.attach_assignments(vec![asset]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<AssetEntity>, error::SystemError> {
        let assets = sqlx::query_as::<_, AssetEntity>(
            "SELECT * FROM assets ORDER BY uploaded_at DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        self.attach_assignments(assets).await
    }

    async fn find_page(
        &self,
        query: &AssetQuery,
    ) -> Result<(Vec<AssetEntity>, usize), error::SystemError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM assets a");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT a.* FROM assets a");
        push_filters(&mut select, query);

        let column = match query.sort_by {
            SortBy::Name => "LOWER(a.name)",
            SortBy::CreatedAt => "a.uploaded_at",
            SortBy::UpdatedAt => "a.updated_at",
            SortBy::Size => "a.size",
        };
        let direction = match query.sort_order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        select.push(format!(" ORDER BY {column} {direction}, a.id ASC"));

        if let Some(limit) = query.limit {
            select.push(" LIMIT ").push_bind(limit as i64);
        }
        select.push(" OFFSET ").push_bind(i64::try_from(query.offset).unwrap_or(i64::MAX));

        let assets = select.build_query_as::<AssetEntity>().fetch_all(&self.pool).await?;
        Ok((self.attach_assignments(assets).await?, total as usize))
    }

    async fn create(
        &self,
        asset: &AssetEntity,
        initial_version: &NewVersion,
    ) -> Result<AssetEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, AssetEntity>(
            r#"
            INSERT INTO assets (
                id, name, file_url, thumbnail_url, file_type, mime_type, size,
                uploaded_by, uploaded_at, updated_at, tags, folder_id, folder, version, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 1, $14)
            RETURNING *
            "#,
        )
        .bind(asset.id)
        .bind(&asset.name)
        .bind(&asset.file_url)
        .bind(&asset.thumbnail_url)
        .bind(&asset.file_type)
        .bind(&asset.mime_type)
        .bind(asset.size)
        .bind(&asset.uploaded_by)
        .bind(asset.uploaded_at)
        .bind(asset.updated_at)
        .bind(&asset.tags)
        .bind(asset.folder_id)
        .bind(&asset.folder)
        .bind(sqlx::types::Json(&asset.metadata))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO asset_versions
                (id, asset_id, version_number, file_url, file_size, created_at, created_by, notes, is_current_version)
            VALUES ($1, $2, 1, $3, $4, $5, $6, $7, TRUE)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(asset.id)
        .bind(&initial_version.file_url)
        .bind(initial_version.file_size)
        .bind(asset.uploaded_at)
        .bind(&initial_version.created_by)
        .bind(&initial_version.notes)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(entity)
    }

    async fn update_metadata(
        &self,
        id: &Uuid,
        metadata: &AssetMetadata,
    ) -> Result<AssetEntity, error::SystemError> {
        let updated = sqlx::query("UPDATE assets SET metadata = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(sqlx::types::Json(metadata))
            .execute(&self.pool)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(error::SystemError::not_found("Asset not found"));
        }
        self.reload(id).await
    }

    async fn add_tags(&self, id: &Uuid, names: &[String]) -> Result<AssetEntity, error::SystemError> {
        let updated = sqlx::query(
            r#"
            UPDATE assets
            SET tags = tags || ARRAY(
                    SELECT n FROM (
                        SELECT n, MIN(i) AS i
                        FROM unnest($2::text[]) WITH ORDINALITY AS x(n, i)
                        GROUP BY n
                    ) AS d
                    WHERE NOT n = ANY(tags)
                    ORDER BY i
                ),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(names)
        .execute(&self.pool)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(error::SystemError::not_found("Asset not found"));
        }
        self.reload(id).await
    }

    async fn remove_tags(
        &self,
        id: &Uuid,
        names: &[String],
    ) -> Result<AssetEntity, error::SystemError> {
        let updated = sqlx::query(
            r#"
            UPDATE assets
            SET tags = ARRAY(SELECT t FROM unnest(tags) WITH ORDINALITY AS x(t, i)
                             WHERE NOT t = ANY($2) ORDER BY i),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(names)
        .execute(&self.pool)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(error::SystemError::not_found("Asset not found"));
        }
        self.reload(id).await
    }

    async fn set_folder(
        &self,
        id: &Uuid,
        folder_id: Option<&Uuid>,
        folder_path: &str,
    ) -> Result<AssetEntity, error::SystemError> {
        let updated = sqlx::query(
            "UPDATE assets SET folder_id = $2, folder = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(folder_id)
        .bind(folder_path)
        .execute(&self.pool)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(error::SystemError::not_found("Asset not found"));
        }
        self.reload(id).await
    }

    async fn assign_filter_values(
        &self,
        id: &Uuid,
        value_ids: &[Uuid],
    ) -> Result<AssetEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM assets WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Asset not found"))?;

        let mut unique = value_ids.to_vec();
        unique.sort();
        unique.dedup();
        let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM filter_values WHERE id = ANY($1)")
            .bind(&unique)
            .fetch_one(&mut *tx)
            .await?;
        if found as usize != unique.len() {
            return Err(error::SystemError::not_found("Filter value not found"));
        }

        sqlx::query(
            r#"
            INSERT INTO asset_filter_assignments (asset_id, filter_value_id, assigned_at)
            SELECT $1, value_id, NOW() FROM unnest($2::uuid[]) AS value_id
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(&unique)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE assets SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        self.reload(id).await
    }

    async fn unassign_filter_values(
        &self,
        id: &Uuid,
        value_ids: &[Uuid],
    ) -> Result<AssetEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE assets SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(error::SystemError::not_found("Asset not found"));
        }

        sqlx::query(
            "DELETE FROM asset_filter_assignments WHERE asset_id = $1 AND filter_value_id = ANY($2)",
        )
        .bind(id)
        .bind(value_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.reload(id).await
    }

    async fn retain_tags(&self, known: &[String]) -> Result<u64, error::SystemError> {
        let rows = sqlx::query(
            r#"
            UPDATE assets
            SET tags = ARRAY(SELECT t FROM unnest(tags) WITH ORDINALITY AS x(t, i)
                             WHERE t = ANY($1) ORDER BY i),
                updated_at = NOW()
            WHERE NOT tags <@ $1
            "#,
        )
        .bind(known)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(rows)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        // versions, activities and filter assignments cascade by foreign key
        let rows = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }
}
