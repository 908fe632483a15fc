use uuid::Uuid;

use crate::{
    api::error,
    modules::version::{
        model::{AppendedVersion, NewVersion},
        repository::VersionRepository,
        schema::{AssetActivityEntity, AssetVersionEntity},
    },
};

#[derive(Clone)]
pub struct VersionRepositoryPg {
    pool: sqlx::PgPool,
}

impl VersionRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

async fn lock_asset(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    asset_id: &Uuid,
) -> Result<bool, error::SystemError> {
    let row = sqlx::query("SELECT id FROM assets WHERE id = $1 FOR UPDATE")
        .bind(asset_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.is_some())
}

async fn point_asset_at(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    version: &AssetVersionEntity,
) -> Result<(), error::SystemError> {
    sqlx::query(
        r#"
        UPDATE assets
        SET version = $2, file_url = $3, size = $4, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(version.asset_id)
    .bind(version.version_number)
    .bind(&version.file_url)
    .bind(version.file_size)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn current_number(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    asset_id: &Uuid,
) -> Result<Option<i32>, error::SystemError> {
    let current = sqlx::query_scalar::<_, i32>(
        "SELECT version_number FROM asset_versions WHERE asset_id = $1 AND is_current_version",
    )
    .bind(asset_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(current)
}

#[async_trait::async_trait]
impl VersionRepository for VersionRepositoryPg {
    async fn asset_exists(&self, asset_id: &Uuid) -> Result<bool, error::SystemError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM assets WHERE id = $1)")
                .bind(asset_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_versions(
        &self,
        asset_id: &Uuid,
    ) -> Result<Vec<AssetVersionEntity>, error::SystemError> {
        let versions = sqlx::query_as::<_, AssetVersionEntity>(
            "SELECT * FROM asset_versions WHERE asset_id = $1 ORDER BY version_number ASC",
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(versions)
    }

    async fn append_version(
        &self,
        asset_id: &Uuid,
        version: &NewVersion,
    ) -> Result<AppendedVersion, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        if !lock_asset(&mut tx, asset_id).await? {
            return Err(error::SystemError::not_found("Asset not found"));
        }
        let previous_version = current_number(&mut tx, asset_id).await?;

        sqlx::query("UPDATE asset_versions SET is_current_version = FALSE WHERE asset_id = $1")
            .bind(asset_id)
            .execute(&mut *tx)
            .await?;

        let entity = sqlx::query_as::<_, AssetVersionEntity>(
            r#"
            INSERT INTO asset_versions
                (id, asset_id, version_number, file_url, file_size, created_by, notes, is_current_version)
            SELECT $1, $2, COALESCE(MAX(version_number), 0) + 1, $3, $4, $5, $6, TRUE
            FROM asset_versions
            WHERE asset_id = $2
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(asset_id)
        .bind(&version.file_url)
        .bind(version.file_size)
        .bind(&version.created_by)
        .bind(&version.notes)
        .fetch_one(&mut *tx)
        .await?;

        point_asset_at(&mut tx, &entity).await?;
        tx.commit().await?;

        Ok(AppendedVersion { version: entity, previous_version })
    }

    async fn set_current(
        &self,
        asset_id: &Uuid,
        version_number: i32,
    ) -> Result<Option<AppendedVersion>, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        if !lock_asset(&mut tx, asset_id).await? {
            return Ok(None);
        }
        let previous_version = current_number(&mut tx, asset_id).await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM asset_versions WHERE asset_id = $1 AND version_number = $2)",
        )
        .bind(asset_id)
        .bind(version_number)
        .fetch_one(&mut *tx)
        .await?;
        if !exists {
            return Ok(None);
        }

        sqlx::query(
            r#"
            UPDATE asset_versions
            SET is_current_version = (version_number = $2)
            WHERE asset_id = $1
            "#,
        )
        .bind(asset_id)
        .bind(version_number)
        .execute(&mut *tx)
        .await?;

        let version = sqlx::query_as::<_, AssetVersionEntity>(
            "SELECT * FROM asset_versions WHERE asset_id = $1 AND version_number = $2",
        )
        .bind(asset_id)
        .bind(version_number)
        .fetch_one(&mut *tx)
        .await?;

        point_asset_at(&mut tx, &version).await?;
        tx.commit().await?;

        Ok(Some(AppendedVersion { version, previous_version }))
    }

    async fn append_activity(
        &self,
        activity: &AssetActivityEntity,
    ) -> Result<AssetActivityEntity, error::SystemError> {
        // unknown asset ids surface as NotFound through the foreign key
        let entity = sqlx::query_as::<_, AssetActivityEntity>(
            r#"
            INSERT INTO asset_activities
                (id, asset_id, action, timestamp, actor_name, version_number, shared_link_id, context_data)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(activity.id)
        .bind(activity.asset_id)
        .bind(activity.action)
        .bind(activity.timestamp)
        .bind(&activity.actor_name)
        .bind(activity.version_number)
        .bind(&activity.shared_link_id)
        .bind(sqlx::types::Json(&activity.context_data))
        .fetch_one(&self.pool)
        .await?;
        Ok(entity)
    }

    async fn find_activities(
        &self,
        asset_id: &Uuid,
    ) -> Result<Vec<AssetActivityEntity>, error::SystemError> {
        let activities = sqlx::query_as::<_, AssetActivityEntity>(
            "SELECT * FROM asset_activities WHERE asset_id = $1 ORDER BY timestamp DESC, id DESC",
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(activities)
    }
}
