use uuid::Uuid;

use crate::{
    api::error,
    modules::folder::{repository::FolderRepository, schema::FolderEntity},
};

#[derive(Clone)]
pub struct FolderRepositoryPg {
    pool: sqlx::PgPool,
}

impl FolderRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FolderRepository for FolderRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<FolderEntity>, error::SystemError> {
        let folder = sqlx::query_as::<_, FolderEntity>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(folder)
    }

    async fn find_all(&self) -> Result<Vec<FolderEntity>, error::SystemError> {
        let folders = sqlx::query_as::<_, FolderEntity>("SELECT * FROM folders ORDER BY path")
            .fetch_all(&self.pool)
            .await?;
        Ok(folders)
    }

    async fn find_children(
        &self,
        parent_id: Option<&Uuid>,
    ) -> Result<Vec<FolderEntity>, error::SystemError> {
        let folders = sqlx::query_as::<_, FolderEntity>(
            "SELECT * FROM folders WHERE parent_id IS NOT DISTINCT FROM $1 ORDER BY name ASC",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(folders)
    }

    async fn create(&self, folder: &FolderEntity) -> Result<FolderEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, FolderEntity>(
            r#"
            INSERT INTO folders (id, name, parent_id, path, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(folder.id)
        .bind(&folder.name)
        .bind(folder.parent_id)
        .bind(&folder.path)
        .bind(folder.created_at)
        .bind(folder.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(entity)
    }

    async fn save_all(&self, folders: &[FolderEntity]) -> Result<(), error::SystemError> {
        let mut tx = self.pool.begin().await?;

        for folder in folders {
            let rows = sqlx::query(
                r#"
                UPDATE folders
                SET name = $2, parent_id = $3, path = $4, updated_at = $5
                WHERE id = $1
                "#,
            )
            .bind(folder.id)
            .bind(&folder.name)
            .bind(folder.parent_id)
            .bind(&folder.path)
            .bind(folder.updated_at)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if rows == 0 {
                tx.rollback().await?;
                return Err(error::SystemError::not_found("Folder not found"));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, error::SystemError> {
        let rows = sqlx::query("DELETE FROM folders WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows)
    }
}
