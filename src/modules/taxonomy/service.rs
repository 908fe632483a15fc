use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::taxonomy::{
    model::{CategoryWithTags, TagWithCategories},
    repository::TaxonomyRepository,
    schema::{FilterCategoryEntity, FilterValueEntity, TagEntity},
};

#[derive(Clone)]
pub struct TaxonomyService {
    repo: Arc<dyn TaxonomyRepository + Send + Sync>,
}

fn clean_name(name: &str, what: &'static str) -> Result<String, error::SystemError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(error::SystemError::bad_request(format!("{what} cannot be empty")));
    }
    Ok(name.to_string())
}

fn unique_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

impl TaxonomyService {
    pub fn with_dependencies(repo: Arc<dyn TaxonomyRepository + Send + Sync>) -> Self {
        info!("TaxonomyService initialized with dependencies");
        TaxonomyService { repo }
    }

    pub async fn create_tag(
        &self,
        name: String,
        category_ids: Vec<Uuid>,
    ) -> Result<TagEntity, error::SystemError> {
        let tag = TagEntity {
            id: Uuid::now_v7(),
            name: clean_name(&name, "Tag name")?,
            created_at: chrono::Utc::now(),
        };
        let tag = self.repo.create_tag(&tag, &unique_ids(&category_ids)).await?;
        info!("Tag '{}' created", tag.name);
        Ok(tag)
    }

    pub async fn rename_tag(&self, id: Uuid, name: String) -> Result<TagEntity, error::SystemError> {
        let name = clean_name(&name, "Tag name")?;
        self.repo.rename_tag(&id, &name).await
    }

    /// Detaches the tag from every category. Asset tag strings are left for
    /// `AssetService::reconcile_tags`.
    pub async fn delete_tag(&self, id: Uuid) -> Result<(), error::SystemError> {
        if !self.repo.delete_tag(&id).await? {
            return Err(error::SystemError::not_found("Tag not found"));
        }
        info!("Tag {} deleted", id);
        Ok(())
    }

    pub async fn list_tags(&self) -> Result<Vec<TagWithCategories>, error::SystemError> {
        self.repo.find_all_tags().await
    }

    pub async fn create_filter_category(
        &self,
        name: String,
    ) -> Result<FilterCategoryEntity, error::SystemError> {
        let category = FilterCategoryEntity {
            id: Uuid::now_v7(),
            name: clean_name(&name, "Category name")?,
            created_at: chrono::Utc::now(),
        };
        let category = self.repo.create_category(&category).await?;
        info!("Filter category '{}' created", category.name);
        Ok(category)
    }

    pub async fn rename_filter_category(
        &self,
        id: Uuid,
        name: String,
    ) -> Result<FilterCategoryEntity, error::SystemError> {
        let name = clean_name(&name, "Category name")?;
        self.repo.rename_category(&id, &name).await
    }

    pub async fn delete_filter_category(&self, id: Uuid) -> Result<(), error::SystemError> {
        if !self.repo.delete_category(&id).await? {
            return Err(error::SystemError::not_found("Filter category not found"));
        }
        info!("Filter category {} deleted", id);
        Ok(())
    }

    pub async fn add_tags_to_category(
        &self,
        category_id: Uuid,
        tag_ids: Vec<Uuid>,
    ) -> Result<(), error::SystemError> {
        self.repo.link_tags(&category_id, &unique_ids(&tag_ids)).await
    }

    pub async fn remove_tags_from_category(
        &self,
        category_id: Uuid,
        tag_ids: Vec<Uuid>,
    ) -> Result<(), error::SystemError> {
        self.repo.unlink_tags(&category_id, &unique_ids(&tag_ids)).await
    }

    pub async fn list_filter_categories_with_tags(
        &self,
    ) -> Result<Vec<CategoryWithTags>, error::SystemError> {
        self.repo.find_categories_with_tags().await
    }

    pub async fn create_filter_value(
        &self,
        category_id: Uuid,
        value: String,
    ) -> Result<FilterValueEntity, error::SystemError> {
        let value = FilterValueEntity {
            id: Uuid::now_v7(),
            category_id,
            value: clean_name(&value, "Filter value")?,
            created_at: chrono::Utc::now(),
        };
        self.repo.create_value(&value).await
    }

    pub async fn list_filter_values(
        &self,
        category_id: Option<Uuid>,
    ) -> Result<Vec<FilterValueEntity>, error::SystemError> {
        if let Some(id) = &category_id {
            if self.repo.find_category(id).await?.is_none() {
                return Err(error::SystemError::not_found("Filter category not found"));
            }
        }
        self.repo.find_values(category_id.as_ref()).await
    }

    pub async fn delete_filter_value(&self, id: Uuid) -> Result<(), error::SystemError> {
        if !self.repo.delete_value(&id).await? {
            return Err(error::SystemError::not_found("Filter value not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::MemoryStore, test::taxonomy_service};

    #[tokio::test]
    async fn create_tag_links_categories_idempotently() {
        let service = taxonomy_service(&MemoryStore::new());
        let category = service.create_filter_category("Brand".into()).await.unwrap();

        let tag = service.create_tag("logo".into(), vec![category.id, category.id]).await.unwrap();
        service.add_tags_to_category(category.id, vec![tag.id]).await.unwrap();
        service.add_tags_to_category(category.id, vec![tag.id]).await.unwrap();

        let categories = service.list_filter_categories_with_tags().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].tags, vec![tag.clone()]);

        let tags = service.list_tags().await.unwrap();
        assert_eq!(tags[0].category_ids, vec![category.id]);
    }

    #[tokio::test]
    async fn bulk_link_is_all_or_nothing() {
        let service = taxonomy_service(&MemoryStore::new());
        let category = service.create_filter_category("Campaign".into()).await.unwrap();
        let tag = service.create_tag("summer".into(), vec![]).await.unwrap();

        let err = service
            .add_tags_to_category(category.id, vec![tag.id, Uuid::now_v7()])
            .await
            .unwrap_err();

        assert!(matches!(err, error::SystemError::NotFound(_)));
        let categories = service.list_filter_categories_with_tags().await.unwrap();
        assert!(categories[0].tags.is_empty());
    }

    #[tokio::test]
    async fn remove_tags_from_category_is_idempotent() {
        let service = taxonomy_service(&MemoryStore::new());
        let category = service.create_filter_category("Season".into()).await.unwrap();
        let tag = service.create_tag("winter".into(), vec![category.id]).await.unwrap();

        service.remove_tags_from_category(category.id, vec![tag.id]).await.unwrap();
        service.remove_tags_from_category(category.id, vec![tag.id]).await.unwrap();

        let categories = service.list_filter_categories_with_tags().await.unwrap();
        assert!(categories[0].tags.is_empty());
    }

    #[tokio::test]
    async fn delete_tag_leaves_no_dangling_links() {
        let service = taxonomy_service(&MemoryStore::new());
        let category = service.create_filter_category("Brand".into()).await.unwrap();
        let tag = service.create_tag("logo".into(), vec![category.id]).await.unwrap();

        service.delete_tag(tag.id).await.unwrap();

        let categories = service.list_filter_categories_with_tags().await.unwrap();
        assert!(categories[0].tags.is_empty());
        assert!(matches!(
            service.delete_tag(tag.id).await.unwrap_err(),
            error::SystemError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn categories_are_listed_by_name() {
        let service = taxonomy_service(&MemoryStore::new());
        for name in ["Region", "Brand", "Format"] {
            service.create_filter_category(name.into()).await.unwrap();
        }

        let names: Vec<String> = service
            .list_filter_categories_with_tags()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.category.name)
            .collect();
        assert_eq!(names, vec!["Brand", "Format", "Region"]);
    }

    #[tokio::test]
    async fn deleting_category_removes_its_values() {
        let store = MemoryStore::new();
        let service = taxonomy_service(&store);
        let category = service.create_filter_category("Region".into()).await.unwrap();
        let other = service.create_filter_category("Format".into()).await.unwrap();
        service.create_filter_value(category.id, "EMEA".into()).await.unwrap();
        service.create_filter_value(other.id, "Print".into()).await.unwrap();

        service.delete_filter_category(category.id).await.unwrap();

        let values = service.list_filter_values(None).await.unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, "Print");
        assert!(service.list_filter_values(Some(category.id)).await.is_err());
    }

    #[tokio::test]
    async fn filter_value_requires_existing_category() {
        let service = taxonomy_service(&MemoryStore::new());
        let err = service.create_filter_value(Uuid::now_v7(), "EMEA".into()).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }
}
