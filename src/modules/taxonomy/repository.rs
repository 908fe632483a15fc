use uuid::Uuid;

use crate::{
    api::error,
    modules::taxonomy::{
        model::{CategoryWithTags, TagWithCategories},
        schema::{FilterCategoryEntity, FilterValueEntity, TagEntity},
    },
};

#[async_trait::async_trait]
pub trait TagRepository {
    async fn find_tag(&self, id: &Uuid) -> Result<Option<TagEntity>, error::SystemError>;

    async fn find_tags_by_ids(&self, ids: &[Uuid]) -> Result<Vec<TagEntity>, error::SystemError>;

    /// Tags ordered by name, each with the categories it belongs to.
    async fn find_all_tags(&self) -> Result<Vec<TagWithCategories>, error::SystemError>;

    /// Inserts the tag and its category links in one step; unknown categories fail the call.
    async fn create_tag(
        &self,
        tag: &TagEntity,
        category_ids: &[Uuid],
    ) -> Result<TagEntity, error::SystemError>;

    async fn rename_tag(&self, id: &Uuid, name: &str) -> Result<TagEntity, error::SystemError>;

    /// Removes the tag and its category links. Returns false when absent.
    async fn delete_tag(&self, id: &Uuid) -> Result<bool, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FilterCategoryRepository {
    async fn find_category(
        &self,
        id: &Uuid,
    ) -> Result<Option<FilterCategoryEntity>, error::SystemError>;

    async fn create_category(
        &self,
        category: &FilterCategoryEntity,
    ) -> Result<FilterCategoryEntity, error::SystemError>;

    async fn rename_category(
        &self,
        id: &Uuid,
        name: &str,
    ) -> Result<FilterCategoryEntity, error::SystemError>;

    /// Removes the category, its tag links, its values and every asset assignment of them.
    async fn delete_category(&self, id: &Uuid) -> Result<bool, error::SystemError>;

    /// All-or-nothing: fails without changes when the category or any tag is missing.
    async fn link_tags(&self, category_id: &Uuid, tag_ids: &[Uuid]) -> Result<(), error::SystemError>;

    async fn unlink_tags(
        &self,
        category_id: &Uuid,
        tag_ids: &[Uuid],
    ) -> Result<(), error::SystemError>;

    async fn find_categories_with_tags(&self) -> Result<Vec<CategoryWithTags>, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FilterValueRepository {
    async fn find_values(
        &self,
        category_id: Option<&Uuid>,
    ) -> Result<Vec<FilterValueEntity>, error::SystemError>;

    async fn find_values_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<FilterValueEntity>, error::SystemError>;

    async fn create_value(
        &self,
        value: &FilterValueEntity,
    ) -> Result<FilterValueEntity, error::SystemError>;

    /// Removes the value and every asset assignment of it.
    async fn delete_value(&self, id: &Uuid) -> Result<bool, error::SystemError>;
}

pub trait TaxonomyRepository: TagRepository + FilterCategoryRepository + FilterValueRepository {}

impl<T> TaxonomyRepository for T where T: TagRepository + FilterCategoryRepository + FilterValueRepository {}
