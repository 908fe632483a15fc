use uuid::Uuid;

use crate::{
    api::error,
    modules::taxonomy::{
        model::{CategoryWithTags, TagWithCategories},
        repository::{FilterCategoryRepository, FilterValueRepository, TagRepository},
        schema::{FilterCategoryEntity, FilterValueEntity, TagEntity},
    },
    store::MemoryStore,
};

#[async_trait::async_trait]
impl TagRepository for MemoryStore {
    async fn find_tag(&self, id: &Uuid) -> Result<Option<TagEntity>, error::SystemError> {
        Ok(self.read().await.tags.get(id).cloned())
    }

    async fn find_tags_by_ids(&self, ids: &[Uuid]) -> Result<Vec<TagEntity>, error::SystemError> {
        let state = self.read().await;
        Ok(ids.iter().filter_map(|id| state.tags.get(id).cloned()).collect())
    }

    async fn find_all_tags(&self) -> Result<Vec<TagWithCategories>, error::SystemError> {
        let state = self.read().await;
        let mut tags: Vec<TagWithCategories> = state
            .tags
            .values()
            .map(|tag| TagWithCategories {
                tag: tag.clone(),
                category_ids: state
                    .category_tags
                    .iter()
                    .filter(|(_, tag_id)| *tag_id == tag.id)
                    .map(|(category_id, _)| *category_id)
                    .collect(),
            })
            .collect();
        tags.sort_by(|a, b| a.tag.name.cmp(&b.tag.name));
        Ok(tags)
    }

    async fn create_tag(
        &self,
        tag: &TagEntity,
        category_ids: &[Uuid],
    ) -> Result<TagEntity, error::SystemError> {
        let mut state = self.write().await;
        if category_ids.iter().any(|id| !state.categories.contains_key(id)) {
            return Err(error::SystemError::not_found("Filter category not found"));
        }
        if state.tags.values().any(|t| t.name.eq_ignore_ascii_case(&tag.name)) {
            return Err(error::SystemError::conflict(format!("Tag '{}' already exists", tag.name)));
        }
        state.tags.insert(tag.id, tag.clone());
        for category_id in category_ids {
            state.category_tags.insert((*category_id, tag.id));
        }
        Ok(tag.clone())
    }

    async fn rename_tag(&self, id: &Uuid, name: &str) -> Result<TagEntity, error::SystemError> {
        let mut state = self.write().await;
        if state.tags.values().any(|t| t.id != *id && t.name.eq_ignore_ascii_case(name)) {
            return Err(error::SystemError::conflict(format!("Tag '{name}' already exists")));
        }
        let tag = state
            .tags
            .get_mut(id)
            .ok_or_else(|| error::SystemError::not_found("Tag not found"))?;
        tag.name = name.to_string();
        Ok(tag.clone())
    }

    async fn delete_tag(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let mut state = self.write().await;
        if state.tags.remove(id).is_none() {
            return Ok(false);
        }
        state.category_tags.retain(|(_, tag_id)| tag_id != id);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl FilterCategoryRepository for MemoryStore {
    async fn find_category(
        &self,
        id: &Uuid,
    ) -> Result<Option<FilterCategoryEntity>, error::SystemError> {
        Ok(self.read().await.categories.get(id).cloned())
    }

    async fn create_category(
        &self,
        category: &FilterCategoryEntity,
    ) -> Result<FilterCategoryEntity, error::SystemError> {
        let mut state = self.write().await;
        if state.categories.values().any(|c| c.name.eq_ignore_ascii_case(&category.name)) {
            return Err(error::SystemError::conflict(format!(
                "Filter category '{}' already exists",
                category.name
            )));
        }
        state.categories.insert(category.id, category.clone());
        Ok(category.clone())
    }

    async fn rename_category(
        &self,
        id: &Uuid,
        name: &str,
    ) -> Result<FilterCategoryEntity, error::SystemError> {
        let mut state = self.write().await;
        if state.categories.values().any(|c| c.id != *id && c.name.eq_ignore_ascii_case(name)) {
            return Err(error::SystemError::conflict(format!(
                "Filter category '{name}' already exists"
            )));
        }
        let category = state
            .categories
            .get_mut(id)
            .ok_or_else(|| error::SystemError::not_found("Filter category not found"))?;
        category.name = name.to_string();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let mut state = self.write().await;
        if state.categories.remove(id).is_none() {
            return Ok(false);
        }
        state.category_tags.retain(|(category_id, _)| category_id != id);

        let value_ids: Vec<Uuid> = state
            .filter_values
            .values()
            .filter(|v| v.category_id == *id)
            .map(|v| v.id)
            .collect();
        for value_id in &value_ids {
            state.filter_values.remove(value_id);
        }
        state.drop_assignments(&value_ids);
        Ok(true)
    }

    async fn link_tags(&self, category_id: &Uuid, tag_ids: &[Uuid]) -> Result<(), error::SystemError> {
        let mut state = self.write().await;
        if !state.categories.contains_key(category_id) {
            return Err(error::SystemError::not_found("Filter category not found"));
        }
        if tag_ids.iter().any(|id| !state.tags.contains_key(id)) {
            return Err(error::SystemError::not_found("Tag not found"));
        }
        for tag_id in tag_ids {
            state.category_tags.insert((*category_id, *tag_id));
        }
        Ok(())
    }

    async fn unlink_tags(
        &self,
        category_id: &Uuid,
        tag_ids: &[Uuid],
    ) -> Result<(), error::SystemError> {
        let mut state = self.write().await;
        if !state.categories.contains_key(category_id) {
            return Err(error::SystemError::not_found("Filter category not found"));
        }
        if tag_ids.iter().any(|id| !state.tags.contains_key(id)) {
            return Err(error::SystemError::not_found("Tag not found"));
        }
        for tag_id in tag_ids {
            state.category_tags.remove(&(*category_id, *tag_id));
        }
        Ok(())
    }

    async fn find_categories_with_tags(&self) -> Result<Vec<CategoryWithTags>, error::SystemError> {
        let state = self.read().await;
        let mut categories: Vec<CategoryWithTags> = state
            .categories
            .values()
            .map(|category| {
                let mut tags: Vec<TagEntity> = state
                    .category_tags
                    .iter()
                    .filter(|(category_id, _)| *category_id == category.id)
                    .filter_map(|(_, tag_id)| state.tags.get(tag_id).cloned())
                    .collect();
                tags.sort_by(|a, b| a.name.cmp(&b.name));
                CategoryWithTags { category: category.clone(), tags }
            })
            .collect();
        categories.sort_by(|a, b| a.category.name.cmp(&b.category.name));
        Ok(categories)
    }
}

#[async_trait::async_trait]
impl FilterValueRepository for MemoryStore {
    async fn find_values(
        &self,
        category_id: Option<&Uuid>,
    ) -> Result<Vec<FilterValueEntity>, error::SystemError> {
        let mut values: Vec<FilterValueEntity> = self
            .read()
            .await
            .filter_values
            .values()
            .filter(|v| category_id.map_or(true, |id| v.category_id == *id))
            .cloned()
            .collect();
        values.sort_by(|a, b| a.value.cmp(&b.value));
        Ok(values)
    }

    async fn find_values_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<FilterValueEntity>, error::SystemError> {
        let state = self.read().await;
        Ok(ids.iter().filter_map(|id| state.filter_values.get(id).cloned()).collect())
    }

    async fn create_value(
        &self,
        value: &FilterValueEntity,
    ) -> Result<FilterValueEntity, error::SystemError> {
        let mut state = self.write().await;
        if !state.categories.contains_key(&value.category_id) {
            return Err(error::SystemError::not_found("Filter category not found"));
        }
        if state
            .filter_values
            .values()
            .any(|v| v.category_id == value.category_id && v.value.eq_ignore_ascii_case(&value.value))
        {
            return Err(error::SystemError::conflict(format!(
                "Filter value '{}' already exists",
                value.value
            )));
        }
        state.filter_values.insert(value.id, value.clone());
        Ok(value.clone())
    }

    async fn delete_value(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let mut state = self.write().await;
        if state.filter_values.remove(id).is_none() {
            return Ok(false);
        }
        state.drop_assignments(&[*id]);
        Ok(true)
    }
}
