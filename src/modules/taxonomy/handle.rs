use actix_web::{delete, get, patch, post, web};
use uuid::Uuid;

use crate::api::{error, success};
use crate::modules::taxonomy::{
    model,
    schema::{FilterCategoryEntity, FilterValueEntity, TagEntity},
    service::TaxonomyService,
};
use crate::utils::ValidatedJson;

#[get("")]
pub async fn list_tags(
    taxonomy_service: web::Data<TaxonomyService>,
) -> Result<success::Success<Vec<model::TagWithCategories>>, error::Error> {
    let tags = taxonomy_service.list_tags().await?;
    Ok(success::Success::list(tags))
}

#[post("")]
pub async fn create_tag(
    taxonomy_service: web::Data<TaxonomyService>,
    body: ValidatedJson<model::CreateTagModel>,
) -> Result<success::Success<TagEntity>, error::Error> {
    let model::CreateTagModel { name, category_ids } = body.0;
    let tag = taxonomy_service.create_tag(name, category_ids).await?;
    Ok(success::Success::created(Some(tag)).message("Tag created successfully"))
}

#[patch("/{id:[0-9a-fA-F-]{36}}")]
pub async fn rename_tag(
    taxonomy_service: web::Data<TaxonomyService>,
    tag_id: web::Path<Uuid>,
    body: ValidatedJson<model::NameModel>,
) -> Result<success::Success<TagEntity>, error::Error> {
    let tag = taxonomy_service.rename_tag(tag_id.into_inner(), body.0.name).await?;
    Ok(success::Success::ok(Some(tag)).message("Tag renamed successfully"))
}

#[delete("/{id:[0-9a-fA-F-]{36}}")]
pub async fn delete_tag(
    taxonomy_service: web::Data<TaxonomyService>,
    tag_id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    taxonomy_service.delete_tag(tag_id.into_inner()).await?;
    Ok(success::Success::no_content())
}

#[get("")]
pub async fn list_categories(
    taxonomy_service: web::Data<TaxonomyService>,
) -> Result<success::Success<Vec<model::CategoryWithTags>>, error::Error> {
    let categories = taxonomy_service.list_filter_categories_with_tags().await?;
    Ok(success::Success::list(categories))
}

#[post("")]
pub async fn create_category(
    taxonomy_service: web::Data<TaxonomyService>,
    body: ValidatedJson<model::NameModel>,
) -> Result<success::Success<FilterCategoryEntity>, error::Error> {
    let category = taxonomy_service.create_filter_category(body.0.name).await?;
    Ok(success::Success::created(Some(category)).message("Filter category created successfully"))
}

#[patch("/{id:[0-9a-fA-F-]{36}}")]
pub async fn rename_category(
    taxonomy_service: web::Data<TaxonomyService>,
    category_id: web::Path<Uuid>,
    body: ValidatedJson<model::NameModel>,
) -> Result<success::Success<FilterCategoryEntity>, error::Error> {
    let category =
        taxonomy_service.rename_filter_category(category_id.into_inner(), body.0.name).await?;
    Ok(success::Success::ok(Some(category)).message("Filter category renamed successfully"))
}

#[delete("/{id:[0-9a-fA-F-]{36}}")]
pub async fn delete_category(
    taxonomy_service: web::Data<TaxonomyService>,
    category_id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    taxonomy_service.delete_filter_category(category_id.into_inner()).await?;
    Ok(success::Success::no_content())
}

#[post("/{id:[0-9a-fA-F-]{36}}/tags")]
pub async fn add_category_tags(
    taxonomy_service: web::Data<TaxonomyService>,
    category_id: web::Path<Uuid>,
    body: ValidatedJson<model::TagIdsModel>,
) -> Result<success::Success<()>, error::Error> {
    taxonomy_service.add_tags_to_category(category_id.into_inner(), body.0.tag_ids).await?;
    Ok(success::Success::ok(None).message("Tags added to category"))
}

#[delete("/{id:[0-9a-fA-F-]{36}}/tags")]
pub async fn remove_category_tags(
    taxonomy_service: web::Data<TaxonomyService>,
    category_id: web::Path<Uuid>,
    body: ValidatedJson<model::TagIdsModel>,
) -> Result<success::Success<()>, error::Error> {
    taxonomy_service.remove_tags_from_category(category_id.into_inner(), body.0.tag_ids).await?;
    Ok(success::Success::ok(None).message("Tags removed from category"))
}

#[get("/{id:[0-9a-fA-F-]{36}}/values")]
pub async fn list_category_values(
    taxonomy_service: web::Data<TaxonomyService>,
    category_id: web::Path<Uuid>,
) -> Result<success::Success<Vec<FilterValueEntity>>, error::Error> {
    let values = taxonomy_service.list_filter_values(Some(category_id.into_inner())).await?;
    Ok(success::Success::list(values))
}

#[post("/{id:[0-9a-fA-F-]{36}}/values")]
pub async fn create_category_value(
    taxonomy_service: web::Data<TaxonomyService>,
    category_id: web::Path<Uuid>,
    body: ValidatedJson<model::FilterValueModel>,
) -> Result<success::Success<FilterValueEntity>, error::Error> {
    let value =
        taxonomy_service.create_filter_value(category_id.into_inner(), body.0.value).await?;
    Ok(success::Success::created(Some(value)).message("Filter value created successfully"))
}

#[get("")]
pub async fn list_values(
    taxonomy_service: web::Data<TaxonomyService>,
    query: web::Query<model::FilterValueQuery>,
) -> Result<success::Success<Vec<FilterValueEntity>>, error::Error> {
    let values = taxonomy_service.list_filter_values(query.category_id).await?;
    Ok(success::Success::list(values))
}

#[delete("/{id:[0-9a-fA-F-]{36}}")]
pub async fn delete_value(
    taxonomy_service: web::Data<TaxonomyService>,
    value_id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    taxonomy_service.delete_filter_value(value_id.into_inner()).await?;
    Ok(success::Success::no_content())
}
