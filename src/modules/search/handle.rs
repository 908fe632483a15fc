use actix_web::{delete, get, post, web, HttpRequest};

use crate::api::{error, success};
use crate::middlewares::get_claims;
use crate::modules::{
    asset::{model::AssetPage, schema::AssetEntity},
    search::{
        model::{AdvancedSearchModel, FilterState, SearchHistoryEntry},
        service::SearchService,
    },
};
use crate::utils::ValidatedJson;

#[post("/filter")]
pub async fn filter_assets(
    search_service: web::Data<SearchService>,
    body: ValidatedJson<FilterState>,
) -> Result<success::Success<Vec<AssetEntity>>, error::Error> {
    let assets = search_service.filter_assets(&body.0).await?;
    Ok(success::Success::list(assets))
}

#[post("/advanced")]
pub async fn advanced_search(
    search_service: web::Data<SearchService>,
    body: ValidatedJson<AdvancedSearchModel>,
    req: HttpRequest,
) -> Result<success::Success<AssetPage>, error::Error> {
    let claims = get_claims(&req)?;
    let page = search_service.advanced_search(&claims.user_key(), &body.0.filters).await?;
    Ok(success::Success::ok(Some(page)))
}

#[get("/history")]
pub async fn get_history(
    search_service: web::Data<SearchService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<SearchHistoryEntry>>, error::Error> {
    let claims = get_claims(&req)?;
    let history = search_service.search_history(&claims.user_key()).await?;
    Ok(success::Success::list(history))
}

#[delete("/history")]
pub async fn clear_history(
    search_service: web::Data<SearchService>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let claims = get_claims(&req)?;
    search_service.clear_search_history(&claims.user_key()).await?;
    Ok(success::Success::no_content())
}
