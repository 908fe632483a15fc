use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, HttpMessage, HttpRequest,
};
use futures_util::{future::LocalBoxFuture, FutureExt};
use uuid::Uuid;

use crate::{
    api::error,
    modules::permission::{
        schema::{Action, ResourceType},
        service::PermissionService,
    },
    utils::Claims,
    ENV,
};

pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let auth = req.headers().get("Authorization").and_then(|h| h.to_str().ok());
    let token = match auth.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(t) => t,
        None => {
            return Err(error::Error::unauthorized("Token Invalid or Expired").into());
        }
    };

    let claims = Claims::decode(token, ENV.jwt_secret.as_ref())
        .map_err(|_| error::Error::unauthorized("Token Invalid or Expired"))?;

    req.extensions_mut().insert(claims);

    next.call(req).await
}

pub fn get_claims(req: &HttpRequest) -> Result<Claims, error::Error> {
    let extensions = req.extensions();

    let claims = extensions
        .get::<Claims>()
        .ok_or_else(|| error::Error::unauthorized("Unauthorized"))?
        .clone();

    Ok(claims)
}

fn resource_id(req: &HttpRequest) -> Option<Uuid> {
    req.match_info().get("id").and_then(|id| Uuid::parse_str(id).ok())
}

/// Checks `action` for the authenticated caller and returns their claims.
pub fn ensure_permission(
    req: &HttpRequest,
    action: Action,
    resource_type: ResourceType,
) -> Result<Claims, error::Error> {
    let claims = get_claims(req)?;
    let permissions = req
        .app_data::<web::Data<PermissionService>>()
        .ok_or(error::Error::InternalServer)?;
    permissions.check(&claims, action, resource_type, resource_id(req).as_ref())?;
    Ok(claims)
}

/// Gate for a fixed action on every route the middleware wraps.
pub fn require_permission<B>(
    action: Action,
    resource_type: ResourceType,
) -> impl Fn(
    ServiceRequest,
    Next<B>,
) -> LocalBoxFuture<'static, Result<ServiceResponse<B>, actix_web::Error>>
where
    B: MessageBody + 'static,
{
    move |req: ServiceRequest, next: Next<B>| {
        async move {
            ensure_permission(req.request(), action, resource_type)?;
            next.call(req).await
        }
        .boxed_local()
    }
}

/// Gate whose action follows the HTTP method (GET views, POST creates, ...).
pub fn require_method_permission<B>(
    resource_type: ResourceType,
) -> impl Fn(
    ServiceRequest,
    Next<B>,
) -> LocalBoxFuture<'static, Result<ServiceResponse<B>, actix_web::Error>>
where
    B: MessageBody + 'static,
{
    move |req: ServiceRequest, next: Next<B>| {
        async move {
            let action = Action::for_method(req.method());
            ensure_permission(req.request(), action, resource_type)?;
            next.call(req).await
        }
        .boxed_local()
    }
}
