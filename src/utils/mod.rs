use actix_web::{web, FromRequest};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{api::error, modules::permission::schema::Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: uuid::Uuid,
    /// Display name recorded as the actor of catalog activity.
    pub name: String,
    pub role: Role,
    pub iat: u64,
    pub exp: u64,
}

impl Claims {
    pub fn new(sub: &uuid::Uuid, name: &str, role: Role, exp: u64) -> Self {
        let now = chrono::Utc::now().timestamp() as u64;
        Claims { sub: *sub, name: name.to_string(), role, iat: now, exp: now + exp }
    }

    /// Key under which per-user client state (search history) is stored.
    pub fn user_key(&self) -> String {
        self.sub.to_string()
    }

    pub fn encode(&self, secret: &[u8]) -> Result<String, error::SystemError> {
        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, self, &EncodingKey::from_secret(secret))?;
        Ok(token)
    }

    pub fn decode(token: &str, secret: &[u8]) -> Result<Self, error::SystemError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        let token_data = decode::<Self>(token, &DecodingKey::from_secret(secret), &validation)?;
        Ok(token_data.claims)
    }
}

/// Flattens validation failures into `field: message` pairs for the 400 body.
fn validated<T: Validate>(model: T) -> Result<T, error::Error> {
    let Err(errors) = model.validate() else {
        return Ok(model);
    };
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field}: {}", e.code),
            })
        })
        .collect();
    if fields.is_empty() {
        return Err(error::Error::bad_request(errors.to_string()));
    }
    fields.sort();
    Err(error::Error::bad_request(fields.join("; ")))
}

/// JSON body that has passed its `validator` rules.
pub struct ValidatedJson<T>(pub T);

impl<T> FromRequest for ValidatedJson<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let body = web::Json::<T>::from_request(req, payload);
        Box::pin(async move {
            let body = body.await.map_err(|e| error::Error::bad_request(e.to_string()))?;
            validated(body.into_inner()).map(ValidatedJson)
        })
    }
}

/// Query string counterpart of [`ValidatedJson`].
pub struct ValidatedQuery<T>(pub T);

impl<T> FromRequest for ValidatedQuery<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let query = web::Query::<T>::from_request(req, payload);
        Box::pin(async move {
            let query = query.await.map_err(|e| error::Error::bad_request(e.to_string()))?;
            validated(query.into_inner()).map(ValidatedQuery)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::permission::schema::Role;

    #[test]
    fn claims_round_trip_through_jwt() {
        let claims = Claims::new(&uuid::Uuid::now_v7(), "alice", Role::Editor, 60);
        let token = claims.encode(b"secret").unwrap();

        let decoded = Claims::decode(&token, b"secret").unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.name, "alice");
        assert_eq!(decoded.role, Role::Editor);
        assert!(Claims::decode(&token, b"other").is_err());
    }

    #[derive(Debug, serde::Deserialize, Validate)]
    struct Named {
        #[validate(length(min = 1, message = "cannot be empty"))]
        name: String,
    }

    #[test]
    fn validation_errors_name_the_field() {
        assert!(validated(Named { name: "x".into() }).is_ok());
        match validated(Named { name: String::new() }) {
            Err(error::Error::BadRequest(msg)) => assert_eq!(msg, "name: cannot be empty"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
