use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;
use std::borrow::Cow;

/// JSON envelope for successful responses: `{ data, message?, count? }`.
#[derive(Serialize)]
pub struct SuccessData<T: Serialize> {
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Cow<'static, str>>,
    /// Number of items when `data` is a collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

pub struct Success<T: Serialize> {
    pub status: StatusCode,
    pub body: Option<SuccessData<T>>,
}

impl<T: Serialize> Success<T> {
    fn with_status(status: StatusCode, data: Option<T>) -> Self {
        Self { status, body: Some(SuccessData { data, message: None, count: None }) }
    }

    pub fn ok(data: Option<T>) -> Self {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created(data: Option<T>) -> Self {
        Self::with_status(StatusCode::CREATED, data)
    }

    pub fn no_content() -> Self {
        Self { status: StatusCode::NO_CONTENT, body: None }
    }

    pub fn message<M>(mut self, msg: M) -> Self
    where
        M: Into<Cow<'static, str>>,
    {
        if let Some(body) = &mut self.body {
            body.message = Some(msg.into());
        }
        self
    }
}

impl<T: Serialize> Success<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        let mut success = Self::ok(Some(items));
        if let Some(body) = &mut success.body {
            body.count = Some(count);
        }
        success
    }
}

impl<T: Serialize> actix_web::Responder for Success<T> {
    type Body = actix_web::body::BoxBody;

    fn respond_to(self, _req: &actix_web::HttpRequest) -> HttpResponse<Self::Body> {
        let mut response = HttpResponse::build(self.status);
        match self.body {
            Some(body) => response.json(body),
            None => response.finish(),
        }
    }
}
