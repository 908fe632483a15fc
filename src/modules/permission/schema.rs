use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Download,
    Create,
    Edit,
    Delete,
    Share,
    Admin,
}

impl Action {
    /// Default action implied by an HTTP method.
    pub fn for_method(method: &actix_web::http::Method) -> Self {
        use actix_web::http::Method;
        match *method {
            Method::GET | Method::HEAD | Method::OPTIONS => Action::View,
            Method::POST => Action::Create,
            Method::PUT | Method::PATCH => Action::Edit,
            Method::DELETE => Action::Delete,
            _ => Action::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Asset,
    Folder,
    Tag,
    FilterCategory,
    Search,
}
