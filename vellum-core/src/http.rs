//! Thin re-export layer over axum so downstream crates depend on one HTTP surface.

pub mod extract {
    pub use axum::extract::{FromRef, FromRequest, FromRequestParts, Request, State};
}

pub mod header {
    pub use axum::http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
    pub use axum::http::request::Parts;
}

pub mod response {
    pub use axum::response::{IntoResponse, Response};
}

pub mod routing {
    pub use axum::routing::{get, post, MethodRouter};
}

pub use axum::body::{Body, Bytes};
pub use axum::http::{HeaderMap, Method, StatusCode, Uri};
pub use axum::{Extension, Json, Router};
