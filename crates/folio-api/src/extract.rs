//! Extractors whose rejections render as [`ApiError`] JSON bodies instead of
//! axum's plain-text defaults.

use axum::{
  extract::{FromRequest, FromRequestParts},
  response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// [`axum::Json`] with a JSON rejection body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

impl<T: serde::Serialize> IntoResponse for Json<T> {
  fn into_response(self) -> Response { axum::Json(self.0).into_response() }
}

/// [`axum::extract::Path`] with a JSON rejection body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);
