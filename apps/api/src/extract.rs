use axum::extract::FromRequest;

use crate::errors::AppError;

/// `Json` extractor whose rejections become structured `AppError::Validation` responses.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
