use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

// Request bodies are the domain input types; their validation lives with them.
pub use stockroom_products::{
    CreateProductInput as CreateProductRequest, StockAdjustmentInput as AdjustStockRequest,
    UpdateProductInput as UpdateProductRequest,
};

/// Envelope for every successful response.
#[derive(Debug, Serialize)]
pub struct SuccessBody<T> {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub fn success<T: Serialize>(
    status: StatusCode,
    message: &'static str,
    data: T,
) -> axum::response::Response {
    (
        status,
        Json(SuccessBody {
            success: true,
            message,
            data: Some(data),
        }),
    )
        .into_response()
}

/// Success acknowledgement without a payload.
pub fn acknowledged(message: &'static str) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(SuccessBody::<()> {
            success: true,
            message,
            data: None,
        }),
    )
        .into_response()
}
