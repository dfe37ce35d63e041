use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path,
    },
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};

use crate::app::dto::{self, AdjustStockRequest, CreateProductRequest, UpdateProductRequest};
use crate::app::errors;
use crate::app::services::ProductService;

/// `/low-stock` is registered before the id-capturing routes.
pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/low-stock", get(low_stock_products))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/increase", patch(increase_stock))
        .route("/:id/decrease", patch(decrease_stock))
}

/// A request without a JSON body carries no amount, so it is validated as an empty adjustment.
fn adjustment_body(
    body: Result<Json<AdjustStockRequest>, JsonRejection>,
) -> Result<AdjustStockRequest, axum::response::Response> {
    match body {
        Ok(Json(b)) => Ok(b),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(AdjustStockRequest::default()),
        Err(e) => Err(errors::body_rejection_to_response(e)),
    }
}

pub async fn create_product(
    Extension(services): Extension<ProductService>,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::body_rejection_to_response(e),
    };

    match services.create(&body).await {
        Ok(product) => dto::success(StatusCode::CREATED, "Product created successfully", product),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<ProductService>,
) -> axum::response::Response {
    match services.list().await {
        Ok(products) => dto::success(StatusCode::OK, "Products fetched successfully", products),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<ProductService>,
    id: Result<Path<String>, PathRejection>,
) -> axum::response::Response {
    let Path(id) = match id {
        Ok(p) => p,
        Err(e) => return errors::path_rejection_to_response(e),
    };
    match services.get(&id).await {
        Ok(product) => dto::success(StatusCode::OK, "Product fetched successfully", product),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<ProductService>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let Path(id) = match id {
        Ok(p) => p,
        Err(e) => return errors::path_rejection_to_response(e),
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::body_rejection_to_response(e),
    };

    match services.update(&id, &body).await {
        Ok(product) => dto::success(StatusCode::OK, "Product updated successfully", product),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<ProductService>,
    id: Result<Path<String>, PathRejection>,
) -> axum::response::Response {
    let Path(id) = match id {
        Ok(p) => p,
        Err(e) => return errors::path_rejection_to_response(e),
    };
    match services.delete(&id).await {
        Ok(()) => dto::acknowledged("Product deleted successfully"),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn increase_stock(
    Extension(services): Extension<ProductService>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<AdjustStockRequest>, JsonRejection>,
) -> axum::response::Response {
    let Path(id) = match id {
        Ok(p) => p,
        Err(e) => return errors::path_rejection_to_response(e),
    };
    let body = match adjustment_body(body) {
        Ok(b) => b,
        Err(response) => return response,
    };

    match services.increase_stock(&id, &body).await {
        Ok(product) => dto::success(StatusCode::OK, "Stock increased successfully", product),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn decrease_stock(
    Extension(services): Extension<ProductService>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<AdjustStockRequest>, JsonRejection>,
) -> axum::response::Response {
    let Path(id) = match id {
        Ok(p) => p,
        Err(e) => return errors::path_rejection_to_response(e),
    };
    let body = match adjustment_body(body) {
        Ok(b) => b,
        Err(response) => return response,
    };

    match services.decrease_stock(&id, &body).await {
        Ok(product) => dto::success(StatusCode::OK, "Stock decreased successfully", product),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn low_stock_products(
    Extension(services): Extension<ProductService>,
) -> axum::response::Response {
    match services.low_stock().await {
        Ok(products) => dto::success(
            StatusCode::OK,
            "Low stock products fetched successfully",
            products,
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}
