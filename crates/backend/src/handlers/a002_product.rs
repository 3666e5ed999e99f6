use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a002_product::aggregate::{Product, ProductDto};
use contracts::domain::a002_product::catalog::{CatalogFilter, CategoryNode, Page};
use serde::Deserialize;
use serde_json::json;

use crate::domain::a002_product;
use crate::domain::a002_product::service::ProductSaveError;

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub search: Option<String>,
}

/// GET /api/a002/products
pub async fn list_products(
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Page<Product>>, StatusCode> {
    let filter = CatalogFilter {
        category: query.category,
        subcategory: query.subcategory,
        search: query.search,
    };
    match a002_product::service::list_page(&filter, query.page, query.page_size).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            tracing::error!("Failed to list products: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/a002/products/categories
pub async fn list_categories() -> Result<Json<Vec<CategoryNode>>, StatusCode> {
    match a002_product::service::category_hierarchy().await {
        Ok(tree) => Ok(Json(tree)),
        Err(e) => {
            tracing::error!("Failed to build category hierarchy: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/a002/products/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Product>, StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a002_product::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

fn save_status(e: ProductSaveError) -> StatusCode {
    match e {
        ProductSaveError::InvalidId | ProductSaveError::Validation(_) => {
            tracing::warn!("Rejected product: {}", e);
            StatusCode::BAD_REQUEST
        }
        ProductSaveError::NotFound => StatusCode::NOT_FOUND,
        ProductSaveError::DuplicateCode(_) => StatusCode::CONFLICT,
        ProductSaveError::Storage(e) => {
            tracing::error!("Failed to save product: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// POST /api/a002/products
pub async fn upsert(Json(dto): Json<ProductDto>) -> Result<Json<serde_json::Value>, StatusCode> {
    let id = match dto.id.clone() {
        Some(id) => a002_product::service::update(dto).await.map(|_| id),
        None => a002_product::service::create(dto)
            .await
            .map(|id| id.to_string()),
    }
    .map_err(save_status)?;

    Ok(Json(json!({"id": id})))
}

/// DELETE /api/a002/products/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a002_product::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// POST /api/a002/products/testdata
pub async fn insert_test_data() -> StatusCode {
    match a002_product::service::insert_test_data().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!("Failed to insert catalog test data: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_errors_map_to_status_codes() {
        assert_eq!(save_status(ProductSaveError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(save_status(ProductSaveError::InvalidId), StatusCode::BAD_REQUEST);
        assert_eq!(
            save_status(ProductSaveError::DuplicateCode("CU-T22".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            save_status(ProductSaveError::Storage(anyhow::anyhow!("disk full"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
