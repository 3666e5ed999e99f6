use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // A001 ORDERS
        // ========================================
        .route(
            "/api/a001/orders",
            get(handlers::a001_order::list_orders).post(handlers::a001_order::create_order),
        )
        .route("/api/a001/orders/:id", get(handlers::a001_order::get_order))
        .route(
            "/api/a001/orders/:id/articles/:index/toggle",
            post(handlers::a001_order::toggle_article),
        )
        .route(
            "/api/a001/orders/:id/status",
            post(handlers::a001_order::set_status),
        )
        .route(
            "/api/a001/orders/:id/message",
            post(handlers::a001_order::save_message),
        )
        .route(
            "/api/a001/orders/:id/notify",
            post(handlers::a001_order::notify_ready),
        )
        .route(
            "/api/a001/orders/:id/delete",
            post(handlers::a001_order::delete_order),
        )
        // ========================================
        // A002 PRODUCT CATALOG
        // ========================================
        .route(
            "/api/a002/products",
            get(handlers::a002_product::list_products).post(handlers::a002_product::upsert),
        )
        .route(
            "/api/a002/products/categories",
            get(handlers::a002_product::list_categories),
        )
        .route(
            "/api/a002/products/testdata",
            post(handlers::a002_product::insert_test_data),
        )
        .route(
            "/api/a002/products/:id",
            get(handlers::a002_product::get_by_id).delete(handlers::a002_product::delete),
        )
        // ========================================
        // NOTIFICATIONS
        // ========================================
        .route(
            "/api/notifications/email",
            post(handlers::notifications::send_email),
        )
        .route(
            "/api/notifications/sms",
            post(handlers::notifications::send_sms),
        )
        // ========================================
        // SYSTEM LOG
        // ========================================
        .route(
            "/api/logs",
            get(handlers::logs::list_all)
                .post(handlers::logs::create)
                .delete(handlers::logs::clear_all),
        )
}
