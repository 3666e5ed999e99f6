use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a001_order::aggregate::{
    DeleteOrderRequest, Order, OrderDto, OrderView, SaveMessageRequest, SetStatusRequest,
};
use contracts::domain::a001_order::editor::OrderEditorState;
use contracts::shared::notifications::{
    EmailNotificationRequest, NotificationResponse, SmsNotificationRequest,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::domain::a001_order;
use crate::domain::a001_order::service::{OrderActionError, OrderListFilter};
use crate::shared::config;
use crate::shared::notifications::{email, sms};

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    pub client: Option<String>,
    pub title: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

fn parse_id(id: &str) -> Result<Uuid, StatusCode> {
    Uuid::parse_str(id).map_err(|_| StatusCode::BAD_REQUEST)
}

fn action_status(e: OrderActionError) -> StatusCode {
    match e {
        OrderActionError::NotFound => StatusCode::NOT_FOUND,
        OrderActionError::Editor(e) => {
            tracing::warn!("Rejected order edit: {}", e);
            StatusCode::BAD_REQUEST
        }
        OrderActionError::NotConfirmed => StatusCode::PRECONDITION_REQUIRED,
        OrderActionError::Storage(e) => {
            tracing::error!("Order action failed: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Уведомлять клиента можно только о полностью собранном заказе
fn ensure_ready(order: &Order) -> Result<(), StatusCode> {
    if order.status.is_ready() {
        Ok(())
    } else {
        Err(StatusCode::CONFLICT)
    }
}

/// GET /api/a001/orders
pub async fn list_orders(
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderView>>, StatusCode> {
    let filter = OrderListFilter {
        status: query.status,
        client: query.client,
        title: query.title,
    };
    let items = a001_order::service::list(&filter).await.map_err(|e| {
        tracing::error!("Failed to list orders: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let limit = query.limit.unwrap_or(1000);
    let offset = query.offset.unwrap_or(0);
    Ok(Json(
        items
            .iter()
            .skip(offset)
            .take(limit)
            .map(OrderView::from)
            .collect(),
    ))
}

/// GET /api/a001/orders/:id
pub async fn get_order(Path(id): Path<String>) -> Result<Json<OrderView>, StatusCode> {
    let uuid = parse_id(&id)?;
    match a001_order::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(OrderView::from(&v))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to load order {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/a001/orders
pub async fn create_order(
    Json(dto): Json<OrderDto>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    match a001_order::service::create(dto).await {
        Ok(id) => Ok(Json(json!({"id": id.to_string()}))),
        Err(e) => {
            tracing::error!("Failed to create order: {}", e);
            Err(StatusCode::UNPROCESSABLE_ENTITY)
        }
    }
}

/// POST /api/a001/orders/:id/articles/:index/toggle
pub async fn toggle_article(
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<OrderEditorState>, StatusCode> {
    let uuid = parse_id(&id)?;
    a001_order::service::toggle_article(uuid, index)
        .await
        .map(Json)
        .map_err(action_status)
}

/// POST /api/a001/orders/:id/status
pub async fn set_status(
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<OrderEditorState>, StatusCode> {
    let uuid = parse_id(&id)?;
    a001_order::service::set_status(uuid, req.status)
        .await
        .map(Json)
        .map_err(action_status)
}

/// POST /api/a001/orders/:id/message
pub async fn save_message(
    Path(id): Path<String>,
    Json(req): Json<SaveMessageRequest>,
) -> Result<Json<OrderEditorState>, StatusCode> {
    let uuid = parse_id(&id)?;
    a001_order::service::save_message(uuid, req.message)
        .await
        .map(Json)
        .map_err(action_status)
}

/// POST /api/a001/orders/:id/delete
pub async fn delete_order(
    Path(id): Path<String>,
    body: Option<Json<DeleteOrderRequest>>,
) -> Result<(), StatusCode> {
    let uuid = parse_id(&id)?;
    let confirmed = body.map(|Json(req)| req.confirm).unwrap_or(false);
    a001_order::service::delete(uuid, confirmed)
        .await
        .map_err(action_status)
}

/// POST /api/a001/orders/:id/notify
///
/// Уведомить клиента о готовности заказа всеми доступными каналами.
/// Заказ должен быть в статусе `Oui`.
pub async fn notify_ready(
    Path(id): Path<String>,
) -> Result<Json<Vec<NotificationResponse>>, StatusCode> {
    let uuid = parse_id(&id)?;
    let order = match a001_order::service::get_by_id(uuid).await {
        Ok(Some(order)) => order,
        Ok(None) => return Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to load order {}: {}", id, e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    ensure_ready(&order)?;

    let mut responses = Vec::new();
    if let Some(client_email) = order.client_email.clone() {
        let req = EmailNotificationRequest {
            client_email,
            order_number: order.commande_id().to_string(),
        };
        match email::send_ready_email(&config::get().notifications, &req).await {
            Ok(r) => responses.push(r),
            Err(e) => {
                tracing::warn!("Ready email for order {} failed: {}", order.commande_id(), e);
                responses.push(NotificationResponse {
                    success: false,
                    simulated: false,
                    message: e.to_string(),
                    provider_id: None,
                });
            }
        }
    }
    if let Some(phone_number) = order.client_phone.clone() {
        let req = SmsNotificationRequest {
            phone_number,
            message: format!(
                "Votre commande {} est prête. Vous pouvez la retirer au comptoir.",
                order.commande_id()
            ),
            order_number: order.commande_id().to_string(),
        };
        match sms::send_sms(&req) {
            Ok(r) => responses.push(r),
            Err(e) => responses.push(NotificationResponse {
                success: false,
                simulated: true,
                message: e.to_string(),
                provider_id: None,
            }),
        }
    }

    if responses.is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    Ok(Json(responses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_order::aggregate::OrderArticle;
    use contracts::domain::a001_order::status::OrderStatus;

    fn order(status: OrderStatus) -> Order {
        let mut order = Order::new_for_insert(
            "CMD-310".into(),
            "Bernard Chauffage".into(),
            "Chaudière gaz".into(),
            vec![OrderArticle {
                reference: "VAN-15".into(),
                designation: "Vanne 1/4 tour 15x21".into(),
                quantity: 2.0,
                completed: true,
            }],
            Some("atelier@bernard.fr".into()),
            Some("+33 6 12 34 56 78".into()),
        );
        order.status = status;
        order
    }

    #[test]
    fn test_only_completed_orders_can_be_notified() {
        assert!(ensure_ready(&order(OrderStatus::Completed)).is_ok());
        for status in [
            OrderStatus::NotStarted,
            OrderStatus::InProgress,
            OrderStatus::Custom("Oui partiel".into()),
        ] {
            assert_eq!(ensure_ready(&order(status)), Err(StatusCode::CONFLICT));
        }
    }

    #[test]
    fn test_unconfirmed_delete_maps_to_428() {
        assert_eq!(
            action_status(OrderActionError::NotConfirmed),
            StatusCode::PRECONDITION_REQUIRED
        );
        assert_eq!(action_status(OrderActionError::NotFound), StatusCode::NOT_FOUND);
    }
}
