use super::repository;
use super::sync::{OrderGateway, OrderStatusSync, RepositoryOrderGateway};
use contracts::domain::a001_order::aggregate::{Order, OrderDto};
use contracts::domain::a001_order::editor::{EditorError, OrderEditor, OrderEditorState, PersistPlan};
use contracts::domain::a001_order::status::OrderStatus;
use contracts::domain::common::AggregateRoot;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::logger;

#[derive(Debug, Error)]
pub enum OrderActionError {
    #[error("Order not found")]
    NotFound,
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("Deletion must be confirmed")]
    NotConfirmed,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Фильтр списка заказов
#[derive(Debug, Clone, Default)]
pub struct OrderListFilter {
    pub status: Option<String>,
    pub client: Option<String>,
    /// Часть названия заказа/проекта (`titre_affichage`)
    pub title: Option<String>,
}

impl OrderListFilter {
    fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status.as_deref().filter(|s| !s.trim().is_empty()) {
            if order.status.as_str() != status.trim() {
                return false;
            }
        }
        if let Some(client) = self.client.as_deref().filter(|s| !s.trim().is_empty()) {
            let needle = client.trim().to_lowercase();
            if !order.client_name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if let Some(title) = self.title.as_deref().filter(|s| !s.trim().is_empty()) {
            let needle = title.trim().to_lowercase();
            if !order.display_title.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// Оформление нового заказа
pub async fn create(dto: OrderDto) -> anyhow::Result<Uuid> {
    let commande_id = dto
        .commande_id
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| format!("CMD-{}", Uuid::new_v4()));

    if repository::get_by_code(&commande_id).await?.is_some() {
        anyhow::bail!("Order {} already exists", commande_id);
    }

    let mut order = Order::new_for_insert(
        commande_id,
        dto.client_name,
        dto.display_title,
        dto.articles,
        dto.client_email,
        dto.client_phone,
    );

    // Валидация
    order
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    order.before_write();

    let id = repository::insert(&order).await?;
    logger::log(
        &Order::full_name(),
        &format!("Order {} created for {}", order.commande_id(), order.client_name),
    );
    Ok(id)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Order>> {
    repository::get_by_id(id).await
}

pub async fn list(filter: &OrderListFilter) -> anyhow::Result<Vec<Order>> {
    let mut items = repository::list_all().await?;
    items.retain(|order| filter.matches(order));
    Ok(items)
}

/// Удаление заказа администратором (только с подтверждением)
pub async fn delete(id: Uuid, confirmed: bool) -> Result<(), OrderActionError> {
    if !confirmed {
        return Err(OrderActionError::NotConfirmed);
    }
    let order = repository::get_by_id(id)
        .await?
        .ok_or(OrderActionError::NotFound)?;

    if !repository::soft_delete(id).await? {
        return Err(OrderActionError::NotFound);
    }
    logger::log(
        &Order::full_name(),
        &format!("Order {} deleted", order.commande_id()),
    );
    Ok(())
}

/// Переключить собранность позиции
pub async fn toggle_article(id: Uuid, index: usize) -> Result<OrderEditorState, OrderActionError> {
    run_editor_action(id, |editor| Ok(editor.toggle_article_completion(index)?)).await
}

/// Ручная установка статуса
pub async fn set_status(id: Uuid, status: OrderStatus) -> Result<OrderEditorState, OrderActionError> {
    run_editor_action(id, |editor| Ok(editor.set_manual_status(status))).await
}

/// Сохранить сообщение поставщику
pub async fn save_message(id: Uuid, message: String) -> Result<OrderEditorState, OrderActionError> {
    run_editor_action(id, |editor| {
        editor.set_message(message);
        Ok(editor.save_message())
    })
    .await
}

/// Загрузить заказ в редактор, применить действие и сохранить результат.
///
/// Ответ строится из локального состояния редактора; ошибки сохранения
/// только логируются.
async fn run_editor_action<F>(id: Uuid, action: F) -> Result<OrderEditorState, OrderActionError>
where
    F: FnOnce(&mut OrderEditor) -> Result<PersistPlan, OrderActionError>,
{
    let order = repository::get_by_id(id)
        .await?
        .ok_or(OrderActionError::NotFound)?;

    apply_and_persist(order, Arc::new(RepositoryOrderGateway), action).await
}

pub(crate) async fn apply_and_persist<G, F>(
    order: Order,
    gateway: Arc<G>,
    action: F,
) -> Result<OrderEditorState, OrderActionError>
where
    G: OrderGateway + 'static,
    F: FnOnce(&mut OrderEditor) -> Result<PersistPlan, OrderActionError>,
{
    let mut editor = OrderEditor::new(order);
    let plan = action(&mut editor)?;

    let mut sync = OrderStatusSync::new(gateway);
    sync.dispatch(plan);
    let report = sync.settle().await;
    if report.failed > 0 {
        tracing::warn!(
            "Order {}: {} persistence call(s) failed",
            editor.order().commande_id(),
            report.failed
        );
    }

    Ok(editor.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use contracts::domain::a001_order::aggregate::{OrderArticle, OrderId};

    struct FailingGateway;

    #[async_trait]
    impl OrderGateway for FailingGateway {
        async fn update_order(&self, _order: &Order) -> anyhow::Result<()> {
            anyhow::bail!("connection refused")
        }

        async fn update_order_status(
            &self,
            _order_id: OrderId,
            _status: &OrderStatus,
            _message: &str,
        ) -> anyhow::Result<()> {
            anyhow::bail!("connection refused")
        }
    }

    fn order() -> Order {
        Order::new_for_insert(
            "CMD-100".into(),
            "Dubois Sanitaire".into(),
            "Remplacement ballon".into(),
            vec![OrderArticle {
                reference: "BAL-200".into(),
                designation: "Ballon eau chaude 200L".into(),
                quantity: 1.0,
                completed: false,
            }],
            Some("contact@dubois.fr".into()),
            None,
        )
    }

    #[tokio::test]
    async fn test_state_reflects_toggle_even_when_persistence_fails() {
        let state = apply_and_persist(order(), Arc::new(FailingGateway), |editor| {
            Ok(editor.toggle_article_completion(0)?)
        })
        .await
        .unwrap();

        assert_eq!(state.status, OrderStatus::Completed);
        assert!(state.articles[0].completed);
    }

    #[tokio::test]
    async fn test_out_of_range_index_is_an_editor_error() {
        let result = apply_and_persist(order(), Arc::new(FailingGateway), |editor| {
            Ok(editor.toggle_article_completion(5)?)
        })
        .await;

        assert!(matches!(
            result,
            Err(OrderActionError::Editor(EditorError::ArticleIndexOutOfRange { index: 5, len: 1 }))
        ));
    }

    #[tokio::test]
    async fn test_delete_without_confirmation_is_refused() {
        let result = delete(Uuid::new_v4(), false).await;
        assert!(matches!(result, Err(OrderActionError::NotConfirmed)));
    }

    #[test]
    fn test_list_filter() {
        let order = order();
        let by_status = OrderListFilter {
            status: Some("Non".into()),
            ..Default::default()
        };
        assert!(by_status.matches(&order));

        let by_client = OrderListFilter {
            client: Some("dubois".into()),
            ..Default::default()
        };
        assert!(by_client.matches(&order));

        let other = OrderListFilter {
            status: Some("Oui".into()),
            ..Default::default()
        };
        assert!(!other.matches(&order));

        let by_project = OrderListFilter {
            title: Some("BALLON".into()),
            ..Default::default()
        };
        assert!(by_project.matches(&order));

        let other_project = OrderListFilter {
            title: Some("Chaufferie".into()),
            ..Default::default()
        };
        assert!(!other_project.matches(&order));
    }
}
