//! Слой сохранения для `OrderEditor`.
//!
//! Команды плана уходят во внешнее хранилище через `OrderGateway` в фоновых
//! задачах. Локальное состояние редактора от результата не зависит: ошибки
//! логируются и не повторяются. Незавершённые задачи отменяются при
//! уничтожении `OrderStatusSync`.

use async_trait::async_trait;
use contracts::domain::a001_order::aggregate::{Order, OrderId};
use contracts::domain::a001_order::editor::{PersistCommand, PersistPlan};
use contracts::domain::a001_order::status::OrderStatus;
use contracts::domain::common::AggregateRoot;
use std::sync::Arc;
use tokio::task::JoinSet;

use super::repository;
use crate::shared::logger;

/// Внешнее хранилище заказов
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Полная замена записи заказа
    async fn update_order(&self, order: &Order) -> anyhow::Result<()>;

    /// Сохранение статуса и сообщения поставщику
    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: &OrderStatus,
        message: &str,
    ) -> anyhow::Result<()>;
}

/// Хранилище на основе репозитория SQLite
pub struct RepositoryOrderGateway;

#[async_trait]
impl OrderGateway for RepositoryOrderGateway {
    async fn update_order(&self, order: &Order) -> anyhow::Result<()> {
        if !repository::update(order).await? {
            anyhow::bail!("Order {} not found", order.base.id);
        }
        Ok(())
    }

    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: &OrderStatus,
        message: &str,
    ) -> anyhow::Result<()> {
        if !repository::update_status(order_id.value(), status, message).await? {
            anyhow::bail!("Order {} not found", order_id);
        }
        Ok(())
    }
}

/// Итог ожидания фоновых задач
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SettleReport {
    pub succeeded: usize,
    pub failed: usize,
}

pub struct OrderStatusSync<G: OrderGateway + 'static> {
    gateway: Arc<G>,
    in_flight: JoinSet<bool>,
}

impl<G: OrderGateway + 'static> OrderStatusSync<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            in_flight: JoinSet::new(),
        }
    }

    /// Число ещё не завершённых вызовов
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Запустить команды плана, не дожидаясь результата.
    ///
    /// Порядок между командами и между планами не гарантируется.
    pub fn dispatch(&mut self, plan: PersistPlan) {
        for command in plan.commands {
            let gateway = Arc::clone(&self.gateway);
            self.in_flight.spawn(async move { execute(gateway.as_ref(), command).await });
        }
    }

    /// Дождаться всех запущенных вызовов. Ошибки уже залогированы и
    /// вызывающему не возвращаются.
    pub async fn settle(&mut self) -> SettleReport {
        let mut report = SettleReport::default();
        while let Some(joined) = self.in_flight.join_next().await {
            match joined {
                Ok(true) => report.succeeded += 1,
                Ok(false) => report.failed += 1,
                Err(e) => {
                    tracing::warn!("Order persistence task did not complete: {}", e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}

impl<G: OrderGateway + 'static> Drop for OrderStatusSync<G> {
    fn drop(&mut self) {
        if self.pending() > 0 {
            tracing::debug!(
                "Aborting {} in-flight order persistence call(s)",
                self.pending()
            );
        }
        self.in_flight.abort_all();
    }
}

async fn execute<G: OrderGateway + ?Sized>(gateway: &G, command: PersistCommand) -> bool {
    let (label, order_id, result) = match command {
        PersistCommand::UpdateOrder(order) => {
            let id = order.base.id;
            ("update_order", id, gateway.update_order(&order).await)
        }
        PersistCommand::UpdateOrderStatus {
            order_id,
            status,
            message,
        } => (
            "update_order_status",
            order_id,
            gateway
                .update_order_status(order_id, &status, &message)
                .await,
        ),
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("{} failed for order {}: {:#}", label, order_id, e);
            logger::log(
                &Order::full_name(),
                &format!("{} failed for order {}: {}", label, order_id, e),
            );
            false
        }
    }
}
