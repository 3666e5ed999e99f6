//! Локальное редактируемое состояние заказа.
//!
//! `OrderEditor` меняет состояние синхронно и безусловно, а для каждой
//! операции возвращает `PersistPlan` — список команд, которые слой
//! сохранения должен передать во внешнее хранилище. Исполнение плана
//! (и его ошибки) на локальное состояние не влияют.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::aggregate::{Order, OrderArticle, OrderId};
use super::status::OrderStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("Article index {index} out of range (order has {len} articles)")]
    ArticleIndexOutOfRange { index: usize, len: usize },
}

/// Команда сохранения для внешнего хранилища
#[derive(Debug, Clone)]
pub enum PersistCommand {
    /// Полная замена записи заказа
    UpdateOrder(Order),
    /// Сохранение статуса и сообщения поставщику
    UpdateOrderStatus {
        order_id: OrderId,
        status: OrderStatus,
        message: String,
    },
}

/// Набор команд, порождённых одной операцией редактора
#[derive(Debug, Clone, Default)]
pub struct PersistPlan {
    pub commands: Vec<PersistCommand>,
}

impl PersistPlan {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

/// Снимок состояния редактора для UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEditorState {
    pub id: String,
    #[serde(rename = "commandeid")]
    pub commande_id: String,
    pub articles: Vec<OrderArticle>,
    #[serde(rename = "termine")]
    pub status: OrderStatus,
    #[serde(rename = "messagefournisseur")]
    pub message_text: String,
}

#[derive(Debug, Clone)]
pub struct OrderEditor {
    order: Order,
    message_text: String,
}

impl OrderEditor {
    /// Загрузить заказ в локальное состояние; буфер сообщения
    /// инициализируется сохранённым сообщением поставщику.
    pub fn new(order: Order) -> Self {
        let message_text = order.supplier_message.clone();
        Self {
            order,
            message_text,
        }
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn articles(&self) -> &[OrderArticle] {
        &self.order.articles
    }

    pub fn status(&self) -> &OrderStatus {
        &self.order.status
    }

    pub fn message_text(&self) -> &str {
        &self.message_text
    }

    pub fn snapshot(&self) -> OrderEditorState {
        OrderEditorState {
            id: self.order.to_string_id(),
            commande_id: self.order.commande_id().to_string(),
            articles: self.order.articles.clone(),
            status: self.order.status.clone(),
            message_text: self.message_text.clone(),
        }
    }

    /// Переключить флаг собранности позиции и пересчитать статус.
    ///
    /// Вне диапазона индексов состояние не меняется и план не создаётся.
    pub fn toggle_article_completion(&mut self, index: usize) -> Result<PersistPlan, EditorError> {
        let len = self.order.articles.len();
        let article = self
            .order
            .articles
            .get_mut(index)
            .ok_or(EditorError::ArticleIndexOutOfRange { index, len })?;
        article.completed = !article.completed;

        self.order.status = OrderStatus::derive(&self.order.articles);
        Ok(self.full_plan())
    }

    /// Выставить статус вручную, минуя вычисление. Значение живёт до
    /// следующего переключения позиции.
    pub fn set_manual_status(&mut self, status: OrderStatus) -> PersistPlan {
        self.order.status = status;
        self.full_plan()
    }

    /// Изменить только локальный буфер сообщения
    pub fn set_message(&mut self, text: impl Into<String>) {
        self.message_text = text.into();
    }

    /// Сохранить буфер сообщения вместе с текущим статусом
    pub fn save_message(&mut self) -> PersistPlan {
        self.full_plan()
    }

    /// Обе команды плана несут одно и то же сообщение (текущий буфер),
    /// поэтому порядок их исполнения на результат не влияет.
    fn full_plan(&mut self) -> PersistPlan {
        self.order.supplier_message = self.message_text.clone();
        PersistPlan {
            commands: vec![
                PersistCommand::UpdateOrder(self.order.clone()),
                PersistCommand::UpdateOrderStatus {
                    order_id: self.order.base.id,
                    status: self.order.status.clone(),
                    message: self.message_text.clone(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_with(flags: &[bool]) -> Order {
        let articles = flags
            .iter()
            .enumerate()
            .map(|(i, &completed)| OrderArticle {
                reference: format!("PVC-{}", i),
                designation: format!("Manchon PVC {}", i),
                quantity: 2.0,
                completed,
            })
            .collect();
        let mut order = Order::new_for_insert(
            "CMD-042".into(),
            "SARL Dupont".into(),
            "Rénovation salle de bain".into(),
            articles,
            None,
            None,
        );
        order.supplier_message = "Livraison mardi".into();
        order
    }

    fn flags(editor: &OrderEditor) -> Vec<bool> {
        editor.articles().iter().map(|a| a.completed).collect()
    }

    fn status_command(plan: &PersistPlan) -> (OrderStatus, String) {
        plan.commands
            .iter()
            .find_map(|c| match c {
                PersistCommand::UpdateOrderStatus {
                    status, message, ..
                } => Some((status.clone(), message.clone())),
                _ => None,
            })
            .expect("plan has a status command")
    }

    fn order_command(plan: &PersistPlan) -> Order {
        plan.commands
            .iter()
            .find_map(|c| match c {
                PersistCommand::UpdateOrder(order) => Some(order.clone()),
                _ => None,
            })
            .expect("plan has an order command")
    }

    #[test]
    fn test_toggle_scenario() {
        let mut editor = OrderEditor::new(order_with(&[false, false]));

        editor.toggle_article_completion(0).unwrap();
        assert_eq!(editor.status(), &OrderStatus::InProgress);

        editor.toggle_article_completion(1).unwrap();
        assert_eq!(editor.status(), &OrderStatus::Completed);

        editor.toggle_article_completion(0).unwrap();
        assert_eq!(editor.status(), &OrderStatus::InProgress);
    }

    #[test]
    fn test_double_toggle_restores_state() {
        for initial in [&[false, false][..], &[true, false][..], &[true, true, true][..]] {
            let mut editor = OrderEditor::new(order_with(initial));
            let status_before = OrderStatus::derive(editor.articles());
            assert_eq!(editor.status(), &status_before);

            for index in 0..initial.len() {
                editor.toggle_article_completion(index).unwrap();
                editor.toggle_article_completion(index).unwrap();
                assert_eq!(flags(&editor), initial.to_vec());
                assert_eq!(editor.status(), &status_before);
            }
        }
    }

    #[test]
    fn test_toggle_emits_both_commands() {
        let mut editor = OrderEditor::new(order_with(&[false, true]));
        let plan = editor.toggle_article_completion(0).unwrap();

        assert_eq!(plan.len(), 2);
        match &plan.commands[0] {
            PersistCommand::UpdateOrder(order) => {
                assert!(order.articles.iter().all(|a| a.completed));
                assert_eq!(order.status, OrderStatus::Completed);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        let (status, message) = status_command(&plan);
        assert_eq!(status, OrderStatus::Completed);
        assert_eq!(message, "Livraison mardi");
    }

    #[test]
    fn test_out_of_range_toggle_is_rejected() {
        let mut editor = OrderEditor::new(order_with(&[false]));
        let err = editor.toggle_article_completion(3).unwrap_err();
        assert_eq!(err, EditorError::ArticleIndexOutOfRange { index: 3, len: 1 });
        assert_eq!(flags(&editor), vec![false]);
        assert_eq!(editor.status(), &OrderStatus::NotStarted);
    }

    #[test]
    fn test_toggle_on_empty_order_is_rejected() {
        let mut editor = OrderEditor::new(order_with(&[]));
        assert!(editor.toggle_article_completion(0).is_err());
        assert_eq!(editor.status(), &OrderStatus::NotStarted);
    }

    #[test]
    fn test_manual_status_lasts_until_next_toggle() {
        let mut editor = OrderEditor::new(order_with(&[true, false]));
        let custom = OrderStatus::Custom("Attente fournisseur".into());

        let plan = editor.set_manual_status(custom.clone());
        assert_eq!(status_command(&plan).0, custom);
        assert_eq!(editor.status(), &custom);

        editor.set_message("Rappeler le client");
        editor.save_message();
        assert_eq!(editor.status(), &custom);

        editor.toggle_article_completion(1).unwrap();
        assert_eq!(editor.status(), &OrderStatus::Completed);
    }

    #[test]
    fn test_set_message_is_local_until_saved() {
        let mut editor = OrderEditor::new(order_with(&[false]));
        editor.set_message("Manque 2 coudes");

        assert_eq!(editor.message_text(), "Manque 2 coudes");
        assert_eq!(editor.order().supplier_message, "Livraison mardi");

        let plan = editor.save_message();
        assert_eq!(editor.order().supplier_message, "Manque 2 coudes");
        let (status, message) = status_command(&plan);
        assert_eq!(status, OrderStatus::NotStarted);
        assert_eq!(message, "Manque 2 coudes");
    }

    #[test]
    fn test_toggle_sends_unsaved_message_buffer() {
        let mut editor = OrderEditor::new(order_with(&[false]));
        editor.set_message("Brouillon");
        let plan = editor.toggle_article_completion(0).unwrap();
        assert_eq!(status_command(&plan).1, "Brouillon");
        assert_eq!(order_command(&plan).supplier_message, "Brouillon");
        assert_eq!(editor.order().supplier_message, "Brouillon");
    }

    #[test]
    fn test_every_plan_carries_one_message() {
        let mut editor = OrderEditor::new(order_with(&[false, false]));
        editor.set_message("Relancer le grossiste");

        let plans = vec![
            editor.toggle_article_completion(0).unwrap(),
            editor.set_manual_status(OrderStatus::Custom("En attente".into())),
            editor.save_message(),
        ];
        for plan in &plans {
            let (status, message) = status_command(plan);
            let order = order_command(plan);
            assert_eq!(order.supplier_message, message);
            assert_eq!(order.status, status);
            assert_eq!(message, "Relancer le grossiste");
        }
    }

    #[test]
    fn test_snapshot_uses_wire_names() {
        let editor = OrderEditor::new(order_with(&[true]));
        let value = serde_json::to_value(editor.snapshot()).unwrap();
        assert_eq!(value["commandeid"], "CMD-042");
        assert_eq!(value["termine"], "Oui");
        assert_eq!(value["messagefournisseur"], "Livraison mardi");
    }
}
