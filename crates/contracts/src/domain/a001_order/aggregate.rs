use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::OrderStatus;
use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор заказа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for OrderId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(OrderId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Lines
// ============================================================================

/// Позиция заказа
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderArticle {
    /// Артикул
    #[serde(default)]
    pub reference: String,
    /// Наименование товара
    pub designation: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    /// Позиция собрана
    #[serde(default)]
    pub completed: bool,
}

fn default_quantity() -> f64 {
    1.0
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Заказ клиента (commande)
///
/// `base.code` хранит номер заказа (`commandeid`), `base.description` дублирует
/// отображаемое название.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(flatten)]
    pub base: BaseAggregate<OrderId>,

    #[serde(rename = "clientname")]
    pub client_name: String,

    #[serde(rename = "titre_affichage")]
    pub display_title: String,

    pub articles: Vec<OrderArticle>,

    #[serde(rename = "termine", default)]
    pub status: OrderStatus,

    #[serde(rename = "messagefournisseur", default)]
    pub supplier_message: String,

    #[serde(rename = "clientEmail", default)]
    pub client_email: Option<String>,

    #[serde(rename = "clientPhone", default)]
    pub client_phone: Option<String>,
}

impl Order {
    /// Создать новый заказ для вставки в БД
    pub fn new_for_insert(
        commande_id: String,
        client_name: String,
        display_title: String,
        articles: Vec<OrderArticle>,
        client_email: Option<String>,
        client_phone: Option<String>,
    ) -> Self {
        let base = BaseAggregate::new(OrderId::new_v4(), commande_id, display_title.clone());
        let status = OrderStatus::derive(&articles);

        Self {
            base,
            client_name,
            display_title,
            articles,
            status,
            supplier_message: String::new(),
            client_email,
            client_phone,
        }
    }

    /// Номер заказа (`commandeid`)
    pub fn commande_id(&self) -> &str {
        &self.base.code
    }

    /// Получить ID как строку
    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn touch_updated(&mut self) {
        self.base.touch();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.code.trim().is_empty() {
            return Err("Номер заказа не может быть пустым".into());
        }
        if self.client_name.trim().is_empty() {
            return Err("Имя клиента обязательно".into());
        }
        if self.display_title.trim().is_empty() {
            return Err("Название заказа обязательно".into());
        }
        if let Some(article) = self
            .articles
            .iter()
            .find(|a| a.designation.trim().is_empty())
        {
            return Err(format!(
                "Позиция без наименования (артикул '{}')",
                article.reference
            ));
        }
        if self.articles.iter().any(|a| a.quantity <= 0.0) {
            return Err("Количество в позиции должно быть больше нуля".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.touch_updated();
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "order"
    }

    fn element_name() -> &'static str {
        "Commande"
    }

    fn list_name() -> &'static str {
        "Commandes"
    }
}

// ============================================================================
// DTOs
// ============================================================================

/// DTO оформления заказа
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderDto {
    #[serde(rename = "commandeid", default)]
    pub commande_id: Option<String>,
    #[serde(rename = "clientname")]
    pub client_name: String,
    #[serde(rename = "titre_affichage")]
    pub display_title: String,
    #[serde(default)]
    pub articles: Vec<OrderArticle>,
    #[serde(rename = "clientEmail", default)]
    pub client_email: Option<String>,
    #[serde(rename = "clientPhone", default)]
    pub client_phone: Option<String>,
}

/// Заказ в ответах API, поля под именами клиентского приложения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub id: String,
    #[serde(rename = "commandeid")]
    pub commande_id: String,
    #[serde(rename = "clientname")]
    pub client_name: String,
    #[serde(rename = "titre_affichage")]
    pub display_title: String,
    pub articles: Vec<OrderArticle>,
    #[serde(rename = "termine")]
    pub status: OrderStatus,
    #[serde(rename = "messagefournisseur")]
    pub supplier_message: String,
    #[serde(rename = "clientEmail")]
    pub client_email: Option<String>,
    #[serde(rename = "clientPhone")]
    pub client_phone: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.to_string_id(),
            commande_id: order.commande_id().to_string(),
            client_name: order.client_name.clone(),
            display_title: order.display_title.clone(),
            articles: order.articles.clone(),
            status: order.status.clone(),
            supplier_message: order.supplier_message.clone(),
            client_email: order.client_email.clone(),
            client_phone: order.client_phone.clone(),
            created_at: order.base.metadata.created_at,
            updated_at: order.base.metadata.updated_at,
        }
    }
}

/// Ручная установка статуса администратором
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetStatusRequest {
    #[serde(rename = "termine")]
    pub status: OrderStatus,
}

/// Сохранение сообщения поставщику
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMessageRequest {
    #[serde(rename = "messagefournisseur")]
    pub message: String,
}

/// Удаление заказа требует явного подтверждения
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeleteOrderRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Order {
        Order::new_for_insert(
            "CMD-001".into(),
            "Plomberie Martin".into(),
            "Chantier rue des Lilas".into(),
            vec![OrderArticle {
                reference: "CU-22".into(),
                designation: "Tube cuivre 22mm".into(),
                quantity: 4.0,
                completed: false,
            }],
            None,
            None,
        )
    }

    #[test]
    fn test_new_order_derives_initial_status() {
        let order = sample();
        assert_eq!(order.status, OrderStatus::NotStarted);
        assert_eq!(order.commande_id(), "CMD-001");
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_client() {
        let mut order = sample();
        order.client_name = "  ".into();
        assert!(order.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let mut order = sample();
        order.articles[0].quantity = 0.0;
        assert!(order.validate().is_err());
    }

    #[test]
    fn test_wire_field_names() {
        let order = sample();
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["code"], "CMD-001");
        assert_eq!(value["clientname"], "Plomberie Martin");
        assert_eq!(value["titre_affichage"], "Chantier rue des Lilas");
        assert_eq!(value["termine"], "Non");
        assert_eq!(value["messagefournisseur"], "");
        assert_eq!(value["articles"][0]["completed"], false);
    }

    #[test]
    fn test_view_uses_commandeid() {
        let order = sample();
        let value = serde_json::to_value(OrderView::from(&order)).unwrap();
        assert_eq!(value["commandeid"], "CMD-001");
        assert_eq!(value["id"], order.to_string_id());
        assert_eq!(value["termine"], "Non");
    }

    #[test]
    fn test_article_completed_defaults_to_false() {
        let article: OrderArticle =
            serde_json::from_str(r#"{"designation": "Coude 90°"}"#).unwrap();
        assert!(!article.completed);
        assert_eq!(article.quantity, 1.0);
    }
}
