use anyhow::Context;
use chrono::Utc;
use contracts::domain::a001_order::aggregate::{Order, OrderArticle, OrderId};
use contracts::domain::a001_order::status::OrderStatus;
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub client_name: String,
    pub display_title: String,
    pub articles_json: String,
    pub status: String,
    pub supplier_message: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Order {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id)
            .with_context(|| format!("Invalid order id '{}'", m.id))?;
        let articles: Vec<OrderArticle> = serde_json::from_str(&m.articles_json)
            .with_context(|| format!("Failed to deserialize articles_json for order {}", m.code))?;

        Ok(Order {
            base: BaseAggregate::with_metadata(
                OrderId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            client_name: m.client_name,
            display_title: m.display_title,
            articles,
            status: OrderStatus::from(m.status),
            supplier_message: m.supplier_message,
            client_email: m.client_email,
            client_phone: m.client_phone,
        })
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn into_orders(models: Vec<Model>) -> anyhow::Result<Vec<Order>> {
    models.into_iter().map(Order::try_from).collect()
}

/// Все неудалённые заказы, новые сверху
pub async fn list_all() -> anyhow::Result<Vec<Order>> {
    let models = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?;
    into_orders(models)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Order>> {
    let model = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    model.map(Order::try_from).transpose()
}

pub async fn get_by_code(code: &str) -> anyhow::Result<Option<Order>> {
    let model = Entity::find()
        .filter(Column::Code.eq(code))
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    model.map(Order::try_from).transpose()
}

pub async fn insert(order: &Order) -> anyhow::Result<Uuid> {
    let uuid = order.base.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        code: Set(order.base.code.clone()),
        description: Set(order.base.description.clone()),
        comment: Set(order.base.comment.clone()),
        client_name: Set(order.client_name.clone()),
        display_title: Set(order.display_title.clone()),
        articles_json: Set(serde_json::to_string(&order.articles)?),
        status: Set(order.status.as_str().to_string()),
        supplier_message: Set(order.supplier_message.clone()),
        client_email: Set(order.client_email.clone()),
        client_phone: Set(order.client_phone.clone()),
        is_deleted: Set(false),
        created_at: Set(Some(order.base.metadata.created_at)),
        updated_at: Set(Some(order.base.metadata.updated_at)),
        version: Set(1),
    };
    active.insert(conn()).await?;
    Ok(uuid)
}

/// Полная замена записи заказа. Идемпотентна: повтор с теми же данными
/// даёт ту же запись (кроме `updated_at`/`version`).
pub async fn update(order: &Order) -> anyhow::Result<bool> {
    let result = Entity::update_many()
        .col_expr(Column::Description, Expr::value(order.base.description.clone()))
        .col_expr(Column::Comment, Expr::value(order.base.comment.clone()))
        .col_expr(
            Column::ArticlesJson,
            Expr::value(serde_json::to_string(&order.articles)?),
        )
        .col_expr(Column::Status, Expr::value(order.status.as_str().to_string()))
        .col_expr(
            Column::SupplierMessage,
            Expr::value(order.supplier_message.clone()),
        )
        .col_expr(Column::ClientEmail, Expr::value(order.client_email.clone()))
        .col_expr(Column::ClientPhone, Expr::value(order.client_phone.clone()))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .col_expr(Column::Version, Expr::col(Column::Version).add(1))
        .filter(Column::Id.eq(order.base.id.value().to_string()))
        .filter(Column::IsDeleted.eq(false))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}

/// Сохранить статус и сообщение поставщику
pub async fn update_status(id: Uuid, status: &OrderStatus, message: &str) -> anyhow::Result<bool> {
    let result = Entity::update_many()
        .col_expr(Column::Status, Expr::value(status.as_str().to_string()))
        .col_expr(Column::SupplierMessage, Expr::value(message.to_string()))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .col_expr(Column::Version, Expr::col(Column::Version).add(1))
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn soft_delete(id: Uuid) -> anyhow::Result<bool> {
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}
