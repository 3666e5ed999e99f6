use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор товара каталога
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub Uuid);

impl ProductId {
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

impl AggregateId for ProductId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ProductId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Товар каталога сантехники
///
/// `base.code` — артикул, `base.description` — наименование.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(flatten)]
    pub base: BaseAggregate<ProductId>,

    pub category: String,
    pub subcategory: Option<String>,
    /// Единица измерения ("pièce", "m", "lot")
    pub unit: String,
    pub price: Option<f64>,
    #[serde(rename = "stockQuantity")]
    pub stock_quantity: f64,
}

impl Product {
    pub fn new_for_insert(
        code: String,
        description: String,
        category: String,
        subcategory: Option<String>,
        unit: String,
        price: Option<f64>,
        stock_quantity: f64,
    ) -> Self {
        Self {
            base: BaseAggregate::new(ProductId::new_v4(), code, description),
            category,
            subcategory,
            unit,
            price,
            stock_quantity,
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Обновить данные из DTO
    pub fn update(&mut self, dto: &ProductDto) {
        if let Some(code) = dto.code.as_ref() {
            self.base.code = code.clone();
        }
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.category = dto.category.clone();
        self.subcategory = normalize_subcategory(dto.subcategory.clone());
        self.unit = dto.unit.clone();
        self.price = dto.price;
        self.stock_quantity = dto.stock_quantity;
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock_quantity > 0.0
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.code.trim().is_empty() {
            return Err("Артикул не может быть пустым".into());
        }
        if self.base.description.trim().is_empty() {
            return Err("Наименование не может быть пустым".into());
        }
        if self.category.trim().is_empty() {
            return Err("Категория обязательна".into());
        }
        if self.price.is_some_and(|p| p < 0.0) {
            return Err("Цена не может быть отрицательной".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

/// Пустая подкатегория эквивалентна её отсутствию
pub fn normalize_subcategory(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl AggregateRoot for Product {
    type Id = ProductId;

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
        "a002"
    }

    fn collection_name() -> &'static str {
        "product"
    }

    fn element_name() -> &'static str {
        "Produit"
    }

    fn list_name() -> &'static str {
        "Catalogue"
    }
}

// ============================================================================
// DTO
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProductDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub comment: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub unit: String,
    pub price: Option<f64>,
    #[serde(rename = "stockQuantity", default)]
    pub stock_quantity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_normalizes_blank_subcategory() {
        let mut product = Product::new_for_insert(
            "VAN-15".into(),
            "Vanne 1/4 tour 15mm".into(),
            "Robinetterie".into(),
            Some("Vannes".into()),
            "pièce".into(),
            Some(8.5),
            12.0,
        );
        let dto = ProductDto {
            description: "Vanne 1/4 tour 15mm laiton".into(),
            category: "Robinetterie".into(),
            subcategory: Some("   ".into()),
            unit: "pièce".into(),
            stock_quantity: 0.0,
            ..Default::default()
        };
        product.update(&dto);

        assert_eq!(product.base.code, "VAN-15");
        assert_eq!(product.subcategory, None);
        assert!(!product.is_in_stock());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let product = Product::new_for_insert(
            "X".into(),
            "Joint".into(),
            "Joints".into(),
            None,
            "lot".into(),
            Some(-1.0),
            1.0,
        );
        assert!(product.validate().is_err());
    }
}
