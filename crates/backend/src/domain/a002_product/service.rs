use super::repository;
use contracts::domain::a002_product::aggregate::{normalize_subcategory, Product, ProductDto};
use contracts::domain::a002_product::catalog::{
    build_category_hierarchy, paginate, CatalogFilter, CategoryNode, Page,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProductSaveError {
    #[error("Invalid product id")]
    InvalidId,
    #[error("Product not found")]
    NotFound,
    #[error("Product with code {0} already exists")]
    DuplicateCode(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Создание нового товара
pub async fn create(dto: ProductDto) -> Result<Uuid, ProductSaveError> {
    let code = dto
        .code
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| format!("ART-{}", Uuid::new_v4()));

    if repository::get_by_code(&code).await?.is_some() {
        return Err(ProductSaveError::DuplicateCode(code));
    }

    let mut aggregate = Product::new_for_insert(
        code,
        dto.description,
        dto.category,
        normalize_subcategory(dto.subcategory),
        dto.unit,
        dto.price,
        dto.stock_quantity,
    );
    aggregate.base.comment = dto.comment;

    aggregate.validate().map_err(ProductSaveError::Validation)?;
    aggregate.before_write();

    Ok(repository::insert(&aggregate).await?)
}

/// Обновление существующего товара
pub async fn update(dto: ProductDto) -> Result<(), ProductSaveError> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(ProductSaveError::InvalidId)?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or(ProductSaveError::NotFound)?;

    aggregate.update(&dto);

    aggregate.validate().map_err(ProductSaveError::Validation)?;
    aggregate.before_write();

    Ok(repository::update(&aggregate).await?)
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Product>> {
    repository::get_by_id(id).await
}

/// Страница каталога с учётом фильтра
pub async fn list_page(
    filter: &CatalogFilter,
    page: Option<usize>,
    page_size: Option<usize>,
) -> anyhow::Result<Page<Product>> {
    let items: Vec<Product> = repository::list_all()
        .await?
        .into_iter()
        .filter(|p| filter.matches(p))
        .collect();
    Ok(paginate(items, page, page_size))
}

/// Дерево категорий каталога
pub async fn category_hierarchy() -> anyhow::Result<Vec<CategoryNode>> {
    let items = repository::list_all().await?;
    Ok(build_category_hierarchy(&items))
}

/// Вставка тестовых данных
pub async fn insert_test_data() -> anyhow::Result<()> {
    let data = [
        ("CU-T22", "Tube cuivre écroui 22mm (barre 4m)", "Cuivre", Some("Tubes"), "barre", 38.9, 40.0),
        ("CU-C22", "Coude cuivre 90° à souder 22mm", "Cuivre", Some("Raccords"), "pièce", 1.45, 250.0),
        ("PER-16", "Tube PER nu 16mm (couronne 50m)", "Multicouche & PER", Some("Tubes"), "couronne", 41.0, 12.0),
        ("PVC-100", "Tube PVC évacuation 100mm (barre 2m)", "Évacuation", Some("PVC"), "barre", 11.2, 60.0),
        ("VAN-15", "Vanne 1/4 tour laiton 15x21", "Robinetterie", Some("Vannes"), "pièce", 8.5, 80.0),
        ("MIT-LAV", "Mitigeur lavabo chromé", "Robinetterie", Some("Mitigeurs"), "pièce", 54.0, 9.0),
        ("GRP-SEC", "Groupe de sécurité chauffe-eau 3/4", "Chauffe-eau", None, "pièce", 19.9, 25.0),
    ];

    for (code, description, category, subcategory, unit, price, stock) in data {
        if repository::get_by_code(code).await?.is_some() {
            continue;
        }
        create(ProductDto {
            id: None,
            code: Some(code.into()),
            description: description.into(),
            comment: None,
            category: category.into(),
            subcategory: subcategory.map(Into::into),
            unit: unit.into(),
            price: Some(price),
            stock_quantity: stock,
        })
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(id: Option<&str>) -> ProductDto {
        ProductDto {
            id: id.map(Into::into),
            code: Some("VAN-20".into()),
            description: "Vanne 1/4 tour 20x27".into(),
            comment: None,
            category: "Robinetterie".into(),
            subcategory: Some("Vannes".into()),
            unit: "pièce".into(),
            price: Some(9.8),
            stock_quantity: 10.0,
        }
    }

    #[tokio::test]
    async fn test_update_without_valid_id_is_rejected() {
        assert!(matches!(update(dto(None)).await, Err(ProductSaveError::InvalidId)));
        assert!(matches!(
            update(dto(Some("VAN-20"))).await,
            Err(ProductSaveError::InvalidId)
        ));
    }
}
