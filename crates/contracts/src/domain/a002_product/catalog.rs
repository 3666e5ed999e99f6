use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::aggregate::Product;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Подкатегория с числом товаров
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryNode {
    pub name: String,
    #[serde(rename = "productCount")]
    pub product_count: usize,
}

/// Категория каталога с подкатегориями
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub name: String,
    /// Все товары категории, включая товары без подкатегории
    #[serde(rename = "productCount")]
    pub product_count: usize,
    pub subcategories: Vec<SubcategoryNode>,
}

/// Сгруппировать товары в дерево категория → подкатегория.
///
/// Сортировка по имени без учёта регистра; категории, различающиеся только
/// регистром или пробелами по краям, сливаются в одну (имя берётся у первого
/// встреченного товара).
pub fn build_category_hierarchy(products: &[Product]) -> Vec<CategoryNode> {
    let mut categories: BTreeMap<String, (String, usize, BTreeMap<String, (String, usize)>)> =
        BTreeMap::new();

    for product in products {
        let name = product.category.trim();
        if name.is_empty() {
            continue;
        }
        let entry = categories
            .entry(name.to_lowercase())
            .or_insert_with(|| (name.to_string(), 0, BTreeMap::new()));
        entry.1 += 1;

        if let Some(sub) = product.subcategory.as_deref().map(str::trim) {
            if !sub.is_empty() {
                let sub_entry = entry
                    .2
                    .entry(sub.to_lowercase())
                    .or_insert_with(|| (sub.to_string(), 0));
                sub_entry.1 += 1;
            }
        }
    }

    categories
        .into_values()
        .map(|(name, product_count, subs)| CategoryNode {
            name,
            product_count,
            subcategories: subs
                .into_values()
                .map(|(name, product_count)| SubcategoryNode {
                    name,
                    product_count,
                })
                .collect(),
        })
        .collect()
}

/// Фильтр каталога по категории/подкатегории и строке поиска
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub search: Option<String>,
}

impl CatalogFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = non_blank(&self.category) {
            if product.category.trim().to_lowercase() != category.to_lowercase() {
                return false;
            }
        }
        if let Some(subcategory) = non_blank(&self.subcategory) {
            let matches_sub = product
                .subcategory
                .as_deref()
                .is_some_and(|s| s.trim().to_lowercase() == subcategory.to_lowercase());
            if !matches_sub {
                return false;
            }
        }
        if let Some(search) = non_blank(&self.search) {
            let needle = search.to_lowercase();
            let haystack = format!("{} {}", product.base.code, product.base.description);
            if !haystack.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Страница результатов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Номер страницы, начиная с 1
    pub page: usize,
    #[serde(rename = "pageSize")]
    pub page_size: usize,
    #[serde(rename = "totalItems")]
    pub total_items: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Разбить список на страницы.
///
/// `page_size` ограничен диапазоном `1..=MAX_PAGE_SIZE` (0 → значение по
/// умолчанию), номер страницы приводится к `1..=total_pages`. Пустой список
/// даёт одну пустую страницу.
pub fn paginate<T>(items: Vec<T>, page: Option<usize>, page_size: Option<usize>) -> Page<T> {
    let page_size = match page_size {
        None | Some(0) => DEFAULT_PAGE_SIZE,
        Some(size) => size.min(MAX_PAGE_SIZE),
    };
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.unwrap_or(1).clamp(1, total_pages);

    let items = items
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    Page {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(code: &str, category: &str, subcategory: Option<&str>) -> Product {
        Product::new_for_insert(
            code.into(),
            format!("Produit {}", code),
            category.into(),
            subcategory.map(Into::into),
            "pièce".into(),
            None,
            1.0,
        )
    }

    #[test]
    fn test_hierarchy_groups_and_sorts() {
        let products = vec![
            product("1", "Robinetterie", Some("Vannes")),
            product("2", "Évacuation", Some("PVC")),
            product("3", "robinetterie ", Some("mitigeurs")),
            product("4", "Robinetterie", Some("Vannes")),
            product("5", "Chauffage", None),
            product("6", "  ", Some("Orphelin")),
        ];

        let tree = build_category_hierarchy(&products);
        let names: Vec<_> = tree.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Chauffage", "Robinetterie", "Évacuation"]);

        let robinetterie = &tree[1];
        assert_eq!(robinetterie.product_count, 3);
        assert_eq!(
            robinetterie.subcategories,
            vec![
                SubcategoryNode {
                    name: "mitigeurs".into(),
                    product_count: 1
                },
                SubcategoryNode {
                    name: "Vannes".into(),
                    product_count: 2
                },
            ]
        );

        assert_eq!(tree[0].product_count, 1);
        assert!(tree[0].subcategories.is_empty());
    }

    #[test]
    fn test_filter_by_category_and_search() {
        let products = vec![
            product("CU-22", "Cuivre", Some("Tubes")),
            product("CU-COUDE", "Cuivre", Some("Raccords")),
            product("PVC-32", "Évacuation", None),
        ];

        let filter = CatalogFilter {
            category: Some("cuivre".into()),
            subcategory: None,
            search: Some("coude".into()),
        };
        let found: Vec<_> = products.iter().filter(|p| filter.matches(p)).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].base.code, "CU-COUDE");

        let by_sub = CatalogFilter {
            subcategory: Some("Tubes".into()),
            ..Default::default()
        };
        assert_eq!(products.iter().filter(|p| by_sub.matches(p)).count(), 1);

        let blank = CatalogFilter {
            category: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(products.iter().filter(|p| blank.matches(p)).count(), 3);
    }

    #[test]
    fn test_paginate_middle_and_last_page() {
        let items: Vec<u32> = (1..=45).collect();

        let page = paginate(items.clone(), Some(2), Some(20));
        assert_eq!(page.items, (21..=40).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        assert!(page.has_previous());

        let last = paginate(items, Some(3), Some(20));
        assert_eq!(last.items, (41..=45).collect::<Vec<_>>());
        assert!(!last.has_next());
    }

    #[test]
    fn test_paginate_clamps_out_of_range_values() {
        let items: Vec<u32> = (1..=10).collect();

        let beyond = paginate(items.clone(), Some(99), Some(4));
        assert_eq!(beyond.page, 3);
        assert_eq!(beyond.items, vec![9, 10]);

        let zero = paginate(items.clone(), Some(0), Some(0));
        assert_eq!(zero.page, 1);
        assert_eq!(zero.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(zero.items.len(), 10);

        let huge = paginate(items, None, Some(10_000));
        assert_eq!(huge.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_paginate_empty_list() {
        let page = paginate(Vec::<u32>::new(), Some(5), None);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_items, 0);
        assert!(page.items.is_empty());
    }
}
