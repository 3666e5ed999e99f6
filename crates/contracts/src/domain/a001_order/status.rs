use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::aggregate::OrderArticle;

pub const STATUS_NOT_STARTED: &str = "Non";
pub const STATUS_IN_PROGRESS: &str = "En cours";
pub const STATUS_COMPLETED: &str = "Oui";

/// Статус выполнения заказа (поле `termine`)
///
/// Три вычисляемых значения плюс произвольный текст, который администратор
/// может выставить вручную. В JSON и в БД хранится как обычная строка.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    /// Ни одна позиция не собрана
    #[default]
    NotStarted,
    /// Часть позиций собрана
    InProgress,
    /// Все позиции собраны
    Completed,
    /// Ручное значение администратора
    Custom(String),
}

impl OrderStatus {
    /// Вычислить статус по состоянию позиций заказа.
    ///
    /// Пустой список всегда даёт `Non`: проверка стоит первой и не зависит
    /// от того, что `all` на пустой последовательности истинно.
    pub fn derive(articles: &[OrderArticle]) -> Self {
        if articles.is_empty() {
            return OrderStatus::NotStarted;
        }
        if articles.iter().all(|a| a.completed) {
            OrderStatus::Completed
        } else if articles.iter().any(|a| a.completed) {
            OrderStatus::InProgress
        } else {
            OrderStatus::NotStarted
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::NotStarted => STATUS_NOT_STARTED,
            OrderStatus::InProgress => STATUS_IN_PROGRESS,
            OrderStatus::Completed => STATUS_COMPLETED,
            OrderStatus::Custom(text) => text,
        }
    }

    /// Значение введено вручную и не входит в три стандартных
    pub fn is_custom(&self) -> bool {
        matches!(self, OrderStatus::Custom(_))
    }

    /// Заказ готов к выдаче клиенту
    pub fn is_ready(&self) -> bool {
        matches!(self, OrderStatus::Completed)
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        match value {
            STATUS_NOT_STARTED => OrderStatus::NotStarted,
            STATUS_IN_PROGRESS => OrderStatus::InProgress,
            STATUS_COMPLETED => OrderStatus::Completed,
            other => OrderStatus::Custom(other.to_string()),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        OrderStatus::from(value.as_str())
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(OrderStatus::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn articles(flags: &[bool]) -> Vec<OrderArticle> {
        flags
            .iter()
            .enumerate()
            .map(|(i, &completed)| OrderArticle {
                reference: format!("REF-{}", i),
                designation: format!("Raccord {}", i),
                quantity: 1.0,
                completed,
            })
            .collect()
    }

    #[test]
    fn test_all_completed_is_oui() {
        for n in 1..6 {
            let list = articles(&vec![true; n]);
            assert_eq!(OrderStatus::derive(&list), OrderStatus::Completed);
        }
    }

    #[test]
    fn test_none_completed_is_non() {
        for n in 1..6 {
            let list = articles(&vec![false; n]);
            assert_eq!(OrderStatus::derive(&list), OrderStatus::NotStarted);
        }
    }

    #[test]
    fn test_mixed_is_en_cours() {
        let cases: [&[bool]; 4] = [
            &[true, false],
            &[false, true],
            &[true, true, false],
            &[false, false, false, true],
        ];
        for flags in cases {
            assert_eq!(
                OrderStatus::derive(&articles(flags)),
                OrderStatus::InProgress,
                "flags: {:?}",
                flags
            );
        }
    }

    #[test]
    fn test_empty_articles_is_non() {
        assert_eq!(OrderStatus::derive(&[]), OrderStatus::NotStarted);
    }

    #[test]
    fn test_string_mapping() {
        assert_eq!(OrderStatus::from("Non"), OrderStatus::NotStarted);
        assert_eq!(OrderStatus::from("En cours"), OrderStatus::InProgress);
        assert_eq!(OrderStatus::from("Oui"), OrderStatus::Completed);
        assert_eq!(
            OrderStatus::from("Attente fournisseur"),
            OrderStatus::Custom("Attente fournisseur".into())
        );
        assert_eq!(OrderStatus::InProgress.to_string(), "En cours");
    }

    #[test]
    fn test_serde_as_plain_string() {
        let json = serde_json::to_string(&OrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"En cours\"");

        let custom: OrderStatus = serde_json::from_str("\"Livré partiel\"").unwrap();
        assert_eq!(custom, OrderStatus::Custom("Livré partiel".into()));
        assert!(custom.is_custom());
    }
}
