//! Общие типы фронтенда и бэкенда: агрегаты, DTO и чистая доменная логика.

pub mod domain;
pub mod shared;
