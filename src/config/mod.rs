use config::{ConfigError, Environment};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::models::SeatTypeFilter;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub store: StoreConfig,
    pub allocation: AllocationConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub rust_log: String,
}

// Настройки хранилища схемы зала
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
    // сохранять файл после каждого изменения
    pub autosave: bool,
}

// Параметры подбора по умолчанию
#[derive(Debug, Clone, Deserialize)]
pub struct AllocationConfig {
    pub group_size: usize,
    pub seat_type: SeatTypeFilter,
}

impl Config {
    /// Читает настройки из переменных `SEATING__<СЕКЦИЯ>__<КЛЮЧ>`,
    /// например `SEATING__STORE__PATH`. `RUST_LOG` перекрывает `app.rust_log`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(Environment::with_prefix("SEATING"), env::var("RUST_LOG").ok())
    }

    fn from_source(source: Environment, rust_log: Option<String>) -> Result<Self, ConfigError> {
        config::Config::builder()
            .set_default("app.environment", "development")?
            .set_default("app.rust_log", "cinema_seating=debug")?
            .set_default("store.path", "data/seating.json")?
            .set_default("store.autosave", true)?
            .set_default("allocation.group_size", 2)?
            .set_default("allocation.seat_type", "any")?
            .add_source(source.separator("__").try_parsing(true))
            .set_override_option("app.rust_log", rust_log)?
            .build()?
            .try_deserialize()
    }
}
