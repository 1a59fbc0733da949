// Library exports for the dictionary lookup service

pub mod core;
pub mod middleware;
pub mod server;
pub mod services;
pub mod utils;

// Re-export commonly used types and functions
pub use crate::core::{
    config::Config,
    errors::{ConfigError, LookupError, StoreError, ValidationError},
    types::{DictionaryResult, Language, LanguagePair},
};

pub use middleware::SingleFlight;

pub use server::{router, AppState};

pub use services::{
    list_source_languages, list_target_languages, validate_word, ApiClient, DictionaryApi,
    DictionaryGateway, FileStore, KeyValueStore, MemoryStore,
};

pub use utils::Metrics;
