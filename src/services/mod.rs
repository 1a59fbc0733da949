pub mod catalog;
pub mod dictionary;
pub mod validation;

// Re-export commonly used services
pub use catalog::{list_source_languages, list_target_languages, pairs_from_codes};
pub use dictionary::{ApiClient, DictionaryApi, DictionaryGateway, FileStore, KeyValueStore, MemoryStore};
pub use validation::validate_word;
