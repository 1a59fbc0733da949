pub mod config;
pub mod errors;
pub mod languages;
pub mod types;

// Re-export commonly used items for convenience
pub use config::Config;
pub use errors::{ConfigError, LookupError, StoreError, ValidationError};
pub use languages::language_name;
pub use types::{
    pair_code, Definition, DictionaryResult, Example, Language, LanguagePair, Meaning, Synonym,
    Translation,
};
