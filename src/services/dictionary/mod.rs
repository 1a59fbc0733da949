pub mod api_client;
pub mod gateway;
pub mod store;

pub use api_client::{ApiClient, DictionaryApi};
pub use gateway::{cache_key, DictionaryGateway, LANGUAGE_PAIRS_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore};
