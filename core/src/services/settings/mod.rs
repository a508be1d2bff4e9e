//! Settings provider: cached, protection-aware access to the settings store

mod provider;


pub use provider::{SettingsProvider, DEFAULT_CACHE_TTL};
