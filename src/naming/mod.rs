//! Friendly names for raw JSON keys
//!
//! The resolver memoizes suggestions per endpoint; suggesters are pluggable.

pub mod gemini;
pub mod resolver;

pub use gemini::GeminiSuggester;
pub use resolver::{FriendlyNameCache, IdentitySuggester, NameMap, NameResolver, NameSuggester};
