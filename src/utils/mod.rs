//! Utility modules for form normalization
//!
//! - Coercion: JavaScript-compatible truthiness and stringification

pub mod coerce;

// Re-export commonly used helpers
pub use coerce::{flag, is_truthy, js_number_string, js_string, string_or};
