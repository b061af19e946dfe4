//! Request extractors that reject with [`Error`](crate::handler::Error)
//! responses instead of axum's plain-text defaults.

pub mod enhanced_json;
pub mod enhanced_path;
pub mod validated_json;

pub use self::enhanced_json::Json;
pub use self::enhanced_path::Path;
pub use self::validated_json::ValidateJson;
