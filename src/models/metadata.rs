use serde_json::{Map, Value};

/// Custom metadata of a single secret as a JSON object.
pub type CustomMetadata = Map<String, Value>;

/// Key naming the secret inside an exchanged metadata record.
pub const PATH_KEY: &str = "path";
