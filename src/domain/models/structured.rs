use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::domain::DomainError;

/// A typed payload the model is asked to return as schema-constrained JSON.
///
/// The schema sent to the model is derived from the type itself, so the wire
/// contract and the Rust shape cannot drift apart. `normalize` runs after
/// parsing and either repairs harmless deviations or rejects the payload; a
/// value that leaves `normalize` is safe to display as a whole.
pub trait StructuredOutput: DeserializeOwned + JsonSchema + Send {
    fn normalize(self) -> Result<Self, DomainError>
    where
        Self: Sized;
}

/// JSON Schema for `T`, as produced by schemars.
pub fn response_schema<T: JsonSchema>() -> serde_json::Value {
    schemars::schema_for!(T).to_value()
}
