use crate::errors::ApiError;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// The operation-specific field map of a request.
pub type Payload = Map<String, Value>;

/// The outer `{"api": ..., "payload": {...}}` object wrapping every request.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Envelope {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub api: String,
    #[serde(default)]
    pub payload: Option<Payload>,
}

impl Envelope {
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes a raw request body. Anything that is not a JSON object of the
/// envelope shape is a client error.
pub fn decode_envelope(body: &[u8]) -> Result<Envelope, ApiError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))?;

    // Derived struct decoding also accepts positional arrays.
    if !value.is_object() {
        return Err(ApiError::Decode("request body must be a JSON object".into()));
    }

    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
