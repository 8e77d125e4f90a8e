//! Request body encoding and response payload decoding.

use serde::Serialize;

use crate::chunk::Chunk;
use crate::config::{BodyFormat, DataType};

use super::TransportError;

/// Decoded response of a successful chunk POST. Opaque to the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Json(serde_json::Value),
    Text(String),
}

/// Returns (content type, body) for the POST carrying `chunk`.
pub fn encode_body(chunk: &Chunk, format: BodyFormat) -> (&'static str, Vec<u8>) {
    match format {
        BodyFormat::Form => {
            let mut form = url::form_urlencoded::Serializer::new(String::new());
            for id in chunk.ids() {
                form.append_pair("chunk[]", &id.to_string());
            }
            ("application/x-www-form-urlencoded", form.finish().into_bytes())
        }
        BodyFormat::Json => {
            let body = serde_json::json!({ "chunk": chunk });
            ("application/json", body.to_string().into_bytes())
        }
    }
}

/// Turns a finished transfer into a payload or an attempt error.
/// Non-2xx is an error; 204 with an empty body decodes to JSON null.
pub fn decode_payload(
    code: u32,
    body: Vec<u8>,
    data_type: DataType,
) -> Result<ResponsePayload, TransportError> {
    if !(200..300).contains(&code) {
        return Err(TransportError::Http(code));
    }
    match data_type {
        DataType::Json if code == 204 && body.is_empty() => {
            Ok(ResponsePayload::Json(serde_json::Value::Null))
        }
        DataType::Json => serde_json::from_slice(&body)
            .map(ResponsePayload::Json)
            .map_err(|e| TransportError::Decode {
                data_type,
                message: e.to_string(),
            }),
        DataType::Text => Ok(ResponsePayload::Text(
            String::from_utf8_lossy(&body).into_owned(),
        )),
    }
}
