//! Request body encoding.
//!
//! A call is sent as JSON unless any argument is binary, in which case the
//! whole call becomes `multipart/form-data`. The transport turns the
//! [`RequestBody`] into its own wire representation.

use serde_json::{Map, Value};

use crate::error::CodecError;
use crate::payload::{InputFile, MethodCall, Param, Payload};

/// Content of one multipart part.
#[derive(Debug, Clone)]
pub enum PartContent {
    Text(String),
    File(InputFile),
}

/// One multipart form field.
#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub content: PartContent,
}

/// An encoded request body.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// `application/json` bytes.
    Json(Vec<u8>),
    /// `multipart/form-data` parts; the transport picks the boundary.
    Multipart(Vec<Part>),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}

/// Encodes `payload` for a network request.
pub fn encode(payload: &Payload) -> Result<RequestBody, CodecError> {
    if payload.has_files() {
        Ok(RequestBody::Multipart(encode_multipart(payload)))
    } else {
        Ok(RequestBody::Json(serde_json::to_vec(&json_object(payload)?)?))
    }
}

/// Encodes `call` as a webhook reply body: the JSON arguments plus a
/// `method` field.
pub fn encode_webhook_reply(call: &MethodCall) -> Result<Vec<u8>, CodecError> {
    let mut object = json_object(&call.payload)?;
    object.insert("method".into(), Value::String(call.method.clone()));
    Ok(serde_json::to_vec(&object)?)
}

fn json_object(payload: &Payload) -> Result<Map<String, Value>, CodecError> {
    let mut object = Map::new();
    for (key, param) in payload.iter() {
        match param {
            Param::Value(Value::Null) => {}
            Param::Value(value) => {
                object.insert(key.to_string(), value.clone());
            }
            Param::File(_) => return Err(CodecError::NotAnObject("a file")),
        }
    }
    Ok(object)
}

fn encode_multipart(payload: &Payload) -> Vec<Part> {
    let mut parts = Vec::with_capacity(payload.len() + payload.attachments().len());
    for (key, param) in payload.iter() {
        let content = match param {
            Param::Value(Value::Null) => continue,
            Param::Value(value) => PartContent::Text(text_field(value)),
            Param::File(file) => PartContent::File(file.clone()),
        };
        parts.push(Part {
            name: key.to_string(),
            content,
        });
    }
    for (name, file) in payload.attachments() {
        parts.push(Part {
            name: name.clone(),
            content: PartContent::File(file.clone()),
        });
    }
    parts
}

/// Strings go verbatim, scalars by their text form, everything else as JSON.
fn text_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
