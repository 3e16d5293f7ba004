//! Method calls and their arguments.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use crate::error::CodecError;

/// A stream of file content that can be uploaded once.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + Sync>>;

/// Where the content of an [`InputFile`] comes from.
#[derive(Clone)]
pub enum FileSource {
    /// Content held in memory.
    Bytes(Bytes),
    /// A file on the local disk, read when the request is sent.
    Path(PathBuf),
    /// A stream that is consumed by the first upload.
    Stream(Arc<Mutex<Option<ByteStream>>>),
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A file to upload with a call.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub filename: Option<String>,
    pub source: FileSource,
}

impl InputFile {
    /// In-memory content.
    pub fn bytes(content: impl Into<Bytes>) -> Self {
        Self {
            filename: None,
            source: FileSource::Bytes(content.into()),
        }
    }

    /// A file on disk. The file name defaults to the last path component.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Self {
            filename,
            source: FileSource::Path(path),
        }
    }

    /// A byte stream; it can only be uploaded once.
    pub fn stream(stream: ByteStream) -> Self {
        Self {
            filename: None,
            source: FileSource::Stream(Arc::new(Mutex::new(Some(stream)))),
        }
    }

    /// Sets the file name sent with the part.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Takes the stream out of a [`FileSource::Stream`]; `None` once consumed
    /// or for other sources.
    pub fn take_stream(&self) -> Option<ByteStream> {
        match &self.source {
            FileSource::Stream(cell) => cell.lock().take(),
            _ => None,
        }
    }
}

/// A single argument value.
#[derive(Debug, Clone)]
pub enum Param {
    Value(Value),
    File(InputFile),
}

/// The arguments of one method call.
///
/// Top-level `null` values are dropped when the call is encoded as JSON.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    params: BTreeMap<String, Param>,
    attachments: Vec<(String, InputFile)>,
}

impl Payload {
    /// An empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a payload from any value that serializes to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(args: &T) -> Result<Self, CodecError> {
        match serde_json::to_value(args)? {
            Value::Object(map) => Ok(Self {
                params: map.into_iter().map(|(k, v)| (k, Param::Value(v))).collect(),
                attachments: Vec::new(),
            }),
            Value::Null => Ok(Self::new()),
            other => Err(CodecError::NotAnObject(json_kind(&other))),
        }
    }

    /// Adds a structured argument.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds a file argument.
    pub fn with_file(mut self, key: impl Into<String>, file: InputFile) -> Self {
        self.insert_file(key, file);
        self
    }

    /// Sets a structured argument, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Param> {
        self.params.insert(key.into(), Param::Value(value.into()))
    }

    /// Sets a file argument, returning the previous one.
    pub fn insert_file(&mut self, key: impl Into<String>, file: InputFile) -> Option<Param> {
        self.params.insert(key.into(), Param::File(file))
    }

    /// Removes an argument.
    pub fn remove(&mut self, key: &str) -> Option<Param> {
        self.params.remove(key)
    }

    /// Returns a structured argument.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self.params.get(key) {
            Some(Param::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// Registers `file` as an extra part and returns the `attach://` reference
    /// to put inside a structured argument (e.g. an `InputMedia`).
    ///
    /// Part names skip anything already used by an argument or another
    /// attachment.
    pub fn attach(&mut self, file: InputFile) -> String {
        let taken = |name: &str| {
            self.params.contains_key(name) || self.attachments.iter().any(|(n, _)| n == name)
        };
        let name = (self.attachments.len()..)
            .map(|n| format!("attachment{n}"))
            .find(|name| !taken(name.as_str()))
            .unwrap_or_else(|| "attachment".to_string());
        let reference = format!("attach://{name}");
        self.attachments.push((name, file));
        reference
    }

    /// Whether any argument is binary, forcing a multipart upload.
    pub fn has_files(&self) -> bool {
        !self.attachments.is_empty() || self.params.values().any(|p| matches!(p, Param::File(_)))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Arguments in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Files registered with [`attach`](Self::attach).
    pub fn attachments(&self) -> &[(String, InputFile)] {
        &self.attachments
    }
}

/// One logical request to the Bot API.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub payload: Payload,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, payload: Payload) -> Self {
        Self {
            method: method.into(),
            payload,
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct SendMessage<'a> {
        chat_id: i64,
        text: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        parse_mode: Option<&'a str>,
    }

    #[test]
    fn test_from_serialize() {
        let payload = Payload::from_serialize(&SendMessage {
            chat_id: 7,
            text: "hi",
            parse_mode: None,
        })
        .unwrap();
        assert_eq!(payload.get("chat_id"), Some(&json!(7)));
        assert_eq!(payload.get("text"), Some(&json!("hi")));
        assert_eq!(payload.len(), 2);
        assert!(!payload.has_files());
    }

    #[test]
    fn test_from_serialize_rejects_non_objects() {
        let err = Payload::from_serialize(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, CodecError::NotAnObject("an array")));
    }

    #[test]
    fn test_attach_returns_reference() {
        let mut payload = Payload::new();
        let first = payload.attach(InputFile::bytes(&b"a"[..]));
        let second = payload.attach(InputFile::bytes(&b"b"[..]));
        assert_eq!(first, "attach://attachment0");
        assert_eq!(second, "attach://attachment1");
        assert!(payload.has_files());
    }

    #[test]
    fn test_attach_skips_names_in_use() {
        let mut payload = Payload::new().with("attachment0", "caption");
        let first = payload.attach(InputFile::bytes(&b"a"[..]));
        let second = payload.attach(InputFile::bytes(&b"b"[..]));
        assert_eq!(first, "attach://attachment1");
        assert_eq!(second, "attach://attachment2");
        assert_eq!(payload.get("attachment0"), Some(&json!("caption")));
    }

    #[test]
    fn test_stream_taken_once() {
        let file = InputFile::stream(Box::pin(futures::stream::empty()));
        let clone = file.clone();
        assert!(file.take_stream().is_some());
        assert!(clone.take_stream().is_none());
    }

    #[test]
    fn test_path_filename() {
        let file = InputFile::path("/tmp/photos/cat.jpg");
        assert_eq!(file.filename.as_deref(), Some("cat.jpg"));
    }
}
