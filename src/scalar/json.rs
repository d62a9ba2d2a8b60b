//! JSON-backed entries and the hstore entry.
//!
//! Collections (list, set, map), arbitrary `serde_json::Value` documents and codec-driven
//! object shapes are stored as JSON text in one of several column kinds. On Postgres the
//! JSON and JSONB codes are used as-is; elsewhere they fall back to CLOB.

use std::collections::{BTreeMap, BTreeSet};
use std::iter::Peekable;
use std::str::Chars;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::array::ContainerShape;
use super::{mismatch, DocPropertyType, ScalarType, ScalarTypeRef};
use crate::error::{TypeError, TypeResult};
use crate::platform::DatabasePlatform;
use crate::value::{TypeKey, Value};
use crate::wire::WireCode;

/// Shared JSON codec handed to JSON-backed entries and to plugins that ask for one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self { Self::default() }
    pub fn pretty() -> Self { Self { pretty: true } }

    pub fn to_text(&self, v: &JsonValue) -> TypeResult<String> {
        let out = if self.pretty { serde_json::to_string_pretty(v) } else { serde_json::to_string(v) };
        out.map_err(|e| TypeError::conversion("serde_json::Value", format!("json encode: {}", e)))
    }

    pub fn from_text(&self, s: &str) -> TypeResult<JsonValue> {
        serde_json::from_str(s).map_err(|e| TypeError::conversion("serde_json::Value", format!("json decode: {}", e)))
    }

    pub fn from_bytes(&self, b: &[u8]) -> TypeResult<JsonValue> {
        serde_json::from_slice(b).map_err(|e| TypeError::conversion("serde_json::Value", format!("json decode: {}", e)))
    }
}

/// Column kind holding JSON text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStorage {
    Varchar,
    Clob,
    /// UTF-8 bytes
    Blob,
    Json,
    Jsonb,
}

impl JsonStorage {
    /// Storage for a requested wire code. JSON/JSONB degrade to CLOB off Postgres.
    pub fn for_code(code: WireCode, platform: &DatabasePlatform) -> Option<JsonStorage> {
        match code {
            WireCode::VARCHAR => Some(JsonStorage::Varchar),
            WireCode::CLOB | WireCode::LONGVARCHAR => Some(JsonStorage::Clob),
            WireCode::BLOB | WireCode::LONGVARBINARY => Some(JsonStorage::Blob),
            WireCode::JSON if platform.is_postgres() => Some(JsonStorage::Json),
            WireCode::JSONB if platform.is_postgres() => Some(JsonStorage::Jsonb),
            WireCode::JSON | WireCode::JSONB => Some(JsonStorage::Clob),
            _ => None,
        }
    }

    pub fn wire_code(&self) -> WireCode {
        match self {
            JsonStorage::Varchar => WireCode::VARCHAR,
            JsonStorage::Clob => WireCode::CLOB,
            JsonStorage::Blob => WireCode::BLOB,
            JsonStorage::Json => WireCode::JSON,
            JsonStorage::Jsonb => WireCode::JSONB,
        }
    }

    fn encode(&self, codec: &JsonCodec, j: &JsonValue) -> TypeResult<Value> {
        let text = codec.to_text(j)?;
        Ok(match self {
            JsonStorage::Blob => Value::Bytes(text.into_bytes()),
            _ => Value::Text(text),
        })
    }

    fn decode(&self, codec: &JsonCodec, key: TypeKey, v: &Value) -> TypeResult<JsonValue> {
        match v {
            Value::Text(s) => codec.from_text(s),
            Value::Bytes(b) => codec.from_bytes(b),
            Value::Json(j) => Ok(j.clone()),
            other => Err(mismatch(key, "from_wire", other)),
        }
    }
}

/// Keep first occurrences only.
pub(crate) fn dedupe(items: Vec<Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    for v in items {
        if !out.contains(&v) { out.push(v); }
    }
    out
}

/// Application key for a collection shape.
pub fn collection_key(shape: &ContainerShape) -> Option<TypeKey> {
    match shape {
        ContainerShape::List => Some(TypeKey::of::<Vec<Value>>()),
        ContainerShape::Set => Some(TypeKey::of::<BTreeSet<Value>>()),
        ContainerShape::Map => Some(TypeKey::of::<BTreeMap<String, Value>>()),
        ContainerShape::Other(_) => None,
    }
}

/// List, set or map stored as JSON text.
#[derive(Debug, Clone)]
pub struct ScalarTypeJsonCollection {
    shape: ContainerShape,
    element: TypeKey,
    storage: JsonStorage,
    codec: Arc<JsonCodec>,
}

impl ScalarTypeJsonCollection {
    pub fn new(shape: ContainerShape, element: TypeKey, storage: JsonStorage, codec: Arc<JsonCodec>) -> TypeResult<Self> {
        if collection_key(&shape).is_none() {
            return Err(TypeError::unsupported_shape(shape.name(), format!("{} is not a JSON collection shape", shape.name())));
        }
        Ok(Self { shape, element, storage, codec })
    }

    /// String-keyed map; always a valid collection shape.
    pub fn map(element: TypeKey, storage: JsonStorage, codec: Arc<JsonCodec>) -> Self {
        Self { shape: ContainerShape::Map, element, storage, codec }
    }

    pub fn element(&self) -> TypeKey { self.element }
    pub fn storage(&self) -> JsonStorage { self.storage }
}

impl ScalarType for ScalarTypeJsonCollection {
    fn app_type(&self) -> TypeKey { collection_key(&self.shape).unwrap_or_else(TypeKey::of::<JsonValue>) }
    fn wire_code(&self) -> WireCode { self.storage.wire_code() }
    fn describe(&self) -> &'static str {
        match self.shape {
            ContainerShape::Set => "ScalarTypeJsonSet",
            ContainerShape::Map => "ScalarTypeJsonMap",
            _ => "ScalarTypeJsonList",
        }
    }
    fn doc_type(&self) -> DocPropertyType {
        if self.shape == ContainerShape::Map { DocPropertyType::Object } else { DocPropertyType::List }
    }

    fn to_wire(&self, value: Value) -> TypeResult<Value> {
        let value = match (value, &self.shape) {
            (Value::Null, _) => return Ok(Value::Null),
            (Value::List(items), ContainerShape::Set) => Value::List(dedupe(items)),
            (v @ Value::List(_), ContainerShape::List) => v,
            (v @ Value::Map(_), ContainerShape::Map) => v,
            (other, _) => return Err(mismatch(self.app_type(), "to_wire", &other)),
        };
        self.storage.encode(&self.codec, &value.to_json())
    }

    fn from_wire(&self, value: Value) -> TypeResult<Value> {
        if value.is_null() { return Ok(Value::Null); }
        let parsed = Value::from_json(&self.storage.decode(&self.codec, self.app_type(), &value)?);
        match (parsed, &self.shape) {
            (Value::List(items), ContainerShape::Set) => Ok(Value::List(dedupe(items))),
            (v @ Value::List(_), ContainerShape::List) => Ok(v),
            (v @ Value::Map(_), ContainerShape::Map) => Ok(v),
            (other, _) => Err(mismatch(self.app_type(), "from_wire", &other)),
        }
    }
}

/// `serde_json::Value` documents.
#[derive(Debug, Clone)]
pub struct ScalarTypeJsonValue {
    storage: JsonStorage,
    codec: Arc<JsonCodec>,
}

impl ScalarTypeJsonValue {
    pub fn new(storage: JsonStorage, codec: Arc<JsonCodec>) -> Self { Self { storage, codec } }
}

impl ScalarType for ScalarTypeJsonValue {
    fn app_type(&self) -> TypeKey { TypeKey::of::<JsonValue>() }
    fn wire_code(&self) -> WireCode { self.storage.wire_code() }
    fn doc_type(&self) -> DocPropertyType { DocPropertyType::Object }
    fn describe(&self) -> &'static str { "ScalarTypeJsonNode" }

    fn to_wire(&self, value: Value) -> TypeResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Json(ref j) => self.storage.encode(&self.codec, j),
            other => Err(mismatch(self.app_type(), "to_wire", &other)),
        }
    }

    fn from_wire(&self, value: Value) -> TypeResult<Value> {
        if value.is_null() { return Ok(Value::Null); }
        self.storage.decode(&self.codec, self.app_type(), &value).map(Value::Json)
    }
}

/// Arbitrary object shape, carried as its JSON document and encoded by the shared codec.
#[derive(Debug, Clone)]
pub struct ScalarTypeJsonObject {
    key: TypeKey,
    storage: JsonStorage,
    codec: Arc<JsonCodec>,
}

impl ScalarTypeJsonObject {
    pub fn new(key: TypeKey, storage: JsonStorage, codec: Arc<JsonCodec>) -> Self { Self { key, storage, codec } }
}

impl ScalarType for ScalarTypeJsonObject {
    fn app_type(&self) -> TypeKey { self.key }
    fn wire_code(&self) -> WireCode { self.storage.wire_code() }
    fn doc_type(&self) -> DocPropertyType { DocPropertyType::Object }
    fn describe(&self) -> &'static str { "ScalarTypeJsonObjectMapper" }

    fn to_wire(&self, value: Value) -> TypeResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Json(ref j) => self.storage.encode(&self.codec, j),
            ref v @ Value::Map(_) => self.storage.encode(&self.codec, &v.to_json()),
            other => Err(mismatch(self.key, "to_wire", &other)),
        }
    }

    fn from_wire(&self, value: Value) -> TypeResult<Value> {
        if value.is_null() { return Ok(Value::Null); }
        self.storage.decode(&self.codec, self.key, &value).map(Value::Json)
    }
}

/// Postgres hstore: a flat string map in hstore text format (`"k"=>"v", "n"=>NULL`).
#[derive(Debug, Clone, Default)]
pub struct ScalarTypeHstore;

impl ScalarType for ScalarTypeHstore {
    fn app_type(&self) -> TypeKey { TypeKey::of::<BTreeMap<String, Value>>() }
    fn wire_code(&self) -> WireCode { WireCode::HSTORE }
    fn doc_type(&self) -> DocPropertyType { DocPropertyType::Object }
    fn describe(&self) -> &'static str { "ScalarTypePostgresHstore" }

    fn to_wire(&self, value: Value) -> TypeResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Map(m) => Ok(Value::Text(format_hstore(&m))),
            other => Err(mismatch(self.app_type(), "to_wire", &other)),
        }
    }

    fn from_wire(&self, value: Value) -> TypeResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Map(_) => Ok(value),
            Value::Text(ref s) => parse_hstore(s).map(Value::Map).ok_or_else(|| {
                TypeError::conversion(self.app_type().name(), format!("malformed hstore literal: {}", s))
            }),
            other => Err(mismatch(self.app_type(), "from_wire", &other)),
        }
    }
}

fn quote_into(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' { out.push('\\'); }
        out.push(c);
    }
    out.push('"');
}

pub fn format_hstore(m: &BTreeMap<String, Value>) -> String {
    let mut out = String::new();
    for (i, (k, v)) in m.iter().enumerate() {
        if i > 0 { out.push_str(", "); }
        quote_into(&mut out, k);
        out.push_str("=>");
        match v {
            Value::Null => out.push_str("NULL"),
            Value::Text(s) => quote_into(&mut out, s),
            other => match other.to_json() {
                JsonValue::String(s) => quote_into(&mut out, &s),
                j => quote_into(&mut out, &j.to_string()),
            },
        }
    }
    out
}

fn skip_ws(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().map_or(false, |c| c.is_whitespace()) { chars.next(); }
}

fn read_quoted(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    if chars.next()? != '"' { return None; }
    let mut s = String::new();
    loop {
        match chars.next()? {
            '\\' => s.push(chars.next()?),
            '"' => return Some(s),
            c => s.push(c),
        }
    }
}

pub fn parse_hstore(s: &str) -> Option<BTreeMap<String, Value>> {
    let mut out = BTreeMap::new();
    let mut chars = s.chars().peekable();
    loop {
        skip_ws(&mut chars);
        if chars.peek().is_none() { return Some(out); }
        let key = read_quoted(&mut chars)?;
        skip_ws(&mut chars);
        if chars.next()? != '=' || chars.next()? != '>' { return None; }
        skip_ws(&mut chars);
        let value = if chars.peek() == Some(&'"') {
            Value::Text(read_quoted(&mut chars)?)
        } else {
            let word: String = chars.by_ref().take(4).collect();
            if !word.eq_ignore_ascii_case("null") { return None; }
            Value::Null
        };
        out.insert(key, value);
        skip_ws(&mut chars);
        match chars.next() {
            None => return Some(out),
            Some(',') => continue,
            Some(_) => return None,
        }
    }
}

pub fn hstore() -> ScalarTypeRef { Arc::new(ScalarTypeHstore) }
