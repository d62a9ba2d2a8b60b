//! Catalog entries: the `ScalarType` contract and the built-in implementations.
//! Entries are immutable once built and shared as `Arc<dyn ScalarType>`.

pub mod basic;
pub mod temporal;
pub mod misc;
pub mod json;
pub mod array;
pub mod enums;
pub mod wrapper;
#[cfg(feature = "time-types")]
pub mod time_types;

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{TypeError, TypeResult};
use crate::value::{TypeKey, Value};
use crate::wire::WireCode;

/// Classification used when a property is projected into a document store / JSON export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocPropertyType {
    Boolean,
    Short,
    Integer,
    Long,
    Float,
    Double,
    Keyword,
    Text,
    Uuid,
    Enum,
    Date,
    DateTime,
    Binary,
    List,
    Object,
}

/// Immutable descriptor pairing an application type with a wire code and the conversions between them.
pub trait ScalarType: Send + Sync + Debug {
    fn app_type(&self) -> TypeKey;
    fn wire_code(&self) -> WireCode;
    /// Application value -> wire value. `Null` passes through.
    fn to_wire(&self, value: Value) -> TypeResult<Value>;
    /// Wire value -> application value. `Null` passes through.
    fn from_wire(&self, value: Value) -> TypeResult<Value>;
    fn doc_type(&self) -> DocPropertyType;
    /// Implementation name shown in the catalog and logs.
    fn describe(&self) -> &'static str;
    /// Declared column length; 0 when the column is unbounded or the type is not length-bearing.
    fn length(&self) -> u32 { 0 }
    fn to_json(&self, value: &Value) -> TypeResult<JsonValue> { Ok(value.to_json()) }
}

pub type ScalarTypeRef = Arc<dyn ScalarType>;

/// Result of a plain conversion function: the rejected value is handed back for the error message.
pub type Conv = Result<Value, Value>;

/// Stateless entry driven by two conversion functions. Most built-in scalars are one of these.
#[derive(Clone)]
pub struct ScalarTypeFn {
    pub(crate) key: TypeKey,
    pub(crate) code: WireCode,
    pub(crate) doc: DocPropertyType,
    pub(crate) name: &'static str,
    pub(crate) length: u32,
    pub(crate) to: fn(Value) -> Conv,
    pub(crate) from: fn(Value) -> Conv,
    /// Instants exported to JSON per the configured mode instead of the generic projection.
    pub(crate) json_mode: Option<crate::config::JsonDateTime>,
}

impl ScalarTypeFn {
    pub fn new(key: TypeKey, code: WireCode, doc: DocPropertyType, name: &'static str, to: fn(Value) -> Conv, from: fn(Value) -> Conv) -> Self {
        Self { key, code, doc, name, length: 0, to, from, json_mode: None }
    }

    pub fn with_length(mut self, length: u32) -> Self { self.length = length; self }

    pub fn with_json_mode(mut self, mode: crate::config::JsonDateTime) -> Self { self.json_mode = Some(mode); self }

    pub fn into_ref(self) -> ScalarTypeRef { Arc::new(self) }
}

impl Debug for ScalarTypeFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(self.name).field("type", &self.key.name()).field("code", &self.code).finish()
    }
}

impl ScalarType for ScalarTypeFn {
    fn app_type(&self) -> TypeKey { self.key }
    fn wire_code(&self) -> WireCode { self.code }
    fn doc_type(&self) -> DocPropertyType { self.doc }
    fn describe(&self) -> &'static str { self.name }
    fn length(&self) -> u32 { self.length }

    fn to_wire(&self, value: Value) -> TypeResult<Value> {
        if value.is_null() { return Ok(Value::Null); }
        (self.to)(value).map_err(|v| mismatch(self.key, "to_wire", &v))
    }

    fn from_wire(&self, value: Value) -> TypeResult<Value> {
        if value.is_null() { return Ok(Value::Null); }
        (self.from)(value).map_err(|v| mismatch(self.key, "from_wire", &v))
    }

    fn to_json(&self, value: &Value) -> TypeResult<JsonValue> {
        match self.json_mode {
            Some(mode) => Ok(temporal::instant_json(mode, value).unwrap_or_else(|| value.to_json())),
            None => Ok(value.to_json()),
        }
    }
}

pub(crate) fn mismatch(key: TypeKey, direction: &str, value: &Value) -> TypeError {
    TypeError::conversion(key.name().to_string(), format!("{} {}: cannot convert {} value {:?}", key.short_name(), direction, value.kind(), value))
}

/// Identity conversion, used where application and wire forms coincide.
pub(crate) fn same(v: Value) -> Conv { Ok(v) }

/// Narrow any integer wire value into the target width; out-of-range values are rejected.
pub(crate) fn narrow(v: Value, f: fn(i64) -> Option<Value>) -> Conv {
    match v.as_i64() {
        Some(n) => f(n).ok_or(v),
        None => Err(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_i32(v: Value) -> Conv { match v { Value::I32(_) => Ok(v), other => Err(other) } }

    #[test]
    fn fn_entry_passes_null_and_reports_mismatch() {
        let e = ScalarTypeFn::new(TypeKey::of::<i32>(), WireCode::INTEGER, DocPropertyType::Integer, "ScalarTypeTest", only_i32, only_i32);
        assert_eq!(e.to_wire(Value::Null).unwrap(), Value::Null);
        assert_eq!(e.to_wire(Value::I32(4)).unwrap(), Value::I32(4));
        let err = e.from_wire(Value::Text("x".into())).unwrap_err();
        assert_eq!(err.code_str(), "conversion");
        assert!(err.message().contains("from_wire"));
        assert!(err.message().contains("text"));
    }

    #[test]
    fn narrowing_rejects_out_of_range() {
        let f: fn(i64) -> Option<Value> = |n| i8::try_from(n).ok().map(Value::I8);
        assert_eq!(narrow(Value::I64(12), f), Ok(Value::I8(12)));
        assert!(narrow(Value::I64(1_000), f).is_err());
        assert!(narrow(Value::Text("1".into()), f).is_err());
    }
}
