//! Dynamic values and type tokens.
//! `Value` carries application values into the registry and wire values out of it;
//! `TypeKey` is the semantic token entries are registered under.

use std::any::TypeId;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use base64::Engine;
use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, Local, Month, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Structural capabilities checked when an exact type lookup misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Anything usable as a filesystem path; resolves to the `PathBuf` entry.
    Path,
}

/// Application type identifier. Equality and hashing use the `TypeId` only;
/// the name is for messages and the catalog listing.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    capability: Option<Capability>,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self { id: TypeId::of::<T>(), name: std::any::type_name::<T>(), capability: None }
    }

    /// Key for a type that can stand in for a path. Registered entries for the concrete
    /// type still win; otherwise resolution falls back to the `PathBuf` entry.
    pub fn path_like<T: AsRef<Path> + ?Sized + 'static>() -> Self {
        Self { capability: Some(Capability::Path), ..Self::of::<T>() }
    }

    pub fn id(&self) -> TypeId { self.id }
    pub fn name(&self) -> &'static str { self.name }
    pub fn capability(&self) -> Option<Capability> { self.capability }

    /// Last path segment of the type name, generics included: `alloc::string::String` -> `String`.
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        match base.rfind("::") {
            Some(idx) => &self.name[idx + 2..],
            None => self.name,
        }
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) { self.id.hash(state); }
}

/// A value on either side of a conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal(BigDecimal),
    BigInt(BigInt),
    Char(char),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Inet(IpAddr),
    Path(PathBuf),
    /// A file whose content is stored as a large object.
    File(PathBuf),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampUtc(DateTime<Utc>),
    TimestampTz(DateTime<FixedOffset>),
    TimestampLocal(DateTime<Local>),
    SystemTime(SystemTime),
    Duration(chrono::Duration),
    Weekday(Weekday),
    Month(Month),
    Offset(FixedOffset),
    #[cfg(feature = "time-types")]
    TimeDate(time::Date),
    #[cfg(feature = "time-types")]
    TimeOfDay(time::Time),
    #[cfg(feature = "time-types")]
    TimePrimitive(time::PrimitiveDateTime),
    #[cfg(feature = "time-types")]
    TimeOffset(time::OffsetDateTime),
    Json(JsonValue),
    /// Enum member by name.
    Enum(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    /// Variant label used in conversion error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Decimal(_) => "decimal",
            Value::BigInt(_) => "bigint",
            Value::Char(_) => "char",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Uuid(_) => "uuid",
            Value::Inet(_) => "inet",
            Value::Path(_) => "path",
            Value::File(_) => "file",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Timestamp(_) => "timestamp",
            Value::TimestampUtc(_) => "timestamp_utc",
            Value::TimestampTz(_) => "timestamp_tz",
            Value::TimestampLocal(_) => "timestamp_local",
            Value::SystemTime(_) => "system_time",
            Value::Duration(_) => "duration",
            Value::Weekday(_) => "weekday",
            Value::Month(_) => "month",
            Value::Offset(_) => "offset",
            #[cfg(feature = "time-types")]
            Value::TimeDate(_) => "time_date",
            #[cfg(feature = "time-types")]
            Value::TimeOfDay(_) => "time_of_day",
            #[cfg(feature = "time-types")]
            Value::TimePrimitive(_) => "time_primitive",
            #[cfg(feature = "time-types")]
            Value::TimeOffset(_) => "time_offset",
            Value::Json(_) => "json",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Enum(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Widening integer accessor; never truncates.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(v) => Some(*v as i64),
            Value::I16(v) => Some(*v as i64),
            Value::I32(v) => Some(*v as i64),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Generic JSON projection. Entries with a date-time mode override this for temporal values.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::I8(v) => JsonValue::from(*v),
            Value::I16(v) => JsonValue::from(*v),
            Value::I32(v) => JsonValue::from(*v),
            Value::I64(v) => JsonValue::from(*v),
            Value::F32(v) => JsonValue::from(*v),
            Value::F64(v) => JsonValue::from(*v),
            Value::Decimal(d) => JsonValue::String(d.to_string()),
            Value::BigInt(b) => JsonValue::String(b.to_string()),
            Value::Char(c) => JsonValue::String(c.to_string()),
            Value::Text(s) | Value::Enum(s) => JsonValue::String(s.clone()),
            Value::Bytes(b) => JsonValue::String(base64::engine::general_purpose::STANDARD.encode(b)),
            Value::Uuid(u) => JsonValue::String(u.to_string()),
            Value::Inet(ip) => JsonValue::String(ip.to_string()),
            Value::Path(p) | Value::File(p) => JsonValue::String(p.to_string_lossy().into_owned()),
            Value::Date(d) => JsonValue::String(d.to_string()),
            Value::Time(t) => JsonValue::String(t.to_string()),
            Value::Timestamp(ts) => JsonValue::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Value::TimestampUtc(ts) => JsonValue::String(ts.to_rfc3339()),
            Value::TimestampTz(ts) => JsonValue::String(ts.to_rfc3339()),
            Value::TimestampLocal(ts) => JsonValue::String(ts.to_rfc3339()),
            Value::SystemTime(st) => JsonValue::String(DateTime::<Utc>::from(*st).to_rfc3339()),
            Value::Duration(d) => JsonValue::from(d.num_seconds()),
            Value::Weekday(w) => JsonValue::String(w.to_string()),
            Value::Month(m) => JsonValue::String(m.name().to_string()),
            Value::Offset(o) => JsonValue::String(o.to_string()),
            #[cfg(feature = "time-types")]
            Value::TimeDate(d) => JsonValue::String(d.to_string()),
            #[cfg(feature = "time-types")]
            Value::TimeOfDay(t) => JsonValue::String(t.to_string()),
            #[cfg(feature = "time-types")]
            Value::TimePrimitive(t) => JsonValue::String(t.to_string()),
            #[cfg(feature = "time-types")]
            Value::TimeOffset(t) => JsonValue::String(t.to_string()),
            Value::Json(j) => j.clone(),
            Value::List(items) => JsonValue::Array(items.iter().map(|v| v.to_json()).collect()),
            Value::Map(m) => JsonValue::Object(m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()),
        }
    }

    /// Inverse of `to_json` for the shapes JSON can carry natively.
    pub fn from_json(j: &JsonValue) -> Value {
        match j {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() { Value::I64(i) } else { Value::F64(n.as_f64().unwrap_or(0.0)) }
            }
            JsonValue::String(s) => Value::Text(s.clone()),
            JsonValue::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            JsonValue::Object(m) => Value::Map(m.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect()),
        }
    }
}

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i16> for Value { fn from(v: i16) -> Self { Value::I16(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::I32(v) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::I64(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::F64(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::Text(v.to_string()) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::Text(v) } }
impl From<Vec<u8>> for Value { fn from(v: Vec<u8>) -> Self { Value::Bytes(v) } }
impl From<Uuid> for Value { fn from(v: Uuid) -> Self { Value::Uuid(v) } }
