//! UUID, path, file LOB, network address, offset and calendar-unit entries.

use std::fs::File;
use std::net::IpAddr;
use std::path::PathBuf;

use chrono::{FixedOffset, Month, Weekday};
use uuid::Uuid;

use super::{mismatch, DocPropertyType, ScalarType, ScalarTypeFn, ScalarTypeRef};
use crate::error::{TypeError, TypeResult};
use crate::value::{TypeKey, Value};
use crate::wire::WireCode;

const WEEKDAYS: [Weekday; 7] = [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat, Weekday::Sun];

const MONTHS: [Month; 12] = [
    Month::January, Month::February, Month::March, Month::April, Month::May, Month::June,
    Month::July, Month::August, Month::September, Month::October, Month::November, Month::December,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UuidStorage {
    Native,
    /// BINARY(16)
    Binary,
    /// VARCHAR(40)
    Varchar,
}

pub fn uuid(storage: UuidStorage) -> ScalarTypeRef {
    let key = TypeKey::of::<Uuid>();
    let e = match storage {
        UuidStorage::Native => ScalarTypeFn::new(key, WireCode::UUID, DocPropertyType::Uuid, "ScalarTypeUUIDNative",
            |v| match v { Value::Uuid(_) => Ok(v), o => Err(o) },
            |v| match v {
                Value::Uuid(_) => Ok(v),
                Value::Text(ref s) => Uuid::parse_str(s).map(Value::Uuid).map_err(|_| v),
                o => Err(o),
            }),
        UuidStorage::Binary => ScalarTypeFn::new(key, WireCode::BINARY, DocPropertyType::Uuid, "ScalarTypeUUIDBinary",
            |v| match v { Value::Uuid(u) => Ok(Value::Bytes(u.as_bytes().to_vec())), o => Err(o) },
            |v| match v {
                Value::Bytes(ref b) => Uuid::from_slice(b).map(Value::Uuid).map_err(|_| v),
                o => Err(o),
            }).with_length(16),
        UuidStorage::Varchar => ScalarTypeFn::new(key, WireCode::VARCHAR, DocPropertyType::Uuid, "ScalarTypeUUIDVarchar",
            |v| match v { Value::Uuid(u) => Ok(Value::Text(u.to_string())), o => Err(o) },
            |v| match v {
                Value::Text(ref s) => Uuid::parse_str(s.trim()).map(Value::Uuid).map_err(|_| v),
                o => Err(o),
            }).with_length(40),
    };
    e.into_ref()
}

/// `PathBuf` as VARCHAR. Non UTF-8 paths are rejected rather than stored lossily.
pub fn path() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<PathBuf>(), WireCode::VARCHAR, DocPropertyType::Keyword, "ScalarTypePath",
        |v| match v {
            Value::Path(ref p) => p.to_str().map(|s| Value::Text(s.to_string())).ok_or(v),
            o => Err(o),
        },
        |v| match v {
            Value::Text(s) => Ok(Value::Path(PathBuf::from(s))),
            o => Err(o),
        }).into_ref()
}

pub fn inet() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<IpAddr>(), WireCode::VARCHAR, DocPropertyType::Keyword, "ScalarTypeInetAddress",
        |v| match v { Value::Inet(ip) => Ok(Value::Text(ip.to_string())), o => Err(o) },
        |v| match v {
            Value::Inet(_) => Ok(v),
            Value::Text(ref s) => s.trim().parse::<IpAddr>().map(Value::Inet).map_err(|_| v),
            o => Err(o),
        }).with_length(50).into_ref()
}

pub fn offset() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<FixedOffset>(), WireCode::VARCHAR, DocPropertyType::Keyword, "ScalarTypeZoneOffset",
        |v| match v { Value::Offset(o) => Ok(Value::Text(o.to_string())), o => Err(o) },
        |v| match v {
            Value::Text(ref s) => s.trim().parse::<FixedOffset>().map(Value::Offset).map_err(|_| v),
            o => Err(o),
        }).with_length(9).into_ref()
}

/// Monday = 1 .. Sunday = 7.
pub fn weekday() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<Weekday>(), WireCode::INTEGER, DocPropertyType::Enum, "ScalarTypeDayOfWeek",
        |v| match v { Value::Weekday(d) => Ok(Value::I32(d.number_from_monday() as i32)), o => Err(o) },
        |v| match v.as_i64() {
            Some(n @ 1..=7) => Ok(Value::Weekday(WEEKDAYS[(n - 1) as usize])),
            _ => Err(v),
        }).into_ref()
}

/// January = 1 .. December = 12.
pub fn month() -> ScalarTypeRef {
    ScalarTypeFn::new(TypeKey::of::<Month>(), WireCode::INTEGER, DocPropertyType::Enum, "ScalarTypeMonth",
        |v| match v { Value::Month(m) => Ok(Value::I32(m.number_from_month() as i32)), o => Err(o) },
        |v| match v.as_i64() {
            Some(n @ 1..=12) => Ok(Value::Month(MONTHS[(n - 1) as usize])),
            _ => Err(v),
        }).into_ref()
}

/// File content stored as a BLOB. Writing reads the file; reading materialises
/// the bytes into a fresh temporary file, so the original path is not preserved.
#[derive(Debug, Clone)]
pub struct ScalarTypeFile {
    dir: PathBuf,
}

impl ScalarTypeFile {
    pub fn new() -> Self { Self { dir: std::env::temp_dir() } }

    /// Materialise read-back files under `dir` instead of the system temp directory.
    pub fn in_dir(dir: PathBuf) -> Self { Self { dir } }
}

impl Default for ScalarTypeFile {
    fn default() -> Self { Self::new() }
}

impl ScalarType for ScalarTypeFile {
    fn app_type(&self) -> TypeKey { TypeKey::of::<File>() }
    fn wire_code(&self) -> WireCode { WireCode::BLOB }
    fn doc_type(&self) -> DocPropertyType { DocPropertyType::Binary }
    fn describe(&self) -> &'static str { "ScalarTypeFile" }

    fn to_wire(&self, value: Value) -> TypeResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::File(ref p) => std::fs::read(p).map(Value::Bytes).map_err(|e| {
                TypeError::conversion(self.app_type().name(), format!("reading {}: {}", p.display(), e))
            }),
            other => Err(mismatch(self.app_type(), "to_wire", &other)),
        }
    }

    fn from_wire(&self, value: Value) -> TypeResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Bytes(b) => {
                let path = self.dir.join(format!("scalar-lob-{}.tmp", Uuid::new_v4()));
                std::fs::write(&path, &b).map_err(|e| {
                    TypeError::conversion(self.app_type().name(), format!("writing {}: {}", path.display(), e))
                })?;
                Ok(Value::File(path))
            }
            other => Err(mismatch(self.app_type(), "from_wire", &other)),
        }
    }
}
