//! Enum entries: override-driven mappings and the standard ordinal/name coding.
//! Application values are `Value::Enum(member name)`.

use super::{mismatch, DocPropertyType, ScalarType};
use crate::enum_mapping::{EnumDescriptor, EnumMapping, EnumType};
use crate::error::{TypeError, TypeResult};
use crate::value::{TypeKey, Value};
use crate::wire::WireCode;

fn member_name(v: &Value) -> Option<&str> {
    match v {
        Value::Enum(s) | Value::Text(s) => Some(s.as_str()),
        _ => None,
    }
}

fn wire_text(v: &Value) -> Option<String> {
    match v {
        Value::Text(s) => Some(s.clone()),
        other => other.as_i64().map(|n| n.to_string()),
    }
}

/// Enum stored through an explicit value mapping.
#[derive(Debug, Clone)]
pub struct ScalarTypeEnumMapped {
    mapping: EnumMapping,
}

impl ScalarTypeEnumMapped {
    pub fn new(mapping: EnumMapping) -> Self { Self { mapping } }
    pub fn mapping(&self) -> &EnumMapping { &self.mapping }

    fn unknown(&self, what: &str, v: &str) -> TypeError {
        TypeError::conversion(self.mapping.enum_key.name(), format!("{} has no member with {} '{}'", self.mapping.enum_key.short_name(), what, v))
    }
}

impl ScalarType for ScalarTypeEnumMapped {
    fn app_type(&self) -> TypeKey { self.mapping.enum_key }
    fn wire_code(&self) -> WireCode { if self.mapping.integer { WireCode::INTEGER } else { WireCode::VARCHAR } }
    fn doc_type(&self) -> DocPropertyType { DocPropertyType::Enum }
    fn describe(&self) -> &'static str { if self.mapping.integer { "ScalarTypeEnumInteger" } else { "ScalarTypeEnumString" } }
    fn length(&self) -> u32 { self.mapping.length }

    fn to_wire(&self, value: Value) -> TypeResult<Value> {
        if value.is_null() { return Ok(Value::Null); }
        let name = member_name(&value).ok_or_else(|| mismatch(self.app_type(), "to_wire", &value))?;
        let stored = self.mapping.value_of(name).ok_or_else(|| self.unknown("name", name))?;
        if self.mapping.integer {
            stored.parse::<i32>().map(Value::I32).map_err(|_| self.unknown("integer value", stored))
        } else {
            Ok(Value::Text(stored.to_string()))
        }
    }

    fn from_wire(&self, value: Value) -> TypeResult<Value> {
        if value.is_null() { return Ok(Value::Null); }
        let stored = wire_text(&value).ok_or_else(|| mismatch(self.app_type(), "from_wire", &value))?;
        let found = if self.mapping.integer {
            let n = stored.parse::<i32>().ok();
            self.mapping.values.iter().find(|(_, v)| v.parse::<i32>().ok() == n && n.is_some()).map(|(m, _)| m.as_str())
        } else {
            self.mapping.member_of(&stored)
        };
        found.map(|m| Value::Enum(m.to_string())).ok_or_else(|| self.unknown("value", &stored))
    }
}

/// Enum stored by ordinal (INTEGER) or by member name (VARCHAR).
#[derive(Debug, Clone)]
pub struct ScalarTypeEnumStandard {
    key: TypeKey,
    names: Vec<String>,
    ordinal: bool,
}

impl ScalarTypeEnumStandard {
    pub fn new(desc: &EnumDescriptor, enum_type: EnumType) -> Self {
        Self { key: desc.key, names: desc.member_names(), ordinal: enum_type == EnumType::Ordinal }
    }

    fn unknown(&self, v: &Value) -> TypeError {
        TypeError::conversion(self.key.name(), format!("{} has no member for {:?}", self.key.short_name(), v))
    }
}

impl ScalarType for ScalarTypeEnumStandard {
    fn app_type(&self) -> TypeKey { self.key }
    fn wire_code(&self) -> WireCode { if self.ordinal { WireCode::INTEGER } else { WireCode::VARCHAR } }
    fn doc_type(&self) -> DocPropertyType { DocPropertyType::Enum }
    fn describe(&self) -> &'static str { if self.ordinal { "ScalarTypeEnumStandardOrdinal" } else { "ScalarTypeEnumStandardString" } }
    fn length(&self) -> u32 {
        if self.ordinal { 0 } else { self.names.iter().map(|n| n.chars().count() as u32).max().unwrap_or(0) }
    }

    fn to_wire(&self, value: Value) -> TypeResult<Value> {
        if value.is_null() { return Ok(Value::Null); }
        let name = member_name(&value).ok_or_else(|| mismatch(self.key, "to_wire", &value))?;
        let idx = self.names.iter().position(|n| n == name).ok_or_else(|| self.unknown(&value))?;
        Ok(if self.ordinal { Value::I32(idx as i32) } else { Value::Text(name.to_string()) })
    }

    fn from_wire(&self, value: Value) -> TypeResult<Value> {
        if value.is_null() { return Ok(Value::Null); }
        let found = if self.ordinal {
            value.as_i64().and_then(|i| usize::try_from(i).ok()).and_then(|i| self.names.get(i))
        } else {
            value.as_str().and_then(|s| self.names.iter().find(|n| *n == s))
        };
        found.map(|n| Value::Enum(n.clone())).ok_or_else(|| self.unknown(&value))
    }
}
