//! Enum mapping builder.
//!
//! Decides how an enum is stored from the overrides it declares. A method-level override
//! (`DbEnum::db_value`) beats a field-level one (`DbEnum::enum_value`); with neither, the enum
//! gets no mapping and the caller falls back to ordinal or name coding.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{TypeError, TypeResult};
use crate::value::TypeKey;

/// Declared storage of a method-level mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbEnumStorage {
    Integer,
    Varchar,
}

/// Standard coding for enums without overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnumType {
    Ordinal,
    #[default]
    String,
}

/// A closed set of enum members with optional storage overrides.
///
/// ```ignore
/// enum Status { Active, Gone }
/// impl DbEnum for Status {
///     fn members() -> Vec<Self> { vec![Status::Active, Status::Gone] }
///     fn name(&self) -> &'static str { match self { Status::Active => "Active", Status::Gone => "Gone" } }
///     fn enum_value(&self) -> Option<&'static str> { Some(match self { Status::Active => "A", Status::Gone => "G" }) }
/// }
/// ```
pub trait DbEnum: Sized + 'static {
    fn members() -> Vec<Self>;
    fn name(&self) -> &'static str;

    /// Method-level override.
    fn db_value(&self) -> Option<String> { None }
    fn db_value_storage() -> DbEnumStorage { DbEnumStorage::Varchar }
    /// Explicit column length for a string-coded method-level mapping; 0 derives it.
    fn db_value_length() -> u32 { 0 }

    /// Field-level override.
    fn enum_value(&self) -> Option<&'static str> { None }

    /// Concrete key a member is registered under. Members carrying their own data
    /// shape can name a distinct key; by default every member shares the enum's key.
    fn member_key(&self) -> TypeKey { TypeKey::of::<Self>() }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub db_value: Option<String>,
    pub enum_value: Option<String>,
    pub key: Option<TypeKey>,
}

impl EnumMember {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into(), db_value: None, enum_value: None, key: None }
    }
    pub fn db_value<S: Into<String>>(mut self, v: S) -> Self { self.db_value = Some(v.into()); self }
    pub fn enum_value<S: Into<String>>(mut self, v: S) -> Self { self.enum_value = Some(v.into()); self }
    pub fn key(mut self, key: TypeKey) -> Self { self.key = Some(key); self }
}

/// Reflection-free description of an enum: its key, members in ordinal order and overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub key: TypeKey,
    pub members: Vec<EnumMember>,
    pub storage: DbEnumStorage,
    pub length: u32,
}

impl EnumDescriptor {
    pub fn new(key: TypeKey) -> Self {
        Self { key, members: Vec::new(), storage: DbEnumStorage::Varchar, length: 0 }
    }

    pub fn of<E: DbEnum>() -> Self {
        let key = TypeKey::of::<E>();
        let members = E::members().iter().map(|m| EnumMember {
            name: m.name().to_string(),
            db_value: m.db_value(),
            enum_value: m.enum_value().map(str::to_string),
            key: Some(m.member_key()).filter(|k| *k != key),
        }).collect();
        Self { key, members, storage: E::db_value_storage(), length: E::db_value_length() }
    }

    pub fn member(mut self, m: EnumMember) -> Self { self.members.push(m); self }
    pub fn storage(mut self, s: DbEnumStorage) -> Self { self.storage = s; self }
    pub fn length(mut self, n: u32) -> Self { self.length = n; self }

    /// Distinct keys to register under, the enum's own key first.
    pub fn keys(&self) -> Vec<TypeKey> {
        let mut out = vec![self.key];
        for k in self.members.iter().filter_map(|m| m.key) {
            if !out.contains(&k) { out.push(k); }
        }
        out
    }

    pub fn member_names(&self) -> Vec<String> { self.members.iter().map(|m| m.name.clone()).collect() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingSource {
    Method,
    Field,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMapping {
    pub enum_key: TypeKey,
    /// (member name, stored value) in ordinal order; members without a value are absent.
    pub values: Vec<(String, String)>,
    pub integer: bool,
    pub length: u32,
    pub source: MappingSource,
}

impl EnumMapping {
    pub fn value_of(&self, member: &str) -> Option<&str> {
        self.values.iter().find(|(n, _)| n == member).map(|(_, v)| v.as_str())
    }

    pub fn member_of(&self, stored: &str) -> Option<&str> {
        self.values.iter().find(|(_, v)| v == stored).map(|(n, _)| n.as_str())
    }
}

/// True when `s` is an `i32` without a leading zero ("0" itself is fine).
pub fn is_integer_value(s: &str) -> bool {
    if s.len() > 1 && s.starts_with('0') { return false; }
    s.parse::<i32>().is_ok()
}

fn max_len(values: &[(String, String)]) -> u32 {
    values.iter().map(|(_, v)| v.chars().count() as u32).max().unwrap_or(0)
}

/// Mapping for `desc`, or `None` when it declares no overrides.
pub fn build(desc: &EnumDescriptor) -> TypeResult<Option<EnumMapping>> {
    let enum_name = desc.key.name();
    if desc.members.iter().any(|m| m.db_value.is_some()) {
        let mut values = Vec::with_capacity(desc.members.len());
        for m in &desc.members {
            let v = m.db_value.clone().ok_or_else(|| {
                TypeError::enum_mapping(enum_name, format!("{} has a method-level value for some members but not for {}", enum_name, m.name))
            })?;
            values.push((m.name.clone(), v));
        }
        let integer = desc.storage == DbEnumStorage::Integer;
        if integer {
            if let Some((n, v)) = values.iter().find(|(_, v)| v.parse::<i32>().is_err()) {
                return Err(TypeError::enum_mapping(enum_name, format!("{}.{} value '{}' is not an integer", enum_name, n, v)));
            }
        }
        let length = if integer { 0 } else if desc.length > 0 { desc.length } else { max_len(&values) };
        trace!(target: "scalar_registry::enum_mapping", "{} method-level mapping integer={} length={}", enum_name, integer, length);
        return Ok(Some(EnumMapping { enum_key: desc.key, values, integer, length, source: MappingSource::Method }));
    }

    if desc.members.iter().any(|m| m.enum_value.is_some()) {
        // unannotated members have no stored value
        let values: Vec<(String, String)> = desc.members.iter()
            .filter_map(|m| m.enum_value.clone().map(|v| (m.name.clone(), v)))
            .collect();
        let integer = values.iter().all(|(_, v)| is_integer_value(v));
        let length = if integer { 0 } else { max_len(&values) };
        trace!(target: "scalar_registry::enum_mapping", "{} field-level mapping integer={} length={}", enum_name, integer, length);
        return Ok(Some(EnumMapping { enum_key: desc.key, values, integer, length, source: MappingSource::Field }));
    }

    Ok(None)
}
