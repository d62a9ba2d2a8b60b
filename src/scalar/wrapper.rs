//! Converter-backed entries: a logical type persisted through an existing entry.

use std::fmt::Debug;
use std::sync::Arc;

use super::{DocPropertyType, ScalarType, ScalarTypeRef};
use crate::error::{TypeError, TypeResult};
use crate::value::{TypeKey, Value};
use crate::wire::WireCode;

/// Two-way conversion between a logical value and the value of its persisted type.
pub trait ValueConverter: Send + Sync + Debug {
    /// Persisted -> logical.
    fn wrap(&self, persisted: Value) -> TypeResult<Value>;
    /// Logical -> persisted.
    fn unwrap(&self, logical: Value) -> TypeResult<Value>;
}

/// Attribute-style converter as written by application code; failures are plain `anyhow` errors.
pub trait AttributeConverter: Send + Sync + Debug {
    fn to_column(&self, attribute: Value) -> anyhow::Result<Value>;
    fn to_attribute(&self, column: Value) -> anyhow::Result<Value>;
}

/// Presents an `AttributeConverter` as a `ValueConverter`.
#[derive(Debug)]
pub struct AttributeConverterAdapter<C> {
    name: String,
    inner: C,
}

impl<C: AttributeConverter> AttributeConverterAdapter<C> {
    pub fn new<S: Into<String>>(name: S, inner: C) -> Self { Self { name: name.into(), inner } }
}

impl<C: AttributeConverter> ValueConverter for AttributeConverterAdapter<C> {
    fn wrap(&self, persisted: Value) -> TypeResult<Value> {
        self.inner.to_attribute(persisted).map_err(|e| TypeError::conversion(self.name.as_str(), format!("{:#}", e)))
    }

    fn unwrap(&self, logical: Value) -> TypeResult<Value> {
        self.inner.to_column(logical).map_err(|e| TypeError::conversion(self.name.as_str(), format!("{:#}", e)))
    }
}

/// Logical type stored through the entry of its persisted type.
#[derive(Debug, Clone)]
pub struct ScalarTypeWrapper {
    logical: TypeKey,
    inner: ScalarTypeRef,
    converter: Arc<dyn ValueConverter>,
}

impl ScalarTypeWrapper {
    pub fn new(logical: TypeKey, inner: ScalarTypeRef, converter: Arc<dyn ValueConverter>) -> Self {
        Self { logical, inner, converter }
    }

    pub fn inner(&self) -> &ScalarTypeRef { &self.inner }
}

impl ScalarType for ScalarTypeWrapper {
    fn app_type(&self) -> TypeKey { self.logical }
    fn wire_code(&self) -> WireCode { self.inner.wire_code() }
    fn doc_type(&self) -> DocPropertyType { self.inner.doc_type() }
    fn describe(&self) -> &'static str { "ScalarTypeWrapper" }
    fn length(&self) -> u32 { self.inner.length() }

    fn to_wire(&self, value: Value) -> TypeResult<Value> {
        if value.is_null() { return Ok(Value::Null); }
        self.inner.to_wire(self.converter.unwrap(value)?)
    }

    fn from_wire(&self, value: Value) -> TypeResult<Value> {
        if value.is_null() { return Ok(Value::Null); }
        self.converter.wrap(self.inner.from_wire(value)?)
    }
}
