//! Platform array strategy: native ARRAY columns where the platform has them,
//! JSON text in VARCHAR everywhere else.

use std::sync::Arc;

use tracing::debug;

use super::json::{dedupe, JsonCodec, JsonStorage, ScalarTypeJsonCollection};
use super::{mismatch, DocPropertyType, ScalarType, ScalarTypeRef};
use crate::error::{TypeError, TypeResult};
use crate::platform::{DatabasePlatform, Platform};
use crate::value::{TypeKey, Value};
use crate::wire::WireCode;

/// Container shape of a requested collection type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerShape {
    List,
    Set,
    Map,
    /// Anything else, by name (e.g. `VecDeque`); rejected for collection storage.
    Other(String),
}

impl ContainerShape {
    pub fn name(&self) -> String {
        match self {
            ContainerShape::List => "List".into(),
            ContainerShape::Set => "Set".into(),
            ContainerShape::Map => "Map".into(),
            ContainerShape::Other(n) => n.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayStrategy {
    Native,
    /// Native arrays with H2 column definitions.
    NativeH2,
    /// JSON text in VARCHAR.
    JsonVarchar,
}

impl ArrayStrategy {
    pub fn for_platform(platform: &DatabasePlatform) -> ArrayStrategy {
        match (platform.native_array, platform.is_platform(Platform::H2)) {
            (false, _) => ArrayStrategy::JsonVarchar,
            (true, true) => ArrayStrategy::NativeH2,
            (true, false) => ArrayStrategy::Native,
        }
    }

    /// Entry for a collection of `element` values. `element_type` converts individual
    /// elements of native arrays when the element type is registered.
    pub fn scalar_type(&self, shape: &ContainerShape, element: TypeKey, element_type: Option<ScalarTypeRef>, codec: Arc<JsonCodec>) -> TypeResult<ScalarTypeRef> {
        debug!(target: "scalar_registry::array", "array type {:?} of {} via {:?}", shape, element.short_name(), self);
        match (shape, self) {
            (ContainerShape::Other(name), _) => Err(TypeError::unsupported_shape(name.clone(), format!("unsupported collection shape {} for element {}", name, element.name()))),
            (ContainerShape::Map, _) | (_, ArrayStrategy::JsonVarchar) => {
                Ok(Arc::new(ScalarTypeJsonCollection::new(shape.clone(), element, JsonStorage::Varchar, codec)?))
            }
            (_, strategy) => Ok(Arc::new(ScalarTypeArray { set: *shape == ContainerShape::Set, element, element_type, h2: *strategy == ArrayStrategy::NativeH2 })),
        }
    }
}

/// Native ARRAY column holding a list or set.
#[derive(Debug, Clone)]
pub struct ScalarTypeArray {
    set: bool,
    element: TypeKey,
    element_type: Option<ScalarTypeRef>,
    h2: bool,
}

impl ScalarTypeArray {
    pub fn element(&self) -> TypeKey { self.element }

    /// Column definition for the element's wire code, e.g. `integer[]` or `integer array`.
    pub fn column_definition(&self) -> String {
        let base = self.element_type.as_ref().map(|e| e.wire_code().name().to_ascii_lowercase()).unwrap_or_else(|| "varchar".into());
        if self.h2 { format!("{} array", base) } else { format!("{}[]", base) }
    }

    /// PostgreSQL array OID for the element's wire code; `text[]` when the element is unregistered.
    pub fn pg_array_oid(&self) -> i32 {
        self.element_type.as_ref().map(|e| e.wire_code().pg_array_oid()).unwrap_or_else(|| WireCode::VARCHAR.pg_array_oid())
    }

    fn each(&self, items: Vec<Value>, to_wire: bool) -> TypeResult<Vec<Value>> {
        let items = if self.set { dedupe(items) } else { items };
        match &self.element_type {
            None => Ok(items),
            Some(e) => items.into_iter().map(|v| if to_wire { e.to_wire(v) } else { e.from_wire(v) }).collect(),
        }
    }
}

impl ScalarType for ScalarTypeArray {
    fn app_type(&self) -> TypeKey { if self.set { TypeKey::of::<std::collections::BTreeSet<Value>>() } else { TypeKey::of::<Vec<Value>>() } }
    fn wire_code(&self) -> WireCode { WireCode::ARRAY }
    fn doc_type(&self) -> DocPropertyType { DocPropertyType::List }
    fn describe(&self) -> &'static str {
        match (self.set, self.h2) {
            (false, false) => "ScalarTypeArrayList",
            (true, false) => "ScalarTypeArraySet",
            (false, true) => "ScalarTypeArrayListH2",
            (true, true) => "ScalarTypeArraySetH2",
        }
    }

    fn to_wire(&self, value: Value) -> TypeResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::List(items) => self.each(items, true).map(Value::List),
            other => Err(mismatch(self.app_type(), "to_wire", &other)),
        }
    }

    fn from_wire(&self, value: Value) -> TypeResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::List(items) => self.each(items, false).map(Value::List),
            other => Err(mismatch(self.app_type(), "from_wire", &other)),
        }
    }
}
