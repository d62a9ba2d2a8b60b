//! Scalar type registry: maps application value types onto database wire types and
//! converts values between the two representations.

pub mod wire;
pub mod value;
pub mod platform;
pub mod config;
pub mod error;
pub mod scalar;
pub mod enum_mapping;
pub mod type_factory;
pub mod provider;
pub mod manager;

pub use config::{DbUuid, JsonDateTime, LocalTimeMode, TypeConfig};
pub use error::{TypeError, TypeResult};
pub use manager::{CatalogRow, TypeManager};
pub use platform::{DatabasePlatform, Platform};
pub use provider::{ConverterPlugin, CustomScalarType, LoadReport, ProviderSources, TypeProvider};
pub use scalar::{DocPropertyType, ScalarType, ScalarTypeRef};
pub use value::{TypeKey, Value};
pub use wire::WireCode;
