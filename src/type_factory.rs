//! Builds the entries whose shape depends on the platform or configuration.

use std::sync::Arc;

use tracing::trace;

use crate::config::TypeConfig;
use crate::error::{TypeError, TypeResult};
use crate::scalar::basic::{self, BoolFlavour};
use crate::scalar::misc::UuidStorage;
use crate::scalar::temporal::{MomentKind, ScalarTypeMoment};
use crate::scalar::ScalarTypeRef;
use crate::value::TypeKey;
use crate::wire::WireCode;

#[derive(Debug, Clone)]
pub struct TypeFactory {
    config: TypeConfig,
}

impl TypeFactory {
    pub fn new(config: &TypeConfig) -> Self { Self { config: config.clone() } }

    pub fn bool_flavour(&self) -> TypeResult<BoolFlavour> {
        let code = self.config.platform.boolean_code;
        BoolFlavour::for_code(code).ok_or_else(|| TypeError::config(format!("unsupported boolean wire code {}", code)))
    }

    pub fn create_boolean(&self) -> TypeResult<ScalarTypeRef> {
        Ok(basic::boolean(self.bool_flavour()?))
    }

    pub fn create_big_integer(&self) -> ScalarTypeRef { basic::big_integer() }

    /// Native when generating offline or when the platform has it and it is allowed;
    /// otherwise binary or varchar as configured.
    pub fn uuid_storage(&self) -> UuidStorage {
        let db_uuid = self.config.db_uuid;
        if self.config.offline_migration || (self.config.platform.native_uuid && db_uuid.use_native_type()) {
            UuidStorage::Native
        } else if db_uuid.use_binary() {
            UuidStorage::Binary
        } else {
            UuidStorage::Varchar
        }
    }

    /// Entry projecting a legacy moment type onto `code`; `None` when `key` is not one.
    pub fn create_moment(&self, key: TypeKey, code: WireCode) -> TypeResult<Option<ScalarTypeRef>> {
        let Some(kind) = MomentKind::of_key(key) else { return Ok(None) };
        trace!(target: "scalar_registry::type_factory", "moment {} at {}", key.short_name(), code);
        let entry: ScalarTypeRef = Arc::new(ScalarTypeMoment::new(kind, code, self.config.json_date_time)?);
        Ok(Some(entry))
    }
}
