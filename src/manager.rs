//! Type registry and resolution.
//!
//! `TypeManager` owns two indices: application type -> entry and wire code -> entry.
//! Both are filled once at construction (built-ins, then providers) and are read-mostly
//! afterwards. Lookups clone an `Arc` under a shared lock; writes insert fully built entries.

use std::collections::HashMap;
use std::fs::File;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, Local, Month, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::config::TypeConfig;
use crate::enum_mapping::{self, EnumDescriptor, EnumType};
use crate::error::{TypeError, TypeResult};
use crate::provider::{self, LoadReport, ProviderSources};
use crate::scalar::array::{ArrayStrategy, ContainerShape};
use crate::scalar::basic::{self, BoolFlavour};
use crate::scalar::enums::{ScalarTypeEnumMapped, ScalarTypeEnumStandard};
use crate::scalar::json::{self, JsonCodec, JsonStorage, ScalarTypeJsonCollection, ScalarTypeJsonObject, ScalarTypeJsonValue};
use crate::scalar::misc::{self, ScalarTypeFile};
use crate::scalar::temporal::{self, MomentKind, ScalarTypeMoment};
use crate::scalar::{DocPropertyType, ScalarTypeRef};
use crate::type_factory::TypeFactory;
use crate::value::{Capability, TypeKey, Value};
use crate::wire::WireCode;

const LOG: &str = "scalar_registry::manager";

/// One line of the catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRow {
    /// `type` or `native`.
    pub index: &'static str,
    /// Application type name for type rows, wire code name for native rows.
    pub key: String,
    pub app_type: String,
    pub wire_code: i32,
    pub wire_name: &'static str,
    /// PostgreSQL OID a pgwire frontend would describe the column with.
    pub pg_oid: i32,
    pub implementation: &'static str,
    pub length: u32,
    pub doc_type: DocPropertyType,
}

#[derive(Debug)]
pub struct TypeManager {
    config: TypeConfig,
    factory: TypeFactory,
    bool_flavour: BoolFlavour,
    codec: Option<Arc<JsonCodec>>,
    types: RwLock<HashMap<TypeKey, ScalarTypeRef>>,
    natives: RwLock<HashMap<WireCode, ScalarTypeRef>>,
    file_type: ScalarTypeRef,
}

impl TypeManager {
    /// Registry with every built-in entry for `config`. Fails only on an inconsistent platform descriptor.
    pub fn new(config: TypeConfig) -> TypeResult<Self> {
        let factory = TypeFactory::new(&config);
        let bool_flavour = factory.bool_flavour()?;
        let codec = config.json_codec.then(|| Arc::new(JsonCodec::new()));
        let tm = Self {
            config,
            factory,
            bool_flavour,
            codec,
            types: RwLock::new(HashMap::new()),
            natives: RwLock::new(HashMap::new()),
            file_type: Arc::new(ScalarTypeFile::new()),
        };
        tm.init_standard()?;
        tm.init_chrono();
        #[cfg(feature = "time-types")]
        tm.init_time_types();
        tm.init_json();
        info!(target: LOG, "type registry ready for {:?}: {} types, {} native codes", tm.config.platform.platform, tm.type_count(), tm.native_count());
        Ok(tm)
    }

    pub fn config(&self) -> &TypeConfig { &self.config }

    /// Shared codec, when enabled.
    pub fn codec(&self) -> Option<Arc<JsonCodec>> { self.codec.clone() }

    fn codec_or_default(&self) -> Arc<JsonCodec> { self.codec.clone().unwrap_or_default() }

    pub fn type_count(&self) -> usize { self.types.read().len() }
    pub fn native_count(&self) -> usize { self.natives.read().len() }

    /// Every code in the wire index, aliases included, in ascending order.
    pub fn native_codes(&self) -> Vec<WireCode> {
        let mut codes: Vec<WireCode> = self.natives.read().keys().copied().collect();
        codes.sort();
        codes
    }

    pub(crate) fn put_type(&self, entry: ScalarTypeRef) {
        trace!(target: LOG, "type {} -> {}", entry.app_type().name(), entry.describe());
        self.types.write().insert(entry.app_type(), entry);
    }

    /// Set the wire index for `code` explicitly.
    pub fn register_native(&self, code: WireCode, entry: ScalarTypeRef) {
        trace!(target: LOG, "native {} -> {}", code, entry.describe());
        self.natives.write().insert(code, entry);
    }

    /// Insert or replace by application type, and by wire code unless it is NULL.
    pub fn register(&self, entry: ScalarTypeRef) {
        let code = entry.wire_code();
        if code != WireCode::NULL {
            self.register_native(code, entry.clone());
        }
        self.put_type(entry);
    }

    /// Register `entry` under every distinct key of the enum's members.
    pub fn register_enum(&self, entry: ScalarTypeRef, desc: &EnumDescriptor) {
        let keys = desc.keys();
        debug!(target: LOG, "enum {} registered under {} key(s)", desc.key.short_name(), keys.len());
        let mut types = self.types.write();
        for k in keys {
            types.insert(k, entry.clone());
        }
    }

    pub fn resolve_by_type(&self, key: TypeKey) -> TypeResult<Option<ScalarTypeRef>> {
        if let Some(e) = self.types.read().get(&key) {
            return Ok(Some(e.clone()));
        }
        if key.capability() == Some(Capability::Path) {
            return Ok(self.types.read().get(&TypeKey::of::<PathBuf>()).cloned());
        }
        #[cfg(feature = "time-types")]
        if key == TypeKey::of::<time::Time>() && self.config.time_local_time_mode.is_none() {
            return Err(TypeError::missing_mode(key.name(), format!(
                "{} needs a local time mode; set time_local_time_mode to 'normal' or 'utc'", key.short_name())));
        }
        Ok(None)
    }

    pub fn resolve_by_wire_code(&self, code: WireCode) -> Option<ScalarTypeRef> {
        self.natives.read().get(&code).cloned()
    }

    /// Entry for `key` stored at `code`. NULL (0) accepts whatever the type is registered with.
    pub fn resolve_by_type_and_wire_code(&self, key: TypeKey, code: WireCode) -> TypeResult<ScalarTypeRef> {
        if key == TypeKey::of::<File>() {
            return Ok(self.file_type.clone());
        }
        if code.is_multi_representation() {
            if let Some(e) = self.resolve_by_wire_code(code) {
                return Ok(e);
            }
        }
        if let Some(e) = self.types.read().get(&key) {
            if code == WireCode::NULL || e.wire_code() == code {
                return Ok(e.clone());
            }
        }
        if let Some(e) = self.factory.create_moment(key, code)? {
            return Ok(e);
        }
        Err(TypeError::unmatched(key.name(), code))
    }

    /// `value` converted for storage at `code`; unchanged when no entry handles that code.
    pub fn convert(&self, value: Value, code: WireCode) -> TypeResult<Value> {
        match self.resolve_by_wire_code(code) {
            Some(e) => e.to_wire(value),
            None => Ok(value),
        }
    }

    /// hstore on Postgres, a JSON map in VARCHAR elsewhere.
    pub fn hstore_scalar_type(&self) -> ScalarTypeRef {
        if self.config.platform.is_postgres() {
            return json::hstore();
        }
        Arc::new(ScalarTypeJsonCollection::map(TypeKey::of::<String>(), JsonStorage::Varchar, self.codec_or_default()))
    }

    pub fn array_scalar_type(&self, shape: &ContainerShape, element: TypeKey) -> TypeResult<ScalarTypeRef> {
        let element_type = self.resolve_by_type(element)?;
        ArrayStrategy::for_platform(&self.config.platform).scalar_type(shape, element, element_type, self.codec_or_default())
    }

    /// JSON-backed entry for `shape` stored at `code` (VARCHAR, CLOB, BLOB, JSON or JSONB).
    pub fn json_scalar_type(&self, shape: &ContainerShape, element: TypeKey, code: WireCode) -> TypeResult<ScalarTypeRef> {
        let storage = JsonStorage::for_code(code, &self.config.platform)
            .ok_or_else(|| TypeError::unmatched(format!("{}<{}>", shape.name(), element.name()), code))?;
        match shape {
            ContainerShape::Other(_) if element == TypeKey::of::<JsonValue>() => {
                Ok(Arc::new(ScalarTypeJsonValue::new(storage, self.codec_or_default())))
            }
            ContainerShape::Other(name) => {
                let codec = self.codec.clone().ok_or_else(|| TypeError::unsupported_shape(name.clone(), format!(
                    "{} of {} needs the JSON codec, which is disabled", name, element.name())))?;
                Ok(Arc::new(ScalarTypeJsonObject::new(element, storage, codec)))
            }
            _ => Ok(Arc::new(ScalarTypeJsonCollection::new(shape.clone(), element, storage, self.codec_or_default())?)),
        }
    }

    /// Override-driven enum entry, or `None` when the enum declares no overrides.
    pub fn create_enum_scalar_type(&self, desc: &EnumDescriptor) -> TypeResult<Option<ScalarTypeRef>> {
        Ok(enum_mapping::build(desc)?.map(|m| Arc::new(ScalarTypeEnumMapped::new(m)) as ScalarTypeRef))
    }

    pub fn enum_scalar_type_or_standard(&self, desc: &EnumDescriptor, enum_type: EnumType) -> TypeResult<ScalarTypeRef> {
        match self.create_enum_scalar_type(desc)? {
            Some(e) => Ok(e),
            None => Ok(Arc::new(ScalarTypeEnumStandard::new(desc, enum_type))),
        }
    }

    /// DDL (true, false) literals of the platform's boolean storage.
    pub fn boolean_literals(&self) -> (&'static str, &'static str) { self.bool_flavour.literals() }

    pub fn load_providers(&self, sources: ProviderSources) -> TypeResult<LoadReport> {
        let report = provider::load(self, sources)?;
        info!(target: LOG, "providers loaded: {} registered, {} skipped", report.registered.len(), report.skipped.len());
        Ok(report)
    }

    /// Snapshot of both indices, sorted by index then key.
    pub fn catalog(&self) -> Vec<CatalogRow> {
        let row = |index: &'static str, key: String, e: &ScalarTypeRef| CatalogRow {
            index,
            key,
            app_type: e.app_type().name().to_string(),
            wire_code: e.wire_code().0,
            wire_name: e.wire_code().name(),
            pg_oid: e.wire_code().pg_oid(),
            implementation: e.describe(),
            length: e.length(),
            doc_type: e.doc_type(),
        };
        let mut rows: Vec<CatalogRow> = self.types.read().iter().map(|(k, e)| row("type", k.name().to_string(), e)).collect();
        rows.extend(self.natives.read().iter().map(|(c, e)| row("native", c.to_string(), e)));
        rows.sort_by(|a, b| a.index.cmp(b.index).then_with(|| a.key.cmp(&b.key)));
        rows
    }

    /// Entry for an alias code: CLOB/BLOB map onto whatever the platform stores them as.
    fn lob_alias(&self, lob: WireCode, platform_code: WireCode, own: ScalarTypeRef) -> TypeResult<ScalarTypeRef> {
        if platform_code == lob {
            return Ok(own);
        }
        self.resolve_by_wire_code(platform_code).ok_or_else(|| TypeError::config(format!(
            "platform {} code {} has no native scalar type", lob.name(), platform_code)))
    }

    fn init_standard(&self) -> TypeResult<()> {
        let boolean = self.factory.create_boolean()?;
        self.put_type(boolean.clone());
        self.register_native(WireCode::BOOLEAN, boolean.clone());
        if self.bool_flavour == BoolFlavour::Bit {
            self.register_native(WireCode::BIT, boolean);
        }

        for e in [basic::tinyint(), basic::smallint(), basic::integer(), basic::bigint()] {
            self.register(e);
        }
        let (real, double) = (basic::real(), basic::double());
        self.register(real.clone());
        self.register(double.clone());
        self.register_native(WireCode::FLOAT, double);
        self.register_native(WireCode::REAL, real);

        let decimal = basic::decimal();
        self.register(decimal.clone());
        self.register_native(WireCode::NUMERIC, decimal);
        self.put_type(self.factory.create_big_integer());

        let varchar = basic::string(WireCode::VARCHAR);
        self.put_type(varchar.clone());
        self.register_native(WireCode::VARCHAR, varchar);
        self.register_native(WireCode::CHAR, basic::string(WireCode::CHAR));
        self.register_native(WireCode::LONGVARCHAR, basic::string(WireCode::LONGVARCHAR));
        let clob = self.lob_alias(WireCode::CLOB, self.config.platform.clob_code, basic::string(WireCode::CLOB))?;
        self.register_native(WireCode::CLOB, clob);
        self.put_type(basic::character());

        let varbinary = basic::bytes(WireCode::VARBINARY);
        self.put_type(varbinary.clone());
        self.register_native(WireCode::VARBINARY, varbinary);
        self.register_native(WireCode::BINARY, basic::bytes(WireCode::BINARY));
        self.register_native(WireCode::LONGVARBINARY, basic::bytes(WireCode::LONGVARBINARY));
        let blob = self.lob_alias(WireCode::BLOB, self.config.platform.blob_code, basic::bytes(WireCode::BLOB))?;
        self.register_native(WireCode::BLOB, blob);

        self.put_type(misc::uuid(self.factory.uuid_storage()));
        self.put_type(self.file_type.clone());
        self.put_type(misc::inet());
        self.put_type(misc::path());
        self.put_type(misc::offset());

        let mode = self.config.json_date_time;
        for kind in [MomentKind::SystemTime, MomentKind::Local] {
            self.put_type(Arc::new(ScalarTypeMoment::new(kind, WireCode::TIMESTAMP, mode)?));
        }
        debug!(target: LOG, "standard types registered, boolean as {:?}, uuid as {:?}", self.bool_flavour, self.factory.uuid_storage());
        Ok(())
    }

    fn init_chrono(&self) {
        let mode = self.config.json_date_time;
        self.register(temporal::date());
        self.put_type(temporal::time(self.config.local_time_with_nanos));
        self.register_native(WireCode::TIME, temporal::time(false));
        self.register(temporal::timestamp(mode));
        self.put_type(temporal::timestamp_utc(mode));
        self.register(temporal::timestamp_tz(mode));
        self.put_type(temporal::duration(self.config.duration_with_nanos));
        self.put_type(misc::weekday());
        self.put_type(misc::month());
        debug!(target: LOG, "chrono types registered (time nanos={}, duration nanos={})", self.config.local_time_with_nanos, self.config.duration_with_nanos);
    }

    #[cfg(feature = "time-types")]
    fn init_time_types(&self) {
        use crate::scalar::time_types;
        let mode = self.config.json_date_time;
        self.put_type(time_types::date());
        self.put_type(time_types::primitive_date_time(mode));
        self.put_type(time_types::offset_date_time(mode));
        if let Some(local) = self.config.time_local_time_mode {
            self.put_type(time_types::time_of_day(local));
        }
        debug!(target: LOG, "time crate types registered (local time mode {:?})", self.config.time_local_time_mode);
    }

    fn init_json(&self) {
        let codec = self.codec_or_default();
        if self.config.platform.is_postgres() {
            let json = Arc::new(ScalarTypeJsonValue::new(JsonStorage::Json, codec.clone()));
            self.put_type(json.clone());
            self.register_native(WireCode::JSON, json);
            self.register_native(WireCode::JSONB, Arc::new(ScalarTypeJsonValue::new(JsonStorage::Jsonb, codec)));
        } else {
            self.put_type(Arc::new(ScalarTypeJsonValue::new(JsonStorage::Clob, codec)));
        }
        self.register_native(WireCode::HSTORE, json::hstore());
        debug!(target: LOG, "json types registered");
    }
}

/// Keys of every built-in application type for `config`.
pub fn builtin_keys(config: &TypeConfig) -> Vec<TypeKey> {
    let mut keys = vec![
        TypeKey::of::<bool>(), TypeKey::of::<i8>(), TypeKey::of::<i16>(), TypeKey::of::<i32>(), TypeKey::of::<i64>(),
        TypeKey::of::<f32>(), TypeKey::of::<f64>(), TypeKey::of::<BigDecimal>(), TypeKey::of::<bigdecimal::num_bigint::BigInt>(),
        TypeKey::of::<String>(), TypeKey::of::<char>(), TypeKey::of::<Vec<u8>>(), TypeKey::of::<Uuid>(),
        TypeKey::of::<File>(), TypeKey::of::<IpAddr>(), TypeKey::of::<PathBuf>(), TypeKey::of::<FixedOffset>(),
        TypeKey::of::<SystemTime>(), TypeKey::of::<DateTime<Local>>(),
        TypeKey::of::<NaiveDate>(), TypeKey::of::<NaiveTime>(), TypeKey::of::<NaiveDateTime>(),
        TypeKey::of::<DateTime<Utc>>(), TypeKey::of::<DateTime<FixedOffset>>(), TypeKey::of::<chrono::Duration>(),
        TypeKey::of::<Weekday>(), TypeKey::of::<Month>(), TypeKey::of::<JsonValue>(),
    ];
    #[cfg(feature = "time-types")]
    {
        keys.extend([TypeKey::of::<time::Date>(), TypeKey::of::<time::PrimitiveDateTime>(), TypeKey::of::<time::OffsetDateTime>()]);
        if config.time_local_time_mode.is_some() {
            keys.push(TypeKey::of::<time::Time>());
        }
    }
    #[cfg(not(feature = "time-types"))]
    let _ = config;
    keys
}
