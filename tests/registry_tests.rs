//! Registry integration tests: built-in resolution, wire-code lookups, platform-dependent
//! choices and value conversion through the public `TypeManager` surface.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::{Duration as StdDuration, SystemTime, UNIX_EPOCH};

use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, Local, Month, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use scalar_registry::config::{DbUuid, JsonDateTime, LocalTimeMode};
use scalar_registry::manager::builtin_keys;
use scalar_registry::scalar::array::ContainerShape;
use scalar_registry::{DatabasePlatform, TypeConfig, TypeKey, TypeManager, Value, WireCode};

fn manager_for(platform: DatabasePlatform) -> TypeManager {
    match TypeManager::new(TypeConfig::for_platform(platform)) {
        Ok(tm) => tm,
        Err(e) => panic!("registry construction failed: {}", e),
    }
}

fn ts(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, mi, s).unwrap()
}

#[test]
fn every_builtin_resolves_to_itself_on_every_platform() {
    for platform in [DatabasePlatform::generic(), DatabasePlatform::postgres(), DatabasePlatform::h2(), DatabasePlatform::mysql(), DatabasePlatform::sqlite(), DatabasePlatform::sqlserver(), DatabasePlatform::oracle()] {
        let cfg = TypeConfig { time_local_time_mode: Some(LocalTimeMode::Normal), ..TypeConfig::for_platform(platform.clone()) };
        let tm = TypeManager::new(cfg.clone()).unwrap();
        for key in builtin_keys(&cfg) {
            let e = tm.resolve_by_type(key).unwrap().unwrap_or_else(|| panic!("{:?}: no entry for {}", platform.platform, key.name()));
            assert_eq!(e.app_type(), key, "{:?}: {}", platform.platform, key.name());
        }
    }
}

#[test]
fn native_entries_resolve_under_their_own_code() {
    for platform in [DatabasePlatform::postgres(), DatabasePlatform::mysql()] {
        let tm = manager_for(platform);
        for row in tm.catalog().into_iter().filter(|r| r.index == "native") {
            // aliases (CLOB, FLOAT, NUMERIC) point at an entry whose own code is registered too
            let own = WireCode(row.wire_code);
            let e = tm.resolve_by_wire_code(own).unwrap_or_else(|| panic!("native {} has no entry at {}", row.key, own));
            assert_eq!(e.wire_code(), own, "native {}", row.key);
            let again = tm.resolve_by_wire_code(own).unwrap();
            assert!(std::sync::Arc::ptr_eq(&e, &again), "native {}", row.key);
        }
        for code in tm.native_codes() {
            let first = tm.resolve_by_wire_code(code).unwrap();
            assert!(std::sync::Arc::ptr_eq(&first, &tm.resolve_by_wire_code(code).unwrap()), "{}", code);
        }
    }
}

#[test]
fn registered_entries_share_both_indices() {
    let tm = manager_for(DatabasePlatform::generic());
    for key in [TypeKey::of::<i32>(), TypeKey::of::<i64>(), TypeKey::of::<NaiveDate>(), TypeKey::of::<NaiveDateTime>()] {
        let by_type = tm.resolve_by_type(key).unwrap().unwrap();
        let by_code = tm.resolve_by_wire_code(by_type.wire_code()).unwrap();
        assert!(std::sync::Arc::ptr_eq(&by_type, &by_code), "{}", key.name());
    }
}

#[test]
fn representative_values_round_trip() {
    let tm = manager_for(DatabasePlatform::generic());
    let local = Local.from_local_datetime(&ts(2024, 6, 15, 12, 0, 0)).earliest().unwrap();
    let mut cases: Vec<(TypeKey, Value)> = vec![
        (TypeKey::of::<bool>(), Value::Bool(true)),
        (TypeKey::of::<i8>(), Value::I8(-7)),
        (TypeKey::of::<i16>(), Value::I16(1200)),
        (TypeKey::of::<i32>(), Value::I32(-42)),
        (TypeKey::of::<i64>(), Value::I64(9_000_000_000)),
        (TypeKey::of::<f32>(), Value::F32(1.5)),
        (TypeKey::of::<f64>(), Value::F64(-2.25)),
        (TypeKey::of::<BigDecimal>(), Value::Decimal("12.50".parse::<BigDecimal>().unwrap())),
        (TypeKey::of::<BigInt>(), Value::BigInt(BigInt::from(42))),
        (TypeKey::of::<String>(), Value::Text("hello".into())),
        (TypeKey::of::<char>(), Value::Char('x')),
        (TypeKey::of::<Vec<u8>>(), Value::Bytes(vec![0, 1, 254])),
        (TypeKey::of::<Uuid>(), Value::Uuid(Uuid::new_v4())),
        (TypeKey::of::<IpAddr>(), Value::Inet("10.1.2.3".parse().unwrap())),
        (TypeKey::of::<PathBuf>(), Value::Path(PathBuf::from("/var/data/a.bin"))),
        (TypeKey::of::<FixedOffset>(), Value::Offset(FixedOffset::east_opt(2 * 3600).unwrap())),
        (TypeKey::of::<SystemTime>(), Value::SystemTime(UNIX_EPOCH + StdDuration::from_secs(1_700_000_000))),
        (TypeKey::of::<DateTime<Local>>(), Value::TimestampLocal(local)),
        (TypeKey::of::<NaiveDate>(), Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())),
        (TypeKey::of::<NaiveTime>(), Value::Time(NaiveTime::from_hms_opt(23, 59, 1).unwrap())),
        (TypeKey::of::<NaiveDateTime>(), Value::Timestamp(ts(2023, 11, 14, 22, 13, 20))),
        (TypeKey::of::<DateTime<Utc>>(), Value::TimestampUtc(Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap())),
        (TypeKey::of::<DateTime<FixedOffset>>(), Value::TimestampTz(FixedOffset::west_opt(5 * 3600).unwrap().with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap())),
        (TypeKey::of::<chrono::Duration>(), Value::Duration(chrono::Duration::seconds(3725))),
        (TypeKey::of::<Weekday>(), Value::Weekday(Weekday::Sun)),
        (TypeKey::of::<Month>(), Value::Month(Month::December)),
        (TypeKey::of::<JsonValue>(), Value::Json(json!({"a": [1, 2, {"b": null}]}))),
    ];
    #[cfg(feature = "time-types")]
    cases.extend([
        (TypeKey::of::<time::Date>(), Value::TimeDate(time::macros::date!(2020-01-31))),
        (TypeKey::of::<time::PrimitiveDateTime>(), Value::TimePrimitive(time::macros::datetime!(2020-01-31 10:00:00.25))),
        (TypeKey::of::<time::OffsetDateTime>(), Value::TimeOffset(time::macros::datetime!(2020-01-31 10:00:00 -03:30))),
    ]);
    cases.push((TypeKey::of::<String>(), Value::Null));

    for (key, value) in cases {
        let e = tm.resolve_by_type(key).unwrap().unwrap();
        let wire = e.to_wire(value.clone()).unwrap_or_else(|err| panic!("{} to_wire: {}", e.describe(), err));
        let back = e.from_wire(wire).unwrap_or_else(|err| panic!("{} from_wire: {}", e.describe(), err));
        assert_eq!(back, value, "{}", e.describe());
    }
}

#[test]
fn wrong_value_kind_is_a_conversion_error() {
    let tm = manager_for(DatabasePlatform::generic());
    let e = tm.resolve_by_type(TypeKey::of::<i32>()).unwrap().unwrap();
    let err = e.to_wire(Value::Text("nope".into())).unwrap_err();
    assert_eq!(err.code_str(), "conversion");
    assert!(err.message().contains("i32"), "{}", err.message());
}

#[test]
fn moment_types_project_onto_three_codes() {
    let tm = manager_for(DatabasePlatform::generic());
    for key in [TypeKey::of::<SystemTime>(), TypeKey::of::<DateTime<Local>>()] {
        let mut names = Vec::new();
        for code in [WireCode::DATE, WireCode::TIME, WireCode::TIMESTAMP] {
            let e = tm.resolve_by_type_and_wire_code(key, code).unwrap();
            assert_eq!(e.wire_code(), code);
            assert_eq!(e.app_type(), key);
            names.push(e.describe());
        }
        names.dedup();
        assert_eq!(names.len(), 3, "{:?}", names);
        assert_eq!(tm.resolve_by_type_and_wire_code(key, WireCode::VARCHAR).unwrap_err().code_str(), "unmatched_type");
    }

    let st = Value::SystemTime(UNIX_EPOCH + StdDuration::from_secs(1_700_000_000));
    let as_date = tm.resolve_by_type_and_wire_code(TypeKey::of::<SystemTime>(), WireCode::DATE).unwrap();
    assert_eq!(as_date.to_wire(st).unwrap(), Value::Date(NaiveDate::from_ymd_opt(2023, 11, 14).unwrap()));
}

#[test]
fn exact_type_with_other_code_is_unmatched() {
    let tm = manager_for(DatabasePlatform::generic());
    let err = tm.resolve_by_type_and_wire_code(TypeKey::of::<Uuid>(), WireCode::BIGINT).unwrap_err();
    assert_eq!(err.code_str(), "unmatched_type");
    assert!(err.message().contains("BIGINT") || err.message().contains("-5"), "{}", err.message());
    let ok = tm.resolve_by_type_and_wire_code(TypeKey::of::<Uuid>(), WireCode::VARCHAR).unwrap();
    assert_eq!(ok.describe(), "ScalarTypeUUIDVarchar");
}

#[cfg(feature = "time-types")]
#[test]
fn local_time_requires_a_mode() {
    let tm = manager_for(DatabasePlatform::generic());
    let err = tm.resolve_by_type(TypeKey::of::<time::Time>()).unwrap_err();
    assert_eq!(err.code_str(), "missing_mode");
    assert!(!err.is_skippable());
    let err = tm.array_scalar_type(&ContainerShape::List, TypeKey::of::<time::Time>()).unwrap_err();
    assert_eq!(err.code_str(), "missing_mode");

    let cfg = TypeConfig { time_local_time_mode: Some(LocalTimeMode::Utc), ..TypeConfig::default() };
    let tm = TypeManager::new(cfg).unwrap();
    let e = tm.resolve_by_type(TypeKey::of::<time::Time>()).unwrap().unwrap();
    assert_eq!(e.wire_code(), WireCode::TIMESTAMP);
}

#[test]
fn path_like_types_fall_back_to_path_entry() {
    let tm = manager_for(DatabasePlatform::generic());
    let e = tm.resolve_by_type(TypeKey::path_like::<OsString>()).unwrap().unwrap();
    assert_eq!(e.describe(), "ScalarTypePath");
    assert!(tm.resolve_by_type(TypeKey::of::<OsString>()).unwrap().is_none());
    assert!(tm.resolve_by_type(TypeKey::of::<std::collections::VecDeque<u8>>()).unwrap().is_none());
}

#[test]
fn file_round_trip_preserves_content() {
    let tm = manager_for(DatabasePlatform::generic());
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("report.txt");
    std::fs::write(&src, b"quarterly numbers").unwrap();

    let e = tm.resolve_by_type_and_wire_code(TypeKey::of::<std::fs::File>(), WireCode::VARCHAR).unwrap();
    assert_eq!(e.wire_code(), WireCode::BLOB);
    let wire = e.to_wire(Value::File(src.clone())).unwrap();
    assert_eq!(wire, Value::Bytes(b"quarterly numbers".to_vec()));
    let Value::File(back) = e.from_wire(wire).unwrap() else { panic!("expected a file") };
    assert_ne!(back, src);
    assert_eq!(std::fs::read(&back).unwrap(), b"quarterly numbers");
    let _ = std::fs::remove_file(back);

    let missing = e.to_wire(Value::File(dir.path().join("absent.bin"))).unwrap_err();
    assert_eq!(missing.code_str(), "conversion");
}

#[test]
fn lob_codes_alias_platform_storage() {
    let pg = manager_for(DatabasePlatform::postgres());
    assert_eq!(pg.resolve_by_wire_code(WireCode::CLOB).unwrap().describe(), "ScalarTypeString");
    let e = pg.resolve_by_type_and_wire_code(TypeKey::of::<String>(), WireCode::CLOB).unwrap();
    assert_eq!(e.wire_code(), WireCode::VARCHAR);

    let h2 = manager_for(DatabasePlatform::h2());
    assert_eq!(h2.resolve_by_wire_code(WireCode::CLOB).unwrap().describe(), "ScalarTypeClob");
    assert_eq!(h2.resolve_by_wire_code(WireCode::BLOB).unwrap().wire_code(), WireCode::BLOB);
}

#[test]
fn uuid_storage_follows_platform_and_config() {
    let pg = manager_for(DatabasePlatform::postgres());
    assert_eq!(pg.resolve_by_type(TypeKey::of::<Uuid>()).unwrap().unwrap().wire_code(), WireCode::UUID);

    let mysql = manager_for(DatabasePlatform::mysql());
    let e = mysql.resolve_by_type(TypeKey::of::<Uuid>()).unwrap().unwrap();
    assert_eq!((e.wire_code(), e.length()), (WireCode::VARCHAR, 40));

    let binary = TypeManager::new(TypeConfig { db_uuid: DbUuid::AutoBinary, ..TypeConfig::for_platform(DatabasePlatform::mysql()) }).unwrap();
    let e = binary.resolve_by_type(TypeKey::of::<Uuid>()).unwrap().unwrap();
    assert_eq!((e.wire_code(), e.length()), (WireCode::BINARY, 16));
    let id = Uuid::new_v4();
    assert_eq!(e.to_wire(Value::Uuid(id)).unwrap(), Value::Bytes(id.as_bytes().to_vec()));

    let offline = TypeManager::new(TypeConfig { offline_migration: true, ..TypeConfig::for_platform(DatabasePlatform::mysql()) }).unwrap();
    assert_eq!(offline.resolve_by_type(TypeKey::of::<Uuid>()).unwrap().unwrap().wire_code(), WireCode::UUID);
}

#[test]
fn boolean_literals_per_platform() {
    assert_eq!(manager_for(DatabasePlatform::postgres()).boolean_literals(), ("true", "false"));
    assert_eq!(manager_for(DatabasePlatform::sqlite()).boolean_literals(), ("1", "0"));
    let mysql = manager_for(DatabasePlatform::mysql());
    assert_eq!(mysql.boolean_literals(), ("1", "0"));
    assert_eq!(mysql.resolve_by_wire_code(WireCode::BIT).unwrap().app_type(), TypeKey::of::<bool>());

    let mut text_bool = DatabasePlatform::generic();
    text_bool.boolean_code = WireCode::VARCHAR;
    let tm = manager_for(text_bool);
    assert_eq!(tm.boolean_literals(), ("'T'", "'F'"));
    let e = tm.resolve_by_type(TypeKey::of::<bool>()).unwrap().unwrap();
    assert_eq!(e.to_wire(Value::Bool(true)).unwrap(), Value::Text("T".into()));
}

#[test]
fn convert_uses_native_entry_or_passes_through() {
    let sqlite = manager_for(DatabasePlatform::sqlite());
    assert_eq!(sqlite.convert(Value::Bool(true), WireCode::BOOLEAN).unwrap(), Value::I32(1));
    assert_eq!(sqlite.convert(Value::I32(5), WireCode(9999)).unwrap(), Value::I32(5));
    assert_eq!(sqlite.convert(Value::Null, WireCode::INTEGER).unwrap(), Value::Null);
    assert!(sqlite.convert(Value::Text("x".into()), WireCode::INTEGER).is_err());
}

#[test]
fn json_export_follows_date_time_mode() {
    let at = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap() + chrono::Duration::nanoseconds(5);
    let value = Value::TimestampUtc(at);
    let export = |mode: JsonDateTime| {
        let tm = TypeManager::new(TypeConfig { json_date_time: mode, ..TypeConfig::default() }).unwrap();
        tm.resolve_by_type(TypeKey::of::<DateTime<Utc>>()).unwrap().unwrap().to_json(&value).unwrap()
    };
    assert_eq!(export(JsonDateTime::Millis), json!(1_700_000_000_000i64));
    assert_eq!(export(JsonDateTime::Nanos), json!("1700000000.000000005"));
    assert_eq!(export(JsonDateTime::Iso8601), json!(at.to_rfc3339()));

    let tm = manager_for(DatabasePlatform::generic());
    let st = Value::SystemTime(UNIX_EPOCH + StdDuration::from_millis(1_500));
    assert_eq!(tm.resolve_by_type(TypeKey::of::<SystemTime>()).unwrap().unwrap().to_json(&st).unwrap(), json!(1500));
}

#[test]
fn collections_by_platform() {
    let pg = manager_for(DatabasePlatform::postgres());
    let arr = pg.array_scalar_type(&ContainerShape::List, TypeKey::of::<i32>()).unwrap();
    assert_eq!((arr.wire_code(), arr.describe()), (WireCode::ARRAY, "ScalarTypeArrayList"));
    let set = pg.array_scalar_type(&ContainerShape::Set, TypeKey::of::<i32>()).unwrap();
    let wire = set.to_wire(Value::List(vec![Value::I32(1), Value::I32(1), Value::I32(2)])).unwrap();
    assert_eq!(wire, Value::List(vec![Value::I32(1), Value::I32(2)]));

    let h2 = manager_for(DatabasePlatform::h2());
    assert_eq!(h2.array_scalar_type(&ContainerShape::Set, TypeKey::of::<String>()).unwrap().describe(), "ScalarTypeArraySetH2");
    let h2_no_arrays = TypeManager::new(TypeConfig::for_platform(DatabasePlatform { native_array: false, ..DatabasePlatform::h2() })).unwrap();
    let set = h2_no_arrays.array_scalar_type(&ContainerShape::Set, TypeKey::of::<String>()).unwrap();
    assert_eq!((set.wire_code(), set.describe()), (WireCode::VARCHAR, "ScalarTypeJsonSet"));

    let mysql = manager_for(DatabasePlatform::mysql());
    let list = mysql.array_scalar_type(&ContainerShape::List, TypeKey::of::<i64>()).unwrap();
    assert_eq!(list.wire_code(), WireCode::VARCHAR);
    let wire = list.to_wire(Value::List(vec![Value::I64(1), Value::I64(2)])).unwrap();
    assert_eq!(wire, Value::Text("[1,2]".into()));
    assert_eq!(list.from_wire(wire).unwrap(), Value::List(vec![Value::I64(1), Value::I64(2)]));

    let err = mysql.array_scalar_type(&ContainerShape::Other("VecDeque".into()), TypeKey::of::<i64>()).unwrap_err();
    assert_eq!(err.code_str(), "unsupported_shape");
}

#[test]
fn json_scalar_types_by_code_and_shape() {
    let pg = manager_for(DatabasePlatform::postgres());
    let map = pg.json_scalar_type(&ContainerShape::Map, TypeKey::of::<String>(), WireCode::JSONB).unwrap();
    assert_eq!(map.wire_code(), WireCode::JSONB);
    let m: BTreeMap<String, Value> = BTreeMap::from([("k".to_string(), Value::Text("v".into()))]);
    let wire = map.to_wire(Value::Map(m.clone())).unwrap();
    assert_eq!(map.from_wire(wire).unwrap(), Value::Map(m));

    let h2 = manager_for(DatabasePlatform::h2());
    assert_eq!(h2.json_scalar_type(&ContainerShape::List, TypeKey::of::<String>(), WireCode::JSON).unwrap().wire_code(), WireCode::CLOB);

    struct Settings;
    let obj = pg.json_scalar_type(&ContainerShape::Other("Settings".into()), TypeKey::of::<Settings>(), WireCode::JSON).unwrap();
    assert_eq!(obj.app_type(), TypeKey::of::<Settings>());
    let node = pg.json_scalar_type(&ContainerShape::Other("JsonNode".into()), TypeKey::of::<JsonValue>(), WireCode::VARCHAR).unwrap();
    assert_eq!(node.describe(), "ScalarTypeJsonNode");

    assert_eq!(pg.json_scalar_type(&ContainerShape::List, TypeKey::of::<String>(), WireCode::DATE).unwrap_err().code_str(), "unmatched_type");

    let no_codec = TypeManager::new(TypeConfig { json_codec: false, ..TypeConfig::for_platform(DatabasePlatform::postgres()) }).unwrap();
    let err = no_codec.json_scalar_type(&ContainerShape::Other("Settings".into()), TypeKey::of::<Settings>(), WireCode::JSON).unwrap_err();
    assert_eq!(err.code_str(), "unsupported_shape");
}

#[test]
fn hstore_by_platform() {
    let pg = manager_for(DatabasePlatform::postgres());
    assert_eq!(pg.hstore_scalar_type().wire_code(), WireCode::HSTORE);
    let mysql = manager_for(DatabasePlatform::mysql());
    let e = mysql.hstore_scalar_type();
    assert_eq!((e.wire_code(), e.describe()), (WireCode::VARCHAR, "ScalarTypeJsonMap"));
}

#[test]
fn config_from_env_drives_registry() {
    let vars = [("SCALAR_PLATFORM", "postgres"), ("SCALAR_DURATION_NANOS", "true"), ("SCALAR_LOCAL_TIME_NANOS", "1")];
    let cfg = TypeConfig::default().apply_vars(|k| vars.iter().find(|(n, _)| *n == k).map(|(_, v)| v.to_string())).unwrap();
    let tm = TypeManager::new(cfg).unwrap();
    assert_eq!(tm.resolve_by_type(TypeKey::of::<chrono::Duration>()).unwrap().unwrap().wire_code(), WireCode::DECIMAL);
    let t = tm.resolve_by_type(TypeKey::of::<NaiveTime>()).unwrap().unwrap();
    assert_eq!(t.wire_code(), WireCode::BIGINT);
    let precise = Value::Time(NaiveTime::from_hms_nano_opt(1, 2, 3, 456).unwrap());
    assert_eq!(t.from_wire(t.to_wire(precise.clone()).unwrap()).unwrap(), precise);
    // the TIME native stays second-precision regardless of the nanos setting
    assert_eq!(tm.resolve_by_wire_code(WireCode::TIME).unwrap().describe(), "ScalarTypeLocalTime");
}

#[test]
fn config_from_json_drives_registry() {
    let cfg = TypeConfig::from_json_str(r#"{"platform": {"platform": "sqlite", "clob_code": 2005, "blob_code": 2004, "boolean_code": 4, "native_uuid": false, "native_array": false}, "db_uuid": "binary"}"#).unwrap();
    let tm = TypeManager::new(cfg).unwrap();
    assert_eq!(tm.resolve_by_type(TypeKey::of::<bool>()).unwrap().unwrap().wire_code(), WireCode::INTEGER);
    assert_eq!(tm.resolve_by_type(TypeKey::of::<Uuid>()).unwrap().unwrap().wire_code(), WireCode::BINARY);
}

#[test]
fn concurrent_reads_during_registration() {
    let tm = std::sync::Arc::new(manager_for(DatabasePlatform::postgres()));
    let readers: Vec<_> = (0..4).map(|_| {
        let tm = tm.clone();
        std::thread::spawn(move || {
            for _ in 0..500 {
                let e = tm.resolve_by_type(TypeKey::of::<i64>()).unwrap().unwrap();
                assert_eq!(e.wire_code(), WireCode::BIGINT);
                assert!(tm.resolve_by_wire_code(WireCode::TIMESTAMP).is_some());
            }
        })
    }).collect();
    for _ in 0..100 {
        tm.register(scalar_registry::scalar::basic::bigint());
    }
    for r in readers {
        r.join().unwrap();
    }
}

#[test]
fn catalog_serialises() {
    let tm = manager_for(DatabasePlatform::postgres());
    let rows = tm.catalog();
    let text = serde_json::to_string(&rows).unwrap();
    let parsed: JsonValue = serde_json::from_str(&text).unwrap();
    let first = &parsed[0];
    assert!(first.get("wire_code").is_some() && first.get("implementation").is_some());
}
