//! Run configuration.
//!
//! The YAML/CLI layer that fills these values lives outside this crate; the
//! structs derive `Deserialize` so any serde format can populate them.

use crate::model::{MethodsOption, ModelToPbConfig, Type};
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use std::sync::Arc;

/// Knobs read by the template functions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bare Go types that never receive the custom type package prefix.
    pub known_types: IndexSet<String>,
    /// Package prefixed onto unknown types by `retype`/`reniltype`.
    pub custom_type_package: String,
    /// Appended to short names colliding with a name in scope.
    pub name_conflict_suffix: String,
    pub escape_schema_name: bool,
    pub escape_table_names: bool,
    pub escape_column_names: bool,
    /// Go types holding geometry, read and written through WKB.
    pub geo_info_types: IndexSet<String>,
    /// Nullable Go type to protobuf wrapper message, e.g.
    /// `sql.NullInt64` -> `Int64Value`.
    pub wrapper_types: IndexMap<String, String>,
    /// Go type to protobuf scalar, e.g. `float64` -> `double`.
    pub to_pb_types: IndexMap<String, String>,
    /// Protobuf types that cannot be produced by a Go conversion call.
    pub incompatible_pb_types: IndexSet<String>,
    /// Go type to the `.proto` file that must be imported to declare it.
    pub import_map: IndexMap<String, String>,
    /// Prefix of the generated `go_package` option.
    pub server_proto_path_prefix: String,
    /// Go reserved word to the identifier used in its place.
    pub reserved_names: IndexMap<String, String>,
    /// Non-nullable time type, converted with `ptypes`.
    pub time_type: String,
    /// Nullable time types, converted with `ptypes` behind a `Valid` guard.
    pub null_time_types: IndexSet<String>,
    /// Fail instead of warning when a nullable field has no wrapper mapping.
    pub strict_nullable: bool,
}

const KNOWN_TYPES: &[&str] = &[
    "bool",
    "string",
    "byte",
    "rune",
    "int",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "float32",
    "float64",
    "Slice",
    "StringSlice",
];

const WRAPPER_TYPES: &[(&str, &str)] = &[
    ("sql.NullString", "StringValue"),
    ("sql.NullInt64", "Int64Value"),
    ("sql.NullInt32", "Int32Value"),
    ("sql.NullFloat64", "DoubleValue"),
    ("sql.NullBool", "BoolValue"),
];

const TO_PB_TYPES: &[(&str, &str)] = &[
    ("int", "int64"),
    ("int8", "int32"),
    ("int16", "int32"),
    ("uint", "uint64"),
    ("uint8", "uint32"),
    ("uint16", "uint32"),
    ("float32", "float"),
    ("float64", "double"),
    ("[]byte", "bytes"),
];

const TIMESTAMP_PROTO: &str = "google/protobuf/timestamp.proto";
const WRAPPERS_PROTO: &str = "google/protobuf/wrappers.proto";

/// Go keywords and predeclared types, each with a safe replacement.
pub const GO_RESERVED_NAMES: &[(&str, &str)] = &[
    ("break", "brk"),
    ("case", "cs"),
    ("chan", "chn"),
    ("const", "cnst"),
    ("continue", "cnt"),
    ("default", "def"),
    ("defer", "dfr"),
    ("else", "els"),
    ("fallthrough", "flthrough"),
    ("for", "fr"),
    ("func", "fn"),
    ("go", "goVal"),
    ("goto", "gt"),
    ("if", "ifVal"),
    ("import", "imp"),
    ("interface", "iface"),
    ("map", "mp"),
    ("package", "pkg"),
    ("range", "rnge"),
    ("return", "ret"),
    ("select", "slct"),
    ("struct", "strct"),
    ("switch", "swtch"),
    ("type", "typ"),
    ("var", "vr"),
    // go types
    ("error", "e"),
    ("bool", "b"),
    ("string", "str"),
    ("byte", "byt"),
    ("rune", "r"),
    ("uintptr", "uptr"),
    ("int", "i"),
    ("int8", "i8"),
    ("int16", "i16"),
    ("int32", "i32"),
    ("int64", "i64"),
    ("uint", "u"),
    ("uint8", "u8"),
    ("uint16", "u16"),
    ("uint32", "u32"),
    ("uint64", "u64"),
    ("float32", "z"),
    ("float64", "f"),
    ("complex64", "c"),
    ("complex128", "c128"),
];

fn owned_map(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        let mut import_map = IndexMap::new();
        import_map.insert("time.Time".to_string(), TIMESTAMP_PROTO.to_string());
        import_map.insert("mysql.NullTime".to_string(), TIMESTAMP_PROTO.to_string());
        import_map.insert("sql.NullTime".to_string(), TIMESTAMP_PROTO.to_string());
        for (go, _) in WRAPPER_TYPES {
            import_map.insert(go.to_string(), WRAPPERS_PROTO.to_string());
        }

        Config {
            known_types: KNOWN_TYPES.iter().map(|t| t.to_string()).collect(),
            custom_type_package: String::new(),
            name_conflict_suffix: "Val".to_string(),
            escape_schema_name: false,
            escape_table_names: false,
            escape_column_names: false,
            geo_info_types: IndexSet::new(),
            wrapper_types: owned_map(WRAPPER_TYPES),
            to_pb_types: owned_map(TO_PB_TYPES),
            incompatible_pb_types: ["bytes".to_string()].into_iter().collect(),
            import_map,
            server_proto_path_prefix: String::new(),
            reserved_names: owned_map(GO_RESERVED_NAMES),
            time_type: "time.Time".to_string(),
            null_time_types: ["mysql.NullTime".to_string(), "sql.NullTime".to_string()]
                .into_iter()
                .collect(),
            strict_nullable: false,
        }
    }
}

impl Config {
    pub(crate) fn is_geo(&self, ty: &str) -> bool {
        self.geo_info_types.contains(ty)
    }

    pub(crate) fn is_time(&self, ty: &str) -> bool {
        ty == self.time_type
    }

    pub(crate) fn is_null_time(&self, ty: &str) -> bool {
        self.null_time_types.contains(ty)
    }

    /// The protobuf scalar `ty` is cast to, if a Go conversion can produce it.
    pub(crate) fn castable_pb_type(&self, ty: &str) -> Option<&str> {
        self.to_pb_types
            .get(ty)
            .map(String::as_str)
            .filter(|pb| !self.incompatible_pb_types.contains(*pb))
    }
}

/// Method generation settings as written in the YAML config.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct MethodsConfig {
    /// Types that get list helpers.
    pub list_fields: Vec<String>,
    /// Service name to the tables bridged into its protobuf package.
    pub model_to_pb: IndexMap<String, Vec<TableConfig>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableConfig {
    pub name: String,
    #[serde(default)]
    pub skips: Vec<String>,
}

impl MethodsConfig {
    /// Builds the option for every type, in the order given.
    ///
    /// A type listed under a service gets `model_to_pb` enabled, that
    /// service as its grouping key and the configured skips.
    pub fn options(&self, types: &[Arc<Type>]) -> Vec<MethodsOption> {
        types
            .iter()
            .map(|ty| {
                let mut option = MethodsOption::new(ty.clone());
                option.list_fields = self.list_fields.iter().any(|n| *n == ty.name);

                if let Some((service, table)) = self.table_config(&ty.name) {
                    option.sub = service.to_string();
                    option.model_to_pb = true;
                    option.model_to_pb_config = Some(ModelToPbConfig {
                        import_service: service.to_string(),
                        skip_fields: table.skips.iter().cloned().collect(),
                    });
                }

                option
            })
            .collect()
    }

    fn table_config(&self, type_name: &str) -> Option<(&str, &TableConfig)> {
        self.model_to_pb.iter().find_map(|(service, tables)| {
            tables
                .iter()
                .find(|t| t.name == type_name)
                .map(|t| (service.as_str(), t))
        })
    }
}
