//! Schema model consumed by the template functions.
//!
//! Values here are populated once by a loader and stay read-only for the
//! duration of a generation run.

use crate::error::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Template kinds, in the order their output is written to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemplateType {
    Enum,
    Proc,
    Type,
    ForeignKey,
    Index,
    Map,
    QueryType,
    Query,
    Optional,
    TypeProto,
    /// Always last.
    Xo,
}

impl TemplateType {
    pub const ALL: [TemplateType; 11] = [
        TemplateType::Enum,
        TemplateType::Proc,
        TemplateType::Type,
        TemplateType::ForeignKey,
        TemplateType::Index,
        TemplateType::Map,
        TemplateType::QueryType,
        TemplateType::Query,
        TemplateType::Optional,
        TemplateType::TypeProto,
        TemplateType::Xo,
    ];

    /// Template file stem. `TypeProto` shares the `type` stem with `Type`.
    pub fn name(self) -> &'static str {
        match self {
            TemplateType::Xo => "xo_db",
            TemplateType::Enum => "enum",
            TemplateType::Proc => "proc",
            TemplateType::Type | TemplateType::TypeProto => "type",
            TemplateType::ForeignKey => "foreignkey",
            TemplateType::Index => "index",
            TemplateType::Map => "map",
            TemplateType::QueryType => "querytype",
            TemplateType::Query => "query",
            TemplateType::Optional => "optional",
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u32> for TemplateType {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| Error::UnknownTemplateType(value.to_string()))
    }
}

/// Relational storage kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RelType {
    #[default]
    Table,
    View,
}

impl RelType {
    pub fn as_str(self) -> &'static str {
        match self {
            RelType::Table => "TABLE",
            RelType::View => "VIEW",
        }
    }
}

impl fmt::Display for RelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "TABLE" | "BASE TABLE" => Ok(RelType::Table),
            "VIEW" => Ok(RelType::View),
            other => Err(Error::UnknownRelType(other.to_string())),
        }
    }
}

/// Which kind of identifier is being escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscType {
    Schema,
    Table,
    Column,
}

/// Raw column as discovered by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Column {
    pub column_name: String,
    pub data_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub is_primary_key: bool,
}

impl Column {
    pub fn new(column_name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Column {
            column_name: column_name.into(),
            data_type: data_type.into(),
            ..Default::default()
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.not_null = true;
        self
    }
}

/// A target-language field backed by a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Go identifier of the field.
    pub name: String,
    /// Go type, possibly `[]`-prefixed and package qualified.
    pub ty: String,
    /// Zero value spelling of `ty`.
    pub nil_type: String,
    pub col: Arc<Column>,
    pub comment: String,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<String>, col: Column) -> Self {
        Field {
            name: name.into(),
            ty: ty.into(),
            nil_type: String::new(),
            col: Arc::new(col),
            comment: String::new(),
        }
    }

    pub fn with_nil_type(mut self, nil_type: impl Into<String>) -> Self {
        self.nil_type = nil_type.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn column_name(&self) -> &str {
        &self.col.column_name
    }

    /// `[]byte` never goes through a nullable wrapper.
    pub fn is_nullable(&self) -> bool {
        !self.col.not_null && self.ty != "[]byte"
    }
}

/// A table, view or custom query projection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Type {
    pub name: String,
    pub schema: String,
    pub rel_type: RelType,
    pub primary_key: Option<Field>,
    pub primary_key_fields: Vec<Field>,
    pub fields: Vec<Field>,
    pub indexes: IndexMap<String, Index>,
    pub comment: String,
    pub has_deleted_field: bool,
}

impl Type {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Type {
            name: name.into(),
            fields,
            ..Default::default()
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// An index into a table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Index {
    pub func_name: String,
    pub map_func_name: String,
    pub map_field: Option<Field>,
    pub schema: String,
    /// Name of the owning [`Type`].
    pub type_name: String,
    /// Ordered subsequence of the owning type's fields.
    pub fields: Vec<Field>,
    pub index_name: String,
    pub is_unique: bool,
    pub is_primary: bool,
    pub comment: String,
}

/// A foreign relationship on a table. Descriptive only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: String,
    pub schema: String,
    pub ty: Arc<Type>,
    pub field: Field,
    pub ref_type: Arc<Type>,
    pub ref_field: Field,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub const_value: i64,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Enum {
    pub name: String,
    pub schema: String,
    pub values: Vec<EnumValue>,
    pub comment: String,
    pub reverse_const_names: bool,
}

/// A stored procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proc {
    pub name: String,
    pub schema: String,
    pub proc_params: String,
    pub params: Vec<Field>,
    pub ret: Field,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub name: String,
    pub ty: String,
    pub interpolate: bool,
}

/// A custom SQL query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    pub schema: String,
    pub name: String,
    pub query: Vec<String>,
    pub query_comments: Vec<String>,
    pub query_params: Vec<QueryParam>,
    pub only_one: bool,
    pub interpolate: bool,
    pub ty: Type,
    pub comment: String,
}

/// Protobuf bridge settings for one type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelToPbConfig {
    /// Service the message package is named after, e.g. `public-story`.
    pub import_service: String,
    /// Column names left out of the message and both conversion bodies.
    pub skip_fields: IndexSet<String>,
}

/// Per-type generation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodsOption {
    pub ty: Arc<Type>,
    /// Grouping key; `proto` orders messages by it.
    pub sub: String,
    pub list_fields: bool,
    pub model_to_pb: bool,
    pub model_to_pb_config: Option<ModelToPbConfig>,
}

impl MethodsOption {
    pub fn new(ty: Arc<Type>) -> Self {
        MethodsOption {
            ty,
            sub: String::new(),
            list_fields: false,
            model_to_pb: false,
            model_to_pb_config: None,
        }
    }

    pub(crate) fn pb_config(&self) -> Result<&ModelToPbConfig> {
        self.model_to_pb_config
            .as_ref()
            .ok_or_else(|| Error::MissingModelToPbConfig(self.ty.name.clone()))
    }
}
