//! Protobuf message definitions for bridged types.

use crate::error::Result;
use crate::generator::Generator;
use crate::model::{Field, MethodsOption};
use crate::naming::{go_package_name, proto_name};
use indexmap::IndexSet;
use prost::Message as _;
use prost_types::field_descriptor_proto::{Label, Type as FieldType};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileOptions};
use std::fmt;

const TIMESTAMP: &str = "google.protobuf.Timestamp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageField {
    pub ty: String,
    pub name: String,
    pub number: u32,
    /// Emitted verbatim on the line above the field.
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub name: String,
    pub fields: Vec<MessageField>,
}

/// A `.proto` file holding the messages of one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoFile {
    pub service: String,
    pub imports: Vec<String>,
    pub go_package: String,
    pub messages: Vec<Message>,
}

impl Generator {
    /// Message definition for `option`'s type.
    ///
    /// Field numbers count up from 1 over the fields left after skipping,
    /// so changing the skip list renumbers every later field.
    pub fn message(&self, option: &MethodsOption) -> Result<Message> {
        let pb = option.pb_config()?;

        let fields = option
            .ty
            .fields
            .iter()
            .filter(|f| !pb.skip_fields.contains(f.column_name()))
            .zip(1..)
            .map(|(f, number)| MessageField {
                ty: self.message_type(f),
                name: f.column_name().to_string(),
                number,
                comment: Some(f.comment.clone()).filter(|c| !c.is_empty()),
            })
            .collect();

        Ok(Message {
            name: option.ty.name.clone(),
            fields,
        })
    }

    fn message_type(&self, field: &Field) -> String {
        let config = &self.config;

        if config.is_time(&field.ty) || config.is_null_time(&field.ty) {
            TIMESTAMP.to_string()
        } else if let Some(wrapper) = config.wrapper_types.get(&field.ty) {
            format!("google.protobuf.{wrapper}")
        } else if let Some(pb) = config.to_pb_types.get(&field.ty) {
            pb.clone()
        } else {
            field.ty.clone()
        }
    }

    /// The `.proto` file for `options`, ordered by grouping key. The first
    /// option after ordering names the service. `None` without options.
    pub fn proto_file(&self, options: &[MethodsOption]) -> Result<Option<ProtoFile>> {
        let mut options: Vec<&MethodsOption> = options.iter().collect();
        options.sort_by(|a, b| a.sub.cmp(&b.sub));

        let Some(first) = options.first() else {
            return Ok(None);
        };
        let service = first.pb_config()?.import_service.clone();

        let mut imports = IndexSet::new();
        for option in &options {
            let pb = option.pb_config()?;
            for field in &option.ty.fields {
                if pb.skip_fields.contains(field.column_name()) {
                    continue;
                }
                if let Some(import) = self.config.import_map.get(&field.ty) {
                    imports.insert(import.clone());
                }
            }
        }

        let messages = options
            .iter()
            .map(|option| self.message(option))
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(ProtoFile {
            go_package: format!(
                "{}/service/{}",
                self.config.server_proto_path_prefix,
                go_package_name(&service)
            ),
            service,
            imports: imports.into_iter().collect(),
            messages,
        }))
    }

    /// Rendered `.proto` text for `options`; empty without options.
    pub fn proto(&self, options: &[MethodsOption]) -> Result<String> {
        Ok(self
            .proto_file(options)?
            .map(|file| file.to_string())
            .unwrap_or_default())
    }
}

impl fmt::Display for MessageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(comment) = &self.comment {
            writeln!(f, "{comment}")?;
        }
        write!(f, "\t{} {} = {};", self.ty, self.name, self.number)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self
            .fields
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        write!(f, "message {} {{\n{fields}\n}}\n", self.name)
    }
}

impl fmt::Display for ProtoFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let imports = self
            .imports
            .iter()
            .map(|i| format!("import \"{i}\";"))
            .collect::<Vec<_>>()
            .join("\n");

        write!(
            f,
            "package {};\n\n{imports}\n\noption go_package = \"{}\";\n\
             option java_multiple_files = true;\n\
             option objc_class_prefix = \"RPC\";\n\n",
            self.package(),
            self.go_package
        )?;

        for message in &self.messages {
            write!(f, "{message}")?;
        }
        Ok(())
    }
}

fn scalar_type(ty: &str) -> Option<FieldType> {
    Some(match ty {
        "double" => FieldType::Double,
        "float" => FieldType::Float,
        "int64" => FieldType::Int64,
        "uint64" => FieldType::Uint64,
        "int32" => FieldType::Int32,
        "fixed64" => FieldType::Fixed64,
        "fixed32" => FieldType::Fixed32,
        "bool" => FieldType::Bool,
        "string" => FieldType::String,
        "bytes" => FieldType::Bytes,
        "uint32" => FieldType::Uint32,
        "sfixed32" => FieldType::Sfixed32,
        "sfixed64" => FieldType::Sfixed64,
        "sint32" => FieldType::Sint32,
        "sint64" => FieldType::Sint64,
        _ => return None,
    })
}

impl ProtoFile {
    pub fn package(&self) -> String {
        format!("proto.{}", proto_name(&self.service))
    }

    /// The file as a protobuf descriptor. Comments are not carried over.
    pub fn to_descriptor(&self) -> FileDescriptorProto {
        let message_type = self
            .messages
            .iter()
            .map(|message| DescriptorProto {
                name: Some(message.name.clone()),
                field: message.fields.iter().map(MessageField::to_descriptor).collect(),
                ..Default::default()
            })
            .collect();

        FileDescriptorProto {
            name: Some(format!("{}.proto", proto_name(&self.service))),
            package: Some(self.package()),
            dependency: self.imports.clone(),
            message_type,
            options: Some(FileOptions {
                go_package: Some(self.go_package.clone()),
                java_multiple_files: Some(true),
                objc_class_prefix: Some("RPC".to_string()),
                ..Default::default()
            }),
            syntax: Some("proto3".to_string()),
            ..Default::default()
        }
    }

    /// Wire encoded [`FileDescriptorProto`].
    pub fn encode_descriptor(&self) -> Vec<u8> {
        self.to_descriptor().encode_to_vec()
    }
}

impl MessageField {
    fn to_descriptor(&self) -> FieldDescriptorProto {
        let (ty, type_name) = match scalar_type(&self.ty) {
            Some(scalar) => (scalar, None),
            None => (FieldType::Message, Some(format!(".{}", self.ty))),
        };

        FieldDescriptorProto {
            name: Some(self.name.clone()),
            number: i32::try_from(self.number).ok(),
            label: Some(Label::Optional as i32),
            r#type: Some(ty as i32),
            type_name,
            ..Default::default()
        }
    }
}
