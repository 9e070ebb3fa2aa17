//! Conversion bodies between a model struct and its protobuf message.
//!
//! Fields are first classified into a [`Conversion`], then assembled into a
//! small statement tree ([`Body`]) and only rendered to Go text at the end.

use crate::diagnostics::Warning;
use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::model::{Field, MethodsOption};
use crate::naming::{go_package_name, snake_to_camel, snake_to_camel_without_initialisms};
use std::fmt;

const TO_TIMESTAMP: &str = "ptypes.TimestampProto";
const FROM_TIMESTAMP: &str = "ptypes.Timestamp";

/// How a field crosses between the model and the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion<'a> {
    /// Non-nullable time, converted with a fallible `ptypes` call.
    Timestamp,
    /// Non-nullable, converted with a Go cast to the protobuf scalar.
    Cast(&'a str),
    /// Non-nullable, assigned as is.
    Direct,
    /// Nullable time, converted behind a validity guard.
    NullTimestamp,
    /// Nullable, wrapped into the named `google.protobuf` wrapper message.
    Wrapper(&'a str),
    /// Nullable without a wrapper mapping; left out of both bodies.
    Unmapped,
}

/// A non-skipped field with its conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeField<'a> {
    pub field: &'a Field,
    pub conversion: Conversion<'a>,
}

impl BridgeField<'_> {
    /// Go name of the generated message field.
    fn message_field(&self) -> String {
        snake_to_camel_without_initialisms(self.field.column_name())
    }

    /// Local variable holding a converted timestamp.
    fn var(&self) -> String {
        snake_to_camel(self.field.column_name())
    }
}

/// One Go statement of a conversion body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `var, err := call(arg)` followed by an early error return.
    Fallible {
        var: String,
        call: &'static str,
        arg: String,
    },
    Assign {
        target: String,
        value: String,
    },
    If {
        cond: String,
        body: Vec<Stmt>,
    },
}

impl Stmt {
    fn write(&self, indent: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Fallible { var, call, arg } => write!(
                f,
                "{indent}{var}, err := {call}({arg})\n\tif err != nil {{\n\t\treturn nil, err\n\t}}\n"
            ),
            Stmt::Assign { target, value } => writeln!(f, "{indent}{target} = {value}"),
            Stmt::If { cond, body } => {
                writeln!(f, "{indent}if {cond} {{")?;
                for stmt in body {
                    stmt.write("\t", f)?;
                }
                writeln!(f, "}}")
            }
        }
    }
}

/// A conversion function body: fallible conversions, a struct literal with
/// the unconditional fields, the guarded nullable fields and the return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub prelude: Vec<Stmt>,
    pub var: String,
    pub ty: String,
    pub fields: Vec<(String, String)>,
    pub guarded: Vec<Stmt>,
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.prelude {
            stmt.write("", f)?;
        }

        let fields = self
            .fields
            .iter()
            .map(|(name, value)| format!("{name}:{value},"))
            .collect::<Vec<_>>()
            .join("\n");
        write!(f, "{} := &{}{{\n\t{fields}\n}}\n", self.var, self.ty)?;

        for stmt in &self.guarded {
            stmt.write("", f)?;
        }

        write!(f, "\nreturn {}, nil", self.var)
    }
}

/// Accessor of the value inside a nullable type: `sql.NullInt64` ->
/// `Int64`. Falls back to the wrapper name without its `Value` suffix.
fn value_accessor(nullable: &str, wrapper: &str) -> String {
    let base = nullable.rsplit('.').next().unwrap_or(nullable);
    match base.strip_prefix("Null") {
        Some(accessor) if !accessor.is_empty() => accessor.to_string(),
        _ => wrapper.strip_suffix("Value").unwrap_or(wrapper).to_string(),
    }
}

impl Generator {
    /// The fields of `option`'s type that survive the skip list, in
    /// declaration order, each with its conversion.
    pub fn bridge_fields<'a>(&'a self, option: &'a MethodsOption) -> Result<Vec<BridgeField<'a>>> {
        let pb = option.pb_config()?;

        Ok(option
            .ty
            .fields
            .iter()
            .filter(|f| !pb.skip_fields.contains(f.column_name()))
            .map(|field| BridgeField {
                field,
                conversion: self.conversion(field),
            })
            .collect())
    }

    fn conversion<'a>(&'a self, field: &'a Field) -> Conversion<'a> {
        let config = &self.config;

        if !field.is_nullable() {
            if config.is_time(&field.ty) {
                Conversion::Timestamp
            } else if let Some(pb) = config.castable_pb_type(&field.ty) {
                Conversion::Cast(pb)
            } else {
                Conversion::Direct
            }
        } else if config.is_null_time(&field.ty) {
            Conversion::NullTimestamp
        } else if let Some(wrapper) = config.wrapper_types.get(&field.ty) {
            Conversion::Wrapper(wrapper)
        } else {
            Conversion::Unmapped
        }
    }

    fn unmapped(&self, type_name: &str, field: &Field) -> Result<()> {
        if self.config.strict_nullable {
            return Err(Error::UnmappedNullable {
                type_name: type_name.to_string(),
                field: field.name.clone(),
            });
        }

        self.diagnostics().warn(Warning::UnmappedNullable {
            type_name: type_name.to_string(),
            field: field.name.clone(),
        });
        Ok(())
    }

    /// Statement tree converting a model value into its message, or `None`
    /// when the option doesn't bridge to protobuf.
    pub fn model_to_pb_body(&self, option: &MethodsOption) -> Result<Option<Body>> {
        if !option.model_to_pb {
            return Ok(None);
        }

        let type_name = &option.ty.name;
        let short = self.shortname(type_name, &[]);
        let message = format!("proto{type_name}");

        let mut body = Body {
            prelude: vec![],
            var: message.clone(),
            ty: format!(
                "{}.{type_name}",
                go_package_name(&option.pb_config()?.import_service)
            ),
            fields: vec![],
            guarded: vec![],
        };

        for bf in self.bridge_fields(option)? {
            let name = &bf.field.name;
            let target = bf.message_field();

            match bf.conversion {
                Conversion::Timestamp => {
                    body.prelude.push(Stmt::Fallible {
                        var: bf.var(),
                        call: TO_TIMESTAMP,
                        arg: format!("{short}.{name}"),
                    });
                    body.fields.push((target, bf.var()));
                }
                Conversion::Cast(pb) => body.fields.push((target, format!("{pb}({short}.{name})"))),
                Conversion::Direct => body.fields.push((target, format!("{short}.{name}"))),
                Conversion::NullTimestamp => body.guarded.push(Stmt::If {
                    cond: format!("{short}.{name}.Valid"),
                    body: vec![
                        Stmt::Fallible {
                            var: bf.var(),
                            call: TO_TIMESTAMP,
                            arg: format!("{short}.{name}.Time"),
                        },
                        Stmt::Assign {
                            target: format!("{message}.{target}"),
                            value: bf.var(),
                        },
                    ],
                }),
                Conversion::Wrapper(wrapper) => body.guarded.push(Stmt::If {
                    cond: format!("{short}.{name}.Valid"),
                    body: vec![Stmt::Assign {
                        target: format!("{message}.{target}"),
                        value: format!(
                            "&wrappers.{wrapper}{{Value:{short}.{name}.{}}}",
                            value_accessor(&bf.field.ty, wrapper)
                        ),
                    }],
                }),
                Conversion::Unmapped => self.unmapped(type_name, bf.field)?,
            }
        }

        Ok(Some(body))
    }

    /// Statement tree converting a message back into a model value, or
    /// `None` when the option doesn't bridge to protobuf.
    pub fn pb_to_model_body(&self, option: &MethodsOption) -> Result<Option<Body>> {
        if !option.model_to_pb {
            return Ok(None);
        }

        let type_name = &option.ty.name;
        let short = self.shortname(type_name, &[]);
        let message = format!("proto{type_name}");

        let mut body = Body {
            prelude: vec![],
            var: short.clone(),
            ty: type_name.clone(),
            fields: vec![],
            guarded: vec![],
        };

        for bf in self.bridge_fields(option)? {
            let name = &bf.field.name;
            let ty = &bf.field.ty;
            let source = format!("{message}.{}", bf.message_field());

            match bf.conversion {
                Conversion::Timestamp => {
                    body.prelude.push(Stmt::Fallible {
                        var: bf.var(),
                        call: FROM_TIMESTAMP,
                        arg: source,
                    });
                    body.fields.push((name.clone(), bf.var()));
                }
                Conversion::Cast(_) => body.fields.push((name.clone(), format!("{ty}({source})"))),
                Conversion::Direct => body.fields.push((name.clone(), source)),
                Conversion::NullTimestamp => body.guarded.push(Stmt::If {
                    cond: format!("{source} != nil"),
                    body: vec![
                        Stmt::Fallible {
                            var: bf.var(),
                            call: FROM_TIMESTAMP,
                            arg: source,
                        },
                        Stmt::Assign {
                            target: format!("{short}.{name}"),
                            value: format!("{ty}{{Time:{}, Valid:true}}", bf.var()),
                        },
                    ],
                }),
                Conversion::Wrapper(wrapper) => body.guarded.push(Stmt::If {
                    cond: format!("{source} != nil"),
                    body: vec![Stmt::Assign {
                        target: format!("{short}.{name}"),
                        value: format!(
                            "{ty}{{{}:{source}.Value, Valid:true}}",
                            value_accessor(ty, wrapper)
                        ),
                    }],
                }),
                Conversion::Unmapped => self.unmapped(type_name, bf.field)?,
            }
        }

        Ok(Some(body))
    }

    /// Go body of the model to message conversion; empty when the option
    /// doesn't bridge to protobuf.
    pub fn model_to_pb(&self, option: &MethodsOption) -> Result<String> {
        Ok(self
            .model_to_pb_body(option)?
            .map(|body| body.to_string())
            .unwrap_or_default())
    }

    /// Go body of the message to model conversion; empty when the option
    /// doesn't bridge to protobuf.
    pub fn pb_to_model(&self, option: &MethodsOption) -> Result<String> {
        Ok(self
            .pb_to_model_body(option)?
            .map(|body| body.to_string())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dialect::Dialect;
    use crate::testing::{field, generator, generator_with, option, users};
    use crate::model::{Type, MethodsOption};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const USER_TO_PB: &str = "createdAt, err := ptypes.TimestampProto(u.CreatedAt)
\tif err != nil {
\t\treturn nil, err
\t}
protoUser := &publicstory.User{
\tUserId:u.UserID,
Name:u.Name,
Score:double(u.Score),
Avatar:u.Avatar,
CreatedAt:createdAt,
}
if u.Nickname.Valid {
\tprotoUser.Nickname = &wrappers.StringValue{Value:u.Nickname.String}
}
if u.DeletedAt.Valid {
\tdeletedAt, err := ptypes.TimestampProto(u.DeletedAt.Time)
\tif err != nil {
\t\treturn nil, err
\t}
\tprotoUser.DeletedAt = deletedAt
}

return protoUser, nil";

    const PB_TO_USER: &str = "createdAt, err := ptypes.Timestamp(protoUser.CreatedAt)
\tif err != nil {
\t\treturn nil, err
\t}
u := &User{
\tUserID:protoUser.UserId,
Name:protoUser.Name,
Score:float64(protoUser.Score),
Avatar:protoUser.Avatar,
CreatedAt:createdAt,
}
if protoUser.Nickname != nil {
\tu.Nickname = sql.NullString{String:protoUser.Nickname.Value, Valid:true}
}
if protoUser.DeletedAt != nil {
\tdeletedAt, err := ptypes.Timestamp(protoUser.DeletedAt)
\tif err != nil {
\t\treturn nil, err
\t}
\tu.DeletedAt = mysql.NullTime{Time:deletedAt, Valid:true}
}

return u, nil";

    #[test]
    fn test_model_to_pb() {
        let g = generator(Dialect::MySQL);
        let option = option(users(), "public-story", &[]);
        assert_eq!(g.model_to_pb(&option).unwrap(), USER_TO_PB);
    }

    #[test]
    fn test_pb_to_model() {
        let g = generator(Dialect::MySQL);
        let option = option(users(), "public-story", &[]);
        assert_eq!(g.pb_to_model(&option).unwrap(), PB_TO_USER);
    }

    #[test]
    fn test_disabled_option_renders_nothing() {
        let g = generator(Dialect::MySQL);
        let option = MethodsOption::new(Arc::new(users()));
        assert_eq!(g.model_to_pb(&option).unwrap(), "");
        assert_eq!(g.pb_to_model(&option).unwrap(), "");
        assert!(g.diagnostics().is_empty());
    }

    #[test]
    fn test_enabled_option_requires_config() {
        let g = generator(Dialect::MySQL);
        let mut option = MethodsOption::new(Arc::new(users()));
        option.model_to_pb = true;
        assert_eq!(
            g.model_to_pb(&option),
            Err(Error::MissingModelToPbConfig("User".to_string()))
        );
    }

    #[test]
    fn test_skipped_fields_leave_both_bodies() {
        let g = generator(Dialect::MySQL);
        let option = option(users(), "public-story", &["created_at", "nickname"]);

        let to_pb = g.model_to_pb(&option).unwrap();
        let from_pb = g.pb_to_model(&option).unwrap();
        for body in [&to_pb, &from_pb] {
            assert!(!body.contains("CreatedAt"), "{body}");
            assert!(!body.contains("Nickname"), "{body}");
            assert!(body.contains("DeletedAt"), "{body}");
        }
    }

    #[test]
    fn test_unmapped_nullable_warns_once() {
        let g = generator(Dialect::MySQL);
        let option = option(users(), "public-story", &[]);

        let to_pb = g.model_to_pb(&option).unwrap();
        let from_pb = g.pb_to_model(&option).unwrap();
        assert!(!to_pb.contains("Location"));
        assert!(!from_pb.contains("Location"));

        assert_eq!(
            g.diagnostics().warnings(),
            vec![Warning::UnmappedNullable {
                type_name: "User".to_string(),
                field: "Location".to_string(),
            }]
        );
    }

    #[test]
    fn test_unmapped_nullable_strict() {
        let mut config = Config::default();
        config.strict_nullable = true;
        let g = generator_with(config);
        let option = option(users(), "public-story", &[]);

        let expected = Err(Error::UnmappedNullable {
            type_name: "User".to_string(),
            field: "Location".to_string(),
        });
        assert_eq!(g.model_to_pb(&option), expected);
        assert_eq!(g.pb_to_model(&option), expected);

        // skipping the column resolves it
        let option = crate::testing::option(users(), "public-story", &["location"]);
        assert!(g.model_to_pb(&option).is_ok());
    }

    #[test]
    fn test_conversions() {
        let g = generator(Dialect::MySQL);
        let option = option(users(), "svc", &["name"]);
        let conversions: Vec<_> = g
            .bridge_fields(&option)
            .unwrap()
            .iter()
            .map(|bf| (bf.field.name.as_str(), bf.conversion))
            .collect();

        assert_eq!(
            conversions,
            vec![
                ("UserID", Conversion::Direct),
                ("Score", Conversion::Cast("double")),
                ("Avatar", Conversion::Direct),
                ("CreatedAt", Conversion::Timestamp),
                ("Nickname", Conversion::Wrapper("StringValue")),
                ("DeletedAt", Conversion::NullTimestamp),
                ("Location", Conversion::Unmapped),
            ]
        );
    }

    #[test]
    fn test_wrapper_value_accessor() {
        assert_eq!(value_accessor("sql.NullFloat64", "DoubleValue"), "Float64");
        assert_eq!(value_accessor("sql.NullInt64", "Int64Value"), "Int64");
        assert_eq!(value_accessor("null.String", "StringValue"), "String");
    }

    #[test]
    fn test_short_name_follows_type() {
        let g = generator(Dialect::MySQL);
        let ty = Type::new(
            "OrderItem",
            vec![field("Qty", "int", "qty", true)],
        );
        let option = option(ty, "shop", &[]);
        assert_eq!(
            g.model_to_pb(&option).unwrap(),
            "protoOrderItem := &shop.OrderItem{\n\tQty:int64(oi.Qty),\n}\n\nreturn protoOrderItem, nil"
        );
        assert_eq!(
            g.pb_to_model(&option).unwrap(),
            "oi := &OrderItem{\n\tQty:int(protoOrderItem.Qty),\n}\n\nreturn oi, nil"
        );
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let option = option(users(), "public-story", &["score"]);
        let first = generator(Dialect::MySQL);
        let second = generator(Dialect::MySQL);
        assert_eq!(
            first.model_to_pb(&option).unwrap(),
            second.model_to_pb(&option).unwrap()
        );
        assert_eq!(
            first.pb_to_model(&option).unwrap(),
            first.pb_to_model(&option).unwrap()
        );
    }
}
