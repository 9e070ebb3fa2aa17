//! The named function table handed to the template engine.
//!
//! Templates call functions by name with loosely typed arguments; `call`
//! checks the arguments and dispatches to the typed methods on
//! [`Generator`].

use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::model::{Column, Field, MethodsOption, QueryParam};
use crate::naming::go_package_name;
use crate::resolver::Scope;
use std::fmt;

/// Every function name the template engine can call.
pub const FUNCTIONS: &[&str] = &[
    "colcount",
    "colnames",
    "colnamesgeo",
    "colnamesmulti",
    "colnamesgeomulti",
    "colnamesquery",
    "colnamesquerymulti",
    "colprefixnames",
    "colvals",
    "colvalsmulti",
    "fieldnames",
    "fieldnamesmulti",
    "goparamlist",
    "reniltype",
    "retype",
    "shortname",
    "convext",
    "schema",
    "colname",
    "hascolumn",
    "hasfield",
    "getstartcount",
    "pluralize",
    "snaketocamel",
    "modelToPB",
    "PBToModel",
    "proto",
    "GoPackageName",
];

/// A template argument.
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    Str(&'a str),
    Bool(bool),
    Int(i64),
    Column(&'a Column),
    Field(&'a Field),
    Fields(&'a [Field]),
    QueryParams(&'a [QueryParam]),
    Option(&'a MethodsOption),
    Options(&'a [MethodsOption]),
}

impl Arg<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Arg::Str(_) => "string",
            Arg::Bool(_) => "bool",
            Arg::Int(_) => "int",
            Arg::Column(_) => "column",
            Arg::Field(_) => "field",
            Arg::Fields(_) => "fields",
            Arg::QueryParams(_) => "query params",
            Arg::Option(_) => "methods option",
            Arg::Options(_) => "methods options",
        }
    }
}

/// Value returned to the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Text(String),
    Int(usize),
    Bool(bool),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Text(text) => f.write_str(text),
            Output::Int(n) => write!(f, "{n}"),
            Output::Bool(b) => write!(f, "{b}"),
        }
    }
}

struct Args<'a, 'b> {
    func: &'static str,
    args: &'b [Arg<'a>],
}

macro_rules! arg_getter {
    ($name:ident, $variant:ident, $ty:ty) => {
        fn $name(&self, i: usize) -> Result<$ty> {
            match self.get(i)? {
                Arg::$variant(v) => Ok(v),
                other => Err(self.mismatch(i, stringify!($name), other)),
            }
        }
    };
}

impl<'a> Args<'a, '_> {
    fn get(&self, i: usize) -> Result<Arg<'a>> {
        self.args.get(i).copied().ok_or_else(|| {
            Error::invalid_arguments(self.func, format!("missing argument {}", i + 1))
        })
    }

    fn mismatch(&self, i: usize, expected: &str, found: Arg<'_>) -> Error {
        Error::invalid_arguments(
            self.func,
            format!(
                "argument {} should be {expected}, found {}",
                i + 1,
                found.kind()
            ),
        )
    }

    fn arity(&self, n: usize) -> Result<()> {
        if self.args.len() == n {
            Ok(())
        } else {
            Err(Error::invalid_arguments(
                self.func,
                format!("expected {n} arguments, found {}", self.args.len()),
            ))
        }
    }

    arg_getter!(str, Str, &'a str);
    arg_getter!(bool, Bool, bool);
    arg_getter!(column, Column, &'a Column);
    arg_getter!(field, Field, &'a Field);
    arg_getter!(fields, Fields, &'a [Field]);
    arg_getter!(option, Option, &'a MethodsOption);
    arg_getter!(options, Options, &'a [MethodsOption]);

    fn count(&self, i: usize) -> Result<usize> {
        match self.get(i)? {
            Arg::Int(n) => usize::try_from(n).map_err(|_| {
                Error::invalid_arguments(self.func, format!("argument {} is negative", i + 1))
            }),
            other => Err(self.mismatch(i, "int", other)),
        }
    }

    /// Variadic trailing strings, e.g. ignored field names.
    fn strs_from(&self, start: usize) -> Result<Vec<&'a str>> {
        (start..self.args.len()).map(|i| self.str(i)).collect()
    }
}

impl Generator {
    /// Calls the template function `name`.
    pub fn call(&self, name: &str, args: &[Arg<'_>]) -> Result<Output> {
        let func = FUNCTIONS
            .iter()
            .copied()
            .find(|f| *f == name)
            .ok_or_else(|| Error::UnknownFunction(name.to_string()))?;

        log::debug!("calling template func {func} with {} args", args.len());

        let a = Args { func, args };
        let text = match func {
            "colcount" => return Ok(Output::Int(self.colcount(a.fields(0)?, &a.strs_from(1)?))),
            "colnames" => self.colnames(a.fields(0)?, &a.strs_from(1)?),
            "colnamesgeo" => self.colnames_geo(a.fields(0)?, &a.strs_from(1)?),
            "colnamesmulti" => {
                a.arity(2)?;
                self.colnames_multi(a.fields(0)?, a.fields(1)?)
            }
            "colnamesgeomulti" => {
                a.arity(2)?;
                self.colnames_geo_multi(a.fields(0)?, a.fields(1)?)
            }
            "colnamesquery" => {
                self.colnames_query(a.fields(0)?, a.bool(1)?, a.str(2)?, &a.strs_from(3)?)
            }
            "colnamesquerymulti" => {
                a.arity(5)?;
                self.colnames_query_multi(
                    a.fields(0)?,
                    a.bool(1)?,
                    a.str(2)?,
                    a.count(3)?,
                    a.fields(4)?,
                )
            }
            "colprefixnames" => self.colprefixnames(a.fields(0)?, a.str(1)?, &a.strs_from(2)?),
            "colvals" => self.colvals(a.fields(0)?, &a.strs_from(1)?),
            "colvalsmulti" => match args.len() {
                2 => self.colvals_multi(a.fields(0)?, 0, a.fields(1)?),
                _ => {
                    a.arity(3)?;
                    self.colvals_multi(a.fields(0)?, a.count(1)?, a.fields(2)?)
                }
            },
            "fieldnames" => self.fieldnames(a.fields(0)?, a.str(1)?, &a.strs_from(2)?),
            "fieldnamesmulti" => {
                a.arity(3)?;
                self.fieldnames_multi(a.fields(0)?, a.str(1)?, a.fields(2)?)
            }
            "goparamlist" => {
                self.goparamlist(a.fields(0)?, a.bool(1)?, a.bool(2)?, &a.strs_from(3)?)
            }
            "reniltype" => {
                a.arity(1)?;
                self.reniltype(a.str(0)?)
            }
            "retype" => {
                a.arity(1)?;
                self.retype(a.str(0)?)
            }
            "shortname" => {
                let scopes = args
                    .get(1..)
                    .unwrap_or_default()
                    .iter()
                    .map(Scope::try_from)
                    .collect::<Result<Vec<_>>>()?;
                self.shortname(a.str(0)?, &scopes)
            }
            "convext" => {
                a.arity(3)?;
                self.convext(a.str(0)?, a.field(1)?, a.field(2)?)
            }
            "schema" => self.schema(a.str(0)?, &a.strs_from(1)?),
            "colname" => {
                a.arity(1)?;
                self.colname(a.column(0)?)
            }
            "hascolumn" => {
                a.arity(2)?;
                return Ok(Output::Bool(self.hascolumn(a.fields(0)?, a.str(1)?)));
            }
            "hasfield" => {
                a.arity(2)?;
                return Ok(Output::Bool(self.hasfield(a.fields(0)?, a.str(1)?)));
            }
            "getstartcount" => {
                a.arity(2)?;
                return Ok(Output::Int(self.getstartcount(a.fields(0)?, a.fields(1)?)));
            }
            "pluralize" => {
                a.arity(1)?;
                self.pluralize(a.str(0)?)
            }
            "snaketocamel" => {
                a.arity(1)?;
                self.snaketocamel(a.str(0)?)
            }
            "modelToPB" => {
                a.arity(1)?;
                self.model_to_pb(a.option(0)?)?
            }
            "PBToModel" => {
                a.arity(1)?;
                self.pb_to_model(a.option(0)?)?
            }
            "proto" => {
                a.arity(1)?;
                self.proto(a.options(0)?)?
            }
            "GoPackageName" => {
                a.arity(1)?;
                go_package_name(a.str(0)?)
            }
            _ => return Err(Error::UnknownFunction(name.to_string())),
        };

        Ok(Output::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::testing::{generator, option, users};
    use pretty_assertions::assert_eq;

    fn text(output: Result<Output>) -> String {
        match output.unwrap() {
            Output::Text(text) => text,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_every_function_dispatches() {
        let g = generator(Dialect::PostgreSQL);
        for name in FUNCTIONS {
            // no function accepts zero arguments, but every name must be known
            let err = g.call(name, &[]).unwrap_err();
            assert!(
                matches!(err, Error::InvalidArguments { .. }),
                "{name}: {err}"
            );
        }
    }

    #[test]
    fn test_unknown_function() {
        let g = generator(Dialect::PostgreSQL);
        assert_eq!(
            g.call("colnamez", &[]),
            Err(Error::UnknownFunction("colnamez".to_string()))
        );
    }

    #[test]
    fn test_sql_functions() {
        let g = generator(Dialect::PostgreSQL);
        let ty = users();
        let fields = &ty.fields[..3];
        let pk = &ty.primary_key_fields;

        assert_eq!(
            text(g.call("colnames", &[Arg::Fields(fields), Arg::Str("Score")])),
            "user_id, name"
        );
        assert_eq!(
            text(g.call("colvals", &[Arg::Fields(fields)])),
            "$1, $2, $3"
        );
        assert_eq!(
            text(g.call("colvalsmulti", &[Arg::Fields(fields), Arg::Fields(pk)])),
            "$1, $2"
        );
        assert_eq!(
            text(g.call(
                "colvalsmulti",
                &[Arg::Fields(fields), Arg::Int(1), Arg::Fields(pk)]
            )),
            "$2, $3"
        );
        assert_eq!(
            text(g.call(
                "colnamesquerymulti",
                &[
                    Arg::Fields(fields),
                    Arg::Bool(true),
                    Arg::Str(" AND "),
                    Arg::Int(2),
                    Arg::Fields(&fields[1..]),
                ]
            )),
            "user_id = $3 AND is_deleted = false"
        );
        assert_eq!(
            g.call("colcount", &[Arg::Fields(fields), Arg::Str("Name")]),
            Ok(Output::Int(3))
        );
        assert_eq!(
            g.call("hasfield", &[Arg::Fields(fields), Arg::Str("Name")]),
            Ok(Output::Bool(true))
        );
        assert_eq!(
            g.call("getstartcount", &[Arg::Fields(fields), Arg::Fields(pk)])
                .unwrap()
                .to_string(),
            "2"
        );
    }

    #[test]
    fn test_shortname_scopes() {
        let g = generator(Dialect::PostgreSQL);
        let ty = users();
        assert_eq!(text(g.call("shortname", &[Arg::Str("OrderItem")])), "oi");
        assert_eq!(
            text(g.call(
                "shortname",
                &[Arg::Str("UserAccount"), Arg::Fields(&ty.fields), Arg::Str("ua")]
            )),
            "uaVal"
        );
    }

    #[test]
    fn test_shortname_unsupported_scope() {
        let g = generator(Dialect::PostgreSQL);
        assert_eq!(
            g.call("shortname", &[Arg::Str("OrderItem"), Arg::Int(3)]),
            Err(Error::UnsupportedScope("int"))
        );
    }

    #[test]
    fn test_argument_errors() {
        let g = generator(Dialect::PostgreSQL);
        let ty = users();

        assert_eq!(
            g.call("retype", &[Arg::Bool(true)]),
            Err(Error::InvalidArguments {
                func: "retype",
                reason: "argument 1 should be str, found bool".to_string(),
            })
        );
        assert_eq!(
            g.call("colvalsmulti", &[Arg::Fields(&ty.fields), Arg::Int(-1), Arg::Fields(&[])]),
            Err(Error::InvalidArguments {
                func: "colvalsmulti",
                reason: "argument 2 is negative".to_string(),
            })
        );
        assert_eq!(
            g.call("GoPackageName", &[Arg::Str("a"), Arg::Str("b")]),
            Err(Error::InvalidArguments {
                func: "GoPackageName",
                reason: "expected 1 arguments, found 2".to_string(),
            })
        );
    }

    #[test]
    fn test_proto_functions() {
        let g = generator(Dialect::MySQL);
        let option = option(users(), "public-story", &["location"]);

        let to_pb = text(g.call("modelToPB", &[Arg::Option(&option)]));
        assert_eq!(to_pb, g.model_to_pb(&option).unwrap());
        assert!(to_pb.ends_with("return protoUser, nil"));

        let from_pb = text(g.call("PBToModel", &[Arg::Option(&option)]));
        assert!(from_pb.ends_with("return u, nil"));

        let options = [option];
        let proto = text(g.call("proto", &[Arg::Options(&options)]));
        assert!(proto.starts_with("package proto.public_story;"));
        assert!(g.diagnostics().is_empty());
    }

    #[test]
    fn test_naming_functions() {
        let g = generator(Dialect::PostgreSQL);
        assert_eq!(
            text(g.call("GoPackageName", &[Arg::Str("public-story")])),
            "publicstory"
        );
        assert_eq!(text(g.call("snaketocamel", &[Arg::Str("user_id")])), "userID");
        assert_eq!(text(g.call("pluralize", &[Arg::Str("user")])), "users");
    }
}
