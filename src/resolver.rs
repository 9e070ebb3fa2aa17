//! Identifier resolution for generated Go code.

use crate::config::Config;
use crate::funcs::Arg;
use crate::error::{Error, Result};
use crate::model::{Field, QueryParam};
use heck::ToSnakeCase;
use indexmap::{IndexMap, IndexSet};
use std::cell::RefCell;
use std::collections::HashMap;

/// Package aliases imported by every generated file.
pub const DEFAULT_IMPORTS: &[&str] = &[
    "sql", "driver", "csv", "errors", "fmt", "regexp", "strings", "time",
];

/// Names already bound where a short name is going to be declared.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    Name(&'a str),
    Fields(&'a [Field]),
    QueryParams(&'a [QueryParam]),
}

impl<'a> TryFrom<&Arg<'a>> for Scope<'a> {
    type Error = Error;

    fn try_from(arg: &Arg<'a>) -> Result<Self> {
        match *arg {
            Arg::Str(name) => Ok(Scope::Name(name)),
            Arg::Fields(fields) => Ok(Scope::Fields(fields)),
            Arg::QueryParams(params) => Ok(Scope::QueryParams(params)),
            ref other => Err(Error::UnsupportedScope(other.kind())),
        }
    }
}

/// Derives short, collision free identifiers from type names.
///
/// Short names are cached per type name for the lifetime of the resolver,
/// so one resolver must be used per generation run. The cache sits in a
/// `RefCell`: a resolver can be shared by reference on one thread only.
#[derive(Debug)]
pub struct NameResolver {
    reserved: IndexMap<String, String>,
    conflict_suffix: String,
    cache: RefCell<HashMap<String, String>>,
}

impl NameResolver {
    pub fn new(reserved: IndexMap<String, String>, conflict_suffix: impl Into<String>) -> Self {
        NameResolver {
            reserved,
            conflict_suffix: conflict_suffix.into(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.reserved_names.clone(),
            config.name_conflict_suffix.clone(),
        )
    }

    /// The lowercase initials of the words in `type_name`, skipping `id`
    /// words, e.g. `MyCustomName` -> `mcn`.
    ///
    /// Reserved words are replaced by their alias. The result gets the
    /// conflict suffix appended when it collides with a default import or
    /// with anything in `scopes`.
    pub fn short_name(&self, type_name: &str, scopes: &[Scope<'_>]) -> String {
        let mut name = self.base_short_name(type_name);

        let mut conflicts: IndexSet<&str> = DEFAULT_IMPORTS.iter().copied().collect();
        for scope in scopes {
            match scope {
                Scope::Name(n) => {
                    conflicts.insert(*n);
                }
                Scope::Fields(fields) => conflicts.extend(fields.iter().map(|f| f.name.as_str())),
                Scope::QueryParams(params) => {
                    conflicts.extend(params.iter().map(|p| p.name.as_str()))
                }
            }
        }

        if conflicts.contains(name.as_str()) {
            name.push_str(&self.conflict_suffix);
        }

        name
    }

    fn base_short_name(&self, type_name: &str) -> String {
        if let Some(name) = self.cache.borrow().get(type_name) {
            return name.clone();
        }

        let snake = type_name.to_snake_case().to_lowercase();
        let initials: String = snake
            .split('_')
            .filter(|word| !word.is_empty() && *word != "id")
            .filter_map(|word| word.chars().next())
            .collect();

        let name = match self.reserved.get(&initials) {
            Some(alias) => alias.clone(),
            None => initials,
        };

        self.cache
            .borrow_mut()
            .insert(type_name.to_string(), name.clone());
        name
    }

    /// Go parameter name for a field: the first word lowercased, the rest
    /// kept as is (`UserID` -> `userID`). Unnamed fields become
    /// `v<position>`.
    pub fn param_name(&self, field_name: &str, position: usize) -> String {
        let name = if field_name.is_empty() {
            format!("v{position}")
        } else {
            let snake = field_name.to_snake_case();
            let first = snake.split('_').next().unwrap_or_default();
            let rest = field_name.get(first.len()..).unwrap_or_default();
            format!("{}{}", first.to_lowercase(), rest)
        };

        match self.reserved.get(&name.to_lowercase()) {
            Some(alias) => alias.clone(),
            None => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;

    fn resolver() -> NameResolver {
        NameResolver::from_config(&Config::default())
    }

    fn field(name: &str) -> Field {
        Field::new(name, "string", Column::new(name.to_lowercase(), "text"))
    }

    #[test]
    fn test_short_name_initials() {
        let r = resolver();
        assert_eq!(r.short_name("OrderItem", &[]), "oi");
        assert_eq!(r.short_name("MyCustomName", &[]), "mcn");
        assert_eq!(r.short_name("UserID", &[]), "u");
        assert_eq!(r.short_name("user_account", &[]), "ua");
    }

    #[test]
    fn test_short_name_reserved_word() {
        let r = resolver();
        // Mobile Application Profile -> "map"
        assert_eq!(r.short_name("MobileAppProfile", &[]), "mp");
        // Include Field -> "if"
        assert_eq!(r.short_name("IncludeField", &[]), "ifVal");
    }

    #[test]
    fn test_short_name_default_import_conflict() {
        let r = resolver();
        // Sales Quota Line -> "sql"
        assert_eq!(r.short_name("SalesQuotaLine", &[]), "sqlVal");
        // Time Item Meta Entry -> "time"
        assert_eq!(r.short_name("TimeItemMetaEntry", &[]), "timeVal");
    }

    #[test]
    fn test_short_name_scope_conflicts() {
        let r = resolver();
        let fields = vec![field("Name"), field("oi")];
        assert_eq!(r.short_name("OrderItem", &[Scope::Fields(&fields)]), "oiVal");
        assert_eq!(r.short_name("OrderItem", &[Scope::Name("oi")]), "oiVal");
        assert_eq!(r.short_name("OrderItem", &[Scope::Name("o")]), "oi");

        let params = vec![QueryParam {
            name: "oi".to_string(),
            ty: "int".to_string(),
            interpolate: false,
        }];
        assert_eq!(
            r.short_name("OrderItem", &[Scope::QueryParams(&params)]),
            "oiVal"
        );
    }

    #[test]
    fn test_short_name_is_cached() {
        let r = resolver();
        assert_eq!(r.short_name("OrderItem", &[]), "oi");
        // a conflicting scope doesn't poison the cached base name
        assert_eq!(r.short_name("OrderItem", &[Scope::Name("oi")]), "oiVal");
        assert_eq!(r.short_name("OrderItem", &[]), "oi");
        assert_eq!(r.cache.borrow().len(), 1);
    }

    #[test]
    fn test_custom_conflict_suffix() {
        let r = NameResolver::new(IndexMap::new(), "_");
        assert_eq!(r.short_name("MobileAppProfile", &[]), "map");
        assert_eq!(r.short_name("FieldMap", &[Scope::Name("fm")]), "fm_");
    }

    #[test]
    fn test_unsupported_scope_kind() {
        let err = Scope::try_from(&Arg::Bool(true)).unwrap_err();
        assert_eq!(err, Error::UnsupportedScope("bool"));
    }

    #[test]
    fn test_param_name() {
        let r = resolver();
        assert_eq!(r.param_name("UserID", 0), "userID");
        assert_eq!(r.param_name("CreatedAt", 1), "createdAt");
        assert_eq!(r.param_name("ID", 2), "id");
        assert_eq!(r.param_name("Type", 3), "typ");
        assert_eq!(r.param_name("Range", 4), "rnge");
        assert_eq!(r.param_name("", 5), "v5");
    }
}
