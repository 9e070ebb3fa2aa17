//! SQL dialect hooks used while rendering clauses.
//!
//! The loader that introspects a database owns the numbering and quoting
//! conventions of its dialect; the clause builder only calls through
//! [`Loader`].

use crate::model::EscType;
use sqlparser::ast::Ident;
use sqlparser::dialect::{GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};

/// Dialect specific rendering supplied by the schema loader.
pub trait Loader {
    /// Placeholder for the parameter at 0-based position `i`.
    fn nth_param(&self, i: usize) -> String;

    /// Quote an identifier of the given kind.
    fn escape(&self, kind: EscType, name: &str) -> String;
}

/// SQL dialect type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySQL,
    SQLite,
    Generic,
    PostgreSQL,
}

impl Dialect {
    /// Convert to sqlparser dialect
    pub fn to_dialect(&self) -> Box<dyn sqlparser::dialect::Dialect> {
        match self {
            Dialect::MySQL => Box::new(MySqlDialect {}),
            Dialect::SQLite => Box::new(SQLiteDialect {}),
            Dialect::Generic => Box::new(GenericDialect {}),
            Dialect::PostgreSQL => Box::new(PostgreSqlDialect {}),
        }
    }

    fn quote(&self) -> char {
        match self {
            Dialect::MySQL => '`',
            Dialect::SQLite | Dialect::Generic | Dialect::PostgreSQL => '"',
        }
    }
}

impl Loader for Dialect {
    fn nth_param(&self, i: usize) -> String {
        match self {
            Dialect::MySQL | Dialect::Generic => "?".to_string(),
            Dialect::PostgreSQL | Dialect::SQLite => format!("${}", i + 1),
        }
    }

    fn escape(&self, _kind: EscType, name: &str) -> String {
        Ident::with_quote(self.quote(), name).to_string()
    }
}
