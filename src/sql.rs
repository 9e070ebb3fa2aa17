//! SQL clause fragments.
//!
//! Every list filters out ignored fields before numbering, so an ignored
//! field never consumes a placeholder position.

use crate::generator::Generator;
use crate::model::{Column, EscType, Field};
use std::collections::HashSet;

/// Predicate appended when a type soft deletes rows.
pub const SOFT_DELETE_PREDICATE: &str = "is_deleted = false";

/// Field name marking the soft delete column.
pub const DELETED_FIELD: &str = "is_deleted";

/// Placeholder used for geometry values, decoded from WKB.
pub const GEO_PLACEHOLDER: &str = "ST_GeomFromWKB(?)";

/// Field names left out of a clause.
pub(crate) struct Ignore<'a>(HashSet<&'a str>);

impl<'a> Ignore<'a> {
    pub(crate) fn names(names: &[&'a str]) -> Self {
        Ignore(names.iter().copied().collect())
    }

    pub(crate) fn fields(fields: &'a [Field]) -> Self {
        Ignore(fields.iter().map(|f| f.name.as_str()).collect())
    }

    pub(crate) fn keeps(&self, field: &Field) -> bool {
        !self.0.contains(field.name.as_str())
    }
}

/// `fields` minus the ignored ones, in declaration order.
pub(crate) fn retained<'f>(
    fields: &'f [Field],
    ignore: &'f Ignore<'f>,
) -> impl Iterator<Item = &'f Field> + 'f {
    fields.iter().filter(move |f| ignore.keeps(f))
}

impl Generator {
    /// The column name, escaped when column escaping is on.
    pub fn colname(&self, col: &Column) -> String {
        if self.config.escape_column_names {
            self.loader.escape(EscType::Column, &col.column_name)
        } else {
            col.column_name.clone()
        }
    }

    /// `col_1, col_2, ...`
    pub fn colnames(&self, fields: &[Field], ignore: &[&str]) -> String {
        self.column_list(fields, &Ignore::names(ignore), false)
    }

    /// Like [`Generator::colnames`], selecting geometry columns as WKB.
    pub fn colnames_geo(&self, fields: &[Field], ignore: &[&str]) -> String {
        self.column_list(fields, &Ignore::names(ignore), true)
    }

    pub fn colnames_multi(&self, fields: &[Field], ignore: &[Field]) -> String {
        self.column_list(fields, &Ignore::fields(ignore), false)
    }

    pub fn colnames_geo_multi(&self, fields: &[Field], ignore: &[Field]) -> String {
        self.column_list(fields, &Ignore::fields(ignore), true)
    }

    /// `col_1 = $1<sep>col_2 = $2...`, used for WHERE and SET clauses.
    ///
    /// When `has_deleted_field` is set and no `is_deleted` field made it
    /// into the clause, the soft delete predicate is appended after `sep`.
    pub fn colnames_query(
        &self,
        fields: &[Field],
        has_deleted_field: bool,
        sep: &str,
        ignore: &[&str],
    ) -> String {
        self.assignment_clause(fields, has_deleted_field, sep, 0, &Ignore::names(ignore))
    }

    /// Like [`Generator::colnames_query`], numbering placeholders from
    /// `start_count` so the clause can follow another one in the same
    /// statement.
    pub fn colnames_query_multi(
        &self,
        fields: &[Field],
        has_deleted_field: bool,
        sep: &str,
        start_count: usize,
        ignore: &[Field],
    ) -> String {
        self.assignment_clause(
            fields,
            has_deleted_field,
            sep,
            start_count,
            &Ignore::fields(ignore),
        )
    }

    /// `prefix.col_1, prefix.col_2, ...`
    pub fn colprefixnames(&self, fields: &[Field], prefix: &str, ignore: &[&str]) -> String {
        let ignore = Ignore::names(ignore);
        retained(fields, &ignore)
            .map(|f| format!("{prefix}.{}", self.colname(&f.col)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `$1, $2, ...` in the loader's placeholder syntax.
    pub fn colvals(&self, fields: &[Field], ignore: &[&str]) -> String {
        self.placeholder_list(fields, 0, &Ignore::names(ignore))
    }

    pub fn colvals_multi(&self, fields: &[Field], start_count: usize, ignore: &[Field]) -> String {
        self.placeholder_list(fields, start_count, &Ignore::fields(ignore))
    }

    /// `prefix.Field1, prefix.Field2, ...` for Go statements.
    pub fn fieldnames(&self, fields: &[Field], prefix: &str, ignore: &[&str]) -> String {
        field_list(fields, prefix, &Ignore::names(ignore))
    }

    pub fn fieldnames_multi(&self, fields: &[Field], prefix: &str, ignore: &[Field]) -> String {
        field_list(fields, prefix, &Ignore::fields(ignore))
    }

    /// 1-based count of the retained fields: the next free placeholder.
    pub fn colcount(&self, fields: &[Field], ignore: &[&str]) -> usize {
        let ignore = Ignore::names(ignore);
        1 + retained(fields, &ignore).count()
    }

    /// Joins `names` with `.` and qualifies them with `schema`, escaping
    /// as configured.
    pub fn schema(&self, schema: &str, names: &[&str]) -> String {
        let names = names
            .iter()
            .map(|t| {
                if self.config.escape_table_names {
                    self.loader.escape(EscType::Table, t)
                } else {
                    t.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(".");

        if schema.is_empty() && names.is_empty() {
            return String::new();
        }

        if !schema.is_empty() && !names.is_empty() {
            let schema = if self.config.escape_schema_name {
                self.loader.escape(EscType::Schema, schema)
            } else {
                schema.to_string()
            };
            return format!("{schema}.{names}");
        }

        format!("{schema}{names}")
    }

    pub fn hascolumn(&self, fields: &[Field], column_name: &str) -> bool {
        fields.iter().any(|f| f.col.column_name == column_name)
    }

    pub fn hasfield(&self, fields: &[Field], name: &str) -> bool {
        fields.iter().any(|f| f.name == name)
    }

    /// Number of non primary key fields; where the WHERE clause of an
    /// UPDATE starts numbering.
    pub fn getstartcount(&self, fields: &[Field], pk_fields: &[Field]) -> usize {
        fields.len().saturating_sub(pk_fields.len())
    }

    fn column_list(&self, fields: &[Field], ignore: &Ignore<'_>, geo: bool) -> String {
        retained(fields, ignore)
            .map(|f| {
                let name = self.colname(&f.col);
                if geo && self.config.is_geo(&f.ty) {
                    format!("ST_AsBinary({name})")
                } else {
                    name
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn placeholder(&self, field: &Field, position: usize) -> String {
        if self.config.is_geo(&field.ty) {
            GEO_PLACEHOLDER.to_string()
        } else {
            self.loader.nth_param(position)
        }
    }

    fn placeholder_list(&self, fields: &[Field], start: usize, ignore: &Ignore<'_>) -> String {
        retained(fields, ignore)
            .enumerate()
            .map(|(i, f)| self.placeholder(f, start + i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn assignment_clause(
        &self,
        fields: &[Field],
        has_deleted_field: bool,
        sep: &str,
        start: usize,
        ignore: &Ignore<'_>,
    ) -> String {
        let mut deleted_present = false;

        let mut clause = retained(fields, ignore)
            .enumerate()
            .map(|(i, f)| {
                if f.name == DELETED_FIELD {
                    deleted_present = true;
                }
                format!("{} = {}", self.colname(&f.col), self.placeholder(f, start + i))
            })
            .collect::<Vec<_>>()
            .join(sep);

        if has_deleted_field && !deleted_present {
            clause.push_str(sep);
            clause.push_str(SOFT_DELETE_PREDICATE);
        }

        clause
    }
}

fn field_list(fields: &[Field], prefix: &str, ignore: &Ignore<'_>) -> String {
    retained(fields, ignore)
        .map(|f| format!("{prefix}.{}", f.name))
        .collect::<Vec<_>>()
        .join(", ")
}
