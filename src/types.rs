//! Go type mapping and conversions.

use crate::generator::Generator;
use crate::model::Field;
use crate::naming;
use crate::sql::{retained, Ignore};

/// Prefix shared by the `database/sql` nullable wrappers.
const SQL_NULL_PREFIX: &str = "sql.Null";

impl Generator {
    /// Qualifies `ty` with the custom type package unless it is already
    /// qualified or known. Leading `[]` markers are kept in front.
    pub fn retype(&self, ty: &str) -> String {
        if ty.contains('.') {
            return ty.to_string();
        }

        let bare = ty.trim_start_matches("[]");
        let slices = &ty[..ty.len() - bare.len()];

        if self.config.known_types.contains(bare) {
            return ty.to_string();
        }

        format!("{slices}{}{bare}", self.package_prefix())
    }

    /// Like [`Generator::retype`] for zero value spellings such as `T{}`.
    pub fn reniltype(&self, ty: &str) -> String {
        if ty.contains('.') {
            return ty.to_string();
        }

        match ty.strip_suffix("{}") {
            Some(bare) if !self.config.known_types.contains(bare) => {
                format!("{}{ty}", self.package_prefix())
            }
            _ => ty.to_string(),
        }
    }

    fn package_prefix(&self) -> String {
        match self.config.custom_type_package.as_str() {
            "" => String::new(),
            pkg => format!("{pkg}."),
        }
    }

    /// Go expression reading `prefix.from` so that it is assignable to a
    /// field of `to`'s type.
    ///
    /// `sql.Null*` sources are unwrapped through their value accessor first.
    pub fn convext(&self, prefix: &str, from: &Field, to: &Field) -> String {
        let mut expr = format!("{prefix}.{}", from.name);
        if from.ty == to.ty {
            return expr;
        }

        let mut from_ty = from.ty.clone();
        if let Some(wrapped) = from.ty.strip_prefix(SQL_NULL_PREFIX) {
            expr = format!("{expr}.{wrapped}");
            from_ty = wrapped.to_lowercase();
        }

        if to.ty != from_ty {
            expr = format!("{}({expr})", to.ty);
        }

        expr
    }

    /// Go parameter list for `fields`: `a, b` or, with `add_type`,
    /// `a T1, b T2`. With `add_prefix` a non-empty list starts with `, `.
    pub fn goparamlist(
        &self,
        fields: &[Field],
        add_prefix: bool,
        add_type: bool,
        ignore: &[&str],
    ) -> String {
        let ignore = Ignore::names(ignore);

        let list = retained(fields, &ignore)
            .enumerate()
            .map(|(i, f)| {
                let name = self.resolver().param_name(&f.name, i);
                if add_type {
                    format!("{name} {}", self.retype(&f.ty))
                } else {
                    name
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        if add_prefix && !list.is_empty() {
            format!(", {list}")
        } else {
            list
        }
    }

    pub fn pluralize(&self, name: &str) -> String {
        pluralizer::pluralize(name, 2, false)
    }

    /// See [`naming::snake_to_camel`].
    pub fn snaketocamel(&self, name: &str) -> String {
        naming::snake_to_camel(name)
    }
}
