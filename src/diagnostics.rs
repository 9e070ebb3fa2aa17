use indexmap::IndexSet;
use std::cell::RefCell;
use std::fmt;

/// A recoverable problem found while generating.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Warning {
    /// A nullable field with no wrapper type mapping was left out of the
    /// protobuf conversion bodies.
    UnmappedNullable { type_name: String, field: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnmappedNullable { type_name, field } => {
                write!(f, "{type_name}.{field} could be null, skipping!")
            }
        }
    }
}

/// Append-only warning log for one generation run.
///
/// Each distinct warning is recorded and logged once, no matter how many
/// templates run into it.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: RefCell<IndexSet<Warning>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn warn(&self, warning: Warning) {
        let mut warnings = self.warnings.borrow_mut();
        if warnings.contains(&warning) {
            return;
        }

        log::warn!("{warning}");
        warnings.insert(warning);
    }

    /// Warnings recorded so far, in the order they were first seen.
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.borrow().iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unmapped(field: &str) -> Warning {
        Warning::UnmappedNullable {
            type_name: "User".to_string(),
            field: field.to_string(),
        }
    }

    #[test]
    fn test_records_each_warning_once() {
        let diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());

        diagnostics.warn(unmapped("Location"));
        diagnostics.warn(unmapped("Avatar"));
        diagnostics.warn(unmapped("Location"));

        assert_eq!(
            diagnostics.warnings(),
            vec![unmapped("Location"), unmapped("Avatar")]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            unmapped("Location").to_string(),
            "User.Location could be null, skipping!"
        );
    }
}
