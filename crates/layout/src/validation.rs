//! Aggregated validation errors

use std::fmt;

/// One rejected value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Path of the offending value, e.g. `BaseAmount.FontSize`
    pub field: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Every violation found in one input, reported together
///
/// Never empty: build one through [`Violations::into_result`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether `field` is among the violations
    pub fn mentions(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collector for violations
#[derive(Debug, Default)]
pub struct Violations {
    prefix: Option<String>,
    found: Vec<Violation>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector whose field paths are prefixed with `prefix.`
    pub fn scoped(prefix: &str) -> Self {
        Self {
            prefix: Some(prefix.to_string()),
            found: Vec::new(),
        }
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        let field = match &self.prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };
        self.found.push(Violation {
            field,
            message: message.into(),
        });
    }

    /// Record a violation unless `min <= value <= max`
    pub fn check_range<T>(&mut self, field: &str, value: T, min: T, max: T)
    where
        T: PartialOrd + fmt::Display,
    {
        if value < min || value > max {
            self.push(field, format!("must be between {min} and {max} (got {value})"));
        }
    }

    /// Take over the violations of another collector
    pub fn extend(&mut self, other: Violations) {
        self.found.extend(other.found);
    }

    pub fn len(&self) -> usize {
        self.found.len()
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.found.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                violations: self.found,
            })
        }
    }
}
