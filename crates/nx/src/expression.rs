//! Expression set model and text rendering.
//!
//! Every expression renders as one `NAME=VALUE` line. Comment lines start
//! with `#` and carry no data.

use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Decimal places written for real numbers.
pub const DECIMALS: usize = 3;

/// An expression value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ExpressionValue {
    /// Real number, written with three decimals.
    Number(f64),
    /// Angle in degrees, written with one decimal.
    Angle(f64),
    /// Count.
    Integer(i64),
    /// Boolean flag, written as `TRUE`/`FALSE`.
    Flag(bool),
    /// Quoted text.
    Text(String),
}

impl ExpressionValue {
    /// Numeric value, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ExpressionValue::Number(v) | ExpressionValue::Angle(v) => Some(*v),
            ExpressionValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl fmt::Display for ExpressionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Avoid "-0.000".
            ExpressionValue::Number(v) => {
                let v = if v.abs() < 0.5e-3 { 0.0 } else { *v };
                write!(f, "{:.*}", DECIMALS, v)
            }
            ExpressionValue::Angle(v) => {
                let v = if v.abs() < 0.05 { 0.0 } else { *v };
                write!(f, "{:.1}", v)
            }
            ExpressionValue::Integer(v) => write!(f, "{}", v),
            ExpressionValue::Flag(true) => f.write_str("TRUE"),
            ExpressionValue::Flag(false) => f.write_str("FALSE"),
            ExpressionValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<f64> for ExpressionValue {
    fn from(v: f64) -> Self {
        ExpressionValue::Number(v)
    }
}

impl From<usize> for ExpressionValue {
    fn from(v: usize) -> Self {
        ExpressionValue::Integer(v as i64)
    }
}

impl From<bool> for ExpressionValue {
    fn from(v: bool) -> Self {
        ExpressionValue::Flag(v)
    }
}

impl From<&str> for ExpressionValue {
    fn from(v: &str) -> Self {
        ExpressionValue::Text(v.to_string())
    }
}

/// How an expression is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ExpressionKind {
    /// Stand-alone scalar (dimensions, counts, instance data).
    Scalar,
    /// One of the six `_X1.._Z2` corner coordinates of a block.
    TwoPoint,
    /// One of the seven base-corner-plus-extent parameters.
    SevenParameter,
    /// `_SUPPRESSED=TRUE` marker of an inactive block.
    Suppression,
}

/// A named expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Expression {
    /// Expression name.
    pub name: String,
    /// Value.
    pub value: ExpressionValue,
    /// Derivation.
    pub kind: ExpressionKind,
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Ordered expressions plus their rendered text.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ExpressionSet {
    /// Expressions in output order.
    pub entries: Vec<Expression>,
    /// Rendered listing with comments.
    pub text: String,
}

impl ExpressionSet {
    /// Looks up an expression by name.
    pub fn get(&self, name: &str) -> Option<&Expression> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Numeric value of an expression.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|e| e.value.as_f64())
    }

    /// Number of expressions of a kind.
    pub fn count_of(&self, kind: ExpressionKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Number of expressions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accumulates expressions and the rendered listing together.
#[derive(Debug, Default)]
pub struct ExpressionWriter {
    entries: Vec<Expression>,
    text: String,
}

impl ExpressionWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a `#` comment line.
    pub fn comment(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if line.is_empty() {
            self.text.push_str("#\n");
        } else {
            self.text.push_str("# ");
            self.text.push_str(line);
            self.text.push('\n');
        }
    }

    /// Writes an empty line.
    pub fn blank(&mut self) {
        self.text.push('\n');
    }

    /// Writes an expression.
    pub fn push(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ExpressionValue>,
        kind: ExpressionKind,
    ) {
        let expression = Expression {
            name: name.into(),
            value: value.into(),
            kind,
        };
        self.text.push_str(&expression.to_string());
        self.text.push('\n');
        self.entries.push(expression);
    }

    /// Writes a scalar expression.
    pub fn scalar(&mut self, name: impl Into<String>, value: impl Into<ExpressionValue>) {
        self.push(name, value, ExpressionKind::Scalar);
    }

    /// Finishes the set.
    pub fn finish(self) -> ExpressionSet {
        ExpressionSet {
            entries: self.entries,
            text: self.text,
        }
    }
}

/// Parses a rendered listing back into `(name, raw value)` pairs, skipping comments.
pub fn parse_listing(text: &str) -> Vec<(&str, &str)> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| l.split_once('='))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_formatting() {
        assert_eq!(ExpressionValue::Number(1.23456).to_string(), "1.235");
        assert_eq!(ExpressionValue::Number(-0.0001).to_string(), "0.000");
        assert_eq!(ExpressionValue::Angle(-90.0).to_string(), "-90.0");
        assert_eq!(ExpressionValue::Integer(7).to_string(), "7");
        assert_eq!(ExpressionValue::Flag(true).to_string(), "TRUE");
        assert_eq!(ExpressionValue::Text("top".into()).to_string(), "\"top\"");
    }

    #[test]
    fn test_writer_keeps_text_and_entries_in_step() {
        let mut w = ExpressionWriter::new();
        w.comment("header");
        w.scalar("a", 1.0);
        w.blank();
        w.push("B_X1", -2.5, ExpressionKind::TwoPoint);
        let set = w.finish();

        assert_eq!(set.len(), 2);
        assert_eq!(set.text, "# header\na=1.000\n\nB_X1=-2.500\n");
        assert_eq!(set.number("B_X1"), Some(-2.5));
        assert_eq!(set.count_of(ExpressionKind::TwoPoint), 1);

        let parsed = parse_listing(&set.text);
        assert_eq!(parsed, vec![("a", "1.000"), ("B_X1", "-2.500")]);
    }
}
