//! Constraints: single comparisons over one artifact property.
//!
//! A [`Constraint`] reads `artifact.property <op> threshold`. Constraints on the
//! same artifact and property are partially ordered by [`Constraint::subsumes`];
//! constraints on different properties are never comparable.
//!
//! - **Operators** ([`Operator`]): parsed from loose spellings into a closed enum
//! - **Thresholds** ([`Threshold`]): numeric when the value parses as a number
//! - **Contexts** ([`context::Context`]): conjunctive sets of constraints

pub mod context;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConstraintError;

/// Result type for constraint operations.
pub type ConstraintResult<T> = std::result::Result<T, ConstraintError>;

/// Canonical comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "=")]
    Equal,
}

impl Operator {
    /// Canonical symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::LessOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterOrEqual => ">=",
            Self::Equal => "=",
        }
    }
}

impl FromStr for Operator {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "<" | "lt" | "lessthan" | "less" | "below" => Ok(Self::LessThan),
            "<=" | "=<" | "le" | "lte" | "lessequal" | "lessorequal" | "lessthanorequal"
            | "lessthanequal" | "atmost" => Ok(Self::LessOrEqual),
            ">" | "gt" | "greaterthan" | "greater" | "above" => Ok(Self::GreaterThan),
            ">=" | "=>" | "ge" | "gte" | "greaterequal" | "greaterorequal"
            | "greaterthanorequal" | "greaterthanequal" | "atleast" => Ok(Self::GreaterOrEqual),
            "=" | "==" | "eq" | "equal" | "equals" | "is" => Ok(Self::Equal),
            _ => Err(ConstraintError::UnknownOperator {
                operator: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Threshold value of a constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Number(f64),
    Text(String),
}

impl Threshold {
    /// Parse a lexical value: numeric when it parses as a finite number.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::Text(raw.to_string()),
        }
    }

    /// Read a threshold from a JSON evidence field. `null` yields `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number),
            serde_json::Value::String(s) => Some(Self::parse(s)),
            serde_json::Value::Bool(b) => Some(Self::Text(b.to_string())),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

/// One comparison `artifact.property <operator> threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// URI of the artifact the property belongs to.
    pub artifact: String,
    /// Property name, local to the artifact.
    pub property: String,
    pub operator: Operator,
    pub threshold: Threshold,
}

impl Constraint {
    pub fn new(
        artifact: impl Into<String>,
        property: impl Into<String>,
        operator: Operator,
        threshold: Threshold,
    ) -> Self {
        Self {
            artifact: artifact.into(),
            property: property.into(),
            operator,
            threshold,
        }
    }

    /// Build a constraint from loosely-typed parts, canonicalizing the operator.
    pub fn from_parts(
        artifact: &str,
        property: &str,
        operator: &str,
        threshold: Threshold,
    ) -> ConstraintResult<Self> {
        if artifact.trim().is_empty() {
            return Err(ConstraintError::MissingField { field: "artifact" });
        }
        if property.trim().is_empty() {
            return Err(ConstraintError::MissingField { field: "property" });
        }
        Ok(Self::new(
            artifact.trim(),
            property.trim(),
            operator.parse()?,
            threshold,
        ))
    }

    /// Whether both constraints talk about the same artifact property.
    pub fn same_dimension(&self, other: &Constraint) -> bool {
        self.artifact == other.artifact && self.property == other.property
    }

    /// Whether any state satisfying `self` also satisfies `other`.
    ///
    /// Only constraints on the same artifact property are comparable. The
    /// mixed-strictness cases are listed pair by pair: `<` and `<=` (and `>`
    /// and `>=`) compare thresholds non-strictly in both directions, and an
    /// inclusive bound subsumes an equality sitting exactly on it.
    pub fn subsumes(&self, other: &Constraint) -> bool {
        if !self.same_dimension(other) {
            return false;
        }

        let (a, b) = match (&self.threshold, &other.threshold) {
            (Threshold::Number(a), Threshold::Number(b)) => (*a, *b),
            (Threshold::Text(a), Threshold::Text(b)) => {
                return self.operator == Operator::Equal
                    && other.operator == Operator::Equal
                    && a == b;
            }
            _ => return false,
        };

        use Operator::*;
        match (self.operator, other.operator) {
            (LessThan, LessThan) => a <= b,
            (LessThan, LessOrEqual) => a <= b,
            (LessOrEqual, LessThan) => a <= b,
            (LessOrEqual, LessOrEqual) => a <= b,

            (GreaterThan, GreaterThan) => a >= b,
            (GreaterThan, GreaterOrEqual) => a >= b,
            (GreaterOrEqual, GreaterThan) => a >= b,
            (GreaterOrEqual, GreaterOrEqual) => a >= b,

            (Equal, Equal) => a == b,
            (Equal, LessThan) => a < b,
            (Equal, LessOrEqual) => a <= b,
            (Equal, GreaterThan) => a > b,
            (Equal, GreaterOrEqual) => a >= b,

            (LessOrEqual, Equal) => a == b,
            (GreaterOrEqual, Equal) => a == b,
            (LessThan, Equal) | (GreaterThan, Equal) => false,

            (LessThan | LessOrEqual, GreaterThan | GreaterOrEqual)
            | (GreaterThan | GreaterOrEqual, LessThan | LessOrEqual) => false,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{} {} {}",
            self.artifact, self.property, self.operator, self.threshold
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAMP: &str = "http://localhost:8080/workspaces/lab308/artifacts/lamp1";

    fn c(op: Operator, n: f64) -> Constraint {
        Constraint::new(LAMP, "luminosity", op, Threshold::Number(n))
    }

    fn text(op: Operator, s: &str) -> Constraint {
        Constraint::new(LAMP, "state", op, Threshold::Text(s.into()))
    }

    use Operator::*;

    #[test]
    fn operator_spellings_canonicalize() {
        for (raw, op) in [
            ("<", LessThan),
            ("lessThan", LessThan),
            ("less_than", LessThan),
            ("<=", LessOrEqual),
            ("lessEqual", LessOrEqual),
            ("lessThanOrEqual", LessOrEqual),
            (">", GreaterThan),
            ("greaterThan", GreaterThan),
            (">=", GreaterOrEqual),
            ("greaterEqual", GreaterOrEqual),
            ("=", Equal),
            ("equals", Equal),
            ("EQ", Equal),
        ] {
            assert_eq!(raw.parse::<Operator>().unwrap(), op, "spelling {raw}");
        }
        assert!(matches!(
            "approximately".parse::<Operator>(),
            Err(ConstraintError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn reflexive_for_every_operator() {
        for op in [LessThan, LessOrEqual, GreaterThan, GreaterOrEqual, Equal] {
            let x = c(op, 42.0);
            assert!(x.subsumes(&x), "{op} should subsume itself");
        }
        let s = text(Equal, "on");
        assert!(s.subsumes(&s));
    }

    #[test]
    fn different_property_never_comparable() {
        let a = c(LessThan, 100.0);
        let mut b = c(LessThan, 100.0);
        b.property = "temperature".into();
        assert!(!a.subsumes(&b));
        let mut d = c(LessThan, 100.0);
        d.artifact = format!("{LAMP}2");
        assert!(!a.subsumes(&d));
    }

    #[test]
    fn same_operator_upper_bounds() {
        assert!(c(LessThan, 300.0).subsumes(&c(LessThan, 500.0)));
        assert!(!c(LessThan, 500.0).subsumes(&c(LessThan, 300.0)));
        assert!(c(LessOrEqual, 300.0).subsumes(&c(LessOrEqual, 300.0)));
        assert!(!c(LessOrEqual, 301.0).subsumes(&c(LessOrEqual, 300.0)));
    }

    #[test]
    fn same_operator_lower_bounds() {
        assert!(c(GreaterThan, 500.0).subsumes(&c(GreaterThan, 300.0)));
        assert!(!c(GreaterThan, 300.0).subsumes(&c(GreaterThan, 500.0)));
        assert!(c(GreaterOrEqual, 10.0).subsumes(&c(GreaterOrEqual, 10.0)));
        assert!(!c(GreaterOrEqual, 9.0).subsumes(&c(GreaterOrEqual, 10.0)));
    }

    #[test]
    fn equality_pairs() {
        assert!(c(Equal, 5.0).subsumes(&c(Equal, 5.0)));
        assert!(!c(Equal, 5.0).subsumes(&c(Equal, 6.0)));
    }

    #[test]
    fn equality_subsumes_satisfied_inequality() {
        assert!(c(Equal, 5.0).subsumes(&c(LessThan, 10.0)));
        assert!(!c(Equal, 10.0).subsumes(&c(LessThan, 10.0)));
        assert!(c(Equal, 10.0).subsumes(&c(LessOrEqual, 10.0)));
        assert!(!c(Equal, 11.0).subsumes(&c(LessOrEqual, 10.0)));
        assert!(c(Equal, 11.0).subsumes(&c(GreaterThan, 10.0)));
        assert!(!c(Equal, 10.0).subsumes(&c(GreaterThan, 10.0)));
        assert!(c(Equal, 10.0).subsumes(&c(GreaterOrEqual, 10.0)));
        assert!(!c(Equal, 9.0).subsumes(&c(GreaterOrEqual, 10.0)));
    }

    #[test]
    fn inequality_subsumes_equality_only_inclusive_at_boundary() {
        assert!(c(LessOrEqual, 5.0).subsumes(&c(Equal, 5.0)));
        assert!(!c(LessOrEqual, 6.0).subsumes(&c(Equal, 5.0)));
        assert!(c(GreaterOrEqual, 5.0).subsumes(&c(Equal, 5.0)));
        assert!(!c(GreaterOrEqual, 4.0).subsumes(&c(Equal, 5.0)));
        assert!(!c(LessThan, 5.0).subsumes(&c(Equal, 5.0)));
        assert!(!c(LessThan, 6.0).subsumes(&c(Equal, 5.0)));
        assert!(!c(GreaterThan, 5.0).subsumes(&c(Equal, 5.0)));
        assert!(!c(GreaterThan, 4.0).subsumes(&c(Equal, 5.0)));
    }

    #[test]
    fn mixed_strictness_upper() {
        assert!(c(LessOrEqual, 5.0).subsumes(&c(LessThan, 5.0)));
        assert!(c(LessOrEqual, 4.0).subsumes(&c(LessThan, 5.0)));
        assert!(!c(LessOrEqual, 6.0).subsumes(&c(LessThan, 5.0)));
        assert!(c(LessThan, 5.0).subsumes(&c(LessOrEqual, 5.0)));
        assert!(!c(LessThan, 5.0).subsumes(&c(LessOrEqual, 4.0)));
        assert!(c(LessThan, 4.0).subsumes(&c(LessOrEqual, 5.0)));
    }

    #[test]
    fn mixed_strictness_lower() {
        assert!(c(GreaterOrEqual, 5.0).subsumes(&c(GreaterThan, 5.0)));
        assert!(c(GreaterOrEqual, 6.0).subsumes(&c(GreaterThan, 5.0)));
        assert!(!c(GreaterOrEqual, 4.0).subsumes(&c(GreaterThan, 5.0)));
        assert!(c(GreaterThan, 5.0).subsumes(&c(GreaterOrEqual, 5.0)));
        assert!(!c(GreaterThan, 4.0).subsumes(&c(GreaterOrEqual, 5.0)));
    }

    #[test]
    fn opposite_directions_never_subsume() {
        for (a, b) in [
            (LessThan, GreaterThan),
            (LessThan, GreaterOrEqual),
            (LessOrEqual, GreaterThan),
            (GreaterThan, LessThan),
            (GreaterOrEqual, LessOrEqual),
        ] {
            assert!(!c(a, 5.0).subsumes(&c(b, 1.0)), "{a} vs {b}");
            assert!(!c(a, 1.0).subsumes(&c(b, 5.0)), "{a} vs {b}");
        }
    }

    #[test]
    fn text_thresholds_support_only_equality() {
        assert!(text(Equal, "on").subsumes(&text(Equal, "on")));
        assert!(!text(Equal, "on").subsumes(&text(Equal, "off")));
        assert!(!text(LessThan, "on").subsumes(&text(LessThan, "on")));
        assert!(!text(Equal, "on").subsumes(&text(LessOrEqual, "on")));
    }

    #[test]
    fn mixed_threshold_kinds_are_incomparable() {
        let num = Constraint::new(LAMP, "state", Equal, Threshold::Number(1.0));
        let txt = text(Equal, "1x");
        assert!(!num.subsumes(&txt));
        assert!(!txt.subsumes(&num));
    }

    #[test]
    fn mutual_subsumption_implies_equal_thresholds() {
        let ops = [LessThan, LessOrEqual, GreaterThan, GreaterOrEqual, Equal];
        let values = [1.0, 5.0, 9.0];
        for &oa in &ops {
            for &ob in &ops {
                for &va in &values {
                    for &vb in &values {
                        let (a, b) = (c(oa, va), c(ob, vb));
                        if a.subsumes(&b) && b.subsumes(&a) {
                            assert_eq!(va, vb, "{a} <-> {b}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn threshold_parsing() {
        assert_eq!(Threshold::parse("300"), Threshold::Number(300.0));
        assert_eq!(Threshold::parse(" 2.5 "), Threshold::Number(2.5));
        assert_eq!(Threshold::parse("on"), Threshold::Text("on".into()));
        assert_eq!(
            Threshold::from_json(&serde_json::json!(300)),
            Some(Threshold::Number(300.0))
        );
        assert_eq!(
            Threshold::from_json(&serde_json::json!("off")),
            Some(Threshold::Text("off".into()))
        );
        assert_eq!(Threshold::from_json(&serde_json::Value::Null), None);
    }

    #[test]
    fn from_parts_requires_names() {
        assert!(matches!(
            Constraint::from_parts("", "luminosity", "<", Threshold::Number(1.0)),
            Err(ConstraintError::MissingField { field: "artifact" })
        ));
        let ok = Constraint::from_parts(LAMP, "luminosity", "lessThan", Threshold::Number(300.0))
            .unwrap();
        assert_eq!(ok.operator, LessThan);
    }
}
