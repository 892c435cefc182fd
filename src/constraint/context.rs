//! Contexts: conjunctive sets of constraints.
//!
//! Context `A` subsumes context `B` when every constraint of `B` is covered by
//! some constraint of `A` on the same artifact property. A dimension that `A`
//! never mentions cannot be covered.

use serde::{Deserialize, Serialize};

use super::Constraint;

/// An unordered set of constraints that must all hold.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    constraints: Vec<Constraint>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint unless an identical one is already present.
    pub fn insert(&mut self, constraint: Constraint) -> bool {
        if self.constraints.contains(&constraint) {
            return false;
        }
        self.constraints.push(constraint);
        true
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Whether satisfying `self` guarantees satisfying `other`.
    pub fn subsumes(&self, other: &Context) -> bool {
        other
            .constraints
            .iter()
            .all(|b| self.constraints.iter().any(|a| a.subsumes(b)))
    }

    /// Mutual subsumption: the two contexts state the same precondition.
    pub fn equivalent(&self, other: &Context) -> bool {
        self.subsumes(other) && other.subsumes(self)
    }
}

impl FromIterator<Constraint> for Context {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        let mut context = Context::new();
        for constraint in iter {
            context.insert(constraint);
        }
        context
    }
}

/// Content equality, independent of constraint order.
impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.constraints.iter().all(|c| other.constraints.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{Operator, Threshold};

    const LAMP: &str = "http://localhost:8080/workspaces/lab308/artifacts/lamp1";
    const BLINDS: &str = "http://localhost:8080/workspaces/lab308/artifacts/blinds1";

    fn lux(op: Operator, n: f64) -> Constraint {
        Constraint::new(LAMP, "luminosity", op, Threshold::Number(n))
    }

    fn closed(op: Operator, n: f64) -> Constraint {
        Constraint::new(BLINDS, "closedPercentage", op, Threshold::Number(n))
    }

    #[test]
    fn tighter_bound_subsumes_looser() {
        let strong: Context = [lux(Operator::LessThan, 300.0)].into_iter().collect();
        let weak: Context = [lux(Operator::LessThan, 500.0)].into_iter().collect();
        assert!(strong.subsumes(&weak));
        assert!(!weak.subsumes(&strong));
    }

    #[test]
    fn extra_conjunct_makes_context_more_specific() {
        let both: Context = [lux(Operator::LessThan, 300.0), closed(Operator::GreaterThan, 50.0)]
            .into_iter()
            .collect();
        let one: Context = [lux(Operator::LessThan, 300.0)].into_iter().collect();
        assert!(both.subsumes(&one));
        assert!(!one.subsumes(&both));
    }

    #[test]
    fn unmentioned_dimension_is_not_covered() {
        let a: Context = [lux(Operator::LessThan, 300.0)].into_iter().collect();
        let b: Context = [closed(Operator::GreaterThan, 50.0)].into_iter().collect();
        assert!(!a.subsumes(&b));
        assert!(!b.subsumes(&a));
    }

    #[test]
    fn empty_context_is_subsumed_by_everything() {
        let empty = Context::new();
        let a: Context = [lux(Operator::LessThan, 300.0)].into_iter().collect();
        assert!(a.subsumes(&empty));
        assert!(!empty.subsumes(&a));
        assert!(empty.subsumes(&empty));
    }

    #[test]
    fn equality_ignores_order_and_duplicates() {
        let a: Context = [lux(Operator::LessThan, 300.0), closed(Operator::GreaterThan, 50.0)]
            .into_iter()
            .collect();
        let b: Context = [
            closed(Operator::GreaterThan, 50.0),
            lux(Operator::LessThan, 300.0),
            lux(Operator::LessThan, 300.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(b.len(), 2);
        assert_eq!(a, b);
        assert!(a.equivalent(&b));
    }
}
