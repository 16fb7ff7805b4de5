use arolla_core::{FingerprintHasher, QType};

use super::{Operator, known_qtypes};
use crate::condition::QTypeCondition;
use crate::error::{ExprError, Result};
use crate::expr::Expr;

/// When an overload candidate is chosen.
#[derive(Clone, Debug, PartialEq)]
pub enum OverloadCondition {
    /// The candidate's own qtype inference succeeds for the inputs.
    Accepts,
    QTypes(QTypeCondition),
}

#[derive(Clone, Debug)]
pub struct Overload {
    pub operator: Operator,
    pub condition: OverloadCondition,
}

impl Overload {
    pub fn new(operator: Operator, condition: QTypeCondition) -> Self {
        Self {
            operator,
            condition: OverloadCondition::QTypes(condition),
        }
    }

    /// Candidate selected whenever it type-checks.
    pub fn accepting(operator: Operator) -> Self {
        Self {
            operator,
            condition: OverloadCondition::Accepts,
        }
    }
}

/// Dispatches to the first candidate, in registration order, whose
/// condition holds.
#[derive(Clone, Debug, Default)]
pub struct OverloadedOperator {
    overloads: Vec<Overload>,
}

impl OverloadedOperator {
    pub(crate) fn new(overloads: Vec<Overload>) -> Self {
        Self { overloads }
    }

    pub fn overloads(&self) -> &[Overload] {
        &self.overloads
    }

    pub fn is_empty(&self) -> bool {
        self.overloads.is_empty()
    }

    /// `Ok(None)` while any input qtype is unknown.
    pub(crate) fn select(&self, owner: &Operator, deps: &[Expr]) -> Result<Option<Operator>> {
        let Some(qtypes) = known_qtypes(deps) else {
            return Ok(None);
        };
        for overload in &self.overloads {
            if !overload.operator.signature().accepts_arity(deps.len()) {
                continue;
            }
            let selected = match &overload.condition {
                OverloadCondition::QTypes(condition) => condition.eval(owner.signature(), &qtypes),
                OverloadCondition::Accepts => match overload.operator.infer_attr(deps) {
                    Ok(attr) => attr.qtype().is_some(),
                    Err(err) if err.is_type_error() => false,
                    Err(err) => return Err(err),
                },
            };
            if selected {
                tracing::trace!(
                    operator = owner.name(),
                    candidate = overload.operator.name(),
                    "overload selected"
                );
                return Ok(Some(overload.operator.clone()));
            }
        }
        Err(no_matching_overload(owner, qtypes))
    }

    pub(crate) fn hash_into(&self, hasher: &mut FingerprintHasher) {
        hasher.combine_u64(self.overloads.len() as u64);
        for overload in &self.overloads {
            hasher.combine_fingerprint(overload.operator.fingerprint());
            match &overload.condition {
                OverloadCondition::Accepts => {
                    hasher.combine_str("accepts");
                }
                OverloadCondition::QTypes(condition) => {
                    hasher.combine_fingerprint(condition.fingerprint());
                }
            }
        }
    }
}

fn no_matching_overload(owner: &Operator, qtypes: Vec<QType>) -> ExprError {
    ExprError::NoMatchingOverload {
        operator: owner.name().to_owned(),
        arguments: owner.signature().describe_args(&qtypes),
        qtypes,
    }
}
