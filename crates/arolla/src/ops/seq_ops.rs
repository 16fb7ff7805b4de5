//! `seq.*`: sequence construction and access.

use arolla_core::qtype::{INT64, QTypeKind, is_integral_qtype, is_scalar_qtype, sequence_qtype};
use arolla_core::{QType, QValue, Scalar};
use arolla_expr::{KernelError, Operator, Registry, Result, Signature};

use crate::lifting::RuleResult;

pub(super) fn register(registry: &Registry) -> Result<()> {
    let make = Operator::builder("seq.make")
        .doc("Returns a sequence of the arguments, which must share one qtype.")
        .signature(Signature::new().variadic("args"))
        .backend(make_rule, |args, output| {
            let value_qtype = output
                .value_qtype()
                .ok_or_else(|| KernelError::new(format!("{output} is not a sequence")))?;
            QValue::sequence(value_qtype, args.to_vec())
                .map_err(|err| KernelError::with_source("cannot build the sequence", err))
        })?;
    registry.register(make)?;

    let size = Operator::builder("seq.size")
        .doc("Returns the number of elements as INT64.")
        .signature(Signature::from_names(&["seq"]))
        .backend(
            |inputs: &[QType]| {
                sequence_value_qtype(inputs.first().copied())?;
                Ok(INT64)
            },
            |args, _| {
                let values = elements(&args[0])?;
                Ok(QValue::from(values.len() as i64))
            },
        )?;
    registry.register(size)?;

    let at = Operator::builder("seq.at")
        .doc("Returns the element at a zero-based index.")
        .signature(Signature::from_names(&["seq", "i"]))
        .backend(at_rule, |args, _| {
            let values = elements(&args[0])?;
            let index = args[1]
                .as_scalar()
                .and_then(Scalar::as_i64)
                .ok_or_else(|| KernelError::new("index must be an integer"))?;
            usize::try_from(index)
                .ok()
                .and_then(|i| values.get(i))
                .cloned()
                .ok_or_else(|| {
                    KernelError::new(format!(
                        "index {index} out of range for a sequence of size {}",
                        values.len()
                    ))
                })
        })?;
    registry.register(at)?;
    Ok(())
}

fn make_rule(inputs: &[QType]) -> RuleResult {
    let Some(&first) = inputs.first() else {
        return Err("expected at least one argument".to_owned());
    };
    if let Some(other) = inputs.iter().find(|qtype| **qtype != first) {
        return Err(format!("arguments must share one qtype, got {first} and {other}"));
    }
    Ok(sequence_qtype(first))
}

fn at_rule(inputs: &[QType]) -> RuleResult {
    let value_qtype = sequence_value_qtype(inputs.first().copied())?;
    match inputs.get(1) {
        Some(&index) if is_scalar_qtype(index) && is_integral_qtype(index) => Ok(value_qtype),
        Some(index) => Err(format!("expected an integer index, got {index}")),
        None => Err("expected 2 arguments".to_owned()),
    }
}

fn sequence_value_qtype(qtype: Option<QType>) -> RuleResult {
    match qtype {
        Some(qtype) => match qtype.kind() {
            QTypeKind::Sequence(value_qtype) => Ok(*value_qtype),
            _ => Err(format!("expected a sequence, got {qtype}")),
        },
        None => Err("expected a sequence argument".to_owned()),
    }
}

fn elements(value: &QValue) -> std::result::Result<&[QValue], KernelError> {
    value
        .as_sequence()
        .ok_or_else(|| KernelError::new(format!("expected a sequence, got {}", value.qtype())))
}
