//! Executable form of a compiled expression.
//!
//! A plan is a list of instructions in dependency order. Instruction `i`
//! produces slot `%i`; identical subexpressions share one slot.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Write as _};

use arolla_core::{Fingerprint, QType, QValue};
use arolla_expr::operator::KernelFn;

use crate::error::{EvalError, Result};

pub enum Instruction {
    Input {
        key: String,
        qtype: QType,
    },
    Constant(QValue),
    Call {
        operator: String,
        kernel: KernelFn,
        args: Vec<usize>,
        output: QType,
    },
    GetNth {
        input: usize,
        index: usize,
        output: QType,
    },
}

impl Instruction {
    pub fn output_qtype(&self) -> QType {
        match self {
            Self::Input { qtype, .. } => *qtype,
            Self::Constant(value) => value.qtype(),
            Self::Call { output, .. } | Self::GetNth { output, .. } => *output,
        }
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input { key, qtype } => write!(f, "Input(L.{key}: {qtype})"),
            Self::Constant(value) => write!(f, "Constant({value:?})"),
            Self::Call {
                operator, args, ..
            } => write!(f, "Call({operator}, {args:?})"),
            Self::GetNth { input, index, .. } => write!(f, "GetNth(%{input}, {index})"),
        }
    }
}

/// Immutable artifact produced by [`compile`](crate::compile).
#[derive(Debug)]
pub struct CompiledExpr {
    pub(crate) fingerprint: Fingerprint,
    pub(crate) input_qtypes: BTreeMap<String, QType>,
    pub(crate) instructions: Vec<Instruction>,
    pub(crate) output: usize,
}

impl CompiledExpr {
    /// Fingerprint of the expression as given to `compile`.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Qtype of every leaf the plan reads.
    pub fn input_qtypes(&self) -> &BTreeMap<String, QType> {
        &self.input_qtypes
    }

    pub fn output_qtype(&self) -> QType {
        self.instructions[self.output].output_qtype()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Run the plan. Inputs the plan does not read are ignored; the rest
    /// must have exactly the qtypes the plan was compiled for.
    pub fn execute(&self, inputs: &[(&str, QValue)]) -> Result<QValue> {
        let provided: HashMap<&str, &QValue> =
            inputs.iter().map(|(key, value)| (*key, value)).collect();
        for (key, expected) in &self.input_qtypes {
            let value = provided
                .get(key.as_str())
                .ok_or_else(|| EvalError::MissingInput(key.clone()))?;
            if value.qtype() != *expected {
                return Err(EvalError::InputQTypeMismatch {
                    key: key.clone(),
                    expected: *expected,
                    actual: value.qtype(),
                });
            }
        }

        let mut slots: Vec<QValue> = Vec::with_capacity(self.instructions.len());
        for instruction in &self.instructions {
            let value = match instruction {
                Instruction::Input { key, .. } => provided
                    .get(key.as_str())
                    .map(|value| (*value).clone())
                    .ok_or_else(|| EvalError::MissingInput(key.clone()))?,
                Instruction::Constant(value) => value.clone(),
                Instruction::Call {
                    operator,
                    kernel,
                    args,
                    output,
                } => {
                    let args: Vec<QValue> = args.iter().map(|&slot| slots[slot].clone()).collect();
                    run_kernel(operator, kernel, &args, *output)?
                }
                Instruction::GetNth {
                    input,
                    index,
                    output,
                } => get_nth(&slots[*input], *index, *output)?,
            };
            slots.push(value);
        }
        Ok(slots.swap_remove(self.output))
    }

    /// Human-readable listing of the plan.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let inputs: Vec<String> = self
            .input_qtypes
            .iter()
            .map(|(key, qtype)| format!("{key}: {qtype}"))
            .collect();
        if inputs.is_empty() {
            out.push_str("inputs: none\n");
        } else {
            let _ = writeln!(out, "inputs: {}", inputs.join(", "));
        }
        for (slot, instruction) in self.instructions.iter().enumerate() {
            let _ = write!(out, "  %{slot} = ");
            match instruction {
                Instruction::Input { key, .. } => {
                    let _ = write!(out, "input L.{key}");
                }
                Instruction::Constant(value) => {
                    let _ = write!(out, "const {value}");
                }
                Instruction::Call { operator, args, .. } => {
                    let args: Vec<String> = args.iter().map(|a| format!("%{a}")).collect();
                    let _ = write!(out, "{operator}({})", args.join(", "));
                }
                Instruction::GetNth { input, index, .. } => {
                    let _ = write!(out, "%{input}[{index}]");
                }
            }
            let _ = writeln!(out, " : {}", instruction.output_qtype());
        }
        let _ = write!(out, "output: %{}", self.output);
        out
    }
}

/// Field `index` of a tuple slot; the field must have the planned qtype.
fn get_nth(tuple: &QValue, index: usize, output: QType) -> Result<QValue> {
    let field = tuple.as_tuple().and_then(|fields| fields.get(index));
    match field {
        Some(value) if value.qtype() == output => Ok(value.clone()),
        _ => Err(EvalError::KernelOutputMismatch {
            operator: arolla_expr::operator::GET_NTH_NAME.to_owned(),
            expected: output,
            actual: field.map_or(tuple.qtype(), QValue::qtype),
        }),
    }
}

pub(crate) fn run_kernel(
    operator: &str,
    kernel: &KernelFn,
    args: &[QValue],
    output: QType,
) -> Result<QValue> {
    let value = kernel(args, output).map_err(|source| EvalError::Evaluation {
        operator: operator.to_owned(),
        source,
    })?;
    if value.qtype() != output {
        return Err(EvalError::KernelOutputMismatch {
            operator: operator.to_owned(),
            expected: output,
            actual: value.qtype(),
        });
    }
    Ok(value)
}
