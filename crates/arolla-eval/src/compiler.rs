//! Lowering an expression with concrete input qtypes to a plan.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use arolla_core::{Fingerprint, QType};
use arolla_expr::{
    Expr, ExprError, ExprKind, OperatorKind, post_order, substitute_leaves, to_lowest,
    track_resolutions,
};

use crate::cache::{self, CacheKey};
use crate::error::{EvalError, Result};
use crate::options::CompileOptions;
use crate::plan::{CompiledExpr, Instruction, run_kernel};

/// Compile `expr` for the given leaf qtypes, reusing a cached artifact when
/// one exists for the same expression, qtypes and options.
#[tracing::instrument(level = "debug", skip_all, fields(fingerprint = %expr.fingerprint().short()))]
pub fn compile(
    expr: &Expr,
    input_qtypes: &[(&str, QType)],
    options: CompileOptions,
) -> Result<Arc<CompiledExpr>> {
    let key = CacheKey::new(expr.fingerprint(), input_qtypes, options);
    if let Some(compiled) = cache::lookup(&key) {
        tracing::trace!("compile cache hit");
        return Ok(compiled);
    }
    tracing::debug!(inputs = input_qtypes.len(), "compile cache miss");
    let (compiled, stamps) =
        track_resolutions(|| compile_uncached(expr, input_qtypes, options));
    Ok(cache::insert(key, Arc::new(compiled?), stamps))
}

/// Compile without consulting or filling the cache.
pub fn compile_uncached(
    expr: &Expr,
    input_qtypes: &[(&str, QType)],
    options: CompileOptions,
) -> Result<CompiledExpr> {
    if let Some(key) = expr.placeholder_keys().into_iter().next() {
        return Err(EvalError::Placeholder(key));
    }
    let typed = annotate_leaves(expr, input_qtypes)?;
    let lowest = to_lowest(&typed)?;
    PlanBuilder::new(options).build(expr.fingerprint(), &lowest)
}

/// Replace each leaf with a typed leaf of its input qtype. Leaves already
/// typed may be left out of `input_qtypes`.
fn annotate_leaves(expr: &Expr, input_qtypes: &[(&str, QType)]) -> Result<Expr> {
    let given: HashMap<&str, QType> = input_qtypes.iter().copied().collect();
    let mut subs = HashMap::new();
    for node in post_order(expr) {
        let ExprKind::Leaf(key) = node.kind() else {
            continue;
        };
        let input = match (given.get(key.as_str()), node.qtype()) {
            (Some(&input), Some(declared)) if input != declared => {
                return Err(EvalError::LeafQTypeConflict {
                    key: key.clone(),
                    declared,
                    input,
                });
            }
            (Some(&input), _) => input,
            (None, Some(declared)) => declared,
            (None, None) => return Err(EvalError::UnboundLeaf(key.clone())),
        };
        subs.insert(key.clone(), Expr::typed_leaf(key.clone(), input));
    }
    Ok(substitute_leaves(expr, &subs)?)
}

struct PlanBuilder {
    options: CompileOptions,
    instructions: Vec<Instruction>,
    slots: HashMap<Fingerprint, usize>,
    inputs: BTreeMap<String, QType>,
}

impl PlanBuilder {
    fn new(options: CompileOptions) -> Self {
        Self {
            options,
            instructions: Vec::new(),
            slots: HashMap::new(),
            inputs: BTreeMap::new(),
        }
    }

    fn build(mut self, fingerprint: Fingerprint, lowest: &Expr) -> Result<CompiledExpr> {
        for node in post_order(lowest) {
            let instruction = self.instruction_for(&node)?;
            self.slots.insert(node.fingerprint(), self.instructions.len());
            self.instructions.push(instruction);
        }
        let output = self.slots[&lowest.fingerprint()];
        Ok(CompiledExpr {
            fingerprint,
            input_qtypes: self.inputs,
            instructions: self.instructions,
            output,
        })
    }

    fn instruction_for(&mut self, node: &Expr) -> Result<Instruction> {
        if let Some(value) = node.qvalue() {
            return Ok(Instruction::Constant(value.clone()));
        }
        match node.kind() {
            ExprKind::Leaf(key) => {
                let qtype = node.qtype().ok_or_else(|| EvalError::UnboundLeaf(key.clone()))?;
                self.inputs.insert(key.clone(), qtype);
                Ok(Instruction::Input {
                    key: key.clone(),
                    qtype,
                })
            }
            ExprKind::Placeholder(key) => Err(EvalError::Placeholder(key.clone())),
            ExprKind::Literal(value) => Ok(Instruction::Constant(value.clone())),
            ExprKind::Operator { op, deps } => {
                let output = node.qtype().ok_or_else(|| EvalError::UnresolvedQType {
                    operator: op.name().to_owned(),
                })?;
                let args: Vec<usize> = deps.iter().map(|dep| self.slots[&dep.fingerprint()]).collect();
                match op.kind() {
                    OperatorKind::Backend(backend) => {
                        let kernel = backend.kernel().clone();
                        if let Some(folded) = self.try_fold(op.name(), &kernel, &args, output) {
                            return Ok(folded);
                        }
                        Ok(Instruction::Call {
                            operator: op.name().to_owned(),
                            kernel,
                            args,
                            output,
                        })
                    }
                    OperatorKind::GetNth(index) => Ok(Instruction::GetNth {
                        input: args[0],
                        index: *index,
                        output,
                    }),
                    OperatorKind::Dummy(_) => Err(ExprError::ImplementationMissing {
                        operator: op.name().to_owned(),
                    }
                    .into()),
                    OperatorKind::Lambda(_)
                    | OperatorKind::Overloaded(_)
                    | OperatorKind::Registered(_) => Err(EvalError::UnresolvedQType {
                        operator: op.name().to_owned(),
                    }),
                }
            }
        }
    }

    /// Evaluate a call over constant slots. Kernel failures are left for
    /// execution time, where they carry the usual error context.
    fn try_fold(
        &self,
        operator: &str,
        kernel: &arolla_expr::operator::KernelFn,
        args: &[usize],
        output: QType,
    ) -> Option<Instruction> {
        if !self.options.fold_literals {
            return None;
        }
        let values = args
            .iter()
            .map(|&slot| match &self.instructions[slot] {
                Instruction::Constant(value) => Some(value.clone()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;
        match run_kernel(operator, kernel, &values, output) {
            Ok(value) => Some(Instruction::Constant(value)),
            Err(err) => {
                tracing::trace!(operator, error = %err, "literal folding skipped");
                None
            }
        }
    }
}
