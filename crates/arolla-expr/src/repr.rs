//! Human-readable expression text.
//!
//! Leaves print as `L.key`, placeholders as `P.key`, literals as their qvalue
//! text and operator calls as `name(arg, ...)`. Operators can install a
//! custom renderer with [`register_op_repr_fn`]; the helpers in this module
//! build the usual infix, prefix and subscript forms and insert parentheses
//! from the operands' [`Precedence`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use arolla_core::{Fingerprint, QValue};
use parking_lot::RwLock;

use crate::expr::{Expr, ExprKind};
use crate::operator::OperatorKind;
pub use crate::signature::is_identifier;
use crate::visitors::post_order;

/// Binding levels; lower binds tighter.
pub mod level {
    pub const SUBSCRIPT: i8 = 0;
    pub const POWER: i8 = 1;
    pub const UNARY: i8 = 2;
    pub const MULTIPLICATIVE: i8 = 3;
    pub const ADDITIVE: i8 = 4;
    pub const AND: i8 = 6;
    pub const OR: i8 = 7;
    pub const COMPARISON: i8 = 8;
}

/// How tightly a token binds on each side. `-1` never needs parentheses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Precedence {
    pub left: i8,
    pub right: i8,
}

impl Precedence {
    pub const ATOM: Self = Self::new(-1, -1);

    pub const fn new(left: i8, right: i8) -> Self {
        Self { left, right }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReprToken {
    pub text: String,
    pub precedence: Precedence,
}

impl ReprToken {
    pub fn atom(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            precedence: Precedence::ATOM,
        }
    }

    fn parenthesized(&self) -> String {
        format!("({})", self.text)
    }
}

impl fmt::Display for ReprToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Renders an operator node from its dependency tokens. `None` falls back to
/// the default call syntax.
pub type ReprFn = Arc<dyn Fn(&Expr, &[ReprToken]) -> Option<ReprToken> + Send + Sync>;

static REPR_FNS: LazyLock<RwLock<HashMap<String, ReprFn>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Install a renderer for nodes of the operator named `name`.
pub fn register_op_repr_fn(
    name: &str,
    repr: impl Fn(&Expr, &[ReprToken]) -> Option<ReprToken> + Send + Sync + 'static,
) {
    REPR_FNS.write().insert(name.to_owned(), Arc::new(repr));
}

pub fn to_debug_string(expr: &Expr) -> String {
    let mut tokens: HashMap<Fingerprint, ReprToken> = HashMap::new();
    for node in post_order(expr) {
        let token = node_token(&node, &tokens);
        tokens.insert(node.fingerprint(), token);
    }
    tokens
        .remove(&expr.fingerprint())
        .map(|token| token.text)
        .unwrap_or_default()
}

fn node_token(node: &Expr, tokens: &HashMap<Fingerprint, ReprToken>) -> ReprToken {
    match node.kind() {
        ExprKind::Leaf(key) => keyed("L", key),
        ExprKind::Placeholder(key) => keyed("P", key),
        ExprKind::Literal(value) => literal_token(value),
        ExprKind::Operator { op, deps } => {
            let dep_tokens: Vec<ReprToken> = deps
                .iter()
                .map(|dep| tokens[&dep.fingerprint()].clone())
                .collect();
            if let (OperatorKind::GetNth(index), [base]) = (op.kind(), dep_tokens.as_slice()) {
                return subscript(base, &index.to_string());
            }
            let custom = REPR_FNS.read().get(op.name()).cloned();
            custom
                .and_then(|repr| repr(node, &dep_tokens))
                .unwrap_or_else(|| call_token(op.name(), &dep_tokens))
        }
    }
}

fn keyed(prefix: &str, key: &str) -> ReprToken {
    if is_identifier(key) {
        ReprToken::atom(format!("{prefix}.{key}"))
    } else {
        ReprToken::atom(format!("{prefix}[{key:?}]"))
    }
}

fn literal_token(value: &QValue) -> ReprToken {
    let text = value.to_string();
    if text.starts_with('-') {
        ReprToken {
            text,
            precedence: Precedence::new(-1, level::UNARY),
        }
    } else {
        ReprToken::atom(text)
    }
}

/// `name(arg, ...)`.
pub fn call_token(name: &str, args: &[ReprToken]) -> ReprToken {
    let args: Vec<&str> = args.iter().map(|t| t.text.as_str()).collect();
    ReprToken::atom(format!("{name}({})", args.join(", ")))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
    None,
}

/// `left symbol right` at binding level `level`.
pub fn infix_token(
    left: &ReprToken,
    symbol: &str,
    right: &ReprToken,
    level: i8,
    assoc: Assoc,
) -> ReprToken {
    let wrap_left = match assoc {
        Assoc::Left => left.precedence.right > level,
        Assoc::Right | Assoc::None => left.precedence.right >= level,
    };
    let wrap_right = match assoc {
        Assoc::Right => right.precedence.left > level,
        Assoc::Left | Assoc::None => right.precedence.left >= level,
    };
    let left = if wrap_left { left.parenthesized() } else { left.text.clone() };
    let right = if wrap_right { right.parenthesized() } else { right.text.clone() };
    ReprToken {
        text: format!("{left} {symbol} {right}"),
        precedence: Precedence::new(level, level),
    }
}

/// `symbol operand`, e.g. `-x`.
pub fn prefix_token(symbol: &str, operand: &ReprToken, level: i8) -> ReprToken {
    let operand = if operand.precedence.left > level {
        operand.parenthesized()
    } else {
        operand.text.clone()
    };
    ReprToken {
        text: format!("{symbol}{operand}"),
        precedence: Precedence::new(-1, level),
    }
}

/// `base[index]`.
pub fn subscript(base: &ReprToken, index: &str) -> ReprToken {
    let base_text = if base.precedence.right > level::SUBSCRIPT {
        base.parenthesized()
    } else {
        base.text.clone()
    };
    ReprToken {
        text: format!("{base_text}[{index}]"),
        precedence: Precedence::new(level::SUBSCRIPT, -1),
    }
}

/// Renderer for a binary operator written infix.
pub fn infix_repr(
    symbol: &'static str,
    level: i8,
    assoc: Assoc,
) -> impl Fn(&Expr, &[ReprToken]) -> Option<ReprToken> + Send + Sync + 'static {
    move |_, deps| match deps {
        [left, right] => Some(infix_token(left, symbol, right, level, assoc)),
        _ => None,
    }
}

/// Renderer for a unary operator written prefix.
pub fn prefix_repr(
    symbol: &'static str,
    level: i8,
) -> impl Fn(&Expr, &[ReprToken]) -> Option<ReprToken> + Send + Sync + 'static {
    move |_, deps| match deps {
        [operand] => Some(prefix_token(symbol, operand, level)),
        _ => None,
    }
}
