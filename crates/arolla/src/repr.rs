//! Operator notation for the standard library.

use arolla_expr::Expr;
use arolla_expr::repr::{
    Assoc, Precedence, ReprToken, infix_repr, is_identifier, level, prefix_repr,
    register_op_repr_fn,
};

/// Install infix, prefix and attribute notation for the standard operators.
/// Calling it again reinstalls the same renderers.
pub fn register_standard_reprs() {
    let infix = [
        ("math.add", "+", level::ADDITIVE, Assoc::Left),
        ("math.subtract", "-", level::ADDITIVE, Assoc::Left),
        ("math.multiply", "*", level::MULTIPLICATIVE, Assoc::Left),
        ("math.divide", "/", level::MULTIPLICATIVE, Assoc::Left),
        ("math.floordiv", "//", level::MULTIPLICATIVE, Assoc::Left),
        ("math.mod", "%", level::MULTIPLICATIVE, Assoc::Left),
        ("math.pow", "**", level::POWER, Assoc::Right),
        ("core.equal", "==", level::COMPARISON, Assoc::None),
        ("core.not_equal", "!=", level::COMPARISON, Assoc::None),
        ("core.less", "<", level::COMPARISON, Assoc::None),
        ("core.less_equal", "<=", level::COMPARISON, Assoc::None),
        ("core.greater", ">", level::COMPARISON, Assoc::None),
        ("core.greater_equal", ">=", level::COMPARISON, Assoc::None),
    ];
    for (name, symbol, binding, assoc) in infix {
        register_op_repr_fn(name, infix_repr(symbol, binding, assoc));
    }
    register_op_repr_fn("math.neg", prefix_repr("-", level::UNARY));
    register_op_repr_fn("core.getattr", getattr_repr);
}

/// `obj.key` when `key` is a text literal that is an identifier.
fn getattr_repr(node: &Expr, deps: &[ReprToken]) -> Option<ReprToken> {
    let [obj, _] = deps else {
        return None;
    };
    let key = node.deps().get(1)?.qvalue()?.as_scalar()?.as_text()?;
    if !is_identifier(key) {
        return None;
    }
    let obj = if obj.precedence.right > level::SUBSCRIPT {
        format!("({})", obj.text)
    } else {
        obj.text.clone()
    };
    Some(ReprToken {
        text: format!("{obj}.{key}"),
        precedence: Precedence::new(level::SUBSCRIPT, -1),
    })
}
