//! Expression tree evaluation

use regex::Regex;

use super::parser::{BinaryOp, Node, Pattern, UnaryOp};
use super::value::{Value, Variables};
use crate::error::{EvalError, EvalResult};

/// Evaluate a node against a set of variables
pub(crate) fn evaluate(node: &Node, vars: &Variables) -> EvalResult<Value> {
    match node {
        Node::Literal(value) => Ok(value.clone()),

        Node::Variable(name) => vars
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),

        Node::Unary(op, operand) => {
            let value = evaluate(operand, vars)?;
            match (op, value) {
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
                (UnaryOp::Not, other) => Err(EvalError::type_mismatch("!", other.type_name(), "-")),
                (UnaryOp::Neg, other) => Err(EvalError::type_mismatch("-", other.type_name(), "-")),
            }
        }

        Node::Binary(BinaryOp::And, left, right) => {
            if !as_logical("&&", evaluate(left, vars)?, "bool")? {
                return Ok(Value::Bool(false));
            }
            let right = evaluate(right, vars)?;
            Ok(Value::Bool(as_logical("&&", right, "bool")?))
        }

        Node::Binary(BinaryOp::Or, left, right) => {
            if as_logical("||", evaluate(left, vars)?, "bool")? {
                return Ok(Value::Bool(true));
            }
            let right = evaluate(right, vars)?;
            Ok(Value::Bool(as_logical("||", right, "bool")?))
        }

        Node::Binary(op, left, right) => {
            let left = evaluate(left, vars)?;
            let right = evaluate(right, vars)?;
            binary(*op, left, right)
        }

        Node::Regex {
            negated,
            subject,
            pattern,
        } => {
            let subject = match evaluate(subject, vars)? {
                Value::String(s) => s,
                other => {
                    let op = if *negated { "!~" } else { "=~" };
                    return Err(EvalError::type_mismatch(op, other.type_name(), "string"));
                }
            };

            let is_match = match pattern {
                Pattern::Compiled(re) => re.is_match(&subject),
                Pattern::Dynamic(node) => match evaluate(node, vars)? {
                    Value::String(p) => Regex::new(&p)
                        .map_err(|e| EvalError::invalid_regex(p.as_str(), &e))?
                        .is_match(&subject),
                    other => {
                        let op = if *negated { "!~" } else { "=~" };
                        return Err(EvalError::type_mismatch(op, "string", other.type_name()));
                    }
                },
            };

            Ok(Value::Bool(is_match != *negated))
        }

        Node::In(subject, items) => {
            let subject = evaluate(subject, vars)?;
            for item in items {
                if evaluate(item, vars)? == subject {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
    }
}

/// Require a boolean operand for a logical operator
fn as_logical(operator: &'static str, value: Value, other: &'static str) -> EvalResult<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        v => Err(EvalError::type_mismatch(operator, v.type_name(), other)),
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> EvalResult<Value> {
    use Value::{Number, String as Str};

    match (op, left, right) {
        // Equality never fails: values of different types are unequal
        (BinaryOp::Eq, l, r) => Ok(Value::Bool(l == r)),
        (BinaryOp::Ne, l, r) => Ok(Value::Bool(l != r)),

        (BinaryOp::Add, Number(l), Number(r)) => Ok(Number(l + r)),
        (BinaryOp::Add, Str(l), Str(r)) => Ok(Str(l + &r)),
        (BinaryOp::Sub, Number(l), Number(r)) => Ok(Number(l - r)),
        (BinaryOp::Mul, Number(l), Number(r)) => Ok(Number(l * r)),
        // IEEE semantics: dividing by zero yields an infinity or NaN
        (BinaryOp::Div, Number(l), Number(r)) => Ok(Number(l / r)),
        (BinaryOp::Rem, Number(l), Number(r)) => Ok(Number(l % r)),

        (BinaryOp::Lt, Number(l), Number(r)) => Ok(Value::Bool(l < r)),
        (BinaryOp::Le, Number(l), Number(r)) => Ok(Value::Bool(l <= r)),
        (BinaryOp::Gt, Number(l), Number(r)) => Ok(Value::Bool(l > r)),
        (BinaryOp::Ge, Number(l), Number(r)) => Ok(Value::Bool(l >= r)),
        (BinaryOp::Lt, Str(l), Str(r)) => Ok(Value::Bool(l < r)),
        (BinaryOp::Le, Str(l), Str(r)) => Ok(Value::Bool(l <= r)),
        (BinaryOp::Gt, Str(l), Str(r)) => Ok(Value::Bool(l > r)),
        (BinaryOp::Ge, Str(l), Str(r)) => Ok(Value::Bool(l >= r)),

        (op, l, r) => Err(EvalError::type_mismatch(
            op.symbol(),
            l.type_name(),
            r.type_name(),
        )),
    }
}
