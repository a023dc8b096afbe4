//! Boolean condition expressions
//!
//! A small expression language for rule conditions, evaluated against a
//! flat map of variables built from a point.
//!
//! # Syntax
//!
//! | Construct | Example |
//! |-----------|---------|
//! | Number, string, bool literals | `100`, `2.5e3`, `'node'`, `"node"`, `true` |
//! | Variable | `value`, `name`, `[cpu-load]` (brackets for any characters) |
//! | Arithmetic | `+ - * / %`, unary `-` (`+` also joins strings) |
//! | Comparison | `== != < <= > >=` (numbers or strings) |
//! | Regex match | `name =~ '^ib_'`, `type !~ 'socket'` |
//! | Membership | `type in ('node', 'socket')` |
//! | Logic | `&& || !` with short-circuit, parentheses |
//!
//! `==` and `!=` accept any operand types; values of different types are
//! never equal. Every other operator reports a type mismatch for operands it
//! does not support. Numbers are `f64` throughout, so dividing by zero gives
//! an infinity or NaN rather than an error.
//!
//! # Example
//!
//! ```
//! use ccm_transform::expr::{Evaluator, ExprEvaluator, Value, Variables};
//!
//! let mut vars = Variables::new();
//! vars.insert("value".into(), Value::Number(120.0));
//!
//! let evaluator = ExprEvaluator::new();
//! assert!(evaluator.evaluate("value > 100", &vars).unwrap());
//! assert!(evaluator.evaluate("value >>> 1", &vars).is_err());
//! ```

mod eval;
mod lexer;
mod parser;
mod value;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

pub use value::{Value, Variables};

use crate::error::{EvalError, EvalResult};

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

/// Condition evaluation capability
///
/// Given an expression and the variables of one point, decide whether the
/// expression holds. Implementations must be usable from the routing task
/// and any other thread.
pub trait Evaluator: Send + Sync {
    /// Evaluate `expression` against `variables`
    ///
    /// A result that is not a boolean is an error.
    fn evaluate(&self, expression: &str, variables: &Variables) -> EvalResult<bool>;

    /// Check an expression without evaluating it
    ///
    /// Used to report broken conditions once at startup. The default accepts
    /// everything.
    fn validate(&self, _expression: &str) -> EvalResult<()> {
        Ok(())
    }
}

/// A parsed expression
#[derive(Debug, Clone)]
pub struct Expression {
    source: String,
    root: parser::Node,
}

impl Expression {
    /// Parse an expression
    pub fn parse(source: &str) -> EvalResult<Self> {
        Ok(Self {
            source: source.to_string(),
            root: parser::parse(source)?,
        })
    }

    /// The original expression text
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate to a value of any type
    pub fn eval(&self, variables: &Variables) -> EvalResult<Value> {
        eval::evaluate(&self.root, variables)
    }

    /// Evaluate and require a boolean result
    pub fn eval_bool(&self, variables: &Variables) -> EvalResult<bool> {
        match self.eval(variables)? {
            Value::Bool(b) => Ok(b),
            other => Err(EvalError::NotBoolean(other.type_name())),
        }
    }
}

type CachedParse = Arc<EvalResult<Expression>>;

/// Built-in evaluator
///
/// Parses each distinct expression once and caches the result, including
/// parse failures. Conditions come from a fixed configuration, so the cache
/// is bounded by the number of configured rules.
#[derive(Default)]
pub struct ExprEvaluator {
    cache: Mutex<HashMap<String, CachedParse>>,
}

impl ExprEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached expressions
    pub fn cached_count(&self) -> usize {
        self.cache.lock().len()
    }

    fn compiled(&self, expression: &str) -> CachedParse {
        let mut cache = self.cache.lock();
        if let Some(parsed) = cache.get(expression) {
            return Arc::clone(parsed);
        }
        let parsed = Arc::new(Expression::parse(expression));
        cache.insert(expression.to_string(), Arc::clone(&parsed));
        parsed
    }
}

impl Evaluator for ExprEvaluator {
    fn evaluate(&self, expression: &str, variables: &Variables) -> EvalResult<bool> {
        match self.compiled(expression).as_ref() {
            Ok(parsed) => parsed.eval_bool(variables),
            Err(e) => Err(e.clone()),
        }
    }

    fn validate(&self, expression: &str) -> EvalResult<()> {
        match self.compiled(expression).as_ref() {
            Ok(_) => Ok(()),
            Err(e) => Err(e.clone()),
        }
    }
}

impl std::fmt::Debug for ExprEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExprEvaluator")
            .field("cached", &self.cached_count())
            .finish()
    }
}
