//! Expression parser
//!
//! Recursive descent over the token stream. Precedence, lowest first:
//!
//! ```text
//! ||
//! &&
//! == != < <= > >= =~ !~ in
//! + -
//! * / %
//! unary ! -
//! ```

use regex::Regex;

use super::lexer::{Spanned, Token, tokenize};
use super::value::Value;
use crate::error::{EvalError, EvalResult};

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub(crate) const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Neg,
}

/// Right-hand side of a regex match
#[derive(Debug, Clone)]
pub(crate) enum Pattern {
    /// Literal pattern, compiled once at parse time
    Compiled(Regex),
    /// Pattern computed per evaluation
    Dynamic(Box<Node>),
}

/// Expression tree
#[derive(Debug, Clone)]
pub(crate) enum Node {
    Literal(Value),
    Variable(String),
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Regex {
        negated: bool,
        subject: Box<Node>,
        pattern: Pattern,
    },
    In(Box<Node>, Vec<Node>),
}

/// Parse an expression into a tree
pub(crate) fn parse(src: &str) -> EvalResult<Node> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(EvalError::parse(0, "empty expression"));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        end: src.len(),
    };
    let node = parser.parse_or()?;

    match parser.peek() {
        None => Ok(node),
        Some(spanned) => Err(EvalError::parse(
            spanned.position,
            format!("unexpected token '{}'", spanned.token.describe()),
        )),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.peek().map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let spanned = self.tokens.get(self.pos).cloned();
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned
    }

    /// Position for "expected X" errors: the current token or end of input
    fn here(&self) -> usize {
        self.peek().map_or(self.end, |s| s.position)
    }

    fn expect(&mut self, expected: Token) -> EvalResult<()> {
        match self.advance() {
            Some(spanned) if spanned.token == expected => Ok(()),
            Some(spanned) => Err(EvalError::parse(
                spanned.position,
                format!(
                    "expected '{}', found '{}'",
                    expected.describe(),
                    spanned.token.describe()
                ),
            )),
            None => Err(EvalError::parse(
                self.end,
                format!("expected '{}', found end of expression", expected.describe()),
            )),
        }
    }

    fn parse_or(&mut self) -> EvalResult<Node> {
        let mut left = self.parse_and()?;
        while self.peek_token() == Some(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Node::Binary(BinaryOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> EvalResult<Node> {
        let mut left = self.parse_comparison()?;
        while self.peek_token() == Some(&Token::And) {
            self.advance();
            let right = self.parse_comparison()?;
            left = Node::Binary(BinaryOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> EvalResult<Node> {
        let left = self.parse_additive()?;

        let op = match self.peek_token() {
            Some(Token::Eq) => BinaryOp::Eq,
            Some(Token::Ne) => BinaryOp::Ne,
            Some(Token::Lt) => BinaryOp::Lt,
            Some(Token::Le) => BinaryOp::Le,
            Some(Token::Gt) => BinaryOp::Gt,
            Some(Token::Ge) => BinaryOp::Ge,
            Some(Token::RegexMatch) | Some(Token::RegexNotMatch) => {
                let negated = self.peek_token() == Some(&Token::RegexNotMatch);
                self.advance();
                return self.parse_regex(left, negated);
            }
            Some(Token::In) => {
                self.advance();
                return self.parse_in(left);
            }
            _ => return Ok(left),
        };

        self.advance();
        let right = self.parse_additive()?;
        Ok(Node::Binary(op, Box::new(left), Box::new(right)))
    }

    fn parse_regex(&mut self, subject: Node, negated: bool) -> EvalResult<Node> {
        let position = self.here();
        let right = self.parse_additive()?;

        let pattern = match right {
            Node::Literal(Value::String(p)) => {
                let re = Regex::new(&p).map_err(|e| EvalError::invalid_regex(p.as_str(), &e))?;
                Pattern::Compiled(re)
            }
            Node::Literal(other) => {
                return Err(EvalError::parse(
                    position,
                    format!("regex pattern must be a string, found {}", other.type_name()),
                ));
            }
            dynamic => Pattern::Dynamic(Box::new(dynamic)),
        };

        Ok(Node::Regex {
            negated,
            subject: Box::new(subject),
            pattern,
        })
    }

    fn parse_in(&mut self, subject: Node) -> EvalResult<Node> {
        self.expect(Token::LParen)?;

        let mut items = Vec::new();
        if self.peek_token() != Some(&Token::RParen) {
            loop {
                items.push(self.parse_or()?);
                if self.peek_token() == Some(&Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.expect(Token::RParen)?;
        Ok(Node::In(Box::new(subject), items))
    }

    fn parse_additive(&mut self) -> EvalResult<Node> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Node::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_multiplicative(&mut self) -> EvalResult<Node> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Node::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_unary(&mut self) -> EvalResult<Node> {
        let op = match self.peek_token() {
            Some(Token::Not) => UnaryOp::Not,
            Some(Token::Minus) => UnaryOp::Neg,
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Node::Unary(op, Box::new(operand)))
    }

    fn parse_primary(&mut self) -> EvalResult<Node> {
        let Some(spanned) = self.advance() else {
            return Err(EvalError::parse(self.end, "unexpected end of expression"));
        };

        match spanned.token {
            Token::Number(n) => Ok(Node::Literal(Value::Number(n))),
            Token::String(s) => Ok(Node::Literal(Value::String(s))),
            Token::True => Ok(Node::Literal(Value::Bool(true))),
            Token::False => Ok(Node::Literal(Value::Bool(false))),
            Token::Ident(name) => Ok(Node::Variable(name)),
            Token::LParen => {
                let inner = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            other => Err(EvalError::parse(
                spanned.position,
                format!("unexpected token '{}'", other.describe()),
            )),
        }
    }
}
