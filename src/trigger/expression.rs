//! Trigger expressions
//!
//! The built-in evaluator understands meter lookups combined with
//! arithmetic, comparisons and boolean logic:
//!
//! ```text
//! meter('jvm.memory.used').tag('area','nonheap').tag('id','Metaspace').measurement('value') > 100
//! meter('http.server.requests').tag('status').measurement('count') >= 10 && !(meter('cpu').measurement('value') < 0.5)
//! ```
//!
//! Precedence, loosest first: `||`/`or`, `&&`/`and`, `!`/`not`,
//! comparisons, `+ -`, `* /`, unary minus.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use super::meter::{MeterQuery, MetricSource};
use crate::error::{FlightRecorderError, Result};

/// Evaluates a boolean expression against live metrics
pub trait ExpressionEvaluator: Send + Sync {
    fn evaluate(&self, expression: &str, metrics: &dyn MetricSource) -> Result<bool>;

    /// Check an expression once at registration time
    fn validate(&self, _expression: &str) -> Result<()> {
        Ok(())
    }
}

impl<F> ExpressionEvaluator for F
where
    F: Fn(&str, &dyn MetricSource) -> Result<bool> + Send + Sync,
{
    fn evaluate(&self, expression: &str, metrics: &dyn MetricSource) -> Result<bool> {
        self(expression, metrics)
    }
}

/// Evaluator for the `meter(...)` expression grammar; parsed expressions are cached
#[derive(Debug, Default)]
pub struct MeterExpressionEvaluator {
    cache: Mutex<HashMap<String, Arc<Expr>>>,
}

impl MeterExpressionEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn compiled(&self, expression: &str) -> Result<Arc<Expr>> {
        if let Some(expr) = self.cache.lock().get(expression) {
            return Ok(Arc::clone(expr));
        }
        let expr = Arc::new(parse(expression)?);
        self.cache
            .lock()
            .insert(expression.to_string(), Arc::clone(&expr));
        Ok(expr)
    }
}

impl ExpressionEvaluator for MeterExpressionEvaluator {
    fn evaluate(&self, expression: &str, metrics: &dyn MetricSource) -> Result<bool> {
        let expr = self.compiled(expression)?;
        match expr.eval(metrics) {
            Ok(Value::Bool(b)) => Ok(b),
            Ok(Value::Number(n)) => Err(FlightRecorderError::expression(
                expression,
                format!("expected a boolean result, got {n}"),
            )),
            Err(message) => Err(FlightRecorderError::expression(expression, message)),
        }
    }

    fn validate(&self, expression: &str) -> Result<()> {
        self.compiled(expression).map(|_| ())
    }
}

/// Parse an expression without evaluating it
pub fn parse(expression: &str) -> Result<Expr> {
    let tokens = tokenize(expression)
        .map_err(|message| FlightRecorderError::expression(expression, message))?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser
        .parse_or()
        .and_then(|expr| match parser.peek() {
            None => Ok(expr),
            Some(token) => Err(format!("unexpected {token:?} after expression")),
        })
        .map_err(|message| FlightRecorderError::expression(expression, message))?;
    Ok(expr)
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Bool(bool),
    Measurement { query: MeterQuery, statistic: String },
    Not(Box<Expr>),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Value {
    Number(f64),
    Bool(bool),
}

impl Value {
    fn number(self) -> std::result::Result<f64, String> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Bool(b) => Err(format!("expected a number, got {b}")),
        }
    }

    fn boolean(self) -> std::result::Result<bool, String> {
        match self {
            Self::Bool(b) => Ok(b),
            Self::Number(n) => Err(format!("expected a boolean, got {n}")),
        }
    }
}

impl Expr {
    fn eval(&self, metrics: &dyn MetricSource) -> std::result::Result<Value, String> {
        match self {
            Self::Number(n) => Ok(Value::Number(*n)),
            Self::Bool(b) => Ok(Value::Bool(*b)),
            Self::Measurement { query, statistic } => {
                Ok(Value::Number(query.measurement(metrics, statistic)))
            }
            Self::Not(inner) => Ok(Value::Bool(!inner.eval(metrics)?.boolean()?)),
            Self::Neg(inner) => Ok(Value::Number(-inner.eval(metrics)?.number()?)),
            Self::Binary { op, lhs, rhs } => {
                let numbers = || -> std::result::Result<(f64, f64), String> {
                    Ok((lhs.eval(metrics)?.number()?, rhs.eval(metrics)?.number()?))
                };
                match op {
                    BinaryOp::Or => Ok(Value::Bool(
                        lhs.eval(metrics)?.boolean()? || rhs.eval(metrics)?.boolean()?,
                    )),
                    BinaryOp::And => Ok(Value::Bool(
                        lhs.eval(metrics)?.boolean()? && rhs.eval(metrics)?.boolean()?,
                    )),
                    BinaryOp::Eq => Ok(Value::Bool(values_equal(
                        lhs.eval(metrics)?,
                        rhs.eval(metrics)?,
                    )?)),
                    BinaryOp::Ne => Ok(Value::Bool(!values_equal(
                        lhs.eval(metrics)?,
                        rhs.eval(metrics)?,
                    )?)),
                    BinaryOp::Gt => numbers().map(|(a, b)| Value::Bool(a > b)),
                    BinaryOp::Ge => numbers().map(|(a, b)| Value::Bool(a >= b)),
                    BinaryOp::Lt => numbers().map(|(a, b)| Value::Bool(a < b)),
                    BinaryOp::Le => numbers().map(|(a, b)| Value::Bool(a <= b)),
                    BinaryOp::Add => numbers().map(|(a, b)| Value::Number(a + b)),
                    BinaryOp::Sub => numbers().map(|(a, b)| Value::Number(a - b)),
                    BinaryOp::Mul => numbers().map(|(a, b)| Value::Number(a * b)),
                    BinaryOp::Div => match numbers()? {
                        (_, b) if b == 0.0 => Err("division by zero".to_string()),
                        (a, b) => Ok(Value::Number(a / b)),
                    },
                }
            }
        }
    }
}

fn values_equal(lhs: Value, rhs: Value) -> std::result::Result<bool, String> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (a, b) => Err(format!("cannot compare {a:?} with {b:?}")),
    }
}

// ============================================================================
// TOKENIZER
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    Dot,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    AndAnd,
    OrOr,
    Gt,
    Ge,
    Lt,
    Le,
    EqEq,
    Ne,
}

fn tokenize(source: &str) -> std::result::Result<Vec<Token>, String> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => push(&mut tokens, &mut i, Token::LParen, 1),
            ')' => push(&mut tokens, &mut i, Token::RParen, 1),
            '.' if !next.is_some_and(|n| n.is_ascii_digit()) => {
                push(&mut tokens, &mut i, Token::Dot, 1);
            }
            ',' => push(&mut tokens, &mut i, Token::Comma, 1),
            '+' => push(&mut tokens, &mut i, Token::Plus, 1),
            '-' => push(&mut tokens, &mut i, Token::Minus, 1),
            '*' => push(&mut tokens, &mut i, Token::Star, 1),
            '/' => push(&mut tokens, &mut i, Token::Slash, 1),
            '&' if next == Some('&') => push(&mut tokens, &mut i, Token::AndAnd, 2),
            '|' if next == Some('|') => push(&mut tokens, &mut i, Token::OrOr, 2),
            '>' if next == Some('=') => push(&mut tokens, &mut i, Token::Ge, 2),
            '>' => push(&mut tokens, &mut i, Token::Gt, 1),
            '<' if next == Some('=') => push(&mut tokens, &mut i, Token::Le, 2),
            '<' => push(&mut tokens, &mut i, Token::Lt, 1),
            '=' if next == Some('=') => push(&mut tokens, &mut i, Token::EqEq, 2),
            '!' if next == Some('=') => push(&mut tokens, &mut i, Token::Ne, 2),
            '!' => push(&mut tokens, &mut i, Token::Bang, 1),
            '\'' | '"' => {
                let quote = c;
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&ch| ch == quote)
                    .map(|offset| start + offset)
                    .ok_or_else(|| format!("unterminated string starting at {i}"))?;
                tokens.push(Token::Str(chars[start..end].iter().collect()));
                i = end + 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{text}'"))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character '{other}' at {i}")),
        }
    }

    Ok(tokens)
}

fn push(tokens: &mut Vec<Token>, i: &mut usize, token: Token, width: usize) {
    tokens.push(token);
    *i += width;
}

// ============================================================================
// PARSER
// ============================================================================

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

type ParseResult<T> = std::result::Result<T, String>;

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(word)) if word == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> ParseResult<()> {
        match self.advance() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(format!("expected {expected:?}, found {token:?}")),
            None => Err(format!("expected {expected:?}, found end of input")),
        }
    }

    fn expect_string(&mut self) -> ParseResult<String> {
        match self.advance() {
            Some(Token::Str(s)) => Ok(s),
            Some(token) => Err(format!("expected a string literal, found {token:?}")),
            None => Err("expected a string literal, found end of input".to_string()),
        }
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::OrOr) || self.eat_keyword("or") {
            let rhs = self.parse_and()?;
            lhs = binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_not()?;
        while self.eat(&Token::AndAnd) || self.eat_keyword("and") {
            let rhs = self.parse_not()?;
            lhs = binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> ParseResult<Expr> {
        if self.eat(&Token::Bang) || self.eat_keyword("not") {
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let lhs = self.parse_sum()?;
        let op = match self.peek() {
            Some(Token::Gt) => BinaryOp::Gt,
            Some(Token::Ge) => BinaryOp::Ge,
            Some(Token::Lt) => BinaryOp::Lt,
            Some(Token::Le) => BinaryOp::Le,
            Some(Token::EqEq) => BinaryOp::Eq,
            Some(Token::Ne) => BinaryOp::Ne,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.parse_sum()?;
        Ok(binary(op, lhs, rhs))
    }

    fn parse_sum(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_product()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_product()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_product(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(word)) => match word.as_str() {
                "true" => Ok(Expr::Bool(true)),
                "false" => Ok(Expr::Bool(false)),
                "meter" => self.parse_meter(),
                other => Err(format!("unknown identifier '{other}'")),
            },
            Some(token) => Err(format!("unexpected {token:?}")),
            None => Err("unexpected end of input".to_string()),
        }
    }

    /// `meter('name')` already consumed up to the identifier
    fn parse_meter(&mut self) -> ParseResult<Expr> {
        self.expect(&Token::LParen)?;
        let mut query = MeterQuery::new(self.expect_string()?);
        self.expect(&Token::RParen)?;

        loop {
            self.expect(&Token::Dot)?;
            let method = match self.advance() {
                Some(Token::Ident(method)) => method,
                Some(token) => return Err(format!("expected a method name, found {token:?}")),
                None => return Err("expected a method name, found end of input".to_string()),
            };
            self.expect(&Token::LParen)?;
            match method.as_str() {
                "tag" => {
                    let key = self.expect_string()?;
                    query = if self.eat(&Token::Comma) {
                        query.tag(key, self.expect_string()?)
                    } else {
                        query.tag_key(key)
                    };
                    self.expect(&Token::RParen)?;
                }
                "measurement" => {
                    let statistic = self.expect_string()?;
                    self.expect(&Token::RParen)?;
                    return Ok(Expr::Measurement { query, statistic });
                }
                other => return Err(format!("unknown meter method '{other}'")),
            }
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::meter::{Measurement, StaticMetricSource};

    const METASPACE: &str =
        "meter('jvm.memory.used').tag('area','nonheap').tag('id','Metaspace').measurement('value') > 100";

    fn metrics(metaspace: f64) -> StaticMetricSource {
        let source = StaticMetricSource::new();
        source.register(
            "jvm.memory.used",
            &[("area", "nonheap"), ("id", "Metaspace")],
            vec![Measurement::new("value", metaspace)],
        );
        source.register(
            "http.server.requests",
            &[("status", "500")],
            vec![Measurement::new("count", 12.0)],
        );
        source
    }

    #[test]
    fn test_meter_comparison() {
        let evaluator = MeterExpressionEvaluator::new();
        assert!(evaluator.evaluate(METASPACE, &metrics(150.0)).unwrap());
        assert!(!evaluator.evaluate(METASPACE, &metrics(50.0)).unwrap());
    }

    #[test]
    fn test_parsed_shape() {
        let expr = parse(METASPACE).unwrap();
        let Expr::Binary { op, lhs, rhs } = expr else {
            panic!("expected a comparison");
        };
        assert_eq!(op, BinaryOp::Gt);
        assert_eq!(*rhs, Expr::Number(100.0));
        assert_eq!(
            *lhs,
            Expr::Measurement {
                query: MeterQuery::new("jvm.memory.used")
                    .tag("area", "nonheap")
                    .tag("id", "Metaspace"),
                statistic: "value".to_string(),
            }
        );
    }

    #[test]
    fn test_boolean_logic_and_arithmetic() {
        let evaluator = MeterExpressionEvaluator::new();
        let source = metrics(150.0);
        let cases = [
            ("true && !false", true),
            ("1 + 2 * 3 == 7", true),
            ("(1 + 2) * 3 == 7", false),
            ("-2 < 0 and not (3 <= 2)", true),
            ("false or 0.5 >= .5", true),
            ("meter(\"http.server.requests\").tag('status').measurement('count') / 4 == 3", true),
            ("meter('missing').measurement('value') != 0", false),
        ];
        for (expression, expected) in cases {
            assert_eq!(
                evaluator.evaluate(expression, &source).unwrap(),
                expected,
                "{expression}"
            );
        }
    }

    #[test]
    fn test_malformed_expressions_fail() {
        let evaluator = MeterExpressionEvaluator::new();
        let source = metrics(0.0);
        for expression in [
            "",
            "meter('a').measurement('value') >",
            "meter('a').tag('k').value()",
            "1 + 2",
            "true && 3",
            "1 / 0 > 0",
            "'unterminated",
            "bean.call()",
            "1 > 0 )",
        ] {
            assert!(
                matches!(
                    evaluator.evaluate(expression, &source),
                    Err(FlightRecorderError::Expression { .. })
                ),
                "{expression}"
            );
        }
        assert!(evaluator.validate("1 + 2").is_ok());
        assert!(evaluator.validate("meter(").is_err());
    }

    #[test]
    fn test_equality_and_mixed_operand_types() {
        let evaluator = MeterExpressionEvaluator::new();
        let source = metrics(0.0);
        for (expression, expected) in [
            ("1 != 2", true),
            ("true == true", true),
            ("(1 > 0) != false", true),
            ("2 * 2 == 4 - 0", true),
            ("6 / 3 >= 2 && 1 - 1 <= 0", true),
        ] {
            assert_eq!(
                evaluator.evaluate(expression, &source).unwrap(),
                expected,
                "{expression}"
            );
        }
        for expression in ["true == 1", "1 != false", "1 > true", "true * 2 == 2", "!1"] {
            assert!(evaluator.evaluate(expression, &source).is_err(), "{expression}");
        }
    }

    #[test]
    fn test_closure_evaluator() {
        let evaluator =
            |expression: &str, _metrics: &dyn MetricSource| -> Result<bool> { Ok(expression == "go") };
        assert!(evaluator.evaluate("go", &metrics(0.0)).unwrap());
        assert!(!evaluator.evaluate("stop", &metrics(0.0)).unwrap());
    }
}
