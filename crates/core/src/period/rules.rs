//! The restricted expression sub-language used by voucher templates and
//! closing-template rules (spec 4.3, design note in spec 9).
//!
//! A small recursive-descent parser builds an [`Expr`] tree; evaluation
//! walks the tree against a read-only environment of event fields. Only
//! `round` and `abs` are whitelisted as callable built-ins — any other
//! `name(...)` is a parse error, not a runtime lookup failure. There is no
//! attribute access, no free function invocation, and no I/O.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use thiserror::Error;

/// Errors raised while parsing or evaluating a template expression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    /// The tokenizer encountered a character it cannot classify.
    #[error("unexpected character: {0:?}")]
    UnexpectedChar(char),
    /// The parser expected one kind of token but found another.
    #[error("unexpected token: {0}")]
    UnexpectedToken(String),
    /// Input ended mid-expression.
    #[error("unexpected end of expression")]
    UnexpectedEof,
    /// A `name(...)` call used a name other than `round`/`abs`/`if`.
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    /// A built-in was called with the wrong number of arguments.
    #[error("wrong argument count for {0}")]
    WrongArity(&'static str),
    /// A field reference did not resolve against the environment.
    #[error("unknown field: {0}")]
    UnknownField(String),
    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// Trailing input after a complete expression.
    #[error("trailing input: {0}")]
    TrailingInput(String),
}

/// An arithmetic expression over event fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal number.
    Number(Decimal),
    /// A reference to a field in the evaluation environment.
    Field(String),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    /// `round(x, n)`.
    Round(Box<Expr>, Box<Expr>),
    /// `abs(x)`.
    Abs(Box<Expr>),
    /// `if(cond, a, b)`.
    If(Box<Cond>, Box<Expr>, Box<Expr>),
}

/// A boolean condition, used only inside `if(...)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cond {
    Eq(Expr, Expr),
    Ne(Expr, Expr),
    Lt(Expr, Expr),
    Le(Expr, Expr),
    Gt(Expr, Expr),
    Ge(Expr, Expr),
    And(Box<Cond>, Box<Cond>),
    Or(Box<Cond>, Box<Cond>),
}

impl Expr {
    /// Parses a complete expression from source text.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] on any lexical, syntactic, or whitelist
    /// violation.
    pub fn parse(source: &str) -> Result<Self, RuleError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.parse_expr()?;
        if parser.pos != parser.tokens.len() {
            return Err(RuleError::TrailingInput(format!(
                "{:?}",
                &parser.tokens[parser.pos..]
            )));
        }
        Ok(expr)
    }

    /// Evaluates the expression against an environment of named fields.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnknownField`] if a referenced field is absent,
    /// or [`RuleError::DivisionByZero`].
    pub fn eval(&self, env: &HashMap<String, Decimal>) -> Result<Decimal, RuleError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Field(name) => env
                .get(name)
                .copied()
                .ok_or_else(|| RuleError::UnknownField(name.clone())),
            Self::Add(a, b) => Ok(a.eval(env)? + b.eval(env)?),
            Self::Sub(a, b) => Ok(a.eval(env)? - b.eval(env)?),
            Self::Mul(a, b) => Ok(a.eval(env)? * b.eval(env)?),
            Self::Div(a, b) => {
                let divisor = b.eval(env)?;
                if divisor.is_zero() {
                    return Err(RuleError::DivisionByZero);
                }
                Ok(a.eval(env)? / divisor)
            }
            Self::Neg(a) => Ok(-a.eval(env)?),
            Self::Round(value, places) => {
                let value = value.eval(env)?;
                let places = places.eval(env)?;
                let places_u32 = places.to_string().parse::<u32>().unwrap_or(0);
                Ok(value.round_dp_with_strategy(places_u32, RoundingStrategy::MidpointAwayFromZero))
            }
            Self::Abs(a) => Ok(a.eval(env)?.abs()),
            Self::If(cond, then_branch, else_branch) => {
                if cond.eval(env)? {
                    then_branch.eval(env)
                } else {
                    else_branch.eval(env)
                }
            }
        }
    }
}

impl Cond {
    fn eval(&self, env: &HashMap<String, Decimal>) -> Result<bool, RuleError> {
        Ok(match self {
            Self::Eq(a, b) => a.eval(env)? == b.eval(env)?,
            Self::Ne(a, b) => a.eval(env)? != b.eval(env)?,
            Self::Lt(a, b) => a.eval(env)? < b.eval(env)?,
            Self::Le(a, b) => a.eval(env)? <= b.eval(env)?,
            Self::Gt(a, b) => a.eval(env)? > b.eval(env)?,
            Self::Ge(a, b) => a.eval(env)? >= b.eval(env)?,
            Self::And(a, b) => a.eval(env)? && b.eval(env)?,
            Self::Or(a, b) => a.eval(env)? || b.eval(env)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Decimal),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

fn tokenize(source: &str) -> Result<Vec<Token>, RuleError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' | '\u{00d7}' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' | '\u{00f7}' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '=' => {
                tokens.push(Token::Eq);
                i += 1;
                if chars.get(i) == Some(&'=') {
                    i += 1;
                }
            }
            '\u{2260}' => {
                tokens.push(Token::Ne);
                i += 1;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Ne);
                i += 2;
            }
            '\u{2264}' => {
                tokens.push(Token::Le);
                i += 1;
            }
            '\u{2265}' => {
                tokens.push(Token::Ge);
                i += 1;
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Le);
                    i += 2;
                } else {
                    tokens.push(Token::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ge);
                    i += 2;
                } else {
                    tokens.push(Token::Gt);
                    i += 1;
                }
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value: Decimal = text
                    .parse()
                    .map_err(|_| RuleError::UnexpectedChar(chars[start]))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                match text.as_str() {
                    "and" => tokens.push(Token::And),
                    "or" => tokens.push(Token::Or),
                    _ => tokens.push(Token::Ident(text)),
                }
            }
            other => return Err(RuleError::UnexpectedChar(other)),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<(), RuleError> {
        match self.advance() {
            Some(ref tok) if tok == expected => Ok(()),
            Some(tok) => Err(RuleError::UnexpectedToken(format!("{tok:?}"))),
            None => Err(RuleError::UnexpectedEof),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, RuleError> {
        let mut left = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    let right = self.parse_term()?;
                    left = Expr::Add(Box::new(left), Box::new(right));
                }
                Some(Token::Minus) => {
                    self.advance();
                    let right = self.parse_term()?;
                    left = Expr::Sub(Box::new(left), Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, RuleError> {
        let mut left = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    let right = self.parse_unary()?;
                    left = Expr::Mul(Box::new(left), Box::new(right));
                }
                Some(Token::Slash) => {
                    self.advance();
                    let right = self.parse_unary()?;
                    left = Expr::Div(Box::new(left), Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, RuleError> {
        if matches!(self.peek(), Some(Token::Minus)) {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, RuleError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.advance();
                    self.parse_call(&name)
                } else {
                    Ok(Expr::Field(name))
                }
            }
            Some(tok) => Err(RuleError::UnexpectedToken(format!("{tok:?}"))),
            None => Err(RuleError::UnexpectedEof),
        }
    }

    /// Parses a comma-separated, parenthesis-terminated argument list
    /// (the opening `(` has already been consumed by the caller).
    fn parse_arg_list(&mut self) -> Result<Vec<Expr>, RuleError> {
        let mut args = Vec::new();
        if matches!(self.peek(), Some(Token::RParen)) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            match self.advance() {
                Some(Token::Comma) => {}
                Some(Token::RParen) => break,
                Some(tok) => return Err(RuleError::UnexpectedToken(format!("{tok:?}"))),
                None => return Err(RuleError::UnexpectedEof),
            }
        }
        Ok(args)
    }

    fn parse_call(&mut self, name: &str) -> Result<Expr, RuleError> {
        match name {
            "round" => {
                let mut args = self.parse_arg_list()?;
                if args.len() != 2 {
                    return Err(RuleError::WrongArity("round"));
                }
                let places = args.pop().unwrap();
                let value = args.pop().unwrap();
                Ok(Expr::Round(Box::new(value), Box::new(places)))
            }
            "abs" => {
                let mut args = self.parse_arg_list()?;
                if args.len() != 1 {
                    return Err(RuleError::WrongArity("abs"));
                }
                Ok(Expr::Abs(Box::new(args.pop().unwrap())))
            }
            "if" => {
                let cond = self.parse_cond()?;
                self.expect(&Token::Comma)?;
                let then_branch = self.parse_expr()?;
                self.expect(&Token::Comma)?;
                let else_branch = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(Expr::If(
                    Box::new(cond),
                    Box::new(then_branch),
                    Box::new(else_branch),
                ))
            }
            other => Err(RuleError::UnknownFunction(other.to_string())),
        }
    }

    fn parse_cond(&mut self) -> Result<Cond, RuleError> {
        let mut left = self.parse_and_cond()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.advance();
            let right = self.parse_and_cond()?;
            left = Cond::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and_cond(&mut self) -> Result<Cond, RuleError> {
        let mut left = self.parse_cmp()?;
        while matches!(self.peek(), Some(Token::And)) {
            self.advance();
            let right = self.parse_cmp()?;
            left = Cond::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_cmp(&mut self) -> Result<Cond, RuleError> {
        let left = self.parse_expr()?;
        let op = self.advance().ok_or(RuleError::UnexpectedEof)?;
        let right = self.parse_expr()?;
        Ok(match op {
            Token::Eq => Cond::Eq(left, right),
            Token::Ne => Cond::Ne(left, right),
            Token::Lt => Cond::Lt(left, right),
            Token::Le => Cond::Le(left, right),
            Token::Gt => Cond::Gt(left, right),
            Token::Ge => Cond::Ge(left, right),
            tok => return Err(RuleError::UnexpectedToken(format!("{tok:?}"))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn env(pairs: &[(&str, Decimal)]) -> HashMap<String, Decimal> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn parses_and_evaluates_arithmetic() {
        let expr = Expr::parse("revenue - cost").unwrap();
        let e = env(&[("revenue", dec!(100)), ("cost", dec!(40))]);
        assert_eq!(expr.eval(&e).unwrap(), dec!(60));
    }

    #[test]
    fn operator_precedence() {
        let expr = Expr::parse("2 + 3 * 4").unwrap();
        assert_eq!(expr.eval(&HashMap::new()).unwrap(), dec!(14));
    }

    #[test]
    fn parens_override_precedence() {
        let expr = Expr::parse("(2 + 3) * 4").unwrap();
        assert_eq!(expr.eval(&HashMap::new()).unwrap(), dec!(20));
    }

    #[test]
    fn round_and_abs_builtins() {
        let expr = Expr::parse("round(amount, 2)").unwrap();
        let e = env(&[("amount", dec!(10.005))]);
        assert_eq!(expr.eval(&e).unwrap(), dec!(10.01));

        let expr = Expr::parse("abs(delta)").unwrap();
        let e = env(&[("delta", dec!(-5))]);
        assert_eq!(expr.eval(&e).unwrap(), dec!(5));
    }

    #[test]
    fn if_with_comparison_and_boolean_ops() {
        let expr = Expr::parse("if(revenue > 0 and cost >= 0, revenue - cost, 0)").unwrap();
        let e = env(&[("revenue", dec!(100)), ("cost", dec!(30))]);
        assert_eq!(expr.eval(&e).unwrap(), dec!(70));

        let e_neg = env(&[("revenue", dec!(-1)), ("cost", dec!(30))]);
        assert_eq!(expr.eval(&e_neg).unwrap(), dec!(0));
    }

    #[test]
    fn unknown_function_is_a_parse_error() {
        let err = Expr::parse("eval(amount)").unwrap_err();
        assert_eq!(err, RuleError::UnknownFunction("eval".to_string()));
    }

    #[test]
    fn wrong_arity_is_a_parse_error() {
        assert_eq!(
            Expr::parse("round(amount)").unwrap_err(),
            RuleError::WrongArity("round")
        );
        assert_eq!(
            Expr::parse("round(amount, 2, 3)").unwrap_err(),
            RuleError::WrongArity("round")
        );
        assert_eq!(
            Expr::parse("abs(amount, 2)").unwrap_err(),
            RuleError::WrongArity("abs")
        );
    }

    #[test]
    fn unknown_field_is_a_runtime_error() {
        let expr = Expr::parse("missing_field").unwrap();
        assert_eq!(
            expr.eval(&HashMap::new()).unwrap_err(),
            RuleError::UnknownField("missing_field".to_string())
        );
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let expr = Expr::parse("amount / zero").unwrap();
        let e = env(&[("amount", dec!(10)), ("zero", dec!(0))]);
        assert_eq!(expr.eval(&e).unwrap_err(), RuleError::DivisionByZero);
    }
}
