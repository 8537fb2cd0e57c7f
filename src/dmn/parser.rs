//! Recursive-descent parser for full expressions and for column cells
//! (unary tests).
//!
//! Precedence, loosest first: `or`, `and`, comparison / `in`, unary minus.

use super::DecideError;
use super::ast::{Expression, Function, Value};
use super::lexer::{Token, tokenize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// A compiled column cell, applied to the column's input value.
#[derive(Debug, Clone, PartialEq)]
pub enum UnaryTest {
    /// `-` or an empty cell.
    Any,
    /// `>5`, `<=x`, `!="a"`: the input on the left, the operand on the right.
    Compare(CompareOp, Expression),
    /// A bare value (equality or range inclusion) or a predicate over the facts.
    Expr(Expression),
}

pub fn parse_expression(source: &str) -> Result<Expression, DecideError> {
    let mut parser = Parser::new(source)?;
    let expr = parser.expression()?;
    parser.finish()?;
    Ok(expr)
}

pub fn parse_unary_test(source: &str) -> Result<UnaryTest, DecideError> {
    let trimmed = source.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(UnaryTest::Any);
    }
    let mut parser = Parser::new(trimmed)?;
    let op = match parser.peek() {
        Some(Token::Eq) => {
            return Err(parser.error("equality cells are bare values, drop the leading '='"));
        }
        Some(Token::NotEq) => Some(CompareOp::NotEq),
        Some(Token::Lt) => Some(CompareOp::Lt),
        Some(Token::LtEq) => Some(CompareOp::LtEq),
        Some(Token::Gt) => Some(CompareOp::Gt),
        Some(Token::GtEq) => Some(CompareOp::GtEq),
        _ => None,
    };
    let test = match op {
        Some(op) => {
            parser.advance();
            UnaryTest::Compare(op, parser.expression()?)
        }
        None => UnaryTest::Expr(parser.expression()?),
    };
    parser.finish()?;
    Ok(test)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Result<Self, DecideError> {
        Ok(Parser {
            source,
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    fn error(&self, message: impl Into<String>) -> DecideError {
        DecideError::Syntax {
            expression: self.source.to_string(),
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), DecideError> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(self.error(format!("expected {:?}, found {:?}", expected, token))),
            None => Err(self.error(format!("expected {:?}, found end of input", expected))),
        }
    }

    fn finish(&self) -> Result<(), DecideError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(self.error(format!("unexpected trailing {:?}", token))),
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(word)) if word == keyword)
    }

    fn expression(&mut self) -> Result<Expression, DecideError> {
        let mut left = self.conjunction()?;
        while self.at_keyword("or") {
            self.advance();
            let right = self.conjunction()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn conjunction(&mut self) -> Result<Expression, DecideError> {
        let mut left = self.comparison()?;
        while self.at_keyword("and") {
            self.advance();
            let right = self.comparison()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Result<Expression, DecideError> {
        let left = self.unary()?;
        let build: fn(Box<Expression>, Box<Expression>) -> Expression = match self.peek() {
            Some(Token::Eq) => Expression::Equal,
            Some(Token::NotEq) => Expression::NotEqual,
            Some(Token::Lt) => Expression::SmallerThan,
            Some(Token::LtEq) => Expression::SmallerThanOrEqual,
            Some(Token::Gt) => Expression::GreaterThan,
            Some(Token::GtEq) => Expression::GreaterThanOrEqual,
            Some(Token::Ident(word)) if word == "in" => Expression::In,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.unary()?;
        Ok(build(Box::new(left), Box::new(right)))
    }

    fn unary(&mut self) -> Result<Expression, DecideError> {
        if self.peek() == Some(&Token::Minus) {
            self.advance();
            return Ok(Expression::Negate(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expression, DecideError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expression::Literal(Value::Number(n))),
            Some(Token::Str(s)) => Ok(Expression::Literal(Value::String(s))),
            Some(Token::LParen) => {
                let inner = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::LBracket) => self.bracketed(),
            Some(Token::Ident(word)) => self.word(word),
            Some(token) => Err(self.error(format!("unexpected {:?}", token))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn word(&mut self, word: String) -> Result<Expression, DecideError> {
        match word.as_str() {
            "null" | "None" => return Ok(Expression::Literal(Value::Null)),
            "true" | "True" => return Ok(Expression::Literal(Value::Bool(true))),
            "false" | "False" => return Ok(Expression::Literal(Value::Bool(false))),
            "and" | "or" | "in" => return Err(self.error(format!("unexpected keyword '{}'", word))),
            _ => {}
        }

        let is_list_contains = word == "list"
            && matches!(self.peek(), Some(Token::Ident(next)) if next == "contains")
            && self.peek_at(1) == Some(&Token::LParen);
        let name = if is_list_contains {
            self.advance();
            "list contains".to_string()
        } else {
            word
        };

        if self.peek() != Some(&Token::LParen) {
            return Ok(Expression::Name(name));
        }
        let function = Function::from_name(&name)
            .ok_or_else(|| self.error(format!("unknown function '{}'", name)))?;
        self.advance();
        let args = self.arguments()?;
        if args.len() != function.arity() {
            return Err(self.error(format!(
                "'{}' takes {} argument(s), got {}",
                name,
                function.arity(),
                args.len()
            )));
        }
        Ok(Expression::Call(function, args))
    }

    /// Arguments after the opening parenthesis, through the closing one.
    fn arguments(&mut self) -> Result<Vec<Expression>, DecideError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            match self.advance() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                _ => return Err(self.error("expected ',' or ')' in argument list")),
            }
        }
    }

    /// `[a..b]` or `[a, b, ...]`, after the opening bracket.
    fn bracketed(&mut self) -> Result<Expression, DecideError> {
        if self.peek() == Some(&Token::RBracket) {
            self.advance();
            return Ok(Expression::List(Vec::new()));
        }
        let first = self.expression()?;
        if self.peek() == Some(&Token::DotDot) {
            self.advance();
            let end = self.expression()?;
            self.expect(Token::RBracket)?;
            return Ok(Expression::Range(Box::new(first), Box::new(end)));
        }
        let mut items = vec![first];
        loop {
            match self.advance() {
                Some(Token::Comma) => items.push(self.expression()?),
                Some(Token::RBracket) => return Ok(Expression::List(items)),
                _ => return Err(self.error("expected ',' or ']' in list")),
            }
        }
    }
}
