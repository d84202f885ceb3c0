use super::lexer::{Token, TokenKind};
use crate::ast::{Builtin, Expression, Value};
use crate::error::ConditionError;

/// Deepest nesting a condition may have, counted both as parser recursion
/// (parentheses, call arguments, `not` and sign runs) and as AST height.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Recursive-descent parser over a token stream produced by `tokenize`.
///
/// Precedence, lowest first: `or`, `and`, `not`, comparisons (non-chaining),
/// `+ -`, `* / %`, unary minus, primaries.
pub(crate) struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    depth: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            cursor: 0,
            depth: 0,
        }
    }

    /// Runs `parse` one recursion level deeper, refusing to go past the limit.
    fn nested<F>(&mut self, parse: F) -> Result<Expression, ConditionError>
    where
        F: FnOnce(&mut Self) -> Result<Expression, ConditionError>,
    {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ConditionError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Every composite node goes through here so the finished tree never exceeds
    /// the nesting limit. Evaluation, formatting and drop all recurse over it.
    fn bounded(expression: Expression) -> Result<Expression, ConditionError> {
        if expression.depth_exceeds(MAX_NESTING_DEPTH) {
            Err(ConditionError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            })
        } else {
            Ok(expression)
        }
    }

    /// Parses a full condition and requires that every token is consumed.
    pub(crate) fn parse(mut self) -> Result<Expression, ConditionError> {
        let expression = self.parse_or()?;
        match self.peek() {
            TokenKind::Eof => Ok(expression),
            _ => Err(self.unexpected("an operator or end of condition")),
        }
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.cursor.min(self.tokens.len() - 1)].kind
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        &self.tokens[(self.cursor + offset).min(self.tokens.len() - 1)].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.cursor.min(self.tokens.len() - 1)].clone();
        if self.cursor < self.tokens.len() - 1 {
            self.cursor += 1;
        }
        token
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), TokenKind::Ident(name) if name == keyword)
    }

    fn unexpected(&self, expected: &str) -> ConditionError {
        let token = &self.tokens[self.cursor.min(self.tokens.len() - 1)];
        match &token.kind {
            TokenKind::Eof => ConditionError::UnexpectedEnd(expected.to_string()),
            kind => ConditionError::UnexpectedToken {
                found: kind.to_string(),
                expected: expected.to_string(),
                position: token.position,
            },
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<(), ConditionError> {
        if *self.peek() == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn parse_or(&mut self) -> Result<Expression, ConditionError> {
        self.nested(|parser| {
            let mut left = parser.parse_and()?;
            while parser.is_keyword("or") || *parser.peek() == TokenKind::OrOr {
                parser.advance();
                let right = parser.parse_and()?;
                left = Self::bounded(Expression::Or(Box::new(left), Box::new(right)))?;
            }
            Ok(left)
        })
    }

    fn parse_and(&mut self) -> Result<Expression, ConditionError> {
        let mut left = self.parse_not()?;
        while self.is_keyword("and") || *self.peek() == TokenKind::AndAnd {
            self.advance();
            let right = self.parse_not()?;
            left = Self::bounded(Expression::And(Box::new(left), Box::new(right)))?;
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expression, ConditionError> {
        if self.is_keyword("not") || *self.peek() == TokenKind::Bang {
            self.advance();
            let operand = self.nested(Self::parse_not)?;
            return Self::bounded(Expression::Not(Box::new(operand)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expression, ConditionError> {
        let left = self.parse_additive()?;

        let is_not_in = self.is_keyword("not")
            && matches!(self.peek_at(1), TokenKind::Ident(next) if next == "in");
        let build: fn(Box<Expression>, Box<Expression>) -> Expression = match self.peek() {
            TokenKind::EqEq => Expression::Equal,
            TokenKind::NotEq => Expression::NotEqual,
            TokenKind::Lt => Expression::SmallerThan,
            TokenKind::Le => Expression::SmallerThanOrEqual,
            TokenKind::Gt => Expression::GreaterThan,
            TokenKind::Ge => Expression::GreaterThanOrEqual,
            TokenKind::Ident(name) if name == "in" => Expression::In,
            _ if is_not_in => Expression::NotIn,
            _ => return Ok(left),
        };
        if is_not_in {
            self.advance();
        }
        self.advance();

        let right = self.parse_additive()?;
        Self::bounded(build(Box::new(left), Box::new(right)))
    }

    fn parse_additive(&mut self) -> Result<Expression, ConditionError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let build: fn(Box<Expression>, Box<Expression>) -> Expression = match self.peek() {
                TokenKind::Plus => Expression::Sum,
                TokenKind::Minus => Expression::Subtract,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Self::bounded(build(Box::new(left), Box::new(right)))?;
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ConditionError> {
        let mut left = self.parse_unary()?;
        loop {
            let build: fn(Box<Expression>, Box<Expression>) -> Expression = match self.peek() {
                TokenKind::Star => Expression::Multiply,
                TokenKind::Slash => Expression::Divide,
                TokenKind::Percent => Expression::Modulo,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Self::bounded(build(Box::new(left), Box::new(right)))?;
        }
    }

    fn parse_unary(&mut self) -> Result<Expression, ConditionError> {
        match self.peek() {
            TokenKind::Minus => {
                self.advance();
                let operand = self.nested(Self::parse_unary)?;
                Self::bounded(Expression::Negate(Box::new(operand)))
            }
            TokenKind::Plus => {
                self.advance();
                self.nested(Self::parse_unary)
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expression, ConditionError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Int(n) => Ok(Expression::Literal(Value::Int(n))),
            TokenKind::Float(n) => Ok(Expression::Literal(Value::Float(n))),
            TokenKind::Str(s) => Ok(Expression::Literal(Value::Str(s))),
            TokenKind::LParen => {
                let inner = self.parse_or()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                if *self.peek() == TokenKind::LParen {
                    return self.parse_call(&name);
                }
                match name.as_str() {
                    "True" | "true" => Ok(Expression::Literal(Value::Bool(true))),
                    "False" | "false" => Ok(Expression::Literal(Value::Bool(false))),
                    "None" => Ok(Expression::Literal(Value::None)),
                    "input" => Ok(Expression::Input),
                    "length" => Ok(Expression::Length),
                    "and" | "or" | "not" | "in" => Err(ConditionError::UnexpectedToken {
                        found: name,
                        expected: "a value".to_string(),
                        position: token.position,
                    }),
                    _ => Err(ConditionError::UnknownIdentifier(name)),
                }
            }
            TokenKind::Eof => Err(ConditionError::UnexpectedEnd("a value".to_string())),
            kind => Err(ConditionError::UnexpectedToken {
                found: kind.to_string(),
                expected: "a value".to_string(),
                position: token.position,
            }),
        }
    }

    /// Parses `name(arg, ...)` after the identifier has been consumed.
    fn parse_call(&mut self, name: &str) -> Result<Expression, ConditionError> {
        let builtin =
            Builtin::from_name(name).ok_or_else(|| ConditionError::UnknownFunction(name.to_string()))?;
        self.expect(TokenKind::LParen, "'('")?;

        let mut arguments = Vec::new();
        if *self.peek() != TokenKind::RParen {
            loop {
                arguments.push(self.parse_or()?);
                if *self.peek() == TokenKind::Comma {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;

        if arguments.len() != 1 {
            return Err(ConditionError::ArgumentCount {
                function: builtin.name().to_string(),
                found: arguments.len(),
            });
        }
        let argument = arguments.remove(0);
        Self::bounded(Expression::Call(builtin, Box::new(argument)))
    }
}
