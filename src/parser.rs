use log::{debug, trace};

use crate::{
    ast::{
        AggregationArgs, AggregationCall, ArgValue, BinOp, Expr, NamedArg, PipelineArgs,
        PipelineCall, SpannedToken, Token,
    },
    error::SyntaxError,
    extract,
    functions::{FunctionClass, FunctionTable},
    lexer::Lexer,
    outcome::{ParseOutcome, Span},
};
use std::mem;

/// Deepest nesting of parentheses, call arguments and signs accepted.
const MAX_NESTING: usize = 48;

/// Tallest expression tree accepted; operator chains count one per operator.
const MAX_HEIGHT: usize = 256;

/// An expression together with the characters it was parsed from.
type Parsed = (Expr, Span);

/// One argument of a call, before it is checked against the callee.
enum RawArg {
    /// Bare identifier or quoted string in an aggregation's argument list
    Field(String, Span),
    Positional(Expr, Span),
    Named { key: String, value: ArgValue, span: Span },
}

pub struct Parser<'t> {
    lexer: Lexer,
    current: SpannedToken,
    peeked: Option<SpannedToken>,
    table: &'t FunctionTable,
    nesting: usize,
    height: usize,
}

impl Parser<'static> {
    /// Parser over the standard function table.
    pub fn new(lexer: Lexer) -> Result<Self, SyntaxError> {
        Parser::with_table(lexer, FunctionTable::standard())
    }
}

impl<'t> Parser<'t> {
    pub fn with_table(mut lexer: Lexer, table: &'t FunctionTable) -> Result<Self, SyntaxError> {
        let current = lexer.next_spanned()?;
        Ok(Parser {
            lexer,
            current,
            peeked: None,
            table,
            nesting: 0,
            height: 0,
        })
    }

    fn advance(&mut self) -> Result<(), SyntaxError> {
        self.current = match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.next_spanned()?,
        };
        Ok(())
    }

    fn peek(&mut self) -> Result<&Token, SyntaxError> {
        let next = match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.next_spanned()?,
        };
        Ok(&self.peeked.insert(next).token)
    }

    fn error_at(&self, span: Span, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(message, self.lexer.position_at(span.start))
    }

    fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        self.error_at(self.current.span, message)
    }

    fn too_deep(&self) -> SyntaxError {
        self.error_here("Formula nested too deeply")
    }

    /// Enter one level of recursion.
    fn nest(&mut self) -> Result<(), SyntaxError> {
        self.nesting += 1;
        self.height += 1;
        if self.nesting > MAX_NESTING || self.height > MAX_HEIGHT {
            return Err(self.too_deep());
        }
        Ok(())
    }

    fn unnest(&mut self) {
        self.nesting -= 1;
        self.height -= 1;
    }

    /// One more operator in a left-associative chain.
    fn grow(&mut self) -> Result<(), SyntaxError> {
        self.height += 1;
        if self.height > MAX_HEIGHT {
            return Err(self.too_deep());
        }
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current.token) == mem::discriminant(token)
    }

    /// Consume `expected` and return its span.
    fn expect(&mut self, expected: Token) -> Result<Span, SyntaxError> {
        if !self.check(&expected) {
            return Err(self.error_here(format!(
                "Expected {}, got {}",
                expected.describe(),
                self.current.token.describe()
            )));
        }
        let span = self.current.span;
        self.advance()?;
        Ok(span)
    }

    /// Parse primary expressions: numbers, parenthesized groups and calls
    fn parse_primary(&mut self) -> Result<Parsed, SyntaxError> {
        let span = self.current.span;

        match mem::replace(&mut self.current.token, Token::Eof) {
            Token::Integer(n) => {
                self.advance()?;
                Ok((Expr::Integer(n), span))
            }
            Token::Float(n) => {
                self.advance()?;
                Ok((Expr::Float(n), span))
            }
            Token::LParen => {
                self.advance()?;
                let (expr, _) = self.parse_expression()?;
                let close = self.expect(Token::RParen)?;
                Ok((expr, span.to(close)))
            }
            Token::Identifier(name) => {
                if self.peek()? == &Token::LParen {
                    self.advance()?;
                    self.parse_call(name, span)
                } else {
                    Err(self.error_at(
                        span,
                        format!(
                            "Field '{}' must be used inside an aggregation, e.g. sum({})",
                            name, name
                        ),
                    ))
                }
            }
            Token::String(s) => Err(self.error_at(
                span,
                format!(
                    "Unexpected string '{}': strings are only allowed as field or named argument values",
                    s
                ),
            )),
            Token::Eof => Err(self.error_at(span, "Unexpected end of input")),
            token => Err(self.error_at(
                span,
                format!("Unexpected {} in expression", token.describe()),
            )),
        }
    }

    /// Parse `name(args...)`; the current token is the opening parenthesis.
    fn parse_call(&mut self, name: String, name_span: Span) -> Result<Parsed, SyntaxError> {
        let class = self.table.classify(&name);
        trace!("classified '{}' as {:?}", name, class);

        self.expect(Token::LParen)?;
        let field_args = matches!(class, Some(FunctionClass::Aggregation(_)));
        let raw_args = self.parse_arguments(&name, field_args)?;
        let close = self.expect(Token::RParen)?;
        let span = name_span.to(close);

        let expr = match class {
            Some(FunctionClass::Aggregation(kind)) => {
                let args = self.aggregation_args(&name, raw_args)?;
                Expr::Aggregation(Box::new(AggregationCall {
                    written_name: name,
                    kind,
                    args,
                    span,
                }))
            }
            Some(FunctionClass::Pipeline(kind)) => {
                let (inner, args) = self.pipeline_args(&name, span, raw_args)?;
                Expr::Pipeline(Box::new(PipelineCall {
                    written_name: name,
                    kind,
                    inner,
                    args,
                    span,
                }))
            }
            Some(FunctionClass::Math) | None => {
                let args = self.call_args(&name, raw_args)?;
                Expr::Call { name, args, span }
            }
        };

        Ok((expr, span))
    }

    fn parse_arguments(
        &mut self,
        name: &str,
        field_args: bool,
    ) -> Result<Vec<RawArg>, SyntaxError> {
        let mut args = vec![];

        if self.check(&Token::RParen) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_argument(name, field_args)?);

            match self.current.token {
                Token::Comma => self.advance()?,
                Token::RParen => return Ok(args),
                Token::Eof => {
                    return Err(self.error_here(format!(
                        "Unterminated call to '{}': expected ')'",
                        name
                    )));
                }
                _ => {
                    return Err(self.error_here(format!(
                        "Expected ',' or ')' in arguments of '{}', got {}",
                        name,
                        self.current.token.describe()
                    )));
                }
            }
        }
    }

    fn parse_argument(&mut self, name: &str, field_args: bool) -> Result<RawArg, SyntaxError> {
        let start = self.current.span;

        if let Token::Identifier(key) = &self.current.token {
            let key = key.clone();
            if self.peek()? == &Token::Equals {
                self.advance()?; // key
                self.advance()?; // '='
                let (value, value_span) = self.parse_argument_value(&key)?;
                return Ok(RawArg::Named {
                    key,
                    value,
                    span: start.to(value_span),
                });
            }
        }

        if field_args {
            return match mem::replace(&mut self.current.token, Token::Eof) {
                Token::Identifier(field) | Token::String(field) => {
                    self.advance()?;
                    Ok(RawArg::Field(field, start))
                }
                token => {
                    let message = format!(
                        "Aggregation '{}' expects a field name, got {}",
                        name,
                        token.describe()
                    );
                    self.current.token = token;
                    Err(self.error_at(start, message))
                }
            };
        }

        let (expr, span) = self.parse_expression()?;
        Ok(RawArg::Positional(expr, span))
    }

    fn parse_argument_value(&mut self, key: &str) -> Result<(ArgValue, Span), SyntaxError> {
        let span = self.current.span;

        let value = match &self.current.token {
            Token::String(s) | Token::Identifier(s) => ArgValue::Text(s.clone()),
            Token::Integer(n) => ArgValue::Integer(*n),
            Token::Float(n) => ArgValue::Float(*n),
            Token::Minus => {
                self.advance()?;
                let value = match self.current.token {
                    Token::Integer(n) => ArgValue::Integer(-n),
                    Token::Float(n) => ArgValue::Float(-n),
                    _ => {
                        return Err(self.error_here(format!(
                            "Expected a number after '-' in named argument '{}'",
                            key
                        )));
                    }
                };
                let end = self.current.span;
                self.advance()?;
                return Ok((value, span.to(end)));
            }
            other => {
                return Err(self.error_here(format!(
                    "Expected a value for named argument '{}', got {}",
                    key,
                    other.describe()
                )));
            }
        };

        self.advance()?;
        Ok((value, span))
    }

    fn aggregation_args(
        &self,
        name: &str,
        raw_args: Vec<RawArg>,
    ) -> Result<AggregationArgs, SyntaxError> {
        let mut args = AggregationArgs::default();
        let mut positional = 0;

        for raw in raw_args {
            match raw {
                RawArg::Field(field, span) => {
                    positional += 1;
                    if positional > 1 {
                        return Err(self.error_at(
                            span,
                            format!("Aggregation '{}' takes at most one field", name),
                        ));
                    }
                    args.set_field(field).map_err(|msg| self.error_at(span, msg))?;
                }
                RawArg::Named { key, value, span } => {
                    let arg = NamedArg::from_key_value(&key, value)
                        .map_err(|msg| self.error_at(span, msg))?;
                    args.apply(arg).map_err(|msg| self.error_at(span, msg))?;
                }
                // Aggregation arguments never parse as expressions
                RawArg::Positional(_, span) => {
                    return Err(self.error_at(
                        span,
                        format!("Aggregation '{}' expects a field name", name),
                    ));
                }
            }
        }

        trace!("aggregation '{}' arguments: {:?}", name, args);
        Ok(args)
    }

    fn pipeline_args(
        &self,
        name: &str,
        call_span: Span,
        raw_args: Vec<RawArg>,
    ) -> Result<(AggregationCall, PipelineArgs), SyntaxError> {
        let mut args = PipelineArgs::default();
        let mut inner = None;

        for raw in raw_args {
            match raw {
                RawArg::Named { key, value, span } => {
                    let arg = NamedArg::from_key_value(&key, value)
                        .map_err(|msg| self.error_at(span, msg))?;
                    args.apply(arg).map_err(|msg| self.error_at(span, msg))?;
                }
                RawArg::Positional(Expr::Aggregation(call), span) => {
                    if inner.is_some() {
                        return Err(self.error_at(
                            span,
                            format!("Pipeline '{}' wraps exactly one aggregation", name),
                        ));
                    }
                    inner = Some(*call);
                }
                RawArg::Positional(_, span) | RawArg::Field(_, span) => {
                    return Err(self.error_at(
                        span,
                        format!(
                            "Pipeline '{}' must wrap a single aggregation, e.g. {}(sum(bytes))",
                            name, name
                        ),
                    ));
                }
            }
        }

        match inner {
            Some(call) => Ok((call, args)),
            None => Err(self.error_at(
                call_span,
                format!("Pipeline '{}' requires an aggregation argument", name),
            )),
        }
    }

    fn call_args(&self, name: &str, raw_args: Vec<RawArg>) -> Result<Vec<Expr>, SyntaxError> {
        raw_args
            .into_iter()
            .map(|raw| match raw {
                RawArg::Positional(expr, _) => Ok(expr),
                RawArg::Named { key, span, .. } => Err(self.error_at(
                    span,
                    format!("Function '{}' does not accept named argument '{}'", name, key),
                )),
                RawArg::Field(field, span) => Err(self.error_at(
                    span,
                    format!("Field '{}' must be used inside an aggregation", field),
                )),
            })
            .collect()
    }

    fn parse_unary(&mut self) -> Result<Parsed, SyntaxError> {
        let start = self.current.span;

        match self.current.token {
            Token::Minus => {
                self.advance()?;
                self.nest()?;
                let (operand, span) = self.parse_unary()?;
                self.unnest();
                let span = start.to(span);
                let expr = match operand {
                    Expr::Integer(n) => Expr::Integer(-n),
                    Expr::Float(n) => Expr::Float(-n),
                    // Represent as 0 - operand
                    operand => Expr::BinaryOp {
                        op: BinOp::Subtract,
                        left: Box::new(Expr::Integer(0)),
                        right: Box::new(operand),
                        span,
                    },
                };
                Ok((expr, span))
            }
            Token::Plus => {
                self.advance()?;
                self.nest()?;
                let (operand, span) = self.parse_unary()?;
                self.unnest();
                Ok((operand, start.to(span)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Parsed, SyntaxError> {
        let (mut left, mut span) = self.parse_unary()?;
        let height = self.height;

        loop {
            let op = match self.current.token {
                Token::Star => BinOp::Multiply,
                Token::Slash => BinOp::Divide,
                _ => break,
            };

            self.advance()?;
            self.grow()?;
            let (right, right_span) = self.parse_unary()?;
            span = span.to(right_span);

            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }

        self.height = height;
        Ok((left, span))
    }

    fn parse_additive(&mut self) -> Result<Parsed, SyntaxError> {
        let (mut left, mut span) = self.parse_multiplicative()?;
        let height = self.height;

        loop {
            let op = match self.current.token {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Subtract,
                _ => break,
            };

            self.advance()?;
            self.grow()?;
            let (right, right_span) = self.parse_multiplicative()?;
            span = span.to(right_span);

            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }

        self.height = height;
        Ok((left, span))
    }

    fn parse_comparison(&mut self) -> Result<Parsed, SyntaxError> {
        let (left, span) = self.parse_additive()?;

        let op = match self.current.token {
            Token::EqEq => BinOp::Equal,
            Token::Lt => BinOp::LessThan,
            Token::Gt => BinOp::GreaterThan,
            Token::LtEq => BinOp::LessEqual,
            Token::GtEq => BinOp::GreaterEqual,
            _ => return Ok((left, span)),
        };

        self.advance()?;
        let (right, right_span) = self.parse_additive()?;
        let span = span.to(right_span);

        Ok((
            Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            },
            span,
        ))
    }

    fn parse_expression(&mut self) -> Result<Parsed, SyntaxError> {
        self.nest()?;
        let parsed = self.parse_comparison()?;
        self.unnest();
        Ok(parsed)
    }

    /// Parse a complete expression; trailing input is an error.
    pub fn parse(&mut self) -> Result<Expr, SyntaxError> {
        let (expr, _) = self.parse_expression()?;
        if !self.check(&Token::Eof) {
            return Err(self.error_here(format!(
                "Unexpected {} after end of expression",
                self.current.token.describe()
            )));
        }
        Ok(expr)
    }

    /// Parse a formula and extract its aggregation and pipeline references.
    pub fn parse_formula(&mut self) -> Result<ParseOutcome, SyntaxError> {
        let raw_ast = self.parse()?;
        let source = self.lexer.source();
        let (aggregations, pipeline_ops) = extract::extract_references(&raw_ast, source);
        let is_literal = raw_ast.is_literal();

        debug!(
            "parsed formula with {} aggregation(s) and {} pipeline operation(s)",
            aggregations.len(),
            pipeline_ops.len()
        );

        Ok(ParseOutcome {
            aggregations,
            pipeline_ops,
            raw_ast,
            source_text: source.iter().collect(),
            is_literal,
        })
    }
}
