//! Recursive-descent parser producing [`Statement`]s

use super::ast::{AssignOp, BinaryOp, Expr, Statement, UnaryOp};
use super::lexer::{tokenize, Token, TokenKind};
use crate::error::{ParseError, ParseErrorCode};
use crate::value::Value;

/// Words that never name a term
const RESERVED: &[&str] = &["and", "or", "not", "in"];

pub(crate) fn parse_statement(source: &str) -> Result<Statement, ParseError> {
    if source.trim().is_empty() {
        return Err(ParseError::new(
            ParseErrorCode::EmptyExpression,
            "expression is empty",
            0,
        ));
    }
    let mut parser = Parser {
        tokens: tokenize(source)?,
        pos: 0,
    };
    let statement = parser.statement()?;
    parser.expect_eof()?;
    Ok(statement)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_at(&self, ahead: usize) -> &TokenKind {
        let idx = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos].offset
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        kind
    }

    fn at_keyword(&self, word: &str) -> bool {
        matches!(self.peek(), TokenKind::Ident(w) if w == word)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::new(
            ParseErrorCode::UnexpectedToken,
            format!("expected {expected}, found {:?}", self.peek()),
            self.offset(),
        )
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<(), ParseError> {
        if self.peek() == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        if *self.peek() == TokenKind::Eof {
            Ok(())
        } else {
            Err(self.unexpected("end of expression"))
        }
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        for (word, declare) in [("new", true), ("del", false)] {
            if self.at_keyword(word) && matches!(self.peek_at(1), TokenKind::Ident(_)) {
                self.advance();
                let TokenKind::Ident(name) = self.advance() else {
                    unreachable!("checked by peek_at");
                };
                return Ok(if declare {
                    Statement::Declare(name)
                } else {
                    Statement::Undeclare(name)
                });
            }
        }

        let target_offset = self.offset();
        let expr = self.or_expr()?;
        let op = match self.peek() {
            TokenKind::Assign => AssignOp::Set,
            TokenKind::PlusAssign => AssignOp::Add,
            TokenKind::MinusAssign => AssignOp::Remove,
            _ => return Ok(Statement::Expr(expr)),
        };
        self.advance();

        let Expr::Attribute(base, attribute) = expr else {
            return Err(ParseError::new(
                ParseErrorCode::InvalidAssignmentTarget,
                "only attributes (term.attribute) can be assigned",
                target_offset,
            ));
        };
        let value = self.or_expr()?;
        Ok(Statement::Assign {
            base: *base,
            attribute,
            op,
            value,
        })
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.and_expr()?;
        while self.at_keyword("or") {
            self.advance();
            let rhs = self.and_expr()?;
            lhs = Expr::Binary(BinaryOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.not_expr()?;
        while self.at_keyword("and") {
            self.advance();
            let rhs = self.not_expr()?;
            lhs = Expr::Binary(BinaryOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn not_expr(&mut self) -> Result<Expr, ParseError> {
        if self.at_keyword("not") {
            self.advance();
            let operand = self.not_expr()?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(operand)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek().clone() {
                TokenKind::Eq => BinaryOp::Eq,
                TokenKind::Ne => BinaryOp::Ne,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Ge => BinaryOp::Ge,
                TokenKind::Ident(w) if w == "in" => BinaryOp::In,
                TokenKind::Ident(w)
                    if w == "not" && matches!(self.peek_at(1), TokenKind::Ident(n) if n == "in") =>
                {
                    self.advance();
                    BinaryOp::NotIn
                }
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if *self.peek() == TokenKind::Minus {
            self.advance();
            let operand = self.unary()?;
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(operand)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        while *self.peek() == TokenKind::Dot {
            self.advance();
            let TokenKind::Ident(name) = self.peek().clone() else {
                return Err(self.unexpected("attribute name"));
            };
            self.advance();
            expr = Expr::Attribute(Box::new(expr), name);
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            TokenKind::Int(i) => {
                self.advance();
                Ok(Expr::Literal(Value::Int(i)))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::Literal(Value::Str(s)))
            }
            TokenKind::Placeholder { variadic, name } => {
                self.advance();
                Ok(Expr::Placeholder { variadic, name })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.or_expr()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.advance();
                let items = self.comma_list(&TokenKind::RBracket, "']'")?;
                Ok(Expr::List(items))
            }
            TokenKind::Ident(word) if RESERVED.contains(&word.as_str()) => {
                Err(self.unexpected("an operand"))
            }
            TokenKind::Ident(word) => {
                self.advance();
                if *self.peek() == TokenKind::LParen {
                    self.advance();
                    let args = self.comma_list(&TokenKind::RParen, "')'")?;
                    return Ok(Expr::Call(word, args));
                }
                Ok(match word.as_str() {
                    "True" | "true" => Expr::Literal(Value::Bool(true)),
                    "False" | "false" => Expr::Literal(Value::Bool(false)),
                    "None" | "none" => Expr::Literal(Value::None),
                    _ => Expr::Name(word),
                })
            }
            _ => Err(self.unexpected("an operand")),
        }
    }

    /// Items up to `close`; the opening delimiter is already consumed
    fn comma_list(&mut self, close: &TokenKind, expected: &str) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        if self.peek() == close {
            self.advance();
            return Ok(items);
        }
        loop {
            items.push(self.or_expr()?);
            if *self.peek() == TokenKind::Comma {
                self.advance();
                if self.peek() == close {
                    self.advance();
                    return Ok(items);
                }
                continue;
            }
            self.expect(close, expected)?;
            return Ok(items);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn name(n: &str) -> Box<Expr> {
        Box::new(Expr::Name(n.into()))
    }

    #[test]
    fn declarations() {
        assert_eq!(parse_statement("new basket").unwrap(), Statement::Declare("basket".into()));
        assert_eq!(parse_statement("del basket").unwrap(), Statement::Undeclare("basket".into()));
    }

    #[test]
    fn assignment_to_attribute() {
        let stmt = parse_statement("basket.count += 1").unwrap();
        assert_eq!(
            stmt,
            Statement::Assign {
                base: Expr::Name("basket".into()),
                attribute: "count".into(),
                op: AssignOp::Add,
                value: Expr::Literal(Value::Int(1)),
            }
        );
    }

    #[test]
    fn assignment_to_bare_name_is_rejected() {
        let err = parse_statement("basket = 1").unwrap_err();
        assert_eq!(err.code, ParseErrorCode::InvalidAssignmentTarget);
    }

    #[test]
    fn precedence_of_boolean_operators() {
        let stmt = parse_statement("a or b and not c").unwrap();
        let expected = Expr::Binary(
            BinaryOp::Or,
            name("a"),
            Box::new(Expr::Binary(
                BinaryOp::And,
                name("b"),
                Box::new(Expr::Unary(UnaryOp::Not, name("c"))),
            )),
        );
        assert_eq!(stmt, Statement::Expr(expected));
    }

    #[test]
    fn not_in_operator() {
        let stmt = parse_statement("x not in shelf.items").unwrap();
        assert_eq!(
            stmt,
            Statement::Expr(Expr::Binary(
                BinaryOp::NotIn,
                name("x"),
                Box::new(Expr::Attribute(name("shelf"), "items".into())),
            ))
        );
    }

    #[test]
    fn arithmetic_binds_tighter_than_comparison() {
        let stmt = parse_statement("a.n + 1 * 2 == 5").unwrap();
        let Statement::Expr(Expr::Binary(BinaryOp::Eq, lhs, _)) = stmt else {
            panic!("expected comparison");
        };
        assert!(matches!(*lhs, Expr::Binary(BinaryOp::Add, _, _)));
    }

    #[test]
    fn lists_calls_and_literals() {
        let stmt = parse_statement("len([1, 'two', True,]) > 0").unwrap();
        let Statement::Expr(Expr::Binary(BinaryOp::Gt, lhs, _)) = stmt else {
            panic!("expected comparison");
        };
        assert_eq!(
            *lhs,
            Expr::Call(
                "len".into(),
                vec![Expr::List(vec![
                    Expr::Literal(Value::Int(1)),
                    Expr::Literal(Value::Str("two".into())),
                    Expr::Literal(Value::Bool(true)),
                ])]
            )
        );
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = parse_statement("a b").unwrap_err();
        assert_eq!(err.code, ParseErrorCode::UnexpectedToken);
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn empty_source_is_rejected() {
        assert_eq!(
            parse_statement("   ").unwrap_err().code,
            ParseErrorCode::EmptyExpression
        );
    }

    #[test]
    fn dangling_operator_is_rejected() {
        assert!(parse_statement("a ==").is_err());
        assert!(parse_statement("(a").is_err());
        assert!(parse_statement("a.").is_err());
    }
}
