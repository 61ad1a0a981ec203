//! Tokenizer and recursive-descent parser for condition expressions.
//!
//! Precedence (lowest → highest):
//! 1. `,` (sequence)
//! 2. `||`
//! 3. `&&`
//! 4. `==`, `!=`, `===`, `!==`
//! 5. `<`, `>`, `<=`, `>=`
//! 6. `+`, `-`
//! 7. `*`, `/`
//! 8. unary `!`, `-`, `+`
//! 9. literals and parenthesised expressions

use crate::ast::{Expression, Value};
use crate::error::ExpressionError;
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

/// Maximum depth of the parsed tree. Unary operators, parentheses and every binary
/// operator in a chain each count as one level.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    EqEq,
    EqEqEq,
    BangEq,
    BangEqEq,
    Bang,
    AndAnd,
    OrOr,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", Value::Number(*n)),
            Token::Str(s) => write!(f, "{:?}", s),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Less => write!(f, "<"),
            Token::Greater => write!(f, ">"),
            Token::LessEq => write!(f, "<="),
            Token::GreaterEq => write!(f, ">="),
            Token::EqEq => write!(f, "=="),
            Token::EqEqEq => write!(f, "==="),
            Token::BangEq => write!(f, "!="),
            Token::BangEqEq => write!(f, "!=="),
            Token::Bang => write!(f, "!"),
            Token::AndAnd => write!(f, "&&"),
            Token::OrOr => write!(f, "||"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// Splits an expression into tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ExpressionError> {
    Lexer {
        source,
        chars: source.char_indices().peekable(),
    }
    .run()
}

struct Lexer<'src> {
    source: &'src str,
    chars: Peekable<CharIndices<'src>>,
}

impl<'src> Lexer<'src> {
    fn run(mut self) -> Result<Vec<Token>, ExpressionError> {
        let mut tokens = Vec::new();
        while let Some(&(offset, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
                continue;
            }
            let token = match c {
                '0'..='9' | '.' => self.number(offset)?,
                '"' | '\'' => self.string(offset, c)?,
                c if is_ident_start(c) => self.ident(offset),
                _ => self.operator(offset, c)?,
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn number(&mut self, start: usize) -> Result<Token, ExpressionError> {
        let mut end = start;
        let mut seen_dot = false;
        let mut seen_digit = false;
        let mut seen_exponent = false;

        while let Some(&(offset, c)) = self.chars.peek() {
            match c {
                '0'..='9' => seen_digit = true,
                '.' if !seen_dot && !seen_exponent => seen_dot = true,
                'e' | 'E' if seen_digit && !seen_exponent => {
                    seen_exponent = true;
                    self.chars.next();
                    end = offset + c.len_utf8();
                    if let Some(&(sign_offset, sign @ ('+' | '-'))) = self.chars.peek() {
                        self.chars.next();
                        end = sign_offset + sign.len_utf8();
                    }
                    continue;
                }
                _ => break,
            }
            self.chars.next();
            end = offset + c.len_utf8();
        }

        let text = &self.source[start..end];
        // `3in` and friends are rejected rather than split into two tokens.
        if let Some(&(_, c)) = self.chars.peek() {
            if is_ident_start(c) || c.is_ascii_digit() {
                return Err(ExpressionError::InvalidNumber(format!("{}{}", text, c)));
            }
        }
        if !seen_digit {
            return match text {
                "." => Err(ExpressionError::UnexpectedCharacter {
                    found: '.',
                    offset: start,
                }),
                _ => Err(ExpressionError::InvalidNumber(text.to_string())),
            };
        }
        text.parse()
            .map(Token::Number)
            .map_err(|_| ExpressionError::InvalidNumber(text.to_string()))
    }

    fn string(&mut self, start: usize, quote: char) -> Result<Token, ExpressionError> {
        self.chars.next();
        let mut value = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                c if c == quote => return Ok(Token::Str(value)),
                '\\' => match self.chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                },
                '\n' => break,
                c => value.push(c),
            }
        }
        Err(ExpressionError::UnterminatedString(start))
    }

    fn ident(&mut self, start: usize) -> Token {
        let mut end = start;
        while let Some(&(offset, c)) = self.chars.peek() {
            if !is_ident_continue(c) {
                break;
            }
            self.chars.next();
            end = offset + c.len_utf8();
        }
        Token::Ident(self.source[start..end].to_string())
    }

    fn operator(&mut self, offset: usize, c: char) -> Result<Token, ExpressionError> {
        self.chars.next();
        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '<' if self.eat('=') => Token::LessEq,
            '<' => Token::Less,
            '>' if self.eat('=') => Token::GreaterEq,
            '>' => Token::Greater,
            '=' if self.eat('=') => {
                if self.eat('=') {
                    Token::EqEqEq
                } else {
                    Token::EqEq
                }
            }
            '!' if self.eat('=') => {
                if self.eat('=') {
                    Token::BangEqEq
                } else {
                    Token::BangEq
                }
            }
            '!' => Token::Bang,
            '&' if self.eat('&') => Token::AndAnd,
            '|' if self.eat('|') => Token::OrOr,
            // Assignment and the bitwise operators are not part of the grammar.
            found => return Err(ExpressionError::UnexpectedCharacter { found, offset }),
        };
        Ok(token)
    }

    fn eat(&mut self, expected: char) -> bool {
        match self.chars.peek() {
            Some(&(_, c)) if c == expected => {
                self.chars.next();
                true
            }
            _ => false,
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

/// Parses a condition expression into an AST.
pub fn parse(source: &str) -> Result<Expression, ExpressionError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expression = parser.parse_sequence()?;
    match parser.peek() {
        None => Ok(expression),
        Some(token) => Err(ExpressionError::UnexpectedToken {
            found: token.to_string(),
            expected: "end of expression".to_string(),
        }),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

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

    fn descend(&mut self) -> Result<(), ExpressionError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExpressionError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    /// `Sequence = Or { "," Or }`
    fn parse_sequence(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.parse_or()?;
        let mut folds = 0;
        while self.eat(&Token::Comma) {
            self.descend()?;
            folds += 1;
            let right = self.parse_or()?;
            left = Expression::Sequence(Box::new(left), Box::new(right));
        }
        self.depth -= folds;
        Ok(left)
    }

    /// `Or = And { "||" And }`
    fn parse_or(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.parse_and()?;
        let mut folds = 0;
        while self.eat(&Token::OrOr) {
            self.descend()?;
            folds += 1;
            let right = self.parse_and()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        self.depth -= folds;
        Ok(left)
    }

    /// `And = Equality { "&&" Equality }`
    fn parse_and(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.parse_equality()?;
        let mut folds = 0;
        while self.eat(&Token::AndAnd) {
            self.descend()?;
            folds += 1;
            let right = self.parse_equality()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        self.depth -= folds;
        Ok(left)
    }

    /// `Equality = Relational { ("==" | "!=" | "===" | "!==") Relational }`
    fn parse_equality(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.parse_relational()?;
        let mut folds = 0;
        loop {
            let op: fn(Box<Expression>, Box<Expression>) -> Expression = match self.peek() {
                Some(Token::EqEq) => Expression::Equal,
                Some(Token::BangEq) => Expression::NotEqual,
                Some(Token::EqEqEq) => Expression::StrictEqual,
                Some(Token::BangEqEq) => Expression::StrictNotEqual,
                _ => break,
            };
            self.advance();
            self.descend()?;
            folds += 1;
            let right = self.parse_relational()?;
            left = op(Box::new(left), Box::new(right));
        }
        self.depth -= folds;
        Ok(left)
    }

    /// `Relational = Additive { ("<" | ">" | "<=" | ">=") Additive }`
    fn parse_relational(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.parse_additive()?;
        let mut folds = 0;
        loop {
            let op: fn(Box<Expression>, Box<Expression>) -> Expression = match self.peek() {
                Some(Token::Less) => Expression::SmallerThan,
                Some(Token::Greater) => Expression::GreaterThan,
                Some(Token::LessEq) => Expression::SmallerThanOrEqual,
                Some(Token::GreaterEq) => Expression::GreaterThanOrEqual,
                _ => break,
            };
            self.advance();
            self.descend()?;
            folds += 1;
            let right = self.parse_additive()?;
            left = op(Box::new(left), Box::new(right));
        }
        self.depth -= folds;
        Ok(left)
    }

    /// `Additive = Multiplicative { ("+" | "-") Multiplicative }`
    fn parse_additive(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.parse_multiplicative()?;
        let mut folds = 0;
        loop {
            let op: fn(Box<Expression>, Box<Expression>) -> Expression = match self.peek() {
                Some(Token::Plus) => Expression::Sum,
                Some(Token::Minus) => Expression::Subtract,
                _ => break,
            };
            self.advance();
            self.descend()?;
            folds += 1;
            let right = self.parse_multiplicative()?;
            left = op(Box::new(left), Box::new(right));
        }
        self.depth -= folds;
        Ok(left)
    }

    /// `Multiplicative = Unary { ("*" | "/") Unary }`
    fn parse_multiplicative(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.parse_unary()?;
        let mut folds = 0;
        loop {
            let op: fn(Box<Expression>, Box<Expression>) -> Expression = match self.peek() {
                Some(Token::Star) => Expression::Multiply,
                Some(Token::Slash) => Expression::Divide,
                _ => break,
            };
            self.advance();
            self.descend()?;
            folds += 1;
            let right = self.parse_unary()?;
            left = op(Box::new(left), Box::new(right));
        }
        self.depth -= folds;
        Ok(left)
    }

    /// `Unary = ("!" | "-" | "+") Unary | Primary`
    fn parse_unary(&mut self) -> Result<Expression, ExpressionError> {
        let op: fn(Box<Expression>) -> Expression = match self.peek() {
            Some(Token::Bang) => Expression::Not,
            Some(Token::Minus) => Expression::Negate,
            Some(Token::Plus) => Expression::Plus,
            _ => return self.parse_primary(),
        };
        self.advance();
        self.descend()?;
        let operand = self.parse_unary()?;
        self.depth -= 1;
        Ok(op(Box::new(operand)))
    }

    /// `Primary = Number | String | Keyword | "(" Sequence ")"`
    fn parse_primary(&mut self) -> Result<Expression, ExpressionError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expression::Literal(Value::Number(n))),
            Some(Token::Str(s)) => Ok(Expression::Literal(Value::Str(s))),
            Some(Token::Ident(name)) => keyword_literal(&name)
                .map(Expression::Literal)
                .ok_or(ExpressionError::UnknownIdentifier(name)),
            Some(Token::LParen) => {
                self.descend()?;
                let inner = self.parse_sequence()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    Some(token) => Err(ExpressionError::UnexpectedToken {
                        found: token.to_string(),
                        expected: "')'".to_string(),
                    }),
                    None => Err(ExpressionError::UnexpectedEnd("')'".to_string())),
                }
            }
            Some(token) => Err(ExpressionError::UnexpectedToken {
                found: token.to_string(),
                expected: "an operand".to_string(),
            }),
            None => Err(ExpressionError::UnexpectedEnd("an operand".to_string())),
        }
    }
}

/// Identifiers that denote literal values. Everything else is undefined.
fn keyword_literal(name: &str) -> Option<Value> {
    match name {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        "null" | "undefined" => Some(Value::Null),
        "NaN" => Some(Value::Number(f64::NAN)),
        "Infinity" => Some(Value::Number(f64::INFINITY)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_operators_greedily() {
        let tokens = tokenize("a !== b != c === d <= 1").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("a".into()),
                Token::BangEqEq,
                Token::Ident("b".into()),
                Token::BangEq,
                Token::Ident("c".into()),
                Token::EqEqEq,
                Token::Ident("d".into()),
                Token::LessEq,
                Token::Number(1.0),
            ]
        );
    }

    #[test]
    fn tokenizes_numbers_and_strings() {
        let tokens = tokenize("1.5 .25 2e3 'it\\'s' \"x\"").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number(1.5),
                Token::Number(0.25),
                Token::Number(2000.0),
                Token::Str("it's".into()),
                Token::Str("x".into()),
            ]
        );
    }

    #[test]
    fn rejects_single_ampersand_and_assignment() {
        assert!(matches!(
            tokenize("a & b"),
            Err(ExpressionError::UnexpectedCharacter { found: '&', .. })
        ));
        assert!(matches!(
            tokenize("a = 1"),
            Err(ExpressionError::UnexpectedCharacter { found: '=', .. })
        ));
    }

    #[test]
    fn rejects_unterminated_strings() {
        assert_eq!(
            tokenize("'abc"),
            Err(ExpressionError::UnterminatedString(0))
        );
    }

    #[test]
    fn respects_precedence() {
        let expr = parse("1 + 2 * 3 > 6 && true").unwrap();
        assert_eq!(expr.to_string(), "1 + 2 * 3 > 6 && true");
        match expr {
            Expression::And(left, _) => match *left {
                Expression::GreaterThan(sum, _) => {
                    assert!(matches!(*sum, Expression::Sum(_, _)));
                }
                other => panic!("expected comparison, got {:?}", other),
            },
            other => panic!("expected AND, got {:?}", other),
        }
    }

    #[test]
    fn subtraction_is_left_associative() {
        let expr = parse("10 - 4 - 3").unwrap();
        assert_eq!(expr.to_string(), "10 - 4 - 3");
        assert!(matches!(expr, Expression::Subtract(ref l, _) if matches!(**l, Expression::Subtract(_, _))));
    }

    #[test]
    fn reports_unknown_identifiers() {
        assert_eq!(
            parse("score > 3"),
            Err(ExpressionError::UnknownIdentifier("score".into()))
        );
    }

    #[test]
    fn reports_trailing_tokens_and_missing_operands() {
        assert!(matches!(
            parse("1 2"),
            Err(ExpressionError::UnexpectedToken { .. })
        ));
        assert!(matches!(parse("1 +"), Err(ExpressionError::UnexpectedEnd(_))));
        assert!(matches!(parse("(1 + 2"), Err(ExpressionError::UnexpectedEnd(_))));
    }

    #[test]
    fn limits_nesting_depth() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(parse(&deep), Err(ExpressionError::TooDeep(MAX_DEPTH)));
        let bangs = format!("{}true", "!".repeat(MAX_DEPTH + 1));
        assert_eq!(parse(&bangs), Err(ExpressionError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn limits_operator_chains() {
        let chain = format!("1{}", "+1".repeat(MAX_DEPTH + 1));
        assert_eq!(parse(&chain), Err(ExpressionError::TooDeep(MAX_DEPTH)));
        let long = "1+1".repeat(5000);
        assert_eq!(parse(&long), Err(ExpressionError::TooDeep(MAX_DEPTH)));

        let fits = format!("1{}", "+1".repeat(MAX_DEPTH - 1));
        assert!(parse(&fits).is_ok());
        let clauses = vec!["2 > 1"; 20].join(" && ");
        assert!(parse(&clauses).is_ok());
    }
}
