//! Recursive descent CSS parser.
//!
//! Parses CSS text into a [`StyleSheet`] (a vector of [`RuleSet`]s). Uses the
//! logos-based tokenizer from [`crate::css::tokenizer`].

use logos::Logos;

use crate::css::model::*;
use crate::css::tokenizer::Token;
use crate::style::StateFlags;

/// Errors from CSS parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token at position {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
    #[error("unknown pseudo-class ':{0}'")]
    UnknownPseudoClass(String),
}

/// A token with its byte span, used to detect whitespace between tokens.
#[derive(Debug, Clone)]
struct PToken {
    token: Token,
    text: String,
    /// Index in the token stream (for error reporting).
    pos: usize,
    byte_start: usize,
    byte_end: usize,
}

/// Replace each `/* ... */` comment with a single space. An unterminated
/// comment swallows the rest of the input.
fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("/*") {
        result.push_str(&rest[..start]);
        result.push(' ');
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return result,
        }
    }
    result.push_str(rest);
    result
}

fn tokenize_with_spans(input: &str) -> Vec<PToken> {
    let lexer = Token::lexer(input);
    let mut tokens = Vec::new();

    for (result, span) in lexer.spanned() {
        if let Ok(token) = result {
            tokens.push(PToken {
                text: input[span.clone()].to_string(),
                token,
                pos: tokens.len(),
                byte_start: span.start,
                byte_end: span.end,
            });
        }
    }

    tokens
}

/// Parse a CSS string into a [`StyleSheet`].
pub fn parse_css(input: &str) -> Result<StyleSheet, ParseError> {
    let cleaned = strip_comments(input);
    let tokens = tokenize_with_spans(&cleaned);

    let mut parser = Parser { tokens, cursor: 0 };

    let mut rules = Vec::new();
    while !parser.is_eof() {
        rules.push(parser.parse_rule()?);
    }

    Ok(StyleSheet { rules })
}

/// Map a pseudo-class name (without `:`) to a selector component.
fn pseudo_class_component(name: &str) -> Result<SelectorComponent, ParseError> {
    match name {
        "first-child" => Ok(SelectorComponent::FirstChild),
        "last-child" => Ok(SelectorComponent::LastChild),
        other => StateFlags::from_pseudo_class(other)
            .map(SelectorComponent::State)
            .ok_or_else(|| ParseError::UnknownPseudoClass(other.to_string())),
    }
}

struct Parser {
    tokens: Vec<PToken>,
    cursor: usize,
}

impl Parser {
    fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<&PToken> {
        self.tokens.get(self.cursor)
    }

    fn peek_is(&self, token: &Token) -> bool {
        self.peek().is_some_and(|t| &t.token == token)
    }

    fn advance(&mut self) -> Option<PToken> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<PToken, ParseError> {
        match self.advance() {
            Some(tok) if &tok.token == expected => Ok(tok),
            Some(tok) => Err(ParseError::UnexpectedToken {
                position: tok.pos,
                message: format!("expected {:?}, got {:?} '{}'", expected, tok.token, tok.text),
            }),
            None => Err(ParseError::UnexpectedEof(format!("expected {:?}", expected))),
        }
    }

    /// Consume an identifier, naming `what` in the error.
    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.advance() {
            Some(tok) if tok.token == Token::Ident => Ok(tok.text),
            Some(tok) => Err(ParseError::UnexpectedToken {
                position: tok.pos,
                message: format!("expected {what}, got {:?} '{}'", tok.token, tok.text),
            }),
            None => Err(ParseError::UnexpectedEof(format!("expected {what}"))),
        }
    }

    fn current_pos(&self) -> usize {
        self.peek().map(|t| t.pos).unwrap_or(self.tokens.len())
    }

    /// Whether the current token directly follows the previous one.
    fn is_adjacent(&self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = &self.tokens[self.cursor - 1];
        self.peek().is_some_and(|curr| curr.byte_start == prev.byte_end)
    }

    /// `selectors { declarations }`
    fn parse_rule(&mut self) -> Result<RuleSet, ParseError> {
        let selectors = self.parse_selector_list()?;
        self.expect(&Token::BraceOpen)?;
        let declarations = self.parse_declarations()?;
        self.expect(&Token::BraceClose)?;

        Ok(RuleSet {
            selectors,
            declarations,
        })
    }

    fn parse_selector_list(&mut self) -> Result<Vec<Selector>, ParseError> {
        let mut selectors = vec![self.parse_selector()?];
        while self.peek_is(&Token::Comma) {
            self.advance();
            selectors.push(self.parse_selector()?);
        }
        Ok(selectors)
    }

    fn parse_selector(&mut self) -> Result<Selector, ParseError> {
        let mut parts = vec![SelectorPart::Compound(self.parse_compound_selector()?)];

        loop {
            match self.peek().map(|t| &t.token) {
                Some(Token::GreaterThan) => {
                    self.advance();
                    parts.push(SelectorPart::Combinator(Combinator::Child));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                }
                // A selector start after whitespace: parse_compound_selector
                // already consumed anything adjacent.
                Some(
                    Token::Ident
                    | Token::Hash
                    | Token::HexColor
                    | Token::Dot
                    | Token::Star
                    | Token::PseudoClass,
                ) => {
                    parts.push(SelectorPart::Combinator(Combinator::Descendant));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                }
                _ => break,
            }
        }

        Ok(Selector { parts })
    }

    /// Parse one simple selector that may appear anywhere in a compound.
    fn parse_qualifier(&mut self) -> Result<Option<SelectorComponent>, ParseError> {
        let Some(tok) = self.peek().cloned() else {
            return Ok(None);
        };
        let component = match tok.token {
            Token::Dot => {
                self.advance();
                SelectorComponent::Class(self.expect_ident("class name")?)
            }
            Token::Hash => {
                self.advance();
                SelectorComponent::Id(self.expect_ident("id name")?)
            }
            // `#abc` lexes as a color; as a selector it is an id.
            Token::HexColor => {
                self.advance();
                SelectorComponent::Id(tok.text[1..].to_string())
            }
            Token::PseudoClass => {
                self.advance();
                pseudo_class_component(&tok.text[1..])?
            }
            _ => return Ok(None),
        };
        Ok(Some(component))
    }

    /// Parse simple selectors with no whitespace between them, e.g.
    /// `button.flat:hover`.
    fn parse_compound_selector(&mut self) -> Result<CompoundSelector, ParseError> {
        let mut compound = CompoundSelector::new();

        match self.peek().map(|t| t.token.clone()) {
            Some(Token::Ident) => {
                let name = self.expect_ident("element name")?;
                compound.push(SelectorComponent::Name(name));
            }
            Some(Token::Star) => {
                self.advance();
                compound.push(SelectorComponent::Universal);
            }
            _ => match self.parse_qualifier()? {
                Some(component) => compound.push(component),
                None => {
                    return Err(ParseError::UnexpectedToken {
                        position: self.current_pos(),
                        message: "expected selector part".into(),
                    });
                }
            },
        }

        while self.is_adjacent() {
            match self.parse_qualifier()? {
                Some(component) => compound.push(component),
                None => break,
            }
        }

        Ok(compound)
    }

    fn parse_declarations(&mut self) -> Result<Vec<Declaration>, ParseError> {
        let mut declarations = Vec::new();
        while self.peek().is_some_and(|t| t.token != Token::BraceClose) {
            declarations.push(self.parse_declaration()?);
        }
        Ok(declarations)
    }

    /// `property: value1 value2 [!important];`
    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let property = self.expect_ident("property name")?;
        let mut values = Vec::new();

        // `color:red` lexes the colon and value as one pseudo-class token.
        match self.peek().cloned() {
            Some(tok) if tok.token == Token::PseudoClass && self.is_adjacent() => {
                self.advance();
                values.push(DeclarationValue::Ident(tok.text[1..].to_string()));
            }
            _ => {
                self.expect(&Token::Colon)?;
            }
        }

        let mut important = false;
        loop {
            match self.peek().map(|t| &t.token) {
                None | Some(Token::Semicolon) | Some(Token::BraceClose) => break,
                Some(Token::Important) => {
                    self.advance();
                    important = true;
                    break;
                }
                Some(_) => values.push(self.parse_declaration_value()?),
            }
        }

        if self.peek_is(&Token::Semicolon) {
            self.advance();
        }

        Ok(Declaration {
            property,
            values,
            important,
        })
    }

    fn parse_declaration_value(&mut self) -> Result<DeclarationValue, ParseError> {
        let tok = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof("expected declaration value".into()))?;

        match &tok.token {
            Token::Number => {
                let n: f32 = tok.text.parse().map_err(|_| ParseError::UnexpectedToken {
                    position: tok.pos,
                    message: format!("invalid number: {}", tok.text),
                })?;
                Ok(DeclarationValue::Number(n))
            }
            Token::Dimension => {
                let (num_str, unit_str) =
                    split_dimension(&tok.text).ok_or_else(|| ParseError::UnexpectedToken {
                        position: tok.pos,
                        message: format!("invalid dimension: {}", tok.text),
                    })?;
                let n: f32 = num_str.parse().map_err(|_| ParseError::UnexpectedToken {
                    position: tok.pos,
                    message: format!("invalid number in dimension: {num_str}"),
                })?;
                Ok(DeclarationValue::Dimension(n, unit_str.to_string()))
            }
            Token::Ident => Ok(DeclarationValue::Ident(tok.text.clone())),
            Token::HexColor => Ok(DeclarationValue::Color(tok.text[1..].to_string())),
            Token::StringLiteral | Token::StringLiteralSingle => {
                let inner = &tok.text[1..tok.text.len() - 1];
                Ok(DeclarationValue::String(inner.to_string()))
            }
            // Separators inside a value list, e.g. `transition-property: a, b`.
            Token::Comma => self.parse_declaration_value(),
            other => Err(ParseError::UnexpectedToken {
                position: tok.pos,
                message: format!(
                    "unexpected token in declaration value: {:?} '{}'",
                    other, tok.text
                ),
            }),
        }
    }
}

/// Split a dimension like `"50%"` or `"200ms"` into number and unit.
fn split_dimension(s: &str) -> Option<(&str, &str)> {
    let unit_start = s
        .char_indices()
        .find(|(i, c)| !c.is_ascii_digit() && *c != '.' && !(*c == '-' && *i == 0))
        .map(|(i, _)| i)?;

    if unit_start == 0 || unit_start >= s.len() {
        return None;
    }

    Some((&s[..unit_start], &s[unit_start..]))
}
