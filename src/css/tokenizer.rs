//! logos-based CSS tokenizer.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (e.g. `#fff` as HexColor beats `#` as Hash)
//! 2. For equal length matches, earlier-defined variants win
//!
//! Our ordering ensures:
//! - `#ff00aa` matches [`Token::HexColor`], not `Hash` + `Ident`
//! - `250ms` matches [`Token::Dimension`], not `Number` + `Ident`
//! - `:hover` and `:dir(ltr)` match [`Token::PseudoClass`], not `Colon` + `Ident`

use logos::Logos;

/// CSS token produced by the lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // ── Compound tokens (longer matches, defined first) ──────────────

    /// `!important` flag.
    #[token("!important")]
    Important,

    /// CSS hex color: `#fff`, `#ff00aa`, `#ff00aa80` (3-8 hex digits).
    #[regex(r"#[0-9a-fA-F]{3,8}")]
    HexColor,

    /// Number with a unit: `4px`, `1.5em`, `50%`, `200ms`, `1s`.
    #[regex(r"-?[0-9]+(\.[0-9]+)?(px|em|%|ms|s)")]
    Dimension,

    /// Pseudo-class, optionally with an argument: `:hover`, `:dir(rtl)`.
    #[regex(r":[a-zA-Z][a-zA-Z0-9_-]*(\([a-zA-Z0-9_-]+\))?")]
    PseudoClass,

    /// Double-quoted string literal.
    #[regex(r#""[^"]*""#)]
    StringLiteral,

    /// Single-quoted string literal.
    #[regex(r"'[^']*'")]
    StringLiteralSingle,

    /// Number: integer or float, possibly negative.
    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    /// Identifier: property names, element names, color names, etc.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    // ── Single-character punctuation ─────────────────────────────────

    /// `{`
    #[token("{")]
    BraceOpen,

    /// `}`
    #[token("}")]
    BraceClose,

    /// `:`
    #[token(":")]
    Colon,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `,`
    #[token(",")]
    Comma,

    /// `.`
    #[token(".")]
    Dot,

    /// `#`
    #[token("#")]
    Hash,

    /// `*`
    #[token("*")]
    Star,

    /// `>`
    #[token(">")]
    GreaterThan,
}

/// Tokenize a CSS string into `(Token, text)` pairs. Unlexable input is
/// skipped.
pub fn tokenize(input: &str) -> Vec<(Token, String)> {
    let lexer = Token::lexer(input);
    lexer
        .spanned()
        .filter_map(|(result, span)| {
            result.ok().map(|token| (token, input[span].to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input).into_iter().map(|(t, _)| t).collect()
    }

    // ── Punctuation and identifiers ──────────────────────────────────

    #[test]
    fn punctuation() {
        assert_eq!(
            tokens("{ } : ; , . # * >"),
            vec![
                Token::BraceOpen,
                Token::BraceClose,
                Token::Colon,
                Token::Semicolon,
                Token::Comma,
                Token::Dot,
                Token::Hash,
                Token::Star,
                Token::GreaterThan,
            ]
        );
    }

    #[test]
    fn idents() {
        let result = tokenize("color background-color my-widget _private");
        assert_eq!(result[0], (Token::Ident, "color".into()));
        assert_eq!(result[1], (Token::Ident, "background-color".into()));
        assert_eq!(result[2], (Token::Ident, "my-widget".into()));
        assert_eq!(result[3], (Token::Ident, "_private".into()));
    }

    // ── Numbers and dimensions ───────────────────────────────────────

    #[test]
    fn numbers() {
        let result = tokenize("10 -5 0.5");
        assert_eq!(result[0], (Token::Number, "10".into()));
        assert_eq!(result[1], (Token::Number, "-5".into()));
        assert_eq!(result[2], (Token::Number, "0.5".into()));
    }

    #[test]
    fn dimensions() {
        let result = tokenize("4px 1.5em 50% 200ms 1s -2px");
        assert_eq!(result[0], (Token::Dimension, "4px".into()));
        assert_eq!(result[1], (Token::Dimension, "1.5em".into()));
        assert_eq!(result[2], (Token::Dimension, "50%".into()));
        assert_eq!(result[3], (Token::Dimension, "200ms".into()));
        assert_eq!(result[4], (Token::Dimension, "1s".into()));
        assert_eq!(result[5], (Token::Dimension, "-2px".into()));
    }

    #[test]
    fn milliseconds_beat_seconds() {
        assert_eq!(tokens("250ms"), vec![Token::Dimension]);
    }

    // ── Hex colors vs id selectors ───────────────────────────────────

    #[test]
    fn hex_colors() {
        let result = tokenize("#fff #ff00aa #ff00aa80");
        assert_eq!(result[0], (Token::HexColor, "#fff".into()));
        assert_eq!(result[1], (Token::HexColor, "#ff00aa".into()));
        assert_eq!(result[2], (Token::HexColor, "#ff00aa80".into()));
    }

    #[test]
    fn hash_id_selector() {
        assert_eq!(tokens("#my-id"), vec![Token::Hash, Token::Ident]);
    }

    // ── Pseudo-classes ───────────────────────────────────────────────

    #[test]
    fn pseudo_classes() {
        let result = tokenize(":hover :first-child :dir(rtl) :drop(active)");
        assert_eq!(result[0], (Token::PseudoClass, ":hover".into()));
        assert_eq!(result[1], (Token::PseudoClass, ":first-child".into()));
        assert_eq!(result[2], (Token::PseudoClass, ":dir(rtl)".into()));
        assert_eq!(result[3], (Token::PseudoClass, ":drop(active)".into()));
    }

    // ── Whole rules ──────────────────────────────────────────────────

    #[test]
    fn full_rule() {
        let input = "button.flat:hover { opacity: 0.5; transition-duration: 200ms; }";
        assert_eq!(
            tokens(input),
            vec![
                Token::Ident,
                Token::Dot,
                Token::Ident,
                Token::PseudoClass,
                Token::BraceOpen,
                Token::Ident,
                Token::Colon,
                Token::Number,
                Token::Semicolon,
                Token::Ident,
                Token::Colon,
                Token::Dimension,
                Token::Semicolon,
                Token::BraceClose,
            ]
        );
    }

    #[test]
    fn important_and_strings() {
        let result = tokenize(r#"color: red !important; transition-property: "opacity""#);
        assert_eq!(result[3].0, Token::Important);
        assert_eq!(result[7], (Token::StringLiteral, "\"opacity\"".into()));
    }

    #[test]
    fn whitespace_only() {
        assert!(tokens("   \t\n  ").is_empty());
    }
}
