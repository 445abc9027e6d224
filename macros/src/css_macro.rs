//! The css! macro: parse property declarations at compile time and build a `Styles` value.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{Error, Ident, LitFloat, LitInt, LitStr, Result, Token};

// ---------------------------------------------------------------------------
// AST types
// ---------------------------------------------------------------------------

/// A single parsed CSS value token.
#[derive(Debug, Clone)]
pub(crate) enum CssValue {
    /// A bare identifier like `red` or `opacity`.
    Ident(String, Span),
    /// A unitless number.
    Number(f64, Span),
    /// A number followed by `%`.
    Percent(f64, Span),
    /// A number with a unit suffix: `4px`, `200ms`.
    Dimension(f64, String, Span),
    /// `#` followed by hex digits.
    Hash(String, Span),
    /// A quoted string literal.
    Str(String, Span),
}

impl CssValue {
    fn span(&self) -> Span {
        match self {
            CssValue::Ident(_, s)
            | CssValue::Number(_, s)
            | CssValue::Percent(_, s)
            | CssValue::Dimension(_, _, s)
            | CssValue::Hash(_, s)
            | CssValue::Str(_, s) => *s,
        }
    }
}

/// A single CSS property declaration: `property-name: value1 value2;`
#[derive(Debug, Clone)]
pub(crate) struct CssDeclaration {
    /// The property name in kebab-case (e.g. "background-color").
    pub name: String,
    /// The span of the property name, for error reporting.
    pub name_span: Span,
    /// The parsed values after the colon. Commas are dropped.
    pub values: Vec<CssValue>,
}

/// The top-level input to the css! macro.
#[derive(Debug)]
struct CssInput {
    declarations: Vec<CssDeclaration>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl Parse for CssInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut declarations = Vec::new();
        while !input.is_empty() {
            declarations.push(parse_declaration(input)?);
        }
        Ok(CssInput { declarations })
    }
}

/// Parse a single CSS declaration: `property-name: values;`
pub(crate) fn parse_declaration(input: ParseStream) -> Result<CssDeclaration> {
    let first_ident: Ident = input.parse()?;
    let mut name = first_ident.to_string();
    let name_span = first_ident.span();

    while input.peek(Token![-]) {
        input.parse::<Token![-]>()?;
        let next: Ident = input.parse()?;
        name.push('-');
        name.push_str(&next.to_string());
    }

    input.parse::<Token![:]>()?;

    let mut values = Vec::new();
    while !input.peek(Token![;]) {
        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            continue;
        }
        values.push(parse_css_value(input)?);
    }
    input.parse::<Token![;]>()?;

    if values.is_empty() {
        return Err(Error::new(name_span, format!("property `{}` has no value", name)));
    }

    Ok(CssDeclaration {
        name,
        name_span,
        values,
    })
}

/// Attach a trailing `%` or the literal's own suffix to a parsed number.
fn finish_number(input: ParseStream, val: f64, suffix: &str, span: Span) -> Result<CssValue> {
    if !suffix.is_empty() {
        return Ok(CssValue::Dimension(val, suffix.to_string(), span));
    }
    if input.peek(Token![%]) {
        input.parse::<Token![%]>()?;
        return Ok(CssValue::Percent(val, span));
    }
    Ok(CssValue::Number(val, span))
}

/// Parse an integer or float literal, negated when `negative` is set.
fn parse_number(input: ParseStream, negative: bool, span: Span) -> Result<CssValue> {
    let sign = if negative { -1.0 } else { 1.0 };
    if input.peek(LitFloat) {
        let lit: LitFloat = input.parse()?;
        let val: f64 = lit
            .base10_digits()
            .parse()
            .map_err(|_| Error::new(lit.span(), "invalid number"))?;
        return finish_number(input, sign * val, lit.suffix(), span);
    }
    let lit: LitInt = input.parse()?;
    let val: f64 = lit
        .base10_digits()
        .parse()
        .map_err(|_| Error::new(lit.span(), "invalid number"))?;
    finish_number(input, sign * val, lit.suffix(), span)
}

/// Parse a single CSS value token.
pub(crate) fn parse_css_value(input: ParseStream) -> Result<CssValue> {
    // `#ff0000` arrives as `#` + ident, `#1a1a2e` as `#` + an int literal
    // that swallowed the rest as its suffix.
    if input.peek(Token![#]) {
        let hash_token = input.parse::<Token![#]>()?;
        let span = hash_token.span;
        let hex_str = if input.peek(Ident) {
            let ident: Ident = input.parse()?;
            ident.to_string()
        } else if input.peek(LitInt) {
            let lit: LitInt = input.parse()?;
            let mut s = lit.to_string();
            if input.peek(Ident) {
                let ident: Ident = input.parse()?;
                s.push_str(&ident.to_string());
            }
            s
        } else {
            return Err(input.error("expected hex color value after `#`"));
        };
        if !hex_str.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::new(span, format!("invalid hex color `#{}`", hex_str)));
        }
        return Ok(CssValue::Hash(format!("#{}", hex_str), span));
    }

    if input.peek(LitStr) {
        let lit: LitStr = input.parse()?;
        return Ok(CssValue::Str(lit.value(), lit.span()));
    }

    if input.peek(LitFloat) || input.peek(LitInt) {
        let span = input.span();
        return parse_number(input, false, span);
    }

    if input.peek(Ident) {
        let ident: Ident = input.parse()?;
        let mut name = ident.to_string();
        // Property names inside `transition-property` are kebab-case too.
        while input.peek(Token![-]) && input.peek2(Ident) {
            input.parse::<Token![-]>()?;
            let next: Ident = input.parse()?;
            name.push('-');
            name.push_str(&next.to_string());
        }
        return Ok(CssValue::Ident(name, ident.span()));
    }

    if input.peek(Token![-]) {
        let neg_token = input.parse::<Token![-]>()?;
        let span = neg_token.span;
        if input.peek(LitFloat) || input.peek(LitInt) {
            return parse_number(input, true, span);
        }
        return Err(Error::new(span, "expected a number after `-`"));
    }

    Err(input.error("unexpected token in CSS value"))
}

// ---------------------------------------------------------------------------
// Code generation
// ---------------------------------------------------------------------------

/// Convert a kebab-case property name to snake_case.
fn kebab_to_snake(name: &str) -> String {
    name.replace('-', "_")
}

/// All known CSS property names (kebab-case).
const KNOWN_PROPERTIES: &[&str] = &[
    "color",
    "background-color",
    "opacity",
    "font-size",
    "margin",
    "padding",
    "min-width",
    "min-height",
    "transition-duration",
    "transition-property",
    "transition",
];

/// Generate a `Length` token stream from a CssValue. Bare numbers are pixels.
///
/// Rust lexes `1.5em` as a broken exponent, so `em` lengths are written as
/// strings: `"1.5em"`.
fn length_from_value(val: &CssValue) -> Result<TokenStream> {
    match val {
        CssValue::Str(s, span) => {
            let n: f32 = s
                .strip_suffix("em")
                .and_then(|n| n.trim().parse().ok())
                .ok_or_else(|| Error::new(*span, format!("invalid length `{}`", s)))?;
            Ok(quote! { ctk_core::css::length::Length::em(#n) })
        }
        CssValue::Number(f, _) => {
            let f = *f as f32;
            Ok(quote! { ctk_core::css::length::Length::px(#f) })
        }
        CssValue::Percent(f, _) => {
            let f = *f as f32;
            Ok(quote! { ctk_core::css::length::Length::percent(#f) })
        }
        CssValue::Dimension(f, unit, span) => {
            let f = *f as f32;
            match unit.as_str() {
                "px" => Ok(quote! { ctk_core::css::length::Length::px(#f) }),
                "em" => Ok(quote! { ctk_core::css::length::Length::em(#f) }),
                _ => Err(Error::new(*span, format!("unknown length unit `{}`", unit))),
            }
        }
        other => Err(Error::new(other.span(), "expected a length (number, `px`, `em`, or percentage)")),
    }
}

/// Milliseconds from `200ms`, `0.5s` or a bare `0`.
fn time_from_value(val: &CssValue) -> Result<u32> {
    let ms = match val {
        CssValue::Dimension(f, unit, _) if unit == "ms" => *f,
        CssValue::Dimension(f, unit, _) if unit == "s" => *f * 1000.0,
        CssValue::Number(f, _) if *f == 0.0 => 0.0,
        other => return Err(Error::new(other.span(), "expected a time (`ms` or `s`)")),
    };
    if ms < 0.0 {
        return Err(Error::new(val.span(), "negative time"));
    }
    Ok(ms.round() as u32)
}

/// Generate code for a single CSS declaration.
fn generate_declaration(decl: &CssDeclaration) -> Result<TokenStream> {
    if !KNOWN_PROPERTIES.contains(&decl.name.as_str()) {
        return Err(Error::new(
            decl.name_span,
            format!("unknown CSS property `{}`", decl.name),
        ));
    }

    match decl.name.as_str() {
        // --- Colors ---
        "color" | "background-color" => {
            let field = Ident::new(&kebab_to_snake(&decl.name), decl.name_span);
            let val = single_value(&decl.values, &decl.name)?;
            let val_str = color_string(val)?;
            Ok(quote! { __styles.#field = Some(#val_str.to_string()); })
        }

        "opacity" => {
            let val = single_value(&decl.values, &decl.name)?;
            let n = match val {
                CssValue::Number(f, _) => *f,
                CssValue::Percent(f, _) => *f / 100.0,
                other => return Err(Error::new(other.span(), "expected a number or percentage")),
            };
            let n = n.clamp(0.0, 1.0) as f32;
            Ok(quote! { __styles.opacity = Some(#n); })
        }

        // --- Lengths ---
        "font-size" | "min-width" | "min-height" => {
            let field = Ident::new(&kebab_to_snake(&decl.name), decl.name_span);
            let length = length_from_value(single_value(&decl.values, &decl.name)?)?;
            Ok(quote! { __styles.#field = Some(#length); })
        }

        // --- Padding / Margin (1-4 value shorthand) ---
        "padding" | "margin" => {
            let field = Ident::new(&kebab_to_snake(&decl.name), decl.name_span);
            let sides = sides_from_values(&decl.values, &decl.name, decl.name_span)?;
            Ok(quote! { __styles.#field = Some(#sides); })
        }

        // --- Transitions ---
        "transition-duration" => {
            let ms = time_from_value(single_value(&decl.values, &decl.name)?)?;
            Ok(quote! { __styles.transition_duration = Some(#ms); })
        }
        "transition-property" => {
            let names = property_names(&decl.values)?;
            Ok(quote! { __styles.transition_property = Some(vec![#(#names.to_string()),*]); })
        }
        // `transition: <property>... <duration>`, either part optional.
        "transition" => {
            let mut names = Vec::new();
            let mut duration = None;
            for val in &decl.values {
                match val {
                    CssValue::Dimension(..) => duration = Some(time_from_value(val)?),
                    _ => names.push(val.clone()),
                }
            }
            let mut out = TokenStream::new();
            if let Some(ms) = duration {
                out.extend(quote! { __styles.transition_duration = Some(#ms); });
            }
            if !names.is_empty() {
                let names = property_names(&names)?;
                out.extend(quote! {
                    __styles.transition_property = Some(vec![#(#names.to_string()),*]);
                });
            }
            Ok(out)
        }

        _ => Err(Error::new(
            decl.name_span,
            format!("unknown CSS property `{}`", decl.name),
        )),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn single_value<'a>(values: &'a [CssValue], prop: &str) -> Result<&'a CssValue> {
    match values {
        [value] => Ok(value),
        _ => Err(Error::new(
            values.get(1).map_or(Span::call_site(), |v| v.span()),
            format!("`{}` expects exactly one value", prop),
        )),
    }
}

/// A color name or hex color as written.
fn color_string(val: &CssValue) -> Result<String> {
    match val {
        CssValue::Ident(s, _) | CssValue::Hash(s, _) => Ok(s.clone()),
        other => Err(Error::new(other.span(), "expected a color name or hex color")),
    }
}

/// Property names for `transition-property`; `none` contributes nothing.
fn property_names(values: &[CssValue]) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(values.len());
    for val in values {
        match val {
            CssValue::Ident(s, _) if s == "none" => {}
            CssValue::Ident(s, _) | CssValue::Str(s, _) => names.push(s.clone()),
            other => return Err(Error::new(other.span(), "expected a property name")),
        }
    }
    Ok(names)
}

/// Generate `Sides` from 1-4 CSS values (shorthand expansion).
fn sides_from_values(values: &[CssValue], prop: &str, span: Span) -> Result<TokenStream> {
    let lengths = values
        .iter()
        .map(length_from_value)
        .collect::<Result<Vec<_>>>()?;
    match lengths.as_slice() {
        [all] => Ok(quote! { ctk_core::css::length::Sides::all(#all) }),
        [vert, horiz] => Ok(quote! { ctk_core::css::length::Sides::symmetric(#vert, #horiz) }),
        [top, horiz, bottom] => Ok(quote! {
            ctk_core::css::length::Sides::new(#top, #horiz, #bottom, #horiz)
        }),
        [top, right, bottom, left] => Ok(quote! {
            ctk_core::css::length::Sides::new(#top, #right, #bottom, #left)
        }),
        _ => Err(Error::new(
            span,
            format!("`{}` expects 1 to 4 values, got {}", prop, values.len()),
        )),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Entry point: generate code for the entire css! macro.
pub(crate) fn css_impl(input: TokenStream) -> Result<TokenStream> {
    let parsed: CssInput = syn::parse2(input)?;

    if parsed.declarations.is_empty() {
        return Err(Error::new(
            Span::call_site(),
            "css! macro requires at least one property declaration",
        ));
    }

    let mut field_assignments = Vec::new();
    for decl in &parsed.declarations {
        field_assignments.push(generate_declaration(decl)?);
    }

    Ok(quote! {
        {
            let mut __styles = ctk_core::css::styles::Styles::new();
            #(#field_assignments)*
            __styles
        }
    })
}

// ===========================================================================
// Tests
// ===========================================================================
