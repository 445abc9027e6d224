//! Proc macros for ctk-core: `css!` inline style declarations.
//!
//! This crate is not meant to be used directly; enable the `macros` feature on `ctk-core`.

use proc_macro::TokenStream;

mod css_macro;

/// Compile-time CSS validation macro.
///
/// Parses CSS property declarations at compile time and produces a
/// `ctk_core::css::styles::Styles` value, the same one a stylesheet
/// declaration block would produce.
///
/// # Syntax
///
/// ```ignore
/// let styles = css! {
///     color: red;
///     background-color: #1a1a2e;
///     padding: 4px 8px;
///     font-size: "1.5em";
///     opacity: 0.5;
///     transition: opacity 200ms;
/// };
/// ```
///
/// Unknown properties, units and malformed values are compile errors.
#[proc_macro]
pub fn css(input: TokenStream) -> TokenStream {
    css_macro::css_impl(input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
