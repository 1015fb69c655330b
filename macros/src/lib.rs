//! Proc macros for style-module: `style!` nested style literals.
//!
//! This crate is not meant to be used directly; enable the `macros` feature on `style-module`.

use proc_macro::TokenStream;

mod style_macro;

/// Nested style literal macro.
///
/// Builds a `style_module::css::model::Style` from a JSON-like literal,
/// rejecting duplicate keys at compile time.
///
/// # Syntax
///
/// - Keys are string literals (`"&:hover"`, `"@media print"`) or kebab-case
///   identifiers (`font-size`, `-webkit-appearance`, `fontSize`)
/// - Entries are separated by `,` or `;`; a trailing separator is allowed
///
/// # Values
///
/// - `{ ... }`: nested style
/// - `"text"`, `red`, `space-between`, `#1e90ff`: string
/// - `10`, `-4`, `0.5`: number; `10px`, `1.5rem`: number with unit, as a string
/// - `null`: no value (an at-rule with a null body renders as a bare statement)
/// - `(expr)`: any Rust expression, converted with `StyleValue::from`
///
/// # Example
///
/// ```ignore
/// let button = style! {
///     color: white,
///     background: #1e90ff,
///     padding: "4px 8px",
///     "&:hover": { background: (hover_color) },
///     "@media (max-width: 600px)": { padding: 2px },
/// };
/// ```
#[proc_macro]
pub fn style(input: TokenStream) -> TokenStream {
    style_macro::style_impl(input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
