//! style! macro: parse a nested style literal at compile time and generate Style code.

use std::collections::HashSet;

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::{braced, parenthesized, Error, Expr, Ident, LitFloat, LitInt, LitStr, Result, Token};

// ---------------------------------------------------------------------------
// AST types
// ---------------------------------------------------------------------------

/// A single parsed style value.
#[derive(Debug, Clone)]
pub(crate) enum StyleLit {
    /// `null`, as used for bodiless at-rules.
    Null,
    /// A quoted string, a bare identifier, a hex color or a number with a unit.
    Str(String),
    Int(i64),
    Float(f64),
    /// A braced nested style.
    Nested(StyleInput),
    /// A parenthesized Rust expression, converted with `StyleValue::from`.
    Expr(Box<Expr>),
}

/// One `key: value` entry.
#[derive(Debug, Clone)]
pub(crate) struct StyleEntry {
    pub key: String,
    pub key_span: Span,
    pub value: StyleLit,
}

/// The body of a `style!` invocation or of a nested `{ ... }`.
#[derive(Debug, Clone)]
pub(crate) struct StyleInput {
    pub entries: Vec<StyleEntry>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

impl Parse for StyleInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut entries: Vec<StyleEntry> = Vec::new();
        let mut seen = HashSet::new();

        while !input.is_empty() {
            let entry = parse_entry(input)?;
            if !seen.insert(entry.key.clone()) {
                return Err(Error::new(
                    entry.key_span,
                    format!("duplicate style key `{}`", entry.key),
                ));
            }
            entries.push(entry);

            if input.is_empty() {
                break;
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            } else if input.peek(Token![;]) {
                input.parse::<Token![;]>()?;
            } else {
                return Err(input.error(
                    "expected `,` or `;` after a style value (quote multi-part values)",
                ));
            }
        }

        Ok(StyleInput { entries })
    }
}

/// Parse `key: value`.
fn parse_entry(input: ParseStream) -> Result<StyleEntry> {
    let (key, key_span) = parse_key(input)?;
    input.parse::<Token![:]>()?;
    let value = parse_value(input)?;
    Ok(StyleEntry {
        key,
        key_span,
        value,
    })
}

/// Parse a key: a string literal or a kebab-case identifier such as
/// `font-size` or `-webkit-appearance`.
fn parse_key(input: ParseStream) -> Result<(String, Span)> {
    if input.peek(LitStr) {
        let lit: LitStr = input.parse()?;
        return Ok((lit.value(), lit.span()));
    }

    let mut key = String::new();
    let mut span = None;
    while input.peek(Token![-]) {
        let dash = input.parse::<Token![-]>()?;
        span.get_or_insert(dash.span);
        key.push('-');
    }
    let first = input.call(Ident::parse_any)?;
    let span = span.unwrap_or_else(|| first.span());
    key.push_str(&first.to_string());
    key.push_str(&parse_kebab_tail(input)?);
    Ok((key, span))
}

/// Consume `-ident` pieces following an identifier.
fn parse_kebab_tail(input: ParseStream) -> Result<String> {
    let mut tail = String::new();
    while input.peek(Token![-]) && input.peek2(Ident::peek_any) {
        input.parse::<Token![-]>()?;
        let next = input.call(Ident::parse_any)?;
        tail.push('-');
        tail.push_str(&next.to_string());
    }
    Ok(tail)
}

/// Parse a single style value.
pub(crate) fn parse_value(input: ParseStream) -> Result<StyleLit> {
    if input.peek(syn::token::Brace) {
        let content;
        braced!(content in input);
        return Ok(StyleLit::Nested(content.parse()?));
    }

    if input.peek(syn::token::Paren) {
        let content;
        parenthesized!(content in input);
        let expr: Expr = content.parse()?;
        return Ok(StyleLit::Expr(Box::new(expr)));
    }

    if input.peek(LitStr) {
        let lit: LitStr = input.parse()?;
        return Ok(StyleLit::Str(lit.value()));
    }

    if input.peek(Token![#]) {
        input.parse::<Token![#]>()?;
        let hex = if input.peek(Ident) {
            input.parse::<Ident>()?.to_string()
        } else if input.peek(LitInt) {
            input.parse::<LitInt>()?.to_string()
        } else if input.peek(LitFloat) {
            input.parse::<LitFloat>()?.to_string()
        } else {
            return Err(input.error("expected hex color value after `#`"));
        };
        return Ok(StyleLit::Str(format!("#{hex}")));
    }

    if input.peek(Token![-]) && (input.peek2(LitInt) || input.peek2(LitFloat)) {
        input.parse::<Token![-]>()?;
        return parse_number(input, true);
    }

    if input.peek(LitInt) || input.peek(LitFloat) {
        return parse_number(input, false);
    }

    if input.peek(Ident::peek_any) || input.peek(Token![-]) {
        let (word, _) = parse_key(input)?;
        if word == "null" {
            return Ok(StyleLit::Null);
        }
        return Ok(StyleLit::Str(word));
    }

    Err(input.error("unexpected token in style value"))
}

/// Parse a numeric literal. A suffix (`10px`, `1.5rem`) makes it a string.
fn parse_number(input: ParseStream, negative: bool) -> Result<StyleLit> {
    let sign = if negative { "-" } else { "" };

    if input.peek(LitFloat) {
        let lit: LitFloat = input.parse()?;
        if !lit.suffix().is_empty() {
            return Ok(StyleLit::Str(format!(
                "{sign}{}{}",
                lit.base10_digits(),
                lit.suffix()
            )));
        }
        let value: f64 = lit.base10_parse()?;
        return Ok(StyleLit::Float(if negative { -value } else { value }));
    }

    let lit: LitInt = input.parse()?;
    if !lit.suffix().is_empty() {
        return Ok(StyleLit::Str(format!(
            "{sign}{}{}",
            lit.base10_digits(),
            lit.suffix()
        )));
    }
    let value: i64 = lit.base10_parse()?;
    Ok(StyleLit::Int(if negative { -value } else { value }))
}

// ---------------------------------------------------------------------------
// Code generation
// ---------------------------------------------------------------------------

fn generate_value(value: &StyleLit) -> TokenStream {
    match value {
        StyleLit::Null => quote! { ::style_module::css::model::StyleValue::Null },
        StyleLit::Str(s) => quote! { ::style_module::css::model::StyleValue::from(#s) },
        StyleLit::Int(n) => quote! { ::style_module::css::model::StyleValue::Int(#n) },
        StyleLit::Float(f) => quote! { ::style_module::css::model::StyleValue::Float(#f) },
        StyleLit::Nested(nested) => {
            let body = generate_style(nested);
            quote! { ::style_module::css::model::StyleValue::Nested(#body) }
        }
        StyleLit::Expr(expr) => quote! { ::style_module::css::model::StyleValue::from(#expr) },
    }
}

fn generate_style(input: &StyleInput) -> TokenStream {
    let inserts = input.entries.iter().map(|entry| {
        let key = &entry.key;
        let value = generate_value(&entry.value);
        quote! { __style.insert(#key, #value); }
    });

    quote! {
        {
            #[allow(unused_mut)]
            let mut __style = ::style_module::css::model::Style::new();
            #(#inserts)*
            __style
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Entry point: generate code for the entire style! macro.
pub(crate) fn style_impl(input: TokenStream) -> Result<TokenStream> {
    let parsed: StyleInput = syn::parse2(input)?;
    Ok(generate_style(&parsed))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn parse_style(tokens: TokenStream) -> Result<StyleInput> {
        syn::parse2(tokens)
    }

    fn gen(tokens: TokenStream) -> Result<TokenStream> {
        style_impl(tokens)
    }

    fn only_value(tokens: TokenStream) -> StyleLit {
        let mut input = parse_style(tokens).unwrap();
        assert_eq!(input.entries.len(), 1);
        input.entries.remove(0).value
    }

    // -----------------------------------------------------------------------
    // Parsing tests
    // -----------------------------------------------------------------------

    #[test]
    fn parse_ident_value() {
        let input = parse_style(quote! { color: red }).unwrap();
        assert_eq!(input.entries[0].key, "color");
        match &input.entries[0].value {
            StyleLit::Str(s) => assert_eq!(s, "red"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn parse_kebab_keys() {
        let input = parse_style(quote! {
            font-size: 12,
            -webkit-appearance: none,
            type: text,
        })
        .unwrap();
        let keys: Vec<&str> = input.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["font-size", "-webkit-appearance", "type"]);
    }

    #[test]
    fn parse_string_keys_and_nesting() {
        let input = parse_style(quote! {
            "&:hover": { color: blue },
            "@media (min-width: 400px)": { "&": { margin: 0 } };
        })
        .unwrap();
        assert_eq!(input.entries[0].key, "&:hover");
        match &input.entries[1].value {
            StyleLit::Nested(inner) => assert_eq!(inner.entries[0].key, "&"),
            other => panic!("expected nested, got {other:?}"),
        }
    }

    #[test]
    fn parse_numbers() {
        assert!(matches!(only_value(quote! { z-index: 10 }), StyleLit::Int(10)));
        assert!(matches!(only_value(quote! { margin: -4 }), StyleLit::Int(-4)));
        match only_value(quote! { opacity: 0.5 }) {
            StyleLit::Float(f) => assert_eq!(f, 0.5),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn parse_numbers_with_units() {
        match only_value(quote! { width: 10px }) {
            StyleLit::Str(s) => assert_eq!(s, "10px"),
            other => panic!("expected string, got {other:?}"),
        }
        match only_value(quote! { top: -1.5rem }) {
            StyleLit::Str(s) => assert_eq!(s, "-1.5rem"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn parse_hex_and_kebab_values() {
        match only_value("color: #fff".parse::<TokenStream>().unwrap()) {
            StyleLit::Str(s) => assert_eq!(s, "#fff"),
            other => panic!("expected string, got {other:?}"),
        }
        match only_value(quote! { justify-content: space-between }) {
            StyleLit::Str(s) => assert_eq!(s, "space-between"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn parse_null_and_expr() {
        assert!(matches!(only_value(quote! { color: null }), StyleLit::Null));
        assert!(matches!(
            only_value(quote! { color: (theme.accent()) }),
            StyleLit::Expr(_)
        ));
    }

    #[test]
    fn parse_empty() {
        assert!(parse_style(quote! {}).unwrap().entries.is_empty());
    }

    // -----------------------------------------------------------------------
    // Codegen tests
    // -----------------------------------------------------------------------

    #[test]
    fn codegen_builds_style() {
        let s = gen(quote! { color: red, width: 10 }).unwrap().to_string();
        assert!(s.contains("Style :: new ()"));
        assert!(s.contains("__style . insert (\"color\""));
        assert!(s.contains("StyleValue :: from (\"red\")"));
        assert!(s.contains("StyleValue :: Int (10i64)"));
    }

    #[test]
    fn codegen_nested() {
        let s = gen(quote! { "&:hover": { color: null } }).unwrap().to_string();
        assert!(s.contains("StyleValue :: Nested"));
        assert!(s.contains("StyleValue :: Null"));
    }

    #[test]
    fn codegen_expression() {
        let s = gen(quote! { color: (accent) }).unwrap().to_string();
        assert!(s.contains("StyleValue :: from (accent)"));
    }

    // -----------------------------------------------------------------------
    // Error tests
    // -----------------------------------------------------------------------

    #[test]
    fn error_duplicate_key() {
        let result = gen(quote! { color: red, color: blue });
        assert!(result.unwrap_err().to_string().contains("duplicate style key `color`"));
    }

    #[test]
    fn error_missing_separator() {
        let result = gen(quote! { border: 1px solid red });
        assert!(result.unwrap_err().to_string().contains("expected `,` or `;`"));
    }

    #[test]
    fn error_missing_colon() {
        assert!(gen(quote! { color red }).is_err());
    }

    #[test]
    fn error_bad_value() {
        let result = gen(quote! { color: + });
        assert!(result.unwrap_err().to_string().contains("unexpected token"));
    }
}
