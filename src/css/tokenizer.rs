//! logos-based style key lexer and the per-key classification step.
//!
//! Every key of a [`Style`](crate::css::model::Style) is classified exactly
//! once into a [`KeyKind`]:
//!
//! - `@media ...`, `@keyframes spin` → [`KeyKind::AtRule`]
//! - any key containing `&` → [`KeyKind::Nested`] (the `&` stands for the
//!   enclosing selector)
//! - `specificity` → [`KeyKind::Control`]
//! - a single identifier (`color`, `backgroundColor`, `-webkit-mask`,
//!   `color_2`, `--accent`) → [`KeyKind::Property`]
//! - anything else (`:hover`, `::before`, ` > li`, `.active`) →
//!   [`KeyKind::Suffix`], appended to the enclosing selector
//!
//! Token priority follows logos rules: longest match wins, so `@media` is an
//! [`KeyToken::AtKeyword`] and never `@` followed by an identifier.

use logos::Logos;

/// Token produced by the key lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum KeyToken {
    /// At-keyword: `@media`, `@-webkit-keyframes`.
    #[regex(r"@-?[a-zA-Z][a-zA-Z0-9-]*")]
    AtKeyword,

    /// Nesting marker `&`.
    #[token("&")]
    Nest,

    /// Identifier: property names, possibly vendor-prefixed or custom (`--x`).
    #[regex(r"-{0,2}[a-zA-Z][a-zA-Z0-9_-]*")]
    Ident,
}

/// Control keys: consumed by the compiler, never rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    /// Number of redundant marker classes to add to a class selector.
    Specificity,
}

impl ControlKey {
    /// The key text that selects this control.
    pub fn as_str(self) -> &'static str {
        match self {
            ControlKey::Specificity => "specificity",
        }
    }
}

/// The classification of one style key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind<'a> {
    /// A CSS property (not yet normalized).
    Property(&'a str),
    /// A sub-selector template containing `&`.
    Nested(&'a str),
    /// A sub-selector appended directly to the enclosing selector.
    Suffix(&'a str),
    /// An at-rule. `name` is the keyword without `@`; `prelude` is the full key.
    AtRule { name: &'a str, prelude: &'a str },
    /// A control key.
    Control(ControlKey),
}

/// Classify a style key.
pub fn classify(key: &str) -> KeyKind<'_> {
    let mut lexer = KeyToken::lexer(key);
    let first = lexer.next();
    let first_span = lexer.span();

    if first == Some(Ok(KeyToken::AtKeyword)) {
        return KeyKind::AtRule {
            name: &key[first_span.start + 1..first_span.end],
            prelude: key,
        };
    }

    let mut nested = first == Some(Ok(KeyToken::Nest));
    let mut single = first.is_some();
    for token in lexer.by_ref() {
        single = false;
        if token == Ok(KeyToken::Nest) {
            nested = true;
        }
    }

    if nested {
        return KeyKind::Nested(key);
    }

    let whole_key = first_span.start == 0 && first_span.end == key.len();
    if single && whole_key && first == Some(Ok(KeyToken::Ident)) {
        if key == ControlKey::Specificity.as_str() {
            return KeyKind::Control(ControlKey::Specificity);
        }
        return KeyKind::Property(key);
    }

    KeyKind::Suffix(key)
}

/// Returns `true` if the at-rule `name` introduces keyframe steps.
pub fn is_keyframes(name: &str) -> bool {
    name.ends_with("keyframes")
}
