//! Style compiler: turns a nested [`Style`] into an ordered list of CSS rules.
//!
//! The compiler threads a selector list through the recursion:
//!
//! - properties accumulate into declarations for the current selectors;
//! - sub-selectors recurse immediately with the combined selectors, writing
//!   straight into the output (so a nested rule lands before its parent's own
//!   rule, which is only emitted once all of the parent's keys are done);
//! - at-rules recurse with the same selectors and wrap whatever was produced;
//! - a context with no declarations emits nothing.
//!
//! Rules are rendered as `a,b {name: value; name: value;}`.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::css::model::{Style, StyleValue};
use crate::css::properties::declaration;
use crate::css::specificity;
use crate::css::tokenizer::{classify, is_keyframes, ControlKey, KeyKind};

/// Errors from style compilation.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// A value has the wrong shape for its key (primitive vs. nested style).
    #[error("invalid style shape at `{path}`: {message}")]
    InvalidSpecShape { path: String, message: String },
    /// JSON style input could not be parsed.
    #[error("invalid style JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl StyleError {
    pub(crate) fn shape(path: impl Into<String>, message: impl Into<String>) -> Self {
        StyleError::InvalidSpecShape {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Prefix the error path with `key`, for errors raised inside a named entry.
    pub(crate) fn within(self, key: &str) -> Self {
        match self {
            StyleError::InvalidSpecShape { path, message } => StyleError::InvalidSpecShape {
                path: if path.is_empty() {
                    key.to_string()
                } else {
                    format!("{key} / {path}")
                },
                message,
            },
            other => other,
        }
    }
}

type ProcessFn = dyn Fn(&str) -> String + Send + Sync;
type ExtendFn = dyn Fn(&str, &str) -> String + Send + Sync;

/// Compiler configuration.
///
/// Both hooks are optional. Without them, top-level selectors are used as
/// written and every `&` in a nested key is replaced by the enclosing selector.
#[derive(Clone, Default)]
pub struct CompileOptions {
    process: Option<Arc<ProcessFn>>,
    extend: Option<Arc<ExtendFn>>,
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOptions")
            .field("process", &self.process.is_some())
            .field("extend", &self.extend.is_some())
            .finish()
    }
}

impl CompileOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a hook that rewrites each top-level selector of a selector sheet
    /// (builder).
    pub fn with_process(
        mut self,
        process: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.process = Some(Arc::new(process));
        self
    }

    /// Set a hook that combines a `&` template with the enclosing selector
    /// (builder). Called as `extend(template, selector)`.
    pub fn with_extend(
        mut self,
        extend: impl Fn(&str, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.extend = Some(Arc::new(extend));
        self
    }
}

/// The rules and public class name produced for one class style.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledClass {
    /// Space-separated class tokens (base token plus specificity markers).
    pub class_name: String,
    /// Rendered rules, in order.
    pub rules: Vec<String>,
}

/// Compile `style` with `selector` as the enclosing context.
///
/// Control keys are rejected here; use [`compile_class`] for class styles.
pub fn compile(selector: &str, style: &Style) -> Result<Vec<String>, StyleError> {
    compile_with(selector, style, &CompileOptions::default())
}

/// [`compile`] with explicit options.
pub fn compile_with(
    selector: &str,
    style: &Style,
    options: &CompileOptions,
) -> Result<Vec<String>, StyleError> {
    let mut out = Vec::new();
    let mut compiler = Compiler::new(options);
    compiler.render(&[selector.to_string()], style, Scope::Rule, &mut out)?;
    Ok(out)
}

/// Compile a class style for the class token `token`.
///
/// Honors a top-level `specificity: N` control key by adding N marker classes
/// to the rendered selector and to the returned class name.
pub fn compile_class(
    token: &str,
    style: &Style,
    options: &CompileOptions,
) -> Result<CompiledClass, StyleError> {
    let count = specificity_of(style)?;
    let selector = specificity::class_selector(token, count);
    let mut out = Vec::new();
    let mut compiler = Compiler::new(options);
    compiler.render(&[selector], style, Scope::Class, &mut out)?;
    trace!(token, rules = out.len(), specificity = count, "compiled class");
    Ok(CompiledClass {
        class_name: specificity::class_name(token, count),
        rules: out,
    })
}

/// Compile a selector sheet: a style whose top-level keys are selectors
/// (possibly comma-separated) or at-rules wrapping further selectors.
pub fn compile_sheet(sheet: &Style, options: &CompileOptions) -> Result<Vec<String>, StyleError> {
    let mut out = Vec::new();
    let mut compiler = Compiler::new(options);
    compiler.render_sheet(sheet, &mut out)?;
    Ok(out)
}

/// Read the `specificity` control key of a class style.
fn specificity_of(style: &Style) -> Result<usize, StyleError> {
    let key = ControlKey::Specificity.as_str();
    match style.get(key) {
        None => Ok(0),
        Some(StyleValue::Int(n)) if *n >= 0 => match usize::try_from(*n) {
            Ok(count) if count <= specificity::MAX_SPECIFICITY => Ok(count),
            _ => Err(StyleError::shape(
                key,
                format!(
                    "specificity must be at most {}, got {n}",
                    specificity::MAX_SPECIFICITY
                ),
            )),
        },
        Some(other) => Err(StyleError::shape(
            key,
            format!(
                "specificity must be a non-negative integer, got {}",
                other.shape_name()
            ),
        )),
    }
}

/// Where a style body sits, which decides how control keys and the final
/// rule are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Top level of a class style: control keys are allowed.
    Class,
    /// Any other selector context.
    Rule,
    /// A keyframe step: always emits, even with no declarations.
    KeyframeStep,
}

/// Recursive compiler state.
struct Compiler<'o> {
    options: &'o CompileOptions,
    /// Keys from the root to the entry being compiled, for error reporting.
    path: Vec<String>,
}

impl<'o> Compiler<'o> {
    fn new(options: &'o CompileOptions) -> Self {
        Self {
            options,
            path: Vec::new(),
        }
    }

    fn error(&self, message: impl Into<String>) -> StyleError {
        StyleError::shape(self.path.join(" / "), message)
    }

    fn nested<'v>(&self, value: &'v StyleValue) -> Result<&'v Style, StyleError> {
        value.as_style().ok_or_else(|| {
            self.error(format!("expected a nested style, got {}", value.shape_name()))
        })
    }

    fn primitive(&self, value: &StyleValue) -> Result<String, StyleError> {
        value.to_css().ok_or_else(|| {
            self.error(format!(
                "expected a string or number, got {}",
                value.shape_name()
            ))
        })
    }

    fn extend(&self, template: &str, selector: &str) -> String {
        match &self.options.extend {
            Some(extend) => extend(template, selector),
            None => template.replace('&', selector),
        }
    }

    fn process_selector(&self, key: &str) -> Vec<String> {
        key.split(',')
            .map(str::trim)
            .map(|s| match &self.options.process {
                Some(process) => process(s),
                None => s.to_string(),
            })
            .collect()
    }

    /// Render `style` in the context of `selectors`.
    fn render(
        &mut self,
        selectors: &[String],
        style: &Style,
        scope: Scope,
        out: &mut Vec<String>,
    ) -> Result<(), StyleError> {
        let mut local = Vec::new();

        for (key, value) in style.iter() {
            self.path.push(key.to_string());
            match classify(key) {
                KeyKind::Control(control) => {
                    if scope != Scope::Class {
                        return Err(self.error(format!(
                            "control key `{}` is only allowed at the top of a class style",
                            control.as_str()
                        )));
                    }
                }
                KeyKind::Property(name) => {
                    let text = self.primitive(value)?;
                    local.push(declaration(name, &text));
                }
                KeyKind::AtRule { name, prelude } => {
                    self.render_at_rule(name, prelude, Some(selectors), value, out)?;
                }
                KeyKind::Nested(template) => {
                    let body = self.nested(value)?;
                    let combined: Vec<String> =
                        selectors.iter().map(|s| self.extend(template, s)).collect();
                    self.render(&combined, body, Scope::Rule, out)?;
                }
                KeyKind::Suffix(suffix) => {
                    let body = self.nested(value)?;
                    let combined: Vec<String> =
                        selectors.iter().map(|s| format!("{s}{suffix}")).collect();
                    self.render(&combined, body, Scope::Rule, out)?;
                }
            }
            self.path.pop();
        }

        if !local.is_empty() || scope == Scope::KeyframeStep {
            out.push(format!("{} {{{}}}", selectors.join(","), local.join(" ")));
        }
        Ok(())
    }

    /// Render an at-rule. `selectors` is `None` at the top of a selector
    /// sheet, where the body maps selectors (or descriptors) instead of
    /// properties.
    fn render_at_rule(
        &mut self,
        name: &str,
        prelude: &str,
        selectors: Option<&[String]>,
        value: &StyleValue,
        out: &mut Vec<String>,
    ) -> Result<(), StyleError> {
        let body = match value {
            StyleValue::Null => {
                out.push(format!("{prelude};"));
                return Ok(());
            }
            StyleValue::Str(s) if s.is_empty() => {
                out.push(format!("{prelude};"));
                return Ok(());
            }
            StyleValue::Nested(body) => body,
            other => {
                let text = self.primitive(other)?;
                out.push(format!("{prelude} {text};"));
                return Ok(());
            }
        };

        let mut inner = Vec::new();
        let keyframes = is_keyframes(name);
        if keyframes {
            for (step, step_value) in body.iter() {
                self.path.push(step.to_string());
                let step_style = self.nested(step_value)?;
                self.render(&[step.to_string()], step_style, Scope::KeyframeStep, &mut inner)?;
                self.path.pop();
            }
        } else {
            match selectors {
                Some(selectors) => self.render(selectors, body, Scope::Rule, &mut inner)?,
                None => self.render_sheet_body(body, &mut inner)?,
            }
        }

        if !inner.is_empty() || keyframes {
            out.push(format!("{prelude} {{{}}}", inner.join(" ")));
        }
        Ok(())
    }

    /// Render the top level of a selector sheet.
    fn render_sheet(&mut self, sheet: &Style, out: &mut Vec<String>) -> Result<(), StyleError> {
        for (key, value) in sheet.iter() {
            self.path.push(key.to_string());
            match classify(key) {
                KeyKind::AtRule { name, prelude } => {
                    self.render_at_rule(name, prelude, None, value, out)?;
                }
                _ => {
                    let body = self.nested(value)?;
                    let selectors = self.process_selector(key);
                    self.render(&selectors, body, Scope::Rule, out)?;
                }
            }
            self.path.pop();
        }
        Ok(())
    }

    /// Render the body of a top-level at-rule in a selector sheet.
    ///
    /// Primitive entries are descriptors of the at-rule itself (as in
    /// `@font-face`); nested entries are selectors or further at-rules.
    fn render_sheet_body(&mut self, body: &Style, out: &mut Vec<String>) -> Result<(), StyleError> {
        let mut descriptors = Vec::new();
        let mut nested = Style::new();
        for (key, value) in body.iter() {
            if value.is_null() || value.as_style().is_some() {
                nested.insert(key, value.clone());
            } else {
                self.path.push(key.to_string());
                let text = self.primitive(value)?;
                self.path.pop();
                descriptors.push(declaration(key, &text));
            }
        }
        if !descriptors.is_empty() {
            out.push(descriptors.join(" "));
        }
        self.render_sheet(&nested, out)
    }
}
