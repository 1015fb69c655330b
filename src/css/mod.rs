//! Style compilation: model, key lexer, property normalization, compiler.

pub mod compiler;
pub mod json;
pub mod model;
pub mod properties;
pub mod specificity;
pub mod tokenizer;
