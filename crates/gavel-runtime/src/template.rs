//! Prompt templates with `{query}` / `{answer}` / `{context}` substitution.
//!
//! Templates are parsed once at config load so that a bad placeholder is
//! a startup error, never a per-request one. `{{` and `}}` escape
//! literal braces (judge prompts contain JSON examples).

use gavel_core::types::EvaluationContext;
use thiserror::Error;

/// Errors from template parsing.
#[derive(Error, Debug, PartialEq)]
pub enum TemplateError {
    #[error("unknown placeholder {{{0}}} (expected query, answer, or context)")]
    UnknownPlaceholder(String),

    #[error("unterminated placeholder starting at byte {0}")]
    Unterminated(usize),
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Query,
    Answer,
    Context,
}

/// A parsed prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse and validate a template string.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((index, c)) = chars.next() {
            match c {
                '{' => {
                    if let Some((_, '{')) = chars.peek() {
                        chars.next();
                        literal.push('{');
                        continue;
                    }

                    let mut name = String::new();
                    let mut closed = false;
                    for (_, inner) in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        name.push(inner);
                    }
                    if !closed {
                        return Err(TemplateError::Unterminated(index));
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(match name.as_str() {
                        "query" => Segment::Query,
                        "answer" => Segment::Answer,
                        "context" => Segment::Context,
                        _ => return Err(TemplateError::UnknownPlaceholder(name)),
                    });
                }
                '}' => {
                    if let Some((_, '}')) = chars.peek() {
                        chars.next();
                    }
                    literal.push('}');
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Substitute the context's fields into the template.
    pub fn render(&self, ctx: &EvaluationContext) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Query => out.push_str(&ctx.query),
                Segment::Answer => out.push_str(&ctx.answer),
                Segment::Context => out.push_str(&ctx.context),
            }
        }
        out
    }
}
