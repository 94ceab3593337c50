//! System/user prompt pairs built from assembled context.

use std::fmt::Write as _;

use serde::Serialize;

use crate::context::{RelatedContext, UsageContext};

const DOCSTRING_SYSTEM: &str = "\
You document C# methods. Write an XML documentation comment for the method \
you are given, accurate enough that a newcomer could safely modify it. \
Output only the comment.";

const EXPLAIN_SYSTEM: &str = "\
You explain C# code. Describe what the given method does, step by step, \
for a developer who has not seen the codebase before.";

const RELATED_SYSTEM: &str = "\
You explain how a C# method is used. Given the method and the methods that \
call it, summarise each call site and what it relies on.";

/// The text pair handed to a [`Generator`](super::Generator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptPair {
    /// Instructions for the model
    pub system: String,
    /// The method and its context
    pub user: String,
}

impl PromptPair {
    /// Prompt for a documentation comment.
    ///
    /// When the method calls nothing, the user prompt is the method alone.
    #[must_use]
    pub fn docstring(context: &UsageContext) -> Self {
        Self {
            system: DOCSTRING_SYSTEM.to_string(),
            user: with_used_methods(context),
        }
    }

    /// Prompt for a plain-language explanation.
    #[must_use]
    pub fn explain(context: &UsageContext) -> Self {
        Self {
            system: EXPLAIN_SYSTEM.to_string(),
            user: with_used_methods(context),
        }
    }

    /// Prompt describing where a method is used.
    #[must_use]
    pub fn related_usage(context: &RelatedContext) -> Self {
        let mut user = context.method.method.clone();
        if context.related.is_empty() {
            user.push_str("\n\nNo other indexed method calls this method.");
        } else {
            user.push_str("\n\nIt is called from:");
            for usage in &context.related {
                let (path, body) = (&usage.document_path, &usage.method_body);
                let _ = write!(user, "\n\n// {path}\n{body}");
            }
        }
        Self {
            system: RELATED_SYSTEM.to_string(),
            user,
        }
    }
}

fn with_used_methods(context: &UsageContext) -> String {
    let mut user = context.method.method.clone();
    if context.has_used_methods() {
        user.push_str("\n\nMethods it uses:\n");
        user.push_str(&context.auxiliary);
    }
    user
}
