//! Ingestion input produced by the external source parser.
//!
//! A [`ProjectBatch`] holds one document's worth of structural facts. The
//! parser emits `PascalCase` field names (`Project`, `Methods`, `Signature`);
//! the lowercase names are accepted as well.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One project-batch: a document plus the classes, methods and calls found in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBatch {
    /// Project name, unique across the store
    #[serde(alias = "Project")]
    pub project: String,
    /// Absolute document path, unique across the store
    #[serde(alias = "Document")]
    pub document: String,
    /// Fully-qualified class names (`Project.Class`)
    #[serde(alias = "Classes", default)]
    pub classes: Vec<String>,
    /// Methods defined in the document
    #[serde(alias = "Methods", default)]
    pub methods: Vec<MethodInput>,
    /// Call edges found in the document's method bodies
    #[serde(alias = "Calls", default)]
    pub calls: Vec<CallInput>,
}

/// A method definition in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInput {
    /// Signature as emitted by the parser
    #[serde(alias = "Signature")]
    pub signature: String,
    /// Method body text
    #[serde(alias = "Body", default)]
    pub body: String,
    /// First source line (1-based), when the parser reports it
    #[serde(alias = "StartLine", default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    /// Last source line (1-based), when the parser reports it
    #[serde(alias = "EndLine", default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
}

/// A call edge in a batch.
///
/// `callee` may omit the parameter list; it is matched as a signature prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallInput {
    /// Signature of the calling method
    #[serde(alias = "Caller")]
    pub caller: String,
    /// Signature or signature prefix of the called method
    #[serde(alias = "Callee")]
    pub callee: String,
}

impl ProjectBatch {
    /// Start a batch for `document` in `project`.
    #[must_use]
    pub fn new(project: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            document: document.into(),
            ..Self::default()
        }
    }

    /// Add a class name.
    #[must_use]
    pub fn class(mut self, name: impl Into<String>) -> Self {
        self.classes.push(name.into());
        self
    }

    /// Add a method.
    #[must_use]
    pub fn method(mut self, signature: impl Into<String>, body: impl Into<String>) -> Self {
        self.methods.push(MethodInput {
            signature: signature.into(),
            body: body.into(),
            start_line: None,
            end_line: None,
        });
        self
    }

    /// Add a method with its source line span.
    #[must_use]
    pub fn method_spanning(
        mut self,
        signature: impl Into<String>,
        body: impl Into<String>,
        start_line: u32,
        end_line: u32,
    ) -> Self {
        self.methods.push(MethodInput {
            signature: signature.into(),
            body: body.into(),
            start_line: Some(start_line),
            end_line: Some(end_line),
        });
        self
    }

    /// Add a call edge.
    #[must_use]
    pub fn call(mut self, caller: impl Into<String>, callee: impl Into<String>) -> Self {
        self.calls.push(CallInput {
            caller: caller.into(),
            callee: callee.into(),
        });
        self
    }

    /// Reject batches with missing required fields.
    ///
    /// Runs before any store access.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        require("project", &self.project)?;
        require("document", &self.document)?;
        for (i, class) in self.classes.iter().enumerate() {
            require(&format!("classes[{i}]"), class)?;
        }
        for (i, method) in self.methods.iter().enumerate() {
            require(&format!("methods[{i}].signature"), &method.signature)?;
        }
        for (i, call) in self.calls.iter().enumerate() {
            require(&format!("calls[{i}].caller"), &call.caller)?;
            require(&format!("calls[{i}].callee"), &call.callee)?;
        }
        Ok(())
    }
}

/// Fail with a validation error if `value` is empty or whitespace.
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Decode batch JSON: either a single batch object or an array of batches.
///
/// # Errors
///
/// Returns [`Error::Json`] if the text matches neither shape.
pub fn parse_batches(json: &str) -> Result<Vec<ProjectBatch>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<ProjectBatch>),
        One(Box<ProjectBatch>),
    }

    match serde_json::from_str(json)? {
        OneOrMany::Many(batches) => Ok(batches),
        OneOrMany::One(batch) => Ok(vec![*batch]),
    }
}

/// Split a signature into `(class_name, method_name)` at its final dotted segment.
///
/// Dots inside the parameter list or inside generic arguments do not separate
/// segments, so `P.C.Foo(System.String)` splits into `P.C` and
/// `Foo(System.String)`. A leading return type, as the Roslyn parser emits it
/// (`int P.C.Add(int a, int b)`), is dropped: the class is `P.C` and the name
/// `Add(int a, int b)`. Returns `None` when the signature has no class part.
#[must_use]
pub fn split_signature(signature: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut name_start = 0;
    let mut last_dot = None;

    for (i, c) in signature.char_indices() {
        match c {
            // A parenthesis opening the name's parameter list ends the scan;
            // one at the start of a segment is a tuple return type.
            '(' if depth == 0 && i > name_start => break,
            '<' | '[' | '(' => depth += 1,
            '>' | ']' | ')' => depth = depth.saturating_sub(1),
            ' ' if depth == 0 => {
                name_start = i + 1;
                last_dot = None;
            }
            '.' if depth == 0 => last_dot = Some(i),
            _ => {}
        }
    }

    let dot = last_dot?;
    let (class, rest) = (&signature[name_start..dot], &signature[dot + 1..]);
    if class.is_empty() || rest.is_empty() {
        return None;
    }
    Some((class, rest))
}
