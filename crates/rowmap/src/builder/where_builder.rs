//! Shared condition list for WHERE and HAVING clauses.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;

/// How a condition attaches to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            Conjunction::And => " and ",
            Conjunction::Or => " or ",
        }
    }
}

/// One caller-supplied fragment with the arguments for its `?` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub conjunction: Conjunction,
    pub text: String,
    pub args: Vec<Value>,
}

/// Ordered condition list.
///
/// The first condition renders bare and each later one is prefixed by its own
/// conjunction, so `a, or b, and c` reads `a or b and c` and the database's
/// precedence applies exactly as written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereBuilder {
    conditions: Vec<Condition>,
    /// Build error (reported when the statement is rendered)
    build_error: Option<String>,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn build_error(&self) -> Option<&str> {
        self.build_error.as_deref()
    }

    pub fn push(&mut self, conjunction: Conjunction, text: &str, args: Vec<Value>) {
        if let Err(e) = check_placeholders(text, args.len()) {
            self.build_error.get_or_insert(e);
        }
        self.conditions.push(Condition {
            conjunction,
            text: text.to_string(),
            args,
        });
    }

    pub fn and(&mut self, text: &str, args: Vec<Value>) {
        self.push(Conjunction::And, text, args);
    }

    pub fn or(&mut self, text: &str, args: Vec<Value>) {
        self.push(Conjunction::Or, text, args);
    }

    pub fn validate(&self) -> OrmResult<()> {
        match &self.build_error {
            Some(e) => Err(OrmError::validation(e.clone())),
            None => Ok(()),
        }
    }
}

/// Count `?` placeholders outside quoted literals and identifiers.
pub(crate) fn count_placeholders(text: &str) -> usize {
    let mut quote: Option<char> = None;
    let mut found = 0;
    for ch in text.chars() {
        match (quote, ch) {
            (None, '\'' | '"') => quote = Some(ch),
            (Some(q), c) if c == q => quote = None,
            (None, '?') => found += 1,
            _ => {}
        }
    }
    found
}

/// Check that `text` carries one `?` per argument.
pub(crate) fn check_placeholders(text: &str, args: usize) -> Result<(), String> {
    let found = count_placeholders(text);
    if found == args {
        Ok(())
    } else {
        Err(format!(
            "`{text}` has {found} placeholder(s) but {args} argument(s) were given"
        ))
    }
}
