//! Evaluation context.

/// Settings shared by every node of one evaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalContext {
    pkg_path: String,
}

impl EvalContext {
    /// Context for an expression written inside package `pkg_path`.
    pub fn new(pkg_path: impl Into<String>) -> Self {
        EvalContext {
            pkg_path: pkg_path.into(),
        }
    }

    pub fn builder() -> EvalContextBuilder {
        EvalContextBuilder::new()
    }

    /// Package the expression is written in.
    ///
    /// Struct types built by the expression belong to this package, and
    /// unexported fields are visible only when their package matches it.
    pub fn pkg_path(&self) -> &str {
        &self.pkg_path
    }
}

/// Builder for [`EvalContext`].
#[derive(Clone, Debug, Default)]
pub struct EvalContextBuilder {
    pkg_path: Option<String>,
}

impl EvalContextBuilder {
    pub fn new() -> Self {
        EvalContextBuilder::default()
    }

    #[must_use]
    pub fn pkg_path(mut self, pkg_path: impl Into<String>) -> Self {
        self.pkg_path = Some(pkg_path.into());
        self
    }

    pub fn build(self) -> EvalContext {
        EvalContext {
            pkg_path: self.pkg_path.unwrap_or_default(),
        }
    }
}
