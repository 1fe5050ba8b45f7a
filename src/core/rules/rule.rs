//! Rule definitions
//!
//! A [`RuleDef`] is the uncompiled form produced by a rule source (a rule
//! document, or code). [`Rule`] is the compiled, immutable form the matcher
//! owns.

use super::guard::Guard;
use super::pattern::PathPattern;
use crate::error::{RulesError, Result};
use serde::{Deserialize, Serialize};

/// Operation kinds a rule can govern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Get or list documents
    Read,
    /// Create, update, or delete documents
    Write,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Operation {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "read" => Ok(Operation::Read),
            "write" => Ok(Operation::Write),
            _ => Err(RulesError::InvalidOperation(s.to_string())),
        }
    }
}

/// Set of operations governed by a rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Operation>", into = "Vec<Operation>")]
pub struct OperationSet {
    read: bool,
    write: bool,
}

impl OperationSet {
    pub const NONE: OperationSet = OperationSet {
        read: false,
        write: false,
    };
    pub const READ: OperationSet = OperationSet {
        read: true,
        write: false,
    };
    pub const WRITE: OperationSet = OperationSet {
        read: false,
        write: true,
    };
    pub const ALL: OperationSet = OperationSet {
        read: true,
        write: true,
    };

    /// Check if `operation` is in the set
    pub fn contains(&self, operation: Operation) -> bool {
        match operation {
            Operation::Read => self.read,
            Operation::Write => self.write,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.read && !self.write
    }

    pub fn with(mut self, operation: Operation) -> Self {
        match operation {
            Operation::Read => self.read = true,
            Operation::Write => self.write = true,
        }
        self
    }
}

impl From<Operation> for OperationSet {
    fn from(operation: Operation) -> Self {
        OperationSet::NONE.with(operation)
    }
}

impl From<Vec<Operation>> for OperationSet {
    fn from(operations: Vec<Operation>) -> Self {
        operations.into_iter().fold(OperationSet::NONE, OperationSet::with)
    }
}

impl From<OperationSet> for Vec<Operation> {
    fn from(set: OperationSet) -> Self {
        [Operation::Read, Operation::Write]
            .into_iter()
            .filter(|op| set.contains(*op))
            .collect()
    }
}

/// Registration index of a rule within its matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub usize);

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Uncompiled rule definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDef {
    /// Optional name used in logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Pattern text, e.g. `/users/{userId}`
    #[serde(rename = "match")]
    pub pattern: String,

    /// Operations this rule governs
    #[serde(rename = "allow")]
    pub operations: OperationSet,

    /// Condition under which the operations are granted
    pub guard: Guard,
}

impl RuleDef {
    pub fn new(pattern: impl Into<String>, operations: impl Into<OperationSet>, guard: Guard) -> Self {
        RuleDef {
            name: None,
            pattern: pattern.into(),
            operations: operations.into(),
            guard,
        }
    }

    /// Attach a name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Compiled, immutable rule
#[derive(Debug, Clone)]
pub struct Rule {
    id: RuleId,
    name: Option<String>,
    pattern: PathPattern,
    operations: OperationSet,
    guard: Guard,
}

impl Rule {
    /// Compile a definition registered at position `index`
    pub fn compile(index: usize, def: RuleDef) -> Result<Self> {
        let pattern = PathPattern::parse(&def.pattern)?;
        Self::from_parts(index, def.name, pattern, def.operations, def.guard)
    }

    /// Assemble a rule from an already compiled pattern
    ///
    /// # Errors
    ///
    /// - `InvalidRule` if `operations` is empty
    /// - `UnboundVariable` if the guard reads a variable the pattern never binds
    pub fn from_parts(
        index: usize,
        name: Option<String>,
        pattern: PathPattern,
        operations: OperationSet,
        guard: Guard,
    ) -> Result<Self> {
        if operations.is_empty() {
            return Err(RulesError::InvalidRule {
                index,
                reason: "rule governs no operations".to_string(),
            });
        }

        if let Some(unbound) = guard.variables().into_iter().find(|v| !pattern.binds(v)) {
            return Err(RulesError::UnboundVariable {
                variable: unbound.to_string(),
                pattern: pattern.to_string(),
            });
        }

        Ok(Rule {
            id: RuleId(index),
            name,
            pattern,
            operations,
            guard,
        })
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn operations(&self) -> OperationSet {
        self.operations
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    /// Check if this rule governs `operation`
    pub fn governs(&self, operation: Operation) -> bool {
        self.operations.contains(operation)
    }

    /// Label for logs: the name if present, else the pattern
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.pattern.to_string(),
        }
    }
}
