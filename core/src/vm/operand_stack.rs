//! Scoped operand stack.
//!
//! Grammar productions nest, and every production shares one operand stack
//! for the whole walk. Bracketed constructs (parameter arrays, dictionaries,
//! scalar-pair sequences, recorder column lists) open a scope on entry: the
//! current operands are suspended on the save-stack and the construct
//! accumulates into a fresh, empty stack. Closing the scope hands back exactly
//! what was pushed inside it and resumes the suspended operands untouched.
//!
//! ```
//! use slat_core::{Value, vm::OperandStack};
//!
//! let mut stack = OperandStack::new(8);
//! stack.push(Value::Integer(1));
//! stack.open_scope().unwrap();
//! stack.push(Value::Integer(2));
//! stack.push(Value::Integer(3));
//! assert_eq!(stack.close_scope().unwrap(), vec![Value::Integer(2), Value::Integer(3)]);
//! assert_eq!(stack.operands(), &[Value::Integer(1)]);
//! ```

use thiserror::Error;

use crate::{Value, vm::Stack};

/// Misuse of the operand stack.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("operand stack underflow")]
    Underflow,

    #[error("no open scope to close")]
    ScopeUnderflow,

    #[error("scope depth {depth} exceeds maximum of {max_depth}")]
    ScopeOverflow { depth: usize, max_depth: usize },
}

/// What was left behind when the stack was reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Residue {
    /// Operands on the current stack, bottom to top.
    pub operands: Vec<Value>,
    /// Suspended stacks, outermost first.
    pub scopes: Vec<Vec<Value>>,
}

impl Residue {
    pub fn is_empty(&self) -> bool {
        self.operands.is_empty() && self.scopes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct OperandStack {
    current: Stack<Value>,
    saved: Vec<Stack<Value>>,
    max_scope_depth: usize,
}

impl OperandStack {
    pub fn new(max_scope_depth: usize) -> Self {
        Self {
            current: Stack::new(),
            saved: Vec::new(),
            max_scope_depth,
        }
    }

    pub fn push(&mut self, value: Value) {
        self.current.push(value);
    }

    pub fn pop(&mut self) -> Result<Value, StackError> {
        self.current.pop().ok_or(StackError::Underflow)
    }

    pub fn peek(&self) -> Option<&Value> {
        self.current.peek()
    }

    /// Suspend the current operands and start an empty stack.
    pub fn open_scope(&mut self) -> Result<(), StackError> {
        if self.saved.len() >= self.max_scope_depth {
            return Err(StackError::ScopeOverflow {
                depth: self.saved.len() + 1,
                max_depth: self.max_scope_depth,
            });
        }
        let suspended = core::mem::take(&mut self.current);
        self.saved.push(suspended);
        Ok(())
    }

    /// Drain the innermost scope and resume the stack it suspended.
    ///
    /// The returned values are in push order.
    pub fn close_scope(&mut self) -> Result<Vec<Value>, StackError> {
        let resumed = self.saved.pop().ok_or(StackError::ScopeUnderflow)?;
        let inner = core::mem::replace(&mut self.current, resumed);
        Ok(inner.into_vec())
    }

    /// Operands of the current scope, bottom to top.
    pub fn operands(&self) -> &[Value] {
        self.current.as_slice()
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Number of suspended scopes.
    pub fn scope_depth(&self) -> usize {
        self.saved.len()
    }

    /// True when there are no operands and no open scopes.
    pub fn is_clear(&self) -> bool {
        self.current.is_empty() && self.saved.is_empty()
    }

    /// Empty both stacks, returning whatever they held.
    pub fn reset(&mut self) -> Residue {
        let operands = core::mem::take(&mut self.current).into_vec();
        let scopes = self
            .saved
            .drain(..)
            .map(Stack::into_vec)
            .collect();
        Residue { operands, scopes }
    }
}

impl Default for OperandStack {
    fn default() -> Self {
        Self::new(crate::api::EvaluatorOptions::default().max_scope_depth)
    }
}
