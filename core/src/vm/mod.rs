mod operand_stack;
mod stack;

pub use operand_stack::{OperandStack, Residue, StackError};
pub use stack::Stack;
