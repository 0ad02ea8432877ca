/// A LIFO stack with a pre-sized backing vector.
///
/// Used by the evaluator for operand storage during a command. Values are
/// pushed and popped at the tail only.
///
/// # Examples
///
/// ```
/// use slat_core::vm::Stack;
///
/// let mut stack = Stack::new();
/// stack.push(42);
/// stack.push(17);
/// assert_eq!(stack.pop(), Some(17));
/// assert_eq!(stack.peek(), Some(&42));
/// assert_eq!(stack.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Stack<T> {
    /// Reasonable default so short commands never reallocate.
    const INITIAL_CAPACITY: usize = 16;

    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(Self::INITIAL_CAPACITY),
        }
    }

    /// Pushes a value onto the stack.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    /// Removes and returns the top value from the stack.
    ///
    /// Returns `None` if the stack is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Returns a reference to the top value without removing it.
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the stack contents from bottom to top.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Consumes the stack, returning its contents in push order.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}
