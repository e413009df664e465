//! The context stack a template renders against.

use crate::value::Adapter;

/// The chain of adapters currently in scope, innermost last. Sections push
/// a frame before rendering their children and pop it on the way out;
/// dotted-path lookups walk the stack top-to-bottom for their first
/// component only.
pub struct Stack<'a> {
    frames: Vec<&'a dyn Adapter>,
}

impl<'a> Stack<'a> {
    pub fn new(root: &'a dyn Adapter) -> Self {
        Stack { frames: vec![root] }
    }

    pub fn push(&mut self, adapter: &'a dyn Adapter) {
        self.frames.push(adapter);
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// The innermost adapter, what a bare `.` path resolves to.
    pub fn top(&self) -> &'a dyn Adapter {
        *self.frames.last().expect("stack always has a root frame")
    }

    /// Walks frames from innermost to outermost, returning the first one
    /// whose `get_field(name)` finds something. This is the ancestor
    /// fallback used for an unqualified or leading dotted-path name.
    pub fn lookup_first(&self, name: &str) -> Option<&'a dyn Adapter> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get_field(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::collections::BTreeMap;

    fn object(pairs: &[(&str, Value)]) -> Value {
        let mut fields = BTreeMap::new();
        for (key, value) in pairs {
            fields.insert(String::from(*key), match value {
                Value::Text(s) => Value::Text(s.clone()),
                Value::Integer(i) => Value::Integer(*i),
                _ => Value::Null,
            });
        }
        Value::Object(fields)
    }

    #[test]
    fn top_is_root_before_any_push() {
        let root = object(&[("name", Value::text("Chris"))]);
        let stack = Stack::new(&root);
        assert!(stack.top().get_field("name").is_some());
    }

    #[test]
    fn lookup_first_prefers_innermost_frame() {
        let root = object(&[("a", Value::Integer(1))]);
        let inner = object(&[("a", Value::Integer(2))]);
        let mut stack = Stack::new(&root);
        stack.push(&inner);
        let found = stack.lookup_first("a").expect("present in inner frame");
        assert!(found.truthy());
    }

    #[test]
    fn lookup_first_falls_back_to_parent() {
        let root = object(&[("a", Value::Integer(1))]);
        let inner = object(&[("b", Value::Integer(2))]);
        let mut stack = Stack::new(&root);
        stack.push(&inner);
        assert!(stack.lookup_first("a").is_some());
        assert!(stack.lookup_first("missing").is_none());
    }

    #[test]
    fn pop_restores_previous_frame() {
        let root = object(&[("a", Value::Integer(1))]);
        let inner = object(&[("b", Value::Integer(2))]);
        let mut stack = Stack::new(&root);
        stack.push(&inner);
        stack.pop();
        assert!(stack.lookup_first("a").is_some());
        assert!(stack.lookup_first("b").is_none());
    }
}
