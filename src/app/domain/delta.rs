//! Insert/retain/delete operations and their composition.

use serde_json::{Map, Value};

/// Attribute name to JSON value, kept in insertion order. The order is
/// significant: renderers wrap content in the order attributes appear.
pub type AttributeMap = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum InsertValue {
    Text(String),
    /// Single-key object naming the embed kind, e.g. `{"image": 0}`.
    Embed(Map<String, Value>),
}

impl InsertValue {
    /// Length in the delta coordinate space: chars for text, 1 for embeds.
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.chars().count(),
            Self::Embed(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Object(object) => Some(Self::Embed(object.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Embed(object) => Value::Object(object.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Insert {
        value: InsertValue,
        attributes: AttributeMap,
    },
    Retain {
        count: usize,
        attributes: AttributeMap,
    },
    Delete {
        count: usize,
    },
}

impl Operation {
    pub fn insert(text: impl Into<String>) -> Self {
        Self::insert_with(text, AttributeMap::new())
    }

    pub fn insert_with(text: impl Into<String>, attributes: AttributeMap) -> Self {
        Self::Insert {
            value: InsertValue::Text(text.into()),
            attributes,
        }
    }

    pub fn embed(kind: &str, value: Value) -> Self {
        let mut object = Map::new();
        object.insert(kind.to_string(), value);
        Self::Insert {
            value: InsertValue::Embed(object),
            attributes: AttributeMap::new(),
        }
    }

    pub fn retain(count: usize) -> Self {
        Self::retain_with(count, AttributeMap::new())
    }

    pub fn retain_with(count: usize, attributes: AttributeMap) -> Self {
        Self::Retain { count, attributes }
    }

    pub fn delete(count: usize) -> Self {
        Self::Delete { count }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Insert { value, .. } => value.len(),
            Self::Retain { count, .. } | Self::Delete { count } => *count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn attributes(&self) -> Option<&AttributeMap> {
        match self {
            Self::Insert { attributes, .. } | Self::Retain { attributes, .. } => Some(attributes),
            Self::Delete { .. } => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Retain { .. } => "retain",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Merge `op` into `target` when both describe the same kind of run.
fn try_merge(target: &mut Operation, op: &Operation) -> bool {
    match (target, op) {
        (Operation::Delete { count }, Operation::Delete { count: more }) => {
            *count += more;
            true
        }
        (
            Operation::Retain { count, attributes },
            Operation::Retain {
                count: more,
                attributes: other,
            },
        ) if attributes == other => {
            *count += more;
            true
        }
        (
            Operation::Insert {
                value: InsertValue::Text(text),
                attributes,
            },
            Operation::Insert {
                value: InsertValue::Text(more),
                attributes: other,
            },
        ) if attributes == other => {
            text.push_str(more);
            true
        }
        _ => false,
    }
}

/// Overlay `other` on `base`. Keys keep `base`'s position; new keys append.
/// A `null` in `other` removes the key unless `keep_null` is set.
pub fn compose_attributes(base: &AttributeMap, other: &AttributeMap, keep_null: bool) -> AttributeMap {
    let mut attributes = base.clone();
    for (key, value) in other {
        if value.is_null() && !keep_null {
            attributes.retain(|existing, _| existing != key);
        } else {
            attributes.insert(key.clone(), value.clone());
        }
    }
    attributes
}

fn char_slice(text: &str, start: usize, len: usize) -> String {
    text.chars().skip(start).take(len).collect()
}

/// Walks a list of operations, handing out whole or partial ops.
struct OpIter<'a> {
    ops: &'a [Operation],
    index: usize,
    offset: usize,
}

impl<'a> OpIter<'a> {
    fn new(ops: &'a [Operation]) -> Self {
        Self {
            ops,
            index: 0,
            offset: 0,
        }
    }

    fn has_next(&self) -> bool {
        self.index < self.ops.len()
    }

    fn peek(&self) -> Option<&'a Operation> {
        self.ops.get(self.index)
    }

    fn peek_len(&self) -> usize {
        self.peek().map_or(usize::MAX, |op| op.len() - self.offset)
    }

    fn peek_is_insert(&self) -> bool {
        matches!(self.peek(), Some(Operation::Insert { .. }))
    }

    fn peek_is_delete(&self) -> bool {
        matches!(self.peek(), Some(Operation::Delete { .. }))
    }

    /// Takes up to `len` from the current op. Past the end the iterator
    /// yields an unbounded plain retain.
    fn next(&mut self, len: usize) -> Operation {
        let Some(op) = self.peek() else {
            return Operation::retain(usize::MAX);
        };
        let offset = self.offset;
        let remaining = op.len() - offset;
        if len == 0 && remaining > 0 {
            return match op {
                Operation::Delete { .. } => Operation::delete(0),
                Operation::Retain { attributes, .. } => Operation::retain_with(0, attributes.clone()),
                Operation::Insert { attributes, .. } => Operation::insert_with("", attributes.clone()),
            };
        }
        let take = len.min(remaining);
        if take == remaining {
            self.index += 1;
            self.offset = 0;
        } else {
            self.offset += take;
        }
        match op {
            Operation::Delete { .. } => Operation::delete(take),
            Operation::Retain { attributes, .. } => Operation::retain_with(take, attributes.clone()),
            Operation::Insert {
                value: InsertValue::Text(text),
                attributes,
            } => Operation::insert_with(char_slice(text, offset, take), attributes.clone()),
            Operation::Insert { value, attributes } => Operation::Insert {
                value: value.clone(),
                attributes: attributes.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    ops: Vec<Operation>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps `ops` as-is, without normalising.
    pub fn from_ops(ops: Vec<Operation>) -> Self {
        Self { ops }
    }

    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<Operation> {
        self.ops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.ops.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Sum of operation lengths.
    pub fn length(&self) -> usize {
        self.ops.iter().map(Operation::len).sum()
    }

    /// Appends `op` in canonical form: zero-length ops vanish, compatible
    /// neighbours merge and an insert never follows a delete.
    pub fn push(&mut self, op: Operation) -> &mut Self {
        if op.is_empty() {
            return self;
        }
        let mut index = self.ops.len();
        if matches!(op, Operation::Insert { .. })
            && matches!(self.ops.last(), Some(Operation::Delete { .. }))
        {
            index -= 1;
        }
        if index > 0 && try_merge(&mut self.ops[index - 1], &op) {
            return self;
        }
        self.ops.insert(index, op);
        self
    }

    /// Drops a trailing plain retain, which has no effect.
    pub fn chop(mut self) -> Self {
        if let Some(Operation::Retain { attributes, .. }) = self.ops.last() {
            if attributes.is_empty() {
                self.ops.pop();
            }
        }
        self
    }

    /// The delta equivalent to applying `self` and then `other`.
    pub fn compose(&self, other: &Delta) -> Delta {
        let mut this_iter = OpIter::new(&self.ops);
        let mut other_iter = OpIter::new(&other.ops);
        let mut result = Delta::new();

        while this_iter.has_next() || other_iter.has_next() {
            if other_iter.peek_is_insert() {
                result.push(other_iter.next(usize::MAX));
                continue;
            }
            if this_iter.peek_is_delete() {
                result.push(this_iter.next(usize::MAX));
                continue;
            }

            let len = this_iter.peek_len().min(other_iter.peek_len());
            let this_op = this_iter.next(len);
            let other_op = other_iter.next(len);
            match (this_op, other_op) {
                (
                    Operation::Retain { attributes, .. },
                    Operation::Retain {
                        attributes: other, ..
                    },
                ) => {
                    result.push(Operation::retain_with(
                        len,
                        compose_attributes(&attributes, &other, true),
                    ));
                }
                (
                    Operation::Insert { value, attributes },
                    Operation::Retain {
                        attributes: other, ..
                    },
                ) => {
                    result.push(Operation::Insert {
                        value,
                        attributes: compose_attributes(&attributes, &other, false),
                    });
                }
                (Operation::Retain { .. }, delete @ Operation::Delete { .. }) => {
                    result.push(delete);
                }
                // Deleting freshly inserted content cancels out.
                _ => {}
            }
        }

        result.chop()
    }

    /// Plain text of all text inserts; embeds are skipped.
    pub fn text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Operation::Insert {
                    value: InsertValue::Text(text),
                    ..
                } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl From<Vec<Operation>> for Delta {
    fn from(ops: Vec<Operation>) -> Self {
        Self::from_ops(ops)
    }
}

impl<'a> IntoIterator for &'a Delta {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
