use super::assets::{FontTable, ImageTable};
use super::delta::{Delta, Operation};
use super::theme::{Theme, ThemeKey, ThemeValue};
use crate::app::infrastructure::error::DocumentError;

/// Selection a history entry applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionRange {
    pub index: usize,
    pub length: usize,
}

impl SelectionRange {
    pub fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackItem {
    pub range: SelectionRange,
    pub delta: Delta,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    pub undo: Vec<StackItem>,
    pub redo: Vec<StackItem>,
}

impl History {
    pub fn is_empty(&self) -> bool {
        self.undo.is_empty() && self.redo.is_empty()
    }
}

/// What a fresh editing surface needs to show a document.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub operations: Delta,
    pub theme: Theme,
    pub images: ImageTable,
    pub fonts: FontTable,
}

/// The aggregate a single editing session owns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Display title. Not persisted in the `.vox` body.
    pub title: Option<String>,
    pub operations: Delta,
    pub theme: Theme,
    pub images: ImageTable,
    pub fonts: FontTable,
    pub history: History,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// No content, no theme overrides, no assets. History does not count.
    pub fn is_blank(&self) -> bool {
        self.operations.is_empty()
            && self.theme.is_empty()
            && self.images.is_empty()
            && self.fonts.is_empty()
    }

    /// Appends operations, rejecting the whole batch if any is zero length.
    pub fn append(&mut self, ops: impl IntoIterator<Item = Operation>) -> Result<&mut Self, DocumentError> {
        let ops: Vec<Operation> = ops.into_iter().collect();
        if let Some(index) = ops.iter().position(Operation::is_empty) {
            return Err(DocumentError::EmptyOperation { index });
        }
        for op in ops {
            self.operations.push(op);
        }
        Ok(self)
    }

    /// Replaces content and history with what the editing surface reports.
    pub fn apply_snapshot(&mut self, operations: Delta, history: History) -> Result<(), DocumentError> {
        if let Some(index) = operations.iter().position(Operation::is_empty) {
            return Err(DocumentError::EmptyOperation { index });
        }
        self.operations = operations;
        self.history = history;
        Ok(())
    }

    /// Composes `change` into the content and records it as an undo step.
    /// A change containing a zero-length operation is rejected untouched.
    pub fn apply_change(&mut self, change: Delta, range: SelectionRange) -> Result<(), DocumentError> {
        if let Some(index) = change.iter().position(Operation::is_empty) {
            return Err(DocumentError::EmptyOperation { index });
        }
        self.operations = self.operations.compose(&change);
        self.history.undo.push(StackItem {
            range,
            delta: change,
        });
        self.history.redo.clear();
        Ok(())
    }

    pub fn set_theme(&mut self, key: ThemeKey, value: ThemeValue) -> Result<(), DocumentError> {
        self.theme.set(key, value)?;
        Ok(())
    }

    pub fn clear_theme(&mut self, key: ThemeKey) -> Option<ThemeValue> {
        self.theme.remove(key)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            operations: self.operations.clone(),
            theme: self.theme.clone(),
            images: self.images.clone(),
            fonts: self.fonts.clone(),
        }
    }
}
