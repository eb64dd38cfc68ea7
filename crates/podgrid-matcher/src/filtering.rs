//! Ordered predicate reduction with a diagnostic trail.

use std::fmt::Write;

/// A working collection narrowed stage by stage.
///
/// Each stage keeps the elements its predicate accepts and appends the
/// surviving count to the trail, e.g.
/// `available: 5 -> achievable: 4 -> status: 3`.
#[derive(Debug, Clone)]
pub struct FilteringCollection<T> {
    items: Vec<T>,
    trail: String,
}

impl<T> FilteringCollection<T> {
    pub fn new(items: Vec<T>) -> Self {
        let trail = format!("available: {}", items.len());
        Self { items, trail }
    }

    /// Apply an infallible stage.
    pub fn filter(&mut self, stage: &str, mut predicate: impl FnMut(&T) -> bool) -> &mut Self {
        self.items.retain(|item| predicate(item));
        self.record(stage);
        self
    }

    /// Apply a stage whose predicate may fail. The first error aborts the
    /// stage and leaves the collection as it was before it.
    pub fn try_filter<E>(
        &mut self,
        stage: &str,
        mut predicate: impl FnMut(&T) -> Result<bool, E>,
    ) -> Result<&mut Self, E> {
        let mut keep = Vec::with_capacity(self.items.len());
        for item in &self.items {
            keep.push(predicate(item)?);
        }
        let mut flags = keep.into_iter();
        self.items.retain(|_| flags.next().unwrap_or(false));
        self.record(stage);
        Ok(self)
    }

    fn record(&mut self, stage: &str) {
        let _ = write!(self.trail, " -> {stage}: {}", self.items.len());
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn trail(&self) -> &str {
        &self.trail
    }
}
