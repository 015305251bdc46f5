//! Shared selection state for the two linked charts.
//!
//! Every interaction, whichever chart it comes from, replaces the selection
//! with exactly the rows it carries. There is no merging: the last accepted
//! event wins.

use std::collections::BTreeSet;

use crate::error::SelectionError;

// ---------------------------------------------------------------------------
// SelectionSet
// ---------------------------------------------------------------------------

/// Ordered, de-duplicated set of selected row indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet(BTreeSet<usize>);

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Indices in ascending order.
    pub fn to_vec(&self) -> Vec<usize> {
        self.0.iter().copied().collect()
    }
}

impl FromIterator<usize> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        SelectionSet(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Chart an interaction originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Scatter,
    Parcats,
}

/// A user interaction, tagged by origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent {
    /// Click on a category or ribbon of the parallel-categories diagram.
    Click { row_indices: Vec<usize> },
    /// Lasso (or box) selection on the scatter plot. Empty means deselect.
    LassoSelect { row_indices: Vec<usize> },
}

impl InteractionEvent {
    pub fn row_indices(&self) -> &[usize] {
        match self {
            InteractionEvent::Click { row_indices }
            | InteractionEvent::LassoSelect { row_indices } => row_indices,
        }
    }

    pub fn origin(&self) -> ChartKind {
        match self {
            InteractionEvent::Click { .. } => ChartKind::Parcats,
            InteractionEvent::LassoSelect { .. } => ChartKind::Scatter,
        }
    }
}

// ---------------------------------------------------------------------------
// Synchronizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// Nothing selected; charts show their baseline styling.
    Idle,
    /// At least one row selected.
    Active,
}

/// Owns one session's [`SelectionSet`] and is the only thing that writes it.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    table_len: usize,
    selection: SelectionSet,
}

impl Synchronizer {
    pub fn new(table_len: usize) -> Self {
        Self {
            table_len,
            selection: SelectionSet::new(),
        }
    }

    /// Replace the selection with the rows carried by `event`.
    ///
    /// Rejects the whole event if any index is out of range; the previous
    /// selection is then kept as is.
    pub fn apply(&mut self, event: &InteractionEvent) -> Result<SelectionState, SelectionError> {
        if let Some(&index) = event
            .row_indices()
            .iter()
            .find(|&&i| i >= self.table_len)
        {
            return Err(SelectionError::InvalidSelection {
                index,
                len: self.table_len,
            });
        }

        self.selection = event.row_indices().iter().copied().collect();
        log::debug!(
            "{:?} event selected {} of {} rows",
            event.origin(),
            self.selection.len(),
            self.table_len
        );
        Ok(self.state())
    }

    /// Drop the selection (back to Idle).
    pub fn clear(&mut self) {
        self.selection = SelectionSet::new();
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn state(&self) -> SelectionState {
        if self.selection.is_empty() {
            SelectionState::Idle
        } else {
            SelectionState::Active
        }
    }
}
