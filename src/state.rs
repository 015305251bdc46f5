use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use uuid::Uuid;

use crate::chart::{build_figure, ChartStyle, FigureSpec};
use crate::data::model::Table;
use crate::error::SelectionError;
use crate::selection::{InteractionEvent, SelectionSet, SelectionState, Synchronizer};

// ---------------------------------------------------------------------------
// Session: one viewer's dashboard state
// ---------------------------------------------------------------------------

/// Session-scoped context: shared read-only table, this viewer's own
/// selection, and the figure derived from both.
pub struct Session {
    table: Arc<Table>,
    style: ChartStyle,
    sync: Synchronizer,
    /// Always `build_figure(table, sync.selection(), style)`.
    figure: FigureSpec,
}

impl Session {
    pub fn new(table: Arc<Table>, style: ChartStyle) -> Self {
        let sync = Synchronizer::new(table.len());
        let figure = build_figure(&table, sync.selection(), &style);
        Self {
            table,
            style,
            sync,
            figure,
        }
    }

    /// Apply an interaction and rebuild both charts. On error nothing
    /// changes and the previous figure stays current.
    pub fn handle(&mut self, event: &InteractionEvent) -> Result<&FigureSpec, SelectionError> {
        match self.sync.apply(event) {
            Ok(_) => {
                self.rebuild();
                Ok(&self.figure)
            }
            Err(e) => {
                log::warn!("Ignoring {:?} event: {e}", event.origin());
                Err(e)
            }
        }
    }

    /// Drop the selection.
    pub fn clear(&mut self) -> &FigureSpec {
        self.sync.clear();
        self.rebuild();
        &self.figure
    }

    fn rebuild(&mut self) {
        self.figure = build_figure(&self.table, self.sync.selection(), &self.style);
    }

    pub fn figure(&self) -> &FigureSpec {
        &self.figure
    }

    pub fn selection(&self) -> &SelectionSet {
        self.sync.selection()
    }

    pub fn state(&self) -> SelectionState {
        self.sync.state()
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }
}

// ---------------------------------------------------------------------------
// SessionRegistry: sessions of the HTTP surface
// ---------------------------------------------------------------------------

/// Live sessions keyed by id. Every page load opens a fresh one; the least
/// recently used is dropped once `max_sessions` is reached.
pub struct SessionRegistry {
    table: Arc<Table>,
    style: ChartStyle,
    sessions: HashMap<Uuid, Session>,
    /// Least recently used first.
    order: VecDeque<Uuid>,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(table: Arc<Table>, style: ChartStyle, max_sessions: usize) -> Self {
        Self {
            table,
            style,
            sessions: HashMap::new(),
            order: VecDeque::new(),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Create a session in the Idle state.
    pub fn open(&mut self) -> (Uuid, &Session) {
        while self.sessions.len() >= self.max_sessions {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.sessions.remove(&oldest);
            log::info!("Evicted session {oldest}");
        }

        let id = Uuid::new_v4();
        self.order.push_back(id);
        let session = self
            .sessions
            .entry(id)
            .or_insert_with(|| Session::new(self.table.clone(), self.style.clone()));
        log::info!("Opened session {id}");
        (id, session)
    }

    pub fn get(&self, id: &Uuid) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Mutable access; counts as a use of the session.
    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut Session> {
        let session = self.sessions.get_mut(id)?;
        if let Some(pos) = self.order.iter().position(|o| o == id) {
            if let Some(used) = self.order.remove(pos) {
                self.order.push_back(used);
            }
        }
        Some(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
