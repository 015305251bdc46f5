use std::sync::Arc;

use eframe::egui;

use crate::chart::ChartStyle;
use crate::data::loader::{load_table, DataSource};
use crate::selection::InteractionEvent;
use crate::state::Session;
use crate::ui::{panels, parcats, plot};

// ---------------------------------------------------------------------------
// Viewer state (independent of rendering)
// ---------------------------------------------------------------------------

pub struct ViewerState {
    /// None until a dataset is loaded.
    pub session: Option<Session>,
    pub style: ChartStyle,
    /// Lasso polygon being drawn on the scatter plot, in plot coordinates.
    pub lasso: Vec<[f64; 2]>,
    /// Interaction raised while drawing the current frame. Applied once both
    /// charts are drawn so a frame never mixes two selections.
    pub pending: Option<InteractionEvent>,
    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl ViewerState {
    pub fn new(session: Option<Session>, style: ChartStyle) -> Self {
        Self {
            session,
            style,
            lasso: Vec::new(),
            pending: None,
            status_message: None,
        }
    }

    /// Apply the queued interaction, if any. Returns whether one was queued.
    pub fn flush_pending(&mut self) -> bool {
        let Some(event) = self.pending.take() else {
            return false;
        };
        if let Some(session) = &mut self.session {
            match session.handle(&event) {
                Ok(_) => self.status_message = None,
                Err(e) => self.status_message = Some(format!("Ignored: {e}")),
            }
        }
        true
    }

    pub fn clear_selection(&mut self) {
        if let Some(session) = &mut self.session {
            session.clear();
        }
        self.lasso.clear();
        self.status_message = None;
    }

    /// Replace the dataset. The new table gets a fresh session.
    pub fn open_source(&mut self, source: &DataSource) {
        match load_table(source, &self.style.columns) {
            Ok(table) => {
                self.session = Some(Session::new(Arc::new(table), self.style.clone()));
                self.lasso.clear();
                self.pending = None;
                self.status_message = None;
            }
            Err(e) => {
                log::error!("{e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ParcatsApp {
    pub state: ViewerState,
}

impl ParcatsApp {
    pub fn new(session: Session, style: ChartStyle) -> Self {
        Self {
            state: ViewerState::new(Some(session), style),
        }
    }
}

impl eframe::App for ParcatsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: scatter above, parcats below ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let ViewerState {
                session,
                lasso,
                pending,
                ..
            } = &mut self.state;

            let Some(session) = session else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a dataset to start  (File → Open…)");
                });
                return;
            };
            let figure = session.figure();
            if figure.scatter.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.heading("The dataset has no rows");
                });
                return;
            }

            let scatter_height = ui.available_height() * 0.55;
            let width = ui.available_width();
            ui.allocate_ui(egui::vec2(width, scatter_height), |ui| {
                plot::scatter_plot(ui, figure, lasso, pending);
            });
            ui.separator();
            parcats::parcats_diagram(ui, figure, pending);
        });

        if self.state.flush_pending() {
            ctx.request_repaint();
        }
    }
}

/// Open the desktop viewer on an already loaded session.
pub fn run_native(session: Session, style: ChartStyle) -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Parcats – Linked Selection",
        options,
        Box::new(|_cc| Ok(Box::new(ParcatsApp::new(session, style)))),
    )
}
