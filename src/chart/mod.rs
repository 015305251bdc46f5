/// Chart model: pure functions from (Table, SelectionSet) to serializable
/// chart descriptions.
///
/// ```text
///   Table ──┬──► scatter  ──► ScatterSpec ─┐
///           │                              ├──► FigureSpec ──► JSON (Plotly)
///           └──► parcats  ──► ParcatsSpec ─┘         │
///                    ▲                               └──► egui painters
///              SelectionSet
/// ```
pub mod parcats;
pub mod scatter;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::color::Colorscale;
use crate::config::ColumnMapping;
use crate::data::model::Table;
use crate::selection::SelectionSet;

pub use parcats::{ParcatsSpec, BASELINE, HIGHLIGHT};
pub use scatter::ScatterSpec;

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Everything about the figure that does not come from the data.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub columns: ColumnMapping,
    pub marker_color: String,
    pub selected_color: String,
    pub unselected_opacity: f32,
    pub colorscale: Colorscale,
    pub x_title: String,
    pub y_title: String,
    /// Vertical share of the figure taken by the scatter plot.
    pub scatter_domain: [f64; 2],
    /// Vertical share of the figure taken by the parcats diagram.
    pub parcats_domain: [f64; 2],
    pub height: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            marker_color: "gray".into(),
            selected_color: "firebrick".into(),
            unselected_opacity: 0.4,
            colorscale: Colorscale::default(),
            x_title: "Horsepower".into(),
            y_title: "MPG".into(),
            scatter_domain: [0.6, 1.0],
            parcats_domain: [0.0, 0.4],
            height: 800,
        }
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LayoutSpec {
    pub height: u32,
    pub xaxis: AxisSpec,
    pub yaxis: AxisSpec,
    pub dragmode: &'static str,
    pub hovermode: &'static str,
    pub paper_bgcolor: &'static str,
    pub autosize: bool,
    pub bargap: f32,
    pub font: FontSpec,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AxisSpec {
    pub title: AxisTitle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AxisTitle {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FontSpec {
    pub family: &'static str,
    pub size: u32,
}

pub fn build_layout(style: &ChartStyle) -> LayoutSpec {
    LayoutSpec {
        height: style.height,
        xaxis: AxisSpec {
            title: AxisTitle {
                text: style.x_title.clone(),
            },
            domain: None,
        },
        yaxis: AxisSpec {
            title: AxisTitle {
                text: style.y_title.clone(),
            },
            domain: Some(style.scatter_domain),
        },
        dragmode: "lasso",
        hovermode: "closest",
        paper_bgcolor: "rgba(0, 0, 0, 0)",
        autosize: false,
        bargap: 0.35,
        font: FontSpec {
            family: "Questrial",
            size: 10,
        },
    }
}

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

/// Both linked traces plus layout, always built from one selection.
///
/// Serializes to Plotly's figure shape:
/// `{"data": [{"type": "scatter", ..}, {"type": "parcats", ..}], "layout": {..}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureSpec {
    pub scatter: ScatterSpec,
    pub parcats: ParcatsSpec,
    pub layout: LayoutSpec,
}

/// Build the whole figure from scratch.
pub fn build_figure(table: &Table, selection: &SelectionSet, style: &ChartStyle) -> FigureSpec {
    FigureSpec {
        scatter: scatter::build_scatter(table, selection, style),
        parcats: parcats::build_parcats(table, selection, style),
        layout: build_layout(style),
    }
}

impl FigureSpec {
    /// Rows marked in both traces, or `None` if the traces disagree.
    pub fn consistent_selection(&self) -> Option<Vec<usize>> {
        let scatter = self.scatter.selected_indices();
        (scatter == self.parcats.highlighted_indices()).then_some(scatter)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(serde::Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TraceRef<'a> {
    Scatter(&'a ScatterSpec),
    Parcats(&'a ParcatsSpec),
}

impl Serialize for FigureSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let data = [TraceRef::Scatter(&self.scatter), TraceRef::Parcats(&self.parcats)];
        let mut fig = serializer.serialize_struct("FigureSpec", 2)?;
        fig.serialize_field("data", &data)?;
        fig.serialize_field("layout", &self.layout)?;
        fig.end()
    }
}
