use serde::Serialize;

use super::ChartStyle;
use crate::data::model::Table;
use crate::selection::SelectionSet;

// ---------------------------------------------------------------------------
// Scatter trace
// ---------------------------------------------------------------------------

/// Scatter trace, one point per table row. Serializes as a Plotly `scatter`
/// trace (minus the `type` tag, added by the figure).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSpec {
    /// `None` where the row has no usable value; the point is not drawn but
    /// keeps its index.
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    pub mode: &'static str,
    pub marker: MarkerSpec,
    pub selected: MarkerState,
    pub unselected: MarkerState,
    /// `null` while idle, otherwise the selected indices in ascending order.
    pub selectedpoints: Option<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSpec {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerState {
    pub marker: MarkerOverride,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
}

/// Resolved look of a single point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointStyle {
    pub color: String,
    pub opacity: f32,
    pub selected: bool,
}

pub fn build_scatter(table: &Table, selection: &SelectionSet, style: &ChartStyle) -> ScatterSpec {
    let selectedpoints = if selection.is_empty() {
        None
    } else {
        Some(
            selection
                .iter()
                .filter(|&i| table.contains_index(i))
                .collect(),
        )
    };

    ScatterSpec {
        x: table.numeric_column(&style.columns.x),
        y: table.numeric_column(&style.columns.y),
        mode: "markers",
        marker: MarkerSpec {
            color: style.marker_color.clone(),
        },
        selected: MarkerState {
            marker: MarkerOverride {
                color: Some(style.selected_color.clone()),
                opacity: None,
            },
        },
        unselected: MarkerState {
            marker: MarkerOverride {
                color: None,
                opacity: Some(style.unselected_opacity),
            },
        },
        selectedpoints,
    }
}

impl ScatterSpec {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Whether any selection is applied to the trace.
    pub fn has_selection(&self) -> bool {
        self.selectedpoints.is_some()
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.selectedpoints.clone().unwrap_or_default()
    }

    /// Position of point `i`, if both coordinates are known.
    pub fn point(&self, i: usize) -> Option<[f64; 2]> {
        match (self.x.get(i).copied().flatten(), self.y.get(i).copied().flatten()) {
            (Some(x), Some(y)) => Some([x, y]),
            _ => None,
        }
    }

    /// Plotly's rule: selected points take the selected color, the rest are
    /// dimmed, but only while a selection exists.
    pub fn point_style(&self, i: usize) -> PointStyle {
        let base = PointStyle {
            color: self.marker.color.clone(),
            opacity: 1.0,
            selected: false,
        };
        let Some(selected) = &self.selectedpoints else {
            return base;
        };
        if selected.binary_search(&i).is_ok() {
            PointStyle {
                color: self
                    .selected
                    .marker
                    .color
                    .clone()
                    .unwrap_or(base.color),
                opacity: self.selected.marker.opacity.unwrap_or(1.0),
                selected: true,
            }
        } else {
            PointStyle {
                opacity: self.unselected.marker.opacity.unwrap_or(1.0),
                ..base
            }
        }
    }
}
