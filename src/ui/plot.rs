use eframe::egui::{Color32, Ui};
use egui_plot::{Line, Plot, PlotPoints, Points};

use crate::chart::FigureSpec;
use crate::color::to_color32;
use crate::selection::InteractionEvent;

// ---------------------------------------------------------------------------
// Scatter plot (upper half of the central panel)
// ---------------------------------------------------------------------------

/// Draw the scatter trace. Dragging draws a lasso; releasing it queues a
/// `LassoSelect` with the rows inside. A plain click queues an empty one,
/// i.e. deselect.
pub fn scatter_plot(
    ui: &mut Ui,
    figure: &FigureSpec,
    lasso: &mut Vec<[f64; 2]>,
    pending: &mut Option<InteractionEvent>,
) {
    let spec = &figure.scatter;

    let mut plain: Vec<[f64; 2]> = Vec::new();
    let mut selected: Vec<[f64; 2]> = Vec::new();
    let mut plain_color = to_color32(&spec.marker.color, 1.0);
    let mut selected_color = plain_color;

    for i in 0..spec.len() {
        let Some(point) = spec.point(i) else {
            continue;
        };
        let style = spec.point_style(i);
        if style.selected {
            selected_color = to_color32(&style.color, style.opacity);
            selected.push(point);
        } else {
            plain_color = to_color32(&style.color, style.opacity);
            plain.push(point);
        }
    }

    Plot::new("scatter_plot")
        .x_axis_label(figure.layout.xaxis.title.text.as_str())
        .y_axis_label(figure.layout.yaxis.title.text.as_str())
        .allow_drag(false)
        .allow_boxed_zoom(false)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.points(Points::new(PlotPoints::new(plain)).color(plain_color).radius(3.0));
            plot_ui.points(
                Points::new(PlotPoints::new(selected))
                    .color(selected_color)
                    .radius(3.5),
            );

            let response = plot_ui.response().clone();
            if response.drag_started() {
                lasso.clear();
            }
            if response.dragged() {
                if let Some(p) = plot_ui.pointer_coordinate() {
                    lasso.push([p.x, p.y]);
                }
            }
            if lasso.len() > 1 {
                let mut outline = lasso.clone();
                outline.push(lasso[0]);
                plot_ui.line(Line::new(PlotPoints::new(outline)).color(Color32::DARK_GRAY));
            }

            if response.drag_stopped() {
                let polygon = std::mem::take(lasso);
                if polygon.len() >= 3 {
                    let row_indices = (0..spec.len())
                        .filter(|&i| {
                            spec.point(i)
                                .is_some_and(|p| point_in_polygon(p, &polygon))
                        })
                        .collect();
                    *pending = Some(InteractionEvent::LassoSelect { row_indices });
                }
            } else if response.clicked() && spec.has_selection() {
                *pending = Some(InteractionEvent::LassoSelect {
                    row_indices: Vec::new(),
                });
            }
        });
}

/// Even-odd rule ray cast.
pub fn point_in_polygon(p: [f64; 2], polygon: &[[f64; 2]]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i][0], polygon[i][1]);
        let (xj, yj) = (polygon[j][0], polygon[j][1]);
        if (yi > p[1]) != (yj > p[1]) && p[0] < (xj - xi) * (p[1] - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
