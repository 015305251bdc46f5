use eframe::egui::{self, pos2, vec2, Align2, Color32, FontId, Mesh, Pos2, Rect, Sense, Shape, Ui};

use crate::chart::parcats::{ParcatsGeometry, Ribbon};
use crate::chart::FigureSpec;
use crate::color::srgb_to_color32;
use crate::selection::InteractionEvent;

const BLOCK_WIDTH: f32 = 12.0;
const RIBBON_OPACITY: f32 = 0.6;
const RIBBON_SAMPLES: usize = 24;

// ---------------------------------------------------------------------------
// Parallel-categories diagram (lower half of the central panel)
// ---------------------------------------------------------------------------

/// Paint the parcats trace. Clicking a category block queues a `Click` with
/// every row in that category; clicking a ribbon queues the rows of that
/// ribbon's category pair.
pub fn parcats_diagram(ui: &mut Ui, figure: &FigureSpec, pending: &mut Option<InteractionEvent>) {
    let spec = &figure.parcats;
    let geo = spec.layout_geometry();

    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click());
    let area = Rect::from_min_max(
        response.rect.min + vec2(90.0, 28.0),
        response.rect.max - vec2(90.0, 8.0),
    );
    if area.width() <= 0.0 || area.height() <= 0.0 {
        return;
    }
    let frame = Frame { area };
    let text_color = ui.visuals().text_color();

    // Ribbons under the blocks.
    for ribbon in &geo.ribbons {
        let c = spec
            .line
            .colorscale
            .color_at(ribbon.color as f32, spec.line.cmin, spec.line.cmax);
        let color = srgb_to_color32(c, RIBBON_OPACITY);
        painter.add(Shape::mesh(ribbon_mesh(&frame, &geo, ribbon, color)));
    }

    for block in &geo.blocks {
        let rect = frame.block_rect(&geo, block.dimension, block.y0, block.y1);
        painter.rect_filled(rect, 0.0, Color32::from_gray(90));
        painter.text(
            pos2(rect.left() - 4.0, rect.center().y),
            Align2::RIGHT_CENTER,
            &block.label,
            FontId::proportional(11.0),
            text_color,
        );
    }

    for (d, dim) in spec.dimensions.iter().enumerate() {
        let x = frame.x(geo.axis_x[d]);
        painter.text(
            pos2(x, area.top() - 6.0),
            Align2::CENTER_BOTTOM,
            &dim.label,
            FontId::proportional(12.0),
            text_color,
        );
    }

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            if let Some(row_indices) = hit_test(&frame, &geo, figure, pos) {
                *pending = Some(InteractionEvent::Click { row_indices });
            }
        }
    }
}

/// Maps the unit square of [`ParcatsGeometry`] onto the screen.
struct Frame {
    area: Rect,
}

impl Frame {
    fn x(&self, unit_x: f32) -> f32 {
        self.area.left() + unit_x * self.area.width()
    }

    fn y(&self, unit_y: f32) -> f32 {
        self.area.top() + unit_y * self.area.height()
    }

    fn block_rect(&self, geo: &ParcatsGeometry, dimension: usize, y0: f32, y1: f32) -> Rect {
        let x = self.x(geo.axis_x[dimension]);
        Rect::from_min_max(
            pos2(x - BLOCK_WIDTH / 2.0, self.y(y0)),
            pos2(x + BLOCK_WIDTH / 2.0, self.y(y1)),
        )
    }

    /// Top and bottom edge of a ribbon at `t` in `[0, 1]` between its axes,
    /// following an hspline-like smoothstep.
    fn ribbon_edges(&self, geo: &ParcatsGeometry, ribbon: &Ribbon, t: f32) -> (Pos2, Pos2) {
        let x0 = self.x(geo.axis_x[ribbon.dimension]) + BLOCK_WIDTH / 2.0;
        let x1 = self.x(geo.axis_x[ribbon.dimension + 1]) - BLOCK_WIDTH / 2.0;
        let s = t * t * (3.0 - 2.0 * t);
        let x = egui::lerp(x0..=x1, t);
        let top = egui::lerp(ribbon.from.0..=ribbon.to.0, s);
        let bottom = egui::lerp(ribbon.from.1..=ribbon.to.1, s);
        (pos2(x, self.y(top)), pos2(x, self.y(bottom)))
    }
}

fn ribbon_mesh(frame: &Frame, geo: &ParcatsGeometry, ribbon: &Ribbon, color: Color32) -> Mesh {
    let mut mesh = Mesh::default();
    for k in 0..=RIBBON_SAMPLES {
        let t = k as f32 / RIBBON_SAMPLES as f32;
        let (top, bottom) = frame.ribbon_edges(geo, ribbon, t);
        mesh.colored_vertex(top, color);
        mesh.colored_vertex(bottom, color);
        if k > 0 {
            let base = (2 * k) as u32;
            mesh.add_triangle(base - 2, base - 1, base);
            mesh.add_triangle(base - 1, base, base + 1);
        }
    }
    mesh
}

/// Rows under `pos`: a category block first, then a ribbon.
fn hit_test(frame: &Frame, geo: &ParcatsGeometry, figure: &FigureSpec, pos: Pos2) -> Option<Vec<usize>> {
    let spec = &figure.parcats;

    for block in &geo.blocks {
        let rect = frame
            .block_rect(geo, block.dimension, block.y0, block.y1)
            .expand2(vec2(4.0, 0.0));
        if rect.contains(pos) {
            return Some(spec.category_rows(block.dimension, &block.label));
        }
    }

    for ribbon in &geo.ribbons {
        let (start, _) = frame.ribbon_edges(geo, ribbon, 0.0);
        let (end, _) = frame.ribbon_edges(geo, ribbon, 1.0);
        if pos.x < start.x || pos.x > end.x || end.x <= start.x {
            continue;
        }
        let t = (pos.x - start.x) / (end.x - start.x);
        let (top, bottom) = frame.ribbon_edges(geo, ribbon, t);
        if pos.y >= top.y && pos.y <= bottom.y {
            return Some(spec.ribbon_rows(ribbon.dimension, &ribbon.from_label, &ribbon.to_label));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{build_figure, ChartStyle};
    use crate::data::model::{CellValue, Row, Table};
    use crate::selection::SelectionSet;

    fn figure() -> FigureSpec {
        let rows = [("sedan", "fwd", "gas"), ("wagon", "rwd", "gas"), ("sedan", "fwd", "diesel")]
            .iter()
            .map(|(b, d, f)| {
                [
                    ("horsepower", CellValue::Integer(100)),
                    ("highway-mpg", CellValue::Integer(30)),
                    ("body-style", CellValue::String(b.to_string())),
                    ("drive-wheels", CellValue::String(d.to_string())),
                    ("fuel-type", CellValue::String(f.to_string())),
                ]
                .into_iter()
                .collect::<Row>()
            })
            .collect();
        let table = Table::from_rows(Vec::new(), rows);
        build_figure(&table, &SelectionSet::new(), &ChartStyle::default())
    }

    fn frame() -> Frame {
        Frame {
            area: Rect::from_min_max(pos2(0.0, 0.0), pos2(400.0, 200.0)),
        }
    }

    #[test]
    fn clicking_a_block_selects_its_category() {
        let fig = figure();
        let geo = fig.parcats.layout_geometry();
        let sedan = geo
            .blocks
            .iter()
            .find(|b| b.dimension == 0 && b.label == "sedan")
            .unwrap();
        let rect = frame().block_rect(&geo, 0, sedan.y0, sedan.y1);

        let rows = hit_test(&frame(), &geo, &fig, rect.center());
        assert_eq!(rows, Some(vec![0, 2]));
    }

    #[test]
    fn clicking_a_ribbon_selects_its_rows() {
        let fig = figure();
        let geo = fig.parcats.layout_geometry();
        let ribbon = geo
            .ribbons
            .iter()
            .find(|r| r.dimension == 0 && r.from_label == "wagon")
            .unwrap();
        let (top, bottom) = frame().ribbon_edges(&geo, ribbon, 0.5);
        let mid = pos2(top.x, (top.y + bottom.y) / 2.0);

        assert_eq!(hit_test(&frame(), &geo, &fig, mid), Some(vec![1]));
    }

    #[test]
    fn empty_space_selects_nothing() {
        let fig = figure();
        let geo = fig.parcats.layout_geometry();
        assert_eq!(hit_test(&frame(), &geo, &fig, pos2(-50.0, -50.0)), None);
    }

    #[test]
    fn ribbon_mesh_is_a_triangle_strip() {
        let fig = figure();
        let geo = fig.parcats.layout_geometry();
        let mesh = ribbon_mesh(&frame(), &geo, &geo.ribbons[0], Color32::RED);
        assert_eq!(mesh.vertices.len(), 2 * (RIBBON_SAMPLES + 1));
        assert_eq!(mesh.indices.len(), 6 * RIBBON_SAMPLES);
    }
}
