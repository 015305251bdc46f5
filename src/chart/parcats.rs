use std::collections::BTreeMap;

use serde::Serialize;

use super::ChartStyle;
use crate::color::Colorscale;
use crate::data::model::Table;
use crate::selection::SelectionSet;

/// Line color channel value for rows outside the selection.
pub const BASELINE: u8 = 0;
/// Line color channel value for selected rows.
pub const HIGHLIGHT: u8 = 1;

/// Vertical space left between two category blocks of one dimension, as a
/// fraction of the axis height.
const CATEGORY_GAP: f32 = 0.02;

// ---------------------------------------------------------------------------
// Parcats trace
// ---------------------------------------------------------------------------

/// Parallel-categories trace. Every dimension lists one value per table row,
/// so row `i` is the same record in every dimension and in `line.color`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParcatsSpec {
    pub domain: Domain,
    pub dimensions: Vec<DimensionSpec>,
    pub line: ParcatsLine,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Domain {
    pub y: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionSpec {
    pub label: String,
    pub values: Vec<String>,
    /// Category order along the axis.
    pub categoryarray: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParcatsLine {
    pub colorscale: Colorscale,
    pub cmin: f32,
    pub cmax: f32,
    pub color: Vec<u8>,
    pub shape: &'static str,
}

pub fn build_parcats(table: &Table, selection: &SelectionSet, style: &ChartStyle) -> ParcatsSpec {
    let dimensions = style
        .columns
        .dimensions
        .iter()
        .map(|col| DimensionSpec {
            label: col.clone(),
            values: table.categorical_column(col),
            categoryarray: table.distinct_values(col),
        })
        .collect();

    let mut color = vec![BASELINE; table.len()];
    for i in selection.iter() {
        if let Some(slot) = color.get_mut(i) {
            *slot = HIGHLIGHT;
        }
    }

    ParcatsSpec {
        domain: Domain {
            y: style.parcats_domain,
        },
        dimensions,
        line: ParcatsLine {
            colorscale: style.colorscale.clone(),
            cmin: BASELINE as f32,
            cmax: HIGHLIGHT as f32,
            color,
            shape: "hspline",
        },
    }
}

impl ParcatsSpec {
    pub fn row_count(&self) -> usize {
        self.line.color.len()
    }

    pub fn highlighted_indices(&self) -> Vec<usize> {
        self.line
            .color
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == HIGHLIGHT)
            .map(|(i, _)| i)
            .collect()
    }

    /// Rows holding `value` in dimension `dimension`; what a click on that
    /// category selects.
    pub fn category_rows(&self, dimension: usize, value: &str) -> Vec<usize> {
        self.dimensions
            .get(dimension)
            .map(|dim| {
                dim.values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| v.as_str() == value)
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Rows going from `from_value` in `dimension` to `to_value` in the next
    /// dimension; what a click on that ribbon selects.
    pub fn ribbon_rows(&self, dimension: usize, from_value: &str, to_value: &str) -> Vec<usize> {
        let (Some(from), Some(to)) = (
            self.dimensions.get(dimension),
            self.dimensions.get(dimension + 1),
        ) else {
            return Vec::new();
        };
        from.values
            .iter()
            .zip(&to.values)
            .enumerate()
            .filter(|(_, (a, b))| a.as_str() == from_value && b.as_str() == to_value)
            .map(|(i, _)| i)
            .collect()
    }

    /// Lay out category blocks and ribbons in unit coordinates: x in `[0, 1]`
    /// across dimensions, y in `[0, 1]` from the top of each axis.
    pub fn layout_geometry(&self) -> ParcatsGeometry {
        let n_dims = self.dimensions.len();
        let axis_x: Vec<f32> = (0..n_dims)
            .map(|i| {
                if n_dims <= 1 {
                    0.5
                } else {
                    i as f32 / (n_dims - 1) as f32
                }
            })
            .collect();

        let rows = self.row_count();
        let mut blocks = Vec::new();
        // (dimension, category position) -> index into `blocks`
        let mut block_index: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        let mut units: Vec<f32> = Vec::with_capacity(n_dims);

        for (d, dim) in self.dimensions.iter().enumerate() {
            let counts: Vec<usize> = dim
                .categoryarray
                .iter()
                .map(|cat| dim.values.iter().filter(|v| *v == cat).count())
                .collect();
            let used = counts.iter().filter(|&&c| c > 0).count();
            let mut gap = CATEGORY_GAP;
            if used > 1 && gap * (used - 1) as f32 >= 0.5 {
                gap = 0.5 / (used - 1) as f32;
            }
            let available = 1.0 - gap * used.saturating_sub(1) as f32;
            let unit = if rows == 0 { 0.0 } else { available / rows as f32 };
            units.push(unit);

            let mut y = 0.0;
            for (c, (cat, &count)) in dim.categoryarray.iter().zip(&counts).enumerate() {
                if count == 0 {
                    continue;
                }
                let height = count as f32 * unit;
                block_index.insert((d, c), blocks.len());
                blocks.push(CategoryBlock {
                    dimension: d,
                    label: cat.clone(),
                    count,
                    y0: y,
                    y1: y + height,
                });
                y += height + gap;
            }
        }

        let mut ribbons = Vec::new();
        for d in 0..n_dims.saturating_sub(1) {
            let from_dim = &self.dimensions[d];
            let to_dim = &self.dimensions[d + 1];
            let position = |dim: &DimensionSpec, v: &str| dim.categoryarray.iter().position(|c| c == v);

            // (from category, to category, color) -> rows
            let mut groups: BTreeMap<(usize, usize, u8), usize> = BTreeMap::new();
            for (i, (a, b)) in from_dim.values.iter().zip(&to_dim.values).enumerate() {
                let (Some(fa), Some(tb)) = (position(from_dim, a.as_str()), position(to_dim, b.as_str()))
                else {
                    continue;
                };
                let c = self.line.color.get(i).copied().unwrap_or(BASELINE);
                *groups.entry((fa, tb, c)).or_default() += 1;
            }

            // Stack ribbons inside their source block ordered by target, and
            // inside their target block ordered by source.
            let mut source_offset: BTreeMap<usize, f32> = BTreeMap::new();
            let mut from_spans = BTreeMap::new();
            for (&(fa, tb, c), &count) in &groups {
                let Some(&bi) = block_index.get(&(d, fa)) else { continue };
                let off = source_offset.entry(fa).or_insert(blocks[bi].y0);
                let h = count as f32 * units[d];
                from_spans.insert((fa, tb, c), (*off, *off + h));
                *off += h;
            }

            let mut by_target: Vec<(&(usize, usize, u8), &usize)> = groups.iter().collect();
            by_target.sort_by_key(|entry| {
                let (fa, tb, c) = *entry.0;
                (tb, fa, c)
            });
            let mut target_offset: BTreeMap<usize, f32> = BTreeMap::new();
            for (&(fa, tb, c), &count) in by_target {
                let Some(&bi) = block_index.get(&(d + 1, tb)) else { continue };
                let Some(&from) = from_spans.get(&(fa, tb, c)) else { continue };
                let off = target_offset.entry(tb).or_insert(blocks[bi].y0);
                let h = count as f32 * units[d + 1];
                ribbons.push(Ribbon {
                    dimension: d,
                    from_label: from_dim.categoryarray[fa].clone(),
                    to_label: to_dim.categoryarray[tb].clone(),
                    color: c,
                    count,
                    from,
                    to: (*off, *off + h),
                });
                *off += h;
            }
        }

        ParcatsGeometry {
            axis_x,
            blocks,
            ribbons,
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry for painters that draw the diagram themselves
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ParcatsGeometry {
    /// Horizontal position of each dimension axis.
    pub axis_x: Vec<f32>,
    pub blocks: Vec<CategoryBlock>,
    pub ribbons: Vec<Ribbon>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBlock {
    pub dimension: usize,
    pub label: String,
    pub count: usize,
    pub y0: f32,
    pub y1: f32,
}

/// Band of rows sharing a category pair (and color) between dimension
/// `dimension` and the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct Ribbon {
    pub dimension: usize,
    pub from_label: String,
    pub to_label: String,
    pub color: u8,
    pub count: usize,
    pub from: (f32, f32),
    pub to: (f32, f32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Row};

    fn cars() -> Table {
        let data = [
            ("sedan", "fwd", "gas"),
            ("wagon", "fwd", "diesel"),
            ("sedan", "rwd", "gas"),
            ("hatchback", "fwd", "gas"),
            ("sedan", "4wd", "gas"),
        ];
        let rows = data
            .iter()
            .map(|(b, d, f)| {
                [
                    ("body-style", CellValue::String(b.to_string())),
                    ("drive-wheels", CellValue::String(d.to_string())),
                    ("fuel-type", CellValue::String(f.to_string())),
                ]
                .into_iter()
                .collect::<Row>()
            })
            .collect();
        Table::from_rows(
            vec!["body-style".into(), "drive-wheels".into(), "fuel-type".into()],
            rows,
        )
    }

    #[test]
    fn dimensions_follow_the_fixed_order() {
        let spec = build_parcats(&cars(), &SelectionSet::new(), &ChartStyle::default());
        let labels: Vec<&str> = spec.dimensions.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["body-style", "drive-wheels", "fuel-type"]);
        assert_eq!(spec.dimensions[0].categoryarray, vec!["hatchback", "sedan", "wagon"]);
        assert_eq!(spec.line.color, vec![BASELINE; 5]);
        assert!(spec.highlighted_indices().is_empty());
    }

    #[test]
    fn selection_colors_rows() {
        let selection: SelectionSet = [1, 3].into_iter().collect();
        let spec = build_parcats(&cars(), &selection, &ChartStyle::default());
        assert_eq!(spec.line.color, vec![0, 1, 0, 1, 0]);
        assert_eq!(spec.highlighted_indices(), vec![1, 3]);
    }

    #[test]
    fn category_and_ribbon_rows() {
        let spec = build_parcats(&cars(), &SelectionSet::new(), &ChartStyle::default());
        assert_eq!(spec.category_rows(0, "sedan"), vec![0, 2, 4]);
        assert_eq!(spec.category_rows(2, "diesel"), vec![1]);
        assert!(spec.category_rows(7, "sedan").is_empty());
        assert_eq!(spec.ribbon_rows(0, "sedan", "fwd"), vec![0]);
        assert!(spec.ribbon_rows(2, "gas", "fwd").is_empty());
    }

    #[test]
    fn geometry_stacks_blocks_and_balances_ribbons() {
        let selection: SelectionSet = [0].into_iter().collect();
        let spec = build_parcats(&cars(), &selection, &ChartStyle::default());
        let geo = spec.layout_geometry();

        assert_eq!(geo.axis_x, vec![0.0, 0.5, 1.0]);

        let body: Vec<&CategoryBlock> = geo.blocks.iter().filter(|b| b.dimension == 0).collect();
        assert_eq!(body.len(), 3);
        assert!((body.last().unwrap().y1 - 1.0).abs() < 1e-5);
        for pair in body.windows(2) {
            assert!(pair[0].y1 < pair[1].y0);
        }

        // Every row crosses each gap between adjacent axes exactly once.
        for d in 0..2 {
            let total: usize = geo
                .ribbons
                .iter()
                .filter(|r| r.dimension == d)
                .map(|r| r.count)
                .sum();
            assert_eq!(total, 5);
        }
        assert!(geo.ribbons.iter().any(|r| r.color == HIGHLIGHT && r.count == 1));
    }

    #[test]
    fn empty_table_has_no_geometry() {
        let table = Table::from_rows(
            vec!["body-style".into(), "drive-wheels".into(), "fuel-type".into()],
            Vec::new(),
        );
        let spec = build_parcats(&table, &SelectionSet::new(), &ChartStyle::default());
        let geo = spec.layout_geometry();
        assert!(geo.blocks.is_empty());
        assert!(geo.ribbons.is_empty());
    }
}
