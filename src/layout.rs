use crate::{
    core::{AspectRatio, Axis, Rect, Size},
    error::{CollagerError, CollagerResult},
    template::Template,
};

/// Hard lower bound on any column width or row height, in layout units.
pub const MIN_CELL_SIZE: f64 = 20.0;

/// Smallest outer margin: the grid never sits closer than this to the
/// work-area edge, even at inner margin zero.
pub const OUTER_MARGIN_MIN: f64 = 8.0;

/// Outer margin derived from the inner margin.
pub fn outer_margin_for(inner_margin: f64) -> f64 {
    inner_margin.max(OUTER_MARGIN_MIN)
}

/// The single owner of all shared grid dimensions.
///
/// Every cell in a column reads the same `column_widths` entry (and likewise
/// for rows), which is what makes one divider drag move every cell along that
/// track. Layout derivation is a pure function over this state plus a
/// [`Template`]; nothing here stores cell rectangles.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridLayoutState {
    pub column_widths: Vec<f64>,
    pub row_heights: Vec<f64>,
    pub inner_margin: f64,
    pub outer_margin: f64,
    pub aspect_ratio: AspectRatio,
    pub work_area: Size,
}

impl GridLayoutState {
    /// Fresh state for a newly selected template: both axes get equal shares
    /// of the work area after inner margins are taken out.
    pub fn seeded(
        template: &Template,
        work_area: Size,
        inner_margin: f64,
        aspect_ratio: AspectRatio,
    ) -> Self {
        Self {
            column_widths: equal_shares(work_area.width, template.columns(), inner_margin),
            row_heights: equal_shares(work_area.height, template.rows(), inner_margin),
            inner_margin,
            outer_margin: outer_margin_for(inner_margin),
            aspect_ratio,
            work_area,
        }
    }

    /// Carry existing proportions into a new work area, margin, or ratio.
    ///
    /// Each axis is scaled by `new_available / old_total`, so a manual 70/30
    /// split stays 70/30 across margin and ratio changes. Equal-share seeding
    /// happens only when there is nothing to carry (empty or zero-sum arrays).
    pub fn reconfigure(&mut self, work_area: Size, inner_margin: f64, aspect_ratio: AspectRatio) {
        rescale_axis(&mut self.column_widths, work_area.width, inner_margin);
        rescale_axis(&mut self.row_heights, work_area.height, inner_margin);
        self.inner_margin = inner_margin;
        self.outer_margin = outer_margin_for(inner_margin);
        self.aspect_ratio = aspect_ratio;
        self.work_area = work_area;
    }

    /// Enforce the total-bounds invariant: if an axis' span (sizes plus inner
    /// margins) exceeds the work area, uniformly shrink that axis until it
    /// fits exactly. Zero-sum arrays fall back to equal shares instead of
    /// dividing by zero.
    pub fn normalize(&mut self) {
        normalize_axis(&mut self.column_widths, self.work_area.width, self.inner_margin);
        normalize_axis(&mut self.row_heights, self.work_area.height, self.inner_margin);
    }

    /// Total extent an axis currently occupies, margins included.
    pub fn axis_span(&self, axis: Axis) -> f64 {
        let sizes = self.sizes(axis);
        sizes.iter().sum::<f64>() + self.inner_margin * (sizes.len().saturating_sub(1) as f64)
    }

    pub fn sizes(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::Columns => &self.column_widths,
            Axis::Rows => &self.row_heights,
        }
    }

    pub fn sizes_mut(&mut self, axis: Axis) -> &mut [f64] {
        match axis {
            Axis::Columns => &mut self.column_widths,
            Axis::Rows => &mut self.row_heights,
        }
    }

    /// Work-area extent along an axis.
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Columns => self.work_area.width,
            Axis::Rows => self.work_area.height,
        }
    }
}

/// One rectangle per template cell, in template order, relative to the
/// work-area origin.
///
/// Base case: cell `(c, r)` starts at the sum of the preceding track sizes
/// plus one inner margin per crossed gap. A span widens the rectangle over
/// the extra adjacent tracks plus the margins between them.
pub fn cell_rects(template: &Template, state: &GridLayoutState) -> CollagerResult<Vec<Rect>> {
    if state.column_widths.len() != template.columns()
        || state.row_heights.len() != template.rows()
    {
        return Err(CollagerError::layout(format!(
            "template '{}' expects {}x{} tracks, state has {}x{}",
            template.id,
            template.columns(),
            template.rows(),
            state.column_widths.len(),
            state.row_heights.len(),
        )));
    }

    let margin = state.inner_margin;
    let mut rects = Vec::with_capacity(template.cells.len());
    for cell in &template.cells {
        let c = cell.position.column;
        let r = cell.position.row;
        let x = state.column_widths[..c].iter().sum::<f64>() + (c as f64) * margin;
        let y = state.row_heights[..r].iter().sum::<f64>() + (r as f64) * margin;
        let width = track_extent(&state.column_widths, c, cell.column_extent(), margin);
        let height = track_extent(&state.row_heights, r, cell.row_extent(), margin);
        rects.push(Rect::new(x, y, x + width, y + height));
    }
    Ok(rects)
}

/// Size of `count` consecutive tracks starting at `first`, including the
/// margins between them.
fn track_extent(sizes: &[f64], first: usize, count: usize, margin: f64) -> f64 {
    sizes[first..first + count].iter().sum::<f64>() + ((count - 1) as f64) * margin
}

/// Equal split of `extent` across `count` tracks separated by `margin`.
pub fn equal_shares(extent: f64, count: usize, margin: f64) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let available = axis_available(extent, count, margin);
    vec![available / (count as f64); count]
}

fn axis_available(extent: f64, count: usize, margin: f64) -> f64 {
    (extent - margin * (count.saturating_sub(1) as f64)).max(0.0)
}

fn rescale_axis(sizes: &mut Vec<f64>, extent: f64, margin: f64) {
    let count = sizes.len();
    if count == 0 {
        return;
    }
    let old_total: f64 = sizes.iter().sum();
    if old_total <= 0.0 {
        *sizes = equal_shares(extent, count, margin);
        return;
    }
    let scale = axis_available(extent, count, margin) / old_total;
    for size in sizes.iter_mut() {
        *size *= scale;
    }
}

fn normalize_axis(sizes: &mut Vec<f64>, extent: f64, margin: f64) {
    let count = sizes.len();
    if count == 0 {
        return;
    }
    let total: f64 = sizes.iter().sum();
    let span = total + margin * (count.saturating_sub(1) as f64);
    if span <= extent {
        return;
    }
    if total <= 0.0 {
        *sizes = equal_shares(extent, count, margin);
        return;
    }
    let scale = axis_available(extent, count, margin) / total;
    for size in sizes.iter_mut() {
        *size *= scale;
    }
}
