use crate::{
    core::{Axis, Rect},
    error::{CollagerError, CollagerResult},
    layout::{GridLayoutState, MIN_CELL_SIZE},
    template::Template,
};

/// Interactive handle between two directly-adjacent cells.
///
/// `cell_a` is the leading cell (left of a column divider, above a row
/// divider); both fields are indices into the template's cell list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Divider {
    pub cell_a: usize,
    pub cell_b: usize,
    pub axis: Axis,
}

/// Scan a template's cell pairs for direct adjacency, one divider per pair.
///
/// Two cells are adjacent when their positions differ by exactly one along
/// one axis and match along the other. Templates that declare a span get no
/// dividers; their fixed shapes are not interactively resizable.
pub fn find_dividers(template: &Template) -> Vec<Divider> {
    if template.has_span() {
        return Vec::new();
    }
    let mut dividers = Vec::new();
    for (i, a) in template.cells.iter().enumerate() {
        for (j, b) in template.cells.iter().enumerate().skip(i + 1) {
            let (pa, pb) = (a.position, b.position);
            if pa.row == pb.row && pa.column.abs_diff(pb.column) == 1 {
                let (cell_a, cell_b) = if pa.column < pb.column { (i, j) } else { (j, i) };
                dividers.push(Divider {
                    cell_a,
                    cell_b,
                    axis: Axis::Columns,
                });
            } else if pa.column == pb.column && pa.row.abs_diff(pb.row) == 1 {
                let (cell_a, cell_b) = if pa.row < pb.row { (i, j) } else { (j, i) };
                dividers.push(Divider {
                    cell_a,
                    cell_b,
                    axis: Axis::Rows,
                });
            }
        }
    }
    dividers
}

/// Find the established divider for a cell pair, in either order.
pub fn divider_between(dividers: &[Divider], cell_a: usize, cell_b: usize) -> Option<Divider> {
    dividers
        .iter()
        .copied()
        .find(|d| (d.cell_a, d.cell_b) == (cell_a, cell_b) || (d.cell_a, d.cell_b) == (cell_b, cell_a))
}

/// Redistribute the combined size of a divider's two tracks so the leading
/// track takes `ratio` of it.
///
/// Rejected (returning `false`, state untouched) when either resulting track
/// would dip under [`MIN_CELL_SIZE`]. This is the expected outcome at the
/// ends of a drag, not an error.
pub fn apply_ratio(
    template: &Template,
    state: &mut GridLayoutState,
    divider: Divider,
    ratio: f64,
) -> CollagerResult<bool> {
    let (track_a, track_b) = divider_tracks(template, divider)?;
    Ok(apply_split(state.sizes_mut(divider.axis), track_a, track_b, ratio))
}

/// Fraction of the pair's combined size currently held by the leading track.
pub fn current_ratio(
    template: &Template,
    state: &GridLayoutState,
    divider: Divider,
) -> CollagerResult<f64> {
    let (track_a, track_b) = divider_tracks(template, divider)?;
    let sizes = state.sizes(divider.axis);
    let combined = sizes[track_a] + sizes[track_b];
    if combined <= 0.0 {
        return Ok(0.5);
    }
    Ok(sizes[track_a] / combined)
}

/// Map a live pointer displacement onto a target ratio.
///
/// The 0.4 factor softens the drag so a full-container swipe is not needed to
/// move the divider far; the 0.1..0.9 clamp is a smoothing bound for the
/// interaction, distinct from the hard minimum enforced on commit.
pub fn drag_ratio(initial_ratio: f64, delta: f64, container_dimension: f64) -> f64 {
    if container_dimension <= 0.0 {
        return initial_ratio.clamp(0.1, 0.9);
    }
    (initial_ratio + delta / (container_dimension * 0.4)).clamp(0.1, 0.9)
}

/// Midline coordinate of a divider along its axis: exactly between cell A's
/// trailing edge and cell B's leading edge.
pub fn divider_midline(divider: Divider, rects: &[Rect]) -> CollagerResult<f64> {
    let a = rects.get(divider.cell_a).ok_or_else(|| {
        CollagerError::layout(format!("divider cell index {} out of range", divider.cell_a))
    })?;
    let b = rects.get(divider.cell_b).ok_or_else(|| {
        CollagerError::layout(format!("divider cell index {} out of range", divider.cell_b))
    })?;
    Ok(match divider.axis {
        Axis::Columns => (a.x1 + b.x0) * 0.5,
        Axis::Rows => (a.y1 + b.y0) * 0.5,
    })
}

/// Commit `ratio` of the combined track size to `track_a`, the rest to
/// `track_b`. The combined size is conserved exactly; both-or-nothing.
fn apply_split(sizes: &mut [f64], track_a: usize, track_b: usize, ratio: f64) -> bool {
    let combined = sizes[track_a] + sizes[track_b];
    let new_a = combined * ratio;
    let new_b = combined - new_a;
    if new_a < MIN_CELL_SIZE || new_b < MIN_CELL_SIZE {
        return false;
    }
    sizes[track_a] = new_a;
    sizes[track_b] = new_b;
    true
}

fn divider_tracks(template: &Template, divider: Divider) -> CollagerResult<(usize, usize)> {
    let cell = |idx: usize| {
        template.cells.get(idx).ok_or_else(|| {
            CollagerError::layout(format!(
                "divider references cell {idx}, template '{}' has {}",
                template.id,
                template.cells.len()
            ))
        })
    };
    let a = cell(divider.cell_a)?.position;
    let b = cell(divider.cell_b)?.position;
    Ok(match divider.axis {
        Axis::Columns => (a.column, b.column),
        Axis::Rows => (a.row, b.row),
    })
}
