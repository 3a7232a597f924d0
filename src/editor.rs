use crate::{
    core::{AspectRatio, Rect, Size, Vec2},
    error::{CollagerError, CollagerResult},
    fit::{centered_offset, fit_work_area},
    layout::{self, GridLayoutState},
    resize::{self, Divider},
    template::Template,
};

/// Where the layout state machine currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutPhase {
    /// No template selected yet; nothing can be laid out.
    Uninitialized,
    /// A grid exists and is at rest.
    Initialized,
    /// A divider drag is live; raw splits are committed per move.
    Resizing,
    /// The post-drag bounds pass is running.
    Normalizing,
}

/// Immutable layout capture handed to the compositor.
///
/// Owned and `Send`, so a render can run on another thread while the editor
/// keeps mutating; each render sees exactly one frozen layout.
#[derive(Clone, Debug)]
pub struct LayoutSnapshot {
    pub work_area: Size,
    pub cell_rects: Vec<Rect>,
}

struct ActiveGrid {
    template: Template,
    state: GridLayoutState,
    dividers: Vec<Divider>,
}

struct DragState {
    divider: Divider,
    initial_ratio: f64,
}

/// The editing surface: single owner of the grid layout state and the only
/// writer of its shared track arrays.
///
/// All mutation goes through the methods here, synchronously, so every
/// pointer-move sees the result of the previous one. Reads (`cell_rect`,
/// `divider_position`) derive from the current state and are never stored.
pub struct CollageEditor {
    container: Size,
    aspect_ratio: AspectRatio,
    inner_margin: f64,
    grid: Option<ActiveGrid>,
    drag: Option<DragState>,
    phase: LayoutPhase,
}

impl CollageEditor {
    pub fn new(
        container: Size,
        aspect_ratio: AspectRatio,
        inner_margin: f64,
    ) -> CollagerResult<Self> {
        if !(container.width > 0.0 && container.height > 0.0) {
            return Err(CollagerError::validation(
                "editor container must have positive width and height",
            ));
        }
        if !inner_margin.is_finite() || inner_margin < 0.0 {
            return Err(CollagerError::validation(
                "inner margin must be finite and >= 0",
            ));
        }
        Ok(Self {
            container,
            aspect_ratio,
            inner_margin,
            grid: None,
            drag: None,
            phase: LayoutPhase::Uninitialized,
        })
    }

    /// Select a template: seeds fresh equal-share tracks and rebuilds the
    /// divider set. An invalid template leaves any previous grid untouched.
    pub fn set_template(&mut self, template: Template) -> CollagerResult<()> {
        template.validate()?;
        let work_area = self.fitted_work_area();
        let state =
            GridLayoutState::seeded(&template, work_area, self.inner_margin, self.aspect_ratio);
        let dividers = resize::find_dividers(&template);
        self.grid = Some(ActiveGrid {
            template,
            state,
            dividers,
        });
        self.drag = None;
        self.phase = LayoutPhase::Initialized;
        Ok(())
    }

    /// Switch the target ratio, rescaling existing tracks so manual splits
    /// survive. Never reseeds.
    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.aspect_ratio = ratio;
        self.reconfigure_grid();
    }

    /// Change the gap between cells, rescaling existing tracks into the new
    /// work area. The outer margin follows as `max(inner, 8)`.
    pub fn set_inner_margin(&mut self, margin: f64) -> CollagerResult<()> {
        if !margin.is_finite() || margin < 0.0 {
            return Err(CollagerError::validation(
                "inner margin must be finite and >= 0",
            ));
        }
        self.inner_margin = margin;
        self.reconfigure_grid();
        Ok(())
    }

    /// Redistribute the shared size of two adjacent cells so cell A holds
    /// `ratio` of it, then run the bounds pass.
    ///
    /// `Ok(false)` means the split would violate the minimum cell size and
    /// nothing changed. Unknown or non-adjacent pairs are caller errors.
    pub fn adjust_ratio(
        &mut self,
        cell_a: usize,
        cell_b: usize,
        ratio: f64,
    ) -> CollagerResult<bool> {
        let divider = self.established_divider(cell_a, cell_b)?;
        let grid = self.grid.as_mut().ok_or_else(no_template)?;
        let applied = resize::apply_ratio(&grid.template, &mut grid.state, divider, ratio)?;
        if applied {
            grid.state.normalize();
        }
        Ok(applied)
    }

    /// Start a live drag on the divider between two adjacent cells.
    pub fn begin_divider_drag(&mut self, cell_a: usize, cell_b: usize) -> CollagerResult<()> {
        if self.phase == LayoutPhase::Resizing {
            return Err(CollagerError::layout("a divider drag is already active"));
        }
        let divider = self.established_divider(cell_a, cell_b)?;
        let grid = self.grid.as_ref().ok_or_else(no_template)?;
        let initial_ratio = resize::current_ratio(&grid.template, &grid.state, divider)?;
        self.drag = Some(DragState {
            divider,
            initial_ratio,
        });
        self.phase = LayoutPhase::Resizing;
        Ok(())
    }

    /// Feed a pointer displacement (from the drag origin, along the divider's
    /// axis) into the live drag. Commits the mapped split immediately so the
    /// next move event sees it; skips the bounds pass until the drag ends.
    pub fn drag_divider_to(&mut self, delta: f64) -> CollagerResult<bool> {
        let drag = self
            .drag
            .as_ref()
            .ok_or_else(|| CollagerError::layout("no divider drag in progress"))?;
        let divider = drag.divider;
        let initial_ratio = drag.initial_ratio;
        let grid = self.grid.as_mut().ok_or_else(no_template)?;
        let extent = grid.state.extent(divider.axis);
        let ratio = resize::drag_ratio(initial_ratio, delta, extent);
        resize::apply_ratio(&grid.template, &mut grid.state, divider, ratio)
    }

    /// Finish the live drag: run the bounds-normalization pass and settle.
    pub fn end_divider_drag(&mut self) -> CollagerResult<()> {
        if self.drag.take().is_none() {
            return Err(CollagerError::layout("no divider drag in progress"));
        }
        self.phase = LayoutPhase::Normalizing;
        if let Some(grid) = self.grid.as_mut() {
            grid.state.normalize();
        }
        self.phase = LayoutPhase::Initialized;
        Ok(())
    }

    /// Current derived rectangle for one cell, relative to the work area.
    pub fn cell_rect(&self, index: usize) -> CollagerResult<Rect> {
        let rects = self.cell_rects()?;
        rects.get(index).copied().ok_or_else(|| {
            CollagerError::layout(format!("cell index {index} out of range ({})", rects.len()))
        })
    }

    /// Rectangles for every cell, in template order.
    pub fn cell_rects(&self) -> CollagerResult<Vec<Rect>> {
        let grid = self.grid.as_ref().ok_or_else(no_template)?;
        layout::cell_rects(&grid.template, &grid.state)
    }

    /// Established dividers for the active template (empty when none is set).
    pub fn dividers(&self) -> &[Divider] {
        self.grid.as_ref().map(|g| g.dividers.as_slice()).unwrap_or(&[])
    }

    /// Midline coordinate of the divider between two cells, along its axis.
    pub fn divider_position(&self, cell_a: usize, cell_b: usize) -> CollagerResult<f64> {
        let divider = self.established_divider(cell_a, cell_b)?;
        let rects = self.cell_rects()?;
        resize::divider_midline(divider, &rects)
    }

    /// Freeze the current layout for a render.
    pub fn snapshot(&self) -> CollagerResult<LayoutSnapshot> {
        let grid = self.grid.as_ref().ok_or_else(no_template)?;
        Ok(LayoutSnapshot {
            work_area: grid.state.work_area,
            cell_rects: layout::cell_rects(&grid.template, &grid.state)?,
        })
    }

    pub fn phase(&self) -> LayoutPhase {
        self.phase
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn inner_margin(&self) -> f64 {
        self.inner_margin
    }

    pub fn template(&self) -> Option<&Template> {
        self.grid.as_ref().map(|g| &g.template)
    }

    pub fn layout_state(&self) -> Option<&GridLayoutState> {
        self.grid.as_ref().map(|g| &g.state)
    }

    /// Top-left of the work area inside the container (the caller-centered
    /// placement of the fitted size).
    pub fn work_area_origin(&self) -> Vec2 {
        let work = self
            .grid
            .as_ref()
            .map(|g| g.state.work_area)
            .unwrap_or_else(|| self.fitted_work_area());
        centered_offset(self.container, work)
    }

    fn fitted_work_area(&self) -> Size {
        let outer = layout::outer_margin_for(self.inner_margin);
        fit_work_area(self.container, outer, self.aspect_ratio)
    }

    fn reconfigure_grid(&mut self) {
        let work_area = self.fitted_work_area();
        let inner = self.inner_margin;
        let ratio = self.aspect_ratio;
        if let Some(grid) = self.grid.as_mut() {
            grid.state.reconfigure(work_area, inner, ratio);
        }
    }

    fn established_divider(&self, cell_a: usize, cell_b: usize) -> CollagerResult<Divider> {
        let grid = self.grid.as_ref().ok_or_else(no_template)?;
        resize::divider_between(&grid.dividers, cell_a, cell_b).ok_or_else(|| {
            CollagerError::layout(format!(
                "cells {cell_a} and {cell_b} are not an adjacent resizable pair"
            ))
        })
    }
}

fn no_template() -> CollagerError {
    CollagerError::config("no template set")
}
