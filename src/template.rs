use crate::{
    core::Axis,
    error::{CollagerError, CollagerResult},
};

/// Grid coordinate of a cell's top-left unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CellPosition {
    pub column: usize,
    pub row: usize,
}

/// Declared override making a cell cover extra adjacent grid units along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub axis: Axis,
    pub extra: usize, // additional units beyond the cell's own, must be > 0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TemplateCell {
    pub position: CellPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl TemplateCell {
    fn at(column: usize, row: usize) -> Self {
        Self {
            position: CellPosition { column, row },
            span: None,
        }
    }

    fn spanning(column: usize, row: usize, axis: Axis, extra: usize) -> Self {
        Self {
            position: CellPosition { column, row },
            span: Some(Span { axis, extra }),
        }
    }

    /// Number of column units this cell covers.
    pub fn column_extent(&self) -> usize {
        match self.span {
            Some(Span {
                axis: Axis::Columns,
                extra,
            }) => extra + 1,
            _ => 1,
        }
    }

    /// Number of row units this cell covers.
    pub fn row_extent(&self) -> usize {
        match self.span {
            Some(Span {
                axis: Axis::Rows,
                extra,
            }) => extra + 1,
            _ => 1,
        }
    }
}

/// Named, immutable arrangement of cells on an integer grid.
///
/// Column and row counts are derived from the cells, spans included. Cell
/// order is the template's declared order and defines cell indices everywhere
/// else (content slots, divider pairs, render order).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub cells: Vec<TemplateCell>,
}

impl Template {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cells: Vec<TemplateCell>,
    ) -> CollagerResult<Self> {
        let template = Self {
            id: id.into(),
            name: name.into(),
            cells,
        };
        template.validate()?;
        Ok(template)
    }

    /// Derived column count: one past the rightmost covered column unit.
    pub fn columns(&self) -> usize {
        self.cells
            .iter()
            .map(|c| c.position.column + c.column_extent())
            .max()
            .unwrap_or(0)
    }

    /// Derived row count: one past the bottommost covered row unit.
    pub fn rows(&self) -> usize {
        self.cells
            .iter()
            .map(|c| c.position.row + c.row_extent())
            .max()
            .unwrap_or(0)
    }

    /// Whether any cell declares a span override.
    pub fn has_span(&self) -> bool {
        self.cells.iter().any(|c| c.span.is_some())
    }

    /// Check structural soundness: non-empty identity and cell list, positive
    /// span extents, and cells tiling the derived grid exactly (no overlap,
    /// no hole).
    pub fn validate(&self) -> CollagerResult<()> {
        if self.id.trim().is_empty() {
            return Err(CollagerError::validation("template id must be non-empty"));
        }
        if self.name.trim().is_empty() {
            return Err(CollagerError::validation("template name must be non-empty"));
        }
        if self.cells.is_empty() {
            return Err(CollagerError::validation(format!(
                "template '{}' must have at least one cell",
                self.id
            )));
        }
        for cell in &self.cells {
            if let Some(span) = cell.span {
                if span.extra == 0 {
                    return Err(CollagerError::validation(format!(
                        "template '{}' cell ({}, {}) declares a span with zero extra units",
                        self.id, cell.position.column, cell.position.row
                    )));
                }
            }
        }

        let columns = self.columns();
        let rows = self.rows();
        let mut covered = vec![false; columns * rows];
        for cell in &self.cells {
            for dc in 0..cell.column_extent() {
                for dr in 0..cell.row_extent() {
                    let column = cell.position.column + dc;
                    let row = cell.position.row + dr;
                    let unit = &mut covered[row * columns + column];
                    if *unit {
                        return Err(CollagerError::validation(format!(
                            "template '{}' covers grid unit ({column}, {row}) more than once",
                            self.id
                        )));
                    }
                    *unit = true;
                }
            }
        }
        if let Some(idx) = covered.iter().position(|c| !c) {
            return Err(CollagerError::validation(format!(
                "template '{}' leaves grid unit ({}, {}) uncovered",
                self.id,
                idx % columns,
                idx / columns
            )));
        }
        Ok(())
    }
}

/// Fixed registry of the built-in templates.
#[derive(Clone, Debug)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    /// Catalog of all built-in templates: uniform grids plus the four
    /// span specials.
    pub fn builtin() -> Self {
        Self {
            templates: vec![
                uniform_grid("single", "Single", 1, 1),
                uniform_grid("two-columns", "Two Columns", 2, 1),
                uniform_grid("three-columns", "Three Columns", 3, 1),
                uniform_grid("two-rows", "Two Rows", 1, 2),
                uniform_grid("three-rows", "Three Rows", 1, 3),
                uniform_grid("grid-4", "Grid 4", 2, 2),
                uniform_grid("grid-6", "Grid 6", 3, 2),
                uniform_grid("grid-9", "Grid 9", 3, 3),
                left_tall(),
                right_tall(),
                top_long(),
                bottom_long(),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn uniform_grid(id: &str, name: &str, columns: usize, rows: usize) -> Template {
    let mut cells = Vec::with_capacity(columns * rows);
    for row in 0..rows {
        for column in 0..columns {
            cells.push(TemplateCell::at(column, row));
        }
    }
    Template {
        id: id.to_string(),
        name: name.to_string(),
        cells,
    }
}

// The four span specials are all 2x2 grids with three cells, one of which
// covers two units along its declared axis.

fn left_tall() -> Template {
    Template {
        id: "left-tall".to_string(),
        name: "Left Tall".to_string(),
        cells: vec![
            TemplateCell::spanning(0, 0, Axis::Rows, 1),
            TemplateCell::at(1, 0),
            TemplateCell::at(1, 1),
        ],
    }
}

fn right_tall() -> Template {
    Template {
        id: "right-tall".to_string(),
        name: "Right Tall".to_string(),
        cells: vec![
            TemplateCell::at(0, 0),
            TemplateCell::spanning(1, 0, Axis::Rows, 1),
            TemplateCell::at(0, 1),
        ],
    }
}

fn top_long() -> Template {
    Template {
        id: "top-long".to_string(),
        name: "Top Long".to_string(),
        cells: vec![
            TemplateCell::spanning(0, 0, Axis::Columns, 1),
            TemplateCell::at(0, 1),
            TemplateCell::at(1, 1),
        ],
    }
}

fn bottom_long() -> Template {
    Template {
        id: "bottom-long".to_string(),
        name: "Bottom Long".to_string(),
        cells: vec![
            TemplateCell::at(0, 0),
            TemplateCell::at(1, 0),
            TemplateCell::spanning(0, 1, Axis::Columns, 1),
        ],
    }
}
