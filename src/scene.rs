use crate::{
    assets::AssetId,
    core::{Affine, Point, Rgba8, Vec2},
    error::{CollagerError, CollagerResult},
};

/// Placement of a photo inside its cell, owned by the content-editing layer.
/// The layout engine never writes these; they ride through every re-layout
/// untouched and are only read when compositing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContentTransform {
    pub scale: f64,
    pub rotation: f64, // radians
    pub translation: Vec2,
}

impl Default for ContentTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: 0.0,
            translation: Vec2::ZERO,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellContent {
    pub image: AssetId,
    pub transform: ContentTransform,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayContent {
    Text(AssetId),
    Sticker(AssetId),
}

/// A free-floating layer above the grid, positioned in work-area coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayLayer {
    pub center: Point,
    pub transform: Affine,
    pub content: OverlayContent,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Background {
    #[default]
    White,
    Color(Rgba8),
    Image(AssetId),
}

/// Everything the compositor reads besides the layout snapshot: background,
/// per-cell content (indexed like the template's cells, `None` = empty slot),
/// and the ordered overlay stack.
#[derive(Clone, Debug, Default)]
pub struct CollageScene {
    pub background: Background,
    pub corner_radius: f64,
    pub cells: Vec<Option<CellContent>>,
    pub overlays: Vec<OverlayLayer>,
}

impl CollageScene {
    /// Scene with `cell_count` empty slots, a white background, and square
    /// corners.
    pub fn empty(cell_count: usize) -> Self {
        Self {
            background: Background::White,
            corner_radius: 0.0,
            cells: vec![None; cell_count],
            overlays: Vec::new(),
        }
    }

    pub fn set_cell(&mut self, index: usize, content: CellContent) -> CollagerResult<()> {
        let len = self.cells.len();
        let slot = self.cells.get_mut(index).ok_or_else(|| {
            CollagerError::validation(format!("cell index {index} out of range ({len})"))
        })?;
        *slot = Some(content);
        Ok(())
    }

    pub fn clear_cell(&mut self, index: usize) -> CollagerResult<()> {
        let len = self.cells.len();
        let slot = self.cells.get_mut(index).ok_or_else(|| {
            CollagerError::validation(format!("cell index {index} out of range ({len})"))
        })?;
        *slot = None;
        Ok(())
    }

    pub fn push_overlay(&mut self, layer: OverlayLayer) {
        self.overlays.push(layer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scene_has_vacant_slots() {
        let scene = CollageScene::empty(4);
        assert_eq!(scene.cells.len(), 4);
        assert!(scene.cells.iter().all(Option::is_none));
        assert_eq!(scene.background, Background::White);
        assert_eq!(scene.corner_radius, 0.0);
    }

    #[test]
    fn set_and_clear_cell_bounds_checked() {
        let mut scene = CollageScene::empty(2);
        let content = CellContent {
            image: AssetId::from_u64(1),
            transform: ContentTransform::default(),
        };
        scene.set_cell(1, content).unwrap();
        assert!(scene.cells[1].is_some());
        assert!(scene.set_cell(2, content).is_err());
        scene.clear_cell(1).unwrap();
        assert!(scene.cells[1].is_none());
        assert!(scene.clear_cell(9).is_err());
    }

    #[test]
    fn default_transform_is_identity_placement() {
        let t = ContentTransform::default();
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.rotation, 0.0);
        assert_eq!(t.translation, Vec2::ZERO);
    }
}
