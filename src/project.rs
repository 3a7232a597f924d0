use std::path::Path;

use crate::{
    assets::AssetStore,
    core::{Affine, AspectRatio, Point, Rgba8, Size, Vec2},
    editor::CollageEditor,
    error::{CollagerError, CollagerResult},
    resize,
    scene::{
        Background, CellContent, CollageScene, ContentTransform, OverlayContent, OverlayLayer,
    },
    template::TemplateCatalog,
};

fn default_container() -> Size {
    Size::new(1024.0, 1024.0)
}

fn default_inner_margin() -> f64 {
    8.0
}

fn default_scale() -> f64 {
    1.0
}

fn default_text_color() -> Rgba8 {
    Rgba8::opaque(0, 0, 0)
}

/// Serialized collage project: everything needed to rebuild an editing
/// session and render it, with asset sources as store-relative paths.
///
/// Divider moves are recorded as the committed ratios, replayed in order on
/// load; a ratio the minimum-size rule rejects is skipped, same as it would
/// have been live.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CollageDoc {
    /// Id of a catalog template.
    pub template: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    /// Edit-space container the work area is fitted into.
    #[serde(default = "default_container")]
    pub container: Size,
    #[serde(default = "default_inner_margin")]
    pub inner_margin: f64,
    #[serde(default)]
    pub corner_radius: f64,
    #[serde(default)]
    pub background: BackgroundSpec,
    /// One entry per leading template cell; trailing cells default to empty.
    #[serde(default)]
    pub cells: Vec<CellSpec>,
    #[serde(default)]
    pub overlays: Vec<OverlaySpec>,
    #[serde(default)]
    pub adjustments: Vec<AdjustmentSpec>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundSpec {
    #[default]
    White,
    Color(Rgba8),
    Image(String),
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CellSpec {
    /// Store-relative photo path; `None` leaves the cell empty.
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub transform: TransformSpec,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TransformSpec {
    pub scale: f64,
    pub rotation_deg: f64,
    pub translation: Vec2,
}

impl Default for TransformSpec {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_deg: 0.0,
            translation: Vec2::ZERO,
        }
    }
}

impl TransformSpec {
    fn to_content_transform(self) -> ContentTransform {
        ContentTransform {
            scale: self.scale,
            rotation: self.rotation_deg.to_radians(),
            translation: self.translation,
        }
    }

    fn is_finite(self) -> bool {
        self.scale.is_finite()
            && self.rotation_deg.is_finite()
            && self.translation.x.is_finite()
            && self.translation.y.is_finite()
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlaySpec {
    Text {
        text: String,
        /// Store-relative font file path.
        font: String,
        size_px: f32,
        #[serde(default = "default_text_color")]
        color: Rgba8,
        #[serde(default)]
        max_width_px: Option<f32>,
        center: Point,
        #[serde(default)]
        rotation_deg: f64,
        #[serde(default = "default_scale")]
        scale: f64,
    },
    Sticker {
        /// Store-relative image path.
        source: String,
        center: Point,
        #[serde(default)]
        rotation_deg: f64,
        #[serde(default = "default_scale")]
        scale: f64,
    },
}

/// One recorded divider move: give `cell_a` this share of the pair's size.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AdjustmentSpec {
    pub cell_a: usize,
    pub cell_b: usize,
    pub ratio: f64,
}

impl CollageDoc {
    pub fn validate(&self) -> CollagerResult<()> {
        let catalog = TemplateCatalog::builtin();
        let template = catalog.get(&self.template).ok_or_else(|| {
            CollagerError::validation(format!("unknown template '{}'", self.template))
        })?;

        if !(self.container.width > 0.0 && self.container.height > 0.0)
            || !self.container.width.is_finite()
            || !self.container.height.is_finite()
        {
            return Err(CollagerError::validation(
                "container must have positive finite width and height",
            ));
        }
        if !self.inner_margin.is_finite() || self.inner_margin < 0.0 {
            return Err(CollagerError::validation(
                "inner_margin must be finite and >= 0",
            ));
        }
        if !self.corner_radius.is_finite() || self.corner_radius < 0.0 {
            return Err(CollagerError::validation(
                "corner_radius must be finite and >= 0",
            ));
        }

        if self.cells.len() > template.cells.len() {
            return Err(CollagerError::validation(format!(
                "doc has {} cell entries, template '{}' has {} cells",
                self.cells.len(),
                self.template,
                template.cells.len()
            )));
        }
        for (idx, cell) in self.cells.iter().enumerate() {
            if !cell.transform.is_finite() || cell.transform.scale <= 0.0 {
                return Err(CollagerError::validation(format!(
                    "cell {idx}: transform must be finite with scale > 0"
                )));
            }
        }

        for (idx, overlay) in self.overlays.iter().enumerate() {
            validate_overlay(idx, overlay)?;
        }

        let dividers = resize::find_dividers(template);
        for (idx, adj) in self.adjustments.iter().enumerate() {
            if !adj.ratio.is_finite() || !(0.0..=1.0).contains(&adj.ratio) {
                return Err(CollagerError::validation(format!(
                    "adjustment {idx}: ratio must be within [0, 1]"
                )));
            }
            if resize::divider_between(&dividers, adj.cell_a, adj.cell_b).is_none() {
                return Err(CollagerError::validation(format!(
                    "adjustment {idx}: cells {} and {} are not an adjacent pair of template '{}'",
                    adj.cell_a, adj.cell_b, self.template
                )));
            }
        }
        Ok(())
    }
}

fn validate_overlay(idx: usize, overlay: &OverlaySpec) -> CollagerResult<()> {
    match overlay {
        OverlaySpec::Text {
            text,
            font,
            size_px,
            center,
            rotation_deg,
            scale,
            ..
        } => {
            if text.is_empty() {
                return Err(CollagerError::validation(format!(
                    "overlay {idx}: text must be non-empty"
                )));
            }
            if font.trim().is_empty() {
                return Err(CollagerError::validation(format!(
                    "overlay {idx}: font path must be non-empty"
                )));
            }
            if !size_px.is_finite() || *size_px <= 0.0 {
                return Err(CollagerError::validation(format!(
                    "overlay {idx}: size_px must be finite and > 0"
                )));
            }
            validate_placement(idx, *center, *rotation_deg, *scale)
        }
        OverlaySpec::Sticker {
            source,
            center,
            rotation_deg,
            scale,
        } => {
            if source.trim().is_empty() {
                return Err(CollagerError::validation(format!(
                    "overlay {idx}: sticker source must be non-empty"
                )));
            }
            validate_placement(idx, *center, *rotation_deg, *scale)
        }
    }
}

fn validate_placement(idx: usize, center: Point, rotation_deg: f64, scale: f64) -> CollagerResult<()> {
    if !center.x.is_finite() || !center.y.is_finite() || !rotation_deg.is_finite() {
        return Err(CollagerError::validation(format!(
            "overlay {idx}: placement must be finite"
        )));
    }
    if !scale.is_finite() || scale <= 0.0 {
        return Err(CollagerError::validation(format!(
            "overlay {idx}: scale must be finite and > 0"
        )));
    }
    Ok(())
}

/// Rebuild a live editing session from a document: editor with adjustments
/// replayed, scene with all content resolved, and the store holding every
/// prepared asset.
pub fn instantiate(
    doc: &CollageDoc,
    assets_root: &Path,
) -> CollagerResult<(CollageEditor, CollageScene, AssetStore)> {
    doc.validate()?;

    let catalog = TemplateCatalog::builtin();
    let template = catalog
        .get(&doc.template)
        .ok_or_else(|| CollagerError::validation(format!("unknown template '{}'", doc.template)))?
        .clone();
    let cell_count = template.cells.len();

    let mut editor = CollageEditor::new(doc.container, doc.aspect_ratio, doc.inner_margin)?;
    editor.set_template(template)?;
    for adj in &doc.adjustments {
        if !editor.adjust_ratio(adj.cell_a, adj.cell_b, adj.ratio)? {
            tracing::debug!(
                cell_a = adj.cell_a,
                cell_b = adj.cell_b,
                ratio = adj.ratio,
                "recorded ratio adjustment rejected by minimum cell size, skipping"
            );
        }
    }

    let mut store = AssetStore::new(assets_root);
    let mut scene = CollageScene::empty(cell_count);
    scene.corner_radius = doc.corner_radius;
    scene.background = match &doc.background {
        BackgroundSpec::White => Background::White,
        BackgroundSpec::Color(c) => Background::Color(*c),
        BackgroundSpec::Image(source) => Background::Image(store.load_image(source)?),
    };

    for (idx, spec) in doc.cells.iter().enumerate() {
        let Some(photo) = &spec.photo else {
            continue;
        };
        let image = store.load_image(photo)?;
        scene.set_cell(
            idx,
            CellContent {
                image,
                transform: spec.transform.to_content_transform(),
            },
        )?;
    }

    for overlay in &doc.overlays {
        let (content, center, rotation_deg, scale) = match overlay {
            OverlaySpec::Text {
                text,
                font,
                size_px,
                color,
                max_width_px,
                center,
                rotation_deg,
                scale,
            } => {
                let id = store.prepare_text(text, font, *size_px, *color, *max_width_px)?;
                (OverlayContent::Text(id), *center, *rotation_deg, *scale)
            }
            OverlaySpec::Sticker {
                source,
                center,
                rotation_deg,
                scale,
            } => {
                let id = store.load_image(source)?;
                (OverlayContent::Sticker(id), *center, *rotation_deg, *scale)
            }
        };
        scene.push_overlay(OverlayLayer {
            center,
            transform: Affine::rotate(rotation_deg.to_radians()) * Affine::scale(scale),
            content,
        });
    }

    Ok((editor, scene, store))
}
