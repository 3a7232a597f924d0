use crate::{
    assets::{AssetStore, PreparedAsset},
    assets::text,
    core::{Affine, Point, Rect, Rgba8, RoundedRect, Size, Vec2},
    editor::LayoutSnapshot,
    error::{CollagerError, CollagerResult},
    fit::centered_offset,
    scene::{Background, CollageScene, OverlayContent, OverlayLayer},
};

/// Edit-space to output-space mapping: one uniform scale plus a centering
/// offset, shared by every cell and overlay in a render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputMapping {
    pub scale: f64,
    pub offset: Vec2,
}

impl OutputMapping {
    pub fn new(output: Size, edit: Size) -> Self {
        let scale = (output.width / edit.width).min(output.height / edit.height);
        let scaled = Size::new(edit.width * scale, edit.height * scale);
        Self {
            scale,
            offset: centered_offset(output, scaled),
        }
    }

    pub fn map_point(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.offset.x, p.y * self.scale + self.offset.y)
    }

    pub fn map_rect(&self, r: Rect) -> Rect {
        Rect::new(
            r.x0 * self.scale + self.offset.x,
            r.y0 * self.scale + self.offset.y,
            r.x1 * self.scale + self.offset.x,
            r.y1 * self.scale + self.offset.y,
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub enum BackgroundOp {
    /// Flood the whole output with one color.
    Fill(Rgba8),
    /// Stretch an image to cover the whole output, ratio not preserved.
    Image(crate::assets::AssetId),
}

#[derive(Clone, Debug)]
pub enum DrawOp {
    /// One cell's photo: clipped to the mapped rounded cell rect, content
    /// transform and aspect-fill baked into `transform`.
    CellImage {
        asset: crate::assets::AssetId,
        clip: RoundedRect,
        transform: Affine,
    },
    Text {
        asset: crate::assets::AssetId,
        transform: Affine,
    },
    Sticker {
        asset: crate::assets::AssetId,
        transform: Affine,
    },
}

/// Backend-agnostic description of one final render: output dimensions,
/// background, then draw ops in z-order (cells in template order, text
/// overlays, sticker overlays).
#[derive(Clone, Debug)]
pub struct RenderPlan {
    pub width: u32,
    pub height: u32,
    pub background: BackgroundOp,
    pub ops: Vec<DrawOp>,
}

/// Map the frozen layout and the scene content into a [`RenderPlan`] at
/// `output_width` pixels. Every asset reference is resolved here, so a plan
/// that builds successfully cannot fail a lookup mid-draw.
#[tracing::instrument(skip(snapshot, scene, store))]
pub fn build_plan(
    snapshot: &LayoutSnapshot,
    scene: &CollageScene,
    store: &AssetStore,
    output_width: u32,
) -> CollagerResult<RenderPlan> {
    if output_width == 0 {
        return Err(CollagerError::validation("output width must be > 0"));
    }
    let edit = snapshot.work_area;
    if !(edit.width > 0.0 && edit.height > 0.0) {
        return Err(CollagerError::render(
            "work area is empty, nothing to render",
        ));
    }
    if scene.cells.len() != snapshot.cell_rects.len() {
        return Err(CollagerError::validation(format!(
            "scene has {} cell slots, layout has {} cells",
            scene.cells.len(),
            snapshot.cell_rects.len()
        )));
    }

    let width = output_width;
    let height = ((f64::from(width) * edit.height / edit.width).round() as u32).max(1);
    let mapping = OutputMapping::new(Size::new(f64::from(width), f64::from(height)), edit);

    let background = match scene.background {
        Background::White => BackgroundOp::Fill(Rgba8::white()),
        Background::Color(c) => BackgroundOp::Fill(c),
        Background::Image(id) => match store.get(id)? {
            PreparedAsset::Image(_) => BackgroundOp::Image(id),
            PreparedAsset::Text(_) => {
                return Err(CollagerError::render(
                    "background asset must be an image",
                ));
            }
        },
    };

    let mut ops = Vec::new();
    for (idx, (slot, rect)) in scene.cells.iter().zip(&snapshot.cell_rects).enumerate() {
        let Some(content) = slot else {
            continue; // empty cells leave the background showing through
        };
        let image = match store.get(content.image)? {
            PreparedAsset::Image(i) => i,
            PreparedAsset::Text(_) => {
                return Err(CollagerError::render(format!(
                    "cell {idx} content must be an image asset"
                )));
            }
        };

        let mapped = mapping.map_rect(*rect);
        let clip = RoundedRect::from_rect(mapped, scene.corner_radius * mapping.scale);
        let fill = aspect_fill_scale(mapped.size(), image.width, image.height);
        let t = content.transform;
        let center = mapping.map_point(rect.center()) + t.translation * mapping.scale;
        let transform = Affine::translate(center.to_vec2())
            * Affine::rotate(t.rotation)
            * Affine::scale(t.scale * fill)
            * Affine::translate(Vec2::new(
                -0.5 * f64::from(image.width),
                -0.5 * f64::from(image.height),
            ));
        ops.push(DrawOp::CellImage {
            asset: content.image,
            clip,
            transform,
        });
    }

    // Overlay z-order is fixed: every text layer first, stickers after.
    for layer in &scene.overlays {
        if matches!(layer.content, OverlayContent::Text(_)) {
            ops.push(overlay_op(layer, &mapping, store)?);
        }
    }
    for layer in &scene.overlays {
        if matches!(layer.content, OverlayContent::Sticker(_)) {
            ops.push(overlay_op(layer, &mapping, store)?);
        }
    }

    Ok(RenderPlan {
        width,
        height,
        background,
        ops,
    })
}

fn overlay_op(
    layer: &OverlayLayer,
    mapping: &OutputMapping,
    store: &AssetStore,
) -> CollagerResult<DrawOp> {
    let (asset, content_size) = match layer.content {
        OverlayContent::Text(id) => match store.get(id)? {
            PreparedAsset::Text(t) => (id, text::measured_size(&t.layout)),
            PreparedAsset::Image(_) => {
                return Err(CollagerError::render(
                    "text overlay asset must be a prepared text layout",
                ));
            }
        },
        OverlayContent::Sticker(id) => match store.get(id)? {
            PreparedAsset::Image(i) => {
                (id, Size::new(f64::from(i.width), f64::from(i.height)))
            }
            PreparedAsset::Text(_) => {
                return Err(CollagerError::render(
                    "sticker overlay asset must be an image",
                ));
            }
        },
    };

    let transform = Affine::translate(mapping.map_point(layer.center).to_vec2())
        * layer.transform
        * Affine::scale(mapping.scale)
        * Affine::translate(Vec2::new(-0.5 * content_size.width, -0.5 * content_size.height));

    Ok(match layer.content {
        OverlayContent::Text(_) => DrawOp::Text { asset, transform },
        OverlayContent::Sticker(_) => DrawOp::Sticker { asset, transform },
    })
}

/// Scale that makes a `width`x`height` image cover `target` completely.
fn aspect_fill_scale(target: Size, width: u32, height: u32) -> f64 {
    let w = f64::from(width).max(1.0);
    let h = f64::from(height).max(1.0);
    (target.width / w).max(target.height / h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{CellContent, ContentTransform};

    fn snapshot_384() -> LayoutSnapshot {
        LayoutSnapshot {
            work_area: Size::new(384.0, 384.0),
            cell_rects: vec![
                Rect::new(0.0, 0.0, 188.0, 188.0),
                Rect::new(196.0, 0.0, 384.0, 188.0),
                Rect::new(0.0, 196.0, 188.0, 384.0),
                Rect::new(196.0, 196.0, 384.0, 384.0),
            ],
        }
    }

    fn store_with_photo() -> (AssetStore, crate::assets::AssetId) {
        let mut store = AssetStore::new(".");
        let id = store.insert_image(100, 100, vec![255u8; 100 * 100 * 4]).unwrap();
        (store, id)
    }

    #[test]
    fn mapping_doubles_384_into_768() {
        let mapping = OutputMapping::new(Size::new(768.0, 768.0), Size::new(384.0, 384.0));
        assert_eq!(mapping.scale, 2.0);
        assert_eq!(mapping.offset, Vec2::ZERO);
        assert_eq!(mapping.map_point(Point::new(10.0, 20.0)), Point::new(20.0, 40.0));
        let r = mapping.map_rect(Rect::new(0.0, 0.0, 188.0, 188.0));
        assert_eq!(r, Rect::new(0.0, 0.0, 376.0, 376.0));
    }

    #[test]
    fn mapping_centers_when_output_is_wider() {
        let mapping = OutputMapping::new(Size::new(1000.0, 768.0), Size::new(384.0, 384.0));
        assert_eq!(mapping.scale, 2.0);
        assert_eq!(mapping.offset, Vec2::new(116.0, 0.0));
    }

    #[test]
    fn plan_skips_empty_cells() {
        let (store, id) = store_with_photo();
        let mut scene = CollageScene::empty(4);
        scene
            .set_cell(
                0,
                CellContent {
                    image: id,
                    transform: ContentTransform::default(),
                },
            )
            .unwrap();
        scene
            .set_cell(
                3,
                CellContent {
                    image: id,
                    transform: ContentTransform::default(),
                },
            )
            .unwrap();

        let plan = build_plan(&snapshot_384(), &scene, &store, 768).unwrap();
        assert_eq!((plan.width, plan.height), (768, 768));
        assert_eq!(plan.ops.len(), 2);
        assert!(matches!(plan.background, BackgroundOp::Fill(c) if c == Rgba8::white()));
    }

    #[test]
    fn default_transform_fills_mapped_cell() {
        let (store, id) = store_with_photo();
        let mut scene = CollageScene::empty(4);
        scene
            .set_cell(
                0,
                CellContent {
                    image: id,
                    transform: ContentTransform::default(),
                },
            )
            .unwrap();

        let plan = build_plan(&snapshot_384(), &scene, &store, 768).unwrap();
        let DrawOp::CellImage { clip, transform, .. } = &plan.ops[0] else {
            panic!("expected cell image op");
        };
        // Cell 0 maps to (0,0)-(376,376); a 100px image aspect-fills at 3.76
        // and its center lands on the rect center, so the top-left is origin.
        assert_eq!(clip.rect(), Rect::new(0.0, 0.0, 376.0, 376.0));
        let c = transform.as_coeffs();
        assert!((c[0] - 3.76).abs() < 1e-12);
        assert!((c[3] - 3.76).abs() < 1e-12);
        assert!(c[4].abs() < 1e-9 && c[5].abs() < 1e-9);
    }

    #[test]
    fn corner_radius_scales_with_output() {
        let (store, id) = store_with_photo();
        let mut scene = CollageScene::empty(4);
        scene.corner_radius = 6.0;
        scene
            .set_cell(
                0,
                CellContent {
                    image: id,
                    transform: ContentTransform::default(),
                },
            )
            .unwrap();

        let plan = build_plan(&snapshot_384(), &scene, &store, 768).unwrap();
        let DrawOp::CellImage { clip, .. } = &plan.ops[0] else {
            panic!("expected cell image op");
        };
        assert_eq!(clip.radii().top_left, 12.0);
    }

    #[test]
    fn sticker_overlay_maps_through_output_scale() {
        let (store, id) = store_with_photo();
        let scene = {
            let mut scene = CollageScene::empty(4);
            scene.push_overlay(OverlayLayer {
                center: Point::new(100.0, 100.0),
                transform: Affine::IDENTITY,
                content: OverlayContent::Sticker(id),
            });
            scene
        };
        let plan = build_plan(&snapshot_384(), &scene, &store, 768).unwrap();
        assert_eq!(plan.ops.len(), 1);
        assert!(matches!(plan.ops[0], DrawOp::Sticker { .. }));

        // Sticker centered at (100,100) in edit space lands at (200,200).
        let DrawOp::Sticker { transform, .. } = &plan.ops[0] else {
            unreachable!();
        };
        let c = transform.as_coeffs();
        assert!((c[4] - (200.0 - 100.0)).abs() < 1e-9);
        assert!((c[5] - (200.0 - 100.0)).abs() < 1e-9);
    }

    #[test]
    fn cell_count_mismatch_is_rejected() {
        let (store, _) = store_with_photo();
        let scene = CollageScene::empty(3);
        assert!(build_plan(&snapshot_384(), &scene, &store, 768).is_err());
    }

    #[test]
    fn unknown_background_image_fails_plan() {
        let (store, _) = store_with_photo();
        let mut scene = CollageScene::empty(4);
        scene.background = Background::Image(crate::assets::AssetId::from_u64(999));
        assert!(build_plan(&snapshot_384(), &scene, &store, 768).is_err());
    }

    #[test]
    fn zero_output_width_is_rejected() {
        let (store, _) = store_with_photo();
        let scene = CollageScene::empty(4);
        assert!(build_plan(&snapshot_384(), &scene, &store, 0).is_err());
    }
}
