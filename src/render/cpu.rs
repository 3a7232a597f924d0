use std::collections::HashMap;

use kurbo::Shape as _;

use crate::{
    assets::{AssetId, AssetStore, PreparedAsset},
    compose::{BackgroundOp, DrawOp, RenderPlan},
    error::{CollagerError, CollagerResult},
    render::{RasterFrame, RenderBackend},
};

/// Software compositor driving `vello_cpu`.
///
/// Image and font paints are cached per [`AssetId`], so rendering the same
/// scene at several output widths converts each asset once.
pub struct CpuBackend {
    image_cache: HashMap<AssetId, vello_cpu::Image>,
    font_cache: HashMap<AssetId, vello_cpu::peniko::FontData>,
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            image_cache: HashMap::new(),
            font_cache: HashMap::new(),
        }
    }
}

impl RenderBackend for CpuBackend {
    fn render_plan(
        &mut self,
        plan: &RenderPlan,
        assets: &AssetStore,
    ) -> CollagerResult<RasterFrame> {
        let width: u16 = plan
            .width
            .try_into()
            .map_err(|_| CollagerError::render("output width exceeds u16, no drawable surface"))?;
        let height: u16 = plan
            .height
            .try_into()
            .map_err(|_| CollagerError::render("output height exceeds u16, no drawable surface"))?;
        if width == 0 || height == 0 {
            return Err(CollagerError::render("output surface is empty"));
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        let mut ctx = vello_cpu::RenderContext::new(width, height);

        self.draw_background(&mut ctx, plan, assets)?;
        for op in &plan.ops {
            self.draw_op(&mut ctx, op, assets)?;
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(RasterFrame {
            width: plan.width,
            height: plan.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

impl CpuBackend {
    fn draw_background(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        plan: &RenderPlan,
        assets: &AssetStore,
    ) -> CollagerResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match plan.background {
            BackgroundOp::Fill(c) => {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(plan.width),
                    f64::from(plan.height),
                ));
            }
            BackgroundOp::Image(id) => {
                let paint = self.image_paint_for(id, assets)?;
                let (w, h) = image_paint_size(&paint)?;
                // Stretch to fill; the background never preserves its ratio.
                let stretch = crate::core::Affine::scale_non_uniform(
                    f64::from(plan.width) / w,
                    f64::from(plan.height) / h,
                );
                ctx.set_transform(affine_to_cpu(stretch));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            }
        }
        Ok(())
    }

    fn draw_op(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        op: &DrawOp,
        assets: &AssetStore,
    ) -> CollagerResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match op {
            DrawOp::CellImage {
                asset,
                clip,
                transform,
            } => {
                let paint = self.image_paint_for(*asset, assets)?;
                let (w, h) = image_paint_size(&paint)?;

                // The clip is already in output coordinates; the content
                // transform applies only inside it.
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.push_clip_layer(&bezpath_to_cpu(&clip.to_path(0.1)));
                ctx.set_transform(affine_to_cpu(*transform));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                ctx.pop_layer();
                Ok(())
            }
            DrawOp::Sticker { asset, transform } => {
                let paint = self.image_paint_for(*asset, assets)?;
                let (w, h) = image_paint_size(&paint)?;

                ctx.set_transform(affine_to_cpu(*transform));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                Ok(())
            }
            DrawOp::Text { asset, transform } => {
                let prepared = assets.get(*asset)?;
                let PreparedAsset::Text(t) = prepared else {
                    return Err(CollagerError::render("AssetId is not a PreparedText"));
                };

                let font = self.font_for_text_asset(*asset, assets)?;
                ctx.set_transform(affine_to_cpu(*transform));

                for line in t.layout.lines() {
                    for item in line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };

                        let brush = run.style().brush;
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                            brush.r, brush.g, brush.b, brush.a,
                        ));

                        let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        });
                        ctx.glyph_run(&font)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }
                Ok(())
            }
        }
    }

    fn image_paint_for(
        &mut self,
        id: AssetId,
        assets: &AssetStore,
    ) -> CollagerResult<vello_cpu::Image> {
        if let Some(paint) = self.image_cache.get(&id) {
            return Ok(paint.clone());
        }

        let prepared = assets.get(id)?;
        let PreparedAsset::Image(img) = prepared else {
            return Err(CollagerError::render("AssetId is not a PreparedImage"));
        };

        let pixmap =
            image_premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.image_cache.insert(id, paint.clone());
        Ok(paint)
    }

    fn font_for_text_asset(
        &mut self,
        id: AssetId,
        assets: &AssetStore,
    ) -> CollagerResult<vello_cpu::peniko::FontData> {
        if let Some(font) = self.font_cache.get(&id) {
            return Ok(font.clone());
        }

        let prepared = assets.get(id)?;
        let PreparedAsset::Text(t) = prepared else {
            return Err(CollagerError::render("AssetId is not a PreparedText"));
        };

        let font_bytes = t.font_bytes.as_ref().clone();
        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        self.font_cache.insert(id, font.clone());
        Ok(font)
    }
}

fn affine_to_cpu(a: crate::core::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: crate::core::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &crate::core::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> CollagerResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CollagerError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CollagerError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(CollagerError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn image_paint_size(image: &vello_cpu::Image) -> CollagerResult<(f64, f64)> {
    match &image.image {
        vello_cpu::ImageSource::Pixmap(p) => Ok((f64::from(p.width()), f64::from(p.height()))),
        vello_cpu::ImageSource::OpaqueId(_) => Err(CollagerError::render(
            "cpu backend does not support opaque image ids",
        )),
    }
}
