use crate::{
    core::{Rgba8, Size},
    error::{CollagerError, CollagerResult},
};

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape and lay out plain text using provided font bytes and styling.
    pub fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: Rgba8,
        max_width_px: Option<f32>,
    ) -> CollagerResult<parley::Layout<Rgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CollagerError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CollagerError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CollagerError::validation("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        if let Some(w) = max_width_px {
            layout.break_all_lines(Some(w));
            layout.align(
                Some(w),
                parley::Alignment::Start,
                parley::AlignmentOptions::default(),
            );
        } else {
            layout.break_all_lines(None);
        }

        Ok(layout)
    }
}

/// Intrinsic size of a built layout: widest line advance by summed line
/// heights, floored at one unit each way so degenerate text stays drawable.
pub fn measured_size(layout: &parley::Layout<Rgba8>) -> Size {
    let mut w = 0.0f64;
    let mut h = 0.0f64;
    for line in layout.lines() {
        let m = line.metrics();
        w = w.max(f64::from(m.advance));
        h += f64::from(m.ascent + m.descent + m.leading);
    }
    Size::new(w.max(1.0), h.max(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_size() {
        let mut engine = TextLayoutEngine::new();
        assert!(engine.layout_plain("hi", &[], 0.0, Rgba8::white(), None).is_err());
        assert!(
            engine
                .layout_plain("hi", &[], f32::NAN, Rgba8::white(), None)
                .is_err()
        );
    }

    #[test]
    fn rejects_unusable_font_bytes() {
        let mut engine = TextLayoutEngine::new();
        let err = engine
            .layout_plain("hi", b"not a font", 16.0, Rgba8::white(), None)
            .map(|_| ())
            .unwrap_err();
        assert!(err.to_string().contains("font"));
    }

    #[test]
    fn measured_size_of_empty_layout_is_floored() {
        let layout: parley::Layout<Rgba8> = parley::Layout::new();
        let size = measured_size(&layout);
        assert_eq!((size.width, size.height), (1.0, 1.0));
    }
}
