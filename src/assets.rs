pub mod text;

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::{
    core::Rgba8,
    error::{CollagerError, CollagerResult},
    math::Fnv1a64,
};

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone)]
/// Prepared text overlay: shaped layout plus backing font data.
pub struct PreparedText {
    /// Fully built text layout ready for rendering.
    pub layout: Arc<parley::Layout<Rgba8>>,
    /// Original font bytes used to build glyph outlines.
    pub font_bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for PreparedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedText")
            .field("layout_ptr", &Arc::as_ptr(&self.layout))
            .field("font_bytes_len", &self.font_bytes.len())
            .finish()
    }
}

#[derive(Clone, Debug)]
/// Union of prepared asset kinds consumed by the compositor and renderer.
pub enum PreparedAsset {
    /// Prepared bitmap image (photo or sticker).
    Image(PreparedImage),
    /// Prepared text layout.
    Text(PreparedText),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Stable hashed identifier for prepared assets.
pub struct AssetId(pub(crate) u64);

impl AssetId {
    /// Construct an [`AssetId`] from a raw 64-bit value.
    pub fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    /// Access the raw 64-bit identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Store of prepared assets, filled up front so the compositing stages stay
/// deterministic and IO-free.
///
/// Loading the same source path twice returns the cached id without decoding
/// again; in-memory inserts are content-addressed.
#[derive(Clone, Debug)]
pub struct AssetStore {
    root: PathBuf,
    ids_by_key: HashMap<String, AssetId>,
    assets_by_id: HashMap<AssetId, PreparedAsset>,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ids_by_key: HashMap::new(),
            assets_by_id: HashMap::new(),
        }
    }

    /// Root directory used when resolving relative asset paths.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Decode an image file under the store root. Photos and stickers share
    /// this path.
    pub fn load_image(&mut self, source: &str) -> CollagerResult<AssetId> {
        let norm_path = normalize_rel_path(source)?;
        if let Some(id) = self.ids_by_key.get(&norm_path) {
            return Ok(*id);
        }

        let mut hasher = Fnv1a64::new_default();
        hasher.write_u8(b'I');
        hasher.write_bytes(norm_path.as_bytes());
        let id = AssetId(hasher.finish());

        let bytes = self.read_bytes(&norm_path)?;
        let prepared = decode_image(&bytes)?;
        self.ids_by_key.insert(norm_path, id);
        self.assets_by_id.insert(id, PreparedAsset::Image(prepared));
        Ok(id)
    }

    /// Register an already-decoded straight-alpha RGBA8 image. The id is
    /// derived from the pixel content, so identical inserts dedupe.
    pub fn insert_image(
        &mut self,
        width: u32,
        height: u32,
        mut rgba8: Vec<u8>,
    ) -> CollagerResult<AssetId> {
        let expected = (width as usize) * (height as usize) * 4;
        if width == 0 || height == 0 || rgba8.len() != expected {
            return Err(CollagerError::validation(format!(
                "image buffer must be {width}x{height}x4 = {expected} bytes, got {}",
                rgba8.len()
            )));
        }

        let mut hasher = Fnv1a64::new_default();
        hasher.write_u8(b'M');
        hasher.write_u32(width);
        hasher.write_u32(height);
        hasher.write_bytes(&rgba8);
        let id = AssetId(hasher.finish());

        if !self.assets_by_id.contains_key(&id) {
            premultiply_rgba8_in_place(&mut rgba8);
            self.assets_by_id.insert(
                id,
                PreparedAsset::Image(PreparedImage {
                    width,
                    height,
                    rgba8_premul: Arc::new(rgba8),
                }),
            );
        }
        Ok(id)
    }

    /// Shape a text overlay with a font file under the store root.
    pub fn prepare_text(
        &mut self,
        content: &str,
        font_source: &str,
        size_px: f32,
        color: Rgba8,
        max_width_px: Option<f32>,
    ) -> CollagerResult<AssetId> {
        let norm_path = normalize_rel_path(font_source)?;

        let mut hasher = Fnv1a64::new_default();
        hasher.write_u8(b'T');
        hasher.write_bytes(norm_path.as_bytes());
        hasher.write_u8(0);
        hasher.write_bytes(content.as_bytes());
        hasher.write_u8(0);
        hasher.write_u32(size_px.to_bits());
        hasher.write_bytes(&[color.r, color.g, color.b, color.a]);
        if let Some(w) = max_width_px {
            hasher.write_u32(w.to_bits());
        }
        let id = AssetId(hasher.finish());
        if self.assets_by_id.contains_key(&id) {
            return Ok(id);
        }

        let font_bytes = self.read_bytes(&norm_path)?;
        let mut engine = text::TextLayoutEngine::new();
        let layout = engine.layout_plain(content, &font_bytes, size_px, color, max_width_px)?;
        self.assets_by_id.insert(
            id,
            PreparedAsset::Text(PreparedText {
                layout: Arc::new(layout),
                font_bytes: Arc::new(font_bytes),
            }),
        );
        Ok(id)
    }

    /// Lookup prepared asset data by id.
    pub fn get(&self, id: AssetId) -> CollagerResult<&PreparedAsset> {
        self.assets_by_id
            .get(&id)
            .ok_or_else(|| CollagerError::render(format!("unknown AssetId {}", id.as_u64())))
    }

    pub fn len(&self) -> usize {
        self.assets_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets_by_id.is_empty()
    }

    fn read_bytes(&self, norm_path: &str) -> CollagerResult<Vec<u8>> {
        let path = self.root.join(Path::new(norm_path));
        std::fs::read(&path)
            .with_context(|| format!("read asset bytes from '{}'", path.display()))
            .map_err(CollagerError::from)
    }
}

/// Decode an encoded image (PNG, JPEG, ...) into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> CollagerResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Normalize and validate store-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and
/// rejects absolute paths or parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> CollagerResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(CollagerError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(CollagerError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CollagerError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CollagerError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn decode_image_png_dimensions_and_premul() {
        let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
        let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();

        let prepared = decode_image(&buf).unwrap();
        assert_eq!(prepared.width, 1);
        assert_eq!(prepared.height, 1);
        assert_eq!(
            prepared.rgba8_premul.as_slice(),
            &[
                ((100u16 * 128 + 127) / 255) as u8,
                ((50u16 * 128 + 127) / 255) as u8,
                ((200u16 * 128 + 127) / 255) as u8,
                128u8
            ]
        );
    }

    #[test]
    fn insert_image_is_content_addressed() {
        let mut store = AssetStore::new(".");
        let solid = vec![10u8, 20, 30, 255, 10, 20, 30, 255];
        let a = store.insert_image(2, 1, solid.clone()).unwrap();
        let b = store.insert_image(2, 1, solid).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);

        let other = store
            .insert_image(1, 2, vec![9u8, 9, 9, 255, 9, 9, 9, 255])
            .unwrap();
        assert_ne!(a, other);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn insert_image_validates_buffer_length() {
        let mut store = AssetStore::new(".");
        assert!(store.insert_image(2, 2, vec![0u8; 3]).is_err());
        assert!(store.insert_image(0, 1, Vec::new()).is_err());
    }

    #[test]
    fn insert_image_premultiplies() {
        let mut store = AssetStore::new(".");
        let id = store.insert_image(1, 1, vec![100, 50, 200, 128]).unwrap();
        let PreparedAsset::Image(img) = store.get(id).unwrap() else {
            panic!("expected image");
        };
        assert_eq!(img.rgba8_premul.as_slice(), &[50, 25, 100, 128]);
    }

    #[test]
    fn get_unknown_id_is_render_error() {
        let store = AssetStore::new(".");
        assert!(matches!(
            store.get(AssetId::from_u64(42)),
            Err(CollagerError::Render(_))
        ));
    }

    #[test]
    fn normalize_rel_path_accepts_clean_relative() {
        assert_eq!(
            normalize_rel_path("photos/cat.png").unwrap(),
            "photos/cat.png"
        );
        assert_eq!(normalize_rel_path("./a/./b.png").unwrap(), "a/b.png");
        assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    }

    #[test]
    fn normalize_rel_path_rejects_escapes() {
        assert!(normalize_rel_path("/etc/passwd").is_err());
        assert!(normalize_rel_path("../secret.png").is_err());
        assert!(normalize_rel_path("a/../b.png").is_err());
        assert!(normalize_rel_path("").is_err());
        assert!(normalize_rel_path("./").is_err());
    }

    #[test]
    fn load_image_missing_file_reports_path() {
        let mut store = AssetStore::new("definitely-not-a-dir");
        let err = store.load_image("nope.png").unwrap_err();
        assert!(err.to_string().contains("nope.png"));
    }
}
