#![forbid(unsafe_code)]

pub mod assets;
pub mod compose;
pub mod core;
pub mod editor;
pub mod error;
pub mod fit;
pub mod layout;
mod math;
pub mod pipeline;
pub mod project;
pub mod render;
pub mod resize;
pub mod scene;
pub mod template;

pub use assets::{AssetId, AssetStore, PreparedAsset, PreparedImage, PreparedText};
pub use compose::{BackgroundOp, DrawOp, OutputMapping, RenderPlan, build_plan};
pub use core::{AspectRatio, Axis, Rgba8};
pub use editor::{CollageEditor, LayoutPhase, LayoutSnapshot};
pub use error::{CollagerError, CollagerResult};
pub use fit::fit_work_area;
pub use layout::{GridLayoutState, MIN_CELL_SIZE, cell_rects};
pub use pipeline::render_final;
pub use project::{CollageDoc, instantiate};
pub use render::{BackendKind, RasterFrame, RenderBackend, create_backend};
pub use resize::Divider;
pub use scene::{Background, CellContent, CollageScene, ContentTransform, OverlayLayer};
pub use template::{CellPosition, Span, Template, TemplateCatalog, TemplateCell};
