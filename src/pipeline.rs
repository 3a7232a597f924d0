use crate::{
    assets::AssetStore,
    compose::build_plan,
    editor::{CollageEditor, LayoutSnapshot},
    error::CollagerResult,
    render::{RasterFrame, RenderBackend},
    scene::CollageScene,
};

/// Compose and execute one final render against a frozen layout.
pub fn render_final(
    snapshot: &LayoutSnapshot,
    scene: &CollageScene,
    store: &AssetStore,
    output_width: u32,
    backend: &mut dyn RenderBackend,
) -> CollagerResult<RasterFrame> {
    let plan = build_plan(snapshot, scene, store, output_width)?;
    backend.render_plan(&plan, store)
}

impl CollageEditor {
    /// Snapshot the current layout and render it at `output_width` pixels.
    ///
    /// Fails with a config error when no template is set; the editor itself
    /// is untouched either way.
    pub fn render_final(
        &self,
        scene: &CollageScene,
        store: &AssetStore,
        output_width: u32,
        backend: &mut dyn RenderBackend,
    ) -> CollagerResult<RasterFrame> {
        let snapshot = self.snapshot()?;
        render_final(&snapshot, scene, store, output_width, backend)
    }
}
