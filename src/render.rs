pub mod cpu;

use crate::{assets::AssetStore, compose::RenderPlan, error::CollagerResult};

/// Final composited raster, row-major RGBA8.
#[derive(Clone, Debug)]
pub struct RasterFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// Executes a [`RenderPlan`] against prepared assets.
///
/// A render is all-or-nothing: any failure aborts before a frame is returned,
/// so callers never see partially composited output.
pub trait RenderBackend {
    fn render_plan(&mut self, plan: &RenderPlan, assets: &AssetStore)
    -> CollagerResult<RasterFrame>;
}

#[derive(Clone, Copy, Debug)]
pub enum BackendKind {
    Cpu,
}

pub fn create_backend(kind: BackendKind) -> CollagerResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(cpu::CpuBackend::new())),
    }
}
