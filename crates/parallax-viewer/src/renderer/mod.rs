//! The rendering orchestrator: GPU context, depth target, and the surface
//! pipeline family. The egui overlay pass lives with the session in `app`.

pub mod context;
pub mod pipelines;
pub mod texture;

use self::{
    context::GfxContext,
    pipelines::surface::{SurfaceGpu, SurfacePipelines},
};
use std::sync::Arc;
use winit::window::Window;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub struct Renderer {
    pub gfx: GfxContext,
    pub surfaces: SurfacePipelines,
    pub egui_renderer: egui_wgpu::Renderer,
    depth_view: wgpu::TextureView,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window).await?;
        let surfaces = SurfacePipelines::new(&gfx.device, gfx.config.format, DEPTH_FORMAT);
        let depth_view = create_depth_target(&gfx.device, gfx.size);
        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        Ok(Self {
            gfx,
            surfaces,
            egui_renderer,
            depth_view,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.depth_view = create_depth_target(&self.gfx.device, new_size);
        }
    }

    /// Renders the scene surfaces in painter's order (background, subject,
    /// label) into the swapchain view and submits the pass.
    pub fn render(&mut self, swap_view: &wgpu::TextureView, draws: &[&SurfaceGpu]) {
        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.01,
                            g: 0.01,
                            b: 0.02,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for gpu in draws {
                gpu.draw(&self.surfaces, &mut pass);
            }
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }
}

fn create_depth_target(
    device: &wgpu::Device,
    size: winit::dpi::PhysicalSize<u32>,
) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Scene Depth Target"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}
