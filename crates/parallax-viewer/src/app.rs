//! The session object: owns the camera, composition, GPU resources,
//! pointer state, and annotations, and drives the per-frame pipeline
//! (smoothing, rotation, hit-test, projection, render) in fixed order.

use crate::{
    annotate::{self, Annotation},
    assets::{
        self,
        label::{self, UvBounds},
    },
    camera::Camera,
    config::Config,
    content, fit,
    interact::{self, PointerState},
    renderer::{
        pipelines::surface::{PipelineKind, SurfaceGpu, SurfaceUniformStd140},
        texture, Renderer,
    },
    scene::{geometry, Composition, Material},
    ui,
};
use anyhow::Result;
use glam::{Mat4, Vec2, Vec3};
use std::sync::Arc;
use winit::{
    event::WindowEvent,
    window::{CursorIcon, Window},
};

pub struct App {
    pub renderer: Renderer,
    pub camera: Camera,
    pub composition: Composition,
    pub pointer: PointerState,
    pub annotations: Vec<Annotation>,
    /// Result of this frame's label hover hit-test.
    pub label_hovered: bool,

    cfg: Config,
    label_bounds: Option<UvBounds>,
    background_gpu: SurfaceGpu,
    subject_gpu: SurfaceGpu,
    label_gpu: Option<SurfaceGpu>,

    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
}

impl App {
    /// Loads every asset, builds the scene, and uploads GPU resources.
    /// The frame loop must not start until this returns: a failed image
    /// load aborts startup, while a failed label generation only drops the
    /// label surface and the hover feature.
    pub async fn new(window: Arc<Window>, cfg: Config) -> Result<Self> {
        let images =
            assets::load_scene_images(&cfg.background, &cfg.subject, &cfg.depth_map)?;
        log::info!(
            "Loaded scene images (background {}x{})",
            images.background.width(),
            images.background.height()
        );

        let label_textures = match label::generate(&cfg.title, &cfg.title_highlight) {
            Ok(textures) => Some(textures),
            Err(err) => {
                log::warn!("Label generation unavailable ({err}); continuing without title");
                None
            }
        };

        let renderer = Renderer::new(window.clone()).await?;
        let device = &renderer.gfx.device;
        let queue = &renderer.gfx.queue;

        let aspect = images.aspect();
        let composition = Composition::new(
            aspect,
            cfg.camera_z,
            cfg.displacement_scale,
            label_textures.is_some(),
        );
        let camera = Camera::new(cfg.fov, cfg.camera_z);

        let bg_view = texture::upload_rgba(
            device,
            queue,
            images.background.width(),
            images.background.height(),
            &images.background,
            true,
            "Background Color",
        );
        let subject_view = texture::upload_rgba(
            device,
            queue,
            images.subject.width(),
            images.subject.height(),
            &images.subject,
            true,
            "Subject Color",
        );
        let depth_view = texture::upload_rgba(
            device,
            queue,
            images.depth.width(),
            images.depth.height(),
            &images.depth,
            false,
            "Subject Depth Map",
        );
        let flat = texture::solid_pixel(device, queue, [0, 0, 0, 255], "Flat Displacement");

        let bg_mesh = geometry::plane(composition.background.width, composition.background.height, 1, 1);
        let background_gpu = SurfaceGpu::new(
            device,
            &renderer.surfaces,
            PipelineKind::Opaque,
            &bg_mesh,
            &bg_view,
            &flat,
            None,
            "Background",
        );

        let segs = cfg.displacement_segments;
        let subject_mesh =
            geometry::plane(composition.subject.width, composition.subject.height, segs, segs);
        log::debug!(
            "Subject mesh: {} vertices, {} indices",
            subject_mesh.vertices.len(),
            subject_mesh.indices.len()
        );
        let subject_gpu = SurfaceGpu::new(
            device,
            &renderer.surfaces,
            PipelineKind::Cutout,
            &subject_mesh,
            &subject_view,
            &depth_view,
            None,
            "Subject",
        );

        let mut label_bounds = None;
        let label_gpu = match (&composition.label, &label_textures) {
            (Some(surface), Some(textures)) => {
                label_bounds = textures.highlight;
                if label_bounds.is_none() {
                    log::warn!(
                        "Title highlight {:?} not found; hover disabled",
                        cfg.title_highlight
                    );
                }
                let normal_view = texture::upload_rgba(
                    device,
                    queue,
                    textures.width,
                    textures.height,
                    &textures.normal,
                    true,
                    "Label Normal",
                );
                let hover_view = texture::upload_rgba(
                    device,
                    queue,
                    textures.width,
                    textures.height,
                    &textures.emphasized,
                    true,
                    "Label Emphasized",
                );
                let mesh = geometry::plane(surface.width, surface.height, 1, 1);
                Some(SurfaceGpu::new(
                    device,
                    &renderer.surfaces,
                    PipelineKind::Overlay,
                    &mesh,
                    &normal_view,
                    &flat,
                    Some(&hover_view),
                    "Label",
                ))
            }
            _ => None,
        };

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        let mut app = Self {
            renderer,
            camera,
            composition,
            pointer: PointerState::new(),
            annotations: content::default_annotations(),
            label_hovered: false,
            cfg,
            label_bounds,
            background_gpu,
            subject_gpu,
            label_gpu,
            egui_ctx,
            egui_state,
        };
        let size = app.renderer.gfx.size;
        app.refit(size);
        Ok(app)
    }

    /// Recomputes the viewport fit and camera aspect for a new container
    /// size. A zero-sized container skips the fit and is retried on the
    /// next resize event.
    pub fn refit(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.renderer.resize(new_size);

        match fit::compute(
            new_size.width,
            new_size.height,
            self.cfg.fov,
            self.cfg.camera_z,
            self.composition.aspect,
            self.cfg.focus_x,
            self.cfg.overscan,
        ) {
            Some(fit) => {
                self.camera
                    .set_aspect(new_size.width as f32 / new_size.height as f32);
                self.composition.apply_fit(&fit);
            }
            None => log::debug!("Skipping fit for zero-sized container"),
        }
    }

    /// Handles window events. Pointer samples are recorded before egui
    /// sees the event so parallax keeps tracking over overlay elements.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let size = self.renderer.gfx.size;
                self.pointer.pointer_moved(
                    Vec2::new(position.x as f32, position.y as f32),
                    Vec2::new(size.width as f32, size.height as f32),
                );
            }
            WindowEvent::CursorLeft { .. } => self.pointer.pointer_left(),
            WindowEvent::Resized(physical_size) => self.refit(*physical_size),
            _ => {}
        }

        let response = self.egui_state.on_window_event(window, event);
        response.consumed
    }

    /// One animation tick: smoothing, rotation, hit-test, projection,
    /// then the scene and overlay passes.
    pub fn frame(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        // Smoothing and parallax rotation, subject only.
        let smoothed = self.pointer.step(self.cfg.smoothing);
        let angles = interact::parallax_angles(smoothed, self.cfg.parallax_intensity);
        self.composition.subject.transform.rotation = Vec3::new(angles.x, angles.y, 0.0);

        // Hover hit-test against the label surface, recomputed every frame
        // from the last raw pointer sample.
        self.label_hovered = match (&self.composition.label, &self.label_bounds) {
            (Some(surface), Some(bounds)) => {
                let world = self.composition.world_of(surface);
                interact::label_hovered(
                    &self.camera,
                    self.pointer.sample,
                    &world,
                    surface.width,
                    surface.height,
                    bounds,
                    self.cfg.hover_tolerance,
                )
            }
            _ => false,
        };
        if let Some(gpu) = self.label_gpu.as_mut() {
            gpu.use_alt = self.label_hovered;
        }
        window.set_cursor_icon(if self.label_hovered {
            CursorIcon::Pointer
        } else {
            CursorIcon::Default
        });

        // Project annotation anchors through the live subject transform.
        let size = self.renderer.gfx.size;
        let container = Vec2::new(size.width as f32, size.height as f32);
        let subject_world = self.composition.world_of(&self.composition.subject);
        annotate::update_positions(
            &mut self.annotations,
            &self.camera,
            &subject_world,
            self.composition.aspect,
            container,
            Vec2::ZERO,
        );

        // Per-surface uniforms.
        let view_proj = self.camera.view_proj();
        let queue = &self.renderer.gfx.queue;
        write_surface_uniform(
            queue,
            &self.background_gpu,
            view_proj,
            self.composition.world_of(&self.composition.background),
            &self.composition.background.material,
        );
        write_surface_uniform(
            queue,
            &self.subject_gpu,
            view_proj,
            subject_world,
            &self.composition.subject.material,
        );
        if let (Some(gpu), Some(surface)) = (&self.label_gpu, &self.composition.label) {
            write_surface_uniform(
                queue,
                gpu,
                view_proj,
                self.composition.world_of(surface),
                &surface.material,
            );
        }

        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Painter's order: background, subject, label overlay last.
        let mut draws: Vec<&SurfaceGpu> = vec![&self.background_gpu, &self.subject_gpu];
        if let Some(gpu) = &self.label_gpu {
            draws.push(gpu);
        }
        self.renderer.render(&swap_view, &draws);

        // Overlay pass: annotation bubbles and popups.
        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);
        ui::draw_annotations(&self.egui_ctx, &mut self.annotations, self.label_hovered);
        let egui_output = self.egui_ctx.end_frame();
        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Overlay Encoder"),
            });

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}

fn write_surface_uniform(
    queue: &wgpu::Queue,
    gpu: &SurfaceGpu,
    view_proj: Mat4,
    world: Mat4,
    material: &Material,
) {
    let data = SurfaceUniformStd140::new(
        view_proj,
        world,
        material.displacement_scale,
        material.alpha_cutoff,
        material.lit,
    );
    queue.write_buffer(&gpu.ubo, 0, bytemuck::bytes_of(&data));
}
