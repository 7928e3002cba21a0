//! The textured-plane pipeline family. One WGSL shader drives all three
//! surfaces; the variants differ only in blend and depth-write state.

use crate::scene::geometry::{PlaneMesh, PlaneVertex};
use glam::Mat4;
use wgpu::util::DeviceExt;

/// Per-surface uniform data. Must match `SurfaceUniform` in
/// `shaders/surface.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceUniformStd140 {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// x: displacement scale, y: alpha cutoff, z: lit weight, w: unused.
    pub params: [f32; 4],
}

impl SurfaceUniformStd140 {
    pub fn new(view_proj: Mat4, model: Mat4, displacement: f32, cutoff: f32, lit: bool) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            params: [displacement, cutoff, if lit { 1.0 } else { 0.0 }, 0.0],
        }
    }
}

/// Which pipeline variant a surface renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    /// Background: no blending, depth write.
    Opaque,
    /// Subject: alpha blending plus cutoff discard, depth write.
    Cutout,
    /// Label: alpha blending, depth tested but not written, drawn last.
    Overlay,
}

pub struct SurfacePipelines {
    pub bind_layout: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
    opaque: wgpu::RenderPipeline,
    cutout: wgpu::RenderPipeline,
    overlay: wgpu::RenderPipeline,
}

impl SurfacePipelines {
    pub fn new(
        device: &wgpu::Device,
        color_fmt: wgpu::TextureFormat,
        depth_fmt: wgpu::TextureFormat,
    ) -> Self {
        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Surface Bind Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<SurfaceUniformStd140>() as u64,
                        ),
                    },
                    count: None,
                },
                // Color map.
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                // Displacement map, sampled in the vertex stage.
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Surface Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shaders/surface.wgsl"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../../../shaders/surface.wgsl").into(),
            ),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Surface PipelineLayout"),
            bind_group_layouts: &[&bind_layout],
            push_constant_ranges: &[],
        });

        let build = |label: &str, blend: Option<wgpu::BlendState>, depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<PlaneVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[
                            wgpu::VertexAttribute {
                                shader_location: 0,
                                offset: 0,
                                format: wgpu::VertexFormat::Float32x3,
                            },
                            wgpu::VertexAttribute {
                                shader_location: 1,
                                offset: 12,
                                format: wgpu::VertexFormat::Float32x2,
                            },
                        ],
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    // The subject rotates toward the camera; never cull.
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: depth_fmt,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_fmt,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            })
        };

        let opaque = build("Surface Opaque Pipeline", None, true);
        let cutout = build(
            "Surface Cutout Pipeline",
            Some(wgpu::BlendState::ALPHA_BLENDING),
            true,
        );
        let overlay = build(
            "Surface Overlay Pipeline",
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
        );

        Self {
            bind_layout,
            sampler,
            opaque,
            cutout,
            overlay,
        }
    }

    pub fn get(&self, kind: PipelineKind) -> &wgpu::RenderPipeline {
        match kind {
            PipelineKind::Opaque => &self.opaque,
            PipelineKind::Cutout => &self.cutout,
            PipelineKind::Overlay => &self.overlay,
        }
    }
}

/// GPU resources for one renderable surface.
pub struct SurfaceGpu {
    pub kind: PipelineKind,
    pub vtx: wgpu::Buffer,
    pub idx: wgpu::Buffer,
    pub index_count: u32,
    pub ubo: wgpu::Buffer,
    pub bind: wgpu::BindGroup,
    /// Alternate bind group (the label's emphasized texture variant).
    pub alt_bind: Option<wgpu::BindGroup>,
    /// Selects `alt_bind` for this frame's draw.
    pub use_alt: bool,
}

impl SurfaceGpu {
    /// Uploads a mesh and builds the bind group(s). `displace` falls back
    /// to a caller-provided placeholder view for undisplaced surfaces;
    /// `alt_color` supplies the label's second texture variant.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        pipelines: &SurfacePipelines,
        kind: PipelineKind,
        mesh: &PlaneMesh,
        color: &wgpu::TextureView,
        displace: &wgpu::TextureView,
        alt_color: Option<&wgpu::TextureView>,
        label: &str,
    ) -> Self {
        let vtx = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} VB")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let idx = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} IB")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} UBO")),
            size: std::mem::size_of::<SurfaceUniformStd140>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let make_bind = |color_view: &wgpu::TextureView, bind_label: &str| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(bind_label),
                layout: &pipelines.bind_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: ubo.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(color_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&pipelines.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(displace),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: wgpu::BindingResource::Sampler(&pipelines.sampler),
                    },
                ],
            })
        };

        let bind = make_bind(color, &format!("{label} Bind"));
        let alt_bind = alt_color.map(|view| make_bind(view, &format!("{label} Alt Bind")));

        Self {
            kind,
            vtx,
            idx,
            index_count: mesh.indices.len() as u32,
            ubo,
            bind,
            alt_bind,
            use_alt: false,
        }
    }

    pub fn draw<'a>(&'a self, pipelines: &'a SurfacePipelines, rpass: &mut wgpu::RenderPass<'a>) {
        let bind = match (&self.alt_bind, self.use_alt) {
            (Some(alt), true) => alt,
            _ => &self.bind,
        };
        rpass.set_pipeline(pipelines.get(self.kind));
        rpass.set_bind_group(0, bind, &[]);
        rpass.set_vertex_buffer(0, self.vtx.slice(..));
        rpass.set_index_buffer(self.idx.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
