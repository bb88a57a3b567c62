//! Textured slide quad renderer.
//!
//! One fixed quad (5 world units wide, 10 units in front of the viewer),
//! drawn once per eye with that eye's viewport and matrices. GPU resources
//! are created lazily and the pipeline is rebuilt if the surface format
//! changes.

use bytemuck::{Pod, Zeroable};
use image::RgbaImage;
use wgpu::util::DeviceExt;

use stereopticon_engine::render::{Color, RenderCtx, RenderTarget};

use crate::stereo::EyeView;

/// Quad edge length in world units.
const QUAD_SIZE: f32 = 5.0;

/// Distance from the viewer to the quad plane.
const QUAD_DISTANCE: f32 = 10.0;

pub struct SlideRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    eye_bind_group_layout: Option<wgpu::BindGroupLayout>,
    texture_bind_group_layout: Option<wgpu::BindGroupLayout>,

    // One uniform buffer + bind group per eye, so both eye draws of a frame
    // see their own matrices (a single buffer written twice would resolve to
    // the last write for both draws).
    eye_ubos: [Option<wgpu::Buffer>; 2],
    eye_bind_groups: [Option<wgpu::BindGroup>; 2],

    sampler: Option<wgpu::Sampler>,
    texture: Option<wgpu::Texture>,
    texture_bind_group: Option<wgpu::BindGroup>,

    vbo: Option<wgpu::Buffer>,
}

impl SlideRenderer {
    pub fn new() -> Self {
        Self {
            pipeline_format: None,
            pipeline: None,
            eye_bind_group_layout: None,
            texture_bind_group_layout: None,
            eye_ubos: [None, None],
            eye_bind_groups: [None, None],
            sampler: None,
            texture: None,
            texture_bind_group: None,
            vbo: None,
        }
    }

    /// Uploads `image` as the current slide texture.
    ///
    /// Call whenever the deck position changes; the texture bind group is
    /// rebuilt, everything else is reused.
    pub fn set_slide(&mut self, ctx: &RenderCtx<'_>, image: &RgbaImage) {
        self.ensure_pipeline(ctx);

        let (width, height) = image.dimensions();
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("stereopticon slide texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.width),
                rows_per_image: Some(size.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let Some(bgl) = self.texture_bind_group_layout.as_ref() else { return };
        let Some(sampler) = self.sampler.as_ref() else { return };

        self.texture_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("stereopticon slide texture bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
        self.texture = Some(texture);
    }

    /// Draws the slide quad once per eye.
    ///
    /// No-op until a slide has been uploaded with [`set_slide`](Self::set_slide).
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        eyes: &[EyeView; 2],
        tint: Color,
    ) {
        self.ensure_pipeline(ctx);
        self.ensure_static_buffers(ctx);
        self.ensure_eye_resources(ctx);

        for (eye, ubo) in eyes.iter().zip(&self.eye_ubos) {
            let Some(ubo) = ubo.as_ref() else { return };
            let u = EyeUniform {
                proj: eye.proj.to_cols_array(),
                view: eye.view.to_cols_array(),
                tint: [tint.r, tint.g, tint.b, tint.a],
            };
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
        }

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(texture_bind_group) = self.texture_bind_group.as_ref() else { return };
        let Some(vbo) = self.vbo.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("stereopticon slide pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_vertex_buffer(0, vbo.slice(..));

        for (eye, bind_group) in eyes.iter().zip(&self.eye_bind_groups) {
            let Some(bind_group) = bind_group.as_ref() else { return };
            let vp = eye.viewport;

            rpass.set_viewport(vp.x, vp.y, vp.width, vp.height, 0.0, 1.0);
            // Scissor matches the viewport so each eye only touches its half.
            rpass.set_scissor_rect(
                vp.x as u32,
                vp.y as u32,
                vp.width.max(1.0) as u32,
                vp.height.max(1.0) as u32,
            );

            rpass.set_bind_group(0, bind_group, &[]);
            rpass.set_bind_group(1, texture_bind_group, &[]);
            rpass.draw(0..6, 0..1);
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader_src = include_str!("shaders/slide.wgsl");
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("stereopticon slide shader"),
            source: wgpu::ShaderSource::Wgsl(shader_src.into()),
        });

        let eye_bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("stereopticon eye bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(
                                std::mem::size_of::<EyeUniform>() as u64,
                            ),
                        },
                        count: None,
                    }],
                });

        let texture_bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("stereopticon slide texture bgl"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("stereopticon slide pipeline layout"),
                    bind_group_layouts: &[&eye_bind_group_layout, &texture_bind_group_layout],
                    immediate_size: 0,
                });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("stereopticon slide pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[SlideVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(straight_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.eye_bind_group_layout = Some(eye_bind_group_layout);
        self.texture_bind_group_layout = Some(texture_bind_group_layout);

        if self.sampler.is_none() {
            self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("stereopticon slide sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            }));
        }

        // Bind groups reference the old layouts; rebuild them lazily.
        self.eye_ubos = [None, None];
        self.eye_bind_groups = [None, None];
        self.texture_bind_group = None;
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.vbo.is_some() {
            return;
        }

        self.vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("stereopticon slide vbo"),
            contents: bytemuck::cast_slice(&quad_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        }));
    }

    fn ensure_eye_resources(&mut self, ctx: &RenderCtx<'_>) {
        if self.eye_bind_groups.iter().all(Option::is_some) {
            return;
        }
        let Some(bgl) = self.eye_bind_group_layout.as_ref() else { return };

        for i in 0..2 {
            let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("stereopticon eye ubo"),
                size: std::mem::size_of::<EyeUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            self.eye_bind_groups[i] =
                Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("stereopticon eye bind group"),
                    layout: bgl,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: ubo.as_entire_binding(),
                    }],
                }));
            self.eye_ubos[i] = Some(ubo);
        }
    }
}

impl Default for SlideRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn straight_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct EyeUniform {
    proj: [f32; 16],
    view: [f32; 16],
    tint: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SlideVertex {
    pos: [f32; 3],
    uv: [f32; 2],
}

impl SlideVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2  // uv
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SlideVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Two triangles forming the slide quad, centered on the view axis.
///
/// UV origin is top-left to match decoded image row order, so the top-left
/// vertex carries uv (0, 0).
fn quad_vertices() -> [SlideVertex; 6] {
    let h = QUAD_SIZE / 2.0;
    let z = -QUAD_DISTANCE;

    let bl = SlideVertex { pos: [-h, -h, z], uv: [0.0, 1.0] };
    let br = SlideVertex { pos: [h, -h, z], uv: [1.0, 1.0] };
    let tr = SlideVertex { pos: [h, h, z], uv: [1.0, 0.0] };
    let tl = SlideVertex { pos: [-h, h, z], uv: [0.0, 0.0] };

    [bl, br, tr, tr, tl, bl]
}
