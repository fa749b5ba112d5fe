use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::controller::{FrameOutput, RenderTarget};
use crate::error::AppError;
use crate::model::{DirectionalLight, Scene};
use crate::utils::{Mesh, MeshBuffer, Vertex};
use crate::view::gpu_init::GpuContext;
use crate::view::texture::{self, GpuTexture};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Space is black until the skybox texture arrives
const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub light_dir: [f32; 3],
    pub intensity: f32,
    pub ambient: f32,
    pub _pad1: f32,
    pub _pad2: f32,
    pub _pad3: f32,
}

impl LightingUniform {
    pub fn from_light(light: &DirectionalLight, ambient: f32) -> Self {
        Self {
            light_dir: light.direction().to_array(),
            intensity: light.intensity,
            ambient,
            _pad1: 0.0,
            _pad2: 0.0,
            _pad3: 0.0,
        }
    }
}

/// Per-draw model matrix and material
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
    pub lit: f32,
    pub _pad1: f32,
    pub _pad2: f32,
    pub _pad3: f32,
}

// Shared graphics setup used by native and web
pub struct CameraResources {
    pub camera_buffer: wgpu::Buffer,
    pub lighting_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub camera_bind_group: wgpu::BindGroup,
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub fn create_camera_resources(device: &wgpu::Device, lighting: &LightingUniform) -> CameraResources {
    let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("camera_buffer"),
        contents: bytemuck::bytes_of(&CameraUniform { view_proj: Mat4::IDENTITY.to_cols_array_2d() }),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let lighting_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("lighting_buffer"),
        contents: bytemuck::bytes_of(lighting),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[
            uniform_entry(0, wgpu::ShaderStages::VERTEX),
            uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
        ],
    });

    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: lighting_buffer.as_entire_binding() },
        ],
    });

    CameraResources { camera_buffer, lighting_buffer, bind_group_layout, camera_bind_group }
}

pub fn create_draw_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("draw_bind_group_layout"),
        entries: &[
            uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
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
        ],
    })
}

pub fn create_mesh_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_layout: &wgpu::BindGroupLayout,
    draw_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("mesh_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/mesh.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("mesh_pipeline_layout"),
        bind_group_layouts: &[camera_layout, draw_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("mesh_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // The plane must show from below and the skybox from inside
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

/// A mesh plus its own uniform buffer, texture and bind group
pub struct DrawItem {
    label: &'static str,
    mesh: MeshBuffer,
    uniform: DrawUniform,
    uniform_buffer: wgpu::Buffer,
    texture: GpuTexture,
    bind_group: wgpu::BindGroup,
}

impl DrawItem {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        mesh: &Mesh,
        texture: GpuTexture,
        tint: [f32; 4],
        lit: bool,
        label: &'static str,
    ) -> Self {
        let uniform = DrawUniform {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            tint,
            lit: if lit { 1.0 } else { 0.0 },
            _pad1: 0.0,
            _pad2: 0.0,
            _pad3: 0.0,
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = Self::bind(device, layout, sampler, &uniform_buffer, &texture, label);

        Self {
            label,
            mesh: mesh.upload(device, label),
            uniform,
            uniform_buffer,
            texture,
            bind_group,
        }
    }

    fn bind(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        uniform_buffer: &wgpu::Buffer,
        texture: &GpuTexture,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: uniform_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&texture.view) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(sampler) },
            ],
        })
    }

    fn set_model(&mut self, queue: &wgpu::Queue, model: Mat4) {
        self.uniform.model = model.to_cols_array_2d();
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniform));
    }

    fn set_texture(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout, sampler: &wgpu::Sampler, texture: GpuTexture) {
        self.bind_group = Self::bind(device, layout, sampler, &self.uniform_buffer, &texture, self.label);
        self.texture = texture;
    }

    fn texture_size(&self) -> (u32, u32) {
        let size = self.texture.texture.size();
        (size.width, size.height)
    }

    fn draw(&self, rp: &mut wgpu::RenderPass<'_>) {
        rp.set_bind_group(1, &self.bind_group, &[]);
        rp.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
        rp.set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rp.draw_indexed(0..self.mesh.index_count, 0, 0..1);
    }
}

/// Owns the GPU and draws the skybox and the flying object
pub struct Renderer {
    gpu: GpuContext,
    depth_view: wgpu::TextureView,
    camera: CameraResources,
    camera_data: CameraUniform,
    draw_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    pipeline: wgpu::RenderPipeline,
    skybox: DrawItem,
    subject: DrawItem,
}

impl Renderer {
    pub fn new(gpu: GpuContext, scene: &Scene) -> Self {
        let device = gpu.device.as_ref();
        let queue = gpu.queue.as_ref();

        let (_, depth_view) = create_depth_texture(device, gpu.config.width, gpu.config.height);
        let lighting = LightingUniform::from_light(&scene.light, 0.35);
        let camera = create_camera_resources(device, &lighting);
        let draw_layout = create_draw_layout(device);
        let pipeline = create_mesh_pipeline(device, gpu.format, &camera.bind_group_layout, &draw_layout);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("color_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let skybox = DrawItem::new(
            device,
            &draw_layout,
            &sampler,
            &scene.skybox.mesh,
            GpuTexture::solid(device, queue, [0, 0, 0, 255], "skybox_placeholder"),
            [1.0; 4],
            false,
            "skybox",
        );
        let mut subject = DrawItem::new(
            device,
            &draw_layout,
            &sampler,
            &scene.subject.mesh,
            GpuTexture::solid(device, queue, [255; 4], "white"),
            scene.subject.color,
            true,
            "subject",
        );
        subject.set_model(queue, scene.subject.transform.model_matrix());

        tracing::info!(
            width = gpu.config.width,
            height = gpu.config.height,
            format = ?gpu.format,
            "renderer ready"
        );

        Self {
            gpu,
            depth_view,
            camera,
            camera_data: CameraUniform { view_proj: Mat4::IDENTITY.to_cols_array_2d() },
            draw_layout,
            sampler,
            pipeline,
            skybox,
            subject,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.gpu.config.width, self.gpu.config.height)
    }

    pub fn set_skybox_texture(&mut self, image: image::RgbaImage) {
        let max_side = self.gpu.device.limits().max_texture_dimension_2d;
        let image = texture::fit_to_limit(image, max_side);
        let tex = GpuTexture::from_image(&self.gpu.device, &self.gpu.queue, &image, "skybox_texture");
        self.skybox.set_texture(&self.gpu.device, &self.draw_layout, &self.sampler, tex);
        tracing::info!(size = ?self.skybox.texture_size(), "skybox texture uploaded");
    }

    pub fn render(&mut self, frame: &FrameOutput) -> Result<(), AppError> {
        let queue = self.gpu.queue.as_ref();
        self.camera_data.view_proj = frame.view_proj.to_cols_array_2d();
        queue.write_buffer(&self.camera.camera_buffer, 0, bytemuck::bytes_of(&self.camera_data));
        self.subject.set_model(queue, frame.model);

        let surface_texture = match self.gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                tracing::debug!("surface {e}, reconfiguring");
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::debug!(frame = frame.frame, "surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let view = surface_texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
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

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.camera.camera_bind_group, &[]);
            self.skybox.draw(&mut rp);
            self.subject.draw(&mut rp);
        }

        queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

impl RenderTarget for Renderer {
    fn resize_output(&mut self, width: u32, height: u32) {
        self.gpu.config.width = width;
        self.gpu.config.height = height;
        self.gpu.reconfigure();

        // Depth must match the colour target
        let (_, depth_view) = create_depth_texture(&self.gpu.device, width, height);
        self.depth_view = depth_view;
    }
}
