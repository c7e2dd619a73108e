//! wgpu 渲染器实现
//!
//! 用 wgpu 模拟固定管线的立即模式绘制：
//! - 每帧调用 `draw_mesh` 把网格提交到 `ImmediateBatch`
//! - 把批次顶点写入顶点缓冲（线框模式下转换为线段列表）
//! - 填充模式使用带光照的三角形管线，线框模式使用线段管线

use bytemuck::{Pod, Zeroable};
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::core::error::{GraphicsError, Result};
use crate::core::math::{matrix, Matrix4, Vector3};
use crate::core::Config;
use crate::geometry::Mesh;
use crate::renderer::{draw_mesh, DrawOptions, GpuVertex, ImmediateBatch};

use super::context::WgpuContext;

/// 固定管线默认的全局环境光
const GLOBAL_AMBIENT: f32 = 0.2;

/// 顶点缓冲的最小容量（字节）
const MIN_VERTEX_BUFFER_SIZE: u64 = 64 * 1024;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Uniform Buffer Object - 矩阵和光照参数
///
/// 必须使用 #[repr(C)] 保证内存布局与着色器一致，所有成员 16 字节对齐。
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct UniformBufferObject {
    model_view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    base_color: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
    light_dir: [f32; 4],
    flags: [u32; 4],
}

impl UniformBufferObject {
    fn new(state: &AppState) -> Self {
        let scene = state.scene();
        let lighting = &scene.lighting;

        let model_view: Matrix4 = state.view() * state.model();
        let projection = matrix::opengl_to_wgpu() * state.projection();

        // 平行光方向在相机空间中给出（视图矩阵只有平移）
        let light_dir = Vector3::from(lighting.direction)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::z);

        let rgb = |c: [f32; 3], w: f32| [c[0], c[1], c[2], w];
        let ambient = lighting.ambient.map(|c| c + GLOBAL_AMBIENT);

        Self {
            model_view: model_view.into(),
            projection: projection.into(),
            base_color: rgb(scene.model_color, 1.0),
            ambient: rgb(ambient, 1.0),
            diffuse: rgb(lighting.diffuse, 1.0),
            specular: rgb(lighting.specular_color, lighting.shininess),
            light_dir: [light_dir.x, light_dir.y, light_dir.z, 0.0],
            flags: [state.lighting as u32, state.specular as u32, 0, 0],
        }
    }
}

/// wgpu 渲染器
pub struct Renderer {
    gfx: WgpuContext,

    fill_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: u64,

    batch: ImmediateBatch,
    draw_options: DrawOptions,
    defects_reported: bool,
}

impl Renderer {
    /// 创建窗口和渲染资源
    pub fn new(event_loop: &winit::event_loop::EventLoop<()>, config: &Config) -> Result<Self> {
        info!("Creating wgpu renderer");

        let gfx = WgpuContext::new(event_loop, config)?;

        debug!("Loading shaders");
        let shader_module = gfx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Flat Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../renderer/shaders/flat.wgsl").into()),
        });

        debug!("Creating uniform buffer");
        let uniform_buffer = gfx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<UniformBufferObject>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = gfx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = gfx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = gfx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        debug!("Creating render pipelines");
        let format = gfx.surface_config.format;
        let fill_pipeline = create_pipeline(
            &gfx.device,
            &pipeline_layout,
            &shader_module,
            format,
            wgpu::PrimitiveTopology::TriangleList,
            "Fill Pipeline",
        );
        let line_pipeline = create_pipeline(
            &gfx.device,
            &pipeline_layout,
            &shader_module,
            format,
            wgpu::PrimitiveTopology::LineList,
            "Wireframe Pipeline",
        );

        let (depth_texture, depth_view) =
            create_depth_texture(&gfx.device, gfx.surface_config.width, gfx.surface_config.height);

        let vertex_buffer = create_vertex_buffer(&gfx.device, MIN_VERTEX_BUFFER_SIZE);

        let draw_options = DrawOptions::from_config(&config.loader);

        info!("wgpu renderer created successfully");

        Ok(Self {
            gfx,
            fill_pipeline,
            line_pipeline,
            uniform_buffer,
            bind_group,
            _depth_texture: depth_texture,
            depth_view,
            vertex_buffer,
            vertex_capacity: MIN_VERTEX_BUFFER_SIZE,
            batch: ImmediateBatch::new(),
            draw_options,
            defects_reported: false,
        })
    }

    /// 绘制一帧
    pub fn draw(&mut self, mesh: &Mesh, state: &AppState) -> Result<()> {
        // 1. 获取交换链纹理；表面丢失或过期时重新配置并跳过本帧
        let output = match self.gfx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = (self.gfx.surface_config.width, self.gfx.surface_config.height);
                self.gfx.reconfigure_surface(width, height);
                return Ok(());
            }
            Err(e) => {
                return Err(GraphicsError::SwapchainError(format!("Failed to acquire next image: {}", e)).into());
            }
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        // 2. 立即模式提交，每帧完整重算
        self.batch.clear();
        let stats = draw_mesh(mesh, &mut self.batch, &self.draw_options);
        if stats.has_defects() && !self.defects_reported {
            warn!(
                skipped_short = stats.skipped_short,
                skipped_out_of_range = stats.skipped_out_of_range,
                truncated = stats.truncated,
                degenerate = stats.degenerate,
                "Mesh contains faces that are not valid triangles"
            );
            self.defects_reported = true;
        }

        // 3. 上传顶点
        let line_vertices;
        let (vertices, pipeline) = if state.wireframe {
            line_vertices = self.batch.line_list();
            (line_vertices.as_slice(), &self.line_pipeline)
        } else {
            (self.batch.vertices(), &self.fill_pipeline)
        };

        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        ensure_capacity(
            &self.gfx.device,
            &mut self.vertex_buffer,
            &mut self.vertex_capacity,
            bytes.len() as u64,
        );
        if !bytes.is_empty() {
            self.gfx.queue.write_buffer(&self.vertex_buffer, 0, bytes);
        }

        let ubo = UniformBufferObject::new(state);
        self.gfx.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[ubo]));

        // 4. 渲染通道
        let mut encoder = self.gfx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        let background = state.scene().background;
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: background[0] as f64,
                            g: background[1] as f64,
                            b: background[2] as f64,
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

            if !vertices.is_empty() {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..bytes.len() as u64));
                render_pass.draw(0..vertices.len() as u32, 0..1);
            }
        }

        // 5. 提交并呈现
        self.gfx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// 处理窗口大小调整
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            debug!("Resizing to {}x{}", width, height);

            self.gfx.reconfigure_surface(width, height);

            let (depth_texture, depth_view) = create_depth_texture(&self.gfx.device, width, height);
            self._depth_texture = depth_texture;
            self.depth_view = depth_view;
        }
    }

    /// 获取窗口引用
    pub fn window(&self) -> &winit::window::Window {
        self.gfx.window()
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    // position
                    wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    // normal
                    wgpu::VertexAttribute {
                        offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                        shader_location: 1,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                ],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // 固定管线默认不剔除背面
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    (texture, view)
}

fn create_vertex_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Immediate Vertex Buffer"),
        size,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// 顶点缓冲不够大时按 2 的幂扩容
fn ensure_capacity(device: &wgpu::Device, buffer: &mut wgpu::Buffer, capacity: &mut u64, required: u64) {
    if required <= *capacity {
        return;
    }

    let new_capacity = required.next_power_of_two().max(MIN_VERTEX_BUFFER_SIZE);
    debug!(from = *capacity, to = new_capacity, "Growing vertex buffer");
    *buffer = create_vertex_buffer(device, new_capacity);
    *capacity = new_capacity;
}
