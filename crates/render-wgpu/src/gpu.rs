use crate::camera::FlyCamera;
use crate::mesh::{MeshError, Vertex, uv_sphere};
use crate::shaders;
use crate::texture::skin_pixels;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use range_common::Skin;
use range_kernel::Arena;
use std::ops::Range;
use wgpu::util::DeviceExt;

const SKIN_SIZE: u32 = 128;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct Uniforms {
    pub(crate) view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
}

impl From<Mat4> for InstanceData {
    fn from(model: Mat4) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
        }
    }
}

/// Sampled texture plus the bind group exposing it to the fragment stage.
struct SkinBinding {
    skin: Skin,
    bind_group: wgpu::BindGroup,
}

/// Group consecutive sprites sharing a skin into instance ranges.
fn skin_ranges(skins: impl IntoIterator<Item = Skin>) -> Vec<(Skin, Range<u32>)> {
    let mut ranges: Vec<(Skin, Range<u32>)> = Vec::new();
    for (index, skin) in (0u32..).zip(skins) {
        let extends = matches!(ranges.last(), Some((last, _)) if *last == skin);
        if extends {
            if let Some((_, range)) = ranges.last_mut() {
                range.end = index + 1;
            }
        } else {
            ranges.push((skin, index..index + 1));
        }
    }
    ranges
}

/// wgpu-based arena renderer: targets and fireballs as textured spheres.
pub struct ArenaRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    skins: Vec<SkinBinding>,
    sphere_vertex_buffer: wgpu::Buffer,
    sphere_index_buffer: wgpu::Buffer,
    sphere_index_count: u32,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl ArenaRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<Self, MeshError> {
        // Uniform buffer
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("arena_uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("arena_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("arena_uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let skin_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skin_layout"),
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

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("skin_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let skins = Skin::ALL
            .iter()
            .map(|&skin| {
                let view = Self::create_skin_texture(device, queue, skin);
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(skin.name()),
                    layout: &skin_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                });
                SkinBinding { skin, bind_group }
            })
            .collect();

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("arena_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &skin_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("arena_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::ARENA_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("arena_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x2,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Sphere mesh shared by targets and fireballs
        let (sphere_verts, sphere_indices) = uv_sphere(16, 24)?;
        let sphere_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_vertex_buffer"),
            contents: bytemuck::cast_slice(&sphere_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let sphere_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_index_buffer"),
            contents: bytemuck::cast_slice(&sphere_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let sphere_index_count = sphere_indices.len() as u32;

        // Instance buffer (pre-allocated)
        let max_instances = 1_024u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("arena_instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Ok(Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            skins,
            sphere_vertex_buffer,
            sphere_index_buffer,
            sphere_index_count,
            instance_buffer,
            max_instances,
            depth_texture,
            surface_format,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Render one frame: every target, then every fireball.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &FlyCamera,
        arena: &Arena,
    ) {
        let vp = camera.view_projection();
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: vp.to_cols_array_2d(),
            }),
        );

        let mut sprites: Vec<(Skin, Mat4)> = arena
            .targets()
            .iter()
            .map(|t| (t.skin, t.model_matrix()))
            .chain(arena.fireballs().iter().map(|f| (f.skin, f.model_matrix())))
            .collect();
        if sprites.len() > self.max_instances as usize {
            tracing::warn!(max = self.max_instances, "instance buffer full, dropping sprites");
            sprites.truncate(self.max_instances as usize);
        }
        let ranges = skin_ranges(sprites.iter().map(|(skin, _)| *skin));
        let instances: Vec<InstanceData> = sprites.iter().map(|(_, m)| (*m).into()).collect();

        if !instances.is_empty() {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&instances),
            );
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("arena_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("arena_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.5,
                            g: 0.5,
                            b: 0.5,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if !instances.is_empty() {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.sphere_vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.set_index_buffer(
                    self.sphere_index_buffer.slice(..),
                    wgpu::IndexFormat::Uint16,
                );
                for (skin, range) in ranges {
                    if let Some(binding) = self.skins.iter().find(|b| b.skin == skin) {
                        pass.set_bind_group(1, &binding.bind_group, &[]);
                        pass.draw_indexed(0..self.sphere_index_count, 0, range);
                    }
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_skin_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        skin: Skin,
    ) -> wgpu::TextureView {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(skin.name()),
                size: wgpu::Extent3d {
                    width: SKIN_SIZE,
                    height: SKIN_SIZE,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &skin_pixels(skin, SKIN_SIZE),
        );
        texture.create_view(&Default::default())
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn instance_data_matches_matrix_columns() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let inst: InstanceData = m.into();
        assert_eq!(inst.model_3, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(inst.model_0, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn skin_ranges_group_runs() {
        let ranges = skin_ranges([Skin::Gold, Skin::Gold, Skin::Lava, Skin::Lava, Skin::Lava]);
        assert_eq!(ranges, vec![(Skin::Gold, 0..2), (Skin::Lava, 2..5)]);
        assert!(skin_ranges(Vec::<Skin>::new()).is_empty());
    }

    #[test]
    fn gpu_structs_are_tightly_packed() {
        assert_eq!(std::mem::size_of::<InstanceData>(), 64);
        assert_eq!(std::mem::size_of::<Uniforms>(), 64);
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
    }
}
