//! GPU side of sprite drawing: per-sprite textures plus vertex, index and
//! camera buffers fed from a `SpriteBatch` each frame.

use std::collections::HashMap;
use std::sync::Arc;

use wgpu::util::DeviceExt;

use bounce_core::AssetRegistry;

use crate::batch::{DrawCall, SpriteBatch};
use crate::camera::{Camera2D, Viewport};
use crate::gpu_context::GpuContext;
use crate::sprite_pipeline::SpritePipeline;
use crate::texture::Texture;
use crate::vertex::SpriteVertex;

struct GpuSpriteTexture {
    _texture: Texture,
    bind_group: wgpu::BindGroup,
}

pub struct SpriteRenderer {
    pipeline: SpritePipeline,
    textures: HashMap<Arc<str>, GpuSpriteTexture>,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    // Buffers grow (power-of-two) but never shrink.
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_capacity: usize,
    draw_calls: Vec<DrawCall>,
}

impl SpriteRenderer {
    pub fn new(gpu: &GpuContext, camera: &Camera2D) -> Self {
        let pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group = pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);

        Self {
            vertex_buffer: create_vertex_buffer(&gpu.device, 4),
            index_buffer: create_index_buffer(&gpu.device, 6),
            vertex_capacity: 4,
            index_capacity: 6,
            pipeline,
            textures: HashMap::new(),
            camera_buffer,
            camera_bind_group,
            draw_calls: Vec::new(),
        }
    }

    /// Uploads every sprite in the registry as its own texture.
    pub fn upload_sprites(&mut self, gpu: &GpuContext, assets: &AssetRegistry) {
        for (name, image) in assets.sprites() {
            let texture = Texture::from_sprite(&gpu.device, &gpu.queue, image, name);
            let bind_group = self
                .pipeline
                .create_texture_bind_group(&gpu.device, &texture);
            self.textures.insert(
                Arc::from(name),
                GpuSpriteTexture {
                    _texture: texture,
                    bind_group,
                },
            );
        }
        log::info!("Uploaded {} sprite textures", self.textures.len());
    }

    pub fn prepare(&mut self, gpu: &GpuContext, batch: &SpriteBatch, camera: &Camera2D) {
        gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera.build_uniform()]),
        );

        self.ensure_capacity(&gpu.device, batch.vertices.len(), batch.indices.len());
        if !batch.vertices.is_empty() {
            gpu.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&batch.vertices));
        }
        if !batch.indices.is_empty() {
            gpu.queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&batch.indices));
        }
        self.draw_calls.clone_from(&batch.draw_calls);
    }

    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        viewport: Viewport,
        clear_color: wgpu::Color,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Sprite Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });

        if self.draw_calls.is_empty() {
            return;
        }

        render_pass.set_viewport(
            viewport.x,
            viewport.y,
            viewport.width,
            viewport.height,
            0.0,
            1.0,
        );
        render_pass.set_pipeline(&self.pipeline.render_pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        let mut last_bound: Option<&Arc<str>> = None;
        for draw in &self.draw_calls {
            let Some(texture) = self.textures.get(&draw.texture_key) else {
                continue;
            };
            if last_bound.is_none_or(|last| **last != *draw.texture_key) {
                render_pass.set_bind_group(1, &texture.bind_group, &[]);
                last_bound = Some(&draw.texture_key);
            }
            render_pass.draw_indexed(
                draw.index_start..(draw.index_start + draw.index_count),
                0,
                0..1,
            );
        }
    }

    fn ensure_capacity(&mut self, device: &wgpu::Device, vertex_count: usize, index_count: usize) {
        if vertex_count > self.vertex_capacity {
            self.vertex_capacity = vertex_count.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(device, self.vertex_capacity);
        }
        if index_count > self.index_capacity {
            self.index_capacity = index_count.next_power_of_two();
            self.index_buffer = create_index_buffer(device, self.index_capacity);
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Vertex Buffer"),
        size: (vertex_capacity * std::mem::size_of::<SpriteVertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Index Buffer"),
        size: (index_capacity * std::mem::size_of::<u32>()) as u64,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
