use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Turn the mesh inside out: normals point inward and winding flips,
    /// so the surface is visible from within
    pub fn inverted(mut self) -> Self {
        for v in self.vertices.iter_mut() {
            v.normal = [-v.normal[0], -v.normal[1], -v.normal[2]];
        }
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        self
    }

    pub fn upload(&self, device: &wgpu::Device, label: &str) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vertices")),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} indices")),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }

    /// Append one quad with corners at `center ± u ± v`, counter-clockwise seen from `normal`
    fn push_quad(&mut self, center: Vec3, u: Vec3, v: Vec3, normal: Vec3) {
        let base = self.vertices.len() as u32;
        let corners = [(-1.0, -1.0, [0.0, 1.0]), (1.0, -1.0, [1.0, 1.0]), (1.0, 1.0, [1.0, 0.0]), (-1.0, 1.0, [0.0, 0.0])];
        for (su, sv, uv) in corners {
            let pos = center + u * su + v * sv;
            self.vertices.push(Vertex { pos: pos.to_array(), normal: normal.to_array(), uv });
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Axis-aligned box centred on the origin, one quad per face
pub fn box_mesh(size: Vec3) -> Mesh {
    let half = size * 0.5;
    // (normal, u, v) with u × v = normal
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut mesh = Mesh::default();
    for (normal, u, v) in faces {
        mesh.push_quad(normal * half, u * half, v * half, normal);
    }
    mesh
}

/// Flat horizontal surface in the XZ plane facing +Y
pub fn plane_mesh(width: f32, depth: f32) -> Mesh {
    let mut mesh = Mesh::default();
    mesh.push_quad(
        Vec3::ZERO,
        Vec3::X * (width * 0.5),
        Vec3::NEG_Z * (depth * 0.5),
        Vec3::Y,
    );
    mesh
}

/// UV sphere; `v` runs from the north pole (0) to the south pole (1)
pub fn sphere_mesh(radius: f32, width_segments: u32, height_segments: u32) -> Mesh {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut mesh = Mesh::default();

    for y in 0..=height_segments {
        let v = y as f32 / height_segments as f32;
        let theta = v * PI;
        for x in 0..=width_segments {
            let u = x as f32 / width_segments as f32;
            let phi = u * 2.0 * PI;
            let normal = Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
            mesh.vertices.push(Vertex {
                pos: (normal * radius).to_array(),
                normal: normal.to_array(),
                uv: [u, v],
            });
        }
    }

    let row = width_segments + 1;
    for y in 0..height_segments {
        for x in 0..width_segments {
            let a = y * row + x;
            let b = a + row;
            mesh.indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
        }
    }
    mesh
}
