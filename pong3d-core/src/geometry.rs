/// Geometry primitives and the geometry provider boundary
use std::f32::consts::PI;

use crate::error::ConstructionError;
use crate::math::{self, Vec3};
use crate::render::Topology;

/// Floats per interleaved vertex: position, normal, uv
pub const VERTEX_STRIDE: usize = 8;

/// A vertex with position, normal and texture coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal from the winding order, `None` for a degenerate face
    pub fn calculate_normal(&self) -> Option<Vec3> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        math::normalize(&math::cross(&edge1, &edge2)).ok()
    }
}

/// Primitive kinds a geometry provider can build
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryKind {
    Cube { side: f32 },
    Sphere { slices: u32, radius: f32 },
}

/// Opaque handle to geometry owned by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub u32);

/// Builds vertex data and hands out handles that stay valid for the
/// provider's lifetime.
pub trait GeometryProvider {
    fn create_geometry(&mut self, kind: GeometryKind) -> Result<GeometryHandle, ConstructionError>;

    /// Vertices (non-indexed) or indices (indexed) to draw for `handle`.
    fn draw_count(&self, handle: GeometryHandle) -> u32;
}

/// A triangle-list mesh, optionally indexed.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Option<Vec<u16>>,
}

impl Mesh {
    /// Axis-aligned cube centred on the origin: 6 faces, 36 vertices, no indices.
    pub fn cube(side: f32) -> Result<Self, ConstructionError> {
        if side.is_nan() || side <= 0.0 {
            return Err(ConstructionError::NonPositiveSideLength(side));
        }
        let half = side / 2.0;

        // (outward normal, u axis, v axis) with u × v == normal
        let faces = [
            (Vec3::z(), Vec3::x(), Vec3::y()),
            (-Vec3::z(), -Vec3::x(), Vec3::y()),
            (Vec3::x(), -Vec3::z(), Vec3::y()),
            (-Vec3::x(), Vec3::z(), Vec3::y()),
            (Vec3::y(), Vec3::x(), -Vec3::z()),
            (-Vec3::y(), Vec3::x(), Vec3::z()),
        ];
        let corners: [(f32, f32); 6] = [
            (-1.0, -1.0),
            (1.0, -1.0),
            (1.0, 1.0),
            (1.0, 1.0),
            (-1.0, 1.0),
            (-1.0, -1.0),
        ];

        let mut vertices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            for (su, sv) in corners {
                let position = (normal + u * su + v * sv) * half;
                let uv = [(su + 1.0) / 2.0, (sv + 1.0) / 2.0];
                vertices.push(Vertex::new(position, normal, uv));
            }
        }

        Ok(Self {
            vertices,
            indices: None,
        })
    }

    /// UV sphere: a bottom pole, `slices / 2 - 1` rings of `slices` vertices
    /// and a top pole, stitched with 16-bit indices.
    pub fn sphere(slices: u32, radius: f32) -> Result<Self, ConstructionError> {
        if slices % 2 != 0 {
            return Err(ConstructionError::OddSliceCount(slices));
        }
        if slices < 4 {
            return Err(ConstructionError::TooFewSlices(slices));
        }
        if radius.is_nan() || radius <= 0.0 {
            return Err(ConstructionError::NonPositiveRadius(radius));
        }

        let slices = slices as usize;
        let rings = slices / 2 - 1;
        let vertex_count = 2 + rings * slices;
        if vertex_count > usize::from(u16::MAX) + 1 {
            return Err(ConstructionError::TooManyVertices(vertex_count));
        }

        let step = 2.0 * PI / slices as f32;
        let mut vertices = Vec::with_capacity(vertex_count);
        vertices.push(sphere_vertex(-Vec3::y(), radius));
        for i in 1..=rings {
            let (ring_radius, y) = (i as f32 * step).sin_cos();
            for j in 0..slices {
                let (sin_j, cos_j) = (j as f32 * step).sin_cos();
                let direction = Vec3::new(cos_j * ring_radius, -y, sin_j * ring_radius);
                vertices.push(sphere_vertex(direction, radius));
            }
        }
        vertices.push(sphere_vertex(Vec3::y(), radius));

        let ring_start = |ring: usize| 1 + (ring - 1) * slices;
        let top = vertex_count - 1;
        let mut indices: Vec<usize> = Vec::with_capacity(6 * slices * rings);

        for j in 0..slices {
            let next = (j + 1) % slices;
            indices.extend([0, ring_start(1) + j, ring_start(1) + next]);
        }
        for ring in 1..rings {
            let lower = ring_start(ring);
            let upper = ring_start(ring + 1);
            for j in 0..slices {
                let next = (j + 1) % slices;
                indices.extend([lower + j, upper + j, lower + next]);
                indices.extend([lower + next, upper + j, upper + next]);
            }
        }
        for j in 0..slices {
            let next = (j + 1) % slices;
            indices.extend([top, ring_start(rings) + next, ring_start(rings) + j]);
        }

        // vertex_count was checked against the u16 range above
        let indices = indices.into_iter().map(|i| i as u16).collect();

        Ok(Self {
            vertices,
            indices: Some(indices),
        })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> Option<&[u16]> {
        self.indices.as_deref()
    }

    pub fn topology(&self) -> Topology {
        match self.indices {
            Some(_) => Topology::Indexed,
            None => Topology::Arrays,
        }
    }

    pub fn draw_count(&self) -> u32 {
        match &self.indices {
            Some(indices) => indices.len() as u32,
            None => self.vertices.len() as u32,
        }
    }

    /// Position, normal and uv packed per vertex for GPU upload
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.vertices.len() * VERTEX_STRIDE);
        for v in &self.vertices {
            out.extend_from_slice(&[
                v.position.x,
                v.position.y,
                v.position.z,
                v.normal.x,
                v.normal.y,
                v.normal.z,
                v.uv[0],
                v.uv[1],
            ]);
        }
        out
    }

    /// Triangles covered by the first `count` vertices or indices.
    pub fn triangles(&self, count: u32) -> Vec<Triangle> {
        let count = count as usize;
        let order: Vec<usize> = match &self.indices {
            Some(indices) => indices.iter().take(count).map(|&i| usize::from(i)).collect(),
            None => (0..count.min(self.vertices.len())).collect(),
        };
        order
            .chunks_exact(3)
            .filter_map(|face| {
                let v0 = self.vertices.get(face[0])?;
                let v1 = self.vertices.get(face[1])?;
                let v2 = self.vertices.get(face[2])?;
                Some(Triangle::new(*v0, *v1, *v2))
            })
            .collect()
    }
}

fn sphere_vertex(direction: Vec3, radius: f32) -> Vertex {
    let u = direction.x.atan2(direction.z) / (2.0 * PI) + 0.5;
    let v = direction.y.clamp(-1.0, 1.0).asin() / PI + 0.5;
    Vertex::new(direction * radius, direction, [u, v])
}

/// In-memory geometry provider backing the CPU and recording renderers.
#[derive(Debug, Default)]
pub struct MeshLibrary {
    meshes: Vec<Mesh>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self, handle: GeometryHandle) -> Option<&Mesh> {
        self.meshes.get(handle.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl GeometryProvider for MeshLibrary {
    fn create_geometry(&mut self, kind: GeometryKind) -> Result<GeometryHandle, ConstructionError> {
        let mesh = match kind {
            GeometryKind::Cube { side } => Mesh::cube(side),
            GeometryKind::Sphere { slices, radius } => Mesh::sphere(slices, radius),
        }
        .inspect_err(|e| log::warn!("rejected {kind:?}: {e}"))?;

        let handle = GeometryHandle(self.meshes.len() as u32);
        log::debug!(
            "geometry {:?} = {:?}, {} vertices, draw count {}",
            handle,
            kind,
            mesh.vertices.len(),
            mesh.draw_count()
        );
        self.meshes.push(mesh);
        Ok(handle)
    }

    fn draw_count(&self, handle: GeometryHandle) -> u32 {
        match self.mesh(handle) {
            Some(mesh) => mesh.draw_count(),
            None => {
                log::warn!("draw count requested for unknown {handle:?}");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_cube_layout() {
        let cube = Mesh::cube(2.0).unwrap();
        assert_eq!(cube.vertices().len(), 36);
        assert_eq!(cube.topology(), Topology::Arrays);
        assert_eq!(cube.draw_count(), 36);
        assert_eq!(cube.interleaved().len(), 36 * VERTEX_STRIDE);
        for v in cube.vertices() {
            assert!((v.position.abs().max() - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_cube_winding_faces_outward() {
        let cube = Mesh::cube(1.0).unwrap();
        for triangle in cube.triangles(36) {
            let face = triangle.calculate_normal().unwrap();
            let declared = triangle.vertices[0].normal;
            assert!((face - declared).abs().max() < EPSILON);
        }
    }

    #[test]
    fn test_cube_rejects_non_positive_side() {
        assert_eq!(
            Mesh::cube(0.0).unwrap_err(),
            ConstructionError::NonPositiveSideLength(0.0)
        );
    }

    #[test]
    fn test_sphere_counts() {
        let sphere = Mesh::sphere(20, 0.05).unwrap();
        assert_eq!(sphere.vertices().len(), 2 + 9 * 20);
        assert_eq!(sphere.topology(), Topology::Indexed);
        // caps: 2 * slices triangles, bands: (rings - 1) * slices * 2 triangles
        assert_eq!(sphere.draw_count(), 3 * (2 * 20 + 8 * 20 * 2));
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let radius = 2.5;
        let sphere = Mesh::sphere(8, radius).unwrap();
        for v in sphere.vertices() {
            assert!((math::length(&v.position) - radius).abs() < 1e-4);
            assert!((math::length(&v.normal) - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sphere_winding_faces_outward() {
        let sphere = Mesh::sphere(12, 1.0).unwrap();
        for triangle in sphere.triangles(sphere.draw_count()) {
            let face = triangle.calculate_normal().unwrap();
            let centroid = (triangle.vertices[0].position
                + triangle.vertices[1].position
                + triangle.vertices[2].position)
                / 3.0;
            assert!(math::dot(&face, &centroid) > 0.0);
        }
    }

    #[test]
    fn test_sphere_parameter_errors() {
        assert_eq!(
            Mesh::sphere(7, 1.0).unwrap_err(),
            ConstructionError::OddSliceCount(7)
        );
        assert_eq!(
            Mesh::sphere(2, 1.0).unwrap_err(),
            ConstructionError::TooFewSlices(2)
        );
        assert_eq!(
            Mesh::sphere(8, -1.0).unwrap_err(),
            ConstructionError::NonPositiveRadius(-1.0)
        );
        assert!(matches!(
            Mesh::sphere(400, 1.0),
            Err(ConstructionError::TooManyVertices(_))
        ));
    }

    #[test]
    fn test_library_hands_out_stable_handles() {
        let mut library = MeshLibrary::new();
        let cube = library
            .create_geometry(GeometryKind::Cube { side: 1.0 })
            .unwrap();
        let sphere = library
            .create_geometry(GeometryKind::Sphere {
                slices: 20,
                radius: 0.05,
            })
            .unwrap();
        assert_ne!(cube, sphere);
        assert_eq!(library.draw_count(cube), 36);
        assert_eq!(library.draw_count(sphere), 1080);
        assert_eq!(library.draw_count(GeometryHandle(99)), 0);

        assert!(library
            .create_geometry(GeometryKind::Sphere {
                slices: 3,
                radius: 1.0
            })
            .is_err());
        assert_eq!(library.len(), 2);
    }
}
