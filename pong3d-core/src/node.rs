/// Scene graph nodes and hierarchical draw traversal
use crate::error::ConstructionError;
use crate::geometry::{GeometryHandle, GeometryKind, GeometryProvider};
use crate::math::{self, Mat4, Vec3};
use crate::render::{Renderer, ShaderHandle, TextureSlot};
use crate::texture::TextureHandle;
use crate::transform::Transform;

/// Geometry reference captured when a drawable node is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub handle: GeometryHandle,
    pub draw_count: u32,
}

/// What a node draws. There is no bare "base node": every node is one of
/// these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Transform-only grouping node, draws nothing
    Empty,
    /// Non-indexed cube geometry
    Cube(Geometry),
    /// Indexed sphere geometry
    Sphere(Geometry),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Material {
    pub diffuse: Option<TextureHandle>,
    pub specular: Option<TextureHandle>,
}

/// A placement in the scene: a local transform, what to draw there and the
/// children positioned relative to it.
///
/// Children are owned exclusively. Geometry and texture handles are plain
/// copies, so many nodes can share one mesh while each keeps its own
/// transform.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    kind: NodeKind,
    transform: Transform,
    material: Material,
    children: Vec<Node>,
}

impl Node {
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Empty)
    }

    pub fn cube(
        name: impl Into<String>,
        geometry: &mut impl GeometryProvider,
        side: f32,
    ) -> Result<Self, ConstructionError> {
        let geometry = Geometry::build(geometry, GeometryKind::Cube { side })?;
        Ok(Self::new(name, NodeKind::Cube(geometry)))
    }

    pub fn sphere(
        name: impl Into<String>,
        geometry: &mut impl GeometryProvider,
        slices: u32,
        radius: f32,
    ) -> Result<Self, ConstructionError> {
        let geometry = Geometry::build(geometry, GeometryKind::Sphere { slices, radius })?;
        Ok(Self::new(name, NodeKind::Sphere(geometry)))
    }

    /// Node over an already created geometry. Lets many placements share
    /// one mesh.
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: Transform::new(),
            material: Material::default(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn model(&self) -> &Mat4 {
        self.transform.model()
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.transform.set_position(x, y, z);
    }

    /// Move relative to the current position.
    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.transform.translate(dx, dy, dz);
    }

    /// Absolute rotation about x; replaces any previous x rotation.
    pub fn rotate_x(&mut self, theta: f32) {
        self.transform.rotate_x(theta);
    }

    pub fn rotate_y(&mut self, theta: f32) {
        self.transform.rotate_y(theta);
    }

    pub fn rotate_z(&mut self, theta: f32) {
        self.transform.rotate_z(theta);
    }

    pub fn set_scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.transform.set_scale(sx, sy, sz);
    }

    pub fn attach_diffuse_texture(&mut self, texture: TextureHandle) {
        self.material.diffuse = Some(texture);
    }

    pub fn detach_diffuse_texture(&mut self) {
        self.material.diffuse = None;
    }

    pub fn attach_specular_texture(&mut self, texture: TextureHandle) {
        self.material.specular = Some(texture);
    }

    pub fn detach_specular_texture(&mut self) {
        self.material.specular = None;
    }

    /// Append a child. Taking the node by value makes sharing one node under
    /// two parents (and therefore cycles) unrepresentable.
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.children.get_mut(index)
    }

    /// Depth-first search of this subtree (self included) by name.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Node> {
        if self.name == name {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(name))
    }

    /// One draw call with this node's local model matrix. Does not recurse.
    pub fn draw(&self, renderer: &mut dyn Renderer, shader: ShaderHandle) {
        self.draw_with_model(renderer, shader, self.transform.model());
    }

    /// Draw this subtree with every node placed under `parent`.
    ///
    /// Pre-order, children in insertion order. World matrices are composed
    /// into temporaries; no node is modified.
    pub fn draw_hierarchy(&self, renderer: &mut dyn Renderer, shader: ShaderHandle, parent: &Mat4) {
        self.visit(parent, &mut |node, world| {
            node.draw_with_model(renderer, shader, world);
        });
    }

    /// Walk the subtree pre-order, passing each node with its world matrix
    /// (`parent · local`, accumulated down the tree).
    pub fn visit(&self, parent: &Mat4, f: &mut dyn FnMut(&Node, &Mat4)) {
        let world = math::multiply(parent, self.transform.model());
        f(self, &world);
        for child in &self.children {
            child.visit(&world, f);
        }
    }

    fn draw_with_model(&self, renderer: &mut dyn Renderer, shader: ShaderHandle, model: &Mat4) {
        let (geometry, indexed) = match self.kind {
            NodeKind::Empty => return,
            NodeKind::Cube(geometry) => (geometry, false),
            NodeKind::Sphere(geometry) => (geometry, true),
        };

        renderer.set_model_matrix(shader, model);
        renderer.bind_texture(TextureSlot::Diffuse, self.material.diffuse);
        renderer.bind_texture(TextureSlot::Specular, self.material.specular);
        if indexed {
            renderer.draw_indexed(geometry.handle, geometry.draw_count);
        } else {
            renderer.draw_arrays(geometry.handle, geometry.draw_count);
        }
    }
}

impl Geometry {
    /// Ask the provider for a primitive and capture its draw count.
    pub fn build(
        provider: &mut impl GeometryProvider,
        kind: GeometryKind,
    ) -> Result<Self, ConstructionError> {
        let handle = provider.create_geometry(kind)?;
        Ok(Self {
            handle,
            draw_count: provider.draw_count(handle),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MeshLibrary;
    use crate::render::{RecordingRenderer, Topology};

    const EPSILON: f32 = 1e-5;
    const SHADER: ShaderHandle = ShaderHandle(0);

    fn vec3_approx(a: &Vec3, b: &Vec3) -> bool {
        (a - b).abs().max() < EPSILON
    }

    fn snapshot(node: &Node, out: &mut Vec<Mat4>) {
        out.push(*node.model());
        for child in node.children() {
            snapshot(child, out);
        }
    }

    fn three_levels(library: &mut MeshLibrary) -> Node {
        let mut root = Node::cube("root", library, 1.0).unwrap();
        root.set_position(1.0, 0.0, 0.0);
        root.rotate_y(0.3);

        let mut child = Node::cube("child", library, 0.5).unwrap();
        child.set_position(0.0, 1.0, 0.0);
        child.set_scale(2.0, 2.0, 2.0);

        let mut grandchild = Node::sphere("grandchild", library, 8, 0.25).unwrap();
        grandchild.set_position(0.0, 0.0, 1.0);

        child.add_child(grandchild);
        root.add_child(child);
        root
    }

    #[test]
    fn test_child_world_position_composes_parent() {
        let mut library = MeshLibrary::new();
        let mut parent = Node::cube("parent", &mut library, 1.0).unwrap();
        parent.set_position(1.0, 0.0, 0.0);
        let mut child = Node::cube("child", &mut library, 1.0).unwrap();
        child.set_position(0.0, 1.0, 0.0);
        parent.add_child(child);

        let mut renderer = RecordingRenderer::new();
        parent.draw_hierarchy(&mut renderer, SHADER, &math::identity());

        assert_eq!(renderer.commands.len(), 2);
        let child_world = math::transform_point(&renderer.commands[1].model, &Vec3::zeros());
        assert!(vec3_approx(&child_world, &Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_draw_hierarchy_leaves_models_untouched() {
        let mut library = MeshLibrary::new();
        let root = three_levels(&mut library);

        let mut before = Vec::new();
        snapshot(&root, &mut before);

        let mut renderer = RecordingRenderer::new();
        root.draw_hierarchy(&mut renderer, SHADER, &math::translation(0.0, -3.0, 2.0));

        let mut after = Vec::new();
        snapshot(&root, &mut after);
        assert_eq!(before, after);
    }

    #[test]
    fn test_pre_order_and_topology() {
        let mut library = MeshLibrary::new();
        let mut root = three_levels(&mut library);
        let second = Node::cube("second", &mut library, 1.0).unwrap();
        root.add_child(second);

        let mut names = Vec::new();
        root.visit(&math::identity(), &mut |node, _| {
            names.push(node.name().to_string())
        });
        assert_eq!(names, ["root", "child", "grandchild", "second"]);

        let mut renderer = RecordingRenderer::new();
        root.draw_hierarchy(&mut renderer, SHADER, &math::identity());
        let topologies: Vec<Topology> = renderer.commands.iter().map(|c| c.topology).collect();
        assert_eq!(
            topologies,
            [
                Topology::Arrays,
                Topology::Arrays,
                Topology::Indexed,
                Topology::Arrays
            ]
        );
    }

    #[test]
    fn test_empty_nodes_draw_nothing_but_place_children() {
        let mut library = MeshLibrary::new();
        let mut group = Node::empty("group");
        group.set_position(0.0, 2.0, 0.0);
        group.set_scale(3.0, 3.0, 3.0);
        let mut leaf = Node::cube("leaf", &mut library, 1.0).unwrap();
        leaf.set_position(1.0, 0.0, 0.0);
        group.add_child(leaf);

        let mut renderer = RecordingRenderer::new();
        group.draw(&mut renderer, SHADER);
        assert!(renderer.commands.is_empty());

        group.draw_hierarchy(&mut renderer, SHADER, &math::identity());
        assert_eq!(renderer.commands.len(), 1);
        let world = math::transform_point(&renderer.commands[0].model, &Vec3::zeros());
        assert!(vec3_approx(&world, &Vec3::new(3.0, 2.0, 0.0)));
    }

    #[test]
    fn test_draw_uses_local_model_only() {
        let mut library = MeshLibrary::new();
        let mut root = three_levels(&mut library);
        root.find_mut("child").unwrap().set_position(4.0, 0.0, 0.0);

        let child = &root.children()[0];
        let mut renderer = RecordingRenderer::new();
        child.draw(&mut renderer, SHADER);
        assert_eq!(renderer.commands.len(), 1);
        assert_eq!(renderer.commands[0].model, *child.model());
    }

    #[test]
    fn test_texture_attach_and_detach() {
        let mut library = MeshLibrary::new();
        let mut cube = Node::cube("cube", &mut library, 1.0).unwrap();
        cube.attach_diffuse_texture(TextureHandle(4));
        cube.attach_specular_texture(TextureHandle(5));

        let mut renderer = RecordingRenderer::new();
        cube.draw(&mut renderer, SHADER);
        cube.detach_diffuse_texture();
        cube.draw(&mut renderer, SHADER);

        assert_eq!(renderer.commands[0].diffuse, Some(TextureHandle(4)));
        assert_eq!(renderer.commands[0].specular, Some(TextureHandle(5)));
        assert_eq!(renderer.commands[1].diffuse, None);
        assert_eq!(renderer.commands[1].specular, Some(TextureHandle(5)));
    }

    #[test]
    fn test_invalid_primitive_is_rejected() {
        let mut library = MeshLibrary::new();
        assert_eq!(
            Node::sphere("bad", &mut library, 5, 1.0).unwrap_err(),
            ConstructionError::OddSliceCount(5)
        );
    }
}
