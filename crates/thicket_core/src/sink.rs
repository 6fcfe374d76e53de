use glam::Mat4;

use crate::mesh::Mesh;
use crate::transform::Transform;

/// Output side of the generators. A render/scene adapter implements this;
/// the core never reads anything back from it.
pub trait SceneSink {
    fn submit(&mut self, name: &str, world: Mat4, mesh: &Mesh, color: [f32; 3]);
}

/// Generic node of a generated hierarchy (UFO parts, plant roots, tiles)
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    pub color: [f32; 3],
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn group(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            mesh: None,
            color: [1.0, 1.0, 1.0],
            children: Vec::new(),
        }
    }

    pub fn with_mesh(name: impl Into<String>, transform: Transform, mesh: Mesh, color: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            transform,
            mesh: Some(mesh),
            color,
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    /// Depth-first walk handing every mesh to the sink in world space
    pub fn emit(&self, parent: Mat4, sink: &mut dyn SceneSink) {
        let world = parent * self.transform.to_mat4();
        if let Some(mesh) = &self.mesh {
            sink.submit(&self.name, world, mesh, self.color);
        }
        for child in &self.children {
            child.emit(world, sink);
        }
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }
}

/// Sink that merges every submitted mesh into one world-space buffer
#[derive(Debug, Default)]
pub struct MeshCollector {
    pub mesh: Mesh,
    pub submissions: usize,
}

impl MeshCollector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SceneSink for MeshCollector {
    fn submit(&mut self, _name: &str, world: Mat4, mesh: &Mesh, _color: [f32; 3]) {
        self.mesh.append_transformed(mesh, world);
        self.submissions += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn triangle() -> Mesh {
        Mesh::new(vec![Vec3::ZERO, Vec3::Z, Vec3::X], vec![[0, 1, 2]])
    }

    #[test]
    fn test_emit_applies_hierarchy() {
        let mut root = SceneNode::group("root", Transform::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        let mut child = SceneNode::with_mesh(
            "child",
            Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            triangle(),
            [0.5; 3],
        );
        child.push(SceneNode::with_mesh(
            "grandchild",
            Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
            triangle(),
            [0.5; 3],
        ));
        root.push(child);

        let mut collector = MeshCollector::new();
        root.emit(Mat4::IDENTITY, &mut collector);

        assert_eq!(root.node_count(), 3);
        assert_eq!(collector.submissions, 2);
        assert_eq!(collector.mesh.vertex_count(), 6);
        assert_eq!(collector.mesh.vertices[0], Vec3::new(10.0, 1.0, 0.0));
        assert_eq!(collector.mesh.vertices[3], Vec3::new(10.0, 2.0, 0.0));
        assert!(collector.mesh.indices_valid());
    }
}
