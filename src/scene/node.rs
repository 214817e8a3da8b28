use crate::assets::{MaterialHandle, MeshHandle};
use crate::scene::NodeHandle;
use crate::scene::transform::Transform;

/// One node of a prefab hierarchy.
///
/// A node is renderable only when it carries both a mesh and a material;
/// otherwise it only contributes its transform to its children.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    /// Parent-relative transform
    pub transform: Transform,
    /// Invisible nodes hide their whole subtree
    pub visible: bool,
    pub mesh: Option<MeshHandle>,
    pub material: Option<MaterialHandle>,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::new(),
            visible: true,
            mesh: None,
            material: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// A renderable node.
    #[must_use]
    pub fn with_mesh(
        name: impl Into<String>,
        mesh: MeshHandle,
        material: MaterialHandle,
        transform: Transform,
    ) -> Self {
        Self {
            transform,
            mesh: Some(mesh),
            material: Some(material),
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Mesh and material, when both are present.
    #[inline]
    #[must_use]
    pub fn renderable(&self) -> Option<(MeshHandle, MaterialHandle)> {
        self.mesh.zip(self.material)
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("Node")
    }
}
