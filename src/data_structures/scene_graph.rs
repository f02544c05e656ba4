//! Scene graph and hierarchical scene organization.
//!
//! A [`Scene`] owns flat tables of geometries, materials and textures and a tree
//! of [`Node`]s that reference them by handle. World transforms are resolved by
//! walking the tree from the root, composing each group's local transform with
//! its children's.

use anyhow::*;
use log::debug;

use crate::data_structures::{
    color::Color,
    geometry::{Geometry, GeometryId},
    instance::Transform,
    light::Light,
    material::{Material, MaterialId},
    model::Mesh,
    texture::{TextureId, TextureMap},
};

/// Linear distance fog blended into every lit fragment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

/// A transform node holding an ordered list of children.
#[derive(Clone, Debug)]
pub struct Group {
    pub name: String,
    pub transform: Transform,
    pub children: Vec<Node>,
}

impl Group {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::default(),
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn add(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.children.iter().filter_map(|child| match child {
            Node::Mesh(mesh) => Some(mesh),
            _ => None,
        })
    }
}

#[derive(Clone, Debug)]
pub enum Node {
    Mesh(Mesh),
    Group(Group),
    Light(Light),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Mesh(mesh) => &mesh.name,
            Node::Group(group) => &group.name,
            Node::Light(light) => &light.name,
        }
    }
}

impl From<Mesh> for Node {
    fn from(mesh: Mesh) -> Self {
        Node::Mesh(mesh)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

impl From<Light> for Node {
    fn from(light: Light) -> Self {
        Node::Light(light)
    }
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub background: Color,
    pub fog: Option<Fog>,
    children: Vec<Node>,
    geometries: Vec<Geometry>,
    materials: Vec<Material>,
    textures: Vec<TextureMap>,
    disposed: bool,
}

impl Scene {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            fog: None,
            children: Vec::new(),
            geometries: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            disposed: false,
        }
    }

    pub fn with_fog(mut self, fog: Fog) -> Self {
        self.fog = Some(fog);
        self
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn add_texture(&mut self, texture: TextureMap) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    pub fn add(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id.0)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn texture(&self, id: TextureId) -> Option<&TextureMap> {
        self.textures.get(id.0)
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn textures(&self) -> &[TextureMap] {
        &self.textures
    }

    /// First node with the given name, searched depth first.
    pub fn find(&self, name: &str) -> Option<&Node> {
        fn search<'a>(nodes: &'a [Node], name: &str) -> Option<&'a Node> {
            for node in nodes {
                if node.name() == name {
                    return Some(node);
                }
                if let Node::Group(group) = node {
                    if let Some(found) = search(&group.children, name) {
                        return Some(found);
                    }
                }
            }
            None
        }
        search(&self.children, name)
    }

    /// Every mesh paired with its world transform, in tree order.
    pub fn get_world_meshes(&self) -> Vec<(&Mesh, Transform)> {
        let mut out = Vec::new();
        fn walk<'a>(nodes: &'a [Node], parent: &Transform, out: &mut Vec<(&'a Mesh, Transform)>) {
            for node in nodes {
                match node {
                    Node::Mesh(mesh) => out.push((mesh, parent * &mesh.transform)),
                    Node::Group(group) => walk(&group.children, &(parent * &group.transform), out),
                    Node::Light(_) => (),
                }
            }
        }
        walk(&self.children, &Transform::default(), &mut out);
        out
    }

    /// Lights are positioned in world space and are only collected from the
    /// top level.
    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.children.iter().filter_map(|node| match node {
            Node::Light(light) => Some(light),
            _ => None,
        })
    }

    /// Check that every handle in the tree resolves into this scene's tables.
    pub fn validate(&self) -> Result<()> {
        for (mesh, _) in self.get_world_meshes() {
            let material = self
                .material(mesh.material)
                .with_context(|| format!("mesh '{}' references a missing material", mesh.name))?;
            if self.geometry(mesh.geometry).is_none() {
                bail!("mesh '{}' references a missing geometry", mesh.name);
            }
            for texture in material.textures() {
                if self.texture(texture).is_none() {
                    bail!("material '{}' references a missing texture", material.name);
                }
            }
        }
        Ok(())
    }

    /// Release every geometry, material and texture the scene owns.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for geometry in &mut self.geometries {
            geometry.dispose();
        }
        for material in &mut self.materials {
            for texture in material.textures() {
                if let Some(map) = self.textures.get_mut(texture.0) {
                    map.dispose();
                }
            }
            material.dispose();
        }
        // Textures not referenced by any material go as well.
        for texture in &mut self.textures {
            texture.dispose();
        }
        debug!(
            "disposed scene: {} geometries, {} materials, {} textures",
            self.geometries.len(),
            self.materials.len(),
            self.textures.len()
        );
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_transform_composes_parent_and_child() {
        let mut scene = Scene::new(Color::BLACK);
        let geometry = scene.add_geometry(Geometry::cuboid(1.0, 1.0, 1.0));
        let material = scene.add_material(Material::standard("m", Color::WHITE, 1.0, 0.0));
        let mut group = Group::new("g").with_transform(Transform::at(0.0, 2.0, 0.0));
        group.add(Mesh::new("child", geometry, material).with_transform(Transform::at(1.0, 0.0, 0.0)));
        scene.add(group);

        let meshes = scene.get_world_meshes();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].1.position, cgmath::Vector3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn validate_rejects_dangling_handles() {
        let mut scene = Scene::new(Color::BLACK);
        scene.add(Mesh::new("orphan", GeometryId(3), MaterialId(0)));
        assert!(scene.validate().is_err());
    }
}
