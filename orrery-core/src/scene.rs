/// Scene graph: an arena-backed tree of transform nodes.
///
/// Every node is owned by its parent; the root is created with the graph
/// and lives as long as it does. Removing a node drops its whole subtree.
/// Reparenting is checked so the parent chain can never form a cycle.
use nalgebra::Matrix4;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::Mesh;
use crate::lighting::Rgb;
use crate::transform::{RotationState, Transform};

/// Handle to a node in a [`SceneGraph`].
///
/// The generation guards against a removed slot being reused: a stale id
/// never resolves to the node that later took its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// A single node: transform, optional geometry and spin
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    pub mesh: Option<Rc<Mesh>>,
    pub color: Rgb,
    /// Angular velocity in radians per second
    pub spin: Option<RotationState>,
    /// Invisible nodes hide their whole subtree from rendering and picking
    pub visible: bool,
}

impl Node {
    /// An empty grouping node
    pub fn new() -> Self {
        Self {
            name: None,
            transform: Transform::identity(),
            mesh: None,
            color: Rgb::WHITE,
            spin: None,
            visible: true,
        }
    }

    pub fn with_mesh(mesh: Rc<Mesh>) -> Self {
        Self {
            mesh: Some(mesh),
            ..Self::new()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.position = nalgebra::Point3::new(x, y, z);
        self
    }

    pub fn colored(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn spinning(mut self, rate: RotationState) -> Self {
        self.spin = Some(rate);
        self
    }

    /// Apply this node's spin for `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        if let Some(rate) = self.spin {
            self.transform.rotation.advance(&rate, dt);
        }
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Debug)]
struct Entry {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A visible node visited by [`SceneGraph::traverse`]
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub id: NodeId,
    pub node: &'a Node,
    pub world: Matrix4<f32>,
}

/// Tree of transform nodes with parent-owns-child lifetimes
#[derive(Debug)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
    len: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = NodeId {
            index: 0,
            generation: 0,
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                entry: Some(Entry {
                    node: Node::new().named("scene"),
                    parent: None,
                    children: Vec::new(),
                }),
            }],
            free: Vec::new(),
            root,
            len: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes below the root
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.entry(id).is_ok()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.entry(id).ok().map(|e| &e.node)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.entry_mut(id).ok().map(|e| &mut e.node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id).ok().and_then(|e| e.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.entry(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// First node in traversal order with the given name
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let entry = self.entry(id).ok()?;
            if entry.node.name.as_deref() == Some(name) {
                return Some(id);
            }
            stack.extend(entry.children.iter().rev());
        }
        None
    }

    /// Insert `node` as the last child of `parent`
    pub fn add(&mut self, parent: NodeId, node: Node) -> Result<NodeId> {
        self.entry(parent)?;

        let entry = Entry {
            node,
            parent: Some(parent),
            children: Vec::new(),
        };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.entry = Some(entry);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        };

        self.entry_mut(parent)?.children.push(id);
        self.len += 1;
        debug!(node = %id, parent = %parent, "added scene node");
        Ok(id)
    }

    /// Move `child` (and its subtree) under `new_parent`.
    ///
    /// Fails with [`Error::Cycle`] when `new_parent` is `child` itself or
    /// one of its descendants.
    pub fn attach(&mut self, child: NodeId, new_parent: NodeId) -> Result<()> {
        if child == self.root {
            return Err(Error::RootRemoval);
        }
        self.entry(child)?;
        self.entry(new_parent)?;

        let mut cursor = Some(new_parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(Error::Cycle {
                    child,
                    parent: new_parent,
                });
            }
            cursor = self.parent(id);
        }

        if let Some(old_parent) = self.parent(child) {
            self.entry_mut(old_parent)?.children.retain(|c| *c != child);
        }
        self.entry_mut(child)?.parent = Some(new_parent);
        self.entry_mut(new_parent)?.children.push(child);
        debug!(node = %child, parent = %new_parent, "reparented scene node");
        Ok(())
    }

    /// Remove `id` and every descendant, returning the removed node
    pub fn remove(&mut self, id: NodeId) -> Result<Node> {
        if id == self.root {
            return Err(Error::RootRemoval);
        }
        let parent = self.entry(id)?.parent;
        if let Some(parent) = parent {
            self.entry_mut(parent)?.children.retain(|c| *c != id);
        }

        let mut removed = None;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.index];
            if slot.generation != current.generation {
                continue;
            }
            if let Some(entry) = slot.entry.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                self.len -= 1;
                stack.extend(entry.children);
                if current == id {
                    removed = Some(entry.node);
                }
            }
        }

        debug!(node = %id, "removed scene subtree");
        removed.ok_or(Error::UnknownNode(id))
    }

    /// World matrix of `id`: its local matrix composed with every ancestor's
    pub fn world_matrix(&self, id: NodeId) -> Result<Matrix4<f32>> {
        let mut matrix = Matrix4::identity();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let entry = self.entry(current)?;
            matrix = entry.node.transform.matrix() * matrix;
            cursor = entry.parent;
        }
        Ok(matrix)
    }

    /// Visible nodes below the root in depth-first pre-order, children in
    /// insertion order, each with its composed world matrix. Hiding the
    /// root hides everything.
    pub fn traverse(&self) -> Vec<Visit<'_>> {
        let mut visits = Vec::with_capacity(self.len);
        let Ok(root) = self.entry(self.root) else {
            return visits;
        };
        if !root.node.visible {
            return visits;
        }

        let root_world = root.node.transform.matrix();
        let mut stack: Vec<(NodeId, Matrix4<f32>)> = root
            .children
            .iter()
            .rev()
            .map(|c| (*c, root_world))
            .collect();

        while let Some((id, parent_world)) = stack.pop() {
            let Ok(entry) = self.entry(id) else {
                continue;
            };
            if !entry.node.visible {
                continue;
            }
            let world = parent_world * entry.node.transform.matrix();
            visits.push(Visit {
                id,
                node: &entry.node,
                world,
            });
            stack.extend(entry.children.iter().rev().map(|c| (*c, world)));
        }

        visits
    }

    /// Advance every spinning node by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        for entry in self.slots.iter_mut().filter_map(|s| s.entry.as_mut()) {
            entry.node.advance(dt);
        }
    }

    fn entry(&self, id: NodeId) -> Result<&Entry> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
            .ok_or(Error::UnknownNode(id))
    }

    fn entry_mut(&mut self, id: NodeId) -> Result<&mut Entry> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
            .ok_or(Error::UnknownNode(id))
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use std::f32::consts::FRAC_PI_2;

    fn solar() -> (SceneGraph, NodeId, NodeId, NodeId) {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let sun = scene.add(root, Node::new().named("sun")).unwrap();
        let earth = scene.add(sun, Node::new().named("earth").at(6.0, 0.0, 0.0)).unwrap();
        let moon = scene.add(earth, Node::new().named("moon").at(2.0, 0.0, 0.0)).unwrap();
        (scene, sun, earth, moon)
    }

    #[test]
    fn test_new_scene_is_empty() {
        let scene = SceneGraph::new();
        assert!(scene.is_empty());
        assert!(scene.traverse().is_empty());
        assert_eq!(scene.get(scene.root()).unwrap().label(), "scene");
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let (mut scene, sun, _, moon) = solar();
        let origin = Point3::origin();

        let p = scene.world_matrix(moon).unwrap().transform_point(&origin);
        assert!((p - Point3::new(8.0, 0.0, 0.0)).norm() < 1e-5);

        // A quarter turn of the sun carries the earth and moon with it
        scene.get_mut(sun).unwrap().transform.rotation.z = FRAC_PI_2;
        let p = scene.world_matrix(moon).unwrap().transform_point(&origin);
        assert!((p - Point3::new(0.0, 8.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_traverse_is_preorder_and_matches_world_matrix() {
        let (scene, sun, earth, moon) = solar();
        let visits = scene.traverse();
        let ids: Vec<NodeId> = visits.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![sun, earth, moon]);
        for visit in visits {
            let expected = scene.world_matrix(visit.id).unwrap();
            assert!((visit.world - expected).norm() < 1e-5);
        }
    }

    #[test]
    fn test_invisible_node_hides_subtree() {
        let (mut scene, _, earth, _) = solar();
        scene.get_mut(earth).unwrap().visible = false;
        assert_eq!(scene.traverse().len(), 1);
    }

    #[test]
    fn test_hidden_root_hides_whole_scene() {
        let (mut scene, ..) = solar();
        let root = scene.root();
        scene.get_mut(root).unwrap().visible = false;
        assert!(scene.traverse().is_empty());

        scene.get_mut(root).unwrap().visible = true;
        assert_eq!(scene.traverse().len(), 3);
    }

    #[test]
    fn test_attach_rejects_cycles() {
        let (mut scene, sun, earth, moon) = solar();
        assert!(matches!(scene.attach(sun, moon), Err(Error::Cycle { .. })));
        assert!(matches!(scene.attach(earth, earth), Err(Error::Cycle { .. })));
        assert!(matches!(
            scene.attach(scene.root(), sun),
            Err(Error::RootRemoval)
        ));

        scene.attach(moon, sun).unwrap();
        assert_eq!(scene.parent(moon), Some(sun));
        assert_eq!(scene.children(sun), &[earth, moon]);
        assert!(scene.children(earth).is_empty());
    }

    #[test]
    fn test_remove_drops_subtree_and_invalidates_ids() {
        let (mut scene, sun, earth, moon) = solar();
        let removed = scene.remove(earth).unwrap();
        assert_eq!(removed.name.as_deref(), Some("earth"));
        assert_eq!(scene.len(), 1);
        assert!(!scene.contains(moon));
        assert!(scene.children(sun).is_empty());

        // Reused slots do not resurrect stale ids
        let comet = scene.add(sun, Node::new().named("comet")).unwrap();
        assert!(scene.get(earth).is_none());
        assert!(scene.get(moon).is_none());
        assert_eq!(scene.get(comet).unwrap().label(), "comet");

        assert!(matches!(scene.remove(earth), Err(Error::UnknownNode(_))));
        assert!(matches!(scene.remove(scene.root()), Err(Error::RootRemoval)));
    }

    #[test]
    fn test_add_under_unknown_parent_fails() {
        let (mut scene, _, earth, _) = solar();
        scene.remove(earth).unwrap();
        assert!(scene.add(earth, Node::new()).is_err());
    }

    #[test]
    fn test_find_by_name() {
        let (scene, _, _, moon) = solar();
        assert_eq!(scene.find_by_name("moon"), Some(moon));
        assert_eq!(scene.find_by_name("pluto"), None);
    }

    #[test]
    fn test_advance_spins_nodes() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let fast = scene
            .add(root, Node::new().spinning(RotationState::new(0.0, 0.0, 10.0)))
            .unwrap();
        let still = scene.add(root, Node::new()).unwrap();

        scene.advance(0.1);
        scene.advance(0.1);
        assert!((scene.get(fast).unwrap().transform.rotation.z - 2.0).abs() < 1e-5);
        assert!(scene.get(still).unwrap().transform.rotation.is_zero());
    }
}
