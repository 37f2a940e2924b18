//! Hierarchical transform graph.
//!
//! `TransformGraph` owns every [`Transform`] in an arena keyed by
//! generation-checked [`NodeKey`] handles, so a stale handle is an error
//! instead of a dangling pointer. Parent links are plain keys; the reverse
//! direction (parent to children) is kept by each node's
//! [`TransformNotifier`], whose subscriber list doubles as the child list
//! for change propagation.
//!
//! Propagation is synchronous and depth-first: mutating a node refreshes
//! its own state, then walks its subtree re-deriving world state level by
//! level. A child never notifies its parent. The notifier list is
//! snapshotted before each broadcast, so subscription changes made while a
//! broadcast runs only affect later broadcasts.

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use crate::error::MathError;
use crate::matrix::Matrix;
use crate::transform::Transform;

new_key_type! {
    /// Stable, generation-checked handle to a node in a [`TransformGraph`].
    pub struct NodeKey;
}

/// Failures raised by [`TransformGraph`] operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// A handle that does not (or no longer does) refer to a live node.
    #[error("unknown or removed node")]
    UnknownNode,

    /// A reparenting operation that would make a node its own ancestor.
    #[error("reparenting would create a cycle")]
    CycleDetected,

    /// A math failure surfacing through a graph operation, e.g. a singular
    /// parent world matrix during a world-space update.
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Identifier for a notifier subscription.
///
/// Ids are handed out from a per-notifier monotonic counter starting at 1
/// and are never reused while the subscription lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Events broadcast from a parent node to its subscribed children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformEvent {
    /// The parent's world state changed.
    Changed,
    /// The parent was removed from the graph.
    Destroyed,
}

/// Subscription registry mapping listener ids to child node handles.
///
/// Broadcast order across subscribers is unspecified.
#[derive(Debug, Default, Clone)]
pub struct TransformNotifier {
    listeners: Vec<(ListenerId, NodeKey)>,
    next_id: u64,
}

impl TransformNotifier {
    /// Creates an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `subscriber` and returns its subscription id.
    pub fn subscribe(&mut self, subscriber: NodeKey) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, subscriber));
        id
    }

    /// Removes the subscription with the given id.
    ///
    /// Returns whether a subscription was present; unsubscribing an
    /// already-removed id is a no-op.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    /// Snapshot of the subscribed node handles.
    #[must_use]
    pub fn listeners(&self) -> Vec<NodeKey> {
        self.listeners.iter().map(|(_, key)| *key).collect()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no one is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[derive(Debug)]
struct Node {
    transform: Transform,
    parent: Option<NodeKey>,
    // Subscription held in the parent's notifier while parented.
    listener: Option<ListenerId>,
    notifier: TransformNotifier,
}

impl Node {
    fn new(transform: Transform) -> Self {
        Self {
            transform,
            parent: None,
            listener: None,
            notifier: TransformNotifier::new(),
        }
    }
}

/// Arena-backed transform hierarchy with synchronous change propagation.
#[derive(Debug, Default)]
pub struct TransformGraph {
    nodes: SlotMap<NodeKey, Node>,
}

impl TransformGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `key` refers to a live node.
    #[must_use]
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Inserts `transform` as a root node.
    pub fn insert(&mut self, transform: Transform) -> NodeKey {
        let key = self.nodes.insert(Node::new(transform));
        log::debug!("inserted root node {key:?}");
        key
    }

    /// Inserts `transform` as a child of `parent`.
    ///
    /// With `keep_world` the transform's world placement is preserved and
    /// its local state re-derived against the parent; otherwise the local
    /// state is kept and interpreted relative to the parent.
    pub fn insert_child(
        &mut self,
        parent: NodeKey,
        transform: Transform,
        keep_world: bool,
    ) -> Result<NodeKey, SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::UnknownNode);
        }

        let key = self.insert(transform);

        match self.attach(key, parent, keep_world) {
            Ok(()) => Ok(key),
            Err(error) => {
                self.nodes.remove(key);
                Err(error)
            }
        }
    }

    /// Removes a node, returning its transform.
    ///
    /// Children are notified that their parent was destroyed: each bakes
    /// its world state into its local state, becomes a root, and its own
    /// subtree is refreshed.
    pub fn remove(&mut self, key: NodeKey) -> Option<Transform> {
        // Detach from the parent's notifier first.
        if let Some((parent, Some(listener))) =
            self.nodes.get(key).map(|node| (node.parent, node.listener))
        {
            if let Some(parent) = parent {
                if let Some(parent_node) = self.nodes.get_mut(parent) {
                    parent_node.notifier.unsubscribe(listener);
                }
            }
        }

        let node = self.nodes.remove(key)?;
        log::debug!("removed node {key:?}");

        for child in node.notifier.listeners() {
            self.deliver(child, TransformEvent::Destroyed, None);
        }

        Some(node.transform)
    }

    /// Shared read access to a node's transform.
    #[must_use]
    pub fn transform(&self, key: NodeKey) -> Option<&Transform> {
        self.nodes.get(key).map(|node| &node.transform)
    }

    /// The node's parent, if it has one.
    #[must_use]
    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|node| node.parent)
    }

    /// Whether the node is currently parented.
    #[must_use]
    pub fn has_parent(&self, key: NodeKey) -> bool {
        self.parent(key).is_some()
    }

    /// Snapshot of the node's direct children.
    #[must_use]
    pub fn children(&self, key: NodeKey) -> Vec<NodeKey> {
        self.nodes
            .get(key)
            .map(|node| node.notifier.listeners())
            .unwrap_or_default()
    }

    /// Parents `child` under `parent`.
    ///
    /// A no-op when the parent is unchanged. Fails with `CycleDetected`
    /// when `parent` is `child` or one of its descendants. `keep_world`
    /// chooses which side of the child's state survives, as in
    /// [`TransformGraph::insert_child`]; preserving world placement needs
    /// an invertible parent world matrix.
    pub fn set_parent(
        &mut self,
        child: NodeKey,
        parent: NodeKey,
        keep_world: bool,
    ) -> Result<(), SceneError> {
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            return Err(SceneError::UnknownNode);
        }

        if self.nodes[child].parent == Some(parent) {
            return Ok(());
        }

        self.ensure_no_cycle(child, parent)?;
        self.detach(child);
        self.attach(child, parent, keep_world)
    }

    /// Detaches `child` from its parent, making it a root.
    ///
    /// Returns `false` when the node was already a root. With `keep_world`
    /// the world placement survives (local state is rewritten); otherwise
    /// the local state survives and becomes the world state.
    pub fn remove_parent(&mut self, child: NodeKey, keep_world: bool) -> Result<bool, SceneError> {
        if !self.nodes.contains_key(child) {
            return Err(SceneError::UnknownNode);
        }

        if !self.detach(child) {
            return Ok(false);
        }

        let node = &mut self.nodes[child];

        if keep_world {
            node.transform.bake_world_into_local();
        } else {
            node.transform.refresh_world(None);
        }

        self.propagate_changed(child);
        Ok(true)
    }

    /// Mutates a node's local state and propagates the change.
    ///
    /// The closure works on the bare [`Transform`]; afterwards the world
    /// state is re-derived against the parent and the subtree refreshed.
    pub fn update_local(
        &mut self,
        key: NodeKey,
        mutate: impl FnOnce(&mut Transform),
    ) -> Result<(), SceneError> {
        let parent_world = self.parent_world(key)?;
        let node = &mut self.nodes[key];

        mutate(&mut node.transform);
        node.transform.refresh_world(parent_world.as_ref());

        self.propagate_changed(key);
        Ok(())
    }

    /// Mutates a node's world state and propagates the change.
    ///
    /// The local state is re-derived as `parent_world.inverse() * world`;
    /// a singular parent world matrix fails with `NonInvertible` and
    /// leaves the node untouched.
    pub fn update_world(
        &mut self,
        key: NodeKey,
        mutate: impl FnOnce(&mut Transform),
    ) -> Result<(), SceneError> {
        let parent_world = self.parent_world(key)?;

        // Work on a copy so a singular parent leaves the node unchanged.
        let mut updated = self.nodes[key].transform.clone();
        mutate(&mut updated);
        updated.refresh_local(parent_world.as_ref())?;

        self.nodes[key].transform = updated;
        self.propagate_changed(key);
        Ok(())
    }

    // World matrix of the node's parent, if any. UnknownNode for stale keys.
    fn parent_world(&self, key: NodeKey) -> Result<Option<Matrix>, SceneError> {
        let node = self.nodes.get(key).ok_or(SceneError::UnknownNode)?;

        Ok(node
            .parent
            .and_then(|parent| self.nodes.get(parent))
            .map(|parent| parent.transform.world_matrix().clone()))
    }

    fn ensure_no_cycle(&self, child: NodeKey, parent: NodeKey) -> Result<(), SceneError> {
        let mut ancestor = Some(parent);

        while let Some(key) = ancestor {
            if key == child {
                return Err(SceneError::CycleDetected);
            }

            ancestor = self.nodes.get(key).and_then(|node| node.parent);
        }

        Ok(())
    }

    // Unsubscribes from the current parent. Returns whether there was one.
    fn detach(&mut self, child: NodeKey) -> bool {
        let Some((Some(parent), listener)) =
            self.nodes.get(child).map(|node| (node.parent, node.listener))
        else {
            return false;
        };

        if let (Some(parent_node), Some(listener)) = (self.nodes.get_mut(parent), listener) {
            parent_node.notifier.unsubscribe(listener);
        }

        let node = &mut self.nodes[child];
        node.parent = None;
        node.listener = None;
        true
    }

    // Links child under parent and re-derives the chosen side of its state.
    fn attach(&mut self, child: NodeKey, parent: NodeKey, keep_world: bool) -> Result<(), SceneError> {
        let parent_world = self.nodes[parent].transform.world_matrix().clone();

        if keep_world {
            // Fallible: do it before touching any links.
            let node = &mut self.nodes[child];
            node.transform.refresh_local(Some(&parent_world))?;
        } else {
            let node = &mut self.nodes[child];
            node.transform.refresh_world(Some(&parent_world));
        }

        let listener = self.nodes[parent].notifier.subscribe(child);
        let node = &mut self.nodes[child];
        node.parent = Some(parent);
        node.listener = Some(listener);

        log::debug!("parented {child:?} under {parent:?} (keep_world: {keep_world})");
        self.propagate_changed(child);
        Ok(())
    }

    // Depth-first world refresh of the subtree below `key`. The listener
    // list is snapshotted per node before descending.
    fn propagate_changed(&mut self, key: NodeKey) {
        let children = match self.nodes.get(key) {
            Some(node) => node.notifier.listeners(),
            None => return,
        };

        if children.is_empty() {
            return;
        }

        log::trace!("propagating change below {key:?} to {} children", children.len());
        let parent_world = self.nodes[key].transform.world_matrix().clone();

        for child in children {
            self.deliver(child, TransformEvent::Changed, Some(&parent_world));
        }
    }

    // Child-side event handling. `Changed` re-derives the child's world
    // state from the parent; `Destroyed` bakes the world placement into
    // the local state and promotes the child to a root. Both then refresh
    // the child's own subtree.
    fn deliver(&mut self, child: NodeKey, event: TransformEvent, parent_world: Option<&Matrix>) {
        let Some(child_node) = self.nodes.get_mut(child) else {
            return;
        };

        match event {
            TransformEvent::Changed => {
                child_node.transform.refresh_world(parent_world);
            }
            TransformEvent::Destroyed => {
                child_node.transform.bake_world_into_local();
                child_node.parent = None;
                child_node.listener = None;
            }
        }

        self.propagate_changed(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::Radian;
    use crate::quaternion::Quaternion;
    use crate::vector::Vec3;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    const EPSILON: f32 = 1.0e-5;

    fn translated(x: f32, y: f32, z: f32) -> Transform {
        Transform::new(Vec3::new(x, y, z), Quaternion::identity(), Vec3::one())
    }

    #[test]
    fn test_notifier_ids_are_monotonic_and_unsubscribe_is_idempotent() {
        let mut graph = TransformGraph::new();
        let a = graph.insert(Transform::identity());
        let b = graph.insert(Transform::identity());

        let mut notifier = TransformNotifier::new();
        let first = notifier.subscribe(a);
        let second = notifier.subscribe(b);

        assert_ne!(first, second);
        assert_eq!(notifier.len(), 2);

        assert!(notifier.unsubscribe(first));
        assert!(!notifier.unsubscribe(first));
        assert_eq!(notifier.listeners(), vec![b]);
    }

    #[test]
    fn test_insert_and_remove_roots() {
        let mut graph = TransformGraph::new();
        assert!(graph.is_empty());

        let key = graph.insert(translated(1.0, 2.0, 3.0));
        assert_eq!(graph.len(), 1);
        assert!(graph.contains(key));
        assert!(!graph.has_parent(key));

        let transform = graph.remove(key).unwrap();
        assert_relative_eq!(transform.position(), Vec3::new(1.0, 2.0, 3.0), epsilon = EPSILON);
        assert!(graph.is_empty());
        assert!(graph.remove(key).is_none());
    }

    #[test]
    fn test_stale_handles_are_rejected() {
        let mut graph = TransformGraph::new();
        let key = graph.insert(Transform::identity());
        graph.remove(key);

        assert_eq!(
            graph.update_local(key, |_| {}),
            Err(SceneError::UnknownNode)
        );
        assert!(graph.transform(key).is_none());
    }

    #[test]
    fn test_child_world_accumulates_parent() {
        let mut graph = TransformGraph::new();
        let parent = graph.insert(translated(1.0, 0.0, 0.0));
        let child = graph
            .insert_child(parent, translated(0.0, 2.0, 0.0), false)
            .unwrap();

        let child_transform = graph.transform(child).unwrap();
        assert_relative_eq!(
            child_transform.world_position(),
            Vec3::new(1.0, 2.0, 0.0),
            epsilon = EPSILON
        );
        assert_relative_eq!(
            child_transform.position(),
            Vec3::new(0.0, 2.0, 0.0),
            epsilon = EPSILON
        );
        assert_eq!(graph.parent(child), Some(parent));
        assert_eq!(graph.children(parent), vec![child]);
    }

    #[test]
    fn test_keep_world_preserves_placement() {
        let mut graph = TransformGraph::new();
        let parent = graph.insert(translated(5.0, 0.0, 0.0));
        let child = graph.insert(translated(1.0, 1.0, 1.0));

        graph.set_parent(child, parent, true).unwrap();

        let child_transform = graph.transform(child).unwrap();
        assert_relative_eq!(
            child_transform.world_position(),
            Vec3::new(1.0, 1.0, 1.0),
            epsilon = EPSILON
        );
        assert_relative_eq!(
            child_transform.position(),
            Vec3::new(-4.0, 1.0, 1.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_parent_mutation_cascades() {
        let mut graph = TransformGraph::new();
        let root = graph.insert(Transform::identity());
        let middle = graph
            .insert_child(root, translated(0.0, 1.0, 0.0), false)
            .unwrap();
        let leaf = graph
            .insert_child(middle, translated(0.0, 0.0, 2.0), false)
            .unwrap();

        graph
            .update_local(root, |t| {
                t.set_position(Vec3::new(10.0, 0.0, 0.0));
            })
            .unwrap();

        assert_relative_eq!(
            graph.transform(middle).unwrap().world_position(),
            Vec3::new(10.0, 1.0, 0.0),
            epsilon = EPSILON
        );
        assert_relative_eq!(
            graph.transform(leaf).unwrap().world_position(),
            Vec3::new(10.0, 1.0, 2.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_world_update_rewrites_local() {
        let mut graph = TransformGraph::new();
        let parent = graph.insert(translated(3.0, 0.0, 0.0));
        let child = graph
            .insert_child(parent, Transform::identity(), false)
            .unwrap();

        graph
            .update_world(child, |t| {
                t.set_world_position(Vec3::new(3.0, 5.0, 0.0));
            })
            .unwrap();

        let child_transform = graph.transform(child).unwrap();
        assert_relative_eq!(
            child_transform.position(),
            Vec3::new(0.0, 5.0, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_world_update_fails_on_singular_parent() {
        let mut graph = TransformGraph::new();
        let parent = graph.insert(Transform::new(
            Vec3::zero(),
            Quaternion::identity(),
            Vec3::new(0.0, 1.0, 1.0),
        ));
        let child = graph
            .insert_child(parent, Transform::identity(), false)
            .unwrap();

        let before = graph.transform(child).unwrap().clone();
        let result = graph.update_world(child, |t| {
            t.set_world_position(Vec3::one());
        });

        assert_eq!(result, Err(SceneError::Math(MathError::NonInvertible)));
        // Failed update leaves the child untouched.
        assert_eq!(*graph.transform(child).unwrap(), before);
    }

    #[test]
    fn test_cycle_detection() {
        let mut graph = TransformGraph::new();
        let a = graph.insert(Transform::identity());
        let b = graph.insert_child(a, Transform::identity(), false).unwrap();
        let c = graph.insert_child(b, Transform::identity(), false).unwrap();

        assert_eq!(graph.set_parent(a, c, false), Err(SceneError::CycleDetected));
        assert_eq!(graph.set_parent(a, a, false), Err(SceneError::CycleDetected));

        // Reparenting sideways is fine.
        graph.set_parent(c, a, false).unwrap();
        assert_eq!(graph.parent(c), Some(a));
    }

    #[test]
    fn test_reparent_to_same_parent_is_a_no_op() {
        let mut graph = TransformGraph::new();
        let parent = graph.insert(translated(1.0, 0.0, 0.0));
        let child = graph
            .insert_child(parent, translated(0.0, 1.0, 0.0), false)
            .unwrap();

        let before = graph.transform(child).unwrap().clone();
        graph.set_parent(child, parent, true).unwrap();
        assert_eq!(*graph.transform(child).unwrap(), before);
        assert_eq!(graph.children(parent).len(), 1);
    }

    #[test]
    fn test_remove_parent_keep_world() {
        let mut graph = TransformGraph::new();
        let parent = graph.insert(translated(4.0, 0.0, 0.0));
        let child = graph
            .insert_child(parent, translated(0.0, 1.0, 0.0), false)
            .unwrap();

        assert!(graph.remove_parent(child, true).unwrap());
        assert!(!graph.has_parent(child));
        assert!(graph.children(parent).is_empty());

        let child_transform = graph.transform(child).unwrap();
        assert_relative_eq!(
            child_transform.position(),
            Vec3::new(4.0, 1.0, 0.0),
            epsilon = EPSILON
        );

        // Already a root: reports false.
        assert!(!graph.remove_parent(child, true).unwrap());
    }

    #[test]
    fn test_remove_parent_keep_local() {
        let mut graph = TransformGraph::new();
        let parent = graph.insert(translated(4.0, 0.0, 0.0));
        let child = graph
            .insert_child(parent, translated(0.0, 1.0, 0.0), false)
            .unwrap();

        assert!(graph.remove_parent(child, false).unwrap());

        let child_transform = graph.transform(child).unwrap();
        assert_relative_eq!(
            child_transform.world_position(),
            Vec3::new(0.0, 1.0, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_destroying_parent_detaches_children_in_place() {
        let mut graph = TransformGraph::new();
        let parent = graph.insert(translated(2.0, 0.0, 0.0));
        let child = graph
            .insert_child(parent, translated(0.0, 3.0, 0.0), false)
            .unwrap();
        let grandchild = graph
            .insert_child(child, translated(0.0, 0.0, 1.0), false)
            .unwrap();

        graph.remove(parent);

        let child_transform = graph.transform(child).unwrap();
        assert!(!graph.has_parent(child));
        assert_relative_eq!(
            child_transform.position(),
            Vec3::new(2.0, 3.0, 0.0),
            epsilon = EPSILON
        );
        assert_relative_eq!(
            child_transform.world_position(),
            Vec3::new(2.0, 3.0, 0.0),
            epsilon = EPSILON
        );

        // The grandchild keeps both its link and its world placement.
        assert_eq!(graph.parent(grandchild), Some(child));
        assert_relative_eq!(
            graph.transform(grandchild).unwrap().world_position(),
            Vec3::new(2.0, 3.0, 1.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_rotated_parent_transforms_child_world_position() {
        let mut graph = TransformGraph::new();
        let parent = graph.insert(Transform::new(
            Vec3::zero(),
            Quaternion::from_axis_angle(Radian::new(PI / 2.0), Vec3::up()),
            Vec3::one(),
        ));
        let child = graph
            .insert_child(parent, translated(1.0, 0.0, 0.0), false)
            .unwrap();

        // Parent yaw maps the child's +X offset onto -Z.
        assert_relative_eq!(
            graph.transform(child).unwrap().world_position(),
            Vec3::new(0.0, 0.0, -1.0),
            epsilon = EPSILON
        );
    }
}
