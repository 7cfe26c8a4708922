//! Persistent instance tree.
//!
//! [`InstanceTree`] owns the instances that survive between frames. Each call
//! to [`InstanceTree::commit`] reconciles a whole description tree against the
//! previous one, level by level, using [`reconcile_children`]. Commits are
//! transactional: the new tree is built beside the old one and only replaces
//! it once every level reconciled successfully.
//!
//! [`reconcile_children`]: crate::reconcile_children

use std::fmt;

use ahash::AHashMap;
use loom_tui_core::{
    ErrorCode, Fatal, InstanceId, InstanceIdAllocator, Result, VNode, WidgetKind,
    DEFAULT_MAX_DEPTH,
};
use slotmap::{new_key_type, SlotMap};

use crate::reconcile::{reconcile_children_with_parent, PrevChild};

new_key_type! {
    /// A key identifying a node in the instance arena.
    pub struct InstanceKey;
}

/// A persistent node.
///
/// Instances keep the identity-relevant parts of the description they last
/// rendered; the description itself is owned by the caller's frame.
#[derive(Debug, Clone)]
pub struct InstanceNode {
    /// Stable identity.
    pub id: InstanceId,
    /// Kind of the description last rendered.
    pub kind: WidgetKind,
    /// Reconciliation key of the description last rendered.
    pub key: Option<String>,
    /// Widget id prop of the description last rendered.
    pub widget_id: Option<String>,
    children: Vec<InstanceKey>,
}

impl InstanceNode {
    fn from_vnode(id: InstanceId, vnode: &VNode) -> Self {
        Self {
            id,
            kind: vnode.kind(),
            key: vnode.key().map(str::to_owned),
            widget_id: vnode.id().map(str::to_owned),
            children: Vec::new(),
        }
    }
}

/// What one commit changed, in tree pre-order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Instances created by this commit.
    pub mounted: Vec<InstanceId>,
    /// Instances that survived from the previous commit.
    pub reused: Vec<InstanceId>,
    /// Instances destroyed by this commit, parents before their descendants.
    pub unmounted: Vec<InstanceId>,
}

/// The persistent instance tree.
///
/// # Example
///
/// ```
/// use loom_tui_core::{StackProps, VNode};
/// use loom_tui_reconcile::InstanceTree;
///
/// let mut tree = InstanceTree::new();
/// let first = tree
///     .commit(&VNode::column(StackProps::new(), [VNode::text("a").with_key("a")]))
///     .unwrap();
/// assert_eq!(first.mounted.len(), 2);
///
/// let second = tree
///     .commit(&VNode::column(StackProps::new(), [VNode::text("A").with_key("a")]))
///     .unwrap();
/// assert_eq!(second.reused, first.mounted);
/// ```
pub struct InstanceTree {
    nodes: SlotMap<InstanceKey, InstanceNode>,
    root: Option<InstanceKey>,
    allocator: InstanceIdAllocator,
    max_depth: usize,
}

impl fmt::Debug for InstanceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceTree")
            .field("len", &self.nodes.len())
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl Default for InstanceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceTree {
    /// Creates an empty tree with a fresh allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_allocator(InstanceIdAllocator::new())
    }

    /// Creates an empty tree that allocates ids from `allocator`.
    #[must_use]
    pub fn with_allocator(allocator: InstanceIdAllocator) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
            allocator,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum nesting depth a commit accepts.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Returns the number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing has been committed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the root instance, if any.
    #[must_use]
    pub fn root(&self) -> Option<&InstanceNode> {
        self.root.and_then(|key| self.nodes.get(key))
    }

    /// Returns the instance stored under `key`.
    #[must_use]
    pub fn get(&self, key: InstanceKey) -> Option<&InstanceNode> {
        self.nodes.get(key)
    }

    /// Returns the child instances of `key` in order.
    pub fn children(&self, key: InstanceKey) -> impl Iterator<Item = (InstanceKey, &InstanceNode)> {
        self.nodes
            .get(key)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&child| self.nodes.get(child).map(|node| (child, node)))
    }

    /// Returns the root's arena key.
    #[must_use]
    pub fn root_key(&self) -> Option<InstanceKey> {
        self.root
    }

    /// Returns every instance id in pre-order.
    #[must_use]
    pub fn ids_preorder(&self) -> Vec<InstanceId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        if let Some(root) = self.root {
            collect_subtree(&self.nodes, root, &mut out);
        }
        out
    }

    /// Unmounts everything, returning the destroyed ids in pre-order.
    pub fn clear(&mut self) -> Vec<InstanceId> {
        let ids = self.ids_preorder();
        self.nodes.clear();
        self.root = None;
        ids
    }

    /// Reconciles `root` against the previous commit.
    ///
    /// The root instance survives when kind and key are unchanged. On failure
    /// the previous tree is left untouched.
    ///
    /// # Errors
    ///
    /// `DUPLICATE_KEY` from any sibling list, `DUPLICATE_ID` when two instances
    /// in the new tree share a widget id, `DEPTH_LIMIT` when the tree is nested
    /// deeper than the configured maximum.
    pub fn commit(&mut self, root: &VNode) -> Result<CommitReport> {
        let mut pass = CommitPass {
            old: &self.nodes,
            next: SlotMap::with_capacity_and_key(self.nodes.len().max(16)),
            allocator: &mut self.allocator,
            report: CommitReport::default(),
            widget_ids: AHashMap::new(),
            max_depth: self.max_depth,
        };

        let old_root = self.root.and_then(|key| {
            let node = self.nodes.get(key)?;
            (node.kind == root.kind() && node.key.as_deref() == root.key()).then_some(key)
        });

        let root_id = match old_root {
            Some(key) => {
                let id = self.nodes[key].id;
                pass.report.reused.push(id);
                id
            }
            None => {
                if let Some(previous) = self.root {
                    collect_subtree(&self.nodes, previous, &mut pass.report.unmounted);
                }
                let id = pass.allocator.allocate();
                pass.report.mounted.push(id);
                id
            }
        };

        let new_root = pass.commit_node(root_id, old_root, root, 0)?;
        let CommitPass { next, report, .. } = pass;

        self.nodes = next;
        self.root = Some(new_root);

        tracing::trace!(
            mounted = report.mounted.len(),
            reused = report.reused.len(),
            unmounted = report.unmounted.len(),
            "committed instance tree"
        );
        Ok(report)
    }
}

struct CommitPass<'a> {
    old: &'a SlotMap<InstanceKey, InstanceNode>,
    next: SlotMap<InstanceKey, InstanceNode>,
    allocator: &'a mut InstanceIdAllocator,
    report: CommitReport,
    widget_ids: AHashMap<String, InstanceId>,
    max_depth: usize,
}

impl CommitPass<'_> {
    fn commit_node(
        &mut self,
        id: InstanceId,
        old_key: Option<InstanceKey>,
        vnode: &VNode,
        depth: usize,
    ) -> Result<InstanceKey> {
        if depth >= self.max_depth {
            return Err(Fatal::new(
                ErrorCode::DepthLimit,
                format!(
                    "instance {id} ({}) is nested deeper than {} levels",
                    vnode.kind(),
                    self.max_depth
                ),
            ));
        }

        if let Some(widget_id) = vnode.id() {
            if let Some(&other) = self.widget_ids.get(widget_id) {
                tracing::debug!(widget_id, first = %other, second = %id, "duplicate widget id");
                return Err(Fatal::new(
                    ErrorCode::DuplicateId,
                    format!("duplicate widget id {widget_id:?} on instances {other} and {id}"),
                ));
            }
            self.widget_ids.insert(widget_id.to_owned(), id);
        }

        let old = self.old;
        let old_children: &[InstanceKey] = old_key
            .and_then(|key| old.get(key))
            .map(|node| node.children.as_slice())
            .unwrap_or_default();
        let prev: Vec<Option<PrevChild<'_>>> = old_children
            .iter()
            .map(|&key| {
                old.get(key)
                    .map(|node| PrevChild::new(node.id, node.kind, node.key.as_deref()))
            })
            .collect();

        let outcome = reconcile_children_with_parent(
            id,
            Some(vnode.kind()),
            &prev,
            vnode.children(),
            self.allocator,
        )?;

        if !outcome.unmounted_instance_ids.is_empty() {
            for (&key, child) in old_children.iter().zip(&prev) {
                let Some(child) = child else { continue };
                if outcome.unmounted_instance_ids.contains(&child.instance_id) {
                    collect_subtree(old, key, &mut self.report.unmounted);
                }
            }
        }

        let mut children = Vec::with_capacity(outcome.next_children.len());
        for plan in &outcome.next_children {
            let Some(child) = vnode.children()[plan.next_index].as_ref() else {
                continue;
            };
            let child_old_key = plan.prev_index.map(|index| old_children[index]);
            if plan.is_new() {
                self.report.mounted.push(plan.instance_id);
            } else {
                self.report.reused.push(plan.instance_id);
            }
            children.push(self.commit_node(plan.instance_id, child_old_key, child, depth + 1)?);
        }

        let mut node = InstanceNode::from_vnode(id, vnode);
        node.children = children;
        Ok(self.next.insert(node))
    }
}

fn collect_subtree(
    nodes: &SlotMap<InstanceKey, InstanceNode>,
    root: InstanceKey,
    out: &mut Vec<InstanceId>,
) {
    let mut stack = vec![root];
    while let Some(key) = stack.pop() {
        if let Some(node) = nodes.get(key) {
            out.push(node.id);
            stack.extend(node.children.iter().rev());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_tui_core::{GridProps, StackProps};
    use pretty_assertions::assert_eq;

    fn ids(raw: &[u64]) -> Vec<InstanceId> {
        raw.iter().copied().map(InstanceId::from_raw).collect()
    }

    fn column(children: impl IntoIterator<Item = VNode>) -> VNode {
        VNode::column(StackProps::new(), children)
    }

    #[test]
    fn test_first_commit_mounts_in_preorder() {
        let mut tree = InstanceTree::new();
        let report = tree
            .commit(&column([
                VNode::row(StackProps::new(), [VNode::text("a"), VNode::text("b")]),
                VNode::text("c"),
            ]))
            .unwrap();

        // Siblings are allocated together before descending, so ids are not
        // in pre-order even though the report is.
        assert_eq!(report.mounted, ids(&[1, 2, 4, 5, 3]));
        assert_eq!(tree.ids_preorder(), ids(&[1, 2, 4, 5, 3]));
        assert_eq!(tree.len(), 5);
        assert!(report.unmounted.is_empty());
    }

    #[test]
    fn test_recommit_reuses_keyed_subtrees() {
        let mut tree = InstanceTree::new();
        tree.commit(&column([
            VNode::row(StackProps::new(), [VNode::text("x")]).with_key("left"),
            VNode::text("y").with_key("right"),
        ]))
        .unwrap();

        let report = tree
            .commit(&column([
                VNode::text("y2").with_key("right"),
                VNode::row(StackProps::new(), [VNode::text("x2")]).with_key("left"),
            ]))
            .unwrap();

        assert!(report.mounted.is_empty());
        assert!(report.unmounted.is_empty());
        assert_eq!(report.reused, ids(&[1, 3, 2, 4]));
    }

    #[test]
    fn test_unmount_includes_descendants_parent_first() {
        let mut tree = InstanceTree::new();
        tree.commit(&column([
            VNode::row(StackProps::new(), [VNode::text("a"), VNode::text("b")]).with_key("gone"),
            VNode::text("kept").with_key("kept"),
        ]))
        .unwrap();

        let report = tree
            .commit(&column([VNode::text("kept").with_key("kept")]))
            .unwrap();

        assert_eq!(report.unmounted, ids(&[2, 4, 5]));
        assert_eq!(report.reused, ids(&[1, 3]));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_root_kind_change_remounts_everything() {
        let mut tree = InstanceTree::new();
        tree.commit(&column([VNode::text("a")])).unwrap();

        let report = tree
            .commit(&VNode::grid(GridProps::new(2u32), [VNode::text("a")]))
            .unwrap();

        assert_eq!(report.unmounted, ids(&[1, 2]));
        assert_eq!(report.mounted, ids(&[3, 4]));
        assert!(report.reused.is_empty());
    }

    #[test]
    fn test_duplicate_widget_id_is_fatal_and_keeps_previous_tree() {
        let mut tree = InstanceTree::new();
        tree.commit(&column([VNode::text("a")])).unwrap();
        let before = tree.ids_preorder();

        let err = tree
            .commit(&column([
                VNode::text("a").with_id("field"),
                VNode::row(StackProps::new(), [VNode::text("b").with_id("field")]),
            ]))
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DuplicateId);
        assert!(err.detail.contains("\"field\""), "{}", err.detail);
        assert_eq!(tree.ids_preorder(), before);
    }

    #[test]
    fn test_duplicate_key_deep_in_tree_is_fatal() {
        let mut tree = InstanceTree::new();
        let err = tree
            .commit(&column([VNode::row(
                StackProps::new(),
                [VNode::text("a").with_key("k"), VNode::text("b").with_key("k")],
            )]))
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DuplicateKey);
        assert!(err.detail.contains("(row)"), "{}", err.detail);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_depth_limit() {
        let mut node = VNode::text("leaf");
        for _ in 0..10 {
            node = column([node]);
        }
        let mut tree = InstanceTree::new();
        tree.set_max_depth(5);

        let err = tree.commit(&node).unwrap_err();
        assert_eq!(err.code, ErrorCode::DepthLimit);
    }

    #[test]
    fn test_clear_returns_preorder_ids() {
        let mut tree = InstanceTree::new();
        tree.commit(&column([VNode::text("a"), VNode::text("b")]))
            .unwrap();
        assert_eq!(tree.clear(), ids(&[1, 2, 3]));
        assert!(tree.root().is_none());
    }

    #[test]
    fn test_children_iteration() {
        let mut tree = InstanceTree::new();
        tree.commit(&column([VNode::text("a").with_key("a"), VNode::spacer(1)]))
            .unwrap();
        let root = tree.root_key().unwrap();
        let kinds: Vec<_> = tree.children(root).map(|(_, n)| n.kind).collect();
        assert_eq!(kinds, vec![WidgetKind::Text, WidgetKind::Spacer]);
    }
}
