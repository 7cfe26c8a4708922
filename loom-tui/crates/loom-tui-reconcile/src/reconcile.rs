//! Sibling reconciliation.
//!
//! [`reconcile_children`] matches one parent's next-frame child descriptions
//! against the instances it rendered last frame and decides, per child, whether
//! an existing instance survives or a new one is mounted.
//!
//! Keyed children match by key; unkeyed children match by their slot, the
//! ordinal among the unkeyed present children of the list. Either way a match
//! only counts when the widget kind is identical, since different kinds carry
//! incompatible internal state. Holes never consume a slot.

use ahash::AHashMap;
use loom_tui_core::{ErrorCode, Fatal, InstanceId, InstanceIdAllocator, Result, VNode, WidgetKind};

/// What the reconciler needs to know about a previous-frame child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrevChild<'a> {
    /// The instance's identity.
    pub instance_id: InstanceId,
    /// The kind of the description it last rendered.
    pub kind: WidgetKind,
    /// The key of the description it last rendered.
    pub key: Option<&'a str>,
}

impl<'a> PrevChild<'a> {
    /// Creates a reference to a previous child.
    pub const fn new(instance_id: InstanceId, kind: WidgetKind, key: Option<&'a str>) -> Self {
        Self {
            instance_id,
            kind,
            key,
        }
    }

    /// Describes the instance that rendered `vnode`.
    pub fn from_vnode(instance_id: InstanceId, vnode: &'a VNode) -> Self {
        Self::new(instance_id, vnode.kind(), vnode.key())
    }
}

/// The decision for one present next child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildPlan {
    /// The instance that will render the child.
    pub instance_id: InstanceId,
    /// Index of the child in the next list (holes included).
    pub next_index: usize,
    /// Index of the reused instance in the previous list, `None` when new.
    pub prev_index: Option<usize>,
}

impl ChildPlan {
    /// Returns whether the instance was freshly allocated.
    pub const fn is_new(&self) -> bool {
        self.prev_index.is_none()
    }
}

/// Result of reconciling one sibling list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// One plan per present next child, in next-list order.
    pub next_children: Vec<ChildPlan>,
    /// Surviving instance ids, in next-list order.
    pub reused_instance_ids: Vec<InstanceId>,
    /// Freshly allocated instance ids, in next-list order.
    pub new_instance_ids: Vec<InstanceId>,
    /// Previous instance ids no next child claimed, in previous-list order.
    pub unmounted_instance_ids: Vec<InstanceId>,
}

/// Reconciles `next` against `prev` under the parent `parent_id`.
///
/// # Errors
///
/// Returns a `DUPLICATE_KEY` fatal when a key appears twice in either list. The
/// detail names the key, both indices and the parent id.
///
/// # Example
///
/// ```
/// use loom_tui_core::{InstanceId, InstanceIdAllocator, VNode, WidgetKind};
/// use loom_tui_reconcile::{reconcile_children, PrevChild};
///
/// let mut ids = InstanceIdAllocator::starting_at(10);
/// let prev = [Some(PrevChild::new(InstanceId::from_raw(1), WidgetKind::Text, Some("a")))];
/// let next = [Some(VNode::text("new").with_key("b")), Some(VNode::text("A").with_key("a"))];
///
/// let out = reconcile_children(InstanceId::from_raw(0), &prev, &next, &mut ids).unwrap();
/// assert_eq!(out.reused_instance_ids, vec![InstanceId::from_raw(1)]);
/// assert_eq!(out.new_instance_ids, vec![InstanceId::from_raw(10)]);
/// assert!(out.unmounted_instance_ids.is_empty());
/// ```
pub fn reconcile_children(
    parent_id: InstanceId,
    prev: &[Option<PrevChild<'_>>],
    next: &[Option<VNode>],
    allocator: &mut InstanceIdAllocator,
) -> Result<ReconcileOutcome> {
    reconcile_children_with_parent(parent_id, None, prev, next, allocator)
}

/// Same as [`reconcile_children`], naming the parent's kind in diagnostics.
pub fn reconcile_children_with_parent(
    parent_id: InstanceId,
    parent_kind: Option<WidgetKind>,
    prev: &[Option<PrevChild<'_>>],
    next: &[Option<VNode>],
    allocator: &mut InstanceIdAllocator,
) -> Result<ReconcileOutcome> {
    let parent = ParentLabel {
        id: parent_id,
        kind: parent_kind,
    };

    let mut prev_keyed: AHashMap<&str, (WidgetKind, InstanceId, usize)> = AHashMap::new();
    let mut prev_unkeyed: Vec<(WidgetKind, InstanceId, usize)> = Vec::new();
    for (index, child) in prev.iter().enumerate() {
        let Some(child) = child else { continue };
        match child.key {
            Some(key) => {
                if let Some(&(_, _, first)) = prev_keyed.get(key) {
                    return Err(duplicate_key(parent, key, first, index, "previous"));
                }
                prev_keyed.insert(key, (child.kind, child.instance_id, index));
            }
            None => prev_unkeyed.push((child.kind, child.instance_id, index)),
        }
    }

    let mut next_keys: AHashMap<&str, usize> = AHashMap::new();
    for (index, child) in next.iter().enumerate() {
        let Some(key) = child.as_ref().and_then(VNode::key) else {
            continue;
        };
        if let Some(&first) = next_keys.get(key) {
            return Err(duplicate_key(parent, key, first, index, "next"));
        }
        next_keys.insert(key, index);
    }

    let mut claimed = vec![false; prev.len()];
    let mut outcome = ReconcileOutcome {
        next_children: Vec::with_capacity(next.len()),
        ..ReconcileOutcome::default()
    };
    let mut unkeyed_slot = 0usize;

    for (next_index, child) in next.iter().enumerate() {
        let Some(child) = child else { continue };
        let kind = child.kind();

        let candidate = match child.key() {
            Some(key) => prev_keyed.get(key).copied(),
            None => {
                let slot = unkeyed_slot;
                unkeyed_slot += 1;
                prev_unkeyed.get(slot).copied()
            }
        };

        let plan = match candidate {
            Some((prev_kind, instance_id, prev_index)) if prev_kind == kind => {
                claimed[prev_index] = true;
                outcome.reused_instance_ids.push(instance_id);
                ChildPlan {
                    instance_id,
                    next_index,
                    prev_index: Some(prev_index),
                }
            }
            _ => {
                let instance_id = allocator.allocate();
                outcome.new_instance_ids.push(instance_id);
                ChildPlan {
                    instance_id,
                    next_index,
                    prev_index: None,
                }
            }
        };
        outcome.next_children.push(plan);
    }

    outcome.unmounted_instance_ids = prev
        .iter()
        .zip(&claimed)
        .filter_map(|(child, &was_claimed)| match child {
            Some(child) if !was_claimed => Some(child.instance_id),
            _ => None,
        })
        .collect();

    tracing::trace!(
        parent = %parent_id,
        reused = outcome.reused_instance_ids.len(),
        mounted = outcome.new_instance_ids.len(),
        unmounted = outcome.unmounted_instance_ids.len(),
        "reconciled children"
    );

    Ok(outcome)
}

#[derive(Clone, Copy)]
struct ParentLabel {
    id: InstanceId,
    kind: Option<WidgetKind>,
}

impl std::fmt::Display for ParentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "parent instance {} ({})", self.id, kind),
            None => write!(f, "parent instance {}", self.id),
        }
    }
}

fn duplicate_key(parent: ParentLabel, key: &str, first: usize, second: usize, list: &str) -> Fatal {
    tracing::debug!(
        parent = %parent.id,
        key,
        first,
        second,
        list,
        "duplicate sibling key"
    );
    Fatal::new(
        ErrorCode::DuplicateKey,
        format!(
            "duplicate key {key:?} at {list} child indices {first} and {second} under {parent}"
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(raw: u64) -> InstanceId {
        InstanceId::from_raw(raw)
    }

    fn ids(raw: &[u64]) -> Vec<InstanceId> {
        raw.iter().copied().map(InstanceId::from_raw).collect()
    }

    fn keyed_text(key: &str) -> Option<VNode> {
        Some(VNode::text(key.to_uppercase()).with_key(key))
    }

    #[test]
    fn test_reordered_keys_reuse_in_next_order() {
        let prev = [
            Some(PrevChild::new(id(1), WidgetKind::Text, Some("a"))),
            Some(PrevChild::new(id(2), WidgetKind::Text, Some("b"))),
            Some(PrevChild::new(id(3), WidgetKind::Text, Some("c"))),
        ];
        let next = [keyed_text("c"), keyed_text("a"), keyed_text("b")];
        let mut alloc = InstanceIdAllocator::starting_at(4);

        let out = reconcile_children(id(11), &prev, &next, &mut alloc).unwrap();

        assert_eq!(out.reused_instance_ids, ids(&[3, 1, 2]));
        assert!(out.new_instance_ids.is_empty());
        assert!(out.unmounted_instance_ids.is_empty());
        assert_eq!(out.next_children[0].prev_index, Some(2));
        assert_eq!(alloc.peek(), id(4));
    }

    #[test]
    fn test_every_permutation_reuses_same_ids() {
        let keys = ["a", "b", "c", "d"];
        let prev: Vec<_> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| Some(PrevChild::new(id(i as u64 + 1), WidgetKind::Text, Some(*k))))
            .collect();

        let mut order = vec![0usize, 1, 2, 3];
        let mut checked = 0;
        loop {
            let next: Vec<_> = order.iter().map(|&i| keyed_text(keys[i])).collect();
            let mut alloc = InstanceIdAllocator::starting_at(100);
            let out = reconcile_children(id(0), &prev, &next, &mut alloc).unwrap();
            let expected: Vec<_> = order.iter().map(|&i| id(i as u64 + 1)).collect();
            assert_eq!(out.reused_instance_ids, expected);
            assert!(out.new_instance_ids.is_empty());
            assert!(out.unmounted_instance_ids.is_empty());
            checked += 1;
            if !next_permutation(&mut order) {
                break;
            }
        }
        assert_eq!(checked, 24);
    }

    fn next_permutation(v: &mut [usize]) -> bool {
        let Some(i) = (0..v.len().saturating_sub(1)).rev().find(|&i| v[i] < v[i + 1]) else {
            return false;
        };
        let j = (i + 1..v.len()).rev().find(|&j| v[j] > v[i]).unwrap();
        v.swap(i, j);
        v[i + 1..].reverse();
        true
    }

    #[test]
    fn test_duplicate_next_key_is_fatal() {
        let next = [
            Some(VNode::text("x").with_key("dup")),
            Some(VNode::spacer(1).with_key("dup")),
        ];
        let mut alloc = InstanceIdAllocator::new();

        let err = reconcile_children(id(42), &[], &next, &mut alloc).unwrap_err();

        assert_eq!(err.code, ErrorCode::DuplicateKey);
        assert!(err.detail.contains("indices 0 and 1"), "{}", err.detail);
        assert!(err.detail.contains("42"), "{}", err.detail);
    }

    #[test]
    fn test_duplicate_previous_key_is_fatal() {
        let prev = [
            Some(PrevChild::new(id(1), WidgetKind::Text, Some("k"))),
            None,
            Some(PrevChild::new(id(2), WidgetKind::Row, Some("k"))),
        ];
        let mut alloc = InstanceIdAllocator::new();

        let err = reconcile_children_with_parent(
            id(7),
            Some(WidgetKind::Column),
            &prev,
            &[keyed_text("k")],
            &mut alloc,
        )
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::DuplicateKey);
        assert!(err.detail.contains("indices 0 and 2"), "{}", err.detail);
        assert!(err.detail.contains("parent instance 7 (column)"), "{}", err.detail);
    }

    #[test]
    fn test_kind_change_under_same_key_remounts() {
        let prev = [Some(PrevChild::new(id(5), WidgetKind::Text, Some("k")))];
        let next = [Some(VNode::spacer(2).with_key("k"))];
        let mut alloc = InstanceIdAllocator::starting_at(6);

        let out = reconcile_children(id(0), &prev, &next, &mut alloc).unwrap();

        assert!(out.reused_instance_ids.is_empty());
        assert_eq!(out.new_instance_ids, ids(&[6]));
        assert_eq!(out.unmounted_instance_ids, ids(&[5]));
    }

    #[test]
    fn test_unkeyed_children_match_by_slot() {
        let prev = [
            Some(PrevChild::new(id(1), WidgetKind::Text, None)),
            Some(PrevChild::new(id(2), WidgetKind::Spacer, None)),
            Some(PrevChild::new(id(3), WidgetKind::Text, None)),
        ];
        // Slot 1 changes kind, slot 2 disappears.
        let next = [Some(VNode::text("a")), Some(VNode::text("b"))];
        let mut alloc = InstanceIdAllocator::starting_at(10);

        let out = reconcile_children(id(0), &prev, &next, &mut alloc).unwrap();

        assert_eq!(out.reused_instance_ids, ids(&[1]));
        assert_eq!(out.new_instance_ids, ids(&[10]));
        assert_eq!(out.unmounted_instance_ids, ids(&[2, 3]));
    }

    #[test]
    fn test_holes_do_not_consume_slots() {
        let prev = [
            None,
            Some(PrevChild::new(id(1), WidgetKind::Text, None)),
            Some(PrevChild::new(id(2), WidgetKind::Text, None)),
        ];
        let next = [Some(VNode::text("a")), None, None, Some(VNode::text("b"))];
        let mut alloc = InstanceIdAllocator::starting_at(10);

        let out = reconcile_children(id(0), &prev, &next, &mut alloc).unwrap();

        assert_eq!(out.reused_instance_ids, ids(&[1, 2]));
        assert_eq!(out.next_children[1].next_index, 3);
        assert!(out.new_instance_ids.is_empty());
        assert!(out.unmounted_instance_ids.is_empty());
    }

    #[test]
    fn test_keyed_children_do_not_shift_unkeyed_slots() {
        let prev = [
            Some(PrevChild::new(id(1), WidgetKind::Text, None)),
            Some(PrevChild::new(id(2), WidgetKind::Text, None)),
        ];
        let next = [keyed_text("fresh"), Some(VNode::text("a")), Some(VNode::text("b"))];
        let mut alloc = InstanceIdAllocator::starting_at(10);

        let out = reconcile_children(id(0), &prev, &next, &mut alloc).unwrap();

        assert_eq!(out.reused_instance_ids, ids(&[1, 2]));
        assert_eq!(out.new_instance_ids, ids(&[10]));
        assert!(out.next_children[0].is_new());
    }

    #[test]
    fn test_empty_next_unmounts_everything_in_previous_order() {
        let prev = [
            Some(PrevChild::new(id(4), WidgetKind::Text, Some("x"))),
            None,
            Some(PrevChild::new(id(2), WidgetKind::Row, None)),
        ];
        let mut alloc = InstanceIdAllocator::new();

        let out = reconcile_children(id(0), &prev, &[], &mut alloc).unwrap();

        assert!(out.next_children.is_empty());
        assert_eq!(out.unmounted_instance_ids, ids(&[4, 2]));
    }

    #[test]
    fn test_empty_previous_mounts_everything() {
        let next = [keyed_text("a"), None, Some(VNode::divider())];
        let mut alloc = InstanceIdAllocator::starting_at(1);

        let out = reconcile_children(id(0), &[], &next, &mut alloc).unwrap();

        assert_eq!(out.new_instance_ids, ids(&[1, 2]));
        assert!(out.reused_instance_ids.is_empty());
        assert!(out.next_children.iter().all(ChildPlan::is_new));
    }
}
