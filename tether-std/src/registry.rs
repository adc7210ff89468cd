//! # Root Registry
//!
//! Finds the embedded-tree mount points inside a host container by walking
//! it depth-first. Roots are terminal (the walk never descends into an
//! embedded tree), containers are recursed into, leaves are skipped.
//!
//! Each walk works on the child snapshots the host hands out, so a node
//! removed while the walk is in progress is simply missing from the result.

use std::{fmt, sync::Arc};
use tether_core::{HostNode, NodeClass, Screen, Tag};

/// A mount point found by one traversal. Never cache across traversals.
#[derive(Clone)]
pub struct RootHandle {
    tag: Tag,
    node: Arc<dyn HostNode>,
}

impl RootHandle {
    /// Tag of the mount point.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// The host node at the mount point.
    pub fn node(&self) -> &Arc<dyn HostNode> {
        &self.node
    }
}

impl fmt::Debug for RootHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootHandle").field("tag", &self.tag).finish()
    }
}

/// Every mount point under `container`, in depth-first order.
///
/// A container that is itself a mount point yields just that root.
pub fn find_all_roots(container: &Arc<dyn HostNode>) -> Vec<RootHandle> {
    let mut roots = Vec::new();
    walk(container, &mut |root| {
        roots.push(root);
        false
    });
    roots
}

/// First mount point under `container` carrying `tag`.
pub fn find_root(container: &Arc<dyn HostNode>, tag: Tag) -> Option<RootHandle> {
    let mut found = None;
    walk(container, &mut |root| {
        if root.tag == tag {
            found = Some(root);
            true
        } else {
            false
        }
    });
    found
}

/// Every mount point on `screen`; empty if its content is not loaded.
pub fn roots_on_screen(screen: &dyn Screen) -> Vec<RootHandle> {
    screen
        .content()
        .map(|content| find_all_roots(&content))
        .unwrap_or_default()
}

// Returns true once `visit` asked to stop.
fn walk(node: &Arc<dyn HostNode>, visit: &mut dyn FnMut(RootHandle) -> bool) -> bool {
    match node.classify() {
        NodeClass::Root(tag) => visit(RootHandle {
            tag,
            node: Arc::clone(node),
        }),
        NodeClass::Container => node.children().iter().any(|child| walk(child, visit)),
        NodeClass::Leaf => false,
    }
}
