//! # Host tree capabilities
//!
//! The bridge never owns host UI state. It sees the host through three
//! small traits the host implements:
//!
//! - [`HostNode`] - one node of a screen's structural tree
//! - [`Screen`] - a lifecycle owner (window, activity, view controller)
//! - [`RootContainerProvider`] - enumerates live screens
//!
//! Every call returns a fresh snapshot; nothing here is cached by the router
//! because trees can remount between calls.

use crate::{message::Tag, receiver::Receiver};
use std::sync::Arc;

/// How the root registry treats a node during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// Mount point of an embedded tree. Terminal: its internals belong to
    /// the embedded layer.
    Root(Tag),
    /// Host container whose children are traversed.
    Container,
    /// Anything else; skipped.
    Leaf,
}

/// A node in a host screen's structural tree.
pub trait HostNode: Send + Sync + 'static {
    /// Classify this node.
    fn classify(&self) -> NodeClass;

    /// Snapshot of the current children. Only consulted for containers.
    fn children(&self) -> Vec<Arc<dyn HostNode>> {
        Vec::new()
    }

    /// Receiver installed on this mount point, if it intercepts its own events.
    fn receiver(&self) -> Option<Arc<dyn Receiver>> {
        None
    }
}

/// The lifecycle owner that encloses one or more embedded trees.
pub trait Screen: Send + Sync + 'static {
    /// Root of the screen's content, if it has been loaded.
    fn content(&self) -> Option<Arc<dyn HostNode>>;

    /// Receiver for events from any tree this screen owns.
    fn receiver(&self) -> Option<Arc<dyn Receiver>> {
        None
    }
}

/// Supplies the containers the router searches.
pub trait RootContainerProvider: Send + 'static {
    /// Every live screen, in the order they should be searched.
    fn screens(&self) -> Vec<Arc<dyn Screen>>;

    /// The screen currently in front, for multi-window hosts.
    fn active_screen(&self) -> Option<Arc<dyn Screen>> {
        self.screens().pop()
    }

    /// Map the tag of any node inside an embedded tree to its root tag.
    ///
    /// Hosts whose embedded layer already sends root tags keep the identity.
    fn root_tag_for(&self, tag: Tag) -> Tag {
        tag
    }
}
