//! # Address Resolver
//!
//! Maps an opaque tag to the receiver that should get the event. The order
//! is fixed:
//!
//! 1. the mount point itself, if it carries a receiver;
//! 2. the screen that owns the mount point, if it carries one;
//! 3. nothing.
//!
//! The mount point always wins so a specific tree can intercept its own
//! events while the owning screen handles everything else. A miss is not an
//! error; the dispatcher decides what the caller sees.

use crate::registry;
use std::{fmt, sync::Arc};
use tether_core::{Receiver, RootContainerProvider, Tag};

/// Which step of the resolution order produced the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedVia {
    /// The mount point intercepts its own events.
    Root,
    /// The owning screen handles events for its trees.
    Owner,
}

/// A receiver chosen for one tag.
#[derive(Clone)]
pub struct Resolved {
    /// Root tag the event was routed through.
    pub tag: Tag,
    /// Resolution step that matched.
    pub via: ResolvedVia,
    /// The receiver to invoke.
    pub receiver: Arc<dyn Receiver>,
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("tag", &self.tag)
            .field("via", &self.via)
            .finish_non_exhaustive()
    }
}

/// Resolves tags against the screens of a [`RootContainerProvider`].
///
/// Every call walks the live tree again; nothing is cached.
pub struct AddressResolver<P> {
    provider: P,
}

impl<P: RootContainerProvider> AddressResolver<P> {
    /// Create a resolver over `provider`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Find the receiver for `tag`, if any.
    pub fn resolve(&self, tag: Tag) -> Option<Resolved> {
        let root_tag = self.provider.root_tag_for(tag);
        for screen in self.provider.screens() {
            let Some(content) = screen.content() else {
                continue;
            };
            let Some(root) = registry::find_root(&content, root_tag) else {
                continue;
            };

            if let Some(receiver) = root.node().receiver() {
                return Some(Resolved {
                    tag: root_tag,
                    via: ResolvedVia::Root,
                    receiver,
                });
            }
            // A tag names one mount point; stop at its owner either way.
            return screen.receiver().map(|receiver| Resolved {
                tag: root_tag,
                via: ResolvedVia::Owner,
                receiver,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockNode, MockProvider, MockScreen, RecordingReceiver};

    #[test]
    fn test_root_receiver_wins_over_owner() {
        let at_root = RecordingReceiver::new(&["Tap"]);
        let at_owner = RecordingReceiver::new(&["Tap"]);
        let screen = MockScreen::with_receiver(
            MockNode::container(vec![MockNode::root_with_receiver(42, at_root.arc())]),
            at_owner.arc(),
        );
        let resolver = AddressResolver::new(MockProvider::new(vec![screen]));

        let resolved = resolver.resolve(Tag::new(42)).unwrap();
        assert_eq!(resolved.via, ResolvedVia::Root);
        assert_eq!(resolved.tag, Tag::new(42));
    }

    #[test]
    fn test_falls_back_to_owner() {
        let at_owner = RecordingReceiver::new(&[]);
        let screen = MockScreen::with_receiver(
            MockNode::container(vec![MockNode::root(42)]),
            at_owner.arc(),
        );
        let resolver = AddressResolver::new(MockProvider::new(vec![screen]));

        let resolved = resolver.resolve(Tag::new(42)).unwrap();
        assert_eq!(resolved.via, ResolvedVia::Owner);
    }

    #[test]
    fn test_miss_without_any_receiver() {
        let screen = MockScreen::new(MockNode::container(vec![MockNode::root(42)]));
        let resolver = AddressResolver::new(MockProvider::new(vec![screen]));
        assert!(resolver.resolve(Tag::new(42)).is_none());
    }

    #[test]
    fn test_miss_for_unknown_tag() {
        let screen = MockScreen::with_receiver(
            MockNode::container(vec![MockNode::root(42)]),
            RecordingReceiver::new(&[]).arc(),
        );
        let resolver = AddressResolver::new(MockProvider::new(vec![screen]));
        assert!(resolver.resolve(Tag::new(99)).is_none());
    }

    #[test]
    fn test_searches_every_screen() {
        let first = MockScreen::new(MockNode::container(vec![MockNode::root(1)]));
        let second = MockScreen::with_receiver(
            MockNode::container(vec![MockNode::root(2)]),
            RecordingReceiver::new(&[]).arc(),
        );
        let resolver = AddressResolver::new(MockProvider::new(vec![first, second]));
        assert_eq!(resolver.resolve(Tag::new(2)).map(|r| r.via), Some(ResolvedVia::Owner));
    }

    #[test]
    fn test_descendant_tag_maps_to_root() {
        let screen = MockScreen::with_receiver(
            MockNode::container(vec![MockNode::root(10)]),
            RecordingReceiver::new(&[]).arc(),
        );
        let provider = MockProvider::new(vec![screen]).with_root_tag(Tag::new(13), Tag::new(10));
        let resolver = AddressResolver::new(provider);

        let resolved = resolver.resolve(Tag::new(13)).unwrap();
        assert_eq!(resolved.tag, Tag::new(10));
    }
}
