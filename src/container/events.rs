//! Invalidate-event subscriptions.
//!
//! Grounded on `euporie/core/layout/cache.py`'s `CachedContainer`, which
//! subscribes to whatever invalidate events the child declared while
//! rendering (a buffer's "text changed" event, say) and drops the
//! subscription once the rows that needed it scroll out of view. REDESIGN
//! FLAGS calls for arena indices rather than owning back-references for
//! this kind of weak subscriber list; the idiomatic Rust shape for "please
//! prune yourself when the subscriber goes away" is a `Weak` handle instead
//! of a manually-managed index, so that's what's used here — dropping a
//! `CachedContainer`'s `InvalidateFlag` silently unsubscribes it.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// A subscriber's handle: `fire()` on the topic it registered for flips
/// this, and the subscriber checks + clears it on its next render.
#[derive(Clone, Default)]
pub struct InvalidateFlag(Rc<Cell<bool>>);

impl InvalidateFlag {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(false)))
    }

    /// Clear and return whether this flag was set since the last check.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }

    fn downgrade(&self) -> Weak<Cell<bool>> {
        Rc::downgrade(&self.0)
    }
}

/// Named invalidate topics a render pass can publish to and a
/// `CachedContainer` can subscribe against, without either side holding an
/// owning reference to the other.
#[derive(Default)]
pub struct EventBus {
    topics: HashMap<String, Vec<Weak<Cell<bool>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `topic`, returning a flag the caller polls later.
    pub fn subscribe(&mut self, topic: &str) -> InvalidateFlag {
        let flag = InvalidateFlag::new();
        self.topics.entry(topic.to_string()).or_default().push(flag.downgrade());
        flag
    }

    /// Fire `topic`, setting every live subscriber's flag and pruning any
    /// whose `InvalidateFlag` has since been dropped.
    pub fn fire(&mut self, topic: &str) {
        if let Some(subs) = self.topics.get_mut(topic) {
            subs.retain(|weak| {
                if let Some(flag) = weak.upgrade() {
                    flag.set(true);
                    true
                } else {
                    false
                }
            });
        }
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, |v| v.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_sets_flag_for_live_subscriber() {
        let mut bus = EventBus::new();
        let flag = bus.subscribe("buffer-changed");
        assert!(!flag.take());
        bus.fire("buffer-changed");
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn dropped_subscriber_is_pruned_on_next_fire() {
        let mut bus = EventBus::new();
        {
            let _flag = bus.subscribe("topic");
            assert_eq!(bus.subscriber_count("topic"), 1);
        }
        bus.fire("topic");
        assert_eq!(bus.subscriber_count("topic"), 0);
    }

    #[test]
    fn unrelated_topics_do_not_cross_fire() {
        let mut bus = EventBus::new();
        let flag_a = bus.subscribe("a");
        let _flag_b = bus.subscribe("b");
        bus.fire("a");
        assert!(flag_a.take());
    }
}
