//! Per-requester aggregation sessions.
//!
//! Each requester gets its own [`SpatialAggregator`], created on first use.
//! Sessions live until they are explicitly reset or removed; a registry may
//! optionally be capped, in which case the least recently used session is
//! evicted to make room.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info};

use super::aggregator::{CountTarget, SpatialAggregator};

/// Who is issuing a command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Requester {
    /// No identity: shares the single default session
    Console,
    /// A named player with a private session
    Player(String),
}

impl Requester {
    /// A requester from an optional name; `None` means the console.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some(name) if !name.is_empty() => Requester::Player(name.to_string()),
            _ => Requester::Console,
        }
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requester::Console => f.write_str("console"),
            Requester::Player(name) => f.write_str(name),
        }
    }
}

#[derive(Debug)]
struct Session {
    aggregator: SpatialAggregator,
    last_used: u64,
}

/// Maps requesters to their aggregators.
#[derive(Debug)]
pub struct SessionRegistry {
    target: CountTarget,
    sessions: HashMap<Requester, Session>,
    max_sessions: Option<usize>,
    clock: u64,
}

impl SessionRegistry {
    /// An unbounded registry whose sessions count `target`.
    pub fn new(target: CountTarget) -> Self {
        Self {
            target,
            sessions: HashMap::new(),
            max_sessions: None,
            clock: 0,
        }
    }

    /// A registry holding at most `max_sessions` sessions (at least one).
    pub fn with_capacity_limit(target: CountTarget, max_sessions: usize) -> Self {
        Self {
            max_sessions: Some(max_sessions.max(1)),
            ..Self::new(target)
        }
    }

    pub fn target(&self) -> CountTarget {
        self.target
    }

    /// The session for `requester`, created if missing.
    pub fn session(&mut self, requester: &Requester) -> &mut SpatialAggregator {
        self.clock += 1;
        let now = self.clock;

        if !self.sessions.contains_key(requester) {
            self.evict_if_full();
            debug!(requester = %requester, "creating session");
        }

        let target = self.target;
        let session = self
            .sessions
            .entry(requester.clone())
            .or_insert_with(|| Session {
                aggregator: SpatialAggregator::new(target),
                last_used: now,
            });
        session.last_used = now;
        &mut session.aggregator
    }

    /// The session for `requester`, if one exists.
    pub fn get(&self, requester: &Requester) -> Option<&SpatialAggregator> {
        self.sessions.get(requester).map(|s| &s.aggregator)
    }

    /// Clear a requester's counts, keeping the session. Returns whether a
    /// session existed.
    pub fn reset(&mut self, requester: &Requester) -> bool {
        match self.sessions.get_mut(requester) {
            Some(session) => {
                session.aggregator.reset();
                true
            }
            None => false,
        }
    }

    /// Drop a requester's session entirely.
    pub fn remove(&mut self, requester: &Requester) -> Option<SpatialAggregator> {
        self.sessions.remove(requester).map(|s| s.aggregator)
    }

    /// Drop all sessions.
    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn evict_if_full(&mut self) {
        let Some(max) = self.max_sessions else {
            return;
        };
        while self.sessions.len() >= max {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|(_, s)| s.last_used)
                .map(|(r, _)| r.clone());
            match oldest {
                Some(requester) => {
                    info!(requester = %requester, "evicting least recently used session");
                    self.sessions.remove(&requester);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::key::TypeKey;
    use crate::world::{BlockPos, MemoryWorld};

    fn world_with_stone() -> MemoryWorld {
        let mut world = MemoryWorld::new(0, 15);
        world.set_block(BlockPos::new(0, 0, 0), TypeKey::new("minecraft:stone"));
        world
    }

    #[test]
    fn test_sessions_are_partitioned() {
        let world = world_with_stone();
        let pos = BlockPos::new(0, 0, 0);
        let mut registry = SessionRegistry::new(CountTarget::Blocks);
        let alice = Requester::Player("alice".to_string());
        let bob = Requester::Player("bob".to_string());

        registry.session(&alice).process_box(&world, pos, pos);
        registry.session(&alice).process_box(&world, pos, pos);
        registry.session(&bob).process_box(&world, pos, pos);

        let stone = TypeKey::new("minecraft:stone");
        assert_eq!(registry.get(&alice).unwrap().counter().get(&stone), 2);
        assert_eq!(registry.get(&bob).unwrap().counter().get(&stone), 1);
        assert!(registry.get(&Requester::Console).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_console_is_shared_default() {
        assert_eq!(Requester::from_name(None), Requester::Console);
        assert_eq!(Requester::from_name(Some("")), Requester::Console);
        assert_eq!(
            Requester::from_name(Some("steve")),
            Requester::Player("steve".to_string())
        );

        let world = world_with_stone();
        let pos = BlockPos::new(0, 0, 0);
        let mut registry = SessionRegistry::new(CountTarget::Blocks);
        registry
            .session(&Requester::from_name(None))
            .process_box(&world, pos, pos);
        registry
            .session(&Requester::Console)
            .process_box(&world, pos, pos);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(&Requester::Console).unwrap().counter().total(),
            2
        );
    }

    #[test]
    fn test_reset_and_remove() {
        let world = world_with_stone();
        let pos = BlockPos::new(0, 0, 0);
        let mut registry = SessionRegistry::new(CountTarget::Blocks);
        let alice = Requester::Player("alice".to_string());
        registry.session(&alice).process_box(&world, pos, pos);

        assert!(registry.reset(&alice));
        assert_eq!(registry.get(&alice).unwrap().counter().total(), 0);
        assert!(!registry.reset(&Requester::Console));

        assert!(registry.remove(&alice).is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_capacity_limit_evicts_least_recently_used() {
        let mut registry = SessionRegistry::with_capacity_limit(CountTarget::Blocks, 2);
        let a = Requester::Player("a".to_string());
        let b = Requester::Player("b".to_string());
        let c = Requester::Player("c".to_string());

        registry.session(&a);
        registry.session(&b);
        // Touch `a` so `b` becomes the oldest
        registry.session(&a);
        registry.session(&c);

        assert_eq!(registry.len(), 2);
        assert!(registry.get(&a).is_some());
        assert!(registry.get(&b).is_none());
        assert!(registry.get(&c).is_some());
    }

    #[test]
    fn test_registry_target() {
        let mut registry = SessionRegistry::new(CountTarget::BlockEntities);
        assert_eq!(
            registry.session(&Requester::Console).target(),
            CountTarget::BlockEntities
        );
    }
}
