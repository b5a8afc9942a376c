//! Shared run state: the remaining-work queue and accumulated results.

use crate::models::{Entity, Review, ScrapedEntity};

/// Remaining queue plus results map, carried across retry attempts.
///
/// Single-writer discipline is enforced by ownership: the orchestrator
/// holds `&mut WorkState` for the duration of an attempt, and the retry
/// coordinator only reads snapshots between attempts. No locking — the
/// run is strictly sequential.
#[derive(Debug, Default)]
pub struct WorkState {
    remaining: Vec<Entity>,
    results: Vec<ScrapedEntity>,
}

impl WorkState {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            remaining: entities,
            results: Vec::new(),
        }
    }

    /// Stable copy of the entities not yet committed, in input order.
    pub fn remaining(&self) -> Vec<Entity> {
        self.remaining.clone()
    }

    /// Commit one entity's complete review list and drop it from the
    /// remaining queue. Each entity (by URL) is committed at most once;
    /// a repeat commit is a logic error upstream and is ignored.
    pub fn commit(&mut self, entity: Entity, reviews: Vec<Review>) {
        self.remaining.retain(|e| e.url != entity.url);
        let duplicate = self.results.iter().any(|r| r.url == entity.url);
        debug_assert!(!duplicate, "entity committed twice: {}", entity.url);
        if duplicate {
            return;
        }
        self.results.push(ScrapedEntity::new(entity, reviews));
    }

    /// Read-only copy of the results accumulated so far, for
    /// checkpointing.
    pub fn snapshot(&self) -> Vec<ScrapedEntity> {
        self.results.clone()
    }

    pub fn committed_count(&self) -> usize {
        self.results.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.remaining.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities() -> Vec<Entity> {
        vec![
            Entity::new("A", "#1", "https://example.com/a"),
            Entity::new("B", "#2", "https://example.com/b"),
        ]
    }

    #[test]
    fn commit_removes_from_queue_and_records_result() {
        let mut state = WorkState::new(entities());
        let [a, _b] = state.remaining().try_into().unwrap();

        state.commit(a, vec![]);

        assert_eq!(state.remaining_count(), 1);
        assert_eq!(state.remaining()[0].url, "https://example.com/b");
        let snapshot = state.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].url, "https://example.com/a");
    }

    #[test]
    fn commit_with_empty_reviews_still_completes_entity() {
        let mut state = WorkState::new(entities());
        let a = state.remaining()[0].clone();

        state.commit(a, vec![]);

        assert!(state.snapshot()[0].reviews.is_empty());
        assert_eq!(state.remaining_count(), 1);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut state = WorkState::new(entities());
        let a = state.remaining()[0].clone();
        state.commit(a, vec![]);

        let snapshot = state.snapshot();
        let b = state.remaining()[0].clone();
        state.commit(b, vec![]);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(state.snapshot().len(), 2);
    }

    #[test]
    fn uncommitted_entities_stay_queued() {
        let state = WorkState::new(entities());
        assert_eq!(state.remaining_count(), 2);
        assert_eq!(state.committed_count(), 0);
    }
}
