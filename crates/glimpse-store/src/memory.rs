//! In-memory outcome store

use crate::StoreError;
use glimpse_domain::traits::OutcomeStore;
use glimpse_domain::{ItemId, Outcome};
use std::collections::HashSet;

/// Volatile OutcomeStore for tests and short-lived embeddings
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    processed: HashSet<ItemId>,
    outcomes: Vec<Outcome>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutcomeStore for MemoryStore {
    type Error = StoreError;

    fn processed_ids(&self) -> Result<HashSet<ItemId>, Self::Error> {
        Ok(self.processed.clone())
    }

    fn outcomes(&self) -> Result<Vec<Outcome>, Self::Error> {
        Ok(self.outcomes.clone())
    }

    fn outcome_count(&self) -> Result<usize, Self::Error> {
        Ok(self.outcomes.len())
    }

    fn get_outcome(&self, id: &ItemId) -> Result<Option<Outcome>, Self::Error> {
        Ok(self.outcomes.iter().find(|o| &o.item_id == id).cloned())
    }

    fn mark_processed(&mut self, id: &ItemId) -> Result<(), Self::Error> {
        self.processed.insert(id.clone());
        Ok(())
    }

    fn upsert_outcome(&mut self, outcome: &Outcome) -> Result<(), Self::Error> {
        match self.outcomes.iter_mut().find(|o| o.item_id == outcome.item_id) {
            Some(existing) => *existing = outcome.clone(),
            None => self.outcomes.push(outcome.clone()),
        }
        Ok(())
    }

    fn remove_items(&mut self, ids: &[ItemId]) -> Result<usize, Self::Error> {
        let doomed: HashSet<&ItemId> = ids.iter().collect();
        let before = self.processed.len();
        self.processed.retain(|id| !doomed.contains(id));
        self.outcomes.retain(|o| !doomed.contains(&o.item_id));
        Ok(before - self.processed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimpse_domain::ContentType;

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut store = MemoryStore::new();
        store
            .upsert_outcome(&Outcome::flagged("a".into(), ContentType::Unknown, "unsure", true))
            .unwrap();
        store
            .upsert_outcome(&Outcome::success("b".into(), ContentType::Meme, None, None))
            .unwrap();
        store
            .upsert_outcome(&Outcome::success("a".into(), ContentType::Meme, None, None))
            .unwrap();

        let outcomes = store.outcomes().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].item_id.as_str(), "a");
        assert!(outcomes[0].is_routable());
    }

    #[test]
    fn test_remove_counts_index_entries() {
        let mut store = MemoryStore::new();
        store.mark_processed(&ItemId::new("a")).unwrap();
        store.mark_processed(&ItemId::new("b")).unwrap();

        assert_eq!(store.remove_items(&[ItemId::new("a"), ItemId::new("x")]).unwrap(), 1);
        assert!(store.processed_ids().unwrap().contains(&ItemId::new("b")));
    }
}
