//! In-Memory Score Definition Store
//!
//! Keeps the weight table in a map keyed like the real table. Supports
//! error injection so handler tests can exercise write and lookup failures.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, EventType, ProjectId};
use crate::domain::scoring::ScoreDefinition;
use crate::ports::ScoreDefinitionRepository;

type DefinitionKey = (EventType, ProjectId);

#[derive(Debug, Default)]
struct Faults {
    /// Fail every `put` once this many writes have succeeded.
    fail_puts_after: Option<usize>,
    fail_lookups: bool,
}

/// In-memory weight table
#[derive(Debug, Clone, Default)]
pub struct InMemoryScoreDefinitionStore {
    definitions: Arc<RwLock<HashMap<DefinitionKey, ScoreDefinition>>>,
    faults: Arc<RwLock<Faults>>,
    puts: Arc<AtomicUsize>,
    lookups: Arc<AtomicUsize>,
}

impl InMemoryScoreDefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with definitions.
    pub async fn with_definitions(definitions: Vec<ScoreDefinition>) -> Self {
        let store = Self::new();
        {
            let mut map = store.definitions.write().await;
            for definition in definitions {
                map.insert(definition.key(), definition);
            }
        }
        store
    }

    /// Make every write fail after `successful` writes went through.
    pub async fn fail_puts_after(&self, successful: usize) {
        self.faults.write().await.fail_puts_after = Some(successful);
    }

    /// Make every lookup fail with a database error.
    pub async fn fail_lookups(&self) {
        self.faults.write().await.fail_lookups = true;
    }

    /// Sorted copy of the table, for whole-state comparisons.
    pub async fn snapshot(&self) -> BTreeMap<DefinitionKey, i64> {
        self.definitions
            .read()
            .await
            .iter()
            .map(|(key, definition)| (key.clone(), definition.score_offset))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.definitions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.definitions.read().await.is_empty()
    }

    /// Number of lookups served so far, failed ones included.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoreDefinitionRepository for InMemoryScoreDefinitionStore {
    async fn put(&self, definition: &ScoreDefinition) -> Result<(), DomainError> {
        if let Some(limit) = self.faults.read().await.fail_puts_after {
            if self.puts.load(Ordering::SeqCst) >= limit {
                return Err(DomainError::database("injected write failure")
                    .with_detail("event_type", definition.event_type.as_str()));
            }
        }

        self.definitions
            .write()
            .await
            .insert(definition.key(), definition.clone());
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find(
        &self,
        event_type: &EventType,
        project_id: &ProjectId,
    ) -> Result<Option<ScoreDefinition>, DomainError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.faults.read().await.fail_lookups {
            return Err(DomainError::database("injected lookup failure"));
        }

        let key = (event_type.clone(), project_id.clone());
        Ok(self.definitions.read().await.get(&key).cloned())
    }
}
