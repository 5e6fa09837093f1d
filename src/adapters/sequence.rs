use crate::domain::ports::SequenceGenerator;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Per-name counters. The first id of an unseeded sequence is 1.
#[derive(Debug, Default)]
pub struct AtomicSequenceGenerator {
    counters: Mutex<HashMap<String, u64>>,
}

impl AtomicSequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next id handed out for `sequence_name` will be `last_issued + 1`.
    pub fn starting_after(sequence_name: &str, last_issued: u64) -> Self {
        let mut counters = HashMap::new();
        counters.insert(sequence_name.to_string(), last_issued);
        Self {
            counters: Mutex::new(counters),
        }
    }
}

#[async_trait]
impl SequenceGenerator for AtomicSequenceGenerator {
    async fn next_id(&self, sequence_name: &str) -> Result<u64> {
        let mut counters = self.counters.lock().await;
        let counter = counters.entry(sequence_name.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}
