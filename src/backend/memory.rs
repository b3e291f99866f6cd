// In-memory backend used by tests
// Evaluates queries over fixture rows and counts calls

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{BackendClient, BackendError, ClientTier, Query};

enum Behavior {
    Rows(Vec<Value>),
    Fail { message: String, code: String },
    Panic,
}

pub struct MemoryBackend {
    behavior: Behavior,
    calls: AtomicUsize,
    last_query: Mutex<Option<Query>>,
}

impl MemoryBackend {
    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self::from_behavior(Behavior::Rows(rows))
    }

    pub fn failing(message: &str, code: &str) -> Self {
        Self::from_behavior(Behavior::Fail {
            message: message.to_string(),
            code: code.to_string(),
        })
    }

    pub fn panicking() -> Self {
        Self::from_behavior(Behavior::Panic)
    }

    fn from_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<Query> {
        self.last_query.lock().unwrap().clone()
    }
}

fn compare(a: &Value, b: &Value) -> CmpOrdering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        _ => CmpOrdering::Equal,
    }
}

#[async_trait]
impl BackendClient for MemoryBackend {
    fn tier(&self) -> ClientTier {
        ClientTier::Privileged
    }

    async fn select(&self, query: &Query) -> Result<Vec<Value>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());

        let mut rows = match &self.behavior {
            Behavior::Rows(rows) => rows.clone(),
            Behavior::Fail { message, code } => {
                return Err(BackendError::query(message, code));
            }
            Behavior::Panic => panic!("backend exploded"),
        };

        rows.retain(|row| {
            query
                .filters
                .iter()
                .all(|f| row.get(&f.column) == Some(&f.value))
        });

        if let Some(order) = &query.order {
            // Stable sort: ties keep fixture order
            rows.sort_by(|a, b| {
                let ord = compare(
                    a.get(&order.column).unwrap_or(&Value::Null),
                    b.get(&order.column).unwrap_or(&Value::Null),
                );
                if order.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }
}
