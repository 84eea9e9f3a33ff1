//! In-memory [`ItemStore`] for handler tests.
//!
//! Mirrors DynamoDB where it matters to callers: `update_item` creates the
//! item when the key is absent and `delete_item` on a missing key succeeds.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;

use super::{ItemStore, Record, StoreError, KEY_ATTRIBUTE};

/// Store calls that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    Scan,
    Get,
    Put,
    Update,
    Delete,
}

impl Op {
    const ALL: [Op; 5] = [Op::Scan, Op::Get, Op::Put, Op::Update, Op::Delete];
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    items: Mutex<BTreeMap<String, Record>>,
    failures: Mutex<HashMap<Op, String>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an item without counting it as a write.
    pub fn insert(&self, item: Record) {
        let id = item[KEY_ATTRIBUTE].as_str().unwrap().to_string();
        self.items.lock().unwrap().insert(id, item);
    }

    /// Makes every following call fail with `message`.
    pub fn fail_with(&self, message: &str) {
        for op in Op::ALL {
            self.fail_on(op, message);
        }
    }

    /// Makes following `op` calls fail with `message`; other calls still work.
    pub fn fail_on(&self, op: Op, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(op, message.to_string());
    }

    /// Number of put, update and delete calls that reached the store.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn item(&self, id: &str) -> Option<Record> {
        self.items.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    fn check(&self, op: Op) -> Result<(), StoreError> {
        match self.failures.lock().unwrap().get(&op) {
            Some(message) => Err(StoreError::DynamoDb(message.clone())),
            None => Ok(()),
        }
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn scan_all(&self) -> Result<Vec<Record>, StoreError> {
        self.check(Op::Scan)?;
        Ok(self.items.lock().unwrap().values().cloned().collect())
    }

    async fn get_item(&self, id: &str) -> Result<Option<Record>, StoreError> {
        self.check(Op::Get)?;
        Ok(self.item(id))
    }

    async fn put_item(&self, item: Record) -> Result<(), StoreError> {
        self.check(Op::Put)?;
        let id = item
            .get(KEY_ATTRIBUTE)
            .and_then(|id| id.as_str())
            .ok_or_else(|| StoreError::Malformed("item is missing a string `id`".to_string()))?
            .to_string();
        self.record_write();
        self.items.lock().unwrap().insert(id, item);
        Ok(())
    }

    async fn update_item(&self, id: &str, changes: Record) -> Result<Record, StoreError> {
        self.check(Op::Update)?;
        self.record_write();
        let mut items = self.items.lock().unwrap();
        let item = items.entry(id.to_string()).or_insert_with(|| {
            Record::from_iter([(KEY_ATTRIBUTE.to_string(), id.into())])
        });
        item.extend(changes);
        Ok(item.clone())
    }

    async fn delete_item(&self, id: &str) -> Result<(), StoreError> {
        self.check(Op::Delete)?;
        self.record_write();
        self.items.lock().unwrap().remove(id);
        Ok(())
    }
}
