use crate::core::Transaction;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::RwLock;

/// Signal returned by `MemoryPool::add`. A duplicate is an idempotent
/// no-op reported to the caller, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate,
}

/// ( K -> tx_id, V => Transaction )
///
/// Pending transactions waiting to be mined. Safe under concurrent upload
/// handlers and one mining path; `drain` is the atomic unit of work for
/// block assembly.
pub struct MemoryPool {
    inner: RwLock<HashMap<String, Transaction>>,
}

impl Default for MemoryPool {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPool {
    pub fn new() -> MemoryPool {
        MemoryPool {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a transaction unless its id is already pending.
    pub fn add(&self, tx: Transaction) -> AddOutcome {
        match self.inner.write() {
            Ok(mut pool) => {
                if pool.contains_key(tx.get_id()) {
                    warn!("Transaction already exists in mempool: {}", tx.get_id());
                    return AddOutcome::Duplicate;
                }
                info!("Transaction added to mempool: {}", tx.get_id());
                pool.insert(tx.get_id().to_string(), tx);
                AddOutcome::Added
            }
            Err(_) => {
                log::error!("Failed to acquire write lock on memory pool");
                AddOutcome::Duplicate
            }
        }
    }

    /// Consistent point-in-time copy of the pending set, for read-only
    /// queries. Does not block drains.
    pub fn snapshot(&self) -> Vec<Transaction> {
        match self.inner.read() {
            Ok(pool) => pool.values().cloned().collect(),
            Err(_) => {
                log::error!("Failed to acquire read lock on memory pool");
                Vec::new()
            }
        }
    }

    /// Atomically remove and return every pending transaction. A drained
    /// transaction can only reappear through `restore`.
    pub fn drain(&self) -> Vec<Transaction> {
        match self.inner.write() {
            Ok(mut pool) => std::mem::take(&mut *pool).into_values().collect(),
            Err(_) => {
                log::error!("Failed to acquire write lock on memory pool");
                Vec::new()
            }
        }
    }

    /// Put back transactions drained by a rejected mining cycle, skipping
    /// any id that re-entered the pool in the meantime.
    pub fn restore(&self, txs: Vec<Transaction>) {
        match self.inner.write() {
            Ok(mut pool) => {
                for tx in txs {
                    pool.entry(tx.get_id().to_string()).or_insert(tx);
                }
            }
            Err(_) => {
                log::error!("Failed to acquire write lock on memory pool");
            }
        }
    }

    pub fn contains(&self, tx_id: &str) -> bool {
        match self.inner.read() {
            Ok(pool) => pool.contains_key(tx_id),
            Err(_) => {
                log::error!("Failed to acquire read lock on memory pool");
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        match self.inner.read() {
            Ok(pool) => pool.len(),
            Err(_) => {
                log::error!("Failed to acquire read lock on memory pool");
                0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self.inner.read() {
            Ok(pool) => pool.is_empty(),
            Err(_) => {
                log::error!("Failed to acquire read lock on memory pool");
                true // Conservative default
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx(seed: &str) -> Transaction {
        Transaction::new(
            format!("file-{seed}"),
            "uploader".to_string(),
            128,
            0.8,
            "sig".to_string(),
        )
    }

    #[test]
    fn test_add_is_idempotent() {
        let pool = MemoryPool::new();
        assert_eq!(pool.add(sample_tx("a")), AddOutcome::Added);
        assert_eq!(pool.add(sample_tx("a")), AddOutcome::Duplicate);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let pool = MemoryPool::new();
        pool.add(sample_tx("a"));
        let snapshot = pool.snapshot();
        pool.add(sample_tx("b"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_drain_empties_the_pool() {
        let pool = MemoryPool::new();
        pool.add(sample_tx("a"));
        pool.add(sample_tx("b"));

        let drained = pool.drain();
        assert_eq!(drained.len(), 2);
        assert!(pool.is_empty());
        // A second drain has nothing to hand out.
        assert!(pool.drain().is_empty());
    }

    #[test]
    fn test_restore_returns_rejected_transactions() {
        let pool = MemoryPool::new();
        pool.add(sample_tx("a"));
        pool.add(sample_tx("b"));

        let drained = pool.drain();
        pool.restore(drained);
        assert_eq!(pool.len(), 2);
        assert!(pool.contains(sample_tx("a").get_id()));
    }

    #[test]
    fn test_restore_skips_resubmitted_ids() {
        let pool = MemoryPool::new();
        pool.add(sample_tx("a"));
        let drained = pool.drain();

        // Same content resubmitted while the mining cycle was in flight.
        pool.add(sample_tx("a"));
        pool.restore(drained);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_concurrent_adds_from_many_handlers() {
        use std::sync::Arc;
        use std::thread;

        let pool = Arc::new(MemoryPool::new());
        let mut handles = vec![];
        for i in 0..8 {
            let pool = Arc::clone(&pool);
            handles.push(thread::spawn(move || {
                for j in 0..25 {
                    pool.add(sample_tx(&format!("{i}-{j}")));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(pool.len(), 200);
    }
}
