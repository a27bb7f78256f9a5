use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

/// Per-URL async locks so concurrent cache misses for one URL generate only once.
#[derive(Debug, Clone, Default)]
pub struct UrlLocks {
    locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

pub struct UrlGuard {
    key: String,
    locks: UrlLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl UrlLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> UrlGuard {
        let entry = {
            let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
            // Entries only the map holds were left behind by cancelled waiters.
            locks.retain(|_, m| Arc::strong_count(m) > 1);
            Arc::clone(locks.entry(key.to_owned()).or_default())
        };
        let guard = entry.lock_owned().await;
        UrlGuard {
            key: key.to_owned(),
            locks: self.clone(),
            guard: Some(guard),
        }
    }

    fn release(&self, key: &str, guard: OwnedMutexGuard<()>) {
        let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
        drop(guard);
        // Only the map and the guard we just dropped held it: nobody else is waiting.
        if locks.get(key).is_some_and(|m| Arc::strong_count(m) == 1) {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or_default()
    }
}

impl Drop for UrlGuard {
    fn drop(&mut self) {
        if let Some(guard) = self.guard.take() {
            self.locks.release(&self.key, guard);
        }
    }
}
