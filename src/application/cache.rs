use crate::error::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// A derived value that is rebuilt on demand after being invalidated.
///
/// Every invalidation bumps a generation counter; a cached value built for an
/// older generation is discarded on the next read.
pub struct GenerationCache<T> {
    generation: AtomicU64,
    slot: RwLock<Option<(u64, Arc<T>)>>,
}

impl<T> Default for GenerationCache<T> {
    fn default() -> Self {
        Self {
            generation: AtomicU64::new(0),
            slot: RwLock::new(None),
        }
    }
}

impl<T> GenerationCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Returns the cached value, running `build` first if it is missing or stale.
    pub fn get_or_rebuild<F>(&self, build: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        let generation = self.generation();
        {
            let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
            if let Some((built_for, value)) = slot.as_ref() {
                if *built_for == generation {
                    return Ok(Arc::clone(value));
                }
            }
        }

        let value = Arc::new(build()?);
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some((generation, Arc::clone(&value)));
        Ok(value)
    }
}
