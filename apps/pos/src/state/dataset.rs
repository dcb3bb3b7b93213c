//! # Dataset State
//!
//! The in-memory dataset: catalog, ledger and settings.
//!
//! Every mutation goes through [`DatasetState::with_dataset_mut`]. That
//! closure runs under the lock, which is what makes "read counter, build
//! order, bump counter" a single step when two checkouts race.

use std::sync::{Arc, Mutex};

use pakwan_core::Dataset;

/// Shared dataset.
#[derive(Debug, Clone)]
pub struct DatasetState {
    dataset: Arc<Mutex<Dataset>>,
}

impl DatasetState {
    pub fn new(dataset: Dataset) -> Self {
        DatasetState {
            dataset: Arc::new(Mutex::new(dataset)),
        }
    }

    /// Executes a function with read access to the dataset.
    pub fn with_dataset<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Dataset) -> R,
    {
        let dataset = self.dataset.lock().expect("Dataset mutex poisoned");
        f(&dataset)
    }

    /// Executes a function with write access to the dataset.
    pub fn with_dataset_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Dataset) -> R,
    {
        let mut dataset = self.dataset.lock().expect("Dataset mutex poisoned");
        f(&mut dataset)
    }

    /// A copy of the current dataset, for persisting outside the lock.
    pub fn snapshot(&self) -> Dataset {
        self.with_dataset(Dataset::clone)
    }

    /// Swaps in a whole new dataset (load, import).
    pub fn replace(&self, dataset: Dataset) -> Dataset {
        self.with_dataset_mut(|current| std::mem::replace(current, dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pakwan_core::defaults::builtin_dataset;
    use std::thread;

    #[test]
    fn test_concurrent_id_assignment_is_unique() {
        let state = DatasetState::new(builtin_dataset());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = state.clone();
                thread::spawn(move || {
                    (0..25)
                        .map(|_| state.with_dataset_mut(Dataset::next_order_id).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        assert_eq!(state.with_dataset(|d| d.settings.next_order_number), 201);
    }

    #[test]
    fn test_replace_returns_previous() {
        let state = DatasetState::new(builtin_dataset());
        let mut other = builtin_dataset();
        other.store.name = "Replaced".into();

        let previous = state.replace(other);
        assert_ne!(previous.store.name, "Replaced");
        assert_eq!(state.snapshot().store.name, "Replaced");
    }
}
