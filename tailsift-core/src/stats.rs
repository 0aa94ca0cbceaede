// Run statistics shared by every worker

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    FilesScanned,
    PhpFilesFound,
    PhpFilesExecuted,
    HtmlFilesFound,
    ElementsFound,
    UniqueElements,
    DuplicateElements,
    ExecutionErrors,
}

/// Counters mutated only through atomic adds. Read with
/// [`RunStatistics::snapshot`] once all workers have joined.
#[derive(Debug, Default)]
pub struct RunStatistics {
    files_scanned: AtomicUsize,
    php_files_found: AtomicUsize,
    php_files_executed: AtomicUsize,
    html_files_found: AtomicUsize,
    elements_found: AtomicUsize,
    unique_elements: AtomicUsize,
    duplicate_elements: AtomicUsize,
    execution_errors: AtomicUsize,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, counter: Counter) -> &AtomicUsize {
        match counter {
            Counter::FilesScanned => &self.files_scanned,
            Counter::PhpFilesFound => &self.php_files_found,
            Counter::PhpFilesExecuted => &self.php_files_executed,
            Counter::HtmlFilesFound => &self.html_files_found,
            Counter::ElementsFound => &self.elements_found,
            Counter::UniqueElements => &self.unique_elements,
            Counter::DuplicateElements => &self.duplicate_elements,
            Counter::ExecutionErrors => &self.execution_errors,
        }
    }

    pub fn add(&self, counter: Counter, amount: usize) {
        self.counter(counter).fetch_add(amount, Ordering::Relaxed);
    }

    pub fn increment(&self, counter: Counter) {
        self.add(counter, 1);
    }

    pub fn get(&self, counter: Counter) -> usize {
        self.counter(counter).load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            files_scanned: self.get(Counter::FilesScanned),
            php_files_found: self.get(Counter::PhpFilesFound),
            php_files_executed: self.get(Counter::PhpFilesExecuted),
            html_files_found: self.get(Counter::HtmlFilesFound),
            elements_found: self.get(Counter::ElementsFound),
            unique_elements: self.get(Counter::UniqueElements),
            duplicate_elements: self.get(Counter::DuplicateElements),
            execution_errors: self.get(Counter::ExecutionErrors),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub files_scanned: usize,
    pub php_files_found: usize,
    pub php_files_executed: usize,
    pub html_files_found: usize,
    pub elements_found: usize,
    pub unique_elements: usize,
    pub duplicate_elements: usize,
    pub execution_errors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counters_are_independent() {
        let stats = RunStatistics::new();
        stats.increment(Counter::FilesScanned);
        stats.add(Counter::ElementsFound, 4);
        stats.increment(Counter::ExecutionErrors);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.files_scanned, 1);
        assert_eq!(snapshot.elements_found, 4);
        assert_eq!(snapshot.execution_errors, 1);
        assert_eq!(snapshot.unique_elements, 0);
    }

    #[test]
    fn test_concurrent_increments() {
        let stats = Arc::new(RunStatistics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = stats.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.increment(Counter::DuplicateElements);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.get(Counter::DuplicateElements), 8000);
    }
}
