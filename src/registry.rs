use serde::Serialize;

use crate::models::{CourseRecord, Crn};

/// CRNs still being watched, kept in insertion order.
///
/// A record is removed as soon as its seat notification succeeds, so every
/// entry here is an unsatisfied course.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CourseRegistry {
    records: Vec<CourseRecord>,
}

impl CourseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `crn` unless it is already tracked. Returns whether it was inserted.
    pub fn add(&mut self, crn: Crn) -> bool {
        if self.contains(&crn) {
            return false;
        }
        self.records.push(CourseRecord::new(crn));
        true
    }

    pub fn remove(&mut self, crn: &Crn) -> Option<CourseRecord> {
        let index = self.records.iter().position(|record| &record.crn == crn)?;
        Some(self.records.remove(index))
    }

    /// Marks `crn` notified and drops it from the watch list in one step.
    pub fn settle(&mut self, crn: &Crn) -> Option<CourseRecord> {
        let mut record = self.remove(crn)?;
        record.notified = true;
        Some(record)
    }

    /// Snapshot of the tracked CRNs; later mutations do not affect it.
    pub fn list(&self) -> Vec<Crn> {
        self.records.iter().map(|record| record.crn.clone()).collect()
    }

    pub fn contains(&self, crn: &Crn) -> bool {
        self.records.iter().any(|record| &record.crn == crn)
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Crn> for CourseRegistry {
    fn from_iter<I: IntoIterator<Item = Crn>>(iter: I) -> Self {
        let mut registry = Self::new();
        for crn in iter {
            registry.add(crn);
        }
        registry
    }
}
