use std::collections::HashMap;

use chrono::Utc;

/// One learner, as assembled from the portal's login and attendance
/// responses. `subjects` is keyed by subject code.
#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub name: String,
    pub subjects: HashMap<String, Subject>,
}

impl Student {
    pub fn new(name: impl Into<String>) -> Self {
        Student {
            name: name.into(),
            subjects: HashMap::new(),
        }
    }

    /// Merge an attendance update into this student. Entries with a matching
    /// subject code are overwritten; everything else is kept.
    pub fn merge_subjects(&mut self, update: HashMap<String, Subject>) {
        self.subjects.extend(update);
    }
}

/// One course's attendance standing. Theory and lab are tracked as
/// independent present/total counter pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub name: String,
    pub code: String,
    pub theory_present: u32,
    pub theory_total: u32,
    pub lab_present: u32,
    pub lab_total: u32,
    /// Epoch milliseconds at the moment the record was parsed, not anything
    /// the portal reports.
    pub last_updated: i64,
}

impl Subject {
    /// Counters start at an explicit zero; the attendance parser overwrites
    /// them only when the portal's counter string is well formed.
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Subject {
            name: name.into(),
            code: code.into(),
            theory_present: 0,
            theory_total: 0,
            lab_present: 0,
            lab_total: 0,
            last_updated: Utc::now().timestamp_millis(),
        }
    }
}
