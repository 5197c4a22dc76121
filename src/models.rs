use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One build of a job, with every field independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildRecord {
    pub number: Option<u64>,
    pub building: Option<bool>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Milliseconds.
    pub duration: Option<i64>,
    pub revision: Option<String>,
    pub branch_name: Option<String>,
}

impl BuildRecord {
    pub fn is_building(&self) -> bool {
        self.building.unwrap_or(false)
    }
}

/// One failing test, identified by its class and test name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FailureRecord {
    pub class_name: String,
    pub test_name: String,
}

impl FailureRecord {
    pub fn new(class_name: impl Into<String>, test_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            test_name: test_name.into(),
        }
    }
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.class_name.is_empty() {
            write!(f, "{}", self.test_name)
        } else {
            write!(f, "{}.{}", self.class_name, self.test_name)
        }
    }
}

/// Ordered by (class name, test name).
pub type FailureSet = BTreeSet<FailureRecord>;
