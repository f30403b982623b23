use serde::{Deserialize, Serialize};
use std::fmt;

/// A tenant-defined classification tag for properties.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryArea {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for CategoryArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.name)
    }
}
