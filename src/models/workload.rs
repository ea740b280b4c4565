//! Workload catalog
//!
//! A workload names a deployable process definition. The catalog is fixed at
//! harness start and drives every run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, deployable unit of executable process logic.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Workload {
    id: String,
}

impl Workload {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The stock catalog of process definitions the harness ships with.
    pub fn default_catalog() -> Vec<Workload> {
        [
            "process-01",
            "process-02",
            "process-03",
            "process-04",
            "process-05",
            "process-usertask-01",
            "process-usertask-02",
            "process-usertask-03",
        ]
        .into_iter()
        .map(Workload::new)
        .collect()
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<&str> for Workload {
    fn from(id: &str) -> Self {
        Workload::new(id)
    }
}

/// Synthetic key naming the whole catalog, used for randomized-mode batch
/// totals where individual workloads are deliberately not distinguished.
pub fn composite_label(workloads: &[Workload]) -> String {
    workloads
        .iter()
        .map(Workload::id)
        .collect::<Vec<_>>()
        .join("+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_size() {
        assert_eq!(Workload::default_catalog().len(), 8);
    }

    #[test]
    fn test_composite_label() {
        let workloads = vec![Workload::new("A"), Workload::new("B")];
        assert_eq!(composite_label(&workloads), "A+B");
    }

    #[test]
    fn test_composite_label_single() {
        assert_eq!(composite_label(&[Workload::new("only")]), "only");
    }
}
