//! Test fixture loader for observation scenarios.
//!
//! Scenarios live in the repository-level `test-fixtures/` directory as JSON:
//! a timed list of observations per subject plus the regularities a learner
//! is expected to find in them.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Root directory of the test-fixtures folder.
fn fixtures_root() -> PathBuf {
    // Works from any crate in the workspace: walk up to find test-fixtures.
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);

    while !path.join("test-fixtures").join("scenarios").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures directory from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// List all JSON files in a fixture subdirectory, sorted by name.
pub fn list_fixtures(subdir: &str) -> Vec<PathBuf> {
    let dir = fixtures_root().join(subdir);
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("Failed to read directory {}: {}", dir.display(), e))
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                Some(path)
            } else {
                None
            }
        })
        .collect();
    files.sort();
    files
}

/// One observation reported by a subject, `offset_secs` after the scenario start.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioEvent {
    pub subject_id: String,
    #[serde(default)]
    pub offset_secs: i64,
    /// Raw observation mapping; deserialize into the pipeline's observation type.
    pub observation: serde_json::Value,
}

/// A regularity the learner must report.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpectedCandidate {
    /// `co_occurrence`, `transition`, or `sequence`.
    pub kind: String,
    /// Attributes for co-occurrences.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    /// Key, from, and to for transitions.
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub from: Option<serde_json::Value>,
    #[serde(default)]
    pub to: Option<serde_json::Value>,
    /// Visited states for sequences.
    #[serde(default)]
    pub states: Vec<serde_json::Value>,
    pub evidence_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioExpectation {
    #[serde(default)]
    pub candidates: Vec<ExpectedCandidate>,
    /// Attribute keys that must never appear in any candidate.
    #[serde(default)]
    pub absent_keys: Vec<String>,
}

/// A named observation scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Keys the learner should be configured to ignore.
    #[serde(default)]
    pub ignored_keys: Vec<String>,
    pub events: Vec<ScenarioEvent>,
    #[serde(default)]
    pub expected: ScenarioExpectation,
}

impl Scenario {
    /// Load `scenarios/<name>.json`.
    pub fn load(name: &str) -> Self {
        load_fixture(&format!("scenarios/{name}.json"))
    }

    /// Every scenario in `scenarios/`.
    pub fn all() -> Vec<Self> {
        list_fixtures("scenarios")
            .into_iter()
            .map(|path| {
                let content = std::fs::read_to_string(&path)
                    .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
                serde_json::from_str(&content)
                    .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
            })
            .collect()
    }

    /// Distinct subjects, in first-seen order.
    pub fn subjects(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for event in &self.events {
            if !seen.contains(&event.subject_id.as_str()) {
                seen.push(&event.subject_id);
            }
        }
        seen
    }
}
