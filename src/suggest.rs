//! Autocomplete candidates derived from a sample JSON message.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One autocomplete candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSuggestion {
    pub label: String,
    pub value: String,
}

impl PathSuggestion {
    fn from_path(path: &str) -> Self {
        Self {
            label: path.to_string(),
            value: path.to_string(),
        }
    }
}

/// Bounds applied while walking a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestionLimits {
    /// Maximum number of path segments.
    pub max_depth: usize,
    /// Only the first elements of each array are visited.
    pub max_array_items: usize,
    pub max_paths: usize,
    /// Cap on suggestions shown for a live query.
    pub max_visible: usize,
}

impl Default for SuggestionLimits {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_array_items: 4,
            max_paths: 80,
            max_visible: 8,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathSuggester {
    limits: SuggestionLimits,
}

impl PathSuggester {
    pub fn new(limits: SuggestionLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> SuggestionLimits {
        self.limits
    }

    /// Dotted paths found in `sample_text`, in order of first discovery.
    /// Text that is not JSON yields nothing.
    pub fn suggest(&self, sample_text: &str) -> Vec<PathSuggestion> {
        match serde_json::from_str::<Value>(sample_text) {
            Ok(sample) => self.suggest_value(&sample),
            Err(_) => Vec::new(),
        }
    }

    pub fn suggest_value(&self, sample: &Value) -> Vec<PathSuggestion> {
        let mut walk = Walk {
            limits: self.limits,
            seen: AHashSet::new(),
            out: Vec::new(),
        };
        walk.visit(sample, "", 0);
        walk.out
    }

    /// [`filter_suggestions`] with this suggester's visible limit.
    pub fn filter(&self, all: &[PathSuggestion], query: &str) -> Vec<PathSuggestion> {
        filter_suggestions(all, query, self.limits.max_visible)
    }
}

/// Suggestions for `sample_text` with the default limits.
pub fn suggest_paths(sample_text: &str) -> Vec<PathSuggestion> {
    PathSuggester::default().suggest(sample_text)
}

/// Narrows `all` to labels containing `query` (case-insensitive), keeping at
/// most `max_visible`. An empty query keeps the first entries.
pub fn filter_suggestions(
    all: &[PathSuggestion],
    query: &str,
    max_visible: usize,
) -> Vec<PathSuggestion> {
    let needle = query.trim().to_lowercase();
    all.iter()
        .filter(|s| needle.is_empty() || s.label.to_lowercase().contains(&needle))
        .take(max_visible)
        .cloned()
        .collect()
}

struct Walk {
    limits: SuggestionLimits,
    seen: AHashSet<String>,
    out: Vec<PathSuggestion>,
}

impl Walk {
    fn full(&self) -> bool {
        self.out.len() >= self.limits.max_paths
    }

    fn emit(&mut self, path: &str) {
        if !path.is_empty() && !self.full() && self.seen.insert(path.to_string()) {
            self.out.push(PathSuggestion::from_path(path));
        }
    }

    fn visit(&mut self, value: &Value, path: &str, depth: usize) {
        if self.full() {
            return;
        }
        self.emit(path);
        if depth >= self.limits.max_depth {
            return;
        }

        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if self.full() {
                        return;
                    }
                    self.visit(child, &join(path, key), depth + 1);
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().take(self.limits.max_array_items).enumerate() {
                    if self.full() {
                        return;
                    }
                    self.visit(child, &join(path, &index.to_string()), depth + 1);
                }
            }
            _ => {}
        }
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}
