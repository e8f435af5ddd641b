// Language name -> remote engine language id mapping
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub name: String,
    pub id: u32,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguagesJson {
    languages: Vec<LanguageEntry>,
}

/// Judge0 CE ids for the languages we ship with
const DEFAULT_LANGUAGES: &[(&str, u32, &[&str])] = &[
    ("c", 50, &[]),
    ("cpp", 54, &["c++"]),
    ("csharp", 51, &["c#", "cs"]),
    ("go", 60, &["golang"]),
    ("java", 62, &[]),
    ("javascript", 63, &["js", "node"]),
    ("kotlin", 78, &["kt"]),
    ("python", 71, &["python3", "py"]),
    ("ruby", 72, &["rb"]),
    ("rust", 73, &["rs"]),
    ("typescript", 74, &["ts"]),
];

/// Fixed table of languages the remote engine accepts.
///
/// Lookups are case-insensitive and accept aliases; anything not in the table is
/// rejected before a request is ever built.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    entries: Vec<LanguageEntry>,
    index: HashMap<String, u32>,
}

impl LanguageTable {
    pub fn new(entries: Vec<LanguageEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::Languages("no languages configured".to_string()));
        }

        let mut index = HashMap::new();
        for entry in &entries {
            let keys = std::iter::once(&entry.name).chain(entry.aliases.iter());
            for key in keys {
                let key = normalize(key);
                if let Some(previous) = index.insert(key.clone(), entry.id) {
                    if previous != entry.id {
                        return Err(ConfigError::Languages(format!(
                            "'{}' maps to both {} and {}",
                            key, previous, entry.id
                        )));
                    }
                }
            }
        }

        let mut entries = entries;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { entries, index })
    }

    /// Load a table from a languages JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::Languages(format!("failed to read {}: {}", path.display(), e))
        })?;

        let parsed: LanguagesJson = serde_json::from_str(&content).map_err(|e| {
            ConfigError::Languages(format!("failed to parse {}: {}", path.display(), e))
        })?;

        Self::new(parsed.languages)
    }

    /// Remote engine id for a language name or alias
    pub fn id_of(&self, language: &str) -> Option<u32> {
        self.index.get(&normalize(language)).copied()
    }

    /// Canonical language names, sorted
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn entries(&self) -> &[LanguageEntry] {
        &self.entries
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        let entries = DEFAULT_LANGUAGES
            .iter()
            .map(|(name, id, aliases)| LanguageEntry {
                name: name.to_string(),
                id: *id,
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
            })
            .collect::<Vec<_>>();
        let index = entries
            .iter()
            .flat_map(|e| {
                std::iter::once(e.name.clone())
                    .chain(e.aliases.iter().cloned())
                    .map(move |key| (key, e.id))
            })
            .collect();
        Self { entries, index }
    }
}

fn normalize(language: &str) -> String {
    language.trim().to_lowercase()
}
