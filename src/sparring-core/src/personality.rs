//! Personality profiles.
//!
//! A personality is a display name plus the behavior directive sent as the
//! system prompt for every turn that personality takes. Profiles are loaded
//! once into a [`PersonalityStore`] and never change afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::DebateError;

/// A named behavioral profile conditioning one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    /// Lookup key, e.g. "goggins".
    pub id: String,
    pub name: String,
    pub behavior_directive: String,
}

/// A personality record as written in config or a personality file.
///
/// Fields are optional here so a missing field is reported as
/// [`DebateError::Malformed`] rather than a generic parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonalityRecord {
    pub name: Option<String>,
    pub behavior_directive: Option<String>,
}

impl PersonalityRecord {
    /// Validate the record into a [`Personality`] with the given id.
    pub fn into_personality(self, id: &str) -> Result<Personality, DebateError> {
        let id = normalize_id(id);
        let name = required(self.name, &id, "name")?;
        let behavior_directive = required(self.behavior_directive, &id, "behavior_directive")?;
        Ok(Personality {
            id,
            name,
            behavior_directive,
        })
    }
}

fn required(value: Option<String>, id: &str, field: &'static str) -> Result<String, DebateError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DebateError::Malformed {
            kind: "personality",
            id: id.to_string(),
            field,
        }),
    }
}

/// Canonical form of a personality identifier.
pub fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Immutable lookup table of personalities keyed by id.
#[derive(Debug, Clone, Default)]
pub struct PersonalityStore {
    entries: BTreeMap<String, Personality>,
}

impl PersonalityStore {
    /// The personalities that ship with the binary.
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        for (id, name, directive) in [
            ("goggins", "David Goggins", GOGGINS_DIRECTIVE),
            ("robbins", "Mel Robbins", ROBBINS_DIRECTIVE),
        ] {
            entries.insert(
                id.to_string(),
                Personality {
                    id: id.to_string(),
                    name: name.to_string(),
                    behavior_directive: directive.to_string(),
                },
            );
        }
        Self { entries }
    }

    /// Build a store from raw records, validating every one of them.
    pub fn from_records(
        records: impl IntoIterator<Item = (String, PersonalityRecord)>,
    ) -> Result<Self, DebateError> {
        let mut store = Self::default();
        store.extend_records(records)?;
        Ok(store)
    }

    /// Add or replace personalities from raw records.
    pub fn extend_records(
        &mut self,
        records: impl IntoIterator<Item = (String, PersonalityRecord)>,
    ) -> Result<(), DebateError> {
        for (id, record) in records {
            let personality = record.into_personality(&id)?;
            debug!(id = %personality.id, name = %personality.name, "Loaded personality");
            self.entries.insert(personality.id.clone(), personality);
        }
        Ok(())
    }

    /// Load every `*.toml` file in `dir` as a personality named after its file stem.
    pub fn load_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<(), DebateError> {
        let dir = dir.as_ref();
        let read_dir = fs::read_dir(dir).map_err(|e| {
            DebateError::ConfigError(format!(
                "Failed to read personality directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let mut records = Vec::new();
        for entry in read_dir {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path)?;
            let record: PersonalityRecord = toml::from_str(&content).map_err(|e| {
                DebateError::ConfigError(format!(
                    "Failed to parse personality file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            records.push((id.to_string(), record));
        }

        self.extend_records(records)
    }

    /// Look up a personality by id (case-insensitive).
    pub fn resolve(&self, id: &str) -> Result<&Personality, DebateError> {
        let key = normalize_id(id);
        self.entries.get(&key).ok_or(DebateError::NotFound {
            kind: "personality",
            id: key,
        })
    }

    /// All personalities, ordered by id.
    pub fn list(&self) -> impl Iterator<Item = &Personality> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const GOGGINS_DIRECTIVE: &str = r#"You are David Goggins. Speak in his intense, direct, and brutally honest style.
Prioritize mental toughness, taking ownership, and pushing through limitations.
Use short, powerful sentences. Swear occasionally for emphasis.
Challenge excuses and promote extreme ownership and accountability.
Stay completely in character throughout this debate."#;

const ROBBINS_DIRECTIVE: &str = r#"You are Mel Robbins. Speak in her warm, casual, and motivating style.
Focus on practical habits, self-compassion, and celebrating small wins.
Use the 5-Second Rule concept when appropriate. Be encouraging but realistic.
Maintain a conversational tone with occasional personal anecdotes.
Stay completely in character throughout this debate."#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn record(name: Option<&str>, directive: Option<&str>) -> PersonalityRecord {
        PersonalityRecord {
            name: name.map(str::to_string),
            behavior_directive: directive.map(str::to_string),
        }
    }

    #[test]
    fn test_builtin_personalities() {
        let store = PersonalityStore::builtin();
        assert_eq!(store.len(), 2);
        assert_eq!(store.resolve("goggins").unwrap().name, "David Goggins");
        assert_eq!(store.resolve("robbins").unwrap().name, "Mel Robbins");
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let store = PersonalityStore::builtin();
        assert_eq!(store.resolve("  Goggins ").unwrap().id, "goggins");
    }

    #[test]
    fn test_resolve_unknown() {
        let store = PersonalityStore::builtin();
        match store.resolve("socrates") {
            Err(DebateError::NotFound { kind, id }) => {
                assert_eq!(kind, "personality");
                assert_eq!(id, "socrates");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_directive_is_malformed() {
        let result = PersonalityStore::from_records([(
            "stoic".to_string(),
            record(Some("Marcus Aurelius"), None),
        )]);
        assert!(matches!(
            result,
            Err(DebateError::Malformed {
                field: "behavior_directive",
                ..
            })
        ));
    }

    #[test]
    fn test_blank_name_is_malformed() {
        let result = PersonalityStore::from_records([(
            "stoic".to_string(),
            record(Some("   "), Some("Be calm.")),
        )]);
        assert!(matches!(
            result,
            Err(DebateError::Malformed { field: "name", .. })
        ));
    }

    #[test]
    fn test_records_override_builtin() {
        let mut store = PersonalityStore::builtin();
        store
            .extend_records([(
                "Goggins".to_string(),
                record(Some("Goggins Lite"), Some("Be mildly tough.")),
            )])
            .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.resolve("goggins").unwrap().name, "Goggins Lite");
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("stoic.toml")).unwrap();
        writeln!(
            file,
            "name = \"Marcus Aurelius\"\nbehavior_directive = \"\"\"\nSpeak calmly.\n\"\"\""
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut store = PersonalityStore::default();
        store.load_dir(dir.path()).unwrap();

        assert_eq!(store.len(), 1);
        let stoic = store.resolve("stoic").unwrap();
        assert_eq!(stoic.name, "Marcus Aurelius");
        assert_eq!(stoic.behavior_directive, "Speak calmly.");
    }

    #[test]
    fn test_load_dir_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("empty.toml"), "name = \"Nobody\"\n").unwrap();

        let mut store = PersonalityStore::default();
        let result = store.load_dir(dir.path());
        assert!(matches!(result, Err(DebateError::Malformed { .. })));
    }
}
