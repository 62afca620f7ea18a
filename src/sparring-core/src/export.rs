//! Plain-text transcript export.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::debate_format::Speaker;
use crate::error::DebateError;
use crate::orchestrator::DebateOutcome;
use crate::transcript::DebateHistory;

/// Header information for an exported debate.
#[derive(Debug, Clone)]
pub struct DebateMetadata {
    pub topic: String,
    pub fighter_a: String,
    pub fighter_b: String,
    pub leader: Speaker,
}

impl DebateMetadata {
    pub fn from_outcome(outcome: &DebateOutcome) -> Self {
        Self {
            topic: outcome.history.topic().to_string(),
            fighter_a: outcome.fighter_a.name.clone(),
            fighter_b: outcome.fighter_b.name.clone(),
            leader: outcome.history.leader(),
        }
    }

    pub fn name_of(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::A => &self.fighter_a,
            Speaker::B => &self.fighter_b,
        }
    }
}

/// Writes a finished debate somewhere and says where.
pub trait TranscriptExporter {
    fn export(
        &self,
        metadata: &DebateMetadata,
        history: &DebateHistory,
        summary: &str,
    ) -> Result<PathBuf, DebateError>;
}

/// Writes `debate_<unix timestamp>.txt` files into a directory.
///
/// Existing files are never overwritten; a second export in the same second
/// gets a `_1`, `_2`, ... suffix.
#[derive(Debug, Clone)]
pub struct TextFileExporter {
    output_dir: PathBuf,
}

impl TextFileExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl TranscriptExporter for TextFileExporter {
    fn export(
        &self,
        metadata: &DebateMetadata,
        history: &DebateHistory,
        summary: &str,
    ) -> Result<PathBuf, DebateError> {
        fs::create_dir_all(&self.output_dir)?;
        let stem = format!("debate_{}", chrono::Utc::now().timestamp());
        let (path, mut file) = create_unique(&self.output_dir, &stem)?;
        file.write_all(render_transcript(metadata, history, summary).as_bytes())?;
        info!(path = %path.display(), "Saved debate transcript");
        Ok(path)
    }
}

/// Create `<stem>.txt`, or the first free `<stem>_<n>.txt`.
fn create_unique(dir: &Path, stem: &str) -> Result<(PathBuf, fs::File), DebateError> {
    let mut attempt = 0u32;
    loop {
        let filename = if attempt == 0 {
            format!("{}.txt", stem)
        } else {
            format!("{}_{}.txt", stem, attempt)
        };
        let path = dir.join(filename);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Render the transcript with statements in speaking order.
pub fn render_transcript(metadata: &DebateMetadata, history: &DebateHistory, summary: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "DEBATE: {} vs {}\n",
        metadata.fighter_a, metadata.fighter_b
    ));
    out.push_str(&format!("Topic: {}\n", metadata.topic));
    out.push_str(&format!(
        "Leading Debater: {}\n\n",
        metadata.name_of(metadata.leader)
    ));

    for (i, round) in history.rounds().iter().enumerate() {
        out.push_str(&format!(
            "--- ROUND {}: {} ---\n\n",
            i + 1,
            round.kind.descriptor().title
        ));
        for turn in [&round.first, &round.second] {
            out.push_str(&format!("{}:\n{}\n\n", metadata.name_of(turn.speaker), turn.text));
        }
    }

    out.push_str("=== SUMMARY ===\n\n");
    out.push_str(summary);
    out.push('\n');
    out
}
