use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use super::reducer::NavEffect;
use super::state::NavState;
use super::state::NavigationMode;
use super::state::NavigationState;
use super::state::SpaceId;
use super::state::TabId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalEvent {
    Committed {
        generation: u64,
        mode: NavigationMode,
        tab: TabId,
        space: Option<SpaceId>,
    },
    Adopted {
        tab: TabId,
        space: Option<SpaceId>,
    },
    SignedOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub seq: u64,
    pub ts_ms: i64,
    #[serde(flatten)]
    pub event: JournalEvent,
}

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("journal io: {0}")]
    Io(#[from] std::io::Error),
    #[error("journal encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Append-only JSONL record of settled navigations.
#[derive(Debug)]
pub struct NavJournal {
    path: PathBuf,
    next_seq: u64,
}

impl NavJournal {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let existing = load_records(path.as_path())?;
        let next_seq = existing
            .iter()
            .map(|record| record.seq)
            .max()
            .map_or(1, |seq| seq.saturating_add(1));
        Ok(Self { path, next_seq })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, event: JournalEvent) -> Result<u64, JournalError> {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        let record = JournalRecord {
            seq,
            ts_ms: chrono::Utc::now().timestamp_millis(),
            event,
        };
        let line = serde_json::to_string(&record)?;
        append_line(self.path.as_path(), line.as_str())?;
        Ok(seq)
    }

    pub fn load(&self) -> Result<Vec<JournalRecord>, JournalError> {
        load_records(self.path.as_path())
    }
}

/// Journal entries for one dispatch: every emitted navigation, or a single
/// `Adopted` when the state moved without one.
pub fn journal_events(
    before: &NavigationState,
    after: &NavState,
    effects: &[NavEffect],
) -> Vec<JournalEvent> {
    let mut events: Vec<JournalEvent> = effects
        .iter()
        .map(|effect| match effect {
            NavEffect::Navigate {
                mode,
                projection,
                generation,
                ..
            } => JournalEvent::Committed {
                generation: *generation,
                mode: *mode,
                tab: projection.tab,
                space: projection.space.clone(),
            },
            NavEffect::RedirectToSignIn => JournalEvent::SignedOut,
        })
        .collect();

    if events.is_empty() && &after.nav != before {
        events.push(JournalEvent::Adopted {
            tab: after.nav.active_tab,
            space: after.nav.current_space_id.clone(),
        });
    }
    events
}

/// Last navigation state the journal settled on, if the session is still
/// signed in at its end.
pub fn replay_journal(records: &[JournalRecord]) -> Option<NavigationState> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|record| record.seq);

    let mut latest = None;
    for record in sorted {
        match record.event {
            JournalEvent::Committed { tab, space, .. } | JournalEvent::Adopted { tab, space } => {
                latest = Some(NavigationState::scoped(tab, space));
            }
            JournalEvent::SignedOut => latest = None,
        }
    }
    latest
}

fn load_records(path: &Path) -> Result<Vec<JournalRecord>, JournalError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<JournalRecord>(&line) {
            Ok(record) => records.push(record),
            Err(err) => tracing::warn!(path = %path.display(), "skipping journal line: {err}"),
        }
    }
    Ok(records)
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()
}
