/// Best-score persistence: one best score per username.
///
/// ## File format
///   Key-value lines, `username=best`, sorted by username.
///   The last `=` separates name from score, so names may contain `=`.
///   Blank lines and `#` comments are ignored; malformed lines are skipped.
///
/// ## Failure policy
///   A missing or unreadable file loads as an empty table.
///   `record()` updates the in-memory table *before* writing, so the
///   session's achievement stays visible even when the write fails.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ScoreError;

// ══════════════════════════════════════════════════════════════
// Scoreboard trait
// ══════════════════════════════════════════════════════════════

pub trait Scoreboard {
    /// Stored best for `user`, if any.
    fn best(&self, user: &str) -> Option<u32>;

    /// Raise `user`'s best to `score` if it is higher (or there is no
    /// entry yet) and persist. `Ok(true)` when the stored best changed.
    fn record(&mut self, user: &str, score: u32) -> Result<bool, ScoreError>;

    /// All `(user, best)` pairs, in no particular order.
    fn entries(&self) -> Vec<(String, u32)>;
}

// ══════════════════════════════════════════════════════════════
// In-memory table
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreTable {
    best: BTreeMap<String, u32>,
}

impl ScoreTable {
    pub fn get(&self, user: &str) -> Option<u32> {
        self.best.get(user).copied()
    }

    /// Monotonic update. Returns true if the table changed.
    pub fn raise(&mut self, user: &str, score: u32) -> bool {
        match self.best.get_mut(user) {
            Some(b) if *b >= score => false,
            Some(b) => { *b = score; true }
            None => { self.best.insert(user.to_string(), score); true }
        }
    }

    pub fn entries(&self) -> Vec<(String, u32)> {
        self.best.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    pub fn parse(content: &str) -> Self {
        let mut table = ScoreTable::default();
        for (n, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') { continue; }
            match parse_line(line) {
                Some((name, score)) => { table.raise(name, score); }
                None => warn!(line = n + 1, "skipping malformed score line"),
            }
        }
        table
    }

    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(self.best.len() * 16);
        for (name, score) in &self.best {
            // Names that would break the line format only live in memory.
            if !is_storable(name) { continue; }
            out.push_str(&format!("{}={}\n", name, score));
        }
        out
    }
}

fn parse_line(line: &str) -> Option<(&str, u32)> {
    let (name, score) = line.rsplit_once('=')?;
    let name = name.trim();
    if name.is_empty() { return None; }
    Some((name, score.trim().parse().ok()?))
}

pub fn is_storable(name: &str) -> bool {
    !name.trim().is_empty()
        && !name.contains(['\n', '\r'])
        && !name.trim_start().starts_with('#')
        && name == name.trim()
}

// ══════════════════════════════════════════════════════════════
// File-backed scoreboard
// ══════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct FileScoreboard {
    path: PathBuf,
    table: ScoreTable,
    /// The file exists but could not be read. It is never overwritten.
    load_failed: bool,
}

impl FileScoreboard {
    /// Load from `path`. Never fails: problems are logged and the table
    /// starts empty. An unreadable file is left alone; scores recorded
    /// afterwards stay in memory.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (table, load_failed) = match read_table(&path) {
            Ok(t) => (t, false),
            Err(e) => {
                warn!(error = %e, "starting with an empty score table; file will not be overwritten");
                (ScoreTable::default(), true)
            }
        };
        debug!(path = %path.display(), users = table.best.len(), "score table loaded");
        FileScoreboard { path, table, load_failed }
    }

    fn persist(&self) -> Result<(), ScoreError> {
        if self.load_failed {
            return Err(ScoreError::Write {
                path: self.path.clone(),
                source: io::Error::new(
                    io::ErrorKind::InvalidData,
                    "existing scores file could not be read",
                ),
            });
        }
        write_atomic(&self.path, &self.table.serialize())
            .map_err(|source| ScoreError::Write { path: self.path.clone(), source })
    }
}

impl Scoreboard for FileScoreboard {
    fn best(&self, user: &str) -> Option<u32> {
        self.table.get(user)
    }

    fn record(&mut self, user: &str, score: u32) -> Result<bool, ScoreError> {
        if !self.table.raise(user, score) {
            return Ok(false);
        }
        if !is_storable(user) {
            return Err(ScoreError::InvalidName(user.to_string()));
        }
        self.persist()?;
        Ok(true)
    }

    fn entries(&self) -> Vec<(String, u32)> {
        self.table.entries()
    }
}

fn read_table(path: &Path) -> Result<ScoreTable, ScoreError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(ScoreTable::parse(&content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ScoreTable::default()),
        Err(source) => Err(ScoreError::Read { path: path.to_path_buf(), source }),
    }
}

/// Write to a sibling temp file, then rename over the target.
fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)
}

// ══════════════════════════════════════════════════════════════
// Memory-only scoreboard (--no-save, tests)
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct MemoryScoreboard {
    table: ScoreTable,
}

impl MemoryScoreboard {
    pub fn new() -> Self {
        MemoryScoreboard::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        let mut table = ScoreTable::default();
        for (name, score) in entries {
            table.raise(name, score);
        }
        MemoryScoreboard { table }
    }
}

impl Scoreboard for MemoryScoreboard {
    fn best(&self, user: &str) -> Option<u32> {
        self.table.get(user)
    }

    fn record(&mut self, user: &str, score: u32) -> Result<bool, ScoreError> {
        Ok(self.table.raise(user, score))
    }

    fn entries(&self) -> Vec<(String, u32)> {
        self.table.entries()
    }
}

// ══════════════════════════════════════════════════════════════
// Leaderboard
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ranked {
    pub rank: usize,
    pub name: String,
    pub score: u32,
}

/// Highest score first; ties broken by name.
pub fn leaderboard(mut entries: Vec<(String, u32)>) -> Vec<Ranked> {
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.into_iter()
        .enumerate()
        .map(|(i, (name, score))| Ranked { rank: i + 1, name, score })
        .collect()
}
