//! The append-only record of evaluated configurations.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::param::ParameterVector;
use crate::space::SearchSpace;

/// One evaluated configuration and its score.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryEntry {
    /// The score returned by the evaluation; larger is better.
    pub score: f64,
    /// The evaluated parameters, in canonical order.
    pub params: ParameterVector,
}

/// Every evaluation of a run, in evaluation order.
///
/// Entries are never removed or reordered. The best entry is the one with
/// the largest score; when several share it, the earliest wins.
///
/// # Examples
///
/// ```
/// use bayesopt::History;
/// use bayesopt::param::ParamValue;
///
/// let mut history = History::new();
/// history.push(0.4, vec![ParamValue::Float(1.0)]);
/// history.push(0.9, vec![ParamValue::Float(2.0)]);
/// history.push(0.9, vec![ParamValue::Float(3.0)]);
///
/// assert_eq!(history.len(), 3);
/// assert_eq!(history.best().unwrap().params, vec![ParamValue::Float(2.0)]);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an evaluation.
    pub fn push(&mut self, score: f64, params: ParameterVector) {
        self.entries.push(HistoryEntry { score, params });
    }

    /// Returns all entries in evaluation order.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Returns the number of evaluations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was evaluated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry with the largest score, the earliest on ties.
    ///
    /// NaN scores never win over a number.
    #[must_use]
    pub fn best(&self) -> Option<&HistoryEntry> {
        self.entries.iter().fold(None, |best, entry| match best {
            None => Some(entry),
            Some(b) if entry.score > b.score || (b.score.is_nan() && !entry.score.is_nan()) => {
                Some(entry)
            }
            keep => keep,
        })
    }

    /// Returns the largest score so far.
    #[must_use]
    pub fn best_score(&self) -> Option<f64> {
        self.best().map(|entry| entry.score)
    }

    /// Returns the running maximum of the scores, one value per entry.
    #[must_use]
    pub fn best_so_far(&self) -> Vec<f64> {
        let mut best = f64::NEG_INFINITY;
        self.entries
            .iter()
            .map(|entry| {
                if entry.score > best {
                    best = entry.score;
                }
                best
            })
            .collect()
    }

    /// Encodes every entry for surrogate training.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoHistory`] when empty, or the encoding error of the
    /// first entry that does not fit `space`.
    pub fn training_data(&self, space: &SearchSpace) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
        if self.entries.is_empty() {
            return Err(Error::NoHistory);
        }
        let x = self
            .entries
            .iter()
            .map(|entry| space.encode(&entry.params))
            .collect::<Result<Vec<_>>>()?;
        let y = self.entries.iter().map(|entry| entry.score).collect();
        Ok((x, y))
    }
}

/// A serializable snapshot of a history.
///
/// # Schema versioning
///
/// The `version` field enables future schema evolution without breaking
/// existing files. The current version is `1`.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
pub struct HistorySnapshot {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// The recorded evaluations.
    pub history: History,
}

#[cfg(feature = "serde")]
impl History {
    /// Saves the history to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or written.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        let snapshot = HistorySnapshot {
            version: 1,
            history: self.clone(),
        };

        // Write next to the target, then rename over it.
        let parent = path.parent().unwrap_or(std::path::Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));
        let file = std::fs::File::create(&tmp_path)?;
        serde_json::to_writer_pretty(file, &snapshot).map_err(std::io::Error::other)?;
        std::fs::rename(&tmp_path, path)
    }

    /// Loads a history from a JSON file written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let file = std::fs::File::open(path)?;
        let snapshot: HistorySnapshot = serde_json::from_reader(file)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(snapshot.history)
    }
}
