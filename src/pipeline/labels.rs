use std::fs::read_to_string;
use std::path::Path;

use crate::{Error, Result};

/// Class id to label mapping, fixed once built.
///
/// Slots may be empty when a label file skips ids; an empty slot resolves like an
/// out-of-range id.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelTable {
    labels: Box<[Option<String>]>,
}

impl LabelTable {
    pub fn new<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        let labels = labels.into_iter().map(|label| Some(label.into())).collect();
        Self { labels }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let table = Self::parse(&read_to_string(path)?)?;
        tracing::debug!("loaded {} labels from {}", table.len(), path.display());
        Ok(table)
    }

    /// Accepts `"<id> <name>"` lines or bare `"<name>"` lines; bare lines take the
    /// next id after the previous line.
    pub fn parse(text: &str) -> Result<Self> {
        let mut labels: Vec<Option<String>> = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (class_num, name) = line
                .split_once(char::is_whitespace)
                .and_then(|(head, rest)| head.parse::<usize>().ok().map(|id| (id, rest.trim())))
                .unwrap_or((labels.len(), line));
            if class_num < labels.len() {
                return Err(Error::InvalidConfig(format!(
                    "label line {}: class {} is already defined",
                    line_no + 1,
                    class_num
                )));
            }
            labels.resize(class_num, None);
            labels.push(Some(name.to_string()));
        }
        Ok(Self {
            labels: labels.into_boxed_slice(),
        })
    }

    /// Resolves a float-encoded class id as emitted by the model.
    pub fn resolve(&self, class_id: f32) -> Option<&str> {
        if !class_id.is_finite() || class_id < 0.0 {
            return None;
        }
        self.lookup(class_id as usize)
    }

    pub fn lookup(&self, class_num: usize) -> Option<&str> {
        self.labels.get(class_num)?.as_deref()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Defined labels in class order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().filter_map(|label| label.as_deref())
    }
}
