// ABOUTME: Per-file upload slots identified by their ordinal in the file list.
// ABOUTME: A slot moves from pending to done exactly once and never back.

use nonempty::NonEmpty;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// A file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub local_path: PathBuf,
    /// Remote key: path relative to the dist root, `/`-separated.
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Pending(PendingFile),
    Done,
}

/// Upload status for every file, indexed by original position.
#[derive(Debug, Clone)]
pub struct UploadSlots {
    slots: Vec<Slot>,
}

impl UploadSlots {
    /// Build pending slots for `files`, keyed relative to `root`.
    pub fn new(root: &Path, files: NonEmpty<PathBuf>) -> Result<Self> {
        let slots = files
            .into_iter()
            .map(|local_path| {
                let key = remote_key(root, &local_path)?;
                Ok(Slot::Pending(PendingFile { local_path, key }))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { slots })
    }

    pub fn total(&self) -> usize {
        self.slots.len()
    }

    pub fn done_count(&self) -> usize {
        self.slots.iter().filter(|s| **s == Slot::Done).count()
    }

    pub fn all_done(&self) -> bool {
        self.done_count() == self.total()
    }

    /// Pending files with their ordinals, in input order.
    pub fn pending(&self) -> impl Iterator<Item = (usize, &PendingFile)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Pending(file) => Some((index, file)),
                Slot::Done => None,
            })
    }

    /// The pending file at `index`, if it has not been uploaded yet.
    pub fn get(&self, index: usize) -> Option<&PendingFile> {
        match self.slots.get(index)? {
            Slot::Pending(file) => Some(file),
            Slot::Done => None,
        }
    }

    /// Mark the slot uploaded. Returns false if it already was (or is out of range).
    pub fn mark_done(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if matches!(slot, Slot::Pending(_)) => {
                *slot = Slot::Done;
                true
            }
            _ => false,
        }
    }
}

/// Remote key for `path`: its components below `root`, joined with `/`.
pub fn remote_key(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| Error::FileOutsideDist {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        return Err(Error::FileOutsideDist {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        });
    }
    Ok(segments.join("/"))
}
