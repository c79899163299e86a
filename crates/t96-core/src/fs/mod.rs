//! The gated virtual filesystem.
//!
//! The authored tree is immutable and shared. Everything that changes
//! during a run (corruption, decryption, locking, deletion) lives in
//! [`GameState::file_mutations`] and is overlaid at read time.
//!
//! Access gates make a node indistinguishable from a missing one: a
//! lookup through a node whose clearance or flags are not met fails as
//! not-found.

mod data;
mod node;
/// Path arithmetic.
pub mod path;
/// Approximate filename matching.
pub mod search;

use std::sync::OnceLock;

use thiserror::Error;

use crate::rng::{Mulberry32, hash_str};
use crate::state::{GameState, flag};
use crate::truth::TruthCategory;

pub use node::{Directory, FileNode, FileStatus, MediaTrigger, Node, SecurityQuestion};
pub use path::resolve_path;
pub use search::{FileMatch, MatchQuality, Resolution, fuzzy_match_filename};

/// Replacement for a corrupted line.
pub const DATA_LOSS: &str = "[DATA LOSS]";
/// Content of a locked file.
pub const FILE_LOCKED: &str = "[FILE LOCKED]";
/// Content of a file that is still encrypted.
pub const ENCRYPTED_PLACEHOLDER: &str = "[ENCRYPTED - DECRYPTION REQUIRED]";
/// Replacement for a degraded time-sensitive line.
pub const DEGRADED: &str = "[DATA DEGRADED - RETRIEVAL WINDOW EXCEEDED]";
/// Commands after which time-sensitive files start degrading.
pub const DEGRADATION_START: u32 = 30;

/// Why a file cannot be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessDenied {
    /// No visible node at the path.
    #[error("FILE NOT FOUND")]
    NotFound,
    /// The node is a directory.
    #[error("NOT A FILE")]
    NotAFile,
    /// The file was deleted this run.
    #[error("FILE DELETED")]
    Deleted,
    /// The file was locked this run.
    #[error("FILE LOCKED")]
    Locked,
    /// Clearance below the file's threshold.
    #[error("ACCESS DENIED - CLEARANCE INSUFFICIENT")]
    ClearanceInsufficient,
    /// Restricted archive without the admin unlock.
    #[error("ACCESS DENIED - RESTRICTED ARCHIVE")]
    RestrictedArchive,
}

/// Kind of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Directory.
    Dir,
    /// File.
    File,
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Display name; directories end in `/`.
    pub name: String,
    /// Entry kind.
    pub kind: EntryType,
    /// File status, for files.
    pub status: Option<FileStatus>,
}

/// A filesystem tree plus the operations that read it against a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystem {
    root: Directory,
}

static STANDARD: OnceLock<FileSystem> = OnceLock::new();

impl FileSystem {
    /// Wrap an authored root directory.
    pub fn new(root: Directory) -> Self {
        Self { root }
    }

    /// The game's authored archive.
    pub fn standard() -> &'static FileSystem {
        STANDARD.get_or_init(|| FileSystem::new(data::archive()))
    }

    /// Root directory.
    pub fn root(&self) -> &Directory {
        &self.root
    }

    /// Whether `node` is visible to `state`.
    ///
    /// Restricted files skip their clearance check once the archive is
    /// unlocked and are hidden entirely before that.
    pub(crate) fn passes_gates(node: &Node, state: &GameState) -> bool {
        if !state.flags.has_all(node.required_flags()) {
            return false;
        }
        let restricted = node.status().is_some_and(FileStatus::is_restricted);
        let admin = state.flag(flag::ADMIN_UNLOCKED);
        if restricted && admin {
            return true;
        }
        node.access_threshold()
            .is_none_or(|threshold| state.access_level >= threshold)
    }

    /// Walk to the node at `path`, honouring gates at each hop.
    pub fn get_node(&self, path: &str, state: &GameState) -> Option<&Node> {
        let mut segments = path::segments(path).peekable();
        if segments.peek().is_none() {
            return None;
        }
        let mut dir = &self.root;
        while let Some(segment) = segments.next() {
            let child = dir.children.get(segment)?;
            if !Self::passes_gates(child, state) {
                return None;
            }
            if segments.peek().is_none() {
                return Some(child);
            }
            dir = child.as_dir()?;
        }
        None
    }

    /// Walk to the directory at `path`; root included.
    pub fn get_dir(&self, path: &str, state: &GameState) -> Option<&Directory> {
        if path::segments(path).next().is_none() {
            return Some(&self.root);
        }
        self.get_node(path, state).and_then(Node::as_dir)
    }

    /// Whether `path` names a directory visible to `state`.
    pub fn is_dir(&self, path: &str, state: &GameState) -> bool {
        self.get_dir(path, state).is_some()
    }

    /// Visible entries of the directory at `path`, directories first.
    pub fn list_directory(&self, path: &str, state: &GameState) -> Option<Vec<DirEntry>> {
        let dir = self.get_dir(path, state)?;
        let admin = state.flag(flag::ADMIN_UNLOCKED);
        let mut entries: Vec<DirEntry> = dir
            .children
            .iter()
            .filter(|(_, child)| {
                let restricted = child.status().is_some_and(FileStatus::is_restricted);
                !(restricted && !admin) && Self::passes_gates(child, state)
            })
            .filter(|(name, _)| {
                state
                    .mutation(&path::join(path, name))
                    .is_none_or(|m| !m.deleted)
            })
            .map(|(name, child)| match child {
                Node::Dir(_) => DirEntry {
                    name: format!("{name}/"),
                    kind: EntryType::Dir,
                    status: None,
                },
                Node::File(f) => DirEntry {
                    name: name.clone(),
                    kind: EntryType::File,
                    status: Some(f.status),
                },
            })
            .collect();
        entries.sort_by(|a, b| match (a.kind, b.kind) {
            (EntryType::Dir, EntryType::File) => std::cmp::Ordering::Less,
            (EntryType::File, EntryType::Dir) => std::cmp::Ordering::Greater,
            _ => a.name.cmp(&b.name),
        });
        Some(entries)
    }

    /// File node at `path`, if visible.
    pub fn get_file(&self, path: &str, state: &GameState) -> Option<&FileNode> {
        self.get_node(path, state).and_then(Node::as_file)
    }

    /// Readable lines of the file at `path`.
    ///
    /// `None` means missing or deleted. Locked and still-encrypted files
    /// yield a single placeholder line. Time-sensitive degradation runs
    /// before corruption and truncation are overlaid.
    pub fn get_file_content(
        &self,
        path: &str,
        state: &GameState,
        want_decrypted: bool,
    ) -> Option<Vec<String>> {
        let file = self.get_file(path, state)?;
        let mutation = state.mutation(path);
        if mutation.is_some_and(|m| m.deleted) {
            return None;
        }
        if mutation.is_some_and(|m| m.locked) {
            return Some(vec![FILE_LOCKED.to_string()]);
        }

        let decrypted = mutation.is_some_and(|m| m.decrypted);
        let mut content = match (&file.decrypted_fragment, want_decrypted && decrypted) {
            (Some(fragment), true) => fragment.clone(),
            _ if file.status == FileStatus::Encrypted && !decrypted => {
                return Some(vec![ENCRYPTED_PLACEHOLDER.to_string()]);
            }
            _ => file.content.clone(),
        };

        if file.is_time_sensitive(path) && state.session_command_count > DEGRADATION_START {
            degrade(&mut content, path, state);
        }

        if let Some(m) = mutation {
            for &idx in &m.corrupted_lines {
                if let Some(line) = content.get_mut(idx) {
                    *line = DATA_LOSS.to_string();
                }
            }
            if let Some(line) = m.truncated_line.and_then(|idx| content.get_mut(idx)) {
                let cut = line.chars().count() * 2 / 5;
                let kept: String = line.chars().take(cut).collect();
                *line = format!("{kept}—[CORRUPTION]");
            }
        }
        Some(content)
    }

    /// Check whether the file at `path` can be opened.
    pub fn can_access_file(&self, path: &str, state: &GameState) -> Result<&FileNode, AccessDenied> {
        let node = self.get_node(path, state).ok_or(AccessDenied::NotFound)?;
        let file = node.as_file().ok_or(AccessDenied::NotAFile)?;
        if let Some(m) = state.mutation(path) {
            if m.deleted {
                return Err(AccessDenied::Deleted);
            }
            if m.locked {
                return Err(AccessDenied::Locked);
            }
        }
        if file.status.is_restricted() {
            if file
                .access_threshold
                .is_some_and(|threshold| state.access_level < threshold)
            {
                return Err(AccessDenied::ClearanceInsufficient);
            }
            if !state.flag(flag::ADMIN_UNLOCKED) && path.starts_with("/admin") {
                return Err(AccessDenied::RestrictedArchive);
            }
        }
        Ok(file)
    }

    /// Categories revealed by the file at `path`, ignoring all gates.
    pub fn get_file_reveals(&self, path: &str) -> Vec<TruthCategory> {
        let mut dir = &self.root;
        let mut segments = path::segments(path).peekable();
        while let Some(segment) = segments.next() {
            match dir.children.get(segment) {
                Some(Node::Dir(d)) if segments.peek().is_some() => dir = d,
                Some(Node::File(f)) if segments.peek().is_none() => return f.reveals.clone(),
                _ => return Vec::new(),
            }
        }
        Vec::new()
    }

    /// Whether a file exists at `path`, ignoring all gates.
    pub fn file_exists(&self, path: &str) -> bool {
        let mut dir = &self.root;
        let mut segments = path::segments(path).peekable();
        while let Some(segment) = segments.next() {
            match dir.children.get(segment) {
                Some(Node::Dir(d)) if segments.peek().is_some() => dir = d,
                Some(Node::File(_)) => return segments.peek().is_none(),
                _ => return false,
            }
        }
        false
    }

    /// Every file path in the tree, ignoring gates, in walk order.
    pub fn all_file_paths(&self) -> Vec<String> {
        fn walk(dir: &Directory, prefix: &str, out: &mut Vec<String>) {
            for (name, child) in &dir.children {
                let full = path::join(prefix, name);
                match child {
                    Node::Dir(d) => walk(d, &full, out),
                    Node::File(_) => out.push(full),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.root, "/", &mut out);
        out
    }
}

/// Replace interior lines of a time-sensitive file with a degradation
/// marker, reproducibly for a given seed, path and command count.
fn degrade(content: &mut Vec<String>, path: &str, state: &GameState) {
    let overdue = state.session_command_count - DEGRADATION_START;
    let severity = (overdue / 10).min(5);
    let key = state
        .seed
        .wrapping_add(hash_str(path))
        .wrapping_add(state.session_command_count);
    let mut rng = Mulberry32::new(key);
    let probability = f64::from(severity) * 0.15;
    let last = content.len().saturating_sub(1);
    for (idx, line) in content.iter_mut().enumerate() {
        let roll = rng.next_f64();
        if idx != 0 && idx != last && roll < probability {
            *line = DEGRADED.to_string();
        }
    }
    if severity >= 3 {
        content.push(String::new());
        content.push("[WARNING: File integrity compromised due to delayed access]".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FileMutation;

    fn tiny() -> FileSystem {
        FileSystem::new(
            Directory::new("")
                .dir(
                    Directory::new("docs")
                        .file(FileNode::new("b.txt", FileStatus::Intact, &["b0", "b1", "b2"]))
                        .file(FileNode::new("a.txt", FileStatus::Intact, &["a0"]))
                        .dir(Directory::new("zeta"))
                        .file(
                            FileNode::new("secret.txt", FileStatus::Restricted, &["s"]).threshold(4),
                        ),
                )
                .dir(
                    Directory::new("vault")
                        .threshold(3)
                        .file(FileNode::new("gold.txt", FileStatus::Intact, &["au"])),
                )
                .dir(
                    Directory::new("admin")
                        .file(FileNode::new("memo.txt", FileStatus::Restricted, &["m"])),
                )
                .file(
                    FileNode::new("locked.enc", FileStatus::Encrypted, &["xx"])
                        .fragment(&["clear"])
                        .reveals(&[TruthCategory::TelepathicScouts]),
                )
                .file(FileNode::new(
                    "early_notice.txt",
                    FileStatus::Intact,
                    &["first", "one", "two", "three", "four", "five", "six", "last"],
                )),
        )
    }

    #[test]
    fn gated_nodes_look_missing() {
        let fs = tiny();
        let mut state = GameState::new(1);
        assert!(fs.get_node("/vault", &state).is_none());
        assert!(fs.get_node("/vault/gold.txt", &state).is_none());
        state.access_level = 3;
        assert!(fs.get_node("/vault/gold.txt", &state).is_some());
        assert!(fs.get_node("/nowhere", &state).is_none());
        assert!(fs.get_node("/docs/a.txt/deeper", &state).is_none());
    }

    #[test]
    fn listing_order_and_visibility() {
        let fs = tiny();
        let mut state = GameState::new(1);
        let names: Vec<String> = fs
            .list_directory("/docs", &state)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["zeta/", "a.txt", "b.txt"]);

        state.flags.set(flag::ADMIN_UNLOCKED, true);
        let names: Vec<String> = fs
            .list_directory("/docs", &state)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert!(names.contains(&"secret.txt".to_string()));
    }

    #[test]
    fn deleted_files_are_omitted() {
        let fs = tiny();
        let mut state = GameState::new(1);
        state.file_mutations.insert(
            "/docs/a.txt".into(),
            FileMutation {
                deleted: true,
                ..FileMutation::default()
            },
        );
        let entries = fs.list_directory("/docs", &state).unwrap();
        assert!(entries.iter().all(|e| e.name != "a.txt"));
        assert!(fs.get_file_content("/docs/a.txt", &state, false).is_none());
        assert_eq!(fs.can_access_file("/docs/a.txt", &state).unwrap_err(), AccessDenied::Deleted);
    }

    #[test]
    fn content_overlays() {
        let fs = tiny();
        let mut state = GameState::new(1);
        assert_eq!(
            fs.get_file_content("/locked.enc", &state, false).unwrap(),
            vec![ENCRYPTED_PLACEHOLDER]
        );
        state.file_mutations.insert(
            "/locked.enc".into(),
            FileMutation {
                decrypted: true,
                ..FileMutation::default()
            },
        );
        assert_eq!(fs.get_file_content("/locked.enc", &state, true).unwrap(), vec!["clear"]);

        state.file_mutations.insert(
            "/docs/b.txt".into(),
            FileMutation {
                corrupted_lines: vec![1, 40],
                truncated_line: Some(2),
                ..FileMutation::default()
            },
        );
        let lines = fs.get_file_content("/docs/b.txt", &state, false).unwrap();
        assert_eq!(lines[1], DATA_LOSS);
        assert_eq!(lines[2], "—[CORRUPTION]");

        state.file_mutations.insert(
            "/docs/a.txt".into(),
            FileMutation {
                locked: true,
                ..FileMutation::default()
            },
        );
        assert_eq!(fs.get_file_content("/docs/a.txt", &state, false).unwrap(), vec![FILE_LOCKED]);
    }

    #[test]
    fn degradation_is_reproducible() {
        let fs = tiny();
        let mut state = GameState::new(77);
        state.session_command_count = 10;
        let fresh = fs.get_file_content("/early_notice.txt", &state, false).unwrap();
        assert!(fresh.iter().all(|l| l != DEGRADED));

        state.session_command_count = 75;
        let a = fs.get_file_content("/early_notice.txt", &state, false).unwrap();
        let b = fs.get_file_content("/early_notice.txt", &state, false).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0], "first");
        assert!(a.last().unwrap().contains("integrity compromised"));
    }

    #[test]
    fn access_reasons() {
        let fs = tiny();
        let mut state = GameState::new(1);
        assert_eq!(fs.can_access_file("/missing", &state).unwrap_err(), AccessDenied::NotFound);
        assert_eq!(fs.can_access_file("/docs", &state).unwrap_err(), AccessDenied::NotAFile);
        assert_eq!(
            fs.can_access_file("/admin/memo.txt", &state).unwrap_err(),
            AccessDenied::RestrictedArchive
        );
        state.flags.set(flag::ADMIN_UNLOCKED, true);
        assert_eq!(
            fs.can_access_file("/docs/secret.txt", &state).unwrap_err(),
            AccessDenied::ClearanceInsufficient
        );
        assert!(fs.can_access_file("/admin/memo.txt", &state).is_ok());
        assert_eq!(AccessDenied::Locked.to_string(), "FILE LOCKED");
    }

    #[test]
    fn reveals_ignore_state() {
        let fs = tiny();
        assert_eq!(fs.get_file_reveals("/locked.enc"), vec![TruthCategory::TelepathicScouts]);
        assert!(fs.get_file_reveals("/docs").is_empty());
        assert!(fs.file_exists("/vault/gold.txt"));
        assert!(!fs.file_exists("/vault"));
    }

    #[test]
    fn standard_root_listing() {
        let fs = FileSystem::standard();
        let mut state = GameState::new(1);
        let names = |state: &GameState| -> String {
            fs.list_directory("/", state)
                .unwrap()
                .into_iter()
                .map(|e| e.name)
                .collect::<Vec<_>>()
                .join(" ")
        };
        insta::assert_snapshot!(names(&state), @"comms/ internal/ ops/ storage/ tmp/");
        state.access_level = 2;
        insta::assert_snapshot!(names(&state), @"admin/ comms/ internal/ ops/ storage/ tmp/");
    }

    #[test]
    fn standard_archive_reveals_every_category() {
        let fs = FileSystem::standard();
        for cat in TruthCategory::ALL {
            assert!(
                fs.all_file_paths()
                    .iter()
                    .any(|p| fs.get_file_reveals(p).contains(&cat)),
                "no file reveals {cat}"
            );
        }
    }
}
