//! Approximate filename matching.
//!
//! Matches are ranked exact, then substring or word, then bounded edit
//! distance. Ties keep walk order.

use strsim::levenshtein;

use super::path::{self, file_name};
use super::{Directory, FileSystem, Node};
use crate::state::GameState;

/// Quality of a filename match; smaller is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchQuality {
    /// Same name, ignoring case and extension.
    Exact,
    /// Substring in either direction, or a whole word of the name.
    Contains,
    /// Within the edit-distance budget.
    Fuzzy,
}

/// A file found by [`FileSystem::find_files_matching`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatch {
    /// Absolute path.
    pub path: String,
    /// File name.
    pub name: String,
    /// Match quality.
    pub quality: MatchQuality,
}

/// Outcome of [`FileSystem::smart_resolve_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Best path to use.
    pub resolved_path: String,
    /// Whether the input named an existing node directly.
    pub was_exact: bool,
    /// Close alternatives when the input did not resolve.
    pub suggestions: Vec<String>,
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

fn words(name: &str) -> impl Iterator<Item = &str> {
    name.split(['_', '-', '.', ' ']).filter(|w| !w.is_empty())
}

/// Rank how well `search` matches `filename`, or `None` for no match.
pub fn fuzzy_match_filename(search: &str, filename: &str) -> Option<MatchQuality> {
    let search = search.trim().to_lowercase();
    if search.is_empty() {
        return None;
    }
    let name = filename.to_lowercase();
    let search_base = strip_extension(&search);
    let name_base = strip_extension(&name);

    if search == name || search_base == name_base {
        return Some(MatchQuality::Exact);
    }

    if name.contains(&search)
        || (name_base.len() >= 4 && search.contains(name_base))
        || words(&name).any(|w| w == search_base)
    {
        return Some(MatchQuality::Contains);
    }

    let len = search_base.chars().count();
    if len < 4 {
        return None;
    }
    let budget = if len <= 5 { 1 } else { 2 };
    let close = levenshtein(search_base, name_base) <= budget
        || words(name_base)
            .filter(|w| w.len() >= 4)
            .any(|w| levenshtein(search_base, w) <= budget);
    close.then_some(MatchQuality::Fuzzy)
}

impl FileSystem {
    /// Visible files under `dir_path` (recursively) matching `search`,
    /// best first.
    pub fn find_files_matching(&self, search: &str, dir_path: &str, state: &GameState) -> Vec<FileMatch> {
        fn walk(
            dir: &Directory,
            prefix: &str,
            search: &str,
            state: &GameState,
            out: &mut Vec<FileMatch>,
        ) {
            for (name, child) in &dir.children {
                if !FileSystem::passes_gates(child, state) {
                    continue;
                }
                let full = path::join(prefix, name);
                match child {
                    Node::Dir(d) => walk(d, &full, search, state, out),
                    Node::File(_) => {
                        if state.mutation(&full).is_some_and(|m| m.deleted) {
                            continue;
                        }
                        if let Some(quality) = fuzzy_match_filename(search, name) {
                            out.push(FileMatch {
                                path: full,
                                name: name.clone(),
                                quality,
                            });
                        }
                    }
                }
            }
        }

        let Some(dir) = self.get_dir(dir_path, state) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        walk(dir, dir_path, search, state, &mut out);
        out.sort_by_key(|m| m.quality);
        out
    }

    /// Resolve `input` the way a forgiving shell would.
    ///
    /// An input naming a visible node resolves exactly. Otherwise a single
    /// exact or substring match in the target directory is taken; failing
    /// that, the closest matches across the archive are offered.
    pub fn smart_resolve_path(&self, input: &str, current_path: &str, state: &GameState) -> Resolution {
        let resolved = path::resolve_path(input, current_path);
        if self.get_node(&resolved, state).is_some() || self.is_dir(&resolved, state) {
            return Resolution {
                resolved_path: resolved,
                was_exact: true,
                suggestions: Vec::new(),
            };
        }

        let wanted = file_name(&resolved).to_string();
        let parent = path::parent(&resolved);
        let local: Vec<FileMatch> = self
            .find_files_matching(&wanted, &parent, state)
            .into_iter()
            .filter(|m| path::parent(&m.path) == parent)
            .collect();
        let strong: Vec<&FileMatch> = local
            .iter()
            .filter(|m| m.quality <= MatchQuality::Contains)
            .collect();
        if let [only] = strong.as_slice() {
            return Resolution {
                resolved_path: only.path.clone(),
                was_exact: false,
                suggestions: Vec::new(),
            };
        }

        let suggestions = self
            .find_files_matching(&wanted, "/", state)
            .into_iter()
            .take(3)
            .map(|m| m.path)
            .collect();
        Resolution {
            resolved_path: resolved,
            was_exact: false,
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{FileNode, FileStatus};

    #[test]
    fn ranking() {
        assert_eq!(fuzzy_match_filename("README", "readme.txt"), Some(MatchQuality::Exact));
        assert_eq!(fuzzy_match_filename("transport", "transport_log_96.txt"), Some(MatchQuality::Contains));
        assert_eq!(fuzzy_match_filename("log", "transport_log_96.txt"), Some(MatchQuality::Contains));
        assert_eq!(fuzzy_match_filename("transprot", "transport_log_96.txt"), Some(MatchQuality::Fuzzy));
        assert_eq!(fuzzy_match_filename("manifst", "cargo_manifest.txt"), Some(MatchQuality::Fuzzy));
        assert_eq!(fuzzy_match_filename("autoopsy", "autopsy_alpha.log"), Some(MatchQuality::Fuzzy));
    }

    #[test]
    fn rejects_unrelated() {
        assert_eq!(fuzzy_match_filename("zebra", "transport_log_96.txt"), None);
        assert_eq!(fuzzy_match_filename("xyz", "autopsy_alpha.log"), None);
        assert_eq!(fuzzy_match_filename("", "autopsy_alpha.log"), None);
    }

    fn archive() -> FileSystem {
        FileSystem::new(
            Directory::new("").dir(
                Directory::new("logs")
                    .file(FileNode::new("transport_log_96.txt", FileStatus::Intact, &["t"]))
                    .file(FileNode::new("transport_summary.txt", FileStatus::Intact, &["s"]))
                    .file(FileNode::new("autopsy_alpha.log", FileStatus::Intact, &["a"])),
            ),
        )
    }

    #[test]
    fn find_sorts_by_quality() {
        let fs = archive();
        let state = GameState::new(1);
        let found = fs.find_files_matching("transport_summary", "/", &state);
        assert_eq!(found[0].name, "transport_summary.txt");
        assert_eq!(found[0].quality, MatchQuality::Exact);
    }

    #[test]
    fn smart_resolution() {
        let fs = archive();
        let state = GameState::new(1);

        let exact = fs.smart_resolve_path("autopsy_alpha.log", "/logs", &state);
        assert!(exact.was_exact);
        assert_eq!(exact.resolved_path, "/logs/autopsy_alpha.log");

        let single = fs.smart_resolve_path("autopsy", "/logs", &state);
        assert!(!single.was_exact);
        assert_eq!(single.resolved_path, "/logs/autopsy_alpha.log");

        let ambiguous = fs.smart_resolve_path("transport", "/logs", &state);
        assert_eq!(ambiguous.resolved_path, "/logs/transport");
        assert_eq!(ambiguous.suggestions.len(), 2);

        let typo = fs.smart_resolve_path("autoopsy", "/", &state);
        assert_eq!(typo.suggestions, vec!["/logs/autopsy_alpha.log"]);
    }
}
