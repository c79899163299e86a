//! Immutable node types of the authored filesystem.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::truth::TruthCategory;

/// Status of a file node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Plain readable file.
    Intact,
    /// Needs `decrypt` before the fragment is readable.
    Encrypted,
    /// Reading may corrupt it.
    Unstable,
    /// Visible only after the admin unlock.
    Restricted,
    /// Restricted briefing document.
    RestrictedBriefing,
}

impl FileStatus {
    /// Tag shown in listings.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Intact => "INTACT",
            Self::Encrypted => "ENCRYPTED",
            Self::Unstable => "UNSTABLE",
            Self::Restricted => "RESTRICTED",
            Self::RestrictedBriefing => "BRIEFING",
        }
    }

    /// Whether the status hides the file until the admin unlock.
    pub fn is_restricted(self) -> bool {
        matches!(self, Self::Restricted | Self::RestrictedBriefing)
    }
}

/// Question that must be answered before a file decrypts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityQuestion {
    /// Prompt shown to the player.
    pub question: String,
    /// Accepted answers, compared case-insensitively.
    pub answers: Vec<String>,
    /// Hint shown after a wrong answer.
    pub hint: String,
}

impl SecurityQuestion {
    /// Whether `answer` matches any accepted answer.
    pub fn accepts(&self, answer: &str) -> bool {
        let answer = answer.trim().to_lowercase();
        self.answers.iter().any(|a| a.to_lowercase() == answer)
    }
}

/// Image or video shown by the host when a file is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTrigger {
    /// Asset path.
    pub src: String,
    /// Caption.
    pub alt: String,
    /// Optional colour tone for the overlay.
    pub tone: Option<String>,
}

/// A file node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// File name.
    pub name: String,
    /// Status.
    pub status: FileStatus,
    /// Raw content lines.
    pub content: Vec<String>,
    /// Lines available once decrypted.
    pub decrypted_fragment: Option<Vec<String>>,
    /// Question gating decryption.
    pub security_question: Option<SecurityQuestion>,
    /// Clearance needed to see the file.
    pub access_threshold: Option<u32>,
    /// Clearance needed to decrypt the file.
    pub decrypt_threshold: Option<u32>,
    /// Flags needed to see the file.
    pub required_flags: Vec<String>,
    /// Categories revealed by reading the file.
    pub reveals: Vec<TruthCategory>,
    /// Image shown once when read.
    pub image: Option<MediaTrigger>,
    /// Video shown once when read.
    pub video: Option<MediaTrigger>,
}

impl FileNode {
    /// New file with `content`.
    pub fn new(name: &str, status: FileStatus, content: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            status,
            content: content.iter().map(|l| (*l).to_string()).collect(),
            decrypted_fragment: None,
            security_question: None,
            access_threshold: None,
            decrypt_threshold: None,
            required_flags: Vec::new(),
            reveals: Vec::new(),
            image: None,
            video: None,
        }
    }

    /// Set revealed categories.
    pub fn reveals(mut self, categories: &[TruthCategory]) -> Self {
        self.reveals = categories.to_vec();
        self
    }

    /// Set the decrypted fragment.
    pub fn fragment(mut self, lines: &[&str]) -> Self {
        self.decrypted_fragment = Some(lines.iter().map(|l| (*l).to_string()).collect());
        self
    }

    /// Gate decryption behind a question.
    pub fn question(mut self, question: &str, answers: &[&str], hint: &str) -> Self {
        self.security_question = Some(SecurityQuestion {
            question: question.to_string(),
            answers: answers.iter().map(|a| (*a).to_string()).collect(),
            hint: hint.to_string(),
        });
        self
    }

    /// Require clearance to see the file.
    pub fn threshold(mut self, level: u32) -> Self {
        self.access_threshold = Some(level);
        self
    }

    /// Require clearance to decrypt the file.
    pub fn decrypt_threshold(mut self, level: u32) -> Self {
        self.decrypt_threshold = Some(level);
        self
    }

    /// Require a flag to see the file.
    pub fn requires(mut self, flag: &str) -> Self {
        self.required_flags.push(flag.to_string());
        self
    }

    /// Attach an image.
    pub fn image(mut self, src: &str, alt: &str) -> Self {
        self.image = Some(MediaTrigger {
            src: src.to_string(),
            alt: alt.to_string(),
            tone: None,
        });
        self
    }

    /// Attach a video.
    pub fn video(mut self, src: &str, alt: &str, tone: &str) -> Self {
        self.video = Some(MediaTrigger {
            src: src.to_string(),
            alt: alt.to_string(),
            tone: Some(tone.to_string()),
        });
        self
    }

    /// Whether the file degrades late in a run.
    pub fn is_time_sensitive(&self, path: &str) -> bool {
        path.contains("early_")
            || path.contains("initial_")
            || self
                .content
                .iter()
                .any(|l| l.contains("TIME-SENSITIVE") || l.contains("[EARLY SESSION ONLY]"))
    }

    /// Approximate word count of the raw content.
    pub fn word_count(&self) -> usize {
        self.content.iter().map(|l| l.split_whitespace().count()).sum()
    }
}

/// A directory node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    /// Directory name.
    pub name: String,
    /// Clearance needed to enter.
    pub access_threshold: Option<u32>,
    /// Flags needed to enter.
    pub required_flags: Vec<String>,
    /// Children by name.
    pub children: BTreeMap<String, Node>,
}

impl Directory {
    /// Empty directory.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            access_threshold: None,
            required_flags: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    /// Require clearance to enter.
    pub fn threshold(mut self, level: u32) -> Self {
        self.access_threshold = Some(level);
        self
    }

    /// Require a flag to enter.
    pub fn requires(mut self, flag: &str) -> Self {
        self.required_flags.push(flag.to_string());
        self
    }

    /// Add a child directory.
    pub fn dir(mut self, child: Directory) -> Self {
        self.children.insert(child.name.clone(), Node::Dir(child));
        self
    }

    /// Add a child file.
    pub fn file(mut self, child: FileNode) -> Self {
        self.children.insert(child.name.clone(), Node::File(child));
        self
    }
}

/// A directory or a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Directory.
    Dir(Directory),
    /// File.
    File(FileNode),
}

impl Node {
    /// Node name.
    pub fn name(&self) -> &str {
        match self {
            Self::Dir(d) => &d.name,
            Self::File(f) => &f.name,
        }
    }

    /// Clearance gate.
    pub fn access_threshold(&self) -> Option<u32> {
        match self {
            Self::Dir(d) => d.access_threshold,
            Self::File(f) => f.access_threshold,
        }
    }

    /// Flag gate.
    pub fn required_flags(&self) -> &[String] {
        match self {
            Self::Dir(d) => &d.required_flags,
            Self::File(f) => &f.required_flags,
        }
    }

    /// File status, if a file.
    pub fn status(&self) -> Option<FileStatus> {
        match self {
            Self::Dir(_) => None,
            Self::File(f) => Some(f.status),
        }
    }

    /// Whether this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Dir(_))
    }

    /// File view, if a file.
    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Self::File(f) => Some(f),
            Self::Dir(_) => None,
        }
    }

    /// Directory view, if a directory.
    pub fn as_dir(&self) -> Option<&Directory> {
        match self {
            Self::Dir(d) => Some(d),
            Self::File(_) => None,
        }
    }
}
