//! Keyword-matched dialogue channels.
//!
//! Each channel is an ordered table of [`Topic`]s. The first topic whose
//! keywords match the input answers, with a line the player has not seen
//! yet. Input that matches nothing loses the signal, which still costs an
//! exchange.

/// Prisoner 45, reached with `chat`.
pub mod prisoner;
/// The preserved scout pattern, reached with `link`.
pub mod scout;

use std::collections::BTreeSet;

use crate::context::Rolls;

/// One row of a responder table.
#[derive(Debug, Clone, Copy)]
pub struct Topic {
    /// Topic name, for logs.
    pub name: &'static str,
    /// Keywords. Entries of three characters or fewer match whole words,
    /// longer entries match anywhere in the input.
    pub keywords: &'static [&'static str],
    /// Inputs that match only when they are the whole message.
    pub exact: &'static [&'static str],
    /// Lines the topic can answer with.
    pub responses: &'static [&'static str],
}

impl Topic {
    /// Whether `input` (already lowercased) selects this topic.
    pub fn matches(&self, input: &str) -> bool {
        let trimmed = input.trim();
        if self.exact.contains(&trimmed) {
            return true;
        }
        self.keywords.iter().any(|k| {
            if k.chars().count() <= 3 && !k.contains(' ') {
                trimmed
                    .split(|c: char| !c.is_alphanumeric())
                    .any(|word| word == *k)
            } else {
                trimmed.contains(k)
            }
        })
    }
}

/// What a responder said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A topic matched.
    Answer {
        /// Matched topic.
        topic: &'static str,
        /// Lines to show.
        lines: Vec<String>,
    },
    /// Nothing matched.
    SignalLost(Vec<String>),
}

impl Reply {
    /// Lines to show.
    pub fn lines(&self) -> &[String] {
        match self {
            Self::Answer { lines, .. } | Self::SignalLost(lines) => lines,
        }
    }

    /// Whether a topic matched.
    pub fn is_answer(&self) -> bool {
        matches!(self, Self::Answer { .. })
    }
}

/// A channel's matching rules and fallbacks.
#[derive(Debug, Clone, Copy)]
pub struct Responder {
    /// Topics, evaluated top to bottom.
    pub topics: &'static [Topic],
    /// Lines for unmatched input.
    pub signal_lost: &'static [&'static str],
    /// Shown once every signal-lost line was used.
    pub severed: &'static str,
    /// Shown when the matched topic has nothing new.
    pub topic_exhausted: &'static [&'static str],
}

impl Responder {
    /// First topic matching `input`.
    pub fn topic_for(&self, input: &str) -> Option<&'static Topic> {
        let lowered = input.to_lowercase();
        self.topics.iter().find(|t| t.matches(&lowered))
    }

    /// Answer `input` without repeating anything in `used`.
    pub fn respond(&self, input: &str, used: &BTreeSet<String>, rolls: &mut Rolls) -> Reply {
        let Some(topic) = self.topic_for(input) else {
            let fresh: Vec<&str> = self
                .signal_lost
                .iter()
                .copied()
                .filter(|l| !used.contains(*l))
                .collect();
            let line = rolls.pick(&fresh).copied().unwrap_or(self.severed);
            return Reply::SignalLost(vec![line.to_string()]);
        };

        let fresh: Vec<&str> = topic
            .responses
            .iter()
            .copied()
            .filter(|l| !used.contains(*l))
            .collect();
        let lines = match rolls.pick(&fresh) {
            Some(line) => vec![(*line).to_string()],
            None => self.topic_exhausted.iter().map(|l| (*l).to_string()).collect(),
        };
        Reply::Answer {
            topic: topic.name,
            lines,
        }
    }
}

/// `used` extended with every line of `reply`.
pub(crate) fn remember(used: &BTreeSet<String>, reply: &Reply) -> BTreeSet<String> {
    let mut next = used.clone();
    next.extend(reply.lines().iter().cloned());
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[Topic] = &[
        Topic {
            name: "code",
            keywords: &["password", "key"],
            exact: &[],
            responses: &["one", "two"],
        },
        Topic {
            name: "greeting",
            keywords: &["hello"],
            exact: &["ok"],
            responses: &["hi there"],
        },
    ];

    const RESPONDER: Responder = Responder {
        topics: TABLE,
        signal_lost: &["static"],
        severed: "severed",
        topic_exhausted: &["nothing new"],
    };

    #[test]
    fn first_match_wins() {
        assert_eq!(RESPONDER.topic_for("HELLO, what is the password").map(|t| t.name), Some("code"));
        assert_eq!(RESPONDER.topic_for("ok").map(|t| t.name), Some("greeting"));
        assert!(RESPONDER.topic_for("ok then").is_none());
    }

    #[test]
    fn short_keywords_match_whole_words() {
        assert!(RESPONDER.topic_for("the key").is_some());
        assert!(RESPONDER.topic_for("monkey business").is_none());
    }

    #[test]
    fn responses_never_repeat() {
        let mut rolls = Rolls::new(9);
        let first = RESPONDER.respond("password", &BTreeSet::new(), &mut rolls);
        let used = remember(&BTreeSet::new(), &first);
        let second = RESPONDER.respond("password", &used, &mut rolls);
        assert_ne!(first.lines(), second.lines());
        let used = remember(&used, &second);
        let third = RESPONDER.respond("password", &used, &mut rolls);
        assert_eq!(third.lines(), ["nothing new".to_string()]);
        assert!(third.is_answer());
    }

    #[test]
    fn unmatched_input_loses_signal_then_severs() {
        let mut rolls = Rolls::new(9);
        let lost = RESPONDER.respond("zzz", &BTreeSet::new(), &mut rolls);
        assert_eq!(lost, Reply::SignalLost(vec!["static".into()]));
        let used = remember(&BTreeSet::new(), &lost);
        let severed = RESPONDER.respond("zzz", &used, &mut rolls);
        assert_eq!(severed.lines(), ["severed".to_string()]);
    }
}
