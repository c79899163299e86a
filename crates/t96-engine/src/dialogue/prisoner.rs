//! Prisoner 45: a detainee on a secure relay who knows the override code.

use t96_core::GameState;

use super::{Reply, Responder, Topic, remember};
use crate::context::Ctx;
use crate::output::{CommandResult, OutputLine};

/// Questions before the relay is cut.
pub const MAX_QUESTIONS: u32 = 5;
const RULE: &str = "─────────────────────────────────────────";

const PASSWORD: &[&str] = &[
    "PRISONER_45> ...you want the override code? I can tell you.",
    "PRISONER_45> The code... it's a Portuguese word. COLHEITA.",
    "PRISONER_45> COLHEITA. It means harvest. That's the password.",
    "PRISONER_45> They whisper it sometimes. When they think I'm asleep. COLHEITA.",
    "PRISONER_45> ...COLHEITA. Harvest. Use it with: override protocol COLHEITA",
    "PRISONER_45> COLHEITA. Type: override protocol COLHEITA",
];

const VARGINHA: &[&str] = &[
    "PRISONER_45> Varginha... yes. I was there.",
    "PRISONER_45> I saw them take the bodies. Three of them.",
    "PRISONER_45> They told us it was a dwarf. It wasn't a dwarf.",
    "PRISONER_45> January 20th. I'll never forget that date.",
    "PRISONER_45> The locals saw it first. We came to clean up.",
    "PRISONER_45> We had orders. Contain. Deny. Disappear.",
    "PRISONER_45> The American team arrived within hours. How did they know?",
];

const ALIEN: &[&str] = &[
    "PRISONER_45> Don't call them that. They don't like that word.",
    "PRISONER_45> They're not visitors. They're... assessors.",
    "PRISONER_45> I looked into its eyes once. It looked back.",
    "PRISONER_45> Red eyes. But not angry. Curious.",
    "PRISONER_45> They communicated without speaking. I felt it in my head.",
    "PRISONER_45> They're not individuals. More like... fingers of one hand.",
    "PRISONER_45> When it died, I felt something leave. Not just life. Information.",
];

const WHO: &[&str] = &[
    "PRISONER_45> I was military. That's all I can say.",
    "PRISONER_45> My name doesn't matter anymore.",
    "PRISONER_45> Sergeant. Recovery Unit. Specialized in... clean-up.",
    "PRISONER_45> I saw something I shouldn't. Now I'm here.",
    "PRISONER_45> Number 45. That's what I am now.",
];

const ESCAPE: &[&str] = &[
    "PRISONER_45> There is no escape. Only waiting.",
    "PRISONER_45> They let me use this terminal sometimes.",
    "PRISONER_45> I think they want me to tell someone.",
    "PRISONER_45> Sometimes I wake up in different cells.",
    "PRISONER_45> I escaped once. Woke up back in my cell. No time had passed.",
];

const TRUTH: &[&str] = &[
    "PRISONER_45> The truth? We're being measured.",
    "PRISONER_45> 2026. Remember that year.",
    "PRISONER_45> They're not coming to destroy. They're coming to harvest.",
    "PRISONER_45> It's not invasion. It's... cultivation.",
    "PRISONER_45> The scouts were just the beginning.",
    "PRISONER_45> They don't want the planet. They want what's inside our heads.",
];

const HELP: &[&str] = &[
    "PRISONER_45> I can't help you. But you can help everyone.",
    "PRISONER_45> Find all the files. Tell the world.",
    "PRISONER_45> Before the window opens.",
    "PRISONER_45> Document everything. They can't erase all copies.",
    "PRISONER_45> The override code. That's the key.",
    "PRISONER_45> Don't trust the obvious files. Look deeper.",
];

const MILITARY: &[&str] = &[
    "PRISONER_45> The military knows more than they admit.",
    "PRISONER_45> The recovery teams are international. Secret treaties.",
    "PRISONER_45> We had weapons. None of them worked on the craft.",
    "PRISONER_45> I had clearance. It wasn't enough. There are levels beyond levels.",
];

const CRASH: &[&str] = &[
    "PRISONER_45> The crash wasn't an accident.",
    "PRISONER_45> They wanted to be found. That's what I believe now.",
    "PRISONER_45> The debris was scattered. We found pieces for weeks.",
    "PRISONER_45> Material like nothing on Earth. It remembered shapes.",
    "PRISONER_45> They sacrifice scouts like we sacrifice pawns.",
];

const DEATH: &[&str] = &[
    "PRISONER_45> Death? I used to fear death.",
    "PRISONER_45> The creatures didn't die. They... disconnected.",
    "PRISONER_45> Their bodies failed. But something transmitted first.",
    "PRISONER_45> Death would be mercy. They don't offer mercy.",
];

const GOD: &[&str] = &[
    "PRISONER_45> God? I used to pray.",
    "PRISONER_45> The universe is indifferent. The Watchers are not.",
    "PRISONER_45> Perhaps we're someone else's creation. A crop planted long ago.",
];

const DISINFORMATION: &[&str] = &[
    "PRISONER_45> Don't trust the official summary. It's bait.",
    "PRISONER_45> They planted false files to trap people like you.",
    "PRISONER_45> The weather balloon story? Mudinho the dwarf? All lies.",
    "PRISONER_45> Cross-reference everything. Contradictions reveal truth.",
];

const TOPICS: &[Topic] = &[
    Topic {
        name: "password",
        keywords: &[
            "password", "override", "code", "access", "admin", "unlock", "colheita", "harvest", "senha",
            "secret", "key", "protocol", "restricted", "classified", "credentials", "login", "decrypt",
            "how do i", "how can i", "tell me", "give me", "clearance", "permission", "denied",
        ],
        exact: &[],
        responses: PASSWORD,
    },
    Topic {
        name: "varginha",
        keywords: &[
            "varginha", "incident", "1996", "january", "brazil", "brasil", "minas", "happened", "event", "case",
        ],
        exact: &[],
        responses: VARGINHA,
    },
    Topic {
        name: "alien",
        keywords: &[
            "alien", "creature", "being", "et", "ets", "extraterrestrial", "specimen", "body", "bodies", "grey",
            "gray", "humanoid", "entity", "entities", "them", "they", "visitors",
        ],
        exact: &[],
        responses: ALIEN,
    },
    Topic {
        name: "who",
        keywords: &["who are you", "your name", "yourself", "prisoner", "identity", "name", "45", "are you"],
        exact: &[],
        responses: WHO,
    },
    Topic {
        name: "escape",
        keywords: &["escape", "leave", "free", "out of here", "prison", "cell", "trapped", "jail", "captive", "held"],
        exact: &[],
        responses: ESCAPE,
    },
    Topic {
        name: "truth",
        keywords: &["truth", "real", "happening", "cover", "conspiracy", "really", "going on", "what is"],
        exact: &[],
        responses: TRUTH,
    },
    Topic {
        name: "help",
        keywords: &["help", "can i", "should i", "what do i", "advice", "ajuda", "next", "now what", "what now"],
        exact: &[],
        responses: HELP,
    },
    Topic {
        name: "future",
        keywords: &["2026", "window", "future", "coming", "will happen", "soon", "prophecy"],
        exact: &[],
        responses: TRUTH,
    },
    Topic {
        name: "military",
        keywords: &[
            "military", "army", "soldier", "government", "base", "force", "navy", "pentagon", "cia", "fbi",
            "nsa", "abin", "agency", "intelligence", "official", "authorities",
        ],
        exact: &[],
        responses: MILITARY,
    },
    Topic {
        name: "crash",
        keywords: &["crash", "ship", "ufo", "craft", "debris", "wreckage", "material", "saucer", "landed", "found"],
        exact: &[],
        responses: CRASH,
    },
    Topic {
        name: "death",
        keywords: &["death", "die", "kill", "dead", "alive", "survive", "killed", "life"],
        exact: &[],
        responses: DEATH,
    },
    Topic {
        name: "god",
        keywords: &["god", "religion", "pray", "faith", "believe", "angel", "demon", "soul", "church", "heaven", "hell"],
        exact: &[],
        responses: GOD,
    },
    Topic {
        name: "disinformation",
        keywords: &[
            "lie", "fake", "disinformation", "cover up", "balloon", "mudinho", "dwarf", "false", "hoax", "propaganda",
        ],
        exact: &[],
        responses: DISINFORMATION,
    },
    Topic {
        name: "why",
        keywords: &["why", "reason", "purpose", "meaning"],
        exact: &[],
        responses: TRUTH,
    },
    Topic {
        name: "where",
        keywords: &["where", "place", "location", "here"],
        exact: &[],
        responses: ESCAPE,
    },
    Topic {
        name: "when",
        keywords: &["when", "time", "how long", "date"],
        exact: &[],
        responses: TRUTH,
    },
    Topic {
        name: "greeting",
        keywords: &["hello", "hi", "hey", "oi", "ola", "greetings", "yo", "good", "thanks", "thank you", "obrigado"],
        exact: &["ok", "yes", "no", "sim", "nao"],
        responses: HELP,
    },
];

/// Prisoner 45's responder table.
pub const RESPONDER: Responder = Responder {
    topics: TOPICS,
    signal_lost: &[
        "PRISONER_45> [SIGNAL DEGRADING]",
        "PRISONER_45> ...can't... understand...",
        "PRISONER_45> [CONNECTION UNSTABLE]",
        "PRISONER_45> ...what? ...repeat...",
        "PRISONER_45> [INTERFERENCE DETECTED]",
        "PRISONER_45> ...losing you...",
    ],
    severed: "PRISONER_45> [CONNECTION TERMINATED]",
    topic_exhausted: &[
        "PRISONER_45> ...I've already told you everything about that...",
        "PRISONER_45> [SIGNAL FADING]",
    ],
};

/// `chat [question]`.
pub fn chat(args: &[String], state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    if state.prisoner45_disconnected {
        let mut result = CommandResult::with_output(vec![
            OutputLine::system("Connecting to secure relay..."),
            OutputLine::blank(),
            OutputLine::error("CONNECTION TERMINATED"),
            OutputLine::error("RELAY NODE OFFLINE"),
        ]);
        result.delay_ms = Some(1500);
        return result;
    }
    if state.prisoner45_questions_asked >= MAX_QUESTIONS {
        let mut result = CommandResult::with_output(vec![
            OutputLine::system("Connecting to secure relay..."),
            OutputLine::blank(),
            OutputLine::warning(RULE),
            OutputLine::warning("PRISONER_45> They're cutting the line."),
            OutputLine::warning("PRISONER_45> Remember what I told you."),
            OutputLine::warning("PRISONER_45> 2026. Don't forget."),
            OutputLine::warning(RULE),
            OutputLine::blank(),
            OutputLine::error("CONNECTION TERMINATED BY REMOTE"),
        ]);
        result.patch.prisoner45_disconnected = Some(true);
        result.patch.detection_level = Some(state.detection_plus(5));
        result.trigger_flicker = true;
        result.delay_ms = Some(2000);
        tracing::info!("prisoner45_disconnected");
        return result;
    }
    if args.is_empty() {
        let remaining = MAX_QUESTIONS - state.prisoner45_questions_asked;
        let mut result = CommandResult::with_output(vec![
            OutputLine::system("Connecting to secure relay..."),
            OutputLine::blank(),
            OutputLine::warning(RULE),
            OutputLine::warning("ENCRYPTED RELAY ESTABLISHED"),
            OutputLine::warning(RULE),
            OutputLine::blank(),
            OutputLine::system("PRISONER_45 connected"),
            OutputLine::system(format!("[{remaining} questions remaining before trace lockout]")),
            OutputLine::blank(),
            OutputLine::output("PRISONER_45> ...you found this channel."),
            OutputLine::output("PRISONER_45> I don't know how long we have."),
            OutputLine::blank(),
            OutputLine::system("Use: chat <your question>"),
        ]);
        result.patch.detection_level = Some(state.detection_plus(3));
        result.delay_ms = Some(1500);
        return result;
    }

    let question = args.join(" ");
    let reply = RESPONDER.respond(&question, &state.prisoner45_used_responses, &mut ctx.rolls);
    let asked = state.prisoner45_questions_asked + 1;
    let remaining = MAX_QUESTIONS - asked;
    tracing::debug!(?reply, asked, "prisoner45_reply");

    let mut output = vec![OutputLine::input(format!("> {question}")), OutputLine::blank()];
    let answered = reply.is_answer();
    output.extend(reply.lines().iter().map(|l| {
        if answered {
            OutputLine::output(l.clone())
        } else {
            OutputLine::warning(l.clone())
        }
    }));
    output.push(OutputLine::blank());
    output.push(if remaining > 0 {
        OutputLine::system(format!("[{remaining} questions remaining]"))
    } else {
        OutputLine::warning("[CONNECTION UNSTABLE]")
    });

    let mut result = CommandResult::with_output(output);
    result.patch.prisoner45_questions_asked = Some(asked);
    result.patch.prisoner45_used_responses = Some(remember(&state.prisoner45_used_responses, &reply));
    if let Reply::Answer { .. } = reply {
        result.patch.detection_level = Some(state.detection_plus(2));
        result.delay_ms = Some(1000);
    } else {
        result.patch.detection_level = Some(state.detection_plus(1));
        result.trigger_flicker = true;
        result.delay_ms = Some(800);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{args, playing, run};

    #[test]
    fn password_questions_take_priority() {
        assert_eq!(RESPONDER.topic_for("who knows the password?").map(|t| t.name), Some("password"));
        assert_eq!(RESPONDER.topic_for("what happened in varginha").map(|t| t.name), Some("varginha"));
        assert_eq!(RESPONDER.topic_for("ok").map(|t| t.name), Some("greeting"));
        assert!(RESPONDER.topic_for("purple").is_none());
    }

    #[test]
    fn prompt_costs_three() {
        let result = run(&playing(), |s, c| chat(&[], s, c));
        assert!(result.mentions("[5 questions remaining before trace lockout]"));
        assert_eq!(result.patch.detection_level, Some(3));
    }

    #[test]
    fn answer_consumes_a_question() {
        let state = playing();
        let result = run(&state, |s, c| chat(&args(&["the", "password"]), s, c));
        assert!(result.mentions("PRISONER_45>"));
        assert_eq!(result.patch.prisoner45_questions_asked, Some(1));
        assert_eq!(result.patch.detection_level, Some(2));
        let used = result.patch.prisoner45_used_responses.unwrap_or_default();
        assert_eq!(used.len(), 1);
        assert!(used.iter().all(|l| PASSWORD.contains(&l.as_str())));
    }

    #[test]
    fn signal_lost_still_costs() {
        let result = run(&playing(), |s, c| chat(&args(&["purple"]), s, c));
        assert_eq!(result.patch.prisoner45_questions_asked, Some(1));
        assert_eq!(result.patch.detection_level, Some(1));
        assert!(result.trigger_flicker);
    }

    #[test]
    fn sixth_chat_disconnects() {
        let mut state = playing();
        state.prisoner45_questions_asked = MAX_QUESTIONS;
        let result = run(&state, |s, c| chat(&args(&["hello"]), s, c));
        assert!(result.mentions("CONNECTION TERMINATED BY REMOTE"));
        let next = result.patch.apply_to(&state);
        assert!(next.prisoner45_disconnected);
        let again = run(&next, |s, c| chat(&[], s, c));
        assert!(again.mentions("RELAY NODE OFFLINE"));
        assert!(again.patch.is_empty());
    }
}
