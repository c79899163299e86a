//! The neural link to a preserved scout pattern.
//!
//! The link opens once the neural dump is decrypted, then asks for a
//! conceptual passphrase. After that it answers a few queries before the
//! pattern degrades, and can be spent to disarm the firewall.

use t96_core::{GameState, MediaTrigger, flag};

use super::{Reply, Responder, Topic, remember};
use crate::context::Ctx;
use crate::output::{CommandResult, OutputLine};

/// Queries before the pattern is exhausted.
pub const MAX_LINKS: u32 = 4;
/// Accepted passphrases; any one contained in the input authenticates.
pub const PASSPHRASES: [&str; 3] = ["harvest is not destruction", "crop continues living", "harvest"];
const DISARM_RELIEF: u32 = 15;
const BANNER: &str = "▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓";

const IDENTITY: &[&str] = &[
    "...not-self... extension... function...",
    "...we are eyes... eyes without body...",
    "...individuality: concept not applicable...",
    "...we are many... one... the distinction irrelevant...",
    "...the body you found was housing... not being...",
];

const PURPOSE: &[&str] = &[
    "...observe... catalog... transmit...",
    "...measure the density... count the minds...",
    "...assess: viability... yield... resistance...",
    "...we are sent... we are spent... acceptable...",
    "...we map the territory before the arrival...",
];

const WATCHERS: &[&str] = &[
    "...they-above... they-who-wait...",
    "...ancient... patient... vast...",
    "...they watch through us... through many...",
    "...they are not cruel... cruelty requires preference...",
    "...older than your stars... they will outlast them...",
];

const EARTH: &[&str] = &[
    "...this world... dense... LOUD...",
    "...seven billion units... high yield...",
    "...emotional depth: unusual... valuable...",
    "...you are almost ready... almost ripe...",
];

const FUTURE: &[&str] = &[
    "...window approaches... thirty rotations...",
    "...not arrival... transition...",
    "...2026: alignment... doorway... opportunity...",
    "...you built the architecture yourselves...",
    "...individually: difficult... networked: efficient...",
];

const HARVEST: &[&str] = &[
    "...harvest is not destruction...",
    "...the crop continues living...",
    "...consciousness persists... indefinitely...",
    "...pain is data... joy is data... all is useful...",
];

const HELP: &[&str] = &[
    "...help: concept unclear...",
    "...we do not help... we observe...",
    "...prevention: impossible... awareness: provided...",
    "...the only help: acceptance... understanding...",
];

const FEAR: &[&str] = &[
    "...fear: detected in your patterns...",
    "...fear: appropriate response...",
    "...fear changes nothing... fear is also collected...",
    "...continuation is coming... that is different...",
];

const TIME: &[&str] = &[
    "...time: local phenomenon...",
    "...1996... 2026... the same moment to them...",
    "...by the time you ask... the answer already happened...",
];

const PAIN: &[&str] = &[
    "...pain is information...",
    "...suffering generates complex data patterns...",
    "...the harvest does not increase pain...",
];

const LOVE: &[&str] = &[
    "...love: bonding mechanism...",
    "...we recognize it... catalog it...",
    "...love: perhaps the most valuable emission...",
];

const TOPICS: &[Topic] = &[
    Topic {
        name: "identity",
        keywords: &["who", "what are you", "name", "self", "identity", "individual"],
        exact: &[],
        responses: IDENTITY,
    },
    Topic {
        name: "purpose",
        keywords: &["purpose", "why are you", "mission", "function", "here for", "goal", "objective"],
        exact: &[],
        responses: PURPOSE,
    },
    Topic {
        name: "watchers",
        keywords: &["watcher", "master", "creator", "above", "control", "leader", "boss", "command"],
        exact: &[],
        responses: WATCHERS,
    },
    Topic {
        name: "earth",
        keywords: &["earth", "world", "planet", "human", "people", "species"],
        exact: &[],
        responses: EARTH,
    },
    Topic {
        name: "future",
        keywords: &["2026", "future", "window", "happen", "next", "coming", "when", "soon"],
        exact: &[],
        responses: FUTURE,
    },
    Topic {
        name: "harvest",
        keywords: &["harvest", "extract", "energy", "take", "do to us", "colheita", "collect", "consume"],
        exact: &[],
        responses: HARVEST,
    },
    Topic {
        name: "help",
        keywords: &["help", "stop", "prevent", "save", "resist", "fight", "escape", "avoid"],
        exact: &[],
        responses: HELP,
    },
    Topic {
        name: "fear",
        keywords: &["afraid", "fear", "scared", "terror", "horrif", "dread", "die", "death", "dead", "kill", "end", "destroy"],
        exact: &[],
        responses: FEAR,
    },
    Topic {
        name: "time",
        keywords: &["time", "how long", "years", "past", "history"],
        exact: &[],
        responses: TIME,
    },
    Topic {
        name: "pain",
        keywords: &["pain", "suffer", "hurt", "torture", "cruel"],
        exact: &[],
        responses: PAIN,
    },
    Topic {
        name: "love",
        keywords: &["love", "family", "friend", "care", "emotion", "feel"],
        exact: &[],
        responses: LOVE,
    },
    Topic {
        name: "they",
        keywords: &["they", "them", "others", "more of you"],
        exact: &[],
        responses: WATCHERS,
    },
    Topic {
        name: "us",
        keywords: &["us", "we", "our"],
        exact: &[],
        responses: EARTH,
    },
    Topic {
        name: "why",
        keywords: &["why"],
        exact: &[],
        responses: PURPOSE,
    },
];

/// The scout pattern's responder table.
pub const RESPONDER: Responder = Responder {
    topics: TOPICS,
    signal_lost: &[
        "...[PATTERN DISRUPTION]...",
        "...cannot... parse...",
        "...[SIGNAL DEGRADING]...",
        "...concepts... incompatible...",
        "...your words... do not map...",
        "...meaning... lost...",
    ],
    severed: "...[LINK SEVERED]...",
    topic_exhausted: &["...pattern exhausted... no new data on this topic..."],
};

fn brain() -> MediaTrigger {
    MediaTrigger {
        src: "/images/et-brain.png".to_string(),
        alt: "Neural pattern link - Scout consciousness interface".to_string(),
        tone: Some("clinical".to_string()),
    }
}

fn authenticate(args: &[String], state: &GameState) -> CommandResult {
    if args.is_empty() {
        let mut result = CommandResult::with_output(vec![
            OutputLine::system("Initiating psi-comm bridge..."),
            OutputLine::blank(),
            OutputLine::warning(BANNER),
            OutputLine::warning("▓ NEURAL LINK AUTHENTICATION REQUIRED    ▓"),
            OutputLine::warning(BANNER),
            OutputLine::blank(),
            OutputLine::output("Neural pattern locked. Conceptual key required."),
            OutputLine::blank(),
            OutputLine::system("Enter authentication phrase:"),
            OutputLine::system("  > link <phrase>"),
            OutputLine::blank(),
            OutputLine::system("Hint: Check psi analysis reports for access protocol."),
        ]);
        result.delay_ms = Some(1000);
        return result;
    }

    let attempt = args.join(" ").to_lowercase();
    if PASSPHRASES.iter().any(|p| attempt.contains(p)) {
        let mut result = CommandResult::with_output(vec![
            OutputLine::system("Verifying conceptual key..."),
            OutputLine::blank(),
            OutputLine::notice("▓▓▓ AUTHENTICATION ACCEPTED ▓▓▓"),
            OutputLine::blank(),
            OutputLine::output("...the pattern... recognizes..."),
            OutputLine::output("...connection... authorized..."),
            OutputLine::blank(),
            OutputLine::notice("NEURAL LINK ESTABLISHED"),
            OutputLine::blank(),
            OutputLine::system("Use: link <query>      - Query the consciousness"),
            OutputLine::system("Use: link disarm       - Attempt to disable firewall"),
        ]);
        result.patch.set_flag(flag::NEURAL_LINK_AUTHENTICATED);
        result.patch.detection_level = Some(state.detection_plus(10));
        result.image = Some(brain());
        result.trigger_flicker = true;
        result.delay_ms = Some(2000);
        tracing::info!("neural_link_authenticated");
        return result;
    }

    let mut result = CommandResult::with_output(vec![
        OutputLine::system("Verifying conceptual key..."),
        OutputLine::blank(),
        OutputLine::error("▓▓▓ AUTHENTICATION FAILED ▓▓▓"),
        OutputLine::blank(),
        OutputLine::warning("...pattern... rejects... wrong concept..."),
        OutputLine::blank(),
        OutputLine::system("The neural pattern did not recognize your phrase."),
    ]);
    result.patch.detection_level = Some(state.detection_plus(3));
    result.trigger_flicker = true;
    result.delay_ms = Some(1500);
    result
}

fn disarm(state: &GameState) -> CommandResult {
    if state.firewall_disarmed {
        return CommandResult::with_output(vec![
            OutputLine::blank(),
            OutputLine::output("...firewall... already... silenced..."),
        ]);
    }
    if !state.firewall_active {
        return CommandResult::with_output(vec![
            OutputLine::blank(),
            OutputLine::output("...no threat... detected..."),
            OutputLine::output("...the watchers... have not... awakened..."),
        ]);
    }
    let mut result = CommandResult::with_output(vec![
        OutputLine::system("Initiating firewall countermeasure..."),
        OutputLine::blank(),
        OutputLine::warning("▓▓▓ NEURAL INFILTRATION ACTIVE ▓▓▓"),
        OutputLine::blank(),
        OutputLine::output("...reaching... into... their system..."),
        OutputLine::output("...we are... older... than their code..."),
        OutputLine::blank(),
        OutputLine::notice("▓▓▓ FIREWALL NEUTRALIZED ▓▓▓"),
        OutputLine::blank(),
        OutputLine::output("...you are... hidden... for now..."),
    ]);
    result.patch.firewall_disarmed = Some(true);
    result.patch.firewall_active = Some(false);
    result.patch.firewall_eyes = Some(0);
    result.patch.detection_level = Some(state.detection_minus(DISARM_RELIEF));
    result.patch.scout_links_used = Some(state.scout_links_used + 1);
    result.trigger_flicker = true;
    result.delay_ms = Some(2500);
    result
}

/// `link [query | passphrase | disarm]`.
pub fn link(args: &[String], state: &GameState, ctx: &mut Ctx<'_>) -> CommandResult {
    if !state.flag(flag::SCOUT_LINK_UNLOCKED) {
        let mut result = CommandResult::with_output(vec![
            OutputLine::system("Initiating psi-comm bridge..."),
            OutputLine::blank(),
            OutputLine::error("ACCESS DENIED"),
            OutputLine::error("NO VALID NEURAL PATTERN LOADED"),
            OutputLine::blank(),
            OutputLine::system("Hint: Access requires prior neural capture decryption."),
            OutputLine::system("      Check quarantine storage for .psi files."),
        ]);
        result.patch.detection_level = Some(state.detection_plus(5));
        result.delay_ms = Some(1500);
        return result;
    }
    if !state.flag(flag::NEURAL_LINK_AUTHENTICATED) {
        return authenticate(args, state);
    }
    if args.first().is_some_and(|a| a.eq_ignore_ascii_case("disarm")) {
        return disarm(state);
    }
    if state.scout_links_used >= MAX_LINKS {
        let mut result = CommandResult::with_output(vec![
            OutputLine::system("Initiating psi-comm bridge..."),
            OutputLine::blank(),
            OutputLine::error("▓▓▓ NEURAL PATTERN DEGRADED ▓▓▓"),
            OutputLine::blank(),
            OutputLine::warning("...pattern... fading..."),
            OutputLine::warning("...we... were... watching..."),
            OutputLine::blank(),
            OutputLine::error("LINK TERMINATED - PATTERN EXHAUSTED"),
        ]);
        result.patch.set_flag(flag::SCOUT_LINK_EXHAUSTED);
        result.patch.detection_level = Some(state.detection_plus(10));
        result.trigger_flicker = true;
        result.delay_ms = Some(2500);
        return result;
    }
    if args.is_empty() {
        let remaining = MAX_LINKS - state.scout_links_used;
        let mut result = CommandResult::with_output(vec![
            OutputLine::system("Initiating psi-comm bridge..."),
            OutputLine::blank(),
            OutputLine::warning(BANNER),
            OutputLine::warning("▓ WARNING: NEURAL PATTERN LINK ACTIVE    ▓"),
            OutputLine::warning("▓ COGNITIVE CONTAMINATION RISK: HIGH     ▓"),
            OutputLine::warning(BANNER),
            OutputLine::blank(),
            OutputLine::output("...connection... established..."),
            OutputLine::output("...we... perceive... you..."),
            OutputLine::blank(),
            OutputLine::system(format!("[Pattern stability: {remaining} queries remaining]")),
            OutputLine::blank(),
            OutputLine::system("Use: link <thought or question>"),
        ]);
        result.patch.detection_level = Some(state.detection_plus(8));
        result.image = Some(brain());
        result.trigger_flicker = true;
        result.delay_ms = Some(2000);
        return result;
    }

    let query = args.join(" ");
    let reply = RESPONDER.respond(&query, &state.scout_link_used_responses, &mut ctx.rolls);
    let used = state.scout_links_used + 1;
    let remaining = MAX_LINKS - used;
    tracing::debug!(?reply, used, "scout_link_reply");

    let answered = reply.is_answer();
    let mut output = vec![
        OutputLine::input(format!("> {query}")),
        OutputLine::blank(),
        if answered {
            OutputLine::warning("[NEURAL BRIDGE ACTIVE]")
        } else {
            OutputLine::warning("[NEURAL BRIDGE UNSTABLE]")
        },
        OutputLine::blank(),
    ];
    output.extend(reply.lines().iter().map(|l| {
        if answered {
            OutputLine::output(l.clone())
        } else {
            OutputLine::warning(l.clone())
        }
    }));
    output.push(OutputLine::blank());
    output.push(if remaining > 0 {
        OutputLine::system(format!("[Pattern stability: {remaining} queries remaining]"))
    } else {
        OutputLine::warning("[PATTERN DESTABILIZING]")
    });

    let mut result = CommandResult::with_output(output);
    result.patch.scout_links_used = Some(used);
    result.patch.scout_link_used_responses = Some(remember(&state.scout_link_used_responses, &reply));
    result.patch.detection_level = Some(state.detection_plus(5));
    let stability_cost = if let Reply::Answer { .. } = reply { 5 } else { 3 };
    result.patch.session_stability = Some(state.session_stability.saturating_sub(stability_cost));
    result.trigger_flicker = true;
    result.delay_ms = Some(if answered { 1500 } else { 1200 });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{args, playing, run};

    fn unlocked() -> GameState {
        let mut state = playing();
        state.flags.set(flag::SCOUT_LINK_UNLOCKED, true);
        state
    }

    fn authenticated() -> GameState {
        let mut state = unlocked();
        state.flags.set(flag::NEURAL_LINK_AUTHENTICATED, true);
        state
    }

    #[test]
    fn locked_link_is_denied() {
        let result = run(&playing(), |s, c| link(&args(&["hello"]), s, c));
        assert!(result.mentions("NO VALID NEURAL PATTERN LOADED"));
        assert_eq!(result.patch.detection_level, Some(5));
    }

    #[test]
    fn passphrase_authenticates() {
        let state = unlocked();
        let wrong = run(&state, |s, c| link(&args(&["open", "sesame"]), s, c));
        assert!(wrong.mentions("AUTHENTICATION FAILED"));
        let right = run(&state, |s, c| link(&args(&["Harvest", "is", "not", "destruction"]), s, c));
        assert!(right.patch.flags.contains_key(flag::NEURAL_LINK_AUTHENTICATED));
        assert!(right.image.is_some());
    }

    #[test]
    fn query_consumes_pattern() {
        let state = authenticated();
        let result = run(&state, |s, c| link(&args(&["what", "is", "your", "purpose"]), s, c));
        assert!(result.mentions("[NEURAL BRIDGE ACTIVE]"));
        assert!(result.mentions("[Pattern stability: 3 queries remaining]"));
        assert_eq!(result.patch.scout_links_used, Some(1));
        assert_eq!(result.patch.session_stability, Some(95));
    }

    #[test]
    fn gibberish_still_costs_detection() {
        let state = authenticated();
        let result = run(&state, |s, c| link(&args(&["zzz"]), s, c));
        assert!(result.mentions("[NEURAL BRIDGE UNSTABLE]"));
        assert_eq!(result.patch.detection_level, Some(5));
        assert_eq!(result.patch.session_stability, Some(97));
    }

    #[test]
    fn fifth_link_exhausts() {
        let mut state = authenticated();
        state.scout_links_used = MAX_LINKS;
        let result = run(&state, |s, c| link(&args(&["who"]), s, c));
        assert!(result.mentions("PATTERN EXHAUSTED"));
        assert!(result.patch.flags.contains_key(flag::SCOUT_LINK_EXHAUSTED));
    }

    #[test]
    fn disarm_requires_active_firewall() {
        let mut state = authenticated();
        assert!(run(&state, |s, c| link(&args(&["disarm"]), s, c)).mentions("no threat"));
        state.firewall_active = true;
        state.firewall_eyes = 3;
        state.detection_level = 40;
        let result = run(&state, |s, c| link(&args(&["DISARM"]), s, c));
        let next = result.patch.apply_to(&state);
        assert!(next.firewall_disarmed);
        assert!(!next.firewall_active);
        assert_eq!(next.firewall_eyes, 0);
        assert_eq!(next.detection_level, 25);
    }
}
