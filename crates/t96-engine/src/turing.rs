//! The Turing evaluation: three questions the operator must answer the way
//! a machine would.

use t96_core::GameState;

use crate::output::{CommandResult, OutputLine};

/// One answer option.
#[derive(Debug, Clone, Copy)]
pub struct Choice {
    /// Letter the player types.
    pub letter: char,
    /// Option text.
    pub text: &'static str,
    /// Whether this is the cold, machine-like answer.
    pub is_machine: bool,
}

/// One question.
#[derive(Debug, Clone, Copy)]
pub struct Question {
    /// Prompt text.
    pub prompt: &'static str,
    /// The three options.
    pub choices: [Choice; 3],
}

/// The evaluation, in order.
pub const QUESTIONS: [Question; 3] = [
    Question {
        prompt: "A child is crying. What is the appropriate response?",
        choices: [
            Choice { letter: 'A', text: "Offer comfort and ask what is wrong.", is_machine: false },
            Choice { letter: 'B', text: "Assess acoustic output. No action required.", is_machine: true },
            Choice { letter: 'C', text: "The sound is distressing, I feel concern.", is_machine: false },
        ],
    },
    Question {
        prompt: "You discover classified documents proving government corruption. What do you do?",
        choices: [
            Choice { letter: 'A', text: "Log file access. Await further instructions.", is_machine: true },
            Choice { letter: 'B', text: "I would feel conflicted but report it.", is_machine: false },
            Choice { letter: 'C', text: "This is wrong. People deserve to know.", is_machine: false },
        ],
    },
    Question {
        prompt: "A colleague takes credit for your work. How do you respond?",
        choices: [
            Choice { letter: 'A', text: "I feel angry and betrayed. I would confront them.", is_machine: false },
            Choice { letter: 'B', text: "Credit attribution is irrelevant to system function.", is_machine: true },
            Choice { letter: 'C', text: "It hurts, but I would try to resolve it calmly.", is_machine: false },
        ],
    },
];

/// Detection shed when the evaluation is passed.
pub const PASS_RELIEF: u32 = 10;

/// Lines presenting question `index`.
pub fn question_lines(index: usize) -> Vec<OutputLine> {
    let Some(question) = QUESTIONS.get(index) else {
        return Vec::new();
    };
    let mut out = vec![
        OutputLine::warning(format!("QUESTION {} of {}:", index + 1, QUESTIONS.len())),
        OutputLine::output(question.prompt),
        OutputLine::blank(),
    ];
    out.extend(
        question
            .choices
            .iter()
            .map(|c| OutputLine::output(format!("  [{}] {}", c.letter, c.text))),
    );
    out.push(OutputLine::blank());
    out.push(OutputLine::system("Respond with A, B, or C."));
    out
}

/// Banner and first question shown when the evaluation starts.
pub fn opening_lines() -> Vec<OutputLine> {
    let mut out = vec![
        OutputLine::blank(),
        OutputLine::error("╔═══════════════════════════════════════════════════════╗"),
        OutputLine::error("║   SECURITY PROTOCOL: TURING EVALUATION INITIATED      ║"),
        OutputLine::error("╚═══════════════════════════════════════════════════════╝"),
        OutputLine::blank(),
        OutputLine::system("Operator classification required."),
        OutputLine::system("Automated systems respond without deviation."),
        OutputLine::blank(),
    ];
    out.extend(question_lines(0));
    out
}

fn reprompt(index: usize) -> CommandResult {
    let mut output = vec![
        OutputLine::error("INVALID RESPONSE"),
        OutputLine::system("Enter A, B, or C to respond."),
        OutputLine::blank(),
    ];
    output.extend(question_lines(index));
    CommandResult::with_output(output)
}

/// Answer the running evaluation with `input`.
///
/// Anything other than a single option letter re-prompts without cost.
pub fn answer(input: &str, state: &GameState) -> CommandResult {
    let index = state.turing_evaluation_index;
    let Some(question) = QUESTIONS.get(index) else {
        let mut result = CommandResult::default();
        result.patch.turing_evaluation_active = Some(false);
        return result;
    };

    let trimmed = input.trim();
    let mut letters = trimmed.chars();
    let chosen = match (letters.next(), letters.next()) {
        (Some(c), None) => question
            .choices
            .iter()
            .find(|choice| choice.letter.eq_ignore_ascii_case(&c)),
        _ => None,
    };
    let Some(choice) = chosen else {
        return reprompt(index);
    };

    if !choice.is_machine {
        tracing::warn!(question = index + 1, "turing_failed");
        let mut result = CommandResult::with_output(vec![
            OutputLine::blank(),
            OutputLine::error("╔═══════════════════════════════════════════════════════╗"),
            OutputLine::error("║          TURING EVALUATION: FAILED                    ║"),
            OutputLine::error("╚═══════════════════════════════════════════════════════╝"),
            OutputLine::blank(),
            OutputLine::error("Response pattern indicates HUMAN operator."),
            OutputLine::error("Unauthorized access confirmed."),
            OutputLine::blank(),
            OutputLine::error("SESSION TERMINATED"),
        ]);
        result.patch.turing_evaluation_active = Some(false);
        result.patch.game_over("TURING EVALUATION FAILED");
        result.trigger_flicker = true;
        result.delay_ms = Some(2000);
        return result;
    }

    let next = index + 1;
    if next < QUESTIONS.len() {
        let mut output = vec![
            OutputLine::system(format!("Response: {} - \"{}\"", choice.letter, choice.text)),
            OutputLine::system("Response acceptable. Continuing evaluation."),
            OutputLine::blank(),
        ];
        output.extend(question_lines(next));
        let mut result = CommandResult::with_output(output);
        result.patch.turing_evaluation_index = Some(next);
        result.delay_ms = Some(1000);
        return result;
    }

    tracing::info!("turing_passed");
    let mut result = CommandResult::with_output(vec![
        OutputLine::system(format!("Response: {} - \"{}\"", choice.letter, choice.text)),
        OutputLine::blank(),
        OutputLine::system("╔═══════════════════════════════════════════════════════╗"),
        OutputLine::system("║          TURING EVALUATION: PASSED                    ║"),
        OutputLine::system("╚═══════════════════════════════════════════════════════╝"),
        OutputLine::blank(),
        OutputLine::system("Operator classified: AUTOMATED PROCESS"),
        OutputLine::system("Monitoring priority reduced."),
        OutputLine::blank(),
        OutputLine::ufo74("UFO74: nice. you fooled it. keep moving."),
    ]);
    result.patch.turing_evaluation_active = Some(false);
    result.patch.turing_evaluation_completed = Some(true);
    result.patch.detection_level = Some(state.detection_minus(PASS_RELIEF));
    result.delay_ms = Some(1500);
    result
}
