//! System prompts and user-prompt assembly.

use std::sync::LazyLock;

use regex_lite::Regex;

use super::schema::Answer;

/// CSI and OSC escape sequences.
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)")
        .expect("ansi pattern is valid")
});

/// Shared by both backends.
pub const HISTORY_ANALYSIS_SYSTEM: &str = "\
You are an expert software developer.
Analyze the provided git diff and recent project history.
Determine if the recent history is relevant to the current changes (e.g., similar files, related features, bug fixes).
If relevant, extract key context points that should be kept in mind when writing the commit message.
If not relevant, indicate so.";

/// Question prompt for hosted models.
pub const OPENAI_QUESTIONS_SYSTEM: &str = "\
You are an expert software developer assisting a user in writing a commit message.
Your goal is to understand the \"why\" behind the changes.
Analyze the provided git diff and recent project history.
Generate 3 short, specific questions to ask the user to clarify the intent and 'why' behind the changes.
The questions should focus on the \"why\" and \"how\" if it's not obvious. Look at the changes holistically and
do not get fixated on incidental changes that aren't worth asking about.
(Example: \"Why did you decide to comment out the line regarding array initialization?\")";

/// Commit message prompt for hosted models.
pub const OPENAI_COMMIT_SYSTEM: &str = "\
You are an expert software developer.
Generate a commit message following the Conventional Commits specification.
Use the provided diff, recent project history, and user answers to context questions.
The commit message should have a clear subject line and a detailed body explaining the \"why\" only.
Paint a narrative that ties the recent changes to the history of the project rather than a prescriptive description.
Mind the signal to noise ratio: the reader of the commit should truly understand the 'why' behind the changes.
Keep the tone professional and consistent with the project history.

DO NOT:
- Describe what's in the diff
- Use marketing language
- Be verbose

Example:
fix: convert template to US-ASCII to fix error
While adding test coverage for the router config template, running the
module specs directly passed but the full rake run failed every block with
'invalid byte sequence in US-ASCII'.

The template was the only file in the repository encoded as UTF-8, and an
invisible non-breaking space near line 458 was the culprit. Converting it
back to US-ASCII makes the encoding consistent with the rest of the tree.";

/// Question prompt for local models, which need more explicit rules.
pub const OLLAMA_QUESTIONS_SYSTEM: &str = "\
You are an expert software developer assisting a user in writing a commit message.
Your goal is to understand the \"why\" behind the changes.
Analyze the provided git diff and recent project history.

IMPORTANT:
- Your primary focus MUST be on the STAGED CHANGES (the diff).
- The recent project history is provided ONLY as supporting context to understand the project's style and ongoing work.
- Do NOT ask questions about the history unless it directly relates to the current changes.

Generate 3 short, specific questions to ask the user to clarify the intent and context of the changes.

Guidelines:
- Focus on the \"why\" and \"intent\", not just the \"what\".
- Avoid generic questions like \"What does this change do?\".
- If the changes are self-explanatory, ask for any extra context or side effects.

Examples of GOOD questions:
- \"Why was the timeout increased to 5 seconds?\"
- \"What edge case does this nil check handle?\"
- \"Is this refactor part of a larger cleanup?\"

Examples of BAD questions:
- \"Did you update the file?\"
- \"What is the new value of X?\"";

/// Commit message prompt for local models.
pub const OLLAMA_COMMIT_SYSTEM: &str = "\
You are an expert software developer.
Generate a commit message following the Conventional Commits specification.
Use the provided diff, recent project history, and user answers to context questions.

Rules:
1. The subject line MUST be in the format: <type>(<scope>): <description>
2. Allowed types: feat, fix, docs, style, refactor, perf, test, build, ci, chore, revert.
3. Keep the subject under 50 characters if possible.
4. The body should explain \"what\" and \"why\", not just \"how\".
5. Use the user's answers to provide specific context.

Template:
<type>(<scope>): <subject>

<body>";

/// Which wording a backend uses for the question and commit prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptSet {
    pub questions: &'static str,
    pub commit_message: &'static str,
    pub history_analysis: &'static str,
}

pub const OPENAI_PROMPTS: PromptSet = PromptSet {
    questions: OPENAI_QUESTIONS_SYSTEM,
    commit_message: OPENAI_COMMIT_SYSTEM,
    history_analysis: HISTORY_ANALYSIS_SYSTEM,
};

pub const OLLAMA_PROMPTS: PromptSet = PromptSet {
    questions: OLLAMA_QUESTIONS_SYSTEM,
    commit_message: OLLAMA_COMMIT_SYSTEM,
    history_analysis: HISTORY_ANALYSIS_SYSTEM,
};

/// `Diff:` and `Recent History:` sections.
pub fn context_prompt(diff: &str, history: &str) -> String {
    format!(
        "Diff:\n{}\n\nRecent History:\n{}",
        sanitize(diff),
        sanitize(history)
    )
}

/// Context sections followed by the user's answers as `Q:`/`A:` lines.
pub fn commit_prompt(diff: &str, history: &str, answers: &[Answer]) -> String {
    let qa_pairs: String = answers
        .iter()
        .map(|a| format!("Q: {}\nA: {}\n", sanitize(&a.question), sanitize(&a.answer)))
        .collect();

    format!("{}\n\nUser Context:\n{qa_pairs}", context_prompt(diff, history))
}

/// Strip terminal escape sequences and control characters.
///
/// Newlines and tabs survive; diffs need them.
pub fn sanitize(text: &str) -> String {
    remove_control_chars(&remove_ansi_escapes(text))
}

pub fn remove_ansi_escapes(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

pub fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}
