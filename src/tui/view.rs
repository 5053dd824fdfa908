//! One screen per session state.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::config::ProviderKind;
use crate::git::parse_subject;
use crate::session::{LoadingTask, Session, SetupStep, State, MAX_DIFF_CHARS};

fn title() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn info() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn faint() -> Style {
    info().add_modifier(Modifier::DIM)
}

fn error() -> Style {
    Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::BOLD)
}

fn command() -> Style {
    Style::default()
        .fg(Color::Blue)
        .add_modifier(Modifier::BOLD)
}

pub fn render(frame: &mut Frame, session: &Session) {
    let paragraph = Paragraph::new(screen(session)).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, frame.size());
}

/// Everything the current state shows.
pub fn screen(session: &Session) -> Text<'static> {
    let lines = match session.state() {
        State::Loading(LoadingTask::Prerequisites) => {
            spinner_screen(session, "Checking prerequisites...")
        }
        State::Loading(LoadingTask::CommitMessage) => {
            spinner_screen(session, "Writing your commit message...")
        }
        State::HistoryAnalysis => spinner_screen(session, "Analyzing history context..."),
        State::Analysis => {
            spinner_screen(session, "Analyzing changes and generating questions...")
        }
        State::Setup(step) => setup_screen(session, step),
        State::Welcome => welcome_screen(session),
        State::Questioning => question_screen(session),
        State::Commit => commit_screen(session),
        State::Success => vec![
            Line::default(),
            Line::from(" Successfully committed!"),
            Line::default(),
        ],
        State::Error => error_screen(session),
        State::NoRepo => vec![
            Line::default(),
            Line::from(vec![
                Span::styled(" Error:", error()),
                Span::raw(" Not a git repository."),
            ]),
            Line::default(),
            Line::from(" Please run smartcommit inside a git repository."),
            Line::from(" Press q to quit."),
        ],
        State::DiffTooLarge => vec![
            Line::default(),
            Line::styled(" Warning: Large Diff Detected", error()),
            Line::default(),
            Line::from(" The staged changes are too large for AI analysis."),
            Line::styled(
                format!(
                    " ({} characters, limit {})",
                    session.diff_chars(),
                    MAX_DIFF_CHARS
                ),
                info(),
            ),
            Line::default(),
            Line::from(" You can:"),
            Line::from(" 1. Press 'm' or Enter to write the commit message manually."),
            Line::from(" 2. Press 'q' to quit and stage fewer changes."),
        ],
    };
    Text::from(lines)
}

fn spinner_screen(session: &Session, label: &str) -> Vec<Line<'static>> {
    vec![
        Line::default(),
        Line::from(format!(" {} {label}", session.spinner())),
    ]
}

fn input_line(input: &str, masked: bool) -> Line<'static> {
    let shown = if masked {
        "•".repeat(input.chars().count())
    } else {
        input.to_string()
    };
    Line::from(vec![
        Span::styled(" ┃ ", info()),
        Span::raw(shown),
        Span::styled("█", info()),
    ])
}

fn prompt_screen(session: &Session, heading: &str, hint: &str, masked: bool) -> Vec<Line<'static>> {
    vec![
        Line::default(),
        Line::styled(format!(" {heading}"), title()),
        Line::default(),
        input_line(session.input(), masked),
        Line::default(),
        Line::styled(format!(" {hint}"), info()),
    ]
}

fn setup_screen(session: &Session, step: SetupStep) -> Vec<Line<'static>> {
    match step {
        SetupStep::ChooseProvider => vec![
            Line::default(),
            Line::styled(" Choose your AI provider:", title()),
            Line::default(),
            Line::from(" 1. OpenAI (GPT-4o)"),
            Line::styled("    Not private, costs money, great accuracy/performance", faint()),
            Line::default(),
            Line::from(" 2. Ollama (llama3.1)"),
            Line::styled("    Private, free, low accuracy/performance", faint()),
            Line::default(),
            Line::styled(" (Press 1 or 2)", info()),
        ],
        SetupStep::ConfirmDetectedKey => vec![
            Line::default(),
            Line::styled(" OpenAI API Key Detected", title()),
            Line::default(),
            Line::from(" Found OPENAI_API_KEY in your environment."),
            Line::from(" Would you like to use it?"),
            Line::default(),
            Line::styled(" (y/n)", info()),
        ],
        SetupStep::EnterApiKey => prompt_screen(
            session,
            "Please enter your OpenAI API Key:",
            "(Press Enter to save)",
            true,
        ),
        SetupStep::OllamaUrl => prompt_screen(
            session,
            "Please enter your Ollama URL:",
            "(Press Enter to continue)",
            false,
        ),
        SetupStep::OllamaModel => prompt_screen(
            session,
            "Please enter the Ollama model name:",
            "(Press Enter to save)",
            false,
        ),
    }
}

fn welcome_screen(session: &Session) -> Vec<Line<'static>> {
    let config = session.config();
    let provider = match config.provider {
        ProviderKind::OpenAi => " (using OpenAI)".to_string(),
        ProviderKind::Ollama => format!(" (using Ollama: {})", config.ollama_model),
        ProviderKind::Unset | ProviderKind::Other(_) => String::new(),
    };

    vec![
        Line::default(),
        Line::from(vec![
            Span::styled(" SmartCommit", title()),
            Span::styled(provider, info()),
        ]),
        Line::default(),
        Line::from(" How would you like to proceed?"),
        Line::default(),
        Line::from(" 1. I need help writing a commit message (Recommended)"),
        Line::from(" 2. I already know what to write"),
        Line::default(),
        Line::styled(" Press 'c' to reconfigure provider", info()),
        Line::styled(" (Press 1 or 2)", info()),
    ]
}

fn question_screen(session: &Session) -> Vec<Line<'static>> {
    let Some(question) = session.current_question() else {
        return Vec::new();
    };

    vec![
        Line::default(),
        Line::styled(
            format!(
                " Question {}/{}:",
                session.question_index() + 1,
                session.questions().len()
            ),
            title(),
        ),
        Line::from(format!(" {question}")),
        Line::default(),
        input_line(session.input(), false),
        Line::default(),
        Line::styled(" (Press Enter to submit)", info()),
    ]
}

fn commit_screen(session: &Session) -> Vec<Line<'static>> {
    let mut lines = vec![Line::default(), Line::from(" Opening editor...")];

    if let Some(draft) = session.draft() {
        lines.push(Line::default());
        lines.push(Line::styled(format!(" {}", draft.subject), title()));
        if parse_subject(&draft.subject).is_none() {
            lines.push(Line::styled(
                " Note: this subject does not follow Conventional Commits.",
                info(),
            ));
        }
    }
    lines
}

fn error_screen(session: &Session) -> Vec<Line<'static>> {
    let Some(err) = session.error() else {
        return vec![Line::styled(" Error: unknown failure", error())];
    };

    match err.remediation() {
        Some(fix) => vec![
            Line::default(),
            Line::from(vec![
                Span::styled(" Error:", error()),
                Span::raw(format!(" {err}.")),
            ]),
            Line::default(),
            Line::from(" You don't have this model installed through Ollama."),
            Line::from(" To install it, run the following command:"),
            Line::default(),
            Line::styled(format!("   {fix}"), command()),
            Line::default(),
            Line::from(" Press q or ctrl+c to quit."),
        ],
        None => vec![
            Line::default(),
            Line::from(vec![
                Span::styled(" Error:", error()),
                Span::raw(format!(" {err}")),
            ]),
            Line::from(" Press q or ctrl+c to quit."),
        ],
    }
}
