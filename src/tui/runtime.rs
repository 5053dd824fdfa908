//! Terminal ownership and the event loop.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::cursor::Show;
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};
use tracing::debug;

use crate::session::{Effect, Event, Key, Outcome, Session, Task, TaskRunner};

use super::view;

/// Spinner cadence; also the longest a finished task waits to be noticed.
const TICK: Duration = Duration::from_millis(100);

/// Raw mode plus the alternate screen, restored on drop.
pub struct Ui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Ui {
    pub fn init() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    /// Hand the terminal back to the shell so a child process can use it.
    fn suspend(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.backend_mut().execute(Show)?;
        Ok(())
    }

    fn resume(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        self.terminal.backend_mut().execute(EnterAlternateScreen)?;
        self.terminal.clear()
    }

    fn draw(&mut self, session: &Session) -> io::Result<()> {
        self.terminal.draw(|frame| view::render(frame, session))?;
        Ok(())
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        let area = self.terminal.size()?;
        Ok((area.width, area.height))
    }
}

impl Drop for Ui {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        let _ = io::stdout().execute(Show);
    }
}

/// Drive `session` until it quits, returning it in its final state.
///
/// Tasks are spawned on `handle`; their outcomes come back over a channel.
/// `git commit` runs on this thread with the terminal suspended so the
/// editor gets stdin to itself.
pub fn run(mut session: Session, mut runner: TaskRunner, handle: &Handle) -> io::Result<Session> {
    let _runtime = handle.enter();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut ui = Ui::init()?;

    let (width, height) = ui.size()?;
    session.update(Event::Resize { width, height });
    let mut effect = session.start();

    loop {
        ui.draw(&session)?;

        let event = match effect {
            Effect::Quit => break,
            Effect::Run(Task::Commit { message }) => {
                ui.suspend()?;
                let outcome = runner.commit(&message);
                ui.resume()?;
                Some(Event::Completed(outcome))
            }
            Effect::Run(task) => {
                runner.spawn(task, tx.clone());
                next_event(&mut rx)?
            }
            Effect::None => next_event(&mut rx)?,
        };

        effect = match event {
            Some(event) => session.update(event),
            None => Effect::None,
        };
    }

    debug!(state = ?session.state(), "Session ended");
    Ok(session)
}

/// The next thing that happened: a finished task, a terminal event, or a tick.
fn next_event(rx: &mut UnboundedReceiver<Outcome>) -> io::Result<Option<Event>> {
    match rx.try_recv() {
        Ok(outcome) => return Ok(Some(Event::Completed(outcome))),
        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {}
    }

    if !event::poll(TICK)? {
        return Ok(Some(Event::Tick));
    }

    let event = match event::read()? {
        TermEvent::Key(key) if key.kind == KeyEventKind::Press => map_key(key).map(Event::Key),
        TermEvent::Resize(width, height) => Some(Event::Resize { width, height }),
        _ => None,
    };
    Ok(event)
}

/// Reduce a crossterm key to what the session understands.
pub fn map_key(key: KeyEvent) -> Option<Key> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Key::CtrlC),
        KeyCode::Char(_) if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            None
        }
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Esc => Some(Key::Esc),
        _ => None,
    }
}
