//! Interactive status browser.
//!
//! One key event is processed at a time: the dispatch table turns it into
//! a command, the command either moves the viewport or runs the session
//! action against the highlighted status, and the visible window is
//! repainted. Action failures land on the status line and never end the
//! session; only Quit does.

use std::io::{self, Stdout};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};

use crate::action::{ActionKind, Executor};
use crate::item::Item;
use crate::text;
use crate::viewport::Viewport;

const MAX_NAME_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveUp,
    MoveDown,
    Activate,
    Quit,
}

const KEY_BINDINGS: &[(KeyCode, Command)] = &[
    (KeyCode::Down, Command::MoveDown),
    (KeyCode::Char('j'), Command::MoveDown),
    (KeyCode::Up, Command::MoveUp),
    (KeyCode::Char('k'), Command::MoveUp),
    (KeyCode::Enter, Command::Activate),
    (KeyCode::Char('q'), Command::Quit),
    (KeyCode::Esc, Command::Quit),
];

/// Pure lookup from key event to command; unbound keys map to `None`.
pub fn dispatch(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(Command::Quit);
    }
    KEY_BINDINGS
        .iter()
        .find(|(code, _)| *code == key.code)
        .map(|(_, command)| *command)
}

/// Formats one status as a single terminal row:
/// `[name] body`, the name capped at 30 display columns.
pub fn format_line(item: &Item) -> String {
    let name = text::truncate_width(&item.display_name, MAX_NAME_WIDTH);
    let body = text::decode_entities(&text::collapse_newlines(&item.body));
    format!("[{name}] {body}")
}

pub struct Options {
    pub items: Vec<Item>,
    pub action: ActionKind,
    pub executor: Box<dyn Executor>,
    pub status_message: String,
}

pub struct Model {
    items: Vec<Item>,
    action: ActionKind,
    executor: Box<dyn Executor>,
    viewport: Viewport,
    status_message: String,
}

impl Model {
    pub fn new(options: Options) -> Self {
        let Options {
            items,
            action,
            executor,
            status_message,
        } = options;
        let viewport = Viewport::new(items.len(), 1);
        Self {
            items,
            action,
            executor,
            viewport,
            status_message,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match dispatch(key) {
                    Some(Command::Quit) => break,
                    Some(command) => self.apply(command),
                    None => {}
                },
                // The next draw re-clamps the viewport to the new height.
                Event::Resize(..) => {}
                _ => {}
            }
        }
        Ok(())
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::MoveUp => self.viewport.move_up(),
            Command::MoveDown => self.viewport.move_down(),
            Command::Activate => self.activate(),
            Command::Quit => {}
        }
    }

    fn activate(&mut self) {
        let Some(index) = self.viewport.selected() else {
            return;
        };
        let item = &self.items[index];
        match self.executor.execute(self.action, item) {
            Ok(()) => self.status_message = success_message(self.action, item),
            Err(err) => self.status_message = format!("Error: {err}"),
        }
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(frame.size());

        let block = Block::default().borders(Borders::ALL).title(" Statuses ");
        let inner = block.inner(layout[0]);
        self.viewport.resize(inner.height as usize);

        let mut lines = Vec::with_capacity(self.viewport.height());
        for row in 0..self.viewport.height() {
            let index = self.viewport.origin() + row;
            let Some(item) = self.items.get(index) else {
                break;
            };
            let style = if row == self.viewport.cursor() {
                Style::default().fg(Color::Black).bg(Color::Green)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(format_line(item), style)));
        }
        if self.items.is_empty() {
            lines.push(Line::from(Span::styled(
                "No statuses to show.",
                Style::default().add_modifier(Modifier::DIM),
            )));
        }
        frame.render_widget(Paragraph::new(lines).block(block), layout[0]);

        let status = Paragraph::new(self.status_message.as_str())
            .style(Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(status, layout[1]);
    }

    #[cfg(test)]
    fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    #[cfg(test)]
    fn status(&self) -> &str {
        &self.status_message
    }
}

fn success_message(kind: ActionKind, item: &Item) -> String {
    match kind {
        ActionKind::OpenInBrowser => format!("Opened {} in the browser.", item.url),
        ActionKind::CopyLink => format!("Copied {} to the clipboard.", item.url),
        ActionKind::DownloadAndEdit => format!("Downloaded {} and launched the editor.", item.url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionError;
    use std::cell::Cell;
    use std::rc::Rc;

    fn item(index: usize) -> Item {
        Item {
            id: index.to_string(),
            display_name: format!("user {index}"),
            body: format!("status {index}"),
            url: format!("https://example.social/@user/{index}"),
        }
    }

    struct FailingExecutor;

    impl Executor for FailingExecutor {
        fn execute(&self, _kind: ActionKind, _item: &Item) -> Result<(), ActionError> {
            Err(ActionError::Clipboard(arboard::Error::ClipboardNotSupported))
        }
    }

    struct RecordingExecutor {
        calls: Rc<Cell<usize>>,
    }

    impl Executor for RecordingExecutor {
        fn execute(&self, _kind: ActionKind, _item: &Item) -> Result<(), ActionError> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }
    }

    fn model(items: Vec<Item>, executor: Box<dyn Executor>) -> Model {
        Model::new(Options {
            items,
            action: ActionKind::CopyLink,
            executor,
            status_message: String::new(),
        })
    }

    #[test]
    fn dispatch_covers_the_fixed_bindings() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(dispatch(press(KeyCode::Char('j'))), Some(Command::MoveDown));
        assert_eq!(dispatch(press(KeyCode::Down)), Some(Command::MoveDown));
        assert_eq!(dispatch(press(KeyCode::Char('k'))), Some(Command::MoveUp));
        assert_eq!(dispatch(press(KeyCode::Enter)), Some(Command::Activate));
        assert_eq!(dispatch(press(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(
            dispatch(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(dispatch(press(KeyCode::Char('x'))), None);
        assert_eq!(dispatch(press(KeyCode::F(5))), None);
        assert_eq!(
            dispatch(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn formatting_is_idempotent_and_single_line() {
        let item = Item {
            id: "1".into(),
            display_name: "A very long display name that will not fit in the column".into(),
            body: "first line\r\nsecond &amp; third".into(),
            url: String::new(),
        };
        let once = format_line(&item);
        let twice = format_line(&item);
        assert_eq!(once, twice);
        assert!(!once.contains('\n'));
        assert!(once.contains("first line second & third"));
        assert!(once.starts_with('['));
    }

    #[test]
    fn activation_failure_keeps_the_session_navigable() {
        let mut model = model(vec![item(0), item(1), item(2)], Box::new(FailingExecutor));
        model.viewport_mut().resize(2);

        model.apply(Command::Activate);
        assert!(model.status().starts_with("Error: clipboard"));

        model.apply(Command::MoveDown);
        assert_eq!(model.viewport.selected(), Some(1));
    }

    #[test]
    fn activate_runs_against_the_selected_item() {
        let calls = Rc::new(Cell::new(0));
        let mut model = model(
            vec![item(0), item(1)],
            Box::new(RecordingExecutor {
                calls: calls.clone(),
            }),
        );
        model.viewport_mut().resize(2);
        model.apply(Command::MoveDown);
        model.apply(Command::Activate);
        assert_eq!(calls.get(), 1);
        assert!(model.status().contains("/1"));
    }

    #[test]
    fn activate_is_a_no_op_on_an_empty_list() {
        let calls = Rc::new(Cell::new(0));
        let mut model = model(
            Vec::new(),
            Box::new(RecordingExecutor {
                calls: calls.clone(),
            }),
        );
        model.apply(Command::Activate);
        model.apply(Command::MoveDown);
        model.apply(Command::MoveUp);
        assert_eq!(calls.get(), 0);
        assert_eq!(model.viewport.selected(), None);
    }
}
