use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use miette::IntoDiagnostic;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::{AddRequest, AddResult, ProgressEvent, ProgressSink};
use crate::error::CentaurusError;

const EVENTS_MAX: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Asset,
    Name,
    Link,
}

impl Field {
    const ALL: [Field; 3] = [Field::Asset, Field::Name, Field::Link];

    fn label(self) -> &'static str {
        match self {
            Field::Asset => "Asset path",
            Field::Name => "Content name",
            Field::Link => "TMDB or IMDB link",
        }
    }

    fn index(self) -> usize {
        match self {
            Field::Asset => 0,
            Field::Name => 1,
            Field::Link => 2,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Ready,
    Working,
    Done(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FormAction {
    None,
    Submit(AddRequest),
    Quit,
}

#[derive(Debug)]
struct FormState {
    values: [String; 3],
    focus: Field,
    status: Status,
}

impl FormState {
    fn new() -> Self {
        Self {
            values: Default::default(),
            focus: Field::Asset,
            status: Status::Ready,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        if key.kind != KeyEventKind::Press {
            return FormAction::None;
        }
        match key.code {
            KeyCode::Esc => return FormAction::Quit,
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),
            KeyCode::Enter => {
                if self.focus != Field::Link {
                    self.focus = self.focus.next();
                    return FormAction::None;
                }
                return self.submit();
            }
            KeyCode::Backspace => {
                self.values[self.focus.index()].pop();
            }
            KeyCode::Char(ch) => self.values[self.focus.index()].push(ch),
            _ => {}
        }
        FormAction::None
    }

    fn submit(&mut self) -> FormAction {
        let missing = Field::ALL
            .iter()
            .find(|field| self.values[field.index()].trim().is_empty());
        if let Some(field) = missing {
            self.status = Status::Failed(format!("{} is required", field.label()));
            self.focus = *field;
            return FormAction::None;
        }
        FormAction::Submit(AddRequest {
            asset: self.values[Field::Asset.index()].trim().to_string(),
            name: self.values[Field::Name.index()].trim().to_string(),
            link: self.values[Field::Link.index()].trim().to_string(),
        })
    }

    fn finish(&mut self, result: Result<AddResult, CentaurusError>) {
        self.status = match result {
            Ok(result) => {
                let location = result
                    .layout
                    .as_ref()
                    .map(|layout| layout.root.to_string())
                    .unwrap_or_else(|| "dry run".to_string());
                self.values = Default::default();
                self.focus = Field::Asset;
                Status::Done(format!(
                    "{} ({}) -> {location}",
                    result.record.title, result.record.year
                ))
            }
            Err(err) => Status::Failed(format!("{:?}: {err}", err.kind())),
        };
    }
}

struct TuiProgress<'a> {
    events: &'a RefCell<VecDeque<String>>,
}

impl ProgressSink for TuiProgress<'_> {
    fn event(&self, event: ProgressEvent) {
        let mut events = self.events.borrow_mut();
        if events.len() == EVENTS_MAX {
            events.pop_front();
        }
        events.push_back(event.message.trim().to_string());
    }
}

/// Three-field form that collects an `AddRequest` and runs it in place.
pub struct Tui {
    form: FormState,
    events: RefCell<VecDeque<String>>,
}

impl Default for Tui {
    fn default() -> Self {
        Self::new()
    }
}

impl Tui {
    pub fn new() -> Self {
        Self {
            form: FormState::new(),
            events: RefCell::new(VecDeque::new()),
        }
    }

    /// Runs until Esc. `submit` is called synchronously for every confirmed
    /// form; the form stays open afterwards.
    pub fn session<F>(&mut self, mut submit: F) -> miette::Result<()>
    where
        F: FnMut(&AddRequest, &dyn ProgressSink) -> Result<AddResult, CentaurusError>,
    {
        let mut stdout = io::stdout();
        enable_raw_mode().into_diagnostic()?;
        stdout.execute(EnterAlternateScreen).into_diagnostic()?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).into_diagnostic()?;
        terminal.clear().into_diagnostic()?;

        let outcome = loop {
            if let Err(err) = terminal.draw(|frame| draw_ui(frame, self)) {
                break Err::<(), _>(err).into_diagnostic();
            }

            match event::poll(Duration::from_millis(120)) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(err) => break Err::<(), _>(err).into_diagnostic(),
            }
            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                Ok(_) => continue,
                Err(err) => break Err::<(), _>(err).into_diagnostic(),
            };

            match self.form.handle_key(key) {
                FormAction::None => {}
                FormAction::Quit => break Ok(()),
                FormAction::Submit(request) => {
                    self.events.borrow_mut().clear();
                    self.form.status = Status::Working;
                    if let Err(err) = terminal.draw(|frame| draw_ui(frame, self)) {
                        break Err::<(), _>(err).into_diagnostic();
                    }
                    let sink = TuiProgress {
                        events: &self.events,
                    };
                    let result = submit(&request, &sink);
                    self.form.finish(result);
                }
            }
        };

        disable_raw_mode().into_diagnostic()?;
        let mut stdout = io::stdout();
        stdout.execute(LeaveAlternateScreen).into_diagnostic()?;
        outcome
    }
}

fn draw_ui(frame: &mut ratatui::Frame, tui: &Tui) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Length(3),
            Constraint::Min(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "CENTAURUS",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(env!("CARGO_PKG_VERSION"), Style::default().fg(Color::Gray)),
        Span::styled(
            "   Tab next field · Enter confirm · Esc quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    draw_fields(frame, &tui.form, chunks[1]);
    frame.render_widget(draw_status(&tui.form.status), chunks[2]);

    let events = tui.events.borrow();
    let mut lines = vec![Line::from(Span::styled(
        "EVENTS",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))];
    lines.extend(events.iter().map(|event| Line::from(format!("- {event}"))));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), chunks[3]);
}

fn draw_fields(frame: &mut ratatui::Frame, form: &FormState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3); 3])
        .split(area);

    for field in Field::ALL {
        let focused = field == form.focus;
        let border = if focused { Color::Cyan } else { Color::DarkGray };
        let value = &form.values[field.index()];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(field.label());
        let area = rows[field.index()];
        frame.render_widget(Paragraph::new(value.as_str()).block(block), area);

        if focused {
            let max_x = area.x.saturating_add(area.width.saturating_sub(2));
            let cursor_x = area
                .x
                .saturating_add(1)
                .saturating_add(value.chars().count() as u16)
                .min(max_x);
            frame.set_cursor_position((cursor_x, area.y.saturating_add(1)));
        }
    }
}

fn draw_status(status: &Status) -> Paragraph<'static> {
    let (text, color) = match status {
        Status::Ready => ("ready".to_string(), Color::Gray),
        Status::Working => ("resolving metadata…".to_string(), Color::Yellow),
        Status::Done(message) => (format!("added: {message}"), Color::Green),
        Status::Failed(message) => (format!("error: {message}"), Color::Red),
    };
    Paragraph::new(Line::from(Span::styled(text, Style::default().fg(color))))
        .block(Block::default().borders(Borders::TOP))
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(form: &mut FormState, text: &str) {
        for ch in text.chars() {
            form.handle_key(press(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn enter_advances_then_submits() {
        let mut form = FormState::new();
        type_text(&mut form, "/tmp/movie.torrent");
        assert_eq!(form.handle_key(press(KeyCode::Enter)), FormAction::None);
        type_text(&mut form, "Inception");
        form.handle_key(press(KeyCode::Enter));
        type_text(&mut form, "https://www.themoviedb.org/movie/27205");

        let action = form.handle_key(press(KeyCode::Enter));
        assert_eq!(
            action,
            FormAction::Submit(AddRequest {
                asset: "/tmp/movie.torrent".to_string(),
                name: "Inception".to_string(),
                link: "https://www.themoviedb.org/movie/27205".to_string(),
            })
        );
    }

    #[test]
    fn missing_field_blocks_submit() {
        let mut form = FormState::new();
        type_text(&mut form, "/tmp/movie.torrent");
        form.handle_key(press(KeyCode::Up));
        assert_eq!(form.focus, Field::Link);

        assert_eq!(form.handle_key(press(KeyCode::Enter)), FormAction::None);
        assert_eq!(form.focus, Field::Name);
        assert!(matches!(form.status, Status::Failed(_)));
    }

    #[test]
    fn escape_quits() {
        let mut form = FormState::new();
        assert_eq!(form.handle_key(press(KeyCode::Esc)), FormAction::Quit);
    }
}
