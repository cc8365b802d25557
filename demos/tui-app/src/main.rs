//! Terminal front end for the recruiter chat client.
//!
//! Run with: cargo run -p recruiter-chat-tui
//!
//! Point it at a service with `RECRUITER_CHAT_API_URL` (default
//! `http://localhost:8000`). Logs go to `recruiter-chat.log` in the temp
//! directory so they do not corrupt the terminal.

use std::{fs::File, io, sync::Mutex, time::Duration};

use chrono::Local;
use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use recruiter_chat_core::{IdentityField, Role, SessionContext};
use recruiter_chat_session::{
    ChatClient, ChatEvent, ChatView, ClientError, ExchangeCoordinator, PresenterEvent, SubmitError,
};
use recruiter_chat_transport::{
    ClientConfig, HttpAssistant,
    tui::{Focus, KeyAction, TuiInput},
};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "recruiter-chat.log";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging()?;

    let config = ClientConfig::from_env()?;
    let assistant = HttpAssistant::new(&config)?;
    let coordinator = ExchangeCoordinator::new(assistant, SessionContext::create());
    tracing::info!(
        session_id = %coordinator.session_id(),
        url = %config.base_url,
        "starting chat client"
    );
    let app = App::new(ChatClient::new(coordinator), config.base_url);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn init_logging() -> anyhow::Result<()> {
    let file = File::create(std::env::temp_dir().join(LOG_FILE))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
    Ok(())
}

struct App {
    client: ChatClient<HttpAssistant>,
    keys: TuiInput,
    events: broadcast::Receiver<ChatEvent>,
    view: ChatView,
    base_url: String,
    notice: Option<String>,
    scroll: u16,
    follow: bool,
}

impl App {
    fn new(client: ChatClient<HttpAssistant>, base_url: String) -> Self {
        let events = client.coordinator().subscribe();
        let view = client.view();
        Self {
            client,
            keys: TuiInput::new(),
            events,
            view,
            base_url,
            notice: None,
            scroll: 0,
            follow: true,
        }
    }

    fn refresh(&mut self) {
        self.view = self.client.view();
    }

    /// Apply coordinator notifications published since the last frame.
    fn drain_events(&mut self) {
        let mut dirty = false;
        loop {
            match self.events.try_recv() {
                Ok(ChatEvent::FocusInput) => {
                    self.refresh();
                    self.keys.focus_input(&self.view);
                    self.notice = None;
                    self.follow = true;
                }
                Ok(_) | Err(TryRecvError::Lagged(_)) => dirty = true,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        if dirty {
            self.refresh();
        }
    }

    fn dispatch(&mut self, event: PresenterEvent) {
        match self.client.handle(event) {
            Ok(Some(pending)) => {
                self.notice = None;
                self.follow = true;
                tokio::spawn(pending.run());
            }
            Ok(None) => {}
            // Shown by the form or not worth a notice.
            Err(ClientError::Identity(_) | ClientError::Submit(SubmitError::EmptyMessage)) => {}
            Err(e) => {
                tracing::debug!("presenter event rejected: {e}");
                self.notice = Some(e.to_string());
            }
        }
        self.refresh();
        self.keys.focus_input(&self.view);
    }

    fn scroll_by(&mut self, delta: i16) {
        self.follow = false;
        self.scroll = self.scroll.saturating_add_signed(delta);
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> anyhow::Result<()> {
    loop {
        app.drain_events();
        terminal.draw(|f| ui(f, &mut app))?;

        if event::poll(Duration::from_millis(50))? {
            let event = event::read()?;
            match app.keys.handle_event(&event, &app.view) {
                KeyAction::Quit => return Ok(()),
                KeyAction::Scroll(delta) => app.scroll_by(delta),
                KeyAction::Dispatch(event) => app.dispatch(event),
                KeyAction::None => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Transcript
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status
        ])
        .split(f.area());

    if app.view.gate_open {
        render_identity_form(f, app, chunks[0].union(chunks[1]));
    } else {
        render_transcript(f, app, chunks[0]);
        render_input(f, app, chunks[1]);
    }
    render_status(f, app, chunks[2]);
}

fn render_identity_form(f: &mut Frame, app: &App, area: Rect) {
    let focused = match app.keys.focus() {
        Focus::Identity(field) => Some(field),
        Focus::Message => None,
    };

    let mut lines = vec![
        Line::from("Before we start, please introduce yourself."),
        Line::from(""),
    ];
    for field in IdentityField::ALL {
        let style = if focused == Some(field) {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>10}: ", field.label()), style.add_modifier(Modifier::BOLD)),
            Span::styled(app.view.identity_form.get(field).to_string(), style),
        ]));
    }
    lines.push(Line::from(""));
    if let Some(err) = &app.view.identity_error {
        lines.push(Line::styled(err.to_string(), Style::default().fg(Color::Red)));
    }

    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Introduce yourself"))
        .wrap(Wrap { trim: false });
    f.render_widget(form, area);

    if let Some(field) = focused {
        let row = IdentityField::ALL
            .iter()
            .position(|candidate| *candidate == field)
            .unwrap_or(0);
        let value_len = app.view.identity_form.get(field).chars().count();
        f.set_cursor_position((
            area.x + 1 + 12 + to_u16(value_len),
            area.y + 1 + 2 + to_u16(row),
        ));
    }
}

fn render_transcript(f: &mut Frame, app: &mut App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for entry in &app.view.transcript {
        let (who, color) = match entry.role() {
            Role::User => ("You", Color::Cyan),
            Role::Assistant => ("Assistant", Color::Green),
        };
        let stamp = entry.timestamp().with_timezone(&Local).format("%H:%M");
        lines.push(Line::from(vec![
            Span::styled(format!("[{stamp}] "), Style::default().fg(Color::DarkGray)),
            Span::styled(who, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ]));
        lines.extend(entry.content().lines().map(|l| Line::from(l.to_string())));
        lines.push(Line::from(""));
    }
    if app.view.busy {
        lines.push(Line::styled(
            "Assistant is typing...",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ));
    }

    // Approximate: wrapped lines are not counted.
    let visible = area.height.saturating_sub(2);
    let bottom = to_u16(lines.len()).saturating_sub(visible);
    if app.follow || app.scroll >= bottom {
        app.scroll = bottom;
        app.follow = true;
    }

    let transcript = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Conversation"))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    f.render_widget(transcript, area);
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let (title, style) = if app.view.busy {
        ("Message (waiting for reply)", Style::default().fg(Color::DarkGray))
    } else {
        ("Message", Style::default().fg(Color::Yellow))
    };
    let input = Paragraph::new(app.view.input.as_str())
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, area);

    if app.keys.focus() == Focus::Message {
        f.set_cursor_position((
            area.x + to_u16(app.view.input.chars().count()) + 1,
            area.y + 1,
        ));
    }
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let session = app.view.session_id.to_string();
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            format!("session {}", session.get(..8).unwrap_or(&session)),
            Style::default().fg(Color::Green),
        ),
        Span::raw(" | "),
        Span::raw(app.base_url.as_str()),
        Span::raw(" | "),
    ];
    if let Some(notice) = &app.notice {
        spans.push(Span::styled(notice.as_str(), Style::default().fg(Color::Red)));
        spans.push(Span::raw(" | "));
    }
    let hint = if app.view.gate_open {
        "Tab next field, Enter submit"
    } else {
        "Enter send, Up/Down/PgUp/PgDn scroll"
    };
    spans.extend([
        Span::styled("Ctrl+C", Style::default().fg(Color::Yellow)),
        Span::raw(" quit | "),
        Span::raw(hint),
    ]);
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}
