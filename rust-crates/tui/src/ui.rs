use color_eyre::eyre::{
    Result,
    eyre,
};
use crossterm::{
    event::{
        self,
        Event,
        KeyCode,
        KeyEventKind,
        KeyModifiers,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use fortune_core::{
    CrackState,
    MintAttemptResult,
};
use ratatui::{
    prelude::*,
    widgets::*,
};
use std::{
    io::stdout,
    sync::{
        Arc,
        atomic::{
            AtomicBool,
            Ordering,
        },
    },
    thread,
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::debug;

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

const COOKIE_WHOLE: &str = r"
        _.-~~~~-._
     .-'  .  .    '-.
    /   .   (  .  .  \
   |  .   .  )   .    |
    \    .  (    .   /
     '-._  .  .  _.-'
         '~~~~~~'";

const COOKIE_CRACKING: &str = r"
        _.-~~/~-._
     .-'  . /.    '-.
    /   .  /(  .  .  \
   |  .   / . )   .   |
    \    /.  (   .   /
     '-._\  .  . _.-'
         '~\~~~~'";

const COOKIE_OPEN: &str = r"
      _.-~~-.    .-~~-._
    .'  .   /    \   .  '.
   /  .    /  ~~  \    .  \
   \ .    /  ~~~~  \  .   /
    '-._ /          \ _.-'
        '            '";

pub enum UserEvent {
    Quit,
    /// Primary action: whatever the call-to-action button offers.
    Mint,
    Crack,
    Connect,
    Share,
    Redraw,
}

#[derive(Debug, Default)]
pub struct UiState {
    show_help: bool,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

/// Everything the screen shows, taken from the lifecycle after each change.
#[derive(Clone, Debug, Default)]
pub struct AppSnapshot {
    pub network: String,
    pub wallet: Option<String>,
    pub fortune: Option<String>,
    pub crack: CrackState,
    pub busy: bool,
    pub cta: String,
    pub fee: String,
    pub status: Option<String>,
    pub result: Option<MintAttemptResult>,
    pub explorer_link: Option<String>,
    pub share_link: Option<String>,
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit(state: &mut UiState) -> Result<()> {
    state.terminal = None;
    disable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::event::DisableMouseCapture,
        crossterm::terminal::LeaveAlternateScreen
    )?;
    Ok(())
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    if let Some(mut term) = state.terminal.take() {
        let drawn = term.draw(|f| ui(f, state, snap)).map(|_| ());
        state.terminal = Some(term);
        drawn?;
    }
    Ok(())
}

/// Terminal input forwarded from a reader thread. Paused while a prompt owns stdin.
#[derive(Debug)]
pub struct InputEvents {
    rx: mpsc::UnboundedReceiver<std::io::Result<Event>>,
    paused: Arc<AtomicBool>,
}

impl InputEvents {
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }
}

pub fn input_event_stream() -> InputEvents {
    let (tx, rx) = mpsc::unbounded_channel();
    let paused = Arc::new(AtomicBool::new(false));
    let reader_paused = paused.clone();
    thread::spawn(move || {
        loop {
            if reader_paused.load(Ordering::SeqCst) {
                thread::sleep(INPUT_POLL_INTERVAL);
                continue;
            }
            let ready = match event::poll(INPUT_POLL_INTERVAL) {
                Ok(ready) => ready,
                Err(err) => {
                    let _ = tx.send(Err(err));
                    break;
                }
            };
            if !ready || reader_paused.load(Ordering::SeqCst) {
                if tx.is_closed() {
                    break;
                }
                continue;
            }
            if tx.send(event::read()).is_err() {
                break;
            }
        }
        debug!("input reader stopped");
    });
    InputEvents { rx, paused }
}

pub async fn next_raw_event(input: &mut InputEvents) -> Result<Event> {
    match input.rx.recv().await {
        Some(event) => Ok(event?),
        None => Err(eyre!("terminal input closed")),
    }
}

pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    let Event::Key(k) = event else {
        return matches!(event, Event::Resize(_, _)).then_some(UserEvent::Redraw);
    };
    if k.kind != KeyEventKind::Press {
        return None;
    }
    if state.show_help {
        state.show_help = false;
        return Some(UserEvent::Redraw);
    }
    match k.code {
        KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(UserEvent::Quit)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(UserEvent::Quit),
        KeyCode::Enter | KeyCode::Char('m') => Some(UserEvent::Mint),
        KeyCode::Char(' ') | KeyCode::Char('c') => Some(UserEvent::Crack),
        KeyCode::Char('w') => Some(UserEvent::Connect),
        KeyCode::Char('s') => Some(UserEvent::Share),
        KeyCode::Char('?') => {
            state.show_help = true;
            Some(UserEvent::Redraw)
        }
        _ => None,
    }
}

fn ui(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // wallet
            Constraint::Length(10), // cookie
            Constraint::Length(5),  // fortune
            Constraint::Length(3),  // call to action
            Constraint::Length(3),  // status
            Constraint::Min(6),     // minted result
            Constraint::Length(3),  // help
        ])
        .split(f.area());

    draw_wallet_panel(f, chunks[0], snap);
    draw_cookie(f, chunks[1], snap);
    draw_fortune(f, chunks[2], snap);
    draw_cta(f, chunks[3], snap);
    draw_status(f, chunks[4], snap);
    draw_result(f, chunks[5], snap);
    draw_help_bar(f, chunks[6]);
    if state.show_help {
        draw_help_modal(f);
    }
}

fn draw_wallet_panel(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let wallet = snap.wallet.as_deref().unwrap_or("not connected");
    let text = format!(
        "Network: {} | Wallet: {} | Mint fee: {}",
        snap.network, wallet, snap.fee
    );
    let widget = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Holiday Fortune Cookie"),
    );
    f.render_widget(widget, area);
}

fn cookie_art(crack: CrackState) -> &'static str {
    if crack.is_cracking {
        COOKIE_CRACKING
    } else if crack.has_cracked {
        COOKIE_OPEN
    } else {
        COOKIE_WHOLE
    }
}

fn draw_cookie(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let widget = Paragraph::new(cookie_art(snap.crack).trim_start_matches('\n'))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn draw_fortune(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let (text, style) = match (&snap.fortune, &snap.result) {
        (Some(fortune), _) if !snap.crack.is_cracking => (
            format!("\u{201c}{fortune}\u{201d}"),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        (_, Some(result)) => (
            format!("\u{201c}{}\u{201d}", result.fortune),
            Style::default().fg(Color::Green),
        ),
        _ if snap.crack.is_cracking => (
            String::from("Cracking..."),
            Style::default().fg(Color::DarkGray),
        ),
        _ => (
            String::from("Your fortune awaits inside."),
            Style::default().fg(Color::DarkGray),
        ),
    };
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Fortune"));
    f.render_widget(widget, area);
}

fn draw_cta(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let style = if snap.busy {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Black).bg(Color::Red)
    };
    let widget = Paragraph::new(format!("[ Enter ] {}", snap.cta))
        .alignment(Alignment::Center)
        .style(style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn draw_status(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let (text, color) = match snap.status.as_deref() {
        Some(status) if status.starts_with("Error:") => (status, Color::Red),
        Some(status) => (status, Color::Green),
        None => ("Ready", Color::Gray),
    };
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(widget, area);
}

fn draw_result(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let mut lines: Vec<Line> = Vec::new();
    match &snap.result {
        Some(result) => {
            lines.push(Line::from(format!("Fortune: {}", result.fortune)));
            if let Some(token_id) = &result.token_id {
                lines.push(Line::from(format!("Token: #{token_id}")));
            }
            lines.push(Line::from(format!("Transaction: {}", result.tx_ref)));
            if let Some(link) = &snap.explorer_link {
                lines.push(Line::from(format!("Explorer: {link}")));
            }
        }
        None => lines.push(Line::from("No fortune minted yet.")),
    }
    if let Some(link) = &snap.share_link {
        lines.push(Line::from(Span::styled(
            format!("Share: {link}"),
            Style::default().fg(Color::Cyan),
        )));
    }
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Minted"));
    f.render_widget(widget, area);
}

fn draw_help_bar(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "Enter/m mint | space/c crack | w connect | s share | ? help | q/Esc quit",
    )
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn draw_help_modal(f: &mut Frame) {
    let area = centered_rect(60, 50, f.area());
    let text = vec![
        Line::from("Crack a cookie to reveal a fortune."),
        Line::from("Mint it to seal it onchain for the mint fee."),
        Line::from("Share opens a ready-made cast with your fortune."),
        Line::from(""),
        Line::from("Press any key to close."),
    ];
    f.render_widget(Clear, area);
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("How it works"));
    f.render_widget(widget, area);
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1])[1]
}
