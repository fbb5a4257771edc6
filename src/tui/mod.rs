//! Ratatui-based interactive client.
//!
//! The TUI provides an input panel for the nine stone attributes, runs a
//! prediction on demand (in-process or against the HTTP API), and keeps a
//! short history of results.
//!
//! Categorical choices are always taken from the backend's options metadata.

use std::io;
use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::pipeline::PredictPipeline;
use crate::cli::TuiArgs;
use crate::client::ApiClient;
use crate::config::Settings;
use crate::domain::{FEATURE_COLUMNS, Field, RawRecord};
use crate::error::AppError;
use crate::report::format_price;
use crate::service::{self, CategoryOptions, HealthStatus, PredictResponse};

/// Keep at most this many past predictions on screen.
const HISTORY_LEN: usize = 10;

/// Start the TUI.
pub fn run(args: TuiArgs, settings: &Settings) -> Result<(), AppError> {
    let backend = if args.local {
        Backend::Local(PredictPipeline::new(crate::app::artifact_store(&args.artifacts, settings)))
    } else {
        let url = args.api_url.clone().unwrap_or_else(|| settings.api_url.clone());
        Backend::Remote(ApiClient::new(url)?)
    };

    let _guard = TerminalGuard::new()?;

    let term_backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(term_backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(backend);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Where predictions come from.
enum Backend {
    Local(PredictPipeline),
    Remote(ApiClient),
}

impl Backend {
    fn label(&self) -> String {
        match self {
            Backend::Local(_) => "local".to_string(),
            Backend::Remote(client) => client.base_url().to_string(),
        }
    }

    fn options(&self) -> Result<CategoryOptions, AppError> {
        match self {
            Backend::Local(_) => Ok(CategoryOptions::current()),
            Backend::Remote(client) => client.options(),
        }
    }

    fn health(&self) -> Result<HealthStatus, AppError> {
        match self {
            Backend::Local(pipeline) => Ok(service::health(pipeline)),
            Backend::Remote(client) => client.health(),
        }
    }

    fn predict(&self, record: &RawRecord) -> Result<PredictResponse, AppError> {
        match self {
            Backend::Local(pipeline) => Ok(service::respond(pipeline, record.clone())),
            Backend::Remote(client) => client.predict(record),
        }
    }
}

struct HistoryEntry {
    at: DateTime<Local>,
    record: RawRecord,
    price: f64,
}

struct App {
    backend: Backend,
    options: Option<CategoryOptions>,
    record: RawRecord,
    selected: usize,
    connected: Option<bool>,
    last: Option<PredictResponse>,
    history: Vec<HistoryEntry>,
    show_raw: bool,
    status: String,
}

impl App {
    fn new(backend: Backend) -> Self {
        let mut app = Self {
            backend,
            options: None,
            record: RawRecord::client_default(),
            selected: 0,
            connected: None,
            last: None,
            history: Vec::new(),
            show_raw: false,
            status: String::new(),
        };
        app.refresh_connection();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100)).map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < FEATURE_COLUMNS.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Left => self.adjust(-1.0),
            KeyCode::Right => self.adjust(1.0),
            KeyCode::PageDown => self.adjust(-10.0),
            KeyCode::PageUp => self.adjust(10.0),
            KeyCode::Enter | KeyCode::Char('p') => self.predict(),
            KeyCode::Char('h') => self.refresh_connection(),
            KeyCode::Char('j') => self.show_raw = !self.show_raw,
            KeyCode::Char('c') => {
                self.history.clear();
                self.status = "History cleared.".to_string();
            }
            KeyCode::Char('r') => {
                self.record = RawRecord::client_default();
                self.status = "Inputs reset.".to_string();
            }
            _ => {}
        }
        false
    }

    /// Move the selected input by `steps` increments (categories cycle by one).
    fn adjust(&mut self, steps: f64) {
        match FEATURE_COLUMNS[self.selected] {
            Field::Numeric(field) => {
                let range = self
                    .options
                    .as_ref()
                    .map(|o| o.range(field))
                    .unwrap_or_else(|| field.conventional_range());
                let value = self.record.numeric_mut(field);
                let next = range.clamp(*value + steps * range.step);
                // Snap to the step grid so repeated presses don't accumulate drift.
                *value = (next / range.step).round() * range.step;
            }
            Field::Categorical(field) => {
                let Some(options) = &self.options else {
                    self.status = "Category options unavailable (h to retry).".to_string();
                    return;
                };
                let choices = options.for_field(field);
                if choices.is_empty() {
                    return;
                }
                let current = self.record.categorical_mut(field);
                let idx = choices.iter().position(|c| c.as_str() == current.as_str()).unwrap_or(0);
                let n = choices.len() as i64;
                let next = (idx as i64 + steps.signum() as i64).rem_euclid(n) as usize;
                *current = choices[next].clone();
            }
        }
    }

    fn refresh_connection(&mut self) {
        match self.backend.health() {
            Ok(health) => {
                self.connected = Some(true);
                self.status = format!("API {} (artifacts {})", health.status, health.artifacts);
            }
            Err(err) => {
                self.connected = Some(false);
                self.status = err.to_string();
                return;
            }
        }
        match self.backend.options() {
            Ok(options) => self.options = Some(options),
            Err(err) => self.status = err.to_string(),
        }
    }

    fn predict(&mut self) {
        self.status = "Calculating price...".to_string();
        match self.backend.predict(&self.record) {
            Ok(response) => {
                match &response {
                    PredictResponse::Success { predicted_price, .. } => {
                        self.history.insert(
                            0,
                            HistoryEntry {
                                at: Local::now(),
                                record: self.record.clone(),
                                price: *predicted_price,
                            },
                        );
                        self.history.truncate(HISTORY_LEN);
                        self.status = "Price prediction completed successfully!".to_string();
                    }
                    PredictResponse::Error { message, .. } => {
                        self.status = message.clone();
                    }
                }
                self.last = Some(response);
                self.connected = Some(true);
            }
            Err(err) => {
                self.connected = Some(false);
                self.status = err.to_string();
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (conn_text, conn_color) = match self.connected {
            Some(true) => ("API Connected", Color::Green),
            Some(false) => ("No Connection", Color::Red),
            None => ("Checking...", Color::Yellow),
        };
        let line = Line::from(vec![
            Span::styled("gem", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" - gemstone price predictor | backend: "),
            Span::styled(self.backend.label(), Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(conn_text, Style::default().fg(conn_color)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(36), Constraint::Min(0)])
            .split(area);

        self.draw_inputs(frame, cols[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(7), Constraint::Length((HISTORY_LEN + 2) as u16)])
            .split(cols[1]);

        self.draw_result(frame, right[0]);
        self.draw_history(frame, right[1]);
    }

    fn draw_inputs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = FEATURE_COLUMNS
            .iter()
            .map(|field| {
                let value = match field {
                    Field::Numeric(f) => format!("{:.1} {}", self.record.numeric(*f), f.unit()),
                    Field::Categorical(f) => self.record.categorical(*f).to_string(),
                };
                ListItem::new(format!("{:<8} {value}", field.name()))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Inputs").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Prediction Result").borders(Borders::ALL);

        let Some(response) = &self.last else {
            let p = Paragraph::new("Press Enter to predict.")
                .style(Style::default().fg(Color::Gray))
                .block(block);
            frame.render_widget(p, area);
            return;
        };

        let mut lines: Vec<Line> = Vec::new();
        match response {
            PredictResponse::Success { predicted_price, .. } => {
                lines.push(Line::from(Span::styled(
                    format_price(*predicted_price),
                    Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
                )));
            }
            PredictResponse::Error { error_kind, message } => {
                lines.push(Line::from(Span::styled(
                    format!("[{}] {message}", error_kind.as_str()),
                    Style::default().fg(Color::Red),
                )));
            }
        }

        if self.show_raw {
            lines.push(Line::raw(""));
            let raw = serde_json::to_string_pretty(response).unwrap_or_else(|e| format!("<unprintable: {e}>"));
            lines.extend(raw.lines().map(|l| Line::raw(l.to_string())));
        }

        let p = Paragraph::new(Text::from(lines))
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false })
            .block(block);
        frame.render_widget(p, area);
    }

    fn draw_history(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .history
            .iter()
            .map(|h| {
                ListItem::new(format!(
                    "{}  {:.2}ct {:<9} {} {:<4}  {:>12}",
                    h.at.format("%H:%M:%S"),
                    h.record.carat,
                    h.record.cut,
                    h.record.color,
                    h.record.clarity,
                    format_price(h.price)
                ))
            })
            .collect();
        let list = List::new(items).block(Block::default().title("History").borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  PgUp/PgDn ×10  Enter predict  j raw  h health  r reset  c clear  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoricalField, NumericField};

    fn local_app() -> App {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");
        let pipeline = PredictPipeline::from_paths(format!("{dir}/model.json"), format!("{dir}/preprocessor.json"));
        App::new(Backend::Local(pipeline))
    }

    fn select(app: &mut App, name: &str) {
        app.selected = FEATURE_COLUMNS.iter().position(|f| f.name() == name).unwrap();
    }

    #[test]
    fn numeric_adjust_clamps_to_range() {
        let mut app = local_app();
        select(&mut app, "carat");
        for _ in 0..100 {
            app.adjust(10.0);
        }
        assert!((app.record.numeric(NumericField::Carat) - 5.0).abs() < 1e-9);
        for _ in 0..100 {
            app.adjust(-1.0);
        }
        assert!((app.record.numeric(NumericField::Carat) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn categorical_adjust_cycles_backend_options() {
        let mut app = local_app();
        assert_eq!(app.connected, Some(true));
        select(&mut app, "cut");
        assert_eq!(app.record.categorical(CategoricalField::Cut), "Ideal");
        app.adjust(1.0);
        assert_eq!(app.record.categorical(CategoricalField::Cut), "Fair");
        app.adjust(-1.0);
        app.adjust(-1.0);
        assert_eq!(app.record.categorical(CategoricalField::Cut), "Premium");
    }

    #[test]
    fn predict_records_history() {
        let mut app = local_app();
        app.handle_key(KeyCode::Enter);
        assert!(matches!(app.last, Some(PredictResponse::Success { .. })));
        assert_eq!(app.history.len(), 1);
        assert!(app.history[0].price.is_finite());
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn predict_failure_is_reported_not_recorded() {
        let pipeline = PredictPipeline::from_paths("/nonexistent/model.json", "/nonexistent/pre.json");
        let mut app = App::new(Backend::Local(pipeline));
        app.predict();
        assert!(matches!(app.last, Some(PredictResponse::Error { .. })));
        assert!(app.history.is_empty());
        assert!(app.status.contains("failed to load"), "{}", app.status);
    }
}
