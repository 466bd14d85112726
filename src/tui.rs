use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
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

use crate::app::{App, ProgressEvent, ProgressSink};
use crate::client::SubmissionsClient;
use crate::environment::Environment;
use crate::render::{self, SampleList};
use crate::resolver::Resolution;
use crate::schema::FieldRow;
use crate::search::{CardId, PageView, SearchPage};

const LOGS_MAX: usize = 200;
const INVALID_INPUT: &str = "Please enter a search term";
const SEARCH_HINT: &str = "Search on a Biosample ID, a Specimen ID or a Biospecimen ID";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Search,
    Logs,
    Help,
}

enum WorkerMessage {
    Resolved { seq: u64, resolution: Resolution },
    Environment(Environment),
}

#[derive(Debug)]
struct UiState {
    status: String,
    latency_ms: Option<u128>,
    logs: VecDeque<String>,
}

struct TuiProgress {
    state: Arc<Mutex<UiState>>,
}

impl ProgressSink for TuiProgress {
    fn event(&self, event: ProgressEvent) {
        if let Ok(mut state) = self.state.lock() {
            let message = event.message.trim().to_string();
            if let Some(payload) = parse_phase(&message) {
                state.status = payload.to_string();
            }
            if let Some(elapsed) = event.elapsed {
                state.latency_ms = Some(elapsed.as_millis());
            }
            push_log(&mut state.logs, format!("[{}] {message}", timestamp()));
        }
    }
}

/// Interactive search page: one input line, result cards below, and a
/// full-record view for the selected card.
pub struct Tui<C: SubmissionsClient + 'static> {
    app: Arc<App<C>>,
    api_label: String,
    environment: Environment,
    state: Arc<Mutex<UiState>>,
    page: SearchPage,
    view: View,
    input: String,
    history: Vec<String>,
    selected: usize,
    detail_scroll: u16,
    log_scroll: u16,
    tx: Sender<WorkerMessage>,
    rx: Receiver<WorkerMessage>,
}

impl<C: SubmissionsClient + 'static> Tui<C> {
    pub fn new(app: App<C>, api_label: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            app: Arc::new(app),
            api_label: api_label.into(),
            environment: Environment::default(),
            state: Arc::new(Mutex::new(UiState {
                status: "ready".to_string(),
                latency_ms: None,
                logs: VecDeque::new(),
            })),
            page: SearchPage::new(),
            view: View::Search,
            input: String::new(),
            history: Vec::new(),
            selected: 0,
            detail_scroll: 0,
            log_scroll: 0,
            tx,
            rx,
        }
    }

    pub fn run(&mut self) -> miette::Result<()> {
        self.detect_environment();

        let mut stdout = io::stdout();
        enable_raw_mode().into_diagnostic()?;
        stdout.execute(EnterAlternateScreen).into_diagnostic()?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).into_diagnostic()?;
        terminal.clear().into_diagnostic()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode().into_diagnostic()?;
        let mut stdout = io::stdout();
        stdout.execute(LeaveAlternateScreen).into_diagnostic()?;
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> miette::Result<()> {
        let mut tick = 0usize;
        loop {
            self.drain_worker_messages();
            terminal
                .draw(|frame| draw_ui(frame, self, tick))
                .into_diagnostic()?;

            if event::poll(Duration::from_millis(120)).into_diagnostic()? {
                if let Event::Key(key) = event::read().into_diagnostic()? {
                    if self.handle_key(key) {
                        return Ok(());
                    }
                }
            }
            tick = tick.wrapping_add(1);
        }
    }

    fn detect_environment(&self) {
        let app = Arc::clone(&self.app);
        let tx = self.tx.clone();
        let sink = TuiProgress {
            state: Arc::clone(&self.state),
        };
        thread::spawn(move || {
            let environment = app.environment(&sink);
            // the receiver is gone once the UI has exited
            let _ = tx.send(WorkerMessage::Environment(environment));
        });
    }

    fn submit(&mut self) {
        let Some(ticket) = self.page.submit(&self.input) else {
            self.log("empty search term rejected".to_string());
            return;
        };
        let term = ticket.term.to_string();
        if self.history.last() != Some(&term) {
            self.history.push(term.clone());
        }
        if let Ok(mut state) = self.state.lock() {
            state.status = format!("searching {term}");
        }

        let app = Arc::clone(&self.app);
        let tx = self.tx.clone();
        let sink = TuiProgress {
            state: Arc::clone(&self.state),
        };
        let seq = ticket.seq;
        thread::spawn(move || match app.search(&term, &sink) {
            Ok(report) => {
                let _ = tx.send(WorkerMessage::Resolved {
                    seq,
                    resolution: report.resolution,
                });
            }
            Err(err) => sink.event(ProgressEvent {
                message: format!("search failed: {err}"),
                elapsed: None,
            }),
        });
    }

    fn drain_worker_messages(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            match message {
                WorkerMessage::Resolved { seq, resolution } => {
                    if self.page.apply(seq, resolution) {
                        self.selected = 0;
                        self.detail_scroll = 0;
                    } else {
                        self.log(format!("dropped stale result for search #{seq}"));
                    }
                }
                WorkerMessage::Environment(environment) => {
                    self.log(format!("environment: {environment}"));
                    self.environment = environment;
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        if let Some(id) = self.page.open_detail_card().cloned() {
            match key.code {
                KeyCode::Esc | KeyCode::F(2) | KeyCode::Enter => {
                    self.page.close_detail(&id);
                    self.detail_scroll = 0;
                }
                KeyCode::Up => self.detail_scroll = self.detail_scroll.saturating_sub(1),
                KeyCode::Down => self.detail_scroll = self.detail_scroll.saturating_add(1),
                KeyCode::PageUp => self.detail_scroll = self.detail_scroll.saturating_sub(10),
                KeyCode::PageDown => self.detail_scroll = self.detail_scroll.saturating_add(10),
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::F(1) => self.toggle_view(View::Help),
            KeyCode::F(4) => self.toggle_view(View::Logs),
            KeyCode::F(2) => self.open_selected(),
            KeyCode::Esc => {
                if self.view != View::Search {
                    self.view = View::Search;
                } else {
                    return true;
                }
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                let last = self.page.cards().count().saturating_sub(1);
                self.selected = (self.selected + 1).min(last);
            }
            KeyCode::PageUp => self.scroll_logs(5),
            KeyCode::PageDown => self.scroll_logs(-5),
            KeyCode::Tab => {
                if let Some(best) = self.best_history_match() {
                    self.input = best;
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(ch) => {
                self.input.push(ch);
                self.page.clear_invalid();
            }
            _ => {}
        }
        false
    }

    fn toggle_view(&mut self, view: View) {
        self.view = if self.view == view {
            View::Search
        } else {
            view
        };
    }

    fn open_selected(&mut self) {
        let Some(id) = self.page.cards().nth(self.selected).cloned() else {
            return;
        };
        if self.page.open_detail(&id) {
            self.detail_scroll = 0;
        }
    }

    fn best_history_match(&self) -> Option<String> {
        let needle = self.input.trim();
        if needle.is_empty() {
            return None;
        }
        self.history
            .iter()
            .rev()
            .filter_map(|entry| fuzzy_score(needle, entry).map(|score| (score, entry)))
            .min_by_key(|(score, _)| *score)
            .map(|(_, entry)| entry.clone())
    }

    fn scroll_logs(&mut self, delta: i16) {
        let max = self.state.lock().map(|state| state.logs.len()).unwrap_or(0);
        let max_scroll = max.saturating_sub(1) as i16;
        let next = (self.log_scroll as i16 + delta).clamp(0, max_scroll);
        self.log_scroll = next as u16;
    }

    fn log(&self, message: String) {
        tracing::debug!("{message}");
        if let Ok(mut state) = self.state.lock() {
            push_log(&mut state.logs, format!("[{}] {message}", timestamp()));
        }
    }
}

fn draw_ui<C: SubmissionsClient + 'static>(frame: &mut ratatui::Frame, tui: &Tui<C>, tick: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(4),
        ])
        .split(frame.area());

    frame.render_widget(draw_header(tui, tick), chunks[0]);
    match tui.view {
        View::Search => match tui.page.open_detail_card() {
            Some(id) => frame.render_widget(draw_detail(tui, id), chunks[1]),
            None => frame.render_widget(draw_results(tui), chunks[1]),
        },
        View::Logs => frame.render_widget(draw_logs_view(tui), chunks[1]),
        View::Help => frame.render_widget(draw_help(), chunks[1]),
    }
    draw_command_line(frame, tui, chunks[2]);
}

fn draw_header<C: SubmissionsClient + 'static>(tui: &Tui<C>, tick: usize) -> Paragraph<'static> {
    let brand_color = if tui.environment.is_production() {
        Color::Cyan
    } else {
        Color::Yellow
    };
    let busy = if tui.page.is_pending() {
        ["|", "/", "-", "\\"][tick % 4]
    } else {
        " "
    };
    let (status, latency) = tui
        .state
        .lock()
        .map(|state| (state.status.clone(), state.latency_ms))
        .unwrap_or_else(|_| ("ready".to_string(), None));
    let latency = latency
        .map(|value| format!("{value} ms"))
        .unwrap_or_else(|| "--".to_string());

    let brand_line = Line::from(vec![
        Span::styled(
            tui.environment.brand(),
            Style::default()
                .fg(brand_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(env!("CARGO_PKG_VERSION"), Style::default().fg(Color::Gray)),
        Span::raw("   API: "),
        Span::styled(tui.api_label.clone(), Style::default().fg(Color::Gray)),
        Span::raw("   "),
        Span::styled(busy, Style::default().fg(Color::Green)),
    ]);
    let status_line = Line::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::Gray)),
        Span::raw(status),
        Span::styled("   Last search: ", Style::default().fg(Color::Gray)),
        Span::raw(latency),
    ]);
    Paragraph::new(vec![brand_line, status_line])
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::BOTTOM))
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
}

fn field_lines(rows: &[FieldRow], indent: &str) -> Vec<Line<'static>> {
    let width = rows.iter().map(|row| row.label.len()).max().unwrap_or(0);
    rows.iter()
        .map(|row| {
            Line::from(vec![
                Span::raw(indent.to_string()),
                Span::styled(
                    format!("{:<width$}  ", row.label),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(row.value.clone()),
            ])
        })
        .collect()
}

fn card_marker(selected: bool, key: &str) -> Line<'static> {
    let style = if selected {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let pointer = if selected { "> " } else { "  " };
    Line::from(Span::styled(format!("{pointer}{key}"), style))
}

fn draw_results<C: SubmissionsClient + 'static>(tui: &Tui<C>) -> Paragraph<'static> {
    let (lines, selected_line) = result_lines(&tui.page, tui.selected);
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::NONE))
        .wrap(Wrap { trim: false })
        .scroll((scroll_offset(selected_line), 0))
}

/// Lines of the results pane, plus the index of the selected card's marker.
fn result_lines(page: &SearchPage, selected: usize) -> (Vec<Line<'static>>, Option<usize>) {
    let mut lines = Vec::new();
    let mut selected_line = None;
    let mut card_index = 0usize;
    let mut push_marker = |lines: &mut Vec<Line<'static>>, card_index: usize, key: &str| {
        if card_index == selected {
            selected_line = Some(lines.len());
        }
        lines.push(card_marker(card_index == selected, key));
    };
    match page.view() {
        PageView::Idle => {
            lines.push(Line::from(Span::styled(
                SEARCH_HINT,
                Style::default().fg(Color::Gray),
            )));
        }
        PageView::NoResults { failures } => {
            lines.push(heading(render::NO_RESULTS));
            push_failure_notice(&mut lines, failures.len());
        }
        PageView::Results {
            sample,
            specimen,
            failures,
        } => {
            if let Some(sample) = sample {
                lines.push(heading(render::SAMPLE_FOUND));
                push_marker(&mut lines, card_index, "sample");
                lines.extend(field_lines(&render::sample_summary(sample), "    "));
                card_index += 1;
                lines.push(Line::from(""));
            }
            if let Some(specimen) = specimen {
                lines.push(heading(render::SPECIMEN_FOUND));
                lines.push(Line::from(format!("Specimen ID: {}", specimen.specimen_id)));
                lines.push(Line::from(format!(
                    "Biospecimen ID: {}",
                    specimen.biospecimen_id
                )));
                match specimen.samples {
                    SampleList::Empty => lines.push(Line::from(render::NO_SPECIMEN_SAMPLES)),
                    SampleList::Items(items) => {
                        lines.push(Line::from(render::WITH_SAMPLES));
                        for (key, sample) in items {
                            push_marker(&mut lines, card_index, &key.to_string());
                            lines.extend(field_lines(&render::sample_summary(sample), "    "));
                            card_index += 1;
                        }
                    }
                }
            }
            push_failure_notice(&mut lines, failures.len());
        }
    }
    (lines, selected_line)
}

/// Keeps two lines of context above the selected card's marker.
fn scroll_offset(selected_line: Option<usize>) -> u16 {
    selected_line
        .map(|line| line.saturating_sub(2))
        .map_or(0, |line| u16::try_from(line).unwrap_or(u16::MAX))
}

fn push_failure_notice(lines: &mut Vec<Line<'static>>, count: usize) {
    if count > 0 {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            render::failure_notice(count),
            Style::default().fg(Color::Yellow),
        )));
    }
}

fn draw_detail<C: SubmissionsClient + 'static>(tui: &Tui<C>, id: &CardId) -> Paragraph<'static> {
    let title = match id {
        CardId::Found => render::DETAIL_TITLE.to_string(),
        CardId::Nested(key) => format!("{} ({key})", render::DETAIL_TITLE),
    };
    let lines = tui
        .page
        .card_sample(id)
        .map(|sample| field_lines(&render::sample_detail(sample), ""))
        .unwrap_or_default();
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((tui.detail_scroll, 0))
}

fn draw_logs_view<C: SubmissionsClient + 'static>(tui: &Tui<C>) -> Paragraph<'static> {
    let logs: Vec<String> = tui
        .state
        .lock()
        .map(|state| state.logs.iter().cloned().collect())
        .unwrap_or_default();
    let visible = 20usize;
    let start = logs
        .len()
        .saturating_sub(tui.log_scroll as usize + visible);
    let mut lines = Vec::with_capacity(visible + 1);
    lines.push(heading("LOGS (scrollable)"));
    for line in logs.iter().skip(start).take(visible) {
        lines.push(Line::from(line.clone()));
    }
    Paragraph::new(lines)
        .block(Block::default())
        .wrap(Wrap { trim: true })
}

fn draw_help() -> Paragraph<'static> {
    let lines = vec![
        Line::from("Enter search   Up/Down select sample   F2 sample details"),
        Line::from("F1 help   F4 logs   Tab complete from history   Esc back/quit"),
        Line::from(SEARCH_HINT),
        Line::from("In the detail view: Up/Down/PgUp/PgDown scroll, Esc or F2 close"),
    ];
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: true })
}

fn draw_command_line<C: SubmissionsClient + 'static>(
    frame: &mut ratatui::Frame,
    tui: &Tui<C>,
    area: Rect,
) {
    let prefix = "Search: ";
    let input_style = if tui.page.input_invalid() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::White)
    };
    let feedback = if tui.page.input_invalid() {
        Span::styled(INVALID_INPUT, Style::default().fg(Color::Red))
    } else {
        Span::styled(
            "Enter search  F2 details  F1 help  F4 logs  Esc quit",
            Style::default().fg(Color::DarkGray),
        )
    };
    let lines = vec![
        Line::from(vec![
            Span::styled(
                prefix,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(tui.input.clone(), input_style),
        ]),
        Line::from(feedback),
    ];
    let para = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
    frame.render_widget(para, area);

    let mut cursor_x = area
        .x
        .saturating_add((prefix.len() + tui.input.chars().count()) as u16);
    if cursor_x >= area.x.saturating_add(area.width) {
        cursor_x = area.x.saturating_add(area.width.saturating_sub(1));
    }
    frame.set_cursor_position((cursor_x, area.y.saturating_add(1)));
}

fn parse_phase(message: &str) -> Option<&str> {
    message
        .strip_prefix("phase=")
        .and_then(|rest| rest.split_once(';'))
        .map(|(_, payload)| payload.trim())
}

fn push_log(buffer: &mut VecDeque<String>, item: String) {
    buffer.push_back(item);
    while buffer.len() > LOGS_MAX {
        buffer.pop_front();
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

fn fuzzy_score(needle: &str, hay: &str) -> Option<usize> {
    let mut score = 0usize;
    let mut iter = hay.chars();
    for ch in needle.chars() {
        let mut found = false;
        for h in iter.by_ref() {
            score += 1;
            if h.eq_ignore_ascii_case(&ch) {
                found = true;
                break;
            }
        }
        if !found {
            return None;
        }
    }
    Some(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_payload() {
        assert_eq!(parse_phase("phase=Resolve; searching A"), Some("searching A"));
        assert_eq!(parse_phase("search failed"), None);
    }

    #[test]
    fn fuzzy_matches_in_order() {
        assert!(fuzzy_score("sam1", "SAMEA1").is_some());
        assert!(fuzzy_score("1sam", "SAMEA1").is_none());
    }

    #[test]
    fn log_buffer_is_bounded() {
        let mut logs = VecDeque::new();
        for i in 0..(LOGS_MAX + 5) {
            push_log(&mut logs, i.to_string());
        }
        assert_eq!(logs.len(), LOGS_MAX);
        assert_eq!(logs.front().map(String::as_str), Some("5"));
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn page_with_sample_and_specimen() -> SearchPage {
        let sample = |accession: &str| crate::model::Sample {
            biosample_accession: Some(accession.to_string()),
            ..crate::model::Sample::default()
        };
        let mut page = SearchPage::new();
        let ticket = page.submit("SAMEA1").unwrap();
        page.apply(
            ticket.seq,
            Resolution {
                sample: Some(sample("SAMEA1")),
                specimen: Some(crate::model::Specimen {
                    specimen_id: Some("SPEC1".to_string()),
                    biospecimen_id: Some("BIO1".to_string()),
                    samples: vec![sample("SAMEA2"), sample("SAMEA3"), sample("SAMEA4")],
                }),
                ..Resolution::default()
            },
        );
        page
    }

    #[test]
    fn selected_marker_line_is_tracked() {
        let page = page_with_sample_and_specimen();
        for (selected, key) in ["sample", "SAMEA2", "SAMEA3", "SAMEA4"].iter().enumerate() {
            let (lines, selected_line) = result_lines(&page, selected);
            let index = selected_line.unwrap();
            assert_eq!(line_text(&lines[index]), format!("> {key}"));
        }
    }

    #[test]
    fn scroll_follows_the_selected_marker() {
        let page = page_with_sample_and_specimen();
        let (_, last) = result_lines(&page, 3);
        let last = last.unwrap();
        let rows = crate::schema::SUMMARY_FIELDS.len();
        assert_eq!(last, 3 * rows + 9);
        assert_eq!(scroll_offset(Some(last)) as usize, last - 2);
        assert_eq!(scroll_offset(Some(1)), 0);
        assert_eq!(scroll_offset(None), 0);
    }

    #[test]
    fn pending_first_search_shows_no_results() {
        let mut page = SearchPage::new();
        page.submit("SAMEA1").unwrap();
        let (lines, selected_line) = result_lines(&page, 0);
        assert_eq!(line_text(&lines[0]), render::NO_RESULTS);
        assert_eq!(selected_line, None);
    }
}
