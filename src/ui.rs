use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use typesprint::{leaderboard::ScoreRecord, scorer::ScoreResult, Phase};

use crate::app::{App, Notice};

const HORIZONTAL_MARGIN: u16 = 3;
const VERTICAL_MARGIN: u16 = 1;
const NAME_COLUMN_WIDTH: usize = 20;

const HELP_TEXT: &str = "Typing speed is a mix of speed and accuracy, not just how quickly you type. \
Speed is measured in words per minute (WPM), punctuation included. \
Accuracy is the share of words typed exactly as shown.\n\
Speed (WPM) × Accuracy (%) = Net WPM";

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2), // title
                Constraint::Min(1),    // body
                Constraint::Length(1), // notice
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(Span::styled("Test your typing speed", bold_style))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        match self.session.phase() {
            Phase::Running | Phase::Submitted | Phase::Scored => render_test(self, chunks[1], buf),
            _ => render_idle(self, chunks[1], buf),
        }

        if let Some(notice) = &self.notice {
            let (text, style) = match notice {
                Notice::Info(msg) => (msg.as_str(), Style::default().fg(Color::Green)),
                Notice::Error(msg) => (
                    msg.as_str(),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
            };
            Paragraph::new(Span::styled(text, style))
                .alignment(Alignment::Center)
                .render(chunks[2], buf);
        }

        Paragraph::new(Span::styled(
            legend(self.session.phase()),
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(chunks[3], buf);
    }
}

fn render_idle(app: &App, area: Rect, buf: &mut Buffer) {
    let table_height = u16::try_from(app.leaderboard_size)
        .unwrap_or(u16::MAX)
        .saturating_add(3);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(6),
            Constraint::Length(table_height),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "Press Enter to start the test",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(HELP_TEXT)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("How is your typing speed measured?"),
        )
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);

    leaderboard_table(&app.leaderboard).render(chunks[2], buf);
}

fn render_test(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let scored = app.session.last_result().copied();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // hint + timer
            Constraint::Min(3),    // prompt
            Constraint::Min(3),    // input
            Constraint::Length(if scored.is_some() { 6 } else { 0 }),
        ])
        .split(area);

    let now = app.clock.now();
    let elapsed = app.session.elapsed_secs(now).unwrap_or_default();
    let hint = if app.session.accepts_input() {
        format!("Start typing! Take note of the punctuation.   {elapsed:.1}s")
    } else {
        format!("Time: {elapsed:.2}s")
    };
    Paragraph::new(Span::styled(hint, bold_style)).render(chunks[0], buf);

    Paragraph::new(app.session.prompt().unwrap_or_default())
        .block(Block::default().borders(Borders::ALL).title("Type this"))
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);

    let (input_text, input_style) = if app.session.accepts_input() {
        (format!("{}▏", app.input), Style::default())
    } else {
        (app.input.clone(), dim_style)
    };
    Paragraph::new(input_text)
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title("Your text"))
        .wrap(Wrap { trim: false })
        .render(chunks[2], buf);

    if let Some(result) = scored {
        let result_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(3),
            ])
            .split(chunks[3]);

        Paragraph::new(typed_summary(&result, elapsed))
            .alignment(Alignment::Center)
            .render(result_chunks[0], buf);

        Paragraph::new(result_lines(&result))
            .alignment(Alignment::Center)
            .render(result_chunks[1], buf);

        Paragraph::new(format!("{}▏", app.name))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Your name (Enter to save)"),
            )
            .render(result_chunks[2], buf);
    }
}

/// "You typed N words in X.XX seconds."
pub fn typed_summary(result: &ScoreResult, elapsed_secs: f64) -> String {
    format!(
        "You typed {} words in {elapsed_secs:.2} seconds.",
        result.word_count
    )
}

/// Speed × Accuracy = Net WPM, with the typo count under accuracy
pub fn result_lines(result: &ScoreResult) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let net_style = bold.fg(Color::Magenta);

    vec![
        Line::from(vec![
            Span::styled(format!("{:.2} wpm", result.wpm), bold),
            Span::raw("  ×  "),
            Span::styled(format_accuracy(result.accuracy), bold),
            Span::raw("  =  "),
            Span::styled(format!("{:.2} net wpm", result.net_wpm), net_style),
        ]),
        Line::from(Span::styled(
            format!("{} typo(s)", result.error_count),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ]
}

/// Whole-percent accuracy; negative values are shown as they are
pub fn format_accuracy(accuracy: f64) -> String {
    format!("{:.0}%", accuracy * 100.0)
}

fn leaderboard_table(records: &[ScoreRecord]) -> Table<'static> {
    let header = Row::new(vec!["#", "Name", "WPM", "Accuracy", "Net WPM", "Date"]).style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .fg(Color::Yellow),
    );

    let rows = if records.is_empty() {
        vec![Row::new(vec![Cell::from(""), Cell::from("No scores yet")])]
    } else {
        records
            .iter()
            .enumerate()
            .map(|(idx, record)| present_row(idx + 1, record))
            .collect()
    };

    Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(NAME_COLUMN_WIDTH as u16),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Min(16),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("Leaderboard"))
}

/// Pure presenter for one leaderboard row
pub fn present_row(rank: usize, record: &ScoreRecord) -> Row<'static> {
    let rank_style = match rank {
        1 => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        _ => Style::default(),
    };

    Row::new(vec![
        Cell::from(rank.to_string()).style(rank_style),
        Cell::from(fit_width(&record.name, NAME_COLUMN_WIDTH)),
        Cell::from(format!("{:.2}", record.wpm)),
        Cell::from(format_accuracy(record.accuracy)),
        Cell::from(format!("{:.2}", record.net_wpm)).style(Style::default().fg(Color::Magenta)),
        Cell::from(record.saved_at.format("%Y-%m-%d %H:%M").to_string()),
    ])
}

/// Cut `text` to at most `max` terminal columns, marking the cut with `…`
pub fn fit_width(text: &str, max: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max.saturating_sub(1) {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

fn legend(phase: Phase) -> &'static str {
    match phase {
        Phase::Running => "(enter) submit / (tab) retry / (esc)ape",
        Phase::Submitted => "(tab) retry / (esc)ape",
        Phase::Scored => "(enter) save / (tab) retry / (esc)ape",
        _ => "(enter) start / (esc)ape",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{press, test_app, type_str, PROMPT};
    use chrono::{Local, TimeDelta};
    use crossterm::event::KeyCode;
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();

        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn result(wpm: f64, accuracy: f64, word_count: usize, error_count: usize) -> ScoreResult {
        ScoreResult {
            wpm,
            accuracy,
            net_wpm: wpm * accuracy,
            word_count,
            error_count,
        }
    }

    #[test]
    fn idle_screen_shows_help_and_empty_board() {
        let (app, _, _) = test_app();
        let content = rendered(&app);

        assert!(content.contains("Press Enter to start"));
        assert!(content.contains("How is your typing speed measured?"));
        assert!(content.contains("No scores yet"));
    }

    #[test]
    fn oversized_leaderboard_still_renders() {
        let (mut app, _, _) = test_app();
        for size in [usize::from(u16::MAX), usize::MAX] {
            app.leaderboard_size = size;
            assert!(rendered(&app).contains("Press Enter to start"));
        }
    }

    #[test]
    fn running_screen_shows_prompt_and_input() {
        let (mut app, _, _) = test_app();
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "the qui");

        let content = rendered(&app);
        assert!(content.contains(PROMPT));
        assert!(content.contains("the qui"));
        assert!(content.contains("(enter) submit"));
    }

    #[test]
    fn scored_screen_shows_results() {
        let (mut app, _, clock) = test_app();
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "the quick red fox");
        clock.advance(TimeDelta::seconds(6));
        press(&mut app, KeyCode::Enter);

        let content = rendered(&app);
        assert!(content.contains("You typed 4 words in 6.00 seconds."));
        assert!(content.contains("40.00 wpm"));
        assert!(content.contains("75%"));
        assert!(content.contains("30.00 net wpm"));
        assert!(content.contains("1 typo(s)"));
    }

    #[test]
    fn saved_score_appears_on_leaderboard() {
        let (mut app, _, clock) = test_app();
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, PROMPT);
        clock.advance(TimeDelta::seconds(6));
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "grace");
        press(&mut app, KeyCode::Enter);

        let content = rendered(&app);
        assert!(content.contains("grace"));
        assert!(content.contains("40.00"));
        assert!(content.contains("Saved grace"));
    }

    #[test]
    fn summary_and_result_formatting() {
        let r = result(40.0, 0.75, 4, 1);

        assert_eq!(typed_summary(&r, 6.0), "You typed 4 words in 6.00 seconds.");
        assert_eq!(format_accuracy(0.75), "75%");
        assert_eq!(format_accuracy(1.0), "100%");
        assert_eq!(format_accuracy(-0.5), "-50%");

        let lines = result_lines(&r);
        let first: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(first, "40.00 wpm  ×  75%  =  30.00 net wpm");
    }

    #[test]
    fn fit_width_truncates_by_columns() {
        assert_eq!(fit_width("ada", 20), "ada");
        assert_eq!(fit_width("abcdefghij", 5), "abcd…");
        // wide characters take two columns each
        assert_eq!(fit_width("日本語の名前", 5), "日本…");
    }

    #[test]
    fn present_row_renders_without_panicking() {
        let record = ScoreRecord {
            id: 1,
            name: "a very long name that will not fit".into(),
            wpm: 50.0,
            accuracy: 0.9,
            net_wpm: 45.0,
            saved_at: Local::now(),
        };
        let table = Table::new(vec![present_row(1, &record)], [Constraint::Min(10); 6]);

        let area = Rect::new(0, 0, 80, 3);
        let mut buffer = Buffer::empty(area);
        table.render(area, &mut buffer);
    }
}
