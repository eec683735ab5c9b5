use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use tapspeed::{
    observer::SessionObserver,
    scoring::{SessionSummary, Stats},
    texts::TextSample,
    CharacterState, Lifecycle,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

/// View model kept current by controller notifications
#[derive(Debug)]
pub struct Screen {
    pub text: String,
    pub chars: Vec<char>,
    pub states: Vec<CharacterState>,
    pub stats: Stats,
    pub lifecycle: Lifecycle,
    pub summary: Option<SessionSummary>,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            text: String::new(),
            chars: Vec::new(),
            states: Vec::new(),
            stats: Stats {
                wpm: 0,
                accuracy: 100,
                time_remaining: None,
            },
            lifecycle: Lifecycle::Idle,
            summary: None,
        }
    }
}

impl SessionObserver for Screen {
    fn on_sample_loaded(&mut self, sample: &TextSample) {
        self.text = sample.text.clone();
        self.chars = sample.text.chars().collect();
        self.states = vec![CharacterState::Untouched; self.chars.len()];
        self.summary = None;
    }

    fn on_character_state_changed(&mut self, index: usize, state: CharacterState) {
        if let Some(slot) = self.states.get_mut(index) {
            *slot = state;
        }
    }

    fn on_stats_updated(&mut self, stats: Stats) {
        self.stats = stats;
    }

    fn on_session_complete(&mut self, summary: &SessionSummary) {
        self.summary = Some(*summary);
    }

    fn on_lifecycle_changed(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }
}

fn char_style(state: CharacterState) -> Style {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);

    match state {
        CharacterState::Correct => Style::default().patch(bold_style).fg(Color::Green),
        CharacterState::Incorrect => Style::default().patch(bold_style).fg(Color::Red),
        CharacterState::Current => Style::default()
            .patch(dim_bold_style)
            .add_modifier(Modifier::UNDERLINED),
        CharacterState::Untouched => dim_bold_style,
    }
}

/// Passage split into runs of equally styled characters
fn prompt_spans(screen: &Screen) -> Vec<Span<'static>> {
    let runs = screen
        .chars
        .iter()
        .zip(&screen.states)
        .chunk_by(|(_, state)| **state);

    let mut spans = Vec::new();
    for (state, run) in &runs {
        let text: String = run
            .map(|(c, _)| match (state, c) {
                // make missed spaces visible
                (CharacterState::Incorrect, ' ') => '·',
                (_, c) => *c,
            })
            .collect();
        spans.push(Span::styled(text, char_style(state)));
    }
    spans
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let screen = self.controller.observer();
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let prompt_lines = if screen.text.width() <= max_chars_per_line as usize {
            1
        } else {
            (screen.text.width() as f64 / max_chars_per_line as f64).ceil() as u16 + 1
        };
        let results_lines = if screen.summary.is_some() { 4 } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1),             // header
                Constraint::Min(0),                // padding
                Constraint::Length(2),             // live stats
                Constraint::Length(prompt_lines),  // passage
                Constraint::Length(results_lines), // results
                Constraint::Min(0),                // padding
                Constraint::Length(1),             // legend
            ])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled("tapspeed", bold_style.fg(Color::Cyan)),
            Span::styled(
                format!(
                    "   mode: {}   difficulty: {}   best: {} wpm",
                    self.controller.mode(),
                    self.controller.difficulty(),
                    self.controller.personal_best()
                ),
                dim_style,
            ),
        ]));
        header.render(chunks[0], buf);

        let mut stats_text = format!("{} wpm   {}% acc", screen.stats.wpm, screen.stats.accuracy);
        if let Some(secs) = screen.stats.time_remaining {
            stats_text.push_str(&format!("   {}s", secs));
        }
        Paragraph::new(Span::styled(stats_text, bold_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        Paragraph::new(Line::from(prompt_spans(screen)))
            .alignment(if prompt_lines == 1 {
                Alignment::Center
            } else {
                Alignment::Left
            })
            .wrap(Wrap { trim: false })
            .render(chunks[3], buf);

        if let Some(summary) = &screen.summary {
            let mut lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!(
                        "{} wpm   {}% acc   {}/{} chars",
                        summary.wpm, summary.accuracy, summary.chars_typed, summary.total_chars
                    ),
                    bold_style,
                )),
                Line::from(Span::styled(summary.headline(), italic_style)),
            ];
            if summary.is_new_best {
                lines.push(Line::from(Span::styled(
                    format!("previous best: {} wpm", summary.previous_best),
                    Style::default().fg(Color::Yellow),
                )));
            }
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .render(chunks[4], buf);
        }

        let legend = match screen.lifecycle {
            Lifecycle::Active => "(tab) restart / (esc)ape",
            Lifecycle::Idle | Lifecycle::Complete => {
                "(tab) new text / (←→) difficulty / (↑↓) mode / (esc)ape"
            }
        };
        Paragraph::new(Span::styled(legend, italic_style)).render(chunks[6], buf);
    }
}
