use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier as StyleModifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::arena::{ArenaPhase, ArenaSession};
use crate::model::catalog;
use crate::ui::theme::Theme;

/// The sentence board: one styled span per token, a movable token cursor,
/// retired (cleaned) modifier spans dimmed out, plus the implicit-question
/// popup and the result translation.
pub struct SentenceView<'a> {
    session: &'a ArenaSession,
    cursor: Option<usize>,
    theme: &'a Theme,
}

impl<'a> SentenceView<'a> {
    pub fn new(session: &'a ArenaSession, cursor: Option<usize>, theme: &'a Theme) -> Self {
        Self {
            session,
            cursor,
            theme,
        }
    }

    fn token_style(&self, index: usize) -> Style {
        let colors = &self.theme.colors;
        let session = self.session;
        let sentence = session.sentence();
        let phase = session.phase;

        if self.cursor == Some(index) && input_phase(phase) {
            return Style::default()
                .fg(colors.token_cursor_fg())
                .bg(colors.token_cursor_bg())
                .add_modifier(StyleModifier::BOLD);
        }

        // Marks of the in-progress span selection.
        if session.selection_start == Some(index) || session.selection_end == Some(index) {
            return Style::default()
                .fg(colors.token_selected())
                .add_modifier(StyleModifier::BOLD | StyleModifier::UNDERLINED);
        }

        if session.is_cleaned(index) {
            return Style::default()
                .fg(colors.token_cleaned())
                .add_modifier(StyleModifier::CROSSED_OUT);
        }

        // Anchors reveal once the learner has earned them.
        let noun_found = phase != ArenaPhase::SelectHeadNoun;
        if noun_found && index == sentence.head_noun_index {
            return Style::default()
                .fg(colors.token_anchor())
                .add_modifier(StyleModifier::BOLD);
        }
        if phase == ArenaPhase::SentenceResult && index == sentence.main_verb_index {
            return Style::default()
                .fg(colors.token_anchor())
                .add_modifier(StyleModifier::BOLD | StyleModifier::UNDERLINED);
        }

        Style::default().fg(colors.token_pending())
    }
}

fn input_phase(phase: ArenaPhase) -> bool {
    matches!(
        phase,
        ArenaPhase::SelectHeadNoun | ArenaPhase::SelectModifierSpan | ArenaPhase::FindMainVerb
    )
}

impl Widget for SentenceView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let session = self.session;
        let sentence = session.sentence();

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(2),
            ])
            .split(inner);

        // Implicit-question popup while the timer runs.
        if session.phase == ArenaPhase::ImplicitQuestion {
            let question = session
                .active_modifier()
                .and_then(|m| catalog::modifier_type(m.type_code))
                .map_or("어떤?", |t| t.question);
            let popup = Paragraph::new(Line::from(Span::styled(
                format!(" {question} "),
                Style::default()
                    .fg(colors.header_fg())
                    .bg(colors.header_bg())
                    .add_modifier(StyleModifier::BOLD),
            )))
            .alignment(Alignment::Center);
            popup.render(layout[0], buf);
        }

        let mut spans: Vec<Span> = Vec::with_capacity(sentence.tokens.len() * 2);
        for (index, token) in sentence.tokens.iter().enumerate() {
            spans.push(Span::styled(token.clone(), self.token_style(index)));
            if index + 1 < sentence.tokens.len() {
                spans.push(Span::raw(" "));
            }
        }
        let board = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        board.render(layout[1], buf);

        if session.phase == ArenaPhase::SentenceResult {
            let translation = Paragraph::new(Line::from(Span::styled(
                sentence.translation.clone(),
                Style::default().fg(colors.fg()),
            )))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            translation.render(layout[2], buf);
        }
    }
}
