use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier as StyleModifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::arena::{ArenaPhase, ArenaSession};
use crate::model::catalog;
use crate::ui::theme::Theme;

/// The tools sidebar: per-phase guidance, the 17-code keypad with the typed
/// digit buffer during classification, and the static hint for the active
/// modifier type.
pub struct Keypad<'a> {
    session: &'a ArenaSession,
    code_buffer: &'a str,
    theme: &'a Theme,
}

impl<'a> Keypad<'a> {
    pub fn new(session: &'a ArenaSession, code_buffer: &'a str, theme: &'a Theme) -> Self {
        Self {
            session,
            code_buffer,
            theme,
        }
    }
}

impl Widget for Keypad<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" 도구 모음 ")
            .border_style(Style::default().fg(if self.session.phase == ArenaPhase::ClassifyModifier {
                colors.border_focused()
            } else {
                colors.border()
            }))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(inner);

        let guidance = match self.session.phase {
            ArenaPhase::SelectHeadNoun => "1단계: 문장의 주인공 명사를 고르세요.",
            ArenaPhase::ImplicitQuestion => "질문을 읽어보세요...",
            ArenaPhase::SelectModifierSpan => "2단계: 수식어의 시작/끝을 고르세요.",
            ArenaPhase::ClassifyModifier => "3단계: 코드 입력 후 Enter.",
            ArenaPhase::FindMainVerb => "4단계: 진짜 동사를 고르세요.",
            ArenaPhase::SentenceResult => "n: 다음 문장  v: 다시 듣기",
            ArenaPhase::Diagnosis => "진단 결과를 확인하세요.",
        };
        Paragraph::new(Line::from(Span::styled(
            guidance,
            Style::default().fg(colors.accent()),
        )))
        .wrap(Wrap { trim: true })
        .render(layout[0], buf);

        if self.session.phase != ArenaPhase::ClassifyModifier {
            return;
        }

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(Span::styled(
            format!("입력: {}_", self.code_buffer),
            Style::default()
                .fg(colors.token_selected())
                .add_modifier(StyleModifier::BOLD),
        )));
        lines.push(Line::from(""));

        let buffered: Option<u8> = self.code_buffer.parse().ok();
        for row in catalog::MODIFIER_TYPES.chunks(2) {
            let mut spans: Vec<Span> = Vec::new();
            for t in row {
                let highlighted = buffered == Some(t.code);
                let style = if highlighted {
                    Style::default()
                        .fg(colors.token_cursor_fg())
                        .bg(colors.token_cursor_bg())
                } else {
                    Style::default().fg(colors.fg())
                };
                spans.push(Span::styled(format!("{:>2} {:<12}", t.code, t.name), style));
                spans.push(Span::raw("  "));
            }
            lines.push(Line::from(spans));
        }

        lines.push(Line::from(""));
        if let Some(t) = buffered.and_then(catalog::modifier_type) {
            lines.push(Line::from(Span::styled(
                format!("{} · {}", t.full_name, t.hint),
                Style::default().fg(colors.text_dim()),
            )));
            lines.push(Line::from(Span::styled(
                format!("예: {}", t.example),
                Style::default().fg(colors.text_dim()),
            )));
        }
        if let Some(st) = catalog::subject_type(self.session.sentence().subject_type) {
            lines.push(Line::from(Span::styled(
                format!("주어 유형: {} ({})", st.name, st.structure),
                Style::default().fg(colors.accent_dim()),
            )));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(layout[1], buf);
    }
}
