use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier as StyleModifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::arena::diagnosis::Diagnosis;
use crate::model::catalog;
use crate::ui::theme::Theme;

/// End-of-session report card: accuracy, the weakest modifier category with
/// its repair actions, and the feedback line from the decision table.
pub struct DiagnosisView<'a> {
    diagnosis: &'a Diagnosis,
    theme: &'a Theme,
}

impl<'a> DiagnosisView<'a> {
    pub fn new(diagnosis: &'a Diagnosis, theme: &'a Theme) -> Self {
        Self { diagnosis, theme }
    }
}

impl Widget for DiagnosisView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let d = self.diagnosis;

        let block = Block::bordered()
            .title(" 학습 진단 리포트 ")
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let accuracy_color = if d.accuracy >= 80.0 {
            colors.success()
        } else {
            colors.error()
        };

        let mut lines: Vec<Line> = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("문제 수: ", Style::default().fg(colors.text_dim())),
                Span::styled(
                    format!("{}", d.total_questions),
                    Style::default().fg(colors.fg()),
                ),
                Span::raw("   "),
                Span::styled("정답률: ", Style::default().fg(colors.text_dim())),
                Span::styled(
                    format!("{:.0}%", d.accuracy),
                    Style::default()
                        .fg(accuracy_color)
                        .add_modifier(StyleModifier::BOLD),
                ),
            ]),
            Line::from(""),
        ];

        if let Some(code) = d.weakest_modifier_code {
            let name = catalog::modifier_type(code).map_or("?", |t| t.name);
            lines.push(Line::from(vec![
                Span::styled(
                    format!("취약점 발견: Code {code} "),
                    Style::default()
                        .fg(colors.error())
                        .add_modifier(StyleModifier::BOLD),
                ),
                Span::styled(format!("({name})"), Style::default().fg(colors.fg())),
            ]));
            lines.push(Line::from(Span::styled(
                format!("\"{name}\" 유형에서 실수가 잦습니다."),
                Style::default().fg(colors.warning()),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "[g] 문법 수리공에서 개념 복구하기   [m] 관련 자료 열기",
                Style::default().fg(colors.accent()),
            )));
            lines.push(Line::from(""));
        }

        lines.push(Line::from(Span::styled(
            d.feedback,
            Style::default().fg(colors.fg()),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[r] 다시 도전하기   [Esc] 메인으로 나가기",
            Style::default().fg(colors.text_dim()),
        )));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
