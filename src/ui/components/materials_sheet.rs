use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier as StyleModifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::materials::{LearningMaterial, MaterialIndex};
use crate::model::catalog;
use crate::ui::theme::Theme;

/// Overlay listing curated materials for one modifier code, filterable by
/// source and type facets.
pub struct MaterialsSheet<'a> {
    pub code: u8,
    pub materials: &'a [LearningMaterial],
    pub source_filter: Option<&'a str>,
    pub kind_filter: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> MaterialsSheet<'a> {
    pub fn new(
        code: u8,
        materials: &'a [LearningMaterial],
        source_filter: Option<&'a str>,
        kind_filter: Option<&'a str>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            code,
            materials,
            source_filter,
            kind_filter,
            theme,
        }
    }
}

impl Widget for MaterialsSheet<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let name = catalog::modifier_type(self.code).map_or("?", |t| t.name);

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(format!(" 학습 자료: Code {} ({name}) ", self.code))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let filtered = MaterialIndex::filter(self.materials, self.source_filter, self.kind_filter);

        let mut lines: Vec<Line> = vec![
            Line::from(vec![
                Span::styled("출처: ", Style::default().fg(colors.text_dim())),
                Span::styled(
                    self.source_filter.unwrap_or("전체").to_string(),
                    Style::default().fg(colors.accent()),
                ),
                Span::styled("  종류: ", Style::default().fg(colors.text_dim())),
                Span::styled(
                    self.kind_filter.unwrap_or("전체").to_string(),
                    Style::default().fg(colors.accent()),
                ),
                Span::styled(
                    format!("  ({}건)", filtered.len()),
                    Style::default().fg(colors.text_dim()),
                ),
            ]),
            Line::from(""),
        ];

        if filtered.is_empty() {
            lines.push(Line::from(Span::styled(
                "이 코드에 연결된 자료가 없습니다.",
                Style::default().fg(colors.text_dim()),
            )));
        }
        for material in filtered {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} ", material.filename),
                    Style::default()
                        .fg(colors.fg())
                        .add_modifier(StyleModifier::BOLD),
                ),
                Span::styled(
                    format!("[{}/{}]", material.source, material.kind),
                    Style::default().fg(colors.warning()),
                ),
            ]));
            lines.push(Line::from(Span::styled(
                format!("  {}", material.link),
                Style::default().fg(colors.text_dim()),
            )));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[f] 출처 전환  [t] 종류 전환  [Esc] 닫기",
            Style::default().fg(colors.text_dim()),
        )));

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
