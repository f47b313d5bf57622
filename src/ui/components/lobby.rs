use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier as StyleModifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::model::Difficulty;
use crate::progress::ProgressState;
use crate::ui::theme::Theme;

pub struct LobbyItem {
    pub key: &'static str,
    pub label: String,
    pub description: String,
    pub enabled: bool,
}

/// Entry screen: the three difficulty sessions, the landfill review, custom
/// text input, and the jump to the grammar engine.
pub struct Lobby<'a> {
    pub items: Vec<LobbyItem>,
    pub selected: usize,
    pub notice: Option<&'a str>,
    pub progress: &'a ProgressState,
    pub theme: &'a Theme,
}

impl<'a> Lobby<'a> {
    pub fn new(progress: &'a ProgressState, notice: Option<&'a str>, theme: &'a Theme) -> Self {
        let mut items: Vec<LobbyItem> = Difficulty::ALL
            .iter()
            .enumerate()
            .map(|(i, &d)| LobbyItem {
                key: ["1", "2", "3"][i],
                label: format!("{} Session", capitalize(d.as_str())),
                description: match d {
                    Difficulty::Beginner => "수식어 1개짜리 기본 문장".to_string(),
                    Difficulty::Intermediate => "수식어 1-2개, 함정 포함".to_string(),
                    Difficulty::Advanced => "복합 구조 + 준동사 함정".to_string(),
                },
                enabled: progress.unlocked_levels.contains(&d),
            })
            .collect();
        items.push(LobbyItem {
            key: "l",
            label: "오답 매립지 (Landfill Review)".to_string(),
            description: format!("복습 대기 문장 {}개", progress.landfill.len()),
            enabled: !progress.landfill.is_empty(),
        });
        items.push(LobbyItem {
            key: "p",
            label: "내 지문으로 학습하기".to_string(),
            description: "붙여넣은 영어 지문을 분석해 출제 (네트워크 필요)".to_string(),
            enabled: true,
        });
        items.push(LobbyItem {
            key: "g",
            label: "문법 수리공 (Grammar Fixer)".to_string(),
            description: "개념 → 퀴즈 → 구문 테트리스".to_string(),
            enabled: true,
        });
        Self {
            items,
            selected: 0,
            notice,
            progress,
            theme,
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl Widget for &Lobby<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        let title = vec![
            Line::from(Span::styled(
                "SWEEP ARENA",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(StyleModifier::BOLD),
            )),
            Line::from(Span::styled(
                "Structural Analysis & Logic Training",
                Style::default().fg(colors.text_dim()),
            )),
            Line::from(""),
        ];
        Paragraph::new(title)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        if let Some(notice) = self.notice {
            Paragraph::new(Line::from(Span::styled(
                notice,
                Style::default().fg(colors.warning()),
            )))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(layout[1], buf);
        }

        let mut lines: Vec<Line> = Vec::new();
        for (i, item) in self.items.iter().enumerate() {
            let selected = i == self.selected;
            let marker = if selected { "> " } else { "  " };
            let label_style = if !item.enabled {
                Style::default().fg(colors.text_dim())
            } else if selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(StyleModifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(vec![
                Span::styled(marker, label_style),
                Span::styled(format!("[{}] ", item.key), label_style),
                Span::styled(item.label.clone(), label_style),
            ]));
            lines.push(Line::from(Span::styled(
                format!("      {}", item.description),
                Style::default().fg(colors.text_dim()),
            )));
        }
        Paragraph::new(lines).render(layout[2], buf);
    }
}
