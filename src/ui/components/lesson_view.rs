use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier as StyleModifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::grammar::engine::{GrammarSession, LessonPhase};
use crate::model::lesson::GrammarLevel;
use crate::ui::theme::Theme;

/// Renders whichever lesson phase is active: concept card, 5-option quiz,
/// chunk puzzle, or the mastery report.
pub struct LessonView<'a> {
    session: &'a GrammarSession,
    /// Cursor over the puzzle's source tray.
    pub tray_cursor: usize,
    theme: &'a Theme,
}

impl<'a> LessonView<'a> {
    pub fn new(session: &'a GrammarSession, tray_cursor: usize, theme: &'a Theme) -> Self {
        Self {
            session,
            tray_cursor,
            theme,
        }
    }
}

impl Widget for LessonView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let title = match self.session.phase {
            LessonPhase::Concept => " 개념 쏙쏙 (1/3) ",
            LessonPhase::Quiz => " 실전 모의고사 (2/3) ",
            LessonPhase::Puzzle => " 구문 테트리스 (3/3) ",
            LessonPhase::Diagnosis => " 학습 진단 리포트 ",
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        match self.session.phase {
            LessonPhase::Concept => self.render_concept(inner, buf),
            LessonPhase::Quiz => self.render_quiz(inner, buf),
            LessonPhase::Puzzle => self.render_puzzle(inner, buf),
            LessonPhase::Diagnosis => self.render_report(inner, buf),
        }
    }
}

impl LessonView<'_> {
    fn render_concept(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let concept = &self.session.lesson().concept;

        let mut lines: Vec<Line> = vec![
            Line::from(Span::styled(
                concept.title.clone(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(StyleModifier::BOLD),
            )),
            Line::from(""),
        ];
        for (i, point) in concept.summary.iter().enumerate() {
            lines.push(Line::from(Span::styled(
                format!("{}. {point}", i + 1),
                Style::default().fg(colors.fg()),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("헷갈리는 포인트(VS): ", Style::default().fg(colors.warning())),
            Span::styled(concept.key_distinction.clone(), Style::default().fg(colors.fg())),
        ]));
        lines.push(Line::from(vec![
            Span::styled("시험 함정: ", Style::default().fg(colors.error())),
            Span::styled(concept.exam_tip.clone(), Style::default().fg(colors.fg())),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("예문: \"{}\"", concept.example),
            Style::default()
                .fg(colors.text_dim())
                .add_modifier(StyleModifier::ITALIC),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[Enter] 함정 피하러 가기 (Quiz)",
            Style::default().fg(colors.accent()),
        )));

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }

    fn render_quiz(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let quiz_state = &self.session.quiz;
        let quiz = self.session.current_quiz();

        let mut lines: Vec<Line> = vec![
            Line::from(Span::styled(
                format!(
                    "{} / {}  (5지선다, 함정 주의)",
                    quiz_state.index + 1,
                    self.session.lesson().quizzes.len()
                ),
                Style::default().fg(colors.text_dim()),
            )),
            Line::from(""),
            Line::from(Span::styled(
                quiz.question.clone(),
                Style::default().fg(colors.fg()).add_modifier(StyleModifier::BOLD),
            )),
            Line::from(""),
        ];

        for (i, option) in quiz.options.iter().enumerate() {
            let selected = quiz_state.selected == Some(i);
            let style = match (&quiz_state.feedback, selected) {
                (Some((true, _)), true) => Style::default()
                    .fg(colors.success())
                    .add_modifier(StyleModifier::BOLD),
                (Some((false, _)), true) => Style::default().fg(colors.error()),
                _ => Style::default().fg(colors.fg()),
            };
            lines.push(Line::from(Span::styled(
                format!("  {}. {option}", i + 1),
                style,
            )));
        }

        if let Some((correct, text)) = &quiz_state.feedback {
            lines.push(Line::from(""));
            let color = if *correct { colors.success() } else { colors.error() };
            for part in text.lines() {
                lines.push(Line::from(Span::styled(
                    part.to_string(),
                    Style::default().fg(color),
                )));
            }
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }

    fn render_puzzle(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let puzzle_state = &self.session.puzzle;
        let puzzle = self.session.current_puzzle();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Min(0),
            ])
            .split(area);

        let header = vec![
            Line::from(Span::styled(
                format!(
                    "{} / {}  \"{}\"",
                    puzzle_state.index + 1,
                    self.session.lesson().puzzles.len(),
                    puzzle.sentence_translation
                ),
                Style::default().fg(colors.fg()),
            )),
            Line::from(Span::styled(
                if self.session.level == GrammarLevel::Advanced && puzzle.distractor.is_some() {
                    "함정(Trap) 단어가 숨어있습니다!"
                } else {
                    "의미 단위로 순서대로 배열하세요."
                },
                Style::default().fg(colors.warning()),
            )),
        ];
        Paragraph::new(header)
            .wrap(Wrap { trim: true })
            .render(layout[0], buf);

        // Drop zone
        let placed: Vec<Span> = if puzzle_state.placed.is_empty() {
            vec![Span::styled(
                "(아래 블록을 골라 이곳으로 옮기세요)",
                Style::default().fg(colors.text_dim()),
            )]
        } else {
            let mut spans = Vec::new();
            for block in &puzzle_state.placed {
                spans.push(Span::styled(
                    format!("[{block}]"),
                    Style::default()
                        .fg(colors.token_selected())
                        .add_modifier(StyleModifier::BOLD),
                ));
                spans.push(Span::raw(" "));
            }
            spans
        };
        Paragraph::new(Line::from(placed))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(layout[1], buf);

        // Source tray with cursor
        let mut tray: Vec<Span> = Vec::new();
        for (i, block) in puzzle_state.available.iter().enumerate() {
            let style = if i == self.tray_cursor {
                Style::default()
                    .fg(colors.token_cursor_fg())
                    .bg(colors.token_cursor_bg())
                    .add_modifier(StyleModifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            tray.push(Span::styled(format!("[{block}]"), style));
            tray.push(Span::raw(" "));
        }
        Paragraph::new(Line::from(tray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(layout[2], buf);

        let mut footer: Vec<Line> = Vec::new();
        if let Some((correct, text)) = &puzzle_state.feedback {
            let color = if *correct { colors.success() } else { colors.error() };
            footer.push(Line::from(Span::styled(
                text.clone(),
                Style::default().fg(color),
            )));
        }
        footer.push(Line::from(Span::styled(
            "[←→] 블록 선택  [Enter] 배치  [Backspace] 되돌리기  [r] 초기화  [s] 제출",
            Style::default().fg(colors.text_dim()),
        )));
        Paragraph::new(footer)
            .wrap(Wrap { trim: true })
            .render(layout[3], buf);
    }

    fn render_report(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let report = self.session.report();
        let guide = &self.session.lesson().study_guide;

        let score_style = |score: u32, threshold: u32| {
            Style::default()
                .fg(if score >= threshold {
                    colors.success()
                } else {
                    colors.error()
                })
                .add_modifier(StyleModifier::BOLD)
        };

        let mut lines: Vec<Line> = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("개념 이해도 (Quiz): ", Style::default().fg(colors.text_dim())),
                Span::styled(format!("{}%", report.quiz_score), score_style(report.quiz_score, 70)),
                Span::raw("   "),
                Span::styled("구문 응용력 (Puzzle): ", Style::default().fg(colors.text_dim())),
                Span::styled(
                    format!("{}%", report.puzzle_score),
                    score_style(report.puzzle_score, 80),
                ),
            ]),
            Line::from(""),
        ];

        if report.mastered {
            lines.push(Line::from(Span::styled(
                "마스터 인증 완료!",
                Style::default()
                    .fg(colors.success())
                    .add_modifier(StyleModifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                "완벽하게 이해했습니다. 이제 실전 문장에서 찾아볼까요?",
                Style::default().fg(colors.fg()),
            )));
            lines.push(Line::from(""));
            if report.focus_code.is_some() {
                lines.push(Line::from(Span::styled(
                    "[Enter] SWEEP 청소기에서 실전 훈련하기 (Apply)",
                    Style::default().fg(colors.accent()),
                )));
            }
        } else {
            lines.push(Line::from(Span::styled(
                "추가 학습이 필요합니다",
                Style::default()
                    .fg(colors.warning())
                    .add_modifier(StyleModifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                guide.weakness_analysis.clone(),
                Style::default().fg(colors.fg()),
            )));
            lines.push(Line::from(vec![
                Span::styled("복습 포인트: ", Style::default().fg(colors.warning())),
                Span::styled(
                    guide.review_recommendation.clone(),
                    Style::default().fg(colors.fg()),
                ),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "[r] 복습: 이 주제 다시 도전하기",
                Style::default().fg(colors.accent()),
            )));
        }
        lines.push(Line::from(Span::styled(
            "[Esc] 홈으로 나가기",
            Style::default().fg(colors.text_dim()),
        )));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
