mod app;
mod arena;
mod config;
mod content;
mod event;
mod grammar;
mod materials;
mod model;
mod progress;
mod speech;
mod store;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Alignment;
use ratatui::style::{Modifier as StyleModifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

use app::{App, AppScreen, BlockingAction};
use arena::{ArenaPhase, SessionKind};
use event::{AppEvent, EventHandler};
use grammar::LessonPhase;
use model::catalog;
use model::sentence::Difficulty;
use ui::components::diagnosis_view::DiagnosisView;
use ui::components::keypad::Keypad;
use ui::components::lesson_view::LessonView;
use ui::components::lobby::Lobby;
use ui::components::materials_sheet::MaterialsSheet;
use ui::components::sentence_view::SentenceView;
use ui::layout::{AppLayout, centered_rect};

#[derive(Parser)]
#[command(name = "sweepr", version, about = "Terminal grammar game for sentence structure analysis")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Sentences per session")]
    session_length: Option<usize>,

    #[arg(long, help = "Skip the generative provider and play bundled content")]
    offline: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut app = App::new(cli.offline);

    if let Some(length) = cli.session_length {
        app.config.session_length = length;
        app.config.validate();
    }
    if let Some(theme_name) = cli.theme {
        if let Some(theme) = ui::theme::Theme::load(&theme_name) {
            let theme: &'static ui::theme::Theme = Box::leak(Box::new(theme));
            app.theme = theme;
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::Resize(_, _) => {}
        }

        // Provider round-trips block: show the loading frame, then run the
        // call. No other input is processed while one is outstanding.
        while let Some(action) = app.next_blocking_action() {
            terminal.draw(|frame| render_loading(frame, app, action.loading_label()))?;
            app.perform(action);
        }

        if app.should_quit {
            app.save();
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.materials_view.is_some() {
        handle_materials_key(app, key);
        return;
    }

    match app.screen {
        AppScreen::Lobby => handle_lobby_key(app, key),
        AppScreen::CustomInput => handle_custom_input_key(app, key),
        AppScreen::Arena => handle_arena_key(app, key),
        AppScreen::GrammarTopics => handle_topics_key(app, key),
        AppScreen::GrammarLesson => handle_lesson_key(app, key),
    }
}

fn handle_materials_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('f') => app.materials_cycle_source(),
        KeyCode::Char('t') => app.materials_cycle_kind(),
        KeyCode::Esc | KeyCode::Char('q') => app.close_materials(),
        _ => {}
    }
}

fn handle_lobby_key(app: &mut App, key: KeyEvent) {
    if !app.progress.tutorial_completed
        && matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter)
    {
        app.dismiss_first_run_notice();
        return;
    }

    let mut lobby = Lobby::new(&app.progress, None, app.theme);
    lobby.selected = app.lobby_selected;

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('1') => app.queue(BlockingAction::StartSession(Difficulty::Beginner, None)),
        KeyCode::Char('2') => {
            app.queue(BlockingAction::StartSession(Difficulty::Intermediate, None))
        }
        KeyCode::Char('3') => app.queue(BlockingAction::StartSession(Difficulty::Advanced, None)),
        KeyCode::Char('l') => app.queue(BlockingAction::StartLandfill),
        KeyCode::Char('p') => {
            app.custom_input.clear();
            app.screen = AppScreen::CustomInput;
        }
        KeyCode::Char('g') => {
            app.topic_cursor = 0;
            app.screen = AppScreen::GrammarTopics;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            lobby.prev();
            app.lobby_selected = lobby.selected;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            lobby.next();
            app.lobby_selected = lobby.selected;
        }
        KeyCode::Enter => match app.lobby_selected {
            0 => app.queue(BlockingAction::StartSession(Difficulty::Beginner, None)),
            1 => app.queue(BlockingAction::StartSession(Difficulty::Intermediate, None)),
            2 => app.queue(BlockingAction::StartSession(Difficulty::Advanced, None)),
            3 => app.queue(BlockingAction::StartLandfill),
            4 => {
                app.custom_input.clear();
                app.screen = AppScreen::CustomInput;
            }
            5 => {
                app.topic_cursor = 0;
                app.screen = AppScreen::GrammarTopics;
            }
            _ => {}
        },
        _ => {}
    }
}

fn handle_custom_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.custom_input.clear();
            app.screen = AppScreen::Lobby;
        }
        KeyCode::Enter => {
            let text = app.custom_input.trim().to_string();
            if !text.is_empty() {
                app.queue(BlockingAction::ParseCustom(text));
            }
        }
        KeyCode::Backspace => {
            app.custom_input.pop();
        }
        KeyCode::Char(ch) => app.custom_input.push(ch),
        _ => {}
    }
}

fn handle_arena_key(app: &mut App, key: KeyEvent) {
    let phase = match &app.arena {
        Some(arena) => arena.phase,
        None => return,
    };

    if phase == ArenaPhase::Diagnosis {
        match key.code {
            KeyCode::Char('r') => app.arena_retry_level(),
            KeyCode::Char('g') => app.arena_to_grammar(),
            KeyCode::Char('m') => {
                if let Some(code) = app.diagnosis_weakest_code() {
                    app.queue(BlockingAction::OpenMaterials(code));
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => app.quit_to_lobby(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.quit_to_lobby(),
        KeyCode::Left | KeyCode::Char('h') => app.arena_move_cursor(-1),
        KeyCode::Right | KeyCode::Char('l') => app.arena_move_cursor(1),
        KeyCode::Char('v') => {
            if !app.speech_playing() {
                app.queue(BlockingAction::Speak);
            }
        }
        KeyCode::Char('n') if phase == ArenaPhase::SentenceResult => app.arena_next(),
        KeyCode::Char('m') if phase == ArenaPhase::SentenceResult => {
            if let Some(code) = app
                .arena
                .as_ref()
                .and_then(|a| a.active_modifier())
                .map(|m| m.type_code)
            {
                app.queue(BlockingAction::OpenMaterials(code));
            }
        }
        KeyCode::Enter if phase == ArenaPhase::ClassifyModifier => app.arena_submit_code(),
        KeyCode::Enter if phase == ArenaPhase::SentenceResult => app.arena_next(),
        KeyCode::Enter => app.arena_select_token(),
        KeyCode::Backspace if phase == ArenaPhase::ClassifyModifier => app.arena_pop_digit(),
        KeyCode::Char(ch) if phase == ArenaPhase::ClassifyModifier && ch.is_ascii_digit() => {
            app.arena_push_digit(ch)
        }
        _ => {}
    }
}

fn handle_topics_key(app: &mut App, key: KeyEvent) {
    let count = app.topic_count();
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.quit_to_lobby(),
        KeyCode::Char('b') => app.toggle_grammar_level(),
        KeyCode::Up | KeyCode::Char('k') => {
            app.topic_cursor = if app.topic_cursor == 0 {
                count - 1
            } else {
                app.topic_cursor - 1
            };
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.topic_cursor = (app.topic_cursor + 1) % count;
        }
        KeyCode::Enter => app.open_selected_topic(),
        _ => {}
    }
}

fn handle_lesson_key(app: &mut App, key: KeyEvent) {
    let phase = match &app.grammar {
        Some(grammar) => grammar.phase,
        None => return,
    };

    match phase {
        LessonPhase::Concept => match key.code {
            KeyCode::Enter => app.lesson_continue(),
            KeyCode::Esc => app.quit_to_lobby(),
            _ => {}
        },
        LessonPhase::Quiz => match key.code {
            KeyCode::Char(ch @ '1'..='5') => {
                app.lesson_answer(ch as usize - '1' as usize);
            }
            KeyCode::Esc => app.quit_to_lobby(),
            _ => {}
        },
        LessonPhase::Puzzle => match key.code {
            KeyCode::Left | KeyCode::Char('h') => app.lesson_tray_move(-1),
            KeyCode::Right | KeyCode::Char('l') => app.lesson_tray_move(1),
            KeyCode::Enter => app.lesson_place(),
            KeyCode::Backspace => app.lesson_remove(),
            KeyCode::Char('r') => app.lesson_reset(),
            KeyCode::Char('s') => app.lesson_submit(),
            KeyCode::Esc => app.quit_to_lobby(),
            _ => {}
        },
        LessonPhase::Diagnosis => match key.code {
            KeyCode::Enter => app.lesson_apply(),
            KeyCode::Char('r') => app.lesson_retry(),
            KeyCode::Esc | KeyCode::Char('q') => app.quit_to_lobby(),
            _ => {}
        },
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Lobby => render_lobby(frame, app),
        AppScreen::CustomInput => render_custom_input(frame, app),
        AppScreen::Arena => render_arena(frame, app),
        AppScreen::GrammarTopics => render_topics(frame, app),
        AppScreen::GrammarLesson => render_lesson(frame, app),
    }

    if let Some(view) = &app.materials_view {
        let overlay = centered_rect(70, 70, area);
        let sheet = MaterialsSheet::new(
            view.code,
            &view.materials,
            view.source_filter(),
            view.kind_filter(),
            app.theme,
        );
        frame.render_widget(sheet, overlay);
    }
}

fn render_loading(frame: &mut ratatui::Frame, app: &App, label: &str) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let centered = centered_rect(60, 20, area);
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            label,
            Style::default()
                .fg(colors.accent())
                .add_modifier(StyleModifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    frame.render_widget(text, centered);
}

fn render_lobby(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let first_run = if app.progress.tutorial_completed {
        None
    } else {
        Some(
            "처음이신가요? 명사 → 수식어 → 동사 순서로 문장을 청소합니다. [Enter]로 시작하세요.",
        )
    };
    let notice = app.notice.as_deref().or(first_run);

    let mut lobby = Lobby::new(&app.progress, notice, app.theme);
    lobby.selected = app.lobby_selected;

    let menu_area = centered_rect(70, 85, area);
    frame.render_widget(&lobby, menu_area);

    let footer_area = ratatui::layout::Rect {
        x: area.x,
        y: area.bottom().saturating_sub(1),
        width: area.width,
        height: 1,
    };
    let mut footer = format!(
        " EXP {} | 매립지 {}건 | [1-3] 세션  [l] 복습  [g] 문법  [q] 종료 ",
        app.progress.exp,
        app.progress.landfill.len()
    );
    if let Some(code) = app.focus_code {
        footer.push_str(&format!(" | Target Code: {code} 집중 훈련 중"));
    }
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            footer,
            Style::default().fg(colors.text_dim()),
        ))),
        footer_area,
    );
}

fn render_custom_input(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = centered_rect(70, 50, area);
    let block = Block::bordered()
        .title(" 내 지문으로 학습하기 ")
        .border_style(Style::default().fg(colors.border_focused()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    frame.render_widget(block, centered);

    let lines = vec![
        Line::from(Span::styled(
            "분석할 영어 지문을 붙여넣고 Enter를 누르세요. (Esc 취소)",
            Style::default().fg(colors.text_dim()),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{}_", app.custom_input),
            Style::default().fg(colors.fg()),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_arena(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let Some(arena) = &app.arena else { return };

    if arena.phase == ArenaPhase::Diagnosis {
        if let Some(diagnosis) = &arena.diagnosis {
            let centered = centered_rect(70, 70, area);
            frame.render_widget(DiagnosisView::new(diagnosis, app.theme), centered);
        }
        return;
    }

    let layout = AppLayout::new(area);

    let kind_label = match arena.kind {
        SessionKind::Standard(difficulty) => difficulty.as_str().to_string(),
        SessionKind::LandfillReview => "landfill".to_string(),
        SessionKind::Custom => "custom".to_string(),
    };
    let header_line = format!(
        " {kind_label} {}/{} | EXP {} {}",
        arena.index + 1,
        arena.sentence_count(),
        app.progress.exp,
        if app.progress.combo > 1 {
            format!("| {} COMBO", app.progress.combo)
        } else {
            String::new()
        }
    );
    let message_style = if app.message_error {
        Style::default().fg(colors.error()).add_modifier(StyleModifier::BOLD)
    } else {
        Style::default().fg(colors.header_fg())
    };
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            header_line,
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(StyleModifier::BOLD),
        )),
        Line::from(Span::styled(format!(" {}", app.message), message_style)),
    ])
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    let cursor = matches!(
        arena.phase,
        ArenaPhase::SelectHeadNoun | ArenaPhase::SelectModifierSpan | ArenaPhase::FindMainVerb
    )
    .then_some(app.token_cursor);
    frame.render_widget(SentenceView::new(arena, cursor, app.theme), layout.main);

    if let Some(sidebar) = layout.sidebar {
        frame.render_widget(Keypad::new(arena, &app.code_buffer, app.theme), sidebar);
    }

    let footer_text = match arena.phase {
        ArenaPhase::ClassifyModifier => " [0-9] 코드 입력  [Enter] 제출  [Esc] 나가기 ",
        ArenaPhase::SentenceResult => " [n/Enter] 다음  [v] 듣기  [m] 자료  [Esc] 나가기 ",
        _ => " [←→] 이동  [Enter] 선택  [v] 듣기  [Esc] 나가기 ",
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            footer_text,
            Style::default().fg(colors.text_dim()),
        ))),
        layout.footer,
    );
}

fn render_topics(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = centered_rect(75, 90, area);
    let block = Block::bordered()
        .title(" SWEEP FIXER — 주제 선택 ")
        .border_style(Style::default().fg(colors.border()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    frame.render_widget(block, centered);

    let mut lines: Vec<Line> = vec![
        Line::from(vec![
            Span::styled("난이도: ", Style::default().fg(colors.text_dim())),
            Span::styled(
                match app.grammar_level {
                    model::lesson::GrammarLevel::Beginner => "기본 (개념 탑재)",
                    model::lesson::GrammarLevel::Advanced => "심화 (함정 & 비교)",
                },
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(StyleModifier::BOLD),
            ),
            Span::styled("  [b] 전환", Style::default().fg(colors.text_dim())),
        ]),
        Line::from(""),
    ];

    let mut flat_index = 0usize;
    for zone in &catalog::GRAMMAR_ZONES {
        lines.push(Line::from(Span::styled(
            zone.title,
            Style::default()
                .fg(colors.warning())
                .add_modifier(StyleModifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            zone.subtitle,
            Style::default().fg(colors.text_dim()),
        )));
        for topic in zone.topics {
            let selected = flat_index == app.topic_cursor;
            let marker = if selected { "> " } else { "  " };
            let style = if selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(StyleModifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{marker}{}", topic.label), style),
                Span::styled(
                    format!("  ({})", topic.label_en),
                    Style::default().fg(colors.text_dim()),
                ),
            ]));
            flat_index += 1;
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "[↑↓] 이동  [Enter] 시작  [Esc] 나가기",
        Style::default().fg(colors.text_dim()),
    )));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn render_lesson(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let Some(grammar) = &app.grammar else { return };

    let centered = centered_rect(80, 90, area);
    frame.render_widget(LessonView::new(grammar, app.tray_cursor, app.theme), centered);
}
