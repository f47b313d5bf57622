use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::arena::session::{
    ArenaInput, ArenaSession, HintRequest, MSG_SESSION_START, Outcome, Pending, SessionKind,
};
use crate::arena::ArenaPhase;
use crate::config::Config;
use crate::content::bundled::BundledProvider;
use crate::content::{ContentProvider, ProviderError};
use crate::grammar::engine::{GrammarSession, LessonPending, LessonPhase};
use crate::materials::{LearningMaterial, MaterialIndex};
use crate::model::catalog;
use crate::model::lesson::GrammarLevel;
use crate::model::sentence::{Difficulty, Sentence};
use crate::progress::ProgressState;
use crate::speech::SpeechPlayer;
use crate::store::json_store::JsonStore;
use crate::store::schema::ProgressData;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Lobby,
    CustomInput,
    Arena,
    GrammarTopics,
    GrammarLesson,
}

/// Provider round-trips block the UI; the main loop draws a loading frame
/// before performing each queued action.
pub enum BlockingAction {
    StartSession(Difficulty, Option<u8>),
    StartLandfill,
    ParseCustom(String),
    LoadTopic { topic: String, retry: bool },
    Hint(HintRequest),
    Speak,
    OpenMaterials(u8),
}

impl BlockingAction {
    pub fn loading_label(&self) -> &'static str {
        match self {
            BlockingAction::StartSession(..) | BlockingAction::StartLandfill => {
                "AI가 맞춤형 문제를 출제하고 있습니다..."
            }
            BlockingAction::ParseCustom(_) => "지문을 분석하고 있습니다...",
            BlockingAction::LoadTopic { .. } => "AI 수리공이 문제를 조립 중입니다...",
            BlockingAction::Hint(_) => "힌트를 생성하고 있습니다...",
            BlockingAction::Speak => "음성을 준비하고 있습니다...",
            BlockingAction::OpenMaterials(_) => "자료 목록을 불러오고 있습니다...",
        }
    }
}

enum TimerAction {
    Arena(Pending),
    Lesson(LessonPending),
}

struct Timer {
    due: Instant,
    action: TimerAction,
}

pub struct MaterialsView {
    pub code: u8,
    pub materials: Vec<LearningMaterial>,
    pub sources: Vec<String>,
    pub kinds: Vec<String>,
    pub source_sel: Option<usize>,
    pub kind_sel: Option<usize>,
}

impl MaterialsView {
    pub fn source_filter(&self) -> Option<&str> {
        self.source_sel.map(|i| self.sources[i].as_str())
    }

    pub fn kind_filter(&self) -> Option<&str> {
        self.kind_sel.map(|i| self.kinds[i].as_str())
    }
}

pub struct App {
    pub screen: AppScreen,
    pub theme: &'static Theme,
    pub config: Config,
    pub progress: ProgressState,
    pub store: Option<JsonStore>,
    pub should_quit: bool,

    provider: Box<dyn ContentProvider>,
    /// Every sentence seen this process, by id; landfill review sessions are
    /// assembled from here.
    bank: HashMap<String, Sentence>,

    pub arena: Option<ArenaSession>,
    pub token_cursor: usize,
    pub code_buffer: String,
    pub message: String,
    pub message_error: bool,

    pub grammar: Option<GrammarSession>,
    pub grammar_level: GrammarLevel,
    pub topic_cursor: usize,
    pub tray_cursor: usize,

    pub lobby_selected: usize,
    pub notice: Option<String>,
    pub focus_code: Option<u8>,
    pub custom_input: String,

    pub materials_view: Option<MaterialsView>,
    materials: Option<MaterialIndex>,

    speech: SpeechPlayer,
    timers: Vec<Timer>,
    blocking: VecDeque<BlockingAction>,
    rng: SmallRng,
}

impl App {
    pub fn new(offline: bool) -> Self {
        let mut config = Config::load().unwrap_or_default();
        config.validate();
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let store = JsonStore::new().ok();
        let progress = if let Some(ref s) = store {
            match s.load_progress() {
                // Schema mismatch or parse failure: start fresh.
                Some(data) if !data.needs_reset() => data.progress,
                _ => ProgressState::default(),
            }
        } else {
            ProgressState::default()
        };

        let provider = make_provider(&config, offline);

        Self {
            screen: AppScreen::Lobby,
            theme,
            config,
            progress,
            store,
            should_quit: false,
            provider,
            bank: HashMap::new(),
            arena: None,
            token_cursor: 0,
            code_buffer: String::new(),
            message: String::new(),
            message_error: false,
            grammar: None,
            grammar_level: GrammarLevel::Beginner,
            topic_cursor: 0,
            tray_cursor: 0,
            lobby_selected: 0,
            notice: None,
            focus_code: None,
            custom_input: String::new(),
            materials_view: None,
            materials: None,
            speech: SpeechPlayer::new(),
            timers: Vec::new(),
            blocking: VecDeque::new(),
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn queue(&mut self, action: BlockingAction) {
        self.blocking.push_back(action);
    }

    pub fn next_blocking_action(&mut self) -> Option<BlockingAction> {
        self.blocking.pop_front()
    }

    pub fn save(&self) {
        if let Some(ref store) = self.store {
            let _ = store.save_progress(&ProgressData {
                schema_version: 1,
                progress: self.progress.clone(),
            });
        }
    }

    pub fn dismiss_first_run_notice(&mut self) {
        if !self.progress.tutorial_completed {
            self.progress.tutorial_completed = true;
            self.save();
        }
    }

    /// Run one queued provider round-trip. The caller has already drawn the
    /// loading frame; input is not read again until this returns.
    pub fn perform(&mut self, action: BlockingAction) {
        match action {
            BlockingAction::StartSession(difficulty, focus) => {
                let count = self.config.session_length;
                match self.provider.session_sentences(difficulty, count, focus) {
                    Ok(sentences) if !sentences.is_empty() => {
                        self.focus_code = focus;
                        self.enter_arena(sentences, SessionKind::Standard(difficulty));
                    }
                    _ => self.fail_to_lobby(MSG_GENERATION_FAILED),
                }
            }
            BlockingAction::StartLandfill => self.start_landfill(),
            BlockingAction::ParseCustom(text) => match self.provider.parse_text(&text) {
                Ok(sentences) if !sentences.is_empty() => {
                    self.custom_input.clear();
                    self.enter_arena(sentences, SessionKind::Custom);
                }
                Err(ProviderError::Request(_)) => self.fail_to_lobby(MSG_PARSE_NEEDS_NETWORK),
                _ => self.fail_to_lobby(MSG_PARSE_FAILED),
            },
            BlockingAction::LoadTopic { topic, retry } => self.load_topic(&topic, retry),
            BlockingAction::Hint(request) => {
                let hint = self.provider.socratic_hint(
                    &request.modifier_text,
                    request.correct_code,
                    request.wrong_code,
                );
                self.message = format!("AI 힌트: {hint}");
                self.message_error = false;
            }
            BlockingAction::Speak => self.speak_current_sentence(),
            BlockingAction::OpenMaterials(code) => self.open_materials(code),
        }
    }

    fn fail_to_lobby(&mut self, notice: &str) {
        self.notice = Some(notice.to_string());
        self.screen = AppScreen::Lobby;
    }

    fn enter_arena(&mut self, sentences: Vec<Sentence>, kind: SessionKind) {
        for sentence in &sentences {
            self.bank.insert(sentence.id.clone(), sentence.clone());
        }
        let Some(session) = ArenaSession::new(sentences, kind) else {
            self.fail_to_lobby(MSG_GENERATION_FAILED);
            return;
        };
        self.arena = Some(session);
        self.timers.clear();
        self.token_cursor = 0;
        self.code_buffer.clear();
        self.message = MSG_SESSION_START.to_string();
        self.message_error = false;
        self.notice = None;
        self.screen = AppScreen::Arena;
    }

    /// Assemble a review queue from the cached bank. When too few landfill
    /// sentences are on hand, a fresh beginner batch replaces the queue
    /// outright; review bookkeeping then simply no-ops on the new ids.
    fn start_landfill(&mut self) {
        if self.progress.landfill.is_empty() {
            self.fail_to_lobby(MSG_LANDFILL_EMPTY);
            return;
        }
        let mut queue: Vec<Sentence> = self
            .progress
            .landfill_ids()
            .iter()
            .filter_map(|id| self.bank.get(id).cloned())
            .collect();
        if queue.len() < self.config.landfill_min {
            if let Ok(fresh) = self.provider.session_sentences(
                Difficulty::Beginner,
                self.config.landfill_min,
                None,
            ) {
                if !fresh.is_empty() {
                    queue = fresh;
                }
            }
        }
        if queue.is_empty() {
            self.fail_to_lobby(MSG_LANDFILL_EMPTY);
            return;
        }
        self.focus_code = None;
        self.enter_arena(queue, SessionKind::LandfillReview);
    }

    fn load_topic(&mut self, topic: &str, retry: bool) {
        match self.provider.grammar_lesson(topic, self.grammar_level) {
            Ok(lesson) => {
                match GrammarSession::new(topic, self.grammar_level, lesson, &mut self.rng, retry)
                {
                    Some(session) => {
                        self.grammar = Some(session);
                        self.timers.clear();
                        self.tray_cursor = 0;
                        self.notice = None;
                        self.screen = AppScreen::GrammarLesson;
                    }
                    None => self.fail_to_lobby(MSG_LESSON_FAILED),
                }
            }
            Err(_) => {
                self.notice = Some(MSG_LESSON_FAILED.to_string());
                self.screen = AppScreen::GrammarTopics;
            }
        }
    }

    fn speak_current_sentence(&mut self) {
        if !self.config.speech_enabled || self.speech.is_playing() {
            return;
        }
        let Some(text) = self.arena.as_ref().map(|a| a.sentence().text()) else {
            return;
        };
        if let Some(audio) = self.provider.speech_audio(&text) {
            self.speech.play(audio);
        }
    }

    pub fn speech_playing(&self) -> bool {
        self.speech.is_playing()
    }

    // --- Arena input ---

    pub fn arena_move_cursor(&mut self, delta: isize) {
        let Some(arena) = &self.arena else { return };
        let len = arena.sentence().tokens.len();
        let cursor = self.token_cursor as isize + delta;
        self.token_cursor = cursor.rem_euclid(len as isize) as usize;
    }

    pub fn arena_select_token(&mut self) {
        let cursor = self.token_cursor;
        let Some(arena) = &mut self.arena else { return };
        let outcome = arena.apply(ArenaInput::Token(cursor), &mut self.progress);
        self.handle_arena_outcome(outcome);
    }

    pub fn arena_push_digit(&mut self, digit: char) {
        if self.arena.as_ref().map(|a| a.phase) != Some(ArenaPhase::ClassifyModifier) {
            return;
        }
        if digit.is_ascii_digit() && self.code_buffer.len() < 2 {
            self.code_buffer.push(digit);
        }
    }

    pub fn arena_pop_digit(&mut self) {
        self.code_buffer.pop();
    }

    pub fn arena_submit_code(&mut self) {
        let Ok(code) = self.code_buffer.parse::<u8>() else {
            self.code_buffer.clear();
            return;
        };
        self.code_buffer.clear();
        let Some(arena) = &mut self.arena else { return };
        let outcome = arena.apply(ArenaInput::Code(code), &mut self.progress);
        self.handle_arena_outcome(outcome);
    }

    pub fn arena_next(&mut self) {
        let Some(arena) = &mut self.arena else { return };
        let outcome = arena.apply(ArenaInput::Advance, &mut self.progress);
        self.token_cursor = 0;
        self.handle_arena_outcome(outcome);
        self.save();
    }

    pub fn arena_retry_level(&mut self) {
        let Some(arena) = &self.arena else { return };
        match arena.kind {
            SessionKind::Standard(difficulty) => {
                self.queue(BlockingAction::StartSession(difficulty, self.focus_code));
            }
            SessionKind::LandfillReview => self.queue(BlockingAction::StartLandfill),
            SessionKind::Custom => self.quit_to_lobby(),
        }
    }

    /// Weakness hand-off: jump into the grammar engine on the topic mapped to
    /// the session's most-missed code.
    pub fn arena_to_grammar(&mut self) {
        let code = self
            .arena
            .as_ref()
            .and_then(|a| a.diagnosis.as_ref())
            .and_then(|d| d.weakest_modifier_code);
        match code.and_then(catalog::topic_for_code) {
            Some(topic) => self.queue(BlockingAction::LoadTopic {
                topic: topic.to_string(),
                retry: false,
            }),
            None => {
                self.topic_cursor = 0;
                self.screen = AppScreen::GrammarTopics;
            }
        }
    }

    pub fn diagnosis_weakest_code(&self) -> Option<u8> {
        self.arena
            .as_ref()
            .and_then(|a| a.diagnosis.as_ref())
            .and_then(|d| d.weakest_modifier_code)
    }

    pub fn quit_to_lobby(&mut self) {
        self.arena = None;
        self.grammar = None;
        self.timers.clear();
        self.materials_view = None;
        self.message.clear();
        self.screen = AppScreen::Lobby;
        self.save();
    }

    fn handle_arena_outcome(&mut self, outcome: Outcome) {
        if let Some(message) = outcome.message {
            self.message = message;
            self.message_error = outcome.error;
        }
        if let Some(pending) = outcome.pending {
            self.timers.push(Timer {
                due: Instant::now() + Duration::from_millis(pending.delay_ms),
                action: TimerAction::Arena(pending),
            });
        }
        if let Some(hint) = outcome.hint {
            self.queue(BlockingAction::Hint(hint));
        }
        if outcome.speak && self.config.speech_enabled {
            self.queue(BlockingAction::Speak);
        }
        if outcome.session_over {
            self.save();
        }
    }

    // --- Grammar input ---

    pub fn topic_count(&self) -> usize {
        catalog::GRAMMAR_ZONES.iter().map(|z| z.topics.len()).sum()
    }

    pub fn topic_at(&self, index: usize) -> Option<&'static catalog::GrammarTopic> {
        catalog::GRAMMAR_ZONES
            .iter()
            .flat_map(|z| z.topics.iter())
            .nth(index)
    }

    pub fn open_selected_topic(&mut self) {
        if let Some(topic) = self.topic_at(self.topic_cursor) {
            self.queue(BlockingAction::LoadTopic {
                topic: topic.id.to_string(),
                retry: false,
            });
        }
    }

    pub fn toggle_grammar_level(&mut self) {
        self.grammar_level = match self.grammar_level {
            GrammarLevel::Beginner => GrammarLevel::Advanced,
            GrammarLevel::Advanced => GrammarLevel::Beginner,
        };
    }

    pub fn lesson_continue(&mut self) {
        if let Some(grammar) = &mut self.grammar {
            grammar.begin_quiz();
        }
    }

    pub fn lesson_answer(&mut self, option: usize) {
        let Some(grammar) = &mut self.grammar else { return };
        let outcome = grammar.answer_quiz(option);
        if let Some(pending) = outcome.pending {
            self.schedule_lesson(pending);
        }
    }

    pub fn lesson_tray_move(&mut self, delta: isize) {
        let Some(grammar) = &self.grammar else { return };
        let len = grammar.puzzle.available.len();
        if len == 0 {
            self.tray_cursor = 0;
            return;
        }
        let cursor = self.tray_cursor as isize + delta;
        self.tray_cursor = cursor.rem_euclid(len as isize) as usize;
    }

    pub fn lesson_place(&mut self) {
        let cursor = self.tray_cursor;
        if let Some(grammar) = &mut self.grammar {
            grammar.place_block(cursor);
            let len = grammar.puzzle.available.len();
            if len > 0 {
                self.tray_cursor = self.tray_cursor.min(len - 1);
            } else {
                self.tray_cursor = 0;
            }
        }
    }

    pub fn lesson_remove(&mut self) {
        if let Some(grammar) = &mut self.grammar {
            grammar.remove_last_block();
        }
    }

    pub fn lesson_reset(&mut self) {
        if let Some(grammar) = &mut self.grammar {
            grammar.reset_puzzle();
            self.tray_cursor = 0;
        }
    }

    pub fn lesson_submit(&mut self) {
        let Some(grammar) = &mut self.grammar else { return };
        let outcome = grammar.check_puzzle();
        if let Some(pending) = outcome.pending {
            self.schedule_lesson(pending);
        }
    }

    pub fn lesson_retry(&mut self) {
        let Some(grammar) = &self.grammar else { return };
        if grammar.phase == LessonPhase::Diagnosis && !grammar.report().mastered {
            let topic = grammar.topic.clone();
            self.queue(BlockingAction::LoadTopic { topic, retry: true });
        }
    }

    /// Mastery hand-off: back into the arena, pre-focused on the mastered
    /// modifier code.
    pub fn lesson_apply(&mut self) {
        let Some(grammar) = &self.grammar else { return };
        if grammar.phase != LessonPhase::Diagnosis {
            return;
        }
        let report = grammar.report();
        if let Some(code) = report.focus_code {
            self.grammar = None;
            self.queue(BlockingAction::StartSession(
                Difficulty::Intermediate,
                Some(code),
            ));
        }
    }

    fn schedule_lesson(&mut self, pending: LessonPending) {
        self.timers.push(Timer {
            due: Instant::now() + Duration::from_millis(pending.delay_ms),
            action: TimerAction::Lesson(pending),
        });
    }

    // --- Materials ---

    fn open_materials(&mut self, code: u8) {
        if self.materials.is_none() {
            self.materials = Some(MaterialIndex::load(self.config.materials_url.as_deref()));
        }
        let materials = self
            .materials
            .as_ref()
            .map(|index| index.by_code(code).to_vec())
            .unwrap_or_default();
        self.materials_view = Some(MaterialsView {
            code,
            sources: MaterialIndex::sources(&materials),
            kinds: MaterialIndex::kinds(&materials),
            materials,
            source_sel: None,
            kind_sel: None,
        });
    }

    pub fn materials_cycle_source(&mut self) {
        if let Some(view) = &mut self.materials_view {
            view.source_sel = cycle_option(view.source_sel, view.sources.len());
        }
    }

    pub fn materials_cycle_kind(&mut self) {
        if let Some(view) = &mut self.materials_view {
            view.kind_sel = cycle_option(view.kind_sel, view.kinds.len());
        }
    }

    pub fn close_materials(&mut self) {
        self.materials_view = None;
    }

    // --- Timers ---

    /// Fire every due timer. Stale epochs are dropped inside the engines.
    pub fn tick(&mut self, now: Instant) {
        let due: Vec<Timer> = {
            let (ready, waiting): (Vec<Timer>, Vec<Timer>) =
                self.timers.drain(..).partition(|t| t.due <= now);
            self.timers = waiting;
            ready
        };
        for timer in due {
            match timer.action {
                TimerAction::Arena(pending) => {
                    let outcome = self
                        .arena
                        .as_mut()
                        .and_then(|arena| arena.resolve(pending));
                    if let Some(outcome) = outcome {
                        self.handle_arena_outcome(outcome);
                    }
                }
                TimerAction::Lesson(pending) => {
                    if let Some(grammar) = &mut self.grammar {
                        if grammar.resolve(pending, &mut self.rng) {
                            self.tray_cursor = 0;
                        }
                    }
                }
            }
        }
    }
}

fn cycle_option(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match current {
        None => Some(0),
        Some(i) if i + 1 < len => Some(i + 1),
        Some(_) => None,
    }
}

fn make_provider(config: &Config, offline: bool) -> Box<dyn ContentProvider> {
    #[cfg(feature = "network")]
    if !offline {
        use crate::content::remote::RemoteProvider;
        if let Some(remote) = RemoteProvider::new(
            &config.api_base_url,
            &Config::api_key(),
            &config.text_model,
            &config.parser_model,
            &config.tts_model,
        ) {
            return Box::new(remote);
        }
    }
    let _ = (config, offline);
    Box::new(BundledProvider::new())
}

const MSG_GENERATION_FAILED: &str = "문제 생성에 실패했습니다. 잠시 후 다시 시도해주세요.";
const MSG_PARSE_FAILED: &str = "문장 분석에 실패했습니다. 지문을 확인해주세요.";
const MSG_PARSE_NEEDS_NETWORK: &str = "지문 분석은 네트워크 제공자가 필요합니다.";
const MSG_LESSON_FAILED: &str = "수업 준비에 실패했습니다. 다시 시도해주세요.";
const MSG_LANDFILL_EMPTY: &str = "복습할 문장이 아직 없습니다.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_option_walks_all_then_clears() {
        assert_eq!(cycle_option(None, 2), Some(0));
        assert_eq!(cycle_option(Some(0), 2), Some(1));
        assert_eq!(cycle_option(Some(1), 2), None);
        assert_eq!(cycle_option(None, 0), None);
    }
}
