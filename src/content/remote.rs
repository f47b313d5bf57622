//! Generative-API content source. One blocking request per call, 10 s
//! timeout, no retries: a failed call is reported once and the engine stays
//! on its prior screen. Payloads go through `schema` validation before any
//! sentence or lesson reaches the engine.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::json;

use crate::content::{ContentProvider, HINT_FALLBACK, ProviderError, schema};
use crate::model::catalog;
use crate::model::lesson::{GrammarLesson, GrammarLevel};
use crate::model::sentence::{Difficulty, Sentence};

pub struct RemoteProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    text_model: String,
    parser_model: String,
    tts_model: String,
    batch_counter: u64,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
struct InlineData {
    data: String,
}

impl RemoteProvider {
    pub fn new(
        base_url: &str,
        api_key: &str,
        text_model: &str,
        parser_model: &str,
        tts_model: &str,
    ) -> Option<Self> {
        if api_key.is_empty() {
            return None;
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .ok()?;
        Some(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            text_model: text_model.to_string(),
            parser_model: parser_model.to_string(),
            tts_model: tts_model.to_string(),
            batch_counter: 0,
        })
    }

    fn generate(&self, model: &str, body: serde_json::Value) -> Result<GenerateResponse, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ProviderError::Request(format!(
                "generation endpoint returned {}",
                response.status()
            )));
        }
        response
            .json::<GenerateResponse>()
            .map_err(|e| ProviderError::Request(e.to_string()))
    }

    fn first_text(response: GenerateResponse) -> Result<String, ProviderError> {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or(ProviderError::Empty)
    }

    fn generate_json_text(&self, model: &str, prompt: String) -> Result<String, ProviderError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });
        Self::first_text(self.generate(model, body)?)
    }

    fn next_batch_id(&mut self, label: &str) -> String {
        self.batch_counter += 1;
        format!("{label}-{}", self.batch_counter)
    }
}

fn modifier_code_listing() -> String {
    catalog::MODIFIER_TYPES
        .iter()
        .map(|m| format!("{}:{}", m.code, m.full_name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn batch_instructions() -> String {
    format!(
        "For EACH sentence return JSON with: tokens (words/punctuation), \
         headNounIndex and mainVerbIndex (0-based), distractorIndices \
         (indices of fake verbs such as participles or verbs inside \
         modifiers), modifiers as {{startIndex, endIndex, typeCode}} with \
         typeCode 1-17 from [{}], subjectType (1-12), and a Korean \
         translation. Wrap everything as {{\"sentences\": [...]}} and be \
         precise with indices.",
        modifier_code_listing()
    )
}

impl ContentProvider for RemoteProvider {
    fn session_sentences(
        &mut self,
        difficulty: Difficulty,
        count: usize,
        focus_code: Option<u8>,
    ) -> Result<Vec<Sentence>, ProviderError> {
        let mut prompt = format!(
            "Generate {count} distinct English sentences for a grammar \
             learning game at {} level. Beginner: 1 modifier. Intermediate: \
             1-2 modifiers. Advanced: complex structure. {}",
            difficulty.as_str().to_uppercase(),
            batch_instructions()
        );
        if let Some(code) = focus_code {
            prompt.push_str(&format!(
                "\nIMPORTANT: the learner is weak at modifier code {code}. \
                 Include at least {} sentences using it.",
                (count / 2).max(1)
            ));
        }

        let text = self.generate_json_text(&self.text_model, prompt)?;
        let batch: schema::RawSentenceBatch =
            serde_json::from_str(&text).map_err(schema::SchemaError::Malformed)?;
        let id = self.next_batch_id(difficulty.as_str());
        let sentences = schema::sentences_from_batch(batch, &id, difficulty)?;
        if sentences.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(sentences)
    }

    fn parse_text(&mut self, text: &str) -> Result<Vec<Sentence>, ProviderError> {
        let prompt = format!(
            "Analyze the following English text for a grammar game. Split it \
             into sentences and tokenize each. Input text: \"{text}\". {}",
            batch_instructions()
        );
        let raw = self.generate_json_text(&self.parser_model, prompt)?;
        let batch: schema::RawSentenceBatch =
            serde_json::from_str(&raw).map_err(schema::SchemaError::Malformed)?;
        let id = self.next_batch_id("custom");
        let sentences = schema::sentences_from_batch(batch, &id, Difficulty::Intermediate)?;
        if sentences.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(sentences)
    }

    fn socratic_hint(&mut self, modifier_text: &str, correct_code: u8, wrong_code: u8) -> String {
        let (Some(correct), Some(wrong)) = (
            catalog::modifier_type(correct_code),
            catalog::modifier_type(wrong_code),
        ) else {
            return HINT_FALLBACK.to_string();
        };
        let prompt = format!(
            "A student misclassified the English modifier phrase \
             \"{modifier_text}\". Correct category: {} (code {correct_code}). \
             Student's answer: {} (code {wrong_code}). Reply with ONE short \
             Socratic question in Korean that highlights the difference \
             between the two categories without revealing the answer and \
             without saying the student is wrong.",
            correct.full_name, wrong.full_name
        );
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        self.generate(&self.text_model, body)
            .ok()
            .and_then(|r| Self::first_text(r).ok())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| HINT_FALLBACK.to_string())
    }

    fn grammar_lesson(
        &mut self,
        topic: &str,
        level: GrammarLevel,
    ) -> Result<GrammarLesson, ProviderError> {
        let topic_label = catalog::grammar_topic(topic).map_or(topic, |t| t.label);
        let distractor_rule = match level {
            GrammarLevel::Advanced => {
                "Every puzzle MUST include a 'distractor' chunk that is \
                 grammatically plausible but wrong in context."
            }
            GrammarLevel::Beginner => "Puzzles may omit the 'distractor' field.",
        };
        let prompt = format!(
            "You are a Korean middle-school English exam expert. Build a \
             learning module for the topic '{topic_label}' at {} level, in \
             Korean, as JSON with keys: concept {{title, summary (list), \
             key_distinction, exam_tip, example}}, quizzes (3 items, each \
             with question, exactly 5 options, answer, distractor_hints (one \
             conceptual rationale per option, never revealing the answer), \
             final_explanation), puzzles (7 items, each with id, \
             sentence_translation, chunks, correct_order, distractor), and \
             study_guide {{weakness_analysis, review_recommendation, \
             next_step}}. {distractor_rule} Compare the topic against its \
             most-confused sibling concept and include that contrast in \
             key_distinction.",
            level.as_str()
        );
        let text = self.generate_json_text(&self.parser_model, prompt)?;
        let lesson: GrammarLesson =
            serde_json::from_str(&text).map_err(schema::SchemaError::Malformed)?;
        schema::validate_lesson(&lesson, level)?;
        Ok(lesson)
    }

    fn speech_audio(&mut self, text: &str) -> Option<Vec<u8>> {
        let body = json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": "Kore" } }
                }
            }
        });
        let response = self.generate(&self.tts_model, body).ok()?;
        let data = response
            .candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()?
            .inline_data?
            .data;
        BASE64.decode(data).ok()
    }
}
