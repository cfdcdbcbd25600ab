use std::env;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use exam_core::model::{
    AnswerOption, GroupContent, MediaUri, PartKey, PracticeId, Question, QuestionGroup,
    QuestionId, TestId, UserId,
};

use crate::error::BackendError;

/// Location of the REST backend, read once from the environment.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: String,
}

impl BackendConfig {
    /// Returns `None` when `EXAM_API_BASE_URL` is unset or blank; the
    /// client then reports `BackendError::NotConfigured` on every call
    /// instead of panicking at startup.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("EXAM_API_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        Some(Self { base_url })
    }

    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

/// HTTP client for the exam backend.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    config: Option<BackendConfig>,
}

impl BackendClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(BackendConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<BackendConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn configured(&self) -> bool {
        self.config.is_some()
    }

    fn base_url(&self) -> Result<&str, BackendError> {
        self.config
            .as_ref()
            .map(|config| config.base_url.trim_end_matches('/'))
            .ok_or(BackendError::NotConfigured)
    }

    /// Load one part's slice of a test: fetch the whole test payload,
    /// keep the groups whose `part.key` matches, and normalize them
    /// into the closed `QuestionGroup` shape.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` for missing configuration, transport or
    /// HTTP failures, or payloads violating the question invariants.
    pub async fn fetch_part(
        &self,
        test_id: &TestId,
        part: PartKey,
    ) -> Result<Vec<QuestionGroup>, BackendError> {
        let url = format!("{}/test/{}", self.base_url()?, test_id);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::HttpStatus(response.status()));
        }

        let body: TestResponse = response.json().await?;
        body.group_questions
            .into_iter()
            .filter(|group| group.part.key == part.key())
            .map(|group| group.normalize(part))
            .collect()
    }

    /// Submit a finished practice test.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` for missing configuration, transport or
    /// non-created HTTP responses.
    pub async fn submit_practice(
        &self,
        token: &str,
        submission: &PracticeSubmission,
    ) -> Result<PracticeId, BackendError> {
        let url = format!("{}/test-practice", self.base_url()?);

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(submission)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BackendError::HttpStatus(response.status()));
        }

        let body: SubmitResponse = response.json().await?;
        Ok(PracticeId::new(body.id))
    }

    /// Fetch the server-scored record created by `submit_practice`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` for missing configuration, transport or
    /// HTTP failures.
    pub async fn fetch_practice(
        &self,
        token: &str,
        id: &PracticeId,
    ) -> Result<ScoredResult, BackendError> {
        let url = format!("{}/test-practice/{}", self.base_url()?, id);

        let response = self.client.get(url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::HttpStatus(response.status()));
        }

        let body: TestPracticeResponse = response.json().await?;
        Ok(body.test_practice)
    }
}

//
// ─── REQUEST / RESPONSE SHAPES ─────────────────────────────────────────────────
//

/// Body of `POST /test-practice`. Only answered questions are included
/// in `user_answer`; unanswered ids are absent from the payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSubmission {
    pub user_id: UserId,
    pub test_id: TestId,
    /// Total seconds spent, summed across parts.
    pub time: u64,
    pub user_answer: Vec<UserAnswer>,
    pub is_full_test: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
    pub id_question: QuestionId,
    pub answer: String,
}

/// Server-computed scoring for a submitted practice test.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScoredResult {
    #[serde(rename = "numCorrect")]
    pub num_correct: u32,
    #[serde(rename = "totalQuestion")]
    pub total_question: u32,
    #[serde(rename = "LCScore")]
    pub lc_score: u32,
    #[serde(rename = "RCScore")]
    pub rc_score: u32,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TestPracticeResponse {
    #[serde(rename = "testPractice")]
    test_practice: ScoredResult,
}

#[derive(Debug, Deserialize)]
struct TestResponse {
    #[serde(rename = "groupQuestions", default)]
    group_questions: Vec<GroupQuestionDto>,
}

#[derive(Debug, Deserialize)]
struct GroupQuestionDto {
    part: PartRefDto,
    #[serde(default)]
    questions: Vec<QuestionDto>,
    #[serde(rename = "questionMedia", default)]
    question_media: Vec<MediaDto>,
    #[serde(default)]
    passage: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PartRefDto {
    key: String,
}

#[derive(Debug, Deserialize)]
struct MediaDto {
    #[serde(rename = "type")]
    kind: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct QuestionDto {
    id: u64,
    #[serde(rename = "questionNumber")]
    question_number: u32,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    answers: Vec<OptionDto>,
    #[serde(rename = "correctAnswer")]
    correct_answer: String,
}

#[derive(Debug, Deserialize)]
struct OptionDto {
    label: String,
    #[serde(default)]
    text: String,
    #[serde(rename = "isCorrect", default)]
    is_correct: bool,
}

impl GroupQuestionDto {
    /// Collapse the backend's loosely-typed group shapes into the
    /// closed `GroupContent` set keyed by part.
    fn normalize(self, part: PartKey) -> Result<QuestionGroup, BackendError> {
        let content = match part {
            PartKey::TextCompletion => GroupContent::Cloze {
                text: self.passage.unwrap_or_default(),
            },
            PartKey::ReadingComprehension => GroupContent::Passage {
                text: self.passage.unwrap_or_default(),
            },
            _ => {
                let mut audio = None;
                let mut image = None;
                for media in &self.question_media {
                    let uri = MediaUri::parse(&media.url)?;
                    match media.kind.as_str() {
                        "audio" if audio.is_none() => audio = Some(uri),
                        "image" if image.is_none() => image = Some(uri),
                        _ => {}
                    }
                }
                GroupContent::Media { audio, image }
            }
        };

        let questions = self
            .questions
            .into_iter()
            .map(QuestionDto::into_question)
            .collect::<Result<Vec<Question>, BackendError>>()?;

        Ok(QuestionGroup::new(content, questions))
    }
}

impl QuestionDto {
    fn into_question(self) -> Result<Question, BackendError> {
        let options = self
            .answers
            .into_iter()
            .map(|option| AnswerOption::new(option.label, option.text, option.is_correct))
            .collect();
        Ok(Question::new(
            QuestionId::new(self.id),
            self.question_number,
            self.question,
            options,
            self.correct_answer,
        )?)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn listening_group_json() -> serde_json::Value {
        serde_json::json!({
            "part": { "key": "part1" },
            "questionMedia": [
                { "type": "audio", "url": "https://cdn.example.com/a.mp3" },
                { "type": "image", "url": "https://cdn.example.com/p.jpg" }
            ],
            "questions": [{
                "id": 5,
                "questionNumber": 2,
                "correctAnswer": "B",
                "answers": [
                    { "label": "A", "text": "first" },
                    { "label": "B", "text": "second", "isCorrect": true }
                ]
            }]
        })
    }

    #[test]
    fn normalizes_listening_groups_to_media_content() {
        let dto: GroupQuestionDto = serde_json::from_value(listening_group_json()).unwrap();
        let group = dto.normalize(PartKey::Photographs).unwrap();

        let GroupContent::Media { audio, image } = group.content() else {
            panic!("expected media content");
        };
        assert_eq!(audio.as_ref().unwrap().as_str(), "https://cdn.example.com/a.mp3");
        assert_eq!(image.as_ref().unwrap().as_str(), "https://cdn.example.com/p.jpg");
        assert_eq!(group.questions()[0].correct_answer(), "B");
    }

    #[test]
    fn normalizes_passage_and_cloze_groups() {
        let json = serde_json::json!({
            "part": { "key": "part7" },
            "passage": "Once upon a time",
            "questions": []
        });
        let dto: GroupQuestionDto = serde_json::from_value(json).unwrap();
        let group = dto.normalize(PartKey::ReadingComprehension).unwrap();
        assert_eq!(
            group.content(),
            &GroupContent::Passage {
                text: "Once upon a time".into()
            }
        );

        let json = serde_json::json!({
            "part": { "key": "part6" },
            "passage": "Fill ___ the blank",
            "questions": []
        });
        let dto: GroupQuestionDto = serde_json::from_value(json).unwrap();
        let group = dto.normalize(PartKey::TextCompletion).unwrap();
        assert!(matches!(group.content(), GroupContent::Cloze { .. }));
    }

    #[test]
    fn rejects_payloads_violating_question_invariants() {
        let json = serde_json::json!({
            "part": { "key": "part1" },
            "questions": [{
                "id": 1,
                "questionNumber": 1,
                "correctAnswer": "A",
                "answers": [
                    { "label": "A", "text": "yes" },
                    { "label": "B", "text": "no" }
                ]
            }]
        });
        let dto: GroupQuestionDto = serde_json::from_value(json).unwrap();
        assert!(matches!(
            dto.normalize(PartKey::Photographs),
            Err(BackendError::Question(_))
        ));
    }

    #[test]
    fn submission_body_uses_backend_field_names() {
        let submission = PracticeSubmission {
            user_id: UserId::new("u1"),
            test_id: TestId::new("t1"),
            time: 42,
            user_answer: vec![UserAnswer {
                id_question: QuestionId::new(101),
                answer: "A".into(),
            }],
            is_full_test: true,
        };
        let body = serde_json::to_value(&submission).unwrap();
        assert_eq!(body["userId"], "u1");
        assert_eq!(body["testId"], "t1");
        assert_eq!(body["isFullTest"], true);
        assert_eq!(body["userAnswer"][0]["idQuestion"], 101);
        assert_eq!(body["userAnswer"][0]["answer"], "A");
    }

    #[test]
    fn scored_result_decodes_backend_casing() {
        let json = serde_json::json!({
            "numCorrect": 7,
            "totalQuestion": 10,
            "LCScore": 200,
            "RCScore": 150
        });
        let scored: ScoredResult = serde_json::from_value(json).unwrap();
        assert_eq!(scored.num_correct, 7);
        assert_eq!(scored.total_question, 10);
        assert_eq!(scored.lc_score, 200);
        assert_eq!(scored.rc_score, 150);
    }

    #[test]
    fn missing_base_url_is_a_configuration_error() {
        let client = BackendClient::new(None);
        assert!(!client.configured());
        assert!(matches!(
            client.base_url(),
            Err(BackendError::NotConfigured)
        ));
    }
}
