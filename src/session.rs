//! Interview session: owns every component's state and runs one turn at a
//! time.
//!
//! A turn records the answer, feeds the style profiler, picks an adaptive
//! question, asks the generation collaborator for a reply, mines the
//! exchange for insights and themes, then decides whether the stage is done
//! and which question to show next. Generation failures never abort a turn;
//! the reply degrades to a fixed placeholder and state still moves forward.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{EngineConfig, LlmConfig};
use crate::coverage::{
    AdaptiveQuestion, QuestionEngine, QuestionKind, QuestionTarget, QuestioningSummary,
};
use crate::error::{LlmError, SessionError};
use crate::insight::{ConversationSummary, ConversationTracker, Insight};
use crate::lexicon::ThemeKind;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::prompt::{PromptParts, build_prompt};
use crate::scoring::Assessment;
use crate::signals::{LexicalScorer, SignalScorer};
use crate::stage::{Stage, StageMachine};
use crate::style::{StyleProfiler, StyleSummary};

/// Version written into every saved session.
pub const SESSION_FORMAT_VERSION: u32 = 1;

/// Reply used when the collaborator fails or times out.
pub const CONNECTION_FALLBACK: &str =
    "I'm experiencing a connection issue. Let's continue - could you tell me more?";

/// Reply used when the collaborator returns nothing.
pub const EMPTY_REPLY_FALLBACK: &str = "I'm having trouble generating a response. Could you share more about what you're experiencing?";

/// Per-call settings for the generation collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_tokens: 600,
            temperature: 0.7,
        }
    }
}

impl From<&LlmConfig> for GenerationSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            timeout: config.timeout,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// A stage change caused by a turn or an explicit skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageTransition {
    pub from: Stage,
    /// `None` when the interview is now complete.
    pub to: Option<Stage>,
}

/// Everything a processed turn produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    pub stage: Stage,
    pub reply: String,
    /// The reply is a placeholder, not collaborator output.
    pub degraded: bool,
    /// Question the engine suggested to the collaborator this turn.
    pub suggested: AdaptiveQuestion,
    pub insights: Vec<Insight>,
    pub themes: Vec<ThemeKind>,
    pub transition: Option<StageTransition>,
    /// Question to show the subject next; `None` once the interview is over.
    pub next_question: Option<AdaptiveQuestion>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Blank input; nothing changed.
    Ignored,
    /// Every stage is complete; the answer was not accepted.
    Completed,
    Replied(Box<TurnReply>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageProgress {
    pub stage: Stage,
    pub responses: usize,
    pub completed: bool,
}

/// Snapshot for progress displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionProgress {
    pub id: Uuid,
    pub current_stage: Option<Stage>,
    pub completion_percent: f64,
    pub total_responses: usize,
    pub stages: Vec<StageProgress>,
    pub conversation: ConversationSummary,
    pub questioning: QuestioningSummary,
    pub style: StyleSummary,
}

/// On-disk form of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub version: u32,
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub machine: StageMachine,
    pub tracker: ConversationTracker,
    pub engine: QuestionEngine,
    pub style: StyleProfiler,
}

/// One subject's interview.
pub struct InterviewSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    machine: StageMachine,
    tracker: ConversationTracker,
    engine: QuestionEngine,
    profiler: StyleProfiler,
    scorer: Arc<dyn SignalScorer>,
    generation: GenerationSettings,
}

impl std::fmt::Debug for InterviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterviewSession")
            .field("id", &self.id)
            .field("current_stage", &self.machine.current_stage())
            .field("total_responses", &self.machine.total_responses())
            .finish_non_exhaustive()
    }
}

impl InterviewSession {
    /// Fresh session using the lexical scorer.
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_scorer(config, Arc::new(LexicalScorer))
    }

    pub fn with_scorer(config: &EngineConfig, scorer: Arc<dyn SignalScorer>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            machine: StageMachine::new(),
            tracker: ConversationTracker::new(config.exchange_window),
            engine: QuestionEngine::new(),
            profiler: StyleProfiler::new(config.style_min_samples),
            scorer,
            generation: GenerationSettings::default(),
        }
    }

    pub fn with_generation(mut self, generation: GenerationSettings) -> Self {
        self.generation = generation;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn machine(&self) -> &StageMachine {
        &self.machine
    }

    pub fn tracker(&self) -> &ConversationTracker {
        &self.tracker
    }

    pub fn engine(&self) -> &QuestionEngine {
        &self.engine
    }

    pub fn profiler(&self) -> &StyleProfiler {
        &self.profiler
    }

    pub fn is_complete(&self) -> bool {
        self.machine.is_complete()
    }

    /// Scripted question for where the session stands; used to open or
    /// resume an interview.
    pub fn opening_question(&mut self) -> Option<&'static str> {
        self.machine.next_question()
    }

    /// Process one subject answer.
    pub async fn take_turn(&mut self, llm: &dyn LlmProvider, input: &str) -> TurnOutcome {
        let text = input.trim();
        if text.is_empty() {
            return TurnOutcome::Ignored;
        }
        let Some(stage) = self.machine.current_stage() else {
            return TurnOutcome::Completed;
        };
        if self.machine.record_answer(text).is_none() {
            return TurnOutcome::Completed;
        }

        let scorer = Arc::clone(&self.scorer);
        self.profiler.record_sample(scorer.as_ref(), text);

        let corpus = self.machine.corpus();
        let suggested = self
            .engine
            .next_question(scorer.as_ref(), &corpus, stage, text);

        let style_guidance = self.profiler.style_guidance();
        let contextual_guidance = self.tracker.contextual_guidance(stage);
        let context = self.tracker.build_context(Some(text));
        let prompt = build_prompt(&PromptParts {
            style_guidance: &style_guidance,
            contextual_guidance: &contextual_guidance,
            context: &context,
            suggestion: Some(&suggested),
        });

        let (reply, degraded) = self.generate(llm, prompt).await;
        let recorded = self
            .tracker
            .record_exchange(scorer.as_ref(), text, &reply, stage);

        let responses = self.machine.response_count(stage);
        if !self.engine.should_continue_stage(stage, responses) {
            self.machine.advance();
        }

        let next_question = if self.machine.current_stage() == Some(stage)
            && (matches!(suggested.kind, QuestionKind::DeepDive | QuestionKind::FollowUp)
                || self
                    .engine
                    .should_continue_dynamic_flow(scorer.as_ref(), &corpus))
        {
            Some(suggested.clone())
        } else {
            self.scripted_question()
        };

        let transition = match self.machine.current_stage() {
            Some(current) if current == stage => None,
            to => Some(StageTransition { from: stage, to }),
        };

        self.updated_at = Utc::now();
        tracing::debug!(
            stage = %stage,
            degraded,
            insights = recorded.insights.len(),
            advanced = transition.is_some(),
            "Turn processed"
        );

        TurnOutcome::Replied(Box::new(TurnReply {
            stage,
            reply,
            degraded,
            suggested,
            insights: recorded.insights,
            themes: recorded.themes,
            transition,
            next_question,
        }))
    }

    fn scripted_question(&mut self) -> Option<AdaptiveQuestion> {
        let text = self.machine.next_question()?;
        let stage = self.machine.current_stage()?;
        Some(AdaptiveQuestion {
            text: text.to_string(),
            kind: QuestionKind::Standard,
            target: QuestionTarget::Stage(stage),
            reasoning: "Scripted stage question".to_string(),
            priority: 0.5,
        })
    }

    async fn generate(&self, llm: &dyn LlmProvider, prompt: String) -> (String, bool) {
        let request = CompletionRequest::new(vec![ChatMessage::user(prompt)])
            .with_max_tokens(self.generation.max_tokens)
            .with_temperature(self.generation.temperature);

        let result = match tokio::time::timeout(self.generation.timeout, llm.complete(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout {
                provider: llm.model_name().to_string(),
                after: self.generation.timeout,
            }),
        };

        match result {
            Ok(response) => {
                let content = response.content.trim();
                if content.is_empty() {
                    tracing::warn!("Generation returned no text, using placeholder reply");
                    (EMPTY_REPLY_FALLBACK.to_string(), true)
                } else {
                    (content.to_string(), false)
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Generation failed, using placeholder reply");
                (CONNECTION_FALLBACK.to_string(), true)
            }
        }
    }

    /// Close the current stage without answering it.
    pub fn skip_stage(&mut self) -> Option<StageTransition> {
        let from = self.machine.current_stage()?;
        self.machine.advance();
        self.updated_at = Utc::now();
        Some(StageTransition {
            from,
            to: self.machine.current_stage(),
        })
    }

    pub fn progress(&self) -> SessionProgress {
        let corpus = self.machine.corpus();
        SessionProgress {
            id: self.id,
            current_stage: self.machine.current_stage(),
            completion_percent: self.machine.completion_percent(),
            total_responses: self.machine.total_responses(),
            stages: Stage::ALL
                .iter()
                .map(|stage| StageProgress {
                    stage: *stage,
                    responses: self.machine.response_count(*stage),
                    completed: self.machine.stage_completed(*stage),
                })
                .collect(),
            conversation: self.tracker.summary(),
            questioning: self.engine.summary(self.scorer.as_ref(), &corpus),
            style: self.profiler.summary(),
        }
    }

    /// Score the current corpus. Recomputed on every call.
    pub fn assessment(&self) -> Assessment {
        Assessment::from_machine(self.scorer.as_ref(), &self.machine)
    }

    // -- persistence --------------------------------------------------------

    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            version: SESSION_FORMAT_VERSION,
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            machine: self.machine.clone(),
            tracker: self.tracker.clone(),
            engine: self.engine.clone(),
            style: self.profiler.clone(),
        }
    }

    /// Rebuild a session from a record, rejecting inconsistent state.
    pub fn from_record(
        record: SessionRecord,
        scorer: Arc<dyn SignalScorer>,
    ) -> Result<Self, SessionError> {
        if record.version != SESSION_FORMAT_VERSION {
            return Err(SessionError::Invalid(format!(
                "unsupported session format version {}",
                record.version
            )));
        }
        record.machine.validate()?;
        record.tracker.validate()?;

        let mut profiler = record.style;
        profiler.rebuild(scorer.as_ref());

        Ok(Self {
            id: record.id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            machine: record.machine,
            tracker: record.tracker,
            engine: record.engine,
            profiler,
            scorer,
            generation: GenerationSettings::default(),
        })
    }

    /// `session_<id>.json`
    pub fn file_name(&self) -> String {
        format!("session_{}.json", self.id)
    }

    /// Save into `dir` under the session's file name.
    pub fn save_in(&mut self, dir: &Path) -> Result<PathBuf, SessionError> {
        let path = dir.join(self.file_name());
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&mut self, path: &Path) -> Result<(), SessionError> {
        self.updated_at = Utc::now();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SessionError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(&self.to_record())?;
        std::fs::write(path, json).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(id = %self.id, path = %path.display(), "Saved session");
        Ok(())
    }

    /// Load a saved session with the lexical scorer.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        Self::load_with_scorer(path, Arc::new(LexicalScorer))
    }

    pub fn load_with_scorer(
        path: &Path,
        scorer: Arc<dyn SignalScorer>,
    ) -> Result<Self, SessionError> {
        let data = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let record: SessionRecord =
            serde_json::from_str(&data).map_err(|e| SessionError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let session = Self::from_record(record, scorer).map_err(|e| match e {
            SessionError::Invalid(reason) => SessionError::Malformed {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        tracing::info!(
            id = %session.id,
            stage = ?session.machine.current_stage(),
            responses = session.machine.total_responses(),
            "Loaded session"
        );
        Ok(session)
    }

    /// Load a saved session, or start fresh when the file cannot be used.
    ///
    /// The load error, if any, is returned alongside the fresh session so the
    /// caller can report it. Nothing from a rejected file is kept.
    pub fn load_or_fresh(path: &Path, config: &EngineConfig) -> (Self, Option<SessionError>) {
        match Self::load(path) {
            Ok(session) => (session, None),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Rejected saved session, starting fresh");
                (Self::new(config), Some(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionResponse, FinishReason};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    struct EchoProvider {
        prompts: Mutex<Vec<String>>,
    }

    impl EchoProvider {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for EchoProvider {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            let prompt = request.messages[0].content.clone();
            self.prompts.lock().unwrap().push(prompt);
            Ok(CompletionResponse {
                content: "  That sounds meaningful.  ".to_string(),
                input_tokens: 10,
                output_tokens: 4,
                finish_reason: FinishReason::Stop,
            })
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl LlmProvider for SlowProvider {
        fn model_name(&self) -> &str {
            "slow"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(CompletionResponse {
                content: "too late".to_string(),
                input_tokens: 0,
                output_tokens: 0,
                finish_reason: FinishReason::Stop,
            })
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl LlmProvider for FailingProvider {
        fn model_name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            Err(LlmError::RateLimited {
                provider: "failing".to_string(),
            })
        }
    }

    fn session() -> InterviewSession {
        InterviewSession::new(&EngineConfig::default())
    }

    fn replied(outcome: TurnOutcome) -> TurnReply {
        match outcome {
            TurnOutcome::Replied(reply) => *reply,
            other => panic!("expected a reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let llm = EchoProvider::new();
        let mut session = session();
        let outcome = session.take_turn(&llm, "   \n ").await;
        assert_eq!(outcome, TurnOutcome::Ignored);
        assert_eq!(session.machine().total_responses(), 0);
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_turn_records_and_trims_reply() {
        let llm = EchoProvider::new();
        let mut session = session();
        let reply = replied(session.take_turn(&llm, "I came here to explore my path").await);

        assert_eq!(reply.stage, Stage::Introduction);
        assert_eq!(reply.reply, "That sounds meaningful.");
        assert!(!reply.degraded);
        assert_eq!(session.machine().response_count(Stage::Introduction), 1);
        assert_eq!(session.tracker().summary().total_exchanges, 1);
        assert_eq!(session.profiler().samples().len(), 1);

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("CURRENT USER INPUT: I came here to explore my path"));
        assert!(prompts[0].contains("SUGGESTED NEXT QUESTION"));
    }

    #[tokio::test]
    async fn test_introduction_advances_after_one_answer() {
        let llm = EchoProvider::new();
        let mut session = session();
        let reply = replied(session.take_turn(&llm, "Just curious about myself").await);
        assert_eq!(
            reply.transition,
            Some(StageTransition {
                from: Stage::Introduction,
                to: Some(Stage::SkillsAssessment),
            })
        );
        assert_eq!(session.machine().current_stage(), Some(Stage::SkillsAssessment));
        let next = reply.next_question.unwrap();
        assert_eq!(next.target, QuestionTarget::Stage(Stage::SkillsAssessment));
    }

    #[tokio::test]
    async fn test_timeout_degrades_reply() {
        let mut session = session().with_generation(GenerationSettings {
            timeout: Duration::from_millis(20),
            ..GenerationSettings::default()
        });
        let reply = replied(session.take_turn(&SlowProvider, "Hello there").await);
        assert!(reply.degraded);
        assert_eq!(reply.reply, CONNECTION_FALLBACK);
        assert_eq!(session.tracker().summary().total_exchanges, 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_provider_error_is_logged_and_degraded() {
        let mut session = session();
        let reply = replied(session.take_turn(&FailingProvider, "Hello there").await);
        assert!(reply.degraded);
        assert_eq!(reply.reply, CONNECTION_FALLBACK);
        assert!(logs_contain("Generation failed"));
        assert!(logs_contain("rate limited"));
    }

    #[tokio::test]
    async fn test_completed_session_rejects_answers() {
        let llm = EchoProvider::new();
        let mut session = session();
        while session.skip_stage().is_some() {}
        assert!(session.is_complete());
        assert_eq!(session.take_turn(&llm, "anything").await, TurnOutcome::Completed);
        assert_eq!(session.machine().total_responses(), 0);
    }

    #[test]
    fn test_skip_stage_reports_transition() {
        let mut session = session();
        let transition = session.skip_stage().unwrap();
        assert_eq!(transition.from, Stage::Introduction);
        assert_eq!(transition.to, Some(Stage::SkillsAssessment));
        assert!(session.machine().stage_completed(Stage::Introduction));
    }

    #[test]
    fn test_progress_counts() {
        let mut session = session();
        session.skip_stage();
        let progress = session.progress();
        assert_eq!(progress.current_stage, Some(Stage::SkillsAssessment));
        assert!((progress.completion_percent - 100.0 / 6.0).abs() < 1e-9);
        assert_eq!(progress.stages.len(), 6);
        assert!(progress.stages[0].completed);
        assert!(matches!(
            progress.style,
            StyleSummary::InsufficientData { samples_needed: 3 }
        ));
    }

    #[test]
    fn test_record_version_checked() {
        let mut record = session().to_record();
        record.version = 99;
        let err = InterviewSession::from_record(record, Arc::new(LexicalScorer)).unwrap_err();
        assert!(matches!(err, SessionError::Invalid(_)));
    }

    #[test]
    fn test_file_name_uses_id() {
        let session = session();
        assert_eq!(session.file_name(), format!("session_{}.json", session.id()));
    }
}
