//! One conversational turn, end to end.
//!
//! `received → classified → (retrieved | retrieval_skipped) → prompted →
//! generated → parsed → packaged`
//!
//! Only generation can fail a turn. Retrieval problems leave the prompt
//! without context; persistence problems are logged and the already-built
//! response is still returned.

use std::sync::Arc;
use std::time::Duration;

use lexdraft_retrieval::{KnowledgeSource, RetrievalOutcome};
use lexdraft_shared::{
    AppConfig, ConversationId, GeneratedResult, LexDraftError, Request, ResponseEnvelope, Result,
    StoredTurn, conversation_title,
};
use lexdraft_storage::ConversationStore;
use tracing::{debug, info, instrument, warn};

use crate::generator::Generator;
use crate::prompt::PromptAssembler;
use crate::strategy::{ClassificationStrategy, Interpretation};

/// Default bound on one generation call.
const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Default longest accepted request, in characters.
const DEFAULT_MAX_MESSAGE_CHARS: usize = 10_000;

/// Stages of a turn, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStage {
    Received,
    Classified,
    Retrieved,
    RetrievalSkipped,
    Prompted,
    Generated,
    Parsed,
    Packaged,
}

impl TurnStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Classified => "classified",
            Self::Retrieved => "retrieved",
            Self::RetrievalSkipped => "retrieval_skipped",
            Self::Prompted => "prompted",
            Self::Generated => "generated",
            Self::Parsed => "parsed",
            Self::Packaged => "packaged",
        }
    }
}

impl std::fmt::Display for TurnStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress callback for reporting turn status.
pub trait TurnProgress: Send + Sync {
    /// Called when a turn enters a new stage.
    fn stage(&self, stage: TurnStage);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl TurnProgress for SilentProgress {
    fn stage(&self, _stage: TurnStage) {}
}

/// Routes requests through classification, retrieval, generation and persistence.
pub struct ConversationOrchestrator {
    strategy: Arc<dyn ClassificationStrategy>,
    knowledge: Arc<dyn KnowledgeSource>,
    generator: Arc<dyn Generator>,
    store: Arc<dyn ConversationStore>,
    assembler: PromptAssembler,
    generation_timeout: Duration,
    max_message_chars: usize,
}

impl ConversationOrchestrator {
    pub fn new(
        strategy: Arc<dyn ClassificationStrategy>,
        knowledge: Arc<dyn KnowledgeSource>,
        generator: Arc<dyn Generator>,
        store: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            strategy,
            knowledge,
            generator,
            store,
            assembler: PromptAssembler::default(),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
        }
    }

    /// Apply the `[assistant]` limits and the generator timeout from `config`.
    pub fn configured(mut self, config: &AppConfig) -> Self {
        self.assembler = PromptAssembler::new(config.assistant.max_history_turns);
        self.generation_timeout = Duration::from_secs(config.generator.timeout_secs);
        self.max_message_chars = config.assistant.max_message_chars;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn with_history_limit(mut self, max_history_turns: usize) -> Self {
        self.assembler = PromptAssembler::new(max_history_turns);
        self
    }

    pub fn strategy(&self) -> &dyn ClassificationStrategy {
        self.strategy.as_ref()
    }

    fn enter(&self, progress: &dyn TurnProgress, stage: TurnStage) {
        debug!(stage = stage.as_str(), "turn stage");
        progress.stage(stage);
    }

    /// Run one turn.
    #[instrument(skip_all, fields(strategy = ?self.strategy.kind(), conversation = ?request.conversation_id))]
    pub async fn handle(
        &self,
        request: &Request,
        progress: &dyn TurnProgress,
    ) -> Result<ResponseEnvelope> {
        self.validate(request)?;
        let text = request.text.as_str();
        self.enter(progress, TurnStage::Received);

        let (conversation_id, history) = self.load_history(request.conversation_id).await;

        let classification = self.strategy.classify(text, &history);
        if !classification.is_valid {
            debug!("request looks nonsensical");
        }
        debug!(
            category = %classification.category,
            document_type = ?classification.document_type,
            is_valid = classification.is_valid,
            "request classified"
        );
        self.enter(progress, TurnStage::Classified);

        let retrieval = if self.strategy.should_retrieve(&classification) {
            let outcome = self.knowledge.retrieve(text).await;
            if let RetrievalOutcome::Degraded { message } = &outcome {
                warn!(%message, "continuing without knowledge context");
            }
            self.enter(progress, TurnStage::Retrieved);
            outcome
        } else {
            self.enter(progress, TurnStage::RetrievalSkipped);
            RetrievalOutcome::Retrieved {
                snippets: Vec::new(),
                sources: Vec::new(),
            }
        };
        let (snippets, sources) = retrieval.into_parts();

        let bundle = self.assembler.assemble(
            self.strategy.system_prompt(&classification),
            &history,
            self.strategy
                .compose_user_turn(text, &classification, &snippets),
        );
        self.enter(progress, TurnStage::Prompted);

        let generated = self.generate(&bundle).await?;
        self.enter(progress, TurnStage::Generated);

        let Interpretation {
            content,
            is_legal_draft,
            document_type,
        } = self.strategy.interpret(&generated.raw_text, &classification);
        self.enter(progress, TurnStage::Parsed);

        let turns = [
            StoredTurn::user(text),
            StoredTurn::assistant(content.clone(), is_legal_draft, document_type.clone()),
        ];
        let conversation_id = self.record(conversation_id, text, &turns).await;

        let envelope = ResponseEnvelope {
            content,
            is_legal_draft,
            document_type,
            sources,
            conversation_id,
        };
        info!(
            stage = TurnStage::Packaged.as_str(),
            category = %classification.category,
            document_type = ?envelope.document_type,
            is_legal_draft = envelope.is_legal_draft,
            sources = envelope.sources.len(),
            "turn complete"
        );
        progress.stage(TurnStage::Packaged);
        Ok(envelope)
    }

    fn validate(&self, request: &Request) -> Result<()> {
        if request.text.trim().is_empty() {
            return Err(LexDraftError::validation("message is empty"));
        }
        let chars = request.text.chars().count();
        if chars > self.max_message_chars {
            return Err(LexDraftError::validation(format!(
                "message is {chars} characters, the limit is {}",
                self.max_message_chars
            )));
        }
        Ok(())
    }

    /// Prior turns of the requested conversation. Unknown or unreadable
    /// conversations start fresh.
    async fn load_history(
        &self,
        id: Option<ConversationId>,
    ) -> (Option<ConversationId>, Vec<StoredTurn>) {
        let Some(id) = id else {
            return (None, Vec::new());
        };
        match self.store.get_conversation(id).await {
            Ok(snapshot) => (Some(id), snapshot.turns),
            Err(e) => {
                warn!(conversation = %id, error = %e, "conversation unavailable, starting a new one");
                (None, Vec::new())
            }
        }
    }

    async fn generate(&self, bundle: &lexdraft_shared::PromptBundle) -> Result<GeneratedResult> {
        match tokio::time::timeout(self.generation_timeout, self.generator.generate(bundle)).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e @ LexDraftError::Generation(_))) => Err(e),
            Ok(Err(e)) => Err(LexDraftError::Generation(e.to_string())),
            Err(_) => Err(LexDraftError::GenerationTimeout {
                limit: self.generation_timeout,
            }),
        }
    }

    /// Store the exchange. Failures are logged, never returned.
    async fn record(
        &self,
        existing: Option<ConversationId>,
        text: &str,
        turns: &[StoredTurn],
    ) -> Option<ConversationId> {
        match existing {
            Some(id) => {
                if let Err(e) = self.store.append_turns(id, turns).await {
                    warn!(conversation = %id, error = %e, "failed to record turn");
                }
                Some(id)
            }
            None => match self
                .store
                .create_conversation(&conversation_title(text), turns)
                .await
            {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(error = %e, "failed to create conversation");
                    None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use lexdraft_shared::{
        ConversationSnapshot, ConversationSummary, KnowledgeSnippet, PromptBundle, Role,
        SourceDescriptor, StrategyKind,
    };

    use super::*;
    use crate::strategy::strategy_for;
    use crate::system_prompts;

    // -- stubs --------------------------------------------------------------

    struct StubGenerator {
        reply: std::result::Result<String, String>,
        delay: Duration,
        seen: Mutex<Vec<PromptBundle>>,
    }

    impl StubGenerator {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.into()),
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.into()),
                ..Self::replying("")
            }
        }

        fn last_bundle(&self) -> PromptBundle {
            self.seen.lock().unwrap().last().cloned().expect("generator was called")
        }
    }

    #[async_trait]
    impl Generator for StubGenerator {
        async fn generate(&self, bundle: &PromptBundle) -> Result<GeneratedResult> {
            self.seen.lock().unwrap().push(bundle.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.reply {
                Ok(text) => Ok(GeneratedResult {
                    raw_text: text.clone(),
                }),
                Err(message) => Err(LexDraftError::Generation(message.clone())),
            }
        }
    }

    struct StubKnowledge {
        outcome: RetrievalOutcome,
        calls: AtomicUsize,
    }

    impl StubKnowledge {
        fn with(outcome: RetrievalOutcome) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KnowledgeSource for StubKnowledge {
        async fn retrieve(&self, _text: &str) -> RetrievalOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        conversations: Mutex<HashMap<ConversationId, ConversationSnapshot>>,
        broken: bool,
    }

    impl MemoryStore {
        fn broken() -> Self {
            Self {
                broken: true,
                ..Default::default()
            }
        }

        fn snapshot(&self, id: ConversationId) -> ConversationSnapshot {
            self.conversations.lock().unwrap()[&id].clone()
        }

        fn seed(&self, turns: Vec<StoredTurn>) -> ConversationId {
            let id = ConversationId::new();
            let now = chrono::Utc::now();
            self.conversations.lock().unwrap().insert(
                id,
                ConversationSnapshot {
                    id,
                    title: "seeded".into(),
                    turns,
                    created_at: now,
                    updated_at: now,
                },
            );
            id
        }

        fn check(&self) -> Result<()> {
            if self.broken {
                Err(LexDraftError::Storage("disk full".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ConversationStore for MemoryStore {
        async fn create_conversation(
            &self,
            title: &str,
            initial_turns: &[StoredTurn],
        ) -> Result<ConversationId> {
            self.check()?;
            let id = self.seed(initial_turns.to_vec());
            if let Some(c) = self.conversations.lock().unwrap().get_mut(&id) {
                c.title = title.to_string();
            }
            Ok(id)
        }

        async fn append_turns(&self, id: ConversationId, turns: &[StoredTurn]) -> Result<()> {
            self.check()?;
            let mut conversations = self.conversations.lock().unwrap();
            let c = conversations
                .get_mut(&id)
                .ok_or(LexDraftError::ConversationNotFound(id))?;
            c.turns.extend_from_slice(turns);
            Ok(())
        }

        async fn get_conversation(&self, id: ConversationId) -> Result<ConversationSnapshot> {
            self.check()?;
            self.conversations
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or(LexDraftError::ConversationNotFound(id))
        }

        async fn list_conversations(&self, _limit: u32) -> Result<Vec<ConversationSummary>> {
            self.check()?;
            Ok(Vec::new())
        }
    }

    struct RecordingProgress(Mutex<Vec<TurnStage>>);

    impl TurnProgress for RecordingProgress {
        fn stage(&self, stage: TurnStage) {
            self.0.lock().unwrap().push(stage);
        }
    }

    // -- fixtures -----------------------------------------------------------

    const NDA_REQUEST: &str = "Draft a confidentiality agreement between Acme Corp and Beta LLC covering trade secrets for five years";

    fn agreement_text() -> String {
        let mut text = String::from(
            "SERVICE AGREEMENT\n\nThis Agreement is made between Acme Corp and Beta LLC.\n\n\
             WHEREAS the parties wish to protect confidential information;\n\n\
             Section 1. Definitions.\n",
        );
        while text.len() < 600 {
            text.push_str("Each party shall keep the other party's information confidential. ");
        }
        text
    }

    fn nda_knowledge() -> RetrievalOutcome {
        let source = SourceDescriptor::local("contracts/nda.txt");
        RetrievalOutcome::Retrieved {
            snippets: vec![KnowledgeSnippet {
                content: "Trade secrets remain protected while secret.".into(),
                relevance: 0.87,
                source: source.clone(),
            }],
            sources: vec![source],
        }
    }

    struct Harness {
        generator: Arc<StubGenerator>,
        knowledge: Arc<StubKnowledge>,
        store: Arc<MemoryStore>,
        orchestrator: ConversationOrchestrator,
    }

    fn harness(
        kind: StrategyKind,
        generator: StubGenerator,
        knowledge: RetrievalOutcome,
        store: MemoryStore,
    ) -> Harness {
        let generator = Arc::new(generator);
        let knowledge = Arc::new(StubKnowledge::with(knowledge));
        let store = Arc::new(store);
        let orchestrator = ConversationOrchestrator::new(
            strategy_for(kind),
            knowledge.clone(),
            generator.clone(),
            store.clone(),
        );
        Harness {
            generator,
            knowledge,
            store,
            orchestrator,
        }
    }

    // -- tests --------------------------------------------------------------

    #[tokio::test]
    async fn greeting_skips_retrieval() {
        let h = harness(
            StrategyKind::Heuristic,
            StubGenerator::replying("Hello! I can help you draft legal documents."),
            nda_knowledge(),
            MemoryStore::default(),
        );

        let envelope = h
            .orchestrator
            .handle(&Request::new("hi"), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(h.knowledge.calls(), 0);
        assert!(!envelope.is_legal_draft);
        assert_eq!(envelope.document_type, None);
        assert!(envelope.sources.is_empty());

        let bundle = h.generator.last_bundle();
        assert_eq!(bundle.system_prompt, system_prompts::LEGAL_CONVERSATIONAL);
        assert_eq!(bundle.turns, vec![lexdraft_shared::Turn::user("hi")]);

        let stored = h.store.snapshot(envelope.conversation_id.expect("recorded"));
        assert_eq!(stored.title, "hi");
        assert_eq!(stored.turns.len(), 2);
    }

    #[tokio::test]
    async fn draft_request_uses_knowledge_and_detects_draft() {
        let h = harness(
            StrategyKind::Heuristic,
            StubGenerator::replying(&agreement_text()),
            nda_knowledge(),
            MemoryStore::default(),
        );
        let progress = RecordingProgress(Mutex::new(Vec::new()));

        let envelope = h
            .orchestrator
            .handle(&Request::new(NDA_REQUEST), &progress)
            .await
            .unwrap();

        assert_eq!(h.knowledge.calls(), 1);
        assert!(envelope.is_legal_draft);
        assert_eq!(envelope.document_type.as_deref(), Some("contract"));
        assert_eq!(envelope.sources, vec![SourceDescriptor::local("contracts/nda.txt")]);

        let bundle = h.generator.last_bundle();
        let user_turn = &bundle.turns.last().unwrap().content;
        assert!(user_turn.starts_with("Context:\nLegal Knowledge:\n[Relevance Score: 0.87]\n"));
        assert!(user_turn.ends_with(&format!("Request: {NDA_REQUEST}")));

        let stored = h.store.snapshot(envelope.conversation_id.unwrap());
        assert_eq!(stored.title, conversation_title(NDA_REQUEST));
        assert!(stored.title.ends_with("..."));
        assert!(stored.turns[1].is_legal_draft);
        assert_eq!(stored.turns[0].content, NDA_REQUEST);

        assert_eq!(
            *progress.0.lock().unwrap(),
            vec![
                TurnStage::Received,
                TurnStage::Classified,
                TurnStage::Retrieved,
                TurnStage::Prompted,
                TurnStage::Generated,
                TurnStage::Parsed,
                TurnStage::Packaged,
            ]
        );
    }

    #[tokio::test]
    async fn degraded_retrieval_still_completes() {
        let h = harness(
            StrategyKind::Heuristic,
            StubGenerator::replying(&agreement_text()),
            RetrievalOutcome::Degraded {
                message: "failed to load vector database".into(),
            },
            MemoryStore::default(),
        );

        let envelope = h
            .orchestrator
            .handle(&Request::new(NDA_REQUEST), &SilentProgress)
            .await
            .unwrap();

        assert!(envelope.sources.is_empty());
        let bundle = h.generator.last_bundle();
        assert_eq!(
            bundle.turns.last().unwrap().content,
            format!("Request: {NDA_REQUEST}")
        );
    }

    #[tokio::test]
    async fn generation_failure_fails_turn_and_records_nothing() {
        let h = harness(
            StrategyKind::Heuristic,
            StubGenerator::failing("HTTP 500"),
            nda_knowledge(),
            MemoryStore::default(),
        );

        let err = h
            .orchestrator
            .handle(&Request::new(NDA_REQUEST), &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, LexDraftError::Generation(_)));
        assert!(err.is_fatal_to_turn());
        assert!(h.store.conversations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn slow_generator_times_out() {
        let mut generator = StubGenerator::replying("too late");
        generator.delay = Duration::from_secs(5);
        let mut h = harness(
            StrategyKind::Heuristic,
            generator,
            nda_knowledge(),
            MemoryStore::default(),
        );
        h.orchestrator = h
            .orchestrator
            .with_generation_timeout(Duration::from_millis(50));

        let err = h
            .orchestrator
            .handle(&Request::new("hi"), &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LexDraftError::GenerationTimeout { limit } if limit == Duration::from_millis(50)
        ));
        assert_eq!(err.to_string(), "generation timed out after 50ms");
        assert!(err.is_fatal_to_turn());
    }

    #[tokio::test]
    async fn persistence_failure_still_returns_envelope() {
        let h = harness(
            StrategyKind::Heuristic,
            StubGenerator::replying("Hello! How can I help?"),
            nda_knowledge(),
            MemoryStore::broken(),
        );

        let envelope = h
            .orchestrator
            .handle(&Request::new("hello"), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(envelope.content, "Hello! How can I help?");
        assert_eq!(envelope.conversation_id, None);
    }

    #[tokio::test]
    async fn continuation_replays_history_and_appends() {
        let store = MemoryStore::default();
        let id = store.seed(vec![
            StoredTurn::user("I need a contract"),
            StoredTurn::assistant(
                "Happy to help. Who are the parties and what is the subject matter?",
                false,
                None,
            ),
        ]);
        let h = harness(
            StrategyKind::Heuristic,
            StubGenerator::replying(&agreement_text()),
            nda_knowledge(),
            store,
        );

        let request = Request::new("Acme Corp and Beta LLC, software development services")
            .in_conversation(id);
        let envelope = h
            .orchestrator
            .handle(&request, &SilentProgress)
            .await
            .unwrap();

        assert_eq!(envelope.conversation_id, Some(id));
        assert_eq!(envelope.document_type.as_deref(), Some("contract"));
        assert_eq!(h.knowledge.calls(), 1);

        let bundle = h.generator.last_bundle();
        assert_eq!(bundle.turns.len(), 3);
        assert_eq!(bundle.turns[0].content, "I need a contract");
        assert_eq!(bundle.turns[1].role, Role::Assistant);
        assert_eq!(
            bundle.system_prompt,
            system_prompts::document_prompt(lexdraft_shared::DocumentType::Contract)
        );

        assert_eq!(h.store.snapshot(id).turns.len(), 4);
    }

    #[tokio::test]
    async fn unknown_conversation_starts_a_new_one() {
        let h = harness(
            StrategyKind::Heuristic,
            StubGenerator::replying("Hello!"),
            nda_knowledge(),
            MemoryStore::default(),
        );
        let missing = ConversationId::new();

        let envelope = h
            .orchestrator
            .handle(&Request::new("hello").in_conversation(missing), &SilentProgress)
            .await
            .unwrap();

        let id = envelope.conversation_id.expect("new conversation");
        assert_ne!(id, missing);
        assert_eq!(h.store.snapshot(id).turns.len(), 2);
    }

    #[tokio::test]
    async fn history_window_limits_replayed_turns() {
        let store = MemoryStore::default();
        let turns: Vec<StoredTurn> = (0..10)
            .flat_map(|i| {
                [
                    StoredTurn::user(format!("question {i}")),
                    StoredTurn::assistant(format!("answer {i}"), false, None),
                ]
            })
            .collect();
        let id = store.seed(turns);
        let mut h = harness(
            StrategyKind::Heuristic,
            StubGenerator::replying("Sure."),
            nda_knowledge(),
            store,
        );
        h.orchestrator = h.orchestrator.with_history_limit(4);

        h.orchestrator
            .handle(&Request::new("thanks").in_conversation(id), &SilentProgress)
            .await
            .unwrap();

        let bundle = h.generator.last_bundle();
        assert_eq!(bundle.turns.len(), 5);
        assert_eq!(bundle.turns[0].content, "question 8");
    }

    #[tokio::test]
    async fn tagged_strategy_always_retrieves_and_strips_tag() {
        let h = harness(
            StrategyKind::Tagged,
            StubGenerator::replying("[LEGAL_DRAFT][CONTRACT]\n\nSERVICE AGREEMENT\n..."),
            nda_knowledge(),
            MemoryStore::default(),
        );

        let envelope = h
            .orchestrator
            .handle(&Request::new("hi"), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(h.knowledge.calls(), 1);
        assert!(envelope.is_legal_draft);
        assert_eq!(envelope.document_type.as_deref(), Some("contract"));
        assert_eq!(envelope.content, "SERVICE AGREEMENT\n...");
        assert_eq!(envelope.sources.len(), 1);

        let bundle = h.generator.last_bundle();
        assert_eq!(bundle.system_prompt, system_prompts::SELF_TAGGING);
        assert!(bundle.turns[0].content.starts_with("Context:\n"));

        let stored = h.store.snapshot(envelope.conversation_id.unwrap());
        assert_eq!(stored.turns[1].content, "SERVICE AGREEMENT\n...");
    }

    #[tokio::test]
    async fn tagged_strategy_defaults_untagged_output_to_general() {
        let h = harness(
            StrategyKind::Tagged,
            StubGenerator::replying("Sure, here is an answer"),
            RetrievalOutcome::Retrieved {
                snippets: vec![],
                sources: vec![],
            },
            MemoryStore::default(),
        );

        let envelope = h
            .orchestrator
            .handle(&Request::new("What is consideration in contract law?"), &SilentProgress)
            .await
            .unwrap();

        assert!(!envelope.is_legal_draft);
        assert_eq!(envelope.document_type, None);
        assert_eq!(envelope.content, "Sure, here is an answer");
        let bundle = h.generator.last_bundle();
        assert_eq!(bundle.turns[0].content, "What is consideration in contract law?");
    }

    #[tokio::test]
    async fn invalid_requests_are_rejected_before_any_work() {
        let h = harness(
            StrategyKind::Heuristic,
            StubGenerator::replying("unused"),
            nda_knowledge(),
            MemoryStore::default(),
        );

        let err = h
            .orchestrator
            .handle(&Request::new("   "), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, LexDraftError::Validation { .. }));

        let long = "a ".repeat(DEFAULT_MAX_MESSAGE_CHARS);
        let err = h
            .orchestrator
            .handle(&Request::new(long), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, LexDraftError::Validation { .. }));

        assert!(h.generator.seen.lock().unwrap().is_empty());
        assert_eq!(h.knowledge.calls(), 0);
    }
}
