//! Response router
//!
//! Classifies each finalized utterance into one of a closed set of
//! intents and dispatches to the matching strategy. Classification
//! failure degrades to general chat; generation failure propagates.

use std::sync::Arc;

use stellar_config::PersonaConfig;
use stellar_core::{
    ConversationHistory, FactSource, Message, ResponseEngine, ResponseResult, Turn, Utterance,
};

use crate::AgentError;

/// The closed intent set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    GeneralChat,
    StoryRequest,
    FactLookup,
}

impl Intent {
    /// Map a raw classification label onto the closed set.
    ///
    /// Matched by substring containment, case-insensitive, so engine
    /// output like "Label: story-request." still resolves. Anything
    /// unrecognized is general chat.
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("story-request") {
            Intent::StoryRequest
        } else if label.contains("fact-lookup") {
            Intent::FactLookup
        } else {
            Intent::GeneralChat
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::GeneralChat => "general-chat",
            Intent::StoryRequest => "story-request",
            Intent::FactLookup => "fact-lookup",
        }
    }
}

/// Routes finalized utterances to a response strategy
pub struct ResponseRouter {
    engine: Arc<dyn ResponseEngine>,
    facts: Arc<dyn FactSource>,
    persona: PersonaConfig,
}

impl ResponseRouter {
    pub fn new(
        engine: Arc<dyn ResponseEngine>,
        facts: Arc<dyn FactSource>,
        persona: PersonaConfig,
    ) -> Self {
        Self {
            engine,
            facts,
            persona,
        }
    }

    /// Produce the response for one utterance.
    ///
    /// Returns the response text plus the history to carry into the
    /// next turn. Story and fact turns are self-contained and return
    /// the input history unchanged.
    pub async fn respond(
        &self,
        history: ConversationHistory,
        utterance: &Utterance,
    ) -> Result<ResponseResult, AgentError> {
        let intent = self.classify(utterance).await;
        tracing::info!(intent = intent.as_str(), "routing utterance");
        metrics::counter!("stellar_voice_turns_total", "intent" => intent.as_str()).increment(1);

        match intent {
            Intent::GeneralChat => self.general_chat(history, utterance).await,
            Intent::StoryRequest => self.story(history, utterance).await,
            Intent::FactLookup => self.fact(history, utterance).await,
        }
    }

    async fn classify(&self, utterance: &Utterance) -> Intent {
        match self.engine.classify(utterance.text()).await {
            Ok(label) => Intent::from_label(&label),
            Err(e) => {
                // Degrade rather than fail the turn.
                tracing::warn!("classification failed, defaulting to general chat: {}", e);
                Intent::GeneralChat
            }
        }
    }

    async fn general_chat(
        &self,
        mut history: ConversationHistory,
        utterance: &Utterance,
    ) -> Result<ResponseResult, AgentError> {
        history.ensure_preamble(&self.persona.preamble, &self.persona.acknowledgement);
        history.push(Turn::user(utterance.text()));

        let messages = Message::from_history(&history);
        let text = self
            .engine
            .generate(&messages)
            .await
            .map_err(|e| AgentError::Generation(e.to_string()))?;

        history.push(Turn::responder(text.clone()));
        Ok(ResponseResult { text, history })
    }

    async fn story(
        &self,
        history: ConversationHistory,
        utterance: &Utterance,
    ) -> Result<ResponseResult, AgentError> {
        let prompt = self.persona.story_prompt(utterance.text());
        let text = self
            .engine
            .generate(&[Message::user(prompt)])
            .await
            .map_err(|e| AgentError::Generation(e.to_string()))?;

        Ok(ResponseResult { text, history })
    }

    async fn fact(
        &self,
        history: ConversationHistory,
        utterance: &Utterance,
    ) -> Result<ResponseResult, AgentError> {
        // Never fails; placeholder text on lookup trouble.
        let fact = self.facts.fetch().await;

        let prompt = self.persona.fact_prompt(utterance.text(), &fact);
        let text = self
            .engine
            .generate(&[Message::user(prompt)])
            .await
            .map_err(|e| AgentError::Generation(e.to_string()))?;

        Ok(ResponseResult { text, history })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use stellar_core::{Error, Result as CoreResult};

    struct MockEngine {
        classify_result: CoreResult<String>,
        generate_result: CoreResult<String>,
        prompts_seen: Mutex<Vec<Vec<Message>>>,
    }

    impl MockEngine {
        fn new(classify: CoreResult<String>, generate: CoreResult<String>) -> Arc<Self> {
            Arc::new(Self {
                classify_result: classify,
                generate_result: generate,
                prompts_seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ResponseEngine for MockEngine {
        async fn classify(&self, _text: &str) -> CoreResult<String> {
            self.classify_result.clone()
        }

        async fn generate(&self, messages: &[Message]) -> CoreResult<String> {
            self.prompts_seen.lock().push(messages.to_vec());
            self.generate_result.clone()
        }
    }

    struct FixedFacts(&'static str);

    #[async_trait]
    impl FactSource for FixedFacts {
        async fn fetch(&self) -> String {
            self.0.to_string()
        }
    }

    fn router(engine: Arc<MockEngine>) -> ResponseRouter {
        ResponseRouter::new(engine, Arc::new(FixedFacts("latitude 1, longitude 2")), PersonaConfig::default())
    }

    #[test]
    fn test_label_tie_break() {
        assert_eq!(Intent::from_label("story-request"), Intent::StoryRequest);
        assert_eq!(Intent::from_label("Label: FACT-LOOKUP."), Intent::FactLookup);
        assert_eq!(Intent::from_label("general-chat"), Intent::GeneralChat);
        assert_eq!(Intent::from_label("no idea"), Intent::GeneralChat);
    }

    #[tokio::test]
    async fn test_general_chat_grows_history_and_injects_persona_once() {
        let engine = MockEngine::new(Ok("general-chat".into()), Ok("hello friend".into()));
        let router = router(engine);
        let persona = PersonaConfig::default();

        let history = ConversationHistory::new();
        let result = router
            .respond(history, &Utterance::new("hi there"))
            .await
            .unwrap();

        // preamble pair + user + responder
        assert_eq!(result.history.len(), 4);
        assert!(result.history.has_preamble(&persona.preamble));

        // Second turn must not duplicate the persona pair.
        let result = router
            .respond(result.history, &Utterance::new("and again"))
            .await
            .unwrap();
        assert_eq!(result.history.len(), 6);
        assert!(result.history.has_preamble(&persona.preamble));
    }

    #[tokio::test]
    async fn test_story_leaves_history_unchanged() {
        let engine = MockEngine::new(Ok("story-request".into()), Ok("Once upon a time".into()));
        let router = router(engine.clone());

        let mut history = ConversationHistory::new();
        history.push(Turn::user("earlier turn"));

        let result = router
            .respond(history, &Utterance::new("tell me a story about a comet"))
            .await
            .unwrap();

        assert_eq!(result.text, "Once upon a time");
        assert_eq!(result.history.len(), 1);

        // Single-shot prompt, no history replay.
        let prompts = engine.prompts_seen.lock();
        assert_eq!(prompts[0].len(), 1);
        assert!(prompts[0][0].content.contains("comet"));
    }

    #[tokio::test]
    async fn test_fact_wraps_fetched_fact() {
        let engine = MockEngine::new(Ok("fact-lookup".into()), Ok("It flies high".into()));
        let router = router(engine.clone());

        let result = router
            .respond(ConversationHistory::new(), &Utterance::new("where is the station"))
            .await
            .unwrap();

        assert_eq!(result.text, "It flies high");
        assert!(result.history.is_empty());

        let prompts = engine.prompts_seen.lock();
        assert!(prompts[0][0].content.contains("latitude 1, longitude 2"));
    }

    #[tokio::test]
    async fn test_classification_failure_defaults_to_general_chat() {
        let engine = MockEngine::new(
            Err(Error::Classification("engine down".into())),
            Ok("still here".into()),
        );
        let router = router(engine);

        let result = router
            .respond(ConversationHistory::new(), &Utterance::new("hello"))
            .await
            .unwrap();

        assert_eq!(result.text, "still here");
        // General chat grows the history, proving the fallback path ran.
        assert!(!result.history.is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let engine = MockEngine::new(
            Ok("general-chat".into()),
            Err(Error::Generation("boom".into())),
        );
        let router = router(engine);

        let err = router
            .respond(ConversationHistory::new(), &Utterance::new("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Generation(_)));
    }
}
