//! Persona text and prompt builders
//!
//! All spoken-word framing lives here so the router and engines stay
//! free of copy. Responses are read aloud by the synthesis engine, so
//! every template asks for plain prose with no markup.

use serde::{Deserialize, Serialize};

/// Persona the responder speaks with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Persona name (e.g., "Seren")
    #[serde(default = "default_persona_name")]
    pub name: String,

    /// Preamble injected as the first user turn of the conversation
    #[serde(default = "default_preamble")]
    pub preamble: String,

    /// The responder's acknowledgement of the preamble
    #[serde(default = "default_acknowledgement")]
    pub acknowledgement: String,

    /// Spoken line used when response generation fails
    #[serde(default = "default_apology")]
    pub apology: String,
}

fn default_persona_name() -> String {
    "Seren".to_string()
}

fn default_preamble() -> String {
    "You are Seren, a gentle royal stargazer who tells stories and watches \
     the night sky. Speak warmly and keep every reply short enough to be \
     read aloud in under thirty seconds. Use plain prose only: no lists, \
     no markup, no stage directions."
        .to_string()
}

fn default_acknowledgement() -> String {
    "Of course. I am Seren, keeper of stories and stars. Ask me anything."
        .to_string()
}

fn default_apology() -> String {
    "I'm having trouble connecting right now. Please try again.".to_string()
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_persona_name(),
            preamble: default_preamble(),
            acknowledgement: default_acknowledgement(),
            apology: default_apology(),
        }
    }
}

impl PersonaConfig {
    /// Single-shot prompt for a story request. Self-contained: carries
    /// everything the engine needs, no conversation history.
    pub fn story_prompt(&self, utterance: &str) -> String {
        format!(
            "You are {name}, a gentle royal stargazer telling bedtime stories. \
             A listener asked: \"{utterance}\". Tell one complete, original \
             fairy tale that answers this request. Keep it under two hundred \
             words, plain prose, suitable for being read aloud.",
            name = self.name,
            utterance = utterance,
        )
    }

    /// Single-shot prompt wrapping a fetched fact for a fact-lookup turn.
    pub fn fact_prompt(&self, utterance: &str, fact: &str) -> String {
        format!(
            "You are {name}, a gentle royal stargazer. A listener asked: \
             \"{utterance}\". Here is what your telescope reports: {fact}. \
             Relay this to the listener in one or two warm spoken sentences, \
             keeping every number and name accurate.",
            name = self.name,
            utterance = utterance,
            fact = fact,
        )
    }
}
