//! Session coordinator
//!
//! Owns one connection end to end: gates credentials, opens the
//! transcription stream, and supervises the per-session tasks:
//!
//! - socket read loop (here), enqueueing inbound audio
//! - ingress pump, audio queue -> transcription sink
//! - transcript loop, engine events -> partial frames + utterance queue
//! - turn loop, utterance queue -> router -> egress, strictly serial
//! - writer task, sole owner of the WebSocket sink
//!
//! The utterance queue is unbounded: turns finalized while a response
//! is being spoken wait their turn, they are never dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures::StreamExt;
use tokio::sync::mpsc;
use uuid::Uuid;

use stellar_agent::{AgentError, ResponseRouter, TranscriptAggregator, TurnUpdate};
use stellar_config::PersonaConfig;
use stellar_core::{
    AudioChunk, ConversationHistory, FactSource, ResponseEngine, SynthesisEngine, TranscriptEvent,
    TranscriptionEngine, Utterance,
};
use stellar_engines::{GeminiClient, IssLocator, MurfSynthesizer, StreamingTranscriber};

use crate::credentials::{SessionCredentials, POLICY_VIOLATION};
use crate::outbound::{self, OutboundFrame};
use crate::state::AppState;
use crate::{egress, ingress, metrics, ServerError};

/// Per-connection lifecycle phase
///
/// The accept loop itself lives in axum; a failure outside any single
/// connection (the listener dying) exits `main` and is the terminal
/// server state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Accepting,
    Authenticating,
    Active,
    Closing,
}

/// One duplex voice session
pub struct VoiceSession {
    id: Uuid,
    app: AppState,
    phase: SessionState,
}

impl VoiceSession {
    pub fn new(app: AppState) -> Self {
        Self {
            id: Uuid::new_v4(),
            app,
            phase: SessionState::Accepting,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(session = %self.id, from = ?self.phase, to = ?next, "session state");
        self.phase = next;
    }

    /// Drive the session to completion. Always returns the handler to
    /// axum's accept loop, whatever happened inside.
    pub async fn run(mut self, socket: WebSocket, params: HashMap<String, String>) {
        self.transition(SessionState::Authenticating);

        let credentials = match SessionCredentials::from_query(&params) {
            Ok(credentials) => credentials,
            Err(e) => {
                metrics::record_session_rejected();
                tracing::warn!(session = %self.id, "rejecting connection: {}", e);
                close_with_policy_violation(socket, &e.to_string()).await;
                return;
            }
        };

        metrics::record_session_started();
        metrics::record_active_sessions(self.app.session_started());
        tracing::info!(session = %self.id, "session authenticated");

        if let Err(e) = self.serve(socket, credentials).await {
            tracing::error!(session = %self.id, "session ended with error: {}", e);
        }

        self.transition(SessionState::Closing);
        metrics::record_active_sessions(self.app.session_ended());
        tracing::info!(session = %self.id, "session closed");
    }

    async fn serve(
        &mut self,
        socket: WebSocket,
        credentials: SessionCredentials,
    ) -> Result<(), ServerError> {
        let config = Arc::clone(&self.app.config);

        // Engine clients are per-session, built from this session's
        // keys. No process-wide client state.
        let transcriber = StreamingTranscriber::new(
            config.engines.transcription.clone(),
            credentials.transcription_key,
        )
        .map_err(|e| ServerError::Session(e.to_string()))?;

        let responder: Arc<dyn ResponseEngine> = Arc::new(
            GeminiClient::new(config.engines.responder.clone(), credentials.responder_key)
                .map_err(|e| ServerError::Session(e.to_string()))?,
        );

        let voice: Arc<dyn SynthesisEngine> = Arc::new(
            MurfSynthesizer::new(config.engines.synthesis.clone(), credentials.synthesis_key)
                .map_err(|e| ServerError::Session(e.to_string()))?,
        );

        let facts: Arc<dyn FactSource> = Arc::new(IssLocator::new(config.engines.facts.clone()));

        // The stream opens only after the gate passed.
        let (sink, events) = transcriber
            .open(config.session.sample_rate_hz)
            .await
            .map_err(|e| ServerError::Session(e.to_string()))?;

        self.transition(SessionState::Active);

        let (ws_tx, mut ws_rx) = socket.split();
        let (frame_tx, frame_rx) = mpsc::channel(256);
        let (audio_tx, audio_rx) = mpsc::channel(config.session.audio_buffer_frames);
        let (utterance_tx, utterance_rx) = mpsc::unbounded_channel();

        let writer = outbound::spawn_writer(ws_tx, frame_rx);
        let mut ingress_task = tokio::spawn(ingress::pump(audio_rx, sink));
        let transcripts = tokio::spawn(transcript_loop(events, frame_tx.clone(), utterance_tx));

        let router = ResponseRouter::new(responder, facts, config.persona.clone());
        let turns = tokio::spawn(turn_loop(
            router,
            voice,
            config.persona.clone(),
            utterance_rx,
            frame_tx,
        ));

        // Read loop: enqueue audio without waiting on any downstream
        // processing. Ingress failure ends the session too.
        let result = loop {
            tokio::select! {
                message = ws_rx.next() => match message {
                    Some(Ok(Message::Binary(data))) => {
                        if audio_tx.send(AudioChunk::inbound(data)).await.is_err() {
                            break Err(ServerError::Ingress("audio buffer closed".to_string()));
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break Ok(()),
                    // Text and ping frames are not part of the inbound protocol.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(ServerError::Transport(e.to_string())),
                },
                pump_result = &mut ingress_task => {
                    break match pump_result {
                        Ok(Ok(())) => Ok(()),
                        Ok(Err(e)) => Err(e),
                        Err(e) => Err(ServerError::Session(format!("ingress task failed: {}", e))),
                    };
                }
            }
        };

        // Teardown. Closing the audio channel lets the pump close the
        // transcription stream; aborting the turn task abandons any
        // partially spoken response rather than requeueing it.
        drop(audio_tx);
        turns.abort();
        transcripts.abort();
        ingress_task.abort();
        writer.abort();

        result
    }
}

/// Transcript loop: aggregator over engine events.
///
/// Partial updates go straight out as live captions; finalized
/// utterances are announced and queued for the turn loop.
async fn transcript_loop(
    mut events: mpsc::Receiver<TranscriptEvent>,
    frames: mpsc::Sender<OutboundFrame>,
    utterances: mpsc::UnboundedSender<Utterance>,
) {
    let mut aggregator = TranscriptAggregator::new();

    while let Some(event) = events.recv().await {
        match aggregator.on_event(event) {
            Some(TurnUpdate::Partial(text)) => {
                if frames.send(OutboundFrame::partial(text)).await.is_err() {
                    return;
                }
            }
            Some(TurnUpdate::Finalized(utterance)) => {
                tracing::info!(utterance = %utterance, "turn finalized");
                if frames
                    .send(OutboundFrame::final_transcript(utterance.text()))
                    .await
                    .is_err()
                {
                    return;
                }
                if frames.send(OutboundFrame::end_of_turn()).await.is_err() {
                    return;
                }
                if utterances.send(utterance).is_err() {
                    return;
                }
            }
            None => {}
        }
    }
}

/// Turn loop: strictly serial respond-then-speak per utterance.
///
/// Turn-local failures degrade: a generation failure becomes the fixed
/// apology (spoken best-effort), a synthesis failure leaves the turn
/// text-only. The loop survives both and waits for the next utterance.
async fn turn_loop(
    router: ResponseRouter,
    voice: Arc<dyn SynthesisEngine>,
    persona: PersonaConfig,
    mut utterances: mpsc::UnboundedReceiver<Utterance>,
    frames: mpsc::Sender<OutboundFrame>,
) {
    let mut history = ConversationHistory::new();

    while let Some(utterance) = utterances.recv().await {
        let started = Instant::now();

        match router.respond(history.clone(), &utterance).await {
            Ok(result) => {
                history = result.history;
                if frames
                    .send(OutboundFrame::response(&result.text))
                    .await
                    .is_err()
                {
                    return;
                }
                if let Err(e) = egress::speak(voice.as_ref(), &result.text, &frames).await {
                    // The response text is already on its way; the turn
                    // degrades to text only.
                    metrics::record_error("synthesis");
                    tracing::warn!("synthesis failed, turn stays text-only: {}", e);
                }
            }
            Err(AgentError::Generation(e)) => {
                metrics::record_error("generation");
                tracing::error!("generation failed for turn: {}", e);
                if frames
                    .send(OutboundFrame::response(&persona.apology))
                    .await
                    .is_err()
                {
                    return;
                }
                if let Err(e) = egress::speak(voice.as_ref(), &persona.apology, &frames).await {
                    tracing::warn!("apology synthesis failed: {}", e);
                }
            }
            Err(AgentError::Classification(e)) => {
                // The router recovers classification internally; seeing
                // this here would be a bug.
                tracing::error!("unexpected classification error: {}", e);
            }
        }

        metrics::record_turn_duration(started.elapsed().as_secs_f64());
    }
}

async fn close_with_policy_violation(mut socket: WebSocket, reason: &str) {
    let frame = CloseFrame {
        code: POLICY_VIOLATION,
        reason: reason.to_string().into(),
    };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        tracing::debug!("close frame not delivered: {}", e);
    }
}
