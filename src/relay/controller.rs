//! Relay controller: the per-event orchestration

use crate::context::models::Conversation;
use crate::context::{ConversationAssembler, WindowTrimmer};
use crate::error::{RelayError, Result};
use crate::gateway::SmsGatewayClient;
use crate::history::HistoryStore;
use crate::llm::ChatClient;
use crate::metrics::METRICS;
use crate::relay::allowlist::CountryAllowList;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Keywords that clear an identity's history instead of invoking the LLM
pub const RESET_KEYWORDS: [&str; 3] = ["CLEAR", "RESET", "NEW"];

/// Confirmation sent after a reset command
pub const RESET_CONFIRMATION: &str = "Conversation history cleared.";

/// Notice sent when the new message alone exceeds the token budget
pub const OVERSIZED_NOTICE: &str = "Sorry, your message is too large to process.";

/// True when the normalized text equals one of the reset keywords
pub fn is_reset_command(message: &str) -> bool {
    let normalized = message.trim().to_uppercase();
    RESET_KEYWORDS.iter().any(|keyword| normalized == *keyword)
}

/// Outcome of one successfully handled webhook event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The LLM replied; the turn was persisted and the reply forwarded
    Replied(String),
    /// A reset command cleared the identity's history
    HistoryCleared,
}

impl RelayOutcome {
    /// Reply text returned to the webhook caller
    pub fn reply(&self) -> &str {
        match self {
            RelayOutcome::Replied(reply) => reply,
            RelayOutcome::HistoryCleared => RESET_CONFIRMATION,
        }
    }
}

/// Drives one inbound message through validation, windowing, the LLM call,
/// persistence, and the outbound SMS.
///
/// Side effects are strictly ordered: the turn is persisted only after a
/// successful LLM response, and the SMS send happens only after persistence.
/// A failure between persistence and the send is reported, not rolled back.
pub struct RelayController {
    store: Arc<dyn HistoryStore>,
    assembler: ConversationAssembler,
    trimmer: WindowTrimmer,
    llm: ChatClient,
    gateway: SmsGatewayClient,
    allowlist: CountryAllowList,
}

impl RelayController {
    pub fn new(
        store: Arc<dyn HistoryStore>,
        assembler: ConversationAssembler,
        trimmer: WindowTrimmer,
        llm: ChatClient,
        gateway: SmsGatewayClient,
        allowlist: CountryAllowList,
    ) -> Self {
        Self {
            store,
            assembler,
            trimmer,
            llm,
            gateway,
            allowlist,
        }
    }

    /// Handle one inbound webhook event end to end
    pub async fn handle(&self, identity: &str, message: &str) -> Result<RelayOutcome> {
        let start = Instant::now();
        let result = self.process(identity, message).await;
        METRICS
            .relay_request_duration
            .observe(start.elapsed().as_secs_f64());
        METRICS.record_relay(outcome_label(&result));
        result
    }

    async fn process(&self, identity: &str, message: &str) -> Result<RelayOutcome> {
        if identity.is_empty() || message.is_empty() {
            return Err(RelayError::InvalidInput(
                "message and identity are required".to_string(),
            ));
        }

        if !self.allowlist.permits(identity) {
            warn!(identity, "blocked message from unauthorized country code");
            return Err(RelayError::Forbidden(identity.to_string()));
        }

        if is_reset_command(message) {
            return self.handle_reset(identity).await;
        }

        let turns = self.store.list(identity).await?;
        debug!(identity, turns = turns.len(), "history loaded");

        let conversation = self.assembler.assemble(identity, message, &turns)?;
        let trimmed = self.trimmer.trim(conversation);
        METRICS.record_trim(trimmed.evicted_pairs);

        if trimmed.is_unsatisfiable() {
            warn!(identity, "message exceeds token budget even without history");
            self.send_sms(identity, OVERSIZED_NOTICE).await?;
            return Err(RelayError::Oversized);
        }

        let reply = self.call_llm(&trimmed.conversation).await?;

        // The original inbound text is persisted, not the trimmed view.
        self.store.append(identity, message, &reply).await?;
        METRICS.record_turn_persisted();

        self.send_sms(identity, &reply).await?;
        info!(identity, "reply forwarded");
        Ok(RelayOutcome::Replied(reply))
    }

    async fn handle_reset(&self, identity: &str) -> Result<RelayOutcome> {
        let removed = self.store.clear(identity).await?;
        info!(identity, removed, "conversation history cleared");
        METRICS.record_reset();

        self.send_sms(identity, RESET_CONFIRMATION).await?;
        Ok(RelayOutcome::HistoryCleared)
    }

    async fn call_llm(&self, conversation: &Conversation) -> Result<String> {
        let start = Instant::now();
        let result = self.llm.complete(conversation).await;
        METRICS
            .llm_request_duration
            .observe(start.elapsed().as_secs_f64());

        match result {
            Ok(reply) => {
                METRICS.record_llm(true);
                Ok(reply)
            }
            Err(e) => {
                METRICS.record_llm(false);
                error!(error = %e, "chat completion failed");
                Err(RelayError::Upstream(e.to_string()))
            }
        }
    }

    async fn send_sms(&self, identity: &str, message: &str) -> Result<()> {
        match self.gateway.send_message(identity, message).await {
            Ok(()) => {
                METRICS.record_sms(true);
                Ok(())
            }
            Err(e) => {
                METRICS.record_sms(false);
                error!(identity, error = %e, "sms send failed");
                Err(RelayError::Upstream(e.to_string()))
            }
        }
    }
}

fn outcome_label(result: &Result<RelayOutcome>) -> &'static str {
    match result {
        Ok(RelayOutcome::Replied(_)) => "replied",
        Ok(RelayOutcome::HistoryCleared) => "reset",
        Err(RelayError::InvalidInput(_)) => "invalid_input",
        Err(RelayError::Forbidden(_)) => "forbidden",
        Err(RelayError::Oversized) => "oversized",
        Err(_) => "error",
    }
}
