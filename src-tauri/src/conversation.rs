//! In-memory conversation and the request/response cycle
//!
//! One request may be in flight at a time. `clear()` bumps a generation
//! counter; a reply that settles under an older generation is dropped.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{error, info};

use crate::client::{ChatRequest, ChatTransport, ProviderEndpoint};
use crate::models::{ConversationSnapshot, Message, Settings};

type Observer = Box<dyn Fn(&ConversationSnapshot) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input, no API key, or a request already in flight
    Ignored,
    Replied,
    Failed,
    /// The conversation was cleared before the reply arrived
    Discarded,
}

#[derive(Default)]
struct ConversationState {
    messages: Vec<Message>,
    loading: bool,
    generation: u64,
}

impl ConversationState {
    fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.messages.clone(),
            loading: self.loading,
            generation: self.generation,
        }
    }
}

pub struct Conversation {
    state: Mutex<ConversationState>,
    observer: Observer,
}

impl Conversation {
    pub fn new(observer: impl Fn(&ConversationSnapshot) + Send + Sync + 'static) -> Self {
        Self {
            state: Mutex::new(ConversationState::default()),
            observer: Box::new(observer),
        }
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        self.lock().snapshot()
    }

    /// Empties the conversation, including while a request is in flight
    pub fn clear(&self) {
        let snapshot = {
            let mut state = self.lock();
            state.messages.clear();
            state.generation += 1;
            state.snapshot()
        };
        info!("[conversation] cleared (generation {})", snapshot.generation);
        (self.observer)(&snapshot);
    }

    pub async fn submit(
        &self,
        text: &str,
        settings: &Settings,
        transport: &dyn ChatTransport,
    ) -> SubmitOutcome {
        if text.trim().is_empty() || !settings.has_api_key() {
            return SubmitOutcome::Ignored;
        }

        let (request, in_flight, snapshot) = {
            let mut state = self.lock();
            if state.loading {
                return SubmitOutcome::Ignored;
            }
            state.messages.push(Message::user(text));
            state.loading = true;
            let request = ChatRequest::new(settings.model_name.clone(), state.messages.clone());
            let in_flight = InFlight {
                conversation: self,
                generation: state.generation,
                settled: false,
            };
            (request, in_flight, state.snapshot())
        };
        (self.observer)(&snapshot);

        let endpoint = ProviderEndpoint::from(settings);
        match transport.complete(&endpoint, &request).await {
            Ok(content) => in_flight.settle(Message::assistant(content), SubmitOutcome::Replied),
            Err(e) => {
                error!("[conversation] request failed: {}", e);
                in_flight.settle(
                    Message::assistant(e.to_chat_content()),
                    SubmitOutcome::Failed,
                )
            }
        }
    }

    fn finish(&self, generation: u64, reply: Option<Message>) -> bool {
        let (appended, snapshot) = {
            let mut state = self.lock();
            let appended = match reply {
                Some(message) if state.generation == generation => {
                    state.messages.push(message);
                    true
                }
                _ => false,
            };
            state.loading = false;
            (appended, state.snapshot())
        };
        (self.observer)(&snapshot);
        appended
    }

    fn lock(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resets the loading flag when dropped, so an abandoned request never
/// leaves the input disabled.
struct InFlight<'a> {
    conversation: &'a Conversation,
    generation: u64,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, reply: Message, outcome: SubmitOutcome) -> SubmitOutcome {
        self.settled = true;
        if self.conversation.finish(self.generation, Some(reply)) {
            outcome
        } else {
            info!(
                "[conversation] dropping reply for stale generation {}",
                self.generation
            );
            SubmitOutcome::Discarded
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.conversation.finish(self.generation, None);
        }
    }
}
