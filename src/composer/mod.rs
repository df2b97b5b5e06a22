pub mod settings;
pub mod store;
pub mod terminal;

use crate::models::chat::{ ChatTurn, RelayReply, Role };
use settings::{ SendMode, Settings };

use async_trait::async_trait;
use log::error;
use std::sync::Arc;
use thiserror::Error;

/// Placeholder shown while a reply is pending.
pub const PENDING_TEXT: &str = "Подождите, я думаю…";

/// Shown in place of an empty reply.
pub const EMPTY_REPLY_TEXT: &str = "(пустой ответ)";

/// Generic bubble for any failed round trip.
pub const REQUEST_FAILED_TEXT: &str = "Ошибка получения ответа. Попробуйте ещё раз.";

/// Confirmation after pinning the system instruction in on-save mode.
pub const SYSTEM_PINNED_TEXT: &str = "Системная инструкция закреплена.";

/// Confirmation after clearing the system instruction in on-save mode.
pub const SYSTEM_CLEARED_TEXT: &str = "Системные инструкции удалены.";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay returned status {status}: {body}")]
    Status {
        status: u16,
        body: String,
    },
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One request/response cycle against the relay.
#[async_trait]
pub trait RelayApi: Send + Sync {
    async fn send(
        &self,
        messages: &[ChatTurn],
        temperature: f64
    ) -> Result<RelayReply, RelayError>;
}

pub struct HttpRelay {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRelay {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RelayApi for HttpRelay {
    async fn send(
        &self,
        messages: &[ChatTurn],
        temperature: f64
    ) -> Result<RelayReply, RelayError> {
        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
        let resp = self.http
            .post(&url)
            .json(&serde_json::json!({ "messages": messages, "temperature": temperature }))
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json::<RelayReply>().await?)
    }
}

/// Rendering surface the session drives. Implementations only present;
/// all conversation state stays in the session.
pub trait Frontend {
    fn bubble(&mut self, role: Role, text: &str);
    /// Out-of-band line (confirmations, command feedback).
    fn notice(&mut self, text: &str);
    fn pending(&mut self);
    fn clear_pending(&mut self);
    fn set_busy(&mut self, busy: bool);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Sent,
    /// Empty or whitespace-only input; nothing happened.
    Ignored,
    /// A request is already in flight.
    Busy,
}

/// Client-side conversation state and the submit flow around it. One
/// request in flight at a time; the conversation is only ever appended to.
pub struct ChatSession {
    relay: Arc<dyn RelayApi>,
    pub settings: Settings,
    conversation: Vec<ChatTurn>,
    busy: bool,
}

impl ChatSession {
    pub fn new(relay: Arc<dyn RelayApi>, settings: Settings) -> Self {
        Self {
            relay,
            settings,
            conversation: Vec::new(),
            busy: false,
        }
    }

    pub fn conversation(&self) -> &[ChatTurn] {
        &self.conversation
    }

    pub async fn submit(&mut self, input: &str, ui: &mut dyn Frontend) -> Submission {
        let text = input.trim().to_string();
        if text.is_empty() {
            return Submission::Ignored;
        }
        if self.busy {
            return Submission::Busy;
        }

        self.busy = true;
        ui.set_busy(true);
        self.exchange(&text, ui).await;
        // input is re-enabled whether the round trip succeeded or not
        self.busy = false;
        ui.set_busy(false);
        Submission::Sent
    }

    async fn exchange(&mut self, text: &str, ui: &mut dyn Frontend) {
        self.conversation.push(ChatTurn::new(Role::User, text));
        ui.bubble(Role::User, text);
        ui.pending();

        let outbound = self.outbound_messages();
        let result = self.relay.send(&outbound, self.settings.temperature).await;
        ui.clear_pending();

        match result {
            Ok(reply) => {
                let shown = if reply.reply.is_empty() {
                    EMPTY_REPLY_TEXT
                } else {
                    reply.reply.as_str()
                };
                ui.bubble(Role::Assistant, shown);
                self.conversation.push(ChatTurn::new(Role::Assistant, reply.reply.clone()));
            }
            Err(err) => {
                // the already-sent user turn stays; only the reply is lost
                error!("relay request failed: {}", err);
                ui.bubble(Role::Assistant, REQUEST_FAILED_TEXT);
            }
        }
    }

    /// Turns as sent to the relay. In each-message mode the system
    /// instruction rides along with every request and is never persisted
    /// into the conversation itself. A system turn pinned earlier in
    /// on-save mode is not de-duplicated against it.
    fn outbound_messages(&self) -> Vec<ChatTurn> {
        let mut outbound = Vec::with_capacity(self.conversation.len() + 1);
        if self.settings.send_mode == SendMode::EachMessage {
            let prompt = self.settings.system_prompt.trim();
            if !prompt.is_empty() {
                outbound.push(ChatTurn::new(Role::System, prompt));
            }
        }
        outbound.extend(self.conversation.iter().cloned());
        outbound
    }

    /// Apply freshly saved settings to the conversation. Only on-save mode
    /// touches it: a non-empty instruction is pinned as exactly one system
    /// turn (no-op when the most recent system turn already carries it), a
    /// cleared instruction removes every system turn.
    pub fn apply_saved_settings(&mut self, ui: &mut dyn Frontend) {
        if self.settings.send_mode != SendMode::OnSave {
            return;
        }

        let prompt = self.settings.system_prompt.trim().to_string();
        if prompt.is_empty() {
            self.conversation.retain(|turn| turn.role != Role::System);
            ui.notice(SYSTEM_CLEARED_TEXT);
            return;
        }

        let already_pinned = self.conversation
            .iter()
            .rev()
            .find(|turn| turn.role == Role::System)
            .is_some_and(|turn| turn.content == prompt);
        if !already_pinned {
            self.conversation.retain(|turn| turn.role != Role::System);
            self.conversation.push(ChatTurn::new(Role::System, prompt));
        }
        ui.notice(SYSTEM_PINNED_TEXT);
    }
}
