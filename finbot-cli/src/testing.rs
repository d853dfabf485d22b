//! Test doubles for the chat API and the ledger.

use async_trait::async_trait;
use finbot_core::{Expense, LedgerRow};
use finbot_store::{LedgerStore, StoreError};
use rust_decimal::Decimal;
use std::sync::Mutex;

use crate::telegram::{Chat, ChatApi, Message, Reply, TelegramError, Update, User};

#[derive(Default)]
pub struct RecordingChat {
    sent: Mutex<Vec<(i64, Reply)>>,
    webhooks: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingChat {
    /// Every call fails as if Telegram were down.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn replies(&self) -> Vec<(i64, Reply)> {
        self.sent.lock().unwrap().clone()
    }

    /// Text bodies only, photos skipped.
    pub fn texts(&self) -> Vec<String> {
        self.replies()
            .into_iter()
            .filter_map(|(_, r)| match r {
                Reply::Text { text, .. } => Some(text),
                Reply::Photo { .. } => None,
            })
            .collect()
    }

    pub fn webhooks(&self) -> Vec<String> {
        self.webhooks.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    fn outage() -> TelegramError {
        TelegramError::Api {
            code: 502,
            description: "Bad Gateway".to_string(),
        }
    }
}

#[async_trait]
impl ChatApi for RecordingChat {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<(), TelegramError> {
        if self.fail {
            return Err(Self::outage());
        }
        self.sent.lock().unwrap().push((chat_id, reply.clone()));
        Ok(())
    }

    async fn set_webhook(&self, url: &str) -> Result<(), TelegramError> {
        if self.fail {
            return Err(Self::outage());
        }
        self.webhooks.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// A ledger whose backend is unreachable.
pub struct FailingLedger;

fn offline() -> StoreError {
    StoreError::Unavailable("sheet offline".to_string())
}

#[async_trait]
impl LedgerStore for FailingLedger {
    async fn ensure_header(&self) -> finbot_store::Result<()> {
        Err(offline())
    }

    async fn append_expense(&self, _expense: &Expense) -> finbot_store::Result<LedgerRow> {
        Err(offline())
    }

    async fn append_credit(&self, _amount: Decimal) -> finbot_store::Result<LedgerRow> {
        Err(offline())
    }

    async fn clear_all(&self) -> finbot_store::Result<usize> {
        Err(offline())
    }

    async fn read_all(&self) -> finbot_store::Result<Vec<LedgerRow>> {
        Err(offline())
    }
}

pub fn text_update(update_id: i64, chat_id: i64, text: &str) -> Update {
    Update {
        update_id,
        message: Some(Message {
            message_id: update_id,
            chat: Chat { id: chat_id },
            from: Some(User {
                id: 1,
                first_name: "Maria".to_string(),
                username: None,
            }),
            text: Some(text.to_string()),
        }),
    }
}
