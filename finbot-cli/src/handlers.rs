//! Update dispatch shared by the polling loop and the webhook server.
//!
//! Replies go out one by one as they are produced, so the user sees the
//! "generating" notice before the report. Send failures are logged and the
//! remaining replies still go out.

use finbot_report::Report;
use std::sync::Arc;

use crate::commands::{Command, Inbound, classify};
use crate::context::BotContext;
use crate::replies;
use crate::telegram::{ChatApi, Reply, Update};

#[derive(Clone)]
pub struct Dispatcher {
    ctx: Arc<BotContext>,
}

impl Dispatcher {
    pub fn new(ctx: Arc<BotContext>) -> Self {
        Self { ctx }
    }

    /// Handle one update. Updates without a text message are ignored.
    pub async fn handle_update(&self, update: &Update, chat: &dyn ChatApi) {
        let Some(message) = &update.message else {
            tracing::debug!(update_id = update.update_id, "ignoring update without message");
            return;
        };
        let Some(text) = message.text.as_deref() else {
            tracing::debug!(update_id = update.update_id, "ignoring non-text message");
            return;
        };

        let chat_id = message.chat.id;
        match classify(text) {
            Inbound::Command(command) => self.command(chat_id, command, chat).await,
            Inbound::Transaction(line) => self.transaction(chat_id, line, chat).await,
        }
    }

    async fn reply(&self, chat: &dyn ChatApi, chat_id: i64, reply: Reply) {
        if let Err(e) = chat.send(chat_id, &reply).await {
            tracing::warn!(chat_id, error = %e, "failed to send reply");
        }
    }

    async fn command(&self, chat_id: i64, command: Command, chat: &dyn ChatApi) {
        tracing::info!(chat_id, ?command, "command");
        match command {
            Command::Start => {
                self.reply(chat, chat_id, Reply::markdown(replies::WELCOME))
                    .await
            }
            Command::ClearTable => self.clear_table(chat_id, chat).await,
            Command::Statistics => self.statistics(chat_id, chat).await,
            Command::Unknown(_) => {
                self.reply(chat, chat_id, Reply::markdown(replies::UNKNOWN_COMMAND))
                    .await
            }
        }
    }

    async fn clear_table(&self, chat_id: i64, chat: &dyn ChatApi) {
        let text = match self.ctx.ledger.clear_all().await {
            Ok(removed) => {
                tracing::info!(chat_id, removed, "ledger cleared");
                replies::TABLE_CLEARED
            }
            Err(e) => {
                tracing::error!(chat_id, error = %e, "clear table failed");
                replies::CLEAR_FAILED
            }
        };
        self.reply(chat, chat_id, Reply::text(text)).await;
    }

    async fn statistics(&self, chat_id: i64, chat: &dyn ChatApi) {
        self.reply(chat, chat_id, Reply::text(replies::GENERATING))
            .await;

        let rows = match self.ctx.ledger.read_all().await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(chat_id, error = %e, "reading ledger failed");
                self.reply(chat, chat_id, Reply::text(replies::STATISTICS_FAILED))
                    .await;
                return;
            }
        };

        if rows.is_empty() {
            self.reply(chat, chat_id, Reply::text(replies::NO_DATA))
                .await;
            return;
        }

        let report = Report::from_rows(&rows);
        self.reply(chat, chat_id, Reply::markdown(report.summary.to_markdown()))
            .await;

        // Rendering is CPU-bound.
        let rendered = match tokio::task::spawn_blocking(move || report.render()).await {
            Ok(Ok(charts)) => charts,
            Ok(Err(e)) => {
                tracing::error!(chat_id, error = %format!("{e:#}"), "chart rendering failed");
                self.reply(chat, chat_id, Reply::text(replies::STATISTICS_FAILED))
                    .await;
                return;
            }
            Err(e) => {
                tracing::error!(chat_id, error = %e, "chart rendering task failed");
                self.reply(chat, chat_id, Reply::text(replies::STATISTICS_FAILED))
                    .await;
                return;
            }
        };

        tracing::info!(chat_id, rows = rows.len(), charts = rendered.len(), "sending report");
        for chart in rendered {
            let photo = Reply::Photo {
                file_name: chart.kind.file_name(),
                caption: chart.kind.caption().to_string(),
                png: chart.png,
            };
            self.reply(chat, chat_id, photo).await;
        }

        self.reply(chat, chat_id, Reply::text(replies::REPORT_DONE))
            .await;
    }

    async fn transaction(&self, chat_id: i64, line: &str, chat: &dyn ChatApi) {
        let Some(txn) = self.ctx.parser.parse(line) else {
            tracing::info!(chat_id, "unrecognized message format");
            self.reply(chat, chat_id, Reply::markdown(replies::INVALID_FORMAT))
                .await;
            return;
        };

        let text = match self.ctx.ledger.append(&txn).await {
            Ok(row) => {
                tracing::info!(
                    chat_id,
                    kind = txn.kind().label(),
                    amount = %txn.amount(),
                    timestamp = %row.timestamp,
                    "transaction recorded"
                );
                replies::recorded(&txn)
            }
            Err(e) => {
                tracing::error!(chat_id, error = %e, "recording transaction failed");
                replies::record_failed(&txn).to_string()
            }
        };
        self.reply(chat, chat_id, Reply::text(text)).await;
    }
}
