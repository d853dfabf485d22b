//! Long-poll transport.

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::handlers::Dispatcher;
use crate::telegram::{ChatApi, TelegramClient, Update, UpdateSource};

/// Pause after a failed getUpdates so an outage does not spin.
const ERROR_PAUSE: Duration = Duration::from_secs(3);

/// Poll until Ctrl-C. Any registered webhook is removed first, since
/// Telegram refuses getUpdates while one is set.
pub async fn run(
    client: Arc<TelegramClient>,
    dispatcher: Dispatcher,
    timeout_secs: u64,
) -> Result<()> {
    if let Err(e) = client.delete_webhook().await {
        tracing::warn!(error = %e, "could not delete webhook before polling");
    }

    tracing::info!(timeout_secs, "polling for updates");
    poll_until(
        client.as_ref(),
        client.as_ref(),
        &dispatcher,
        timeout_secs,
        shutdown_signal(),
    )
    .await;
    tracing::info!("shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Fetch and dispatch batches until `shutdown` resolves. The shutdown
/// future lives across iterations, so a signal that arrives while a batch
/// is being handled stops the loop at the next turn.
pub async fn poll_until(
    source: &dyn UpdateSource,
    chat: &dyn ChatApi,
    dispatcher: &Dispatcher,
    timeout_secs: u64,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);
    let mut offset: Option<i64> = None;

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => return,
            result = source.get_updates(offset, timeout_secs) => {
                match result {
                    Ok(updates) => {
                        if let Some(next) = process_batch(&updates, dispatcher, chat).await {
                            offset = Some(next);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "getUpdates failed");
                        tokio::select! {
                            _ = &mut shutdown => return,
                            _ = tokio::time::sleep(ERROR_PAUSE) => {}
                        }
                    }
                }
            }
        }
    }
}

/// Dispatch a batch in order. Returns the offset acknowledging it.
pub async fn process_batch(
    updates: &[Update],
    dispatcher: &Dispatcher,
    chat: &dyn ChatApi,
) -> Option<i64> {
    let mut next = None;
    for update in updates {
        dispatcher.handle_update(update, chat).await;
        next = Some(update.update_id + 1);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BotContext;
    use crate::telegram::TelegramError;
    use crate::testing::{RecordingChat, text_update};
    use async_trait::async_trait;
    use finbot_store::MemoryLedger;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    /// Hands out one batch and fires `signal` while doing so; later calls
    /// wait forever like an idle long poll.
    struct OneBatch {
        batch: Mutex<Option<Vec<Update>>>,
        signal: Mutex<Option<oneshot::Sender<()>>>,
        offsets: Mutex<Vec<Option<i64>>>,
    }

    #[async_trait]
    impl UpdateSource for OneBatch {
        async fn get_updates(
            &self,
            offset: Option<i64>,
            _timeout_secs: u64,
        ) -> Result<Vec<Update>, TelegramError> {
            self.offsets.lock().unwrap().push(offset);
            if let Some(tx) = self.signal.lock().unwrap().take() {
                let _ = tx.send(());
            }
            let batch = self.batch.lock().unwrap().take();
            match batch {
                Some(updates) => Ok(updates),
                None => std::future::pending().await,
            }
        }
    }

    fn dispatcher() -> (Dispatcher, Arc<MemoryLedger>) {
        let ledger = Arc::new(MemoryLedger::new(chrono_tz::America::Sao_Paulo));
        let dispatcher = Dispatcher::new(Arc::new(BotContext::new(ledger.clone()).unwrap()));
        (dispatcher, ledger)
    }

    #[tokio::test]
    async fn test_batch_offset_and_order() {
        let (dispatcher, ledger) = dispatcher();
        let chat = RecordingChat::default();

        let updates = vec![
            text_update(40, 1, "10 - credito"),
            text_update(41, 1, "20 - credito"),
        ];
        let next = process_batch(&updates, &dispatcher, &chat).await;

        assert_eq!(next, Some(42));
        assert_eq!(ledger.len().await, 2);
        let texts = chat.texts();
        assert!(texts[0].contains("R$ 10.00"));
        assert!(texts[1].contains("R$ 20.00"));
    }

    #[tokio::test]
    async fn test_empty_batch_keeps_offset() {
        let (dispatcher, _) = dispatcher();
        let chat = RecordingChat::default();
        assert_eq!(process_batch(&[], &dispatcher, &chat).await, None);
    }

    #[tokio::test]
    async fn test_shutdown_during_batch_stops_loop() {
        let (dispatcher, ledger) = dispatcher();
        let chat = RecordingChat::default();
        let (tx, rx) = oneshot::channel();
        let source = OneBatch {
            batch: Mutex::new(Some(vec![text_update(7, 1, "10 - credito")])),
            signal: Mutex::new(Some(tx)),
            offsets: Mutex::new(Vec::new()),
        };

        let stopped = tokio::time::timeout(
            Duration::from_secs(5),
            poll_until(&source, &chat, &dispatcher, 30, async {
                let _ = rx.await;
            }),
        )
        .await;

        assert!(stopped.is_ok(), "loop kept polling after shutdown");
        assert_eq!(ledger.len().await, 1);
        assert_eq!(*source.offsets.lock().unwrap(), vec![None]);
    }
}
