use anyhow::Result;
use finbot_core::TransactionParser;
use finbot_store::LedgerStore;
use std::sync::Arc;

/// Shared state for both transports: the compiled grammar and the ledger.
pub struct BotContext {
    pub parser: TransactionParser,
    pub ledger: Arc<dyn LedgerStore>,
}

impl BotContext {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Result<Self> {
        Ok(Self {
            parser: TransactionParser::new()?,
            ledger,
        })
    }
}
