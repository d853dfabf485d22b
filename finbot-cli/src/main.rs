use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use finbot_core::time::{format_timestamp, local_now};
use finbot_core::{LedgerRow, TransactionParser};
use finbot_store::{LedgerStore, MemoryLedger};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{Config, LedgerBackend};
use context::BotContext;
use handlers::Dispatcher;
use telegram::{ChatApi, TelegramClient};
use webhook::{AppState, run_server};

mod commands;
mod config;
mod context;
mod handlers;
mod logging;
mod polling;
mod replies;
mod telegram;
#[cfg(test)]
mod testing;
mod webhook;

#[derive(Parser, Debug)]
#[command(name = "finbot", version, about = "Family finance Telegram bot")]
struct Cli {
    /// TOML settings file (defaults to ./finbot.toml when present)
    #[arg(long, env = "FINBOT_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the bot with long polling (default)
    Poll,

    /// Run the bot behind the HTTP webhook server
    Serve,

    /// Decode GOOGLE_CREDENTIALS_BASE64 into the credentials file
    SetupCredentials,

    /// Print a key file as base64, for GOOGLE_CREDENTIALS_BASE64
    EncodeCredentials {
        #[arg(long, default_value = config::DEFAULT_CREDENTIALS_FILE)]
        file: PathBuf,
    },

    /// Parse a message and print the row it would record
    Check {
        /// e.g. "50,00 - Pix - Mercado (feira) - Maria"
        line: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let cfg = Config::load(cli.config.as_deref())?;
    logging::init(&cfg.log)?;

    match cli.command.unwrap_or(Command::Poll) {
        Command::Poll => {
            let (client, dispatcher) = start_bot(&cfg).await?;
            polling::run(client, dispatcher, cfg.telegram.poll_timeout_secs).await?;
        }

        Command::Serve => {
            let (client, dispatcher) = start_bot(&cfg).await?;
            match cfg.webhook_url() {
                Some(url) => match client.set_webhook(&url).await {
                    Ok(()) => tracing::info!(%url, "webhook registered"),
                    Err(e) => tracing::error!(error = %e, %url, "setWebhook failed"),
                },
                None => tracing::warn!(
                    "no public URL configured; register the webhook via POST /set_webhook"
                ),
            }

            let state = AppState {
                dispatcher,
                chat: client as Arc<dyn ChatApi>,
                build: env!("FINBOT_BUILD_SHA"),
            };
            run_server(state, &cfg.server.host, cfg.server.port).await?;
        }

        Command::SetupCredentials => {
            let encoded = cfg
                .sheets
                .credentials_base64
                .as_deref()
                .context("GOOGLE_CREDENTIALS_BASE64 is not set")?;
            let path = &cfg.sheets.credentials_file;
            finbot_store::write_credentials(encoded, path)?;
            println!("Wrote {}", path.display());
        }

        Command::EncodeCredentials { file } => {
            println!("{}", finbot_store::encode_credentials_file(&file)?);
        }

        Command::Check { line } => check_line(&line, &cfg)?,
    }

    Ok(())
}

/// Verify the token, open the ledger and build the dispatcher.
async fn start_bot(cfg: &Config) -> Result<(Arc<TelegramClient>, Dispatcher)> {
    let tz = cfg.validate()?;

    let client = Arc::new(TelegramClient::new(
        &cfg.telegram.api_base,
        &cfg.telegram.token,
    ));
    let me = client
        .get_me()
        .await
        .context("Telegram rejected the bot token")?;
    tracing::info!(
        bot = me.username.as_deref().unwrap_or(&me.first_name),
        build = env!("FINBOT_BUILD_SHA"),
        "connected to Telegram"
    );

    let ledger = open_ledger(cfg, tz).await?;
    if let Err(e) = ledger.ensure_header().await {
        tracing::warn!(error = %e, "could not check the sheet header");
    }

    let ctx = BotContext::new(ledger)?;
    Ok((client, Dispatcher::new(Arc::new(ctx))))
}

async fn open_ledger(cfg: &Config, tz: chrono_tz::Tz) -> Result<Arc<dyn LedgerStore>> {
    match cfg.sheets.backend {
        LedgerBackend::Memory => {
            tracing::warn!("using the in-memory ledger; rows are lost on exit");
            Ok(Arc::new(MemoryLedger::new(tz)))
        }
        LedgerBackend::Sheets => open_sheets(cfg, tz).await,
    }
}

#[cfg(feature = "sheets")]
async fn open_sheets(cfg: &Config, tz: chrono_tz::Tz) -> Result<Arc<dyn LedgerStore>> {
    use finbot_store::{SheetsConfig, SheetsLedger};

    let path = &cfg.sheets.credentials_file;
    if let Some(encoded) = cfg.sheets.credentials_base64.as_deref() {
        finbot_store::write_credentials(encoded, path)?;
        tracing::info!(path = %path.display(), "credentials written from GOOGLE_CREDENTIALS_BASE64");
    }
    ensure_exists(path)?;

    let ledger = SheetsLedger::connect(SheetsConfig {
        spreadsheet_id: cfg.sheets.spreadsheet_id.clone(),
        sheet_name: cfg.sheets.sheet_name.clone(),
        credentials_path: path.clone(),
        timezone: tz,
    })
    .await
    .context("connecting to Google Sheets")?;
    tracing::info!(sheet = %cfg.sheets.sheet_name, "connected to Google Sheets");
    Ok(Arc::new(ledger))
}

#[cfg(not(feature = "sheets"))]
async fn open_sheets(_cfg: &Config, _tz: chrono_tz::Tz) -> Result<Arc<dyn LedgerStore>> {
    bail!("built without the `sheets` feature; set LEDGER_BACKEND=memory")
}

#[cfg_attr(not(feature = "sheets"), allow(dead_code))]
fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!(
            "credentials file not found: {} (set GOOGLE_SERVICE_ACCOUNT_FILE or GOOGLE_CREDENTIALS_BASE64)",
            path.display()
        );
    }
    Ok(())
}

fn check_line(line: &str, cfg: &Config) -> Result<()> {
    let parser = TransactionParser::new()?;
    let Some(txn) = parser.parse(line) else {
        println!("{}", replies::INVALID_FORMAT);
        return Ok(());
    };

    let row = LedgerRow::from_transaction(local_now(cfg.timezone()?), &txn);
    println!("kind:           {}", txn.kind().label());
    println!("timestamp:      {}", format_timestamp(&row.timestamp));
    println!("amount:         {}", cell(row.amount));
    println!("payment_method: {}", row.payment_method);
    println!("category:       {}", row.category);
    println!("description:    {}", row.description);
    println!("payer:          {}", row.payer);
    println!("credit:         {}", cell(row.credit));
    Ok(())
}

fn cell(value: Option<rust_decimal::Decimal>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}
