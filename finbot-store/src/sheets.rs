//! Google Sheets ledger backed by a service account.

use async_trait::async_trait;
use chrono_tz::Tz;
use finbot_core::time::local_now;
use finbot_core::{CREDIT_HEADER, COLUMN_COUNT, Expense, HEADERS, LedgerRow, RowError};
use google_sheets4::Sheets;
use google_sheets4::api::{
    BatchUpdateSpreadsheetRequest, DeleteDimensionRequest, DimensionRange, Request, ValueRange,
};
use hyper::client::HttpConnector;
use hyper_rustls::HttpsConnector;
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::PathBuf;

// Use the oauth2 version re-exported by google-sheets4 to avoid version mismatches.
use google_sheets4::oauth2;

use crate::error::{Result, StoreError};
use crate::store::LedgerStore;

type Hub = Sheets<HttpsConnector<HttpConnector>>;

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    /// Service-account key file (JSON)
    pub credentials_path: PathBuf,
    pub timezone: Tz,
}

pub struct SheetsLedger {
    hub: Hub,
    spreadsheet_id: String,
    sheet_name: String,
    tz: Tz,
}

impl SheetsLedger {
    /// Authenticate and check that the worksheet exists.
    pub async fn connect(config: SheetsConfig) -> Result<Self> {
        let key = oauth2::read_service_account_key(&config.credentials_path)
            .await
            .map_err(|e| {
                StoreError::Auth(format!(
                    "read service account key {}: {e}",
                    config.credentials_path.display()
                ))
            })?;

        let auth = oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| StoreError::Auth(format!("build authenticator: {e}")))?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let hub = Sheets::new(hyper::Client::builder().build(connector), auth);

        let ledger = Self {
            hub,
            spreadsheet_id: config.spreadsheet_id,
            sheet_name: config.sheet_name,
            tz: config.timezone,
        };
        let sheet_id = ledger.sheet_id().await?;
        tracing::info!(
            spreadsheet = %ledger.spreadsheet_id,
            sheet = %ledger.sheet_name,
            sheet_id,
            "connected to worksheet"
        );
        Ok(ledger)
    }

    fn range(&self, cells: &str) -> String {
        a1_range(&self.sheet_name, cells)
    }

    /// Numeric id of the worksheet, needed for row deletion.
    async fn sheet_id(&self) -> Result<i32> {
        let (_, spreadsheet) = self
            .hub
            .spreadsheets()
            .get(&self.spreadsheet_id)
            .doit()
            .await
            .map_err(|e| StoreError::remote("get spreadsheet", e))?;

        spreadsheet
            .sheets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| s.properties)
            .find(|p| p.title.as_deref() == Some(self.sheet_name.as_str()))
            .and_then(|p| p.sheet_id)
            .ok_or_else(|| StoreError::SheetNotFound(self.sheet_name.clone()))
    }

    async fn values(&self, cells: &str) -> Result<Vec<Vec<Value>>> {
        let (_, range) = self
            .hub
            .spreadsheets()
            .values_get(&self.spreadsheet_id, &self.range(cells))
            .value_render_option("UNFORMATTED_VALUE")
            .date_time_render_option("FORMATTED_STRING")
            .doit()
            .await
            .map_err(|e| StoreError::remote("read values", e))?;
        Ok(range.values.unwrap_or_default())
    }

    async fn write_values(&self, cells: &str, row: Vec<Value>) -> Result<()> {
        let body = ValueRange {
            values: Some(vec![row]),
            ..Default::default()
        };
        self.hub
            .spreadsheets()
            .values_update(body, &self.spreadsheet_id, &self.range(cells))
            .value_input_option("RAW")
            .doit()
            .await
            .map_err(|e| StoreError::remote("update values", e))?;
        Ok(())
    }

    async fn append_row(&self, row: LedgerRow) -> Result<LedgerRow> {
        let body = ValueRange {
            values: Some(vec![row.to_cells()]),
            ..Default::default()
        };
        self.hub
            .spreadsheets()
            .values_append(body, &self.spreadsheet_id, &self.range("A:G"))
            .value_input_option("RAW")
            .insert_data_option("INSERT_ROWS")
            .doit()
            .await
            .map_err(|e| StoreError::remote("append row", e))?;
        tracing::debug!(timestamp = %row.timestamp, "appended ledger row");
        Ok(row)
    }
}

#[async_trait]
impl LedgerStore for SheetsLedger {
    async fn ensure_header(&self) -> Result<()> {
        let header = self.values("A1:G1").await?;
        let present = header.first().map(Vec::len).unwrap_or(0);

        match header_fix(present) {
            Some((cells, values)) => {
                tracing::info!(columns = present, range = cells, "writing header cells");
                self.write_values(cells, values).await
            }
            None => Ok(()),
        }
    }

    async fn append_expense(&self, expense: &Expense) -> Result<LedgerRow> {
        self.append_row(LedgerRow::from_expense(local_now(self.tz), expense))
            .await
    }

    async fn append_credit(&self, amount: Decimal) -> Result<LedgerRow> {
        self.append_row(LedgerRow::from_credit(local_now(self.tz), amount))
            .await
    }

    async fn clear_all(&self) -> Result<usize> {
        // Row count includes the header.
        let total = self.values("A:G").await?.len();
        if total <= 1 {
            return Ok(0);
        }

        let sheet_id = self.sheet_id().await?;
        let request = BatchUpdateSpreadsheetRequest {
            requests: Some(vec![Request {
                delete_dimension: Some(DeleteDimensionRequest {
                    range: Some(data_rows(sheet_id, total)),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            ..Default::default()
        };

        self.hub
            .spreadsheets()
            .batch_update(request, &self.spreadsheet_id)
            .doit()
            .await
            .map_err(|e| StoreError::remote("delete rows", e))?;

        tracing::info!(rows = total - 1, "cleared ledger");
        Ok(total - 1)
    }

    async fn read_all(&self) -> Result<Vec<LedgerRow>> {
        let values = self.values("A2:G").await?;
        Ok(decode_rows(&values))
    }
}

/// Header cells to write given how many are already present: all of
/// them on an empty sheet, the credit column on a legacy six-column one.
fn header_fix(present: usize) -> Option<(&'static str, Vec<Value>)> {
    if present == 0 {
        Some(("A1:G1", HEADERS.iter().map(|h| Value::from(*h)).collect()))
    } else if present < COLUMN_COUNT {
        Some(("G1", vec![Value::from(CREDIT_HEADER)]))
    } else {
        None
    }
}

/// Quote a sheet title for A1 notation: `'My Sheet'!A1:G1`.
fn a1_range(sheet_name: &str, cells: &str) -> String {
    format!("'{}'!{}", sheet_name.replace('\'', "''"), cells)
}

/// Rows 2..=total (zero-based, end exclusive), i.e. everything below the header.
fn data_rows(sheet_id: i32, total: usize) -> DimensionRange {
    DimensionRange {
        sheet_id: Some(sheet_id),
        dimension: Some("ROWS".to_string()),
        start_index: Some(1),
        end_index: Some(i32::try_from(total).unwrap_or(i32::MAX)),
        ..Default::default()
    }
}

fn decode_rows(values: &[Vec<Value>]) -> Vec<LedgerRow> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, cells)| match LedgerRow::from_cells(cells) {
            Ok(row) => Some(row),
            Err(RowError::Blank) => None,
            Err(e) => {
                // +2: one-based, below the header
                tracing::warn!(row = i + 2, error = %e, "skipping ledger row");
                None
            }
        })
        .collect()
}
