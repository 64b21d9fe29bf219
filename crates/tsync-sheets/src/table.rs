//! The ingest queue table.
//!
//! Row 1 holds the headers; data starts at row 2. Columns are located by
//! header name so the layout of the sheet can change without a deploy.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};
use tsync_models::{ItemId, QueueRow, RowStatus, RowUpdate};

use crate::a1::{cell_range, quote_sheet, sheet_range};
use crate::client::SheetsClient;
use crate::error::{SheetsError, SheetsResult};
use crate::types::ValueRange;

/// Default worksheet (tab) holding the queue.
pub const DEFAULT_WORKSHEET: &str = "Ingest_Queue";

/// Header of the item identifier column.
pub const ITEM_ID_HEADER: &str = "Video ID";
/// Header of the status column.
pub const STATUS_HEADER: &str = "Status";
/// Header of the transcript (payload) column.
pub const PAYLOAD_HEADER: &str = "Transcript";

/// First data row; row 1 is the header.
const FIRST_DATA_ROW: u32 = 2;

/// Backing store of the queue.
#[async_trait]
pub trait QueueTable: Send + Sync {
    /// Read every data row in table order.
    async fn read_rows(&self) -> SheetsResult<Vec<QueueRow>>;

    /// Write a row's new status and optional payload as one unit.
    async fn apply(&self, update: &RowUpdate) -> SheetsResult<()>;
}

/// Zero-based positions of the columns the queue uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub item_id: usize,
    pub status: usize,
    pub payload: usize,
}

impl ColumnLayout {
    /// Locate the required columns in a header row.
    ///
    /// Header cells are compared after trimming; the first match wins.
    pub fn from_header(header: &[String], worksheet: &str) -> SheetsResult<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| SheetsError::missing_column(worksheet, name))
        };

        Ok(Self {
            item_id: find(ITEM_ID_HEADER)?,
            status: find(STATUS_HEADER)?,
            payload: find(PAYLOAD_HEADER)?,
        })
    }

    /// Decode one data row. Missing trailing cells read as empty.
    pub fn parse_row(&self, row_position: u32, cells: &[String]) -> QueueRow {
        let cell = |idx: usize| cells.get(idx).map(String::as_str).unwrap_or("");
        QueueRow::new(
            row_position,
            ItemId::new(cell(self.item_id)),
            RowStatus::decode(cell(self.status)),
        )
    }
}

/// [`QueueTable`] backed by a worksheet of a Google spreadsheet.
pub struct SheetsQueueTable {
    client: SheetsClient,
    worksheet: String,
    layout: RwLock<Option<ColumnLayout>>,
}

impl SheetsQueueTable {
    pub fn new(client: SheetsClient, worksheet: impl Into<String>) -> Self {
        Self {
            client,
            worksheet: worksheet.into(),
            layout: RwLock::new(None),
        }
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    /// Column layout, reading the header row if it is not known yet.
    async fn layout(&self) -> SheetsResult<ColumnLayout> {
        if let Some(layout) = *self.layout.read().await {
            return Ok(layout);
        }

        let header_range = format!("{}!1:1", quote_sheet(&self.worksheet));
        let rows = self.client.read_values(&header_range).await?;
        let header = rows.into_iter().next().unwrap_or_default();
        let layout = ColumnLayout::from_header(&header, &self.worksheet)?;

        *self.layout.write().await = Some(layout);
        Ok(layout)
    }
}

#[async_trait]
impl QueueTable for SheetsQueueTable {
    async fn read_rows(&self) -> SheetsResult<Vec<QueueRow>> {
        let values = self.client.read_values(&sheet_range(&self.worksheet)).await?;
        let mut rows = values.into_iter();

        let header = rows.next().unwrap_or_default();
        let layout = ColumnLayout::from_header(&header, &self.worksheet)?;
        *self.layout.write().await = Some(layout);

        let parsed: Vec<QueueRow> = rows
            .zip(FIRST_DATA_ROW..)
            .map(|(cells, position)| layout.parse_row(position, &cells))
            .collect();

        info!(
            worksheet = %self.worksheet,
            rows = parsed.len(),
            "Read queue table"
        );
        Ok(parsed)
    }

    async fn apply(&self, update: &RowUpdate) -> SheetsResult<()> {
        let layout = self.layout().await?;
        let row = update.row_position;

        let mut data = Vec::with_capacity(2);
        if let Some(payload) = &update.payload {
            data.push(ValueRange::cell(
                cell_range(&self.worksheet, layout.payload, row),
                payload.clone(),
            ));
        }
        data.push(ValueRange::cell(
            cell_range(&self.worksheet, layout.status, row),
            update.status.encode(),
        ));

        let response = self.client.batch_update(data).await?;
        debug!(
            row,
            status = %update.status,
            updated_cells = response.total_updated_cells.unwrap_or(0),
            "Row updated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_layout_is_order_independent() {
        let layout = ColumnLayout::from_header(
            &header(&["Title", "Status", " Video ID ", "Notes", "Transcript"]),
            DEFAULT_WORKSHEET,
        )
        .unwrap();
        assert_eq!(
            layout,
            ColumnLayout {
                item_id: 2,
                status: 1,
                payload: 4
            }
        );
    }

    #[test]
    fn test_layout_missing_column_is_fatal() {
        let err = ColumnLayout::from_header(&header(&["Video ID", "Status"]), DEFAULT_WORKSHEET)
            .unwrap_err();
        assert!(err.is_fatal());
        match err {
            SheetsError::MissingColumn { worksheet, column } => {
                assert_eq!(worksheet, DEFAULT_WORKSHEET);
                assert_eq!(column, PAYLOAD_HEADER);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_layout_header_match_is_case_sensitive() {
        assert!(ColumnLayout::from_header(
            &header(&["video id", "Status", "Transcript"]),
            DEFAULT_WORKSHEET
        )
        .is_err());
    }

    #[test]
    fn test_parse_short_row() {
        let layout = ColumnLayout {
            item_id: 0,
            status: 1,
            payload: 2,
        };
        let row = layout.parse_row(5, &header(&[" abc123 "]));
        assert_eq!(row.row_position, 5);
        assert_eq!(row.item_id.as_str(), "abc123");
        assert_eq!(
            row.status,
            RowStatus::Unrecognized { raw: String::new() }
        );
    }
}
