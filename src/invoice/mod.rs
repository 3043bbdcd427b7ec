mod composer;
mod editor;

use chrono::{Local, NaiveDate};

use crate::models::ClientId;

pub use composer::{compose_invoice, invoice_filename, long_date, render_invoice_markdown, InvoiceView};
pub use editor::{parse_non_negative, service_options, LineItemEditor, LineItemUpdate};

/// Calendar days between the invoice date and the payment due date.
pub const PAYMENT_TERM_DAYS: i64 = 5;

pub const DEFAULT_INVOICE_NUMBER: &str = "A-001";

pub fn due_date_for(issue_date: NaiveDate) -> NaiveDate {
    issue_date + chrono::Duration::days(PAYMENT_TERM_DAYS)
}

/// Invoice form state. Lives only as long as the invoice screen.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub invoice_number: String,
    issue_date: NaiveDate,
    pub client: Option<ClientId>,
    pub line_items: LineItemEditor,
}

impl InvoiceDraft {
    /// A draft issued on `issue_date` with one blank line item.
    pub fn new(issue_date: NaiveDate) -> Self {
        let mut line_items = LineItemEditor::new();
        line_items.add_blank_item();

        Self {
            invoice_number: DEFAULT_INVOICE_NUMBER.to_string(),
            issue_date,
            client: None,
            line_items,
        }
    }

    /// A draft issued today, local time.
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    pub fn due_date(&self) -> NaiveDate {
        due_date_for(self.issue_date)
    }
}
