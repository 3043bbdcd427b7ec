use chrono::NaiveDate;

use super::InvoiceDraft;
use crate::config::Letterhead;
use crate::export::{escape_letterhead, escape_text};
use crate::models::Client;

/// Long-form date as printed on documents, e.g. "March 3, 2025".
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn money(value: f64) -> String {
    format!("${:.2}", value)
}

/// Who the invoice is addressed to. All fields are empty when no client is selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillTo {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

impl BillTo {
    fn from_client(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            address: client.address.clone(),
            email: client.email.clone().unwrap_or_default(),
            phone: client.phone.clone().unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.address.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRow {
    pub service: String,
    pub hours: f64,
    pub rate: f64,
    pub amount: f64,
}

impl InvoiceRow {
    pub fn rate_display(&self) -> String {
        money(self.rate)
    }

    /// Rounded for display only; `amount` keeps full precision.
    pub fn amount_display(&self) -> String {
        money(self.amount)
    }
}

/// Read-only, print-ready projection of an invoice draft.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceView {
    pub letterhead: Letterhead,
    pub invoice_number: String,
    pub invoice_date: String,
    pub due_date: String,
    pub bill_to: BillTo,
    pub rows: Vec<InvoiceRow>,
    pub total: f64,
}

impl InvoiceView {
    pub fn total_display(&self) -> String {
        money(self.total)
    }
}

/// Derives the printable view from the current draft and the loaded clients.
///
/// Row amounts and the total are both computed from unrounded values, so the
/// sum of displayed row amounts can differ from the displayed total by a few cents.
pub fn compose_invoice(draft: &InvoiceDraft, clients: &[Client], letterhead: &Letterhead) -> InvoiceView {
    let bill_to = draft
        .client
        .and_then(|id| clients.iter().find(|c| c.id == id))
        .map(BillTo::from_client)
        .unwrap_or_default();

    let rows = draft
        .line_items
        .items()
        .iter()
        .map(|item| InvoiceRow {
            service: item.service_name.clone(),
            hours: item.hours,
            rate: item.rate,
            amount: item.amount(),
        })
        .collect();

    InvoiceView {
        letterhead: letterhead.clone(),
        invoice_number: draft.invoice_number.clone(),
        invoice_date: long_date(draft.issue_date()),
        due_date: long_date(draft.due_date()),
        bill_to,
        rows,
        total: draft.line_items.total(),
    }
}

/// File stem for an exported invoice, keeping only filename-safe characters.
pub fn invoice_filename(invoice_number: &str) -> String {
    let number: String = invoice_number
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    if number.is_empty() {
        "invoice".to_string()
    } else {
        format!("invoice_{}", number)
    }
}

// Copy of the view with every typed-in field made safe to print
fn escaped(view: &InvoiceView) -> InvoiceView {
    InvoiceView {
        letterhead: escape_letterhead(&view.letterhead),
        invoice_number: escape_text(&view.invoice_number),
        invoice_date: view.invoice_date.clone(),
        due_date: view.due_date.clone(),
        bill_to: BillTo {
            name: escape_text(&view.bill_to.name),
            address: escape_text(&view.bill_to.address),
            email: escape_text(&view.bill_to.email),
            phone: escape_text(&view.bill_to.phone),
        },
        rows: view
            .rows
            .iter()
            .map(|row| InvoiceRow {
                service: escape_text(&row.service),
                ..row.clone()
            })
            .collect(),
        total: view.total,
    }
}

/// Generate Markdown content for the invoice
pub fn render_invoice_markdown(view: &InvoiceView) -> String {
    let view = &escaped(view);
    let mut content = String::new();

    // Letterhead on the left, invoice details on the right
    content.push_str("<div style=\"display: flex; justify-content: space-between;\">\n");

    content.push_str("<div>\n");
    content.push_str(&format!("<h2>{}</h2>\n", view.letterhead.name));
    content.push_str(&format!("{}<br>\n", view.letterhead.location));
    content.push_str("Contact Information<br>\n");
    content.push_str(&format!("Mobile: {}<br>\n", view.letterhead.phone));
    content.push_str(&format!("{}\n", view.letterhead.website));
    content.push_str("</div>\n");

    content.push_str("<div style=\"text-align: right;\">\n");
    content.push_str("<h1>INVOICE</h1>\n");
    content.push_str(&format!("Invoice Number: {}<br>\n", view.invoice_number));
    content.push_str(&format!("Invoice Date: {}<br>\n", view.invoice_date));
    content.push_str(&format!("Payment Due: {}\n", view.due_date));
    content.push_str("</div>\n");

    content.push_str("</div>\n\n");

    content.push_str("**BILL TO**\n\n");
    if !view.bill_to.is_empty() {
        for line in [
            &view.bill_to.name,
            &view.bill_to.address,
            &view.bill_to.email,
            &view.bill_to.phone,
        ] {
            if !line.is_empty() {
                content.push_str(&format!("{}<br>\n", line));
            }
        }
        content.push('\n');
    }

    content.push_str("<table style=\"width: 100%; border-collapse: collapse;\">\n");

    content.push_str("<tr style=\"background-color: #e5e7eb;\">\n");
    content.push_str("<th style=\"text-align: left;\">ITEMS</th>\n");
    content.push_str("<th style=\"text-align: right;\">HOURS</th>\n");
    content.push_str("<th style=\"text-align: right;\">RATE</th>\n");
    content.push_str("<th style=\"text-align: right;\">AMOUNT</th>\n");
    content.push_str("</tr>\n");

    for row in &view.rows {
        content.push_str("<tr>\n");
        content.push_str(&format!("<td style=\"text-align: left;\">{}</td>\n", row.service));
        content.push_str(&format!("<td style=\"text-align: right;\">{}</td>\n", row.hours));
        content.push_str(&format!("<td style=\"text-align: right;\">{}</td>\n", row.rate_display()));
        content.push_str(&format!("<td style=\"text-align: right;\">{}</td>\n", row.amount_display()));
        content.push_str("</tr>\n");
    }

    content.push_str("</table>\n\n");

    content.push_str("<div style=\"text-align: right;\">\n");
    content.push_str(&format!("<p><strong>Total:</strong> {}</p>\n", view.total_display()));
    content.push_str(&format!("<h2>Amount Due (USD): {}</h2>\n", view.total_display()));
    content.push_str("</div>\n");

    content
}
