use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::config::Letterhead;
use crate::db::DocumentStore;
use crate::error::AppError;
use crate::export::{Document, DocumentRenderer};
use crate::invoice::{
    compose_invoice, parse_non_negative, service_options, InvoiceDraft, InvoiceView, LineItemUpdate,
};
use crate::reference_data::{load_reference_data, ReferenceData};
use crate::session::Session;
use crate::ui::components::{edit_number, edit_text, render_error, render_notice};

// Header rows above the line items
const INVOICE_NUMBER_ROW: usize = 0;
const CLIENT_ROW: usize = 1;
const FIRST_ITEM_ROW: usize = 2;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ItemColumn {
    Service,
    Hours,
    Rate,
}

impl ItemColumn {
    fn next(self) -> Self {
        match self {
            ItemColumn::Service => ItemColumn::Hours,
            ItemColumn::Hours => ItemColumn::Rate,
            ItemColumn::Rate => ItemColumn::Service,
        }
    }

    fn previous(self) -> Self {
        match self {
            ItemColumn::Service => ItemColumn::Rate,
            ItemColumn::Hours => ItemColumn::Service,
            ItemColumn::Rate => ItemColumn::Hours,
        }
    }
}

pub enum InvoiceGeneratorAction {
    Back,
    Reload,
    Generate,
}

pub struct InvoiceGeneratorState {
    draft: InvoiceDraft,
    reference: ReferenceData,
    letterhead: Letterhead,
    cursor: usize,
    column: ItemColumn,
    editing: bool,
    // Text of the numeric cell being edited
    active_input: String,
    show_error: Option<String>,
    notice: Option<String>,
}

impl InvoiceGeneratorState {
    pub fn new(draft: InvoiceDraft, letterhead: Letterhead) -> Self {
        Self {
            draft,
            reference: ReferenceData::default(),
            letterhead,
            cursor: INVOICE_NUMBER_ROW,
            column: ItemColumn::Service,
            editing: false,
            active_input: String::new(),
            show_error: None,
            notice: None,
        }
    }

    #[cfg(test)]
    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.show_error.as_deref()
    }

    #[cfg(test)]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Loads clients and services for the signed-in user.
    pub async fn load(&mut self, store: &dyn DocumentStore, session: &Session) {
        match load_reference_data(store, session).await {
            Ok(reference) => {
                if let Some(id) = self.draft.client {
                    if reference.client(id).is_none() {
                        self.draft.client = None;
                    }
                }
                self.reference = reference;
            }
            Err(err) => self.show_error = Some(err.to_string()),
        }
    }

    pub fn view(&self) -> InvoiceView {
        compose_invoice(&self.draft, &self.reference.clients, &self.letterhead)
    }

    /// Exports the invoice and reports where it went.
    pub fn generate(&mut self, renderer: &dyn DocumentRenderer) -> Option<PathBuf> {
        let document = Document::invoice(&self.view());
        match renderer.render(&document) {
            Ok(path) => {
                self.notice = Some(format!("Invoice saved to {}", path.display()));
                Some(path)
            }
            Err(err) => {
                tracing::error!(error = %err, "invoice export failed");
                self.show_error = Some(err.to_string());
                None
            }
        }
    }

    fn row_count(&self) -> usize {
        FIRST_ITEM_ROW + self.draft.line_items.len()
    }

    fn selected_item(&self) -> Option<usize> {
        self.cursor
            .checked_sub(FIRST_ITEM_ROW)
            .filter(|i| *i < self.draft.line_items.len())
    }

    fn next_row(&mut self) {
        self.cursor = (self.cursor + 1) % self.row_count();
    }

    fn previous_row(&mut self) {
        self.cursor = match self.cursor {
            0 => self.row_count() - 1,
            i => i - 1,
        };
    }

    fn cycle_client(&mut self, forward: bool) {
        // Position 0 is "no client"
        let ids: Vec<Option<i32>> = std::iter::once(None)
            .chain(self.reference.clients.iter().map(|c| Some(c.id)))
            .collect();
        let current = ids.iter().position(|id| *id == self.draft.client).unwrap_or(0);
        let next = if forward {
            (current + 1) % ids.len()
        } else {
            (current + ids.len() - 1) % ids.len()
        };
        self.draft.client = ids[next];
    }

    fn cycle_service(&mut self, index: usize, forward: bool) -> Result<(), AppError> {
        let options = service_options(&self.reference.services);
        let current_ref = self.draft.line_items.items()[index].service_ref;
        let current = options
            .iter()
            .position(|option| option.service_ref == current_ref)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % options.len()
        } else {
            (current + options.len() - 1) % options.len()
        };

        self.draft
            .line_items
            .update_item(index, LineItemUpdate::Service(options[next].service_ref), &self.reference.services)
            .map_err(|err| AppError::validation(err.to_string()))
    }

    fn start_editing(&mut self) {
        self.editing = true;
        self.active_input.clear();
        if let Some(index) = self.selected_item() {
            let item = &self.draft.line_items.items()[index];
            let value = match self.column {
                ItemColumn::Hours => item.hours,
                ItemColumn::Rate => item.rate,
                ItemColumn::Service => return,
            };
            if value != 0.0 {
                self.active_input = value.to_string();
            }
        }
    }

    fn apply_numeric_input(&mut self, index: usize) -> Result<(), AppError> {
        let update = match self.column {
            ItemColumn::Hours => LineItemUpdate::Hours(parse_non_negative("Hours", &self.active_input)?),
            ItemColumn::Rate => LineItemUpdate::Rate(parse_non_negative("Rate", &self.active_input)?),
            ItemColumn::Service => return Ok(()),
        };
        self.draft
            .line_items
            .update_item(index, update, &self.reference.services)
            .map_err(|err| AppError::validation(err.to_string()))
    }

    fn edit_key(&mut self, key: KeyCode) -> Result<(), AppError> {
        match self.cursor {
            INVOICE_NUMBER_ROW => edit_text(&mut self.draft.invoice_number, key),
            CLIENT_ROW => match key {
                KeyCode::Right => self.cycle_client(true),
                KeyCode::Left => self.cycle_client(false),
                _ => {}
            },
            _ => {
                let Some(index) = self.selected_item() else {
                    return Ok(());
                };
                match (self.column, key) {
                    (ItemColumn::Service, KeyCode::Right) => self.cycle_service(index, true)?,
                    (ItemColumn::Service, KeyCode::Left) => self.cycle_service(index, false)?,
                    (ItemColumn::Service, key) => {
                        let mut name = self.draft.line_items.items()[index].service_name.clone();
                        edit_text(&mut name, key);
                        self.draft
                            .line_items
                            .update_item(index, LineItemUpdate::ServiceName(name), &self.reference.services)
                            .map_err(|err| AppError::validation(err.to_string()))?;
                    }
                    (_, key) => {
                        edit_number(&mut self.active_input, key);
                        self.apply_numeric_input(index)?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<InvoiceGeneratorAction> {
        if self.show_error.take().is_some() || self.notice.take().is_some() {
            return None;
        }

        if self.editing {
            match key {
                KeyCode::Enter | KeyCode::Esc => self.editing = false,
                key => {
                    if let Err(err) = self.edit_key(key) {
                        self.show_error = Some(err.to_string());
                    }
                }
            }
            return None;
        }

        match key {
            KeyCode::Esc | KeyCode::Char('q') => return Some(InvoiceGeneratorAction::Back),
            KeyCode::Char('g') => return Some(InvoiceGeneratorAction::Generate),
            KeyCode::Char('r') => return Some(InvoiceGeneratorAction::Reload),
            KeyCode::Char('a') => {
                self.draft.line_items.add_blank_item();
                self.cursor = self.row_count() - 1;
                self.column = ItemColumn::Service;
            }
            KeyCode::Char('d') => {
                if let Some(index) = self.selected_item() {
                    if self.draft.line_items.remove_item(index).is_ok() {
                        self.cursor = self.cursor.min(self.row_count() - 1);
                    }
                }
            }
            KeyCode::Enter => self.start_editing(),
            KeyCode::Down | KeyCode::Tab => self.next_row(),
            KeyCode::Up | KeyCode::BackTab => self.previous_row(),
            KeyCode::Right => self.column = self.column.next(),
            KeyCode::Left => self.column = self.column.previous(),
            _ => {}
        }
        None
    }
}

pub fn handle_input(state: &mut InvoiceGeneratorState) -> Result<Option<InvoiceGeneratorAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(state.handle_key(key.code));
    }
    Ok(None)
}

fn field_style(selected: bool, editing: bool) -> Style {
    match (selected, editing) {
        (true, true) => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(Color::Yellow),
        _ => Style::default(),
    }
}

pub fn render_invoice_generator<B: Backend>(frame: &mut Frame<B>, state: &mut InvoiceGeneratorState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(size);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(chunks[0]);

    render_form(frame, state, columns[0]);
    render_preview(frame, state, columns[1]);

    let help_text = if state.editing {
        "Typing edits the field | Left/Right - Cycle client or service | Enter/<Esc> Done"
    } else {
        "Up/Down - Row | Left/Right - Column | Enter - Edit | <A> Add item | <D> Remove item | <G> Generate PDF | <R> Reload | <Esc> Back"
    };
    let help = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });
    frame.render_widget(help, chunks[1]);

    if let Some(error) = &state.show_error {
        render_error(frame, size, error);
    } else if let Some(notice) = &state.notice {
        render_notice(frame, size, "Invoice Generated", notice);
    }
}

fn render_form<B: Backend>(frame: &mut Frame<B>, state: &InvoiceGeneratorState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(1)].as_ref())
        .split(area);

    let draft = &state.draft;
    let client_label = draft
        .client
        .and_then(|id| state.reference.client(id))
        .map(|client| client.name.clone())
        .unwrap_or_else(|| "Select a client...".to_string());

    let details = Paragraph::new(vec![
        Spans::from(vec![
            Span::styled("Invoice Number: ", field_style(state.cursor == INVOICE_NUMBER_ROW, state.editing)),
            Span::raw(draft.invoice_number.clone()),
        ]),
        Spans::from(vec![
            Span::styled("Client: ", field_style(state.cursor == CLIENT_ROW, state.editing)),
            Span::raw(format!("< {} >", client_label)),
        ]),
        Spans::from(format!("Invoice Date: {}", draft.issue_date().format("%Y-%m-%d"))),
        Spans::from(format!("Due Date: {}", draft.due_date().format("%Y-%m-%d"))),
    ])
    .block(Block::default().title("Invoice Details").borders(Borders::ALL));
    frame.render_widget(details, rows[0]);

    let options = service_options(&state.reference.services);
    let selected = state.selected_item();

    let header = Row::new(vec!["Service", "Hours", "Rate", "Amount"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let items: Vec<Row> = draft
        .line_items
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut service = if item.service_name.is_empty() {
                options
                    .first()
                    .map(|option| option.label.clone())
                    .unwrap_or_default()
            } else {
                item.service_name.clone()
            };
            // The copied name and rate stay valid after the service is deleted
            if let Some(id) = item.service_ref {
                if state.reference.service(id).is_none() {
                    service.push_str(" (removed)");
                }
            }
            let cell = |column: ItemColumn, text: String| {
                let active = selected == Some(i) && state.column == column;
                Cell::from(text).style(field_style(active, state.editing))
            };
            Row::new(vec![
                cell(ItemColumn::Service, service),
                cell(ItemColumn::Hours, item.hours.to_string()),
                cell(ItemColumn::Rate, format!("${:.2}", item.rate)),
                Cell::from(format!("${:.2}", item.amount())),
            ])
        })
        .collect();

    let table = Table::new(items)
        .header(header)
        .block(Block::default().title("Line Items").borders(Borders::ALL))
        .widths(&[
            Constraint::Percentage(40),
            Constraint::Percentage(15),
            Constraint::Percentage(20),
            Constraint::Percentage(25),
        ]);
    frame.render_widget(table, rows[1]);
}

fn render_preview<B: Backend>(frame: &mut Frame<B>, state: &InvoiceGeneratorState, area: Rect) {
    let view = state.view();

    let mut lines = vec![
        Spans::from(Span::styled(view.letterhead.name.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Spans::from(view.letterhead.address.clone()),
        Spans::from(""),
        Spans::from(format!("INVOICE {}", view.invoice_number)),
        Spans::from(format!("Invoice Date: {}", view.invoice_date)),
        Spans::from(format!("Payment Due: {}", view.due_date)),
        Spans::from(""),
        Spans::from(Span::styled("BILL TO", Style::default().add_modifier(Modifier::BOLD))),
    ];

    if view.bill_to.is_empty() {
        lines.push(Spans::from("-"));
    } else {
        for line in [&view.bill_to.name, &view.bill_to.address, &view.bill_to.email, &view.bill_to.phone] {
            if !line.is_empty() {
                lines.push(Spans::from(line.clone()));
            }
        }
    }

    lines.push(Spans::from(""));
    for row in &view.rows {
        lines.push(Spans::from(format!(
            "{} | {} h x {} = {}",
            if row.service.is_empty() { "-" } else { row.service.as_str() },
            row.hours,
            row.rate_display(),
            row.amount_display()
        )));
    }
    lines.push(Spans::from(""));
    lines.push(Spans::from(Span::styled(
        format!("Total: {}", view.total_display()),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )));

    let preview = Paragraph::new(lines)
        .block(Block::default().title("Preview").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(preview, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::error::ExportError;
    use crate::models::{NewClient, NewService};
    use chrono::{NaiveDate, Utc};
    use std::cell::RefCell;

    struct CapturingRenderer {
        documents: RefCell<Vec<Document>>,
    }

    impl DocumentRenderer for CapturingRenderer {
        fn render(&self, document: &Document) -> Result<PathBuf, ExportError> {
            self.documents.borrow_mut().push(document.clone());
            Ok(PathBuf::from(format!("{}.pdf", document.file_stem)))
        }
    }

    async fn loaded_state() -> InvoiceGeneratorState {
        let store = MemoryStore::new();
        store
            .add_client(&NewClient::from_form("Acme", "1 Main St", "", ""), "u-1", Utc::now())
            .await
            .unwrap();
        store
            .add_service(&NewService::from_form("Design", "", "50").unwrap(), "u-1", Utc::now())
            .await
            .unwrap();

        let draft = InvoiceDraft::new(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        let mut state = InvoiceGeneratorState::new(draft, Letterhead::default());
        state.load(&store, &Session::new(Some("u-1".to_string()))).await;
        state
    }

    fn press(state: &mut InvoiceGeneratorState, keys: &[KeyCode]) {
        for key in keys {
            state.handle_key(*key);
        }
    }

    #[tokio::test]
    async fn picking_a_service_and_typing_hours_updates_the_total() {
        let mut state = loaded_state().await;

        // Down twice lands on the first line item, Service column
        press(&mut state, &[KeyCode::Down, KeyCode::Down, KeyCode::Enter, KeyCode::Right, KeyCode::Enter]);
        assert_eq!(state.draft().line_items.items()[0].service_name, "Design");
        assert_eq!(state.draft().line_items.items()[0].rate, 50.0);

        press(&mut state, &[KeyCode::Right, KeyCode::Enter, KeyCode::Char('2'), KeyCode::Char('.'), KeyCode::Char('5'), KeyCode::Enter]);
        assert_eq!(state.draft().line_items.items()[0].hours, 2.5);
        assert_eq!(state.view().total_display(), "$125.00");
    }

    #[tokio::test]
    async fn client_selector_cycles_through_loaded_clients() {
        let mut state = loaded_state().await;

        press(&mut state, &[KeyCode::Down, KeyCode::Enter, KeyCode::Right, KeyCode::Enter]);

        assert_eq!(state.view().bill_to.name, "Acme");

        press(&mut state, &[KeyCode::Enter, KeyCode::Right, KeyCode::Enter]);
        assert!(state.view().bill_to.is_empty());
    }

    #[tokio::test]
    async fn items_can_be_added_and_removed() {
        let mut state = loaded_state().await;

        press(&mut state, &[KeyCode::Char('a')]);
        assert_eq!(state.draft().line_items.len(), 2);

        press(&mut state, &[KeyCode::Char('d'), KeyCode::Char('d')]);
        assert_eq!(state.draft().line_items.len(), 0);

        // Nothing left to remove
        press(&mut state, &[KeyCode::Char('d')]);
        assert_eq!(state.draft().line_items.len(), 0);
    }

    #[tokio::test]
    async fn generate_hands_the_invoice_to_the_renderer() {
        let mut state = loaded_state().await;
        let renderer = CapturingRenderer {
            documents: RefCell::new(Vec::new()),
        };

        assert!(matches!(
            state.handle_key(KeyCode::Char('g')),
            Some(InvoiceGeneratorAction::Generate)
        ));
        let path = state.generate(&renderer);

        assert_eq!(path, Some(PathBuf::from("invoice_A-001.pdf")));
        assert!(state.notice().unwrap().contains("invoice_A-001.pdf"));
        let documents = renderer.documents.borrow();
        assert!(documents[0].markdown.contains("A-001"));
    }

    #[tokio::test]
    async fn loading_without_a_user_reports_it() {
        let store = MemoryStore::new();
        let mut state = InvoiceGeneratorState::new(InvoiceDraft::today(), Letterhead::default());

        state.load(&store, &Session::anonymous()).await;

        assert!(state.error().is_some());
    }
}
