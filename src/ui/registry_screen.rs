use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::db::DocumentStore;
use crate::error::AppError;
use crate::models::{Client, NewClient, NewService, Service};
use crate::registry::{Confirmation, DeleteOutcome, Record, Registry};
use crate::session::Session;
use crate::ui::components::{centered_rect, edit_number, edit_text, render_delete_confirmation, render_error};

pub struct FormField {
    pub label: &'static str,
    pub numeric: bool,
}

/// How a record is entered and listed on its management screen.
pub trait RecordForm: Record {
    const TITLE: &'static str;
    const FIELDS: &'static [FormField];

    /// Builds the record's fields from the raw form values, in `FIELDS` order.
    fn parse_form(values: &[String]) -> Result<Self::Fields, AppError>;

    fn list_line(&self) -> String;
}

impl RecordForm for Client {
    const TITLE: &'static str = "Client Management";
    const FIELDS: &'static [FormField] = &[
        FormField { label: "Name", numeric: false },
        FormField { label: "Address", numeric: false },
        FormField { label: "Email", numeric: false },
        FormField { label: "Phone", numeric: false },
    ];

    fn parse_form(values: &[String]) -> Result<NewClient, AppError> {
        Ok(NewClient::from_form(&values[0], &values[1], &values[2], &values[3]))
    }

    fn list_line(&self) -> String {
        let contact: Vec<&str> = [self.email.as_deref(), self.phone.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if contact.is_empty() {
            format!("{} | {}", self.name, self.address)
        } else {
            format!("{} | {} | {}", self.name, self.address, contact.join(", "))
        }
    }
}

impl RecordForm for Service {
    const TITLE: &'static str = "Service Management";
    const FIELDS: &'static [FormField] = &[
        FormField { label: "Service Name", numeric: false },
        FormField { label: "Description", numeric: false },
        FormField { label: "Default Rate (per hour)", numeric: true },
    ];

    fn parse_form(values: &[String]) -> Result<NewService, AppError> {
        NewService::from_form(&values[0], &values[1], &values[2])
    }

    fn list_line(&self) -> String {
        match &self.description {
            Some(description) => format!("{} | ${}/hr | {}", self.name, self.default_rate, description),
            None => format!("{} | ${}/hr", self.name, self.default_rate),
        }
    }
}

enum Mode {
    Browsing,
    Adding { field: usize, values: Vec<String> },
    ConfirmingDelete(i32),
}

pub enum RegistryAction<R: Record> {
    Back,
    Refresh,
    Add(R::Fields),
    Delete(i32, Confirmation),
}

pub struct RegistryScreenState<R: RecordForm> {
    registry: Registry<R>,
    list_state: ListState,
    mode: Mode,
    show_error: Option<String>,
}

impl<R: RecordForm> RegistryScreenState<R> {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            list_state: ListState::default(),
            mode: Mode::Browsing,
            show_error: None,
        }
    }

    #[cfg(test)]
    pub fn items(&self) -> &[R] {
        self.registry.items()
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.show_error.as_deref()
    }

    #[cfg(test)]
    pub fn is_adding(&self) -> bool {
        matches!(self.mode, Mode::Adding { .. })
    }

    fn sync_selection(&mut self) {
        let len = self.registry.items().len();
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            Some(_) => {}
        }
    }

    fn selected_id(&self) -> Option<i32> {
        self.list_state
            .selected()
            .and_then(|i| self.registry.items().get(i))
            .map(|item| item.id())
    }

    pub fn next(&mut self) {
        let len = self.registry.items().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.registry.items().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    fn report(&mut self, err: AppError) {
        self.show_error = Some(err.to_string());
    }

    /// Reloads the list from the store. Errors are shown on screen.
    pub async fn refresh(&mut self, store: &dyn DocumentStore, session: &Session) {
        if let Err(err) = self.registry.list(store, session).await {
            self.report(err);
        }
        self.sync_selection();
    }

    /// Runs an action against the store. Returns true when the user left the screen.
    pub async fn apply(
        &mut self,
        action: RegistryAction<R>,
        store: &dyn DocumentStore,
        session: &Session,
    ) -> bool {
        match action {
            RegistryAction::Back => return true,
            RegistryAction::Refresh => self.refresh(store, session).await,
            RegistryAction::Add(fields) => match self.registry.add(store, session, fields).await {
                Ok(_) => self.mode = Mode::Browsing,
                Err(err) => self.report(err),
            },
            RegistryAction::Delete(id, confirmation) => {
                self.mode = Mode::Browsing;
                match self.registry.delete(store, session, id, confirmation).await {
                    Ok(DeleteOutcome::Deleted) | Ok(DeleteOutcome::Cancelled) => {}
                    Err(err) => self.report(err),
                }
            }
        }
        self.sync_selection();
        false
    }

    /// Maps one keystroke to an action, updating local form state on the way.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<RegistryAction<R>> {
        if self.show_error.take().is_some() {
            return None;
        }

        match &mut self.mode {
            Mode::Browsing => match key {
                KeyCode::Esc | KeyCode::Char('q') => return Some(RegistryAction::Back),
                KeyCode::Char('n') => {
                    self.mode = Mode::Adding {
                        field: 0,
                        values: vec![String::new(); R::FIELDS.len()],
                    };
                }
                KeyCode::Char('d') => {
                    if let Some(id) = self.selected_id() {
                        self.mode = Mode::ConfirmingDelete(id);
                    }
                }
                KeyCode::Char('r') => return Some(RegistryAction::Refresh),
                KeyCode::Down => self.next(),
                KeyCode::Up => self.previous(),
                _ => {}
            },
            Mode::ConfirmingDelete(id) => {
                let id = *id;
                match key {
                    KeyCode::Char('y') => return Some(RegistryAction::Delete(id, Confirmation::Yes)),
                    KeyCode::Char('n') | KeyCode::Esc => {
                        return Some(RegistryAction::Delete(id, Confirmation::No));
                    }
                    _ => {}
                }
            }
            Mode::Adding { field, values } => match key {
                KeyCode::Esc => self.mode = Mode::Browsing,
                KeyCode::Up => *field = field.saturating_sub(1),
                KeyCode::Down | KeyCode::Tab => *field = (*field + 1).min(R::FIELDS.len() - 1),
                KeyCode::Enter if *field + 1 < R::FIELDS.len() => *field += 1,
                KeyCode::Enter => match R::parse_form(values).and_then(|fields| {
                    R::validate(&fields)?;
                    Ok(fields)
                }) {
                    Ok(fields) => return Some(RegistryAction::Add(fields)),
                    Err(err) => self.show_error = Some(err.to_string()),
                },
                key if R::FIELDS[*field].numeric => edit_number(&mut values[*field], key),
                key => edit_text(&mut values[*field], key),
            },
        }
        None
    }
}

pub fn handle_input<R: RecordForm>(state: &mut RegistryScreenState<R>) -> Result<Option<RegistryAction<R>>> {
    if let Event::Key(key) = event::read()? {
        return Ok(state.handle_key(key.code));
    }
    Ok(None)
}

pub fn render_registry<B: Backend, R: RecordForm>(frame: &mut Frame<B>, state: &mut RegistryScreenState<R>) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(size);

    let items: Vec<ListItem> = if state.registry.items().is_empty() {
        vec![ListItem::new(format!("No {}s yet. Press <N> to add one.", R::NOUN))]
    } else {
        state
            .registry
            .items()
            .iter()
            .map(|item| ListItem::new(Spans::from(vec![Span::raw(item.list_line())])))
            .collect()
    };

    let list = List::new(items)
        .block(Block::default().title(R::TITLE).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, chunks[0], &mut state.list_state);

    let help_text = match state.mode {
        Mode::Browsing => "<N> New | <D> Delete | <R> Refresh | Up/Down - Select | <Esc> Back",
        Mode::Adding { .. } => "Enter - Next field / Save on last field | Up/Down - Move | <Esc> Cancel",
        Mode::ConfirmingDelete(_) => "<Y> Yes  <N> No",
    };
    let help = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(help, chunks[1]);

    if let Mode::Adding { field, values } = &state.mode {
        let area = centered_rect(70, 60, size);
        let lines: Vec<Spans> = R::FIELDS
            .iter()
            .zip(values)
            .enumerate()
            .map(|(i, (form_field, value))| {
                let style = if i == *field {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                let cursor = if i == *field { "_" } else { "" };
                Spans::from(vec![
                    Span::styled(format!("{}: ", form_field.label), style),
                    Span::raw(format!("{}{}", value, cursor)),
                ])
            })
            .collect();

        let form = Paragraph::new(lines).block(
            Block::default()
                .title(format!("Add New {}", capitalize(R::NOUN)))
                .borders(Borders::ALL),
        );
        frame.render_widget(Clear, area);
        frame.render_widget(form, area);
    }

    if let Mode::ConfirmingDelete(id) = state.mode {
        let subject = match state.registry.get(id) {
            Some(item) => format!("{} ({})", R::NOUN, item.list_line()),
            None => R::NOUN.to_string(),
        };
        render_delete_confirmation(frame, size, &subject);
    }

    if let Some(error) = &state.show_error {
        render_error(frame, size, error);
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    fn session() -> Session {
        Session::new(Some("u-1".to_string()))
    }

    fn type_text<R: RecordForm>(state: &mut RegistryScreenState<R>, text: &str) {
        for c in text.chars() {
            assert!(state.handle_key(KeyCode::Char(c)).is_none());
        }
    }

    #[tokio::test]
    async fn adding_a_service_through_the_form() {
        let store = MemoryStore::new();
        let mut state = RegistryScreenState::<Service>::new();

        state.handle_key(KeyCode::Char('n'));
        type_text(&mut state, "Consulting");
        state.handle_key(KeyCode::Enter);
        state.handle_key(KeyCode::Enter);
        type_text(&mut state, "7a5");
        let action = state.handle_key(KeyCode::Enter).expect("form should submit");

        assert!(!state.apply(action, &store, &session()).await);
        assert!(!state.is_adding());
        assert_eq!(state.items()[0].name, "Consulting");
        assert_eq!(state.items()[0].default_rate, 75.0);
    }

    #[tokio::test]
    async fn missing_required_field_shows_an_error() {
        let mut state = RegistryScreenState::<Client>::new();

        state.handle_key(KeyCode::Char('n'));
        type_text(&mut state, "Acme");
        for _ in 0..3 {
            state.handle_key(KeyCode::Enter);
        }
        let action = state.handle_key(KeyCode::Enter);

        assert!(action.is_none());
        assert_eq!(state.error(), Some("Client address is required"));
        assert!(state.is_adding());

        // Any key dismisses the error and keeps the form open
        state.handle_key(KeyCode::Char('x'));
        assert_eq!(state.error(), None);
        assert!(state.is_adding());
    }

    #[tokio::test]
    async fn delete_asks_before_removing() {
        let store = MemoryStore::new();
        let mut state = RegistryScreenState::<Client>::new();
        state
            .apply(
                RegistryAction::Add(NewClient::from_form("Acme", "1 Main St", "", "")),
                &store,
                &session(),
            )
            .await;

        state.handle_key(KeyCode::Char('d'));
        let declined = state.handle_key(KeyCode::Char('n')).unwrap();
        state.apply(declined, &store, &session()).await;
        assert_eq!(state.items().len(), 1);

        state.handle_key(KeyCode::Char('d'));
        let confirmed = state.handle_key(KeyCode::Char('y')).unwrap();
        state.apply(confirmed, &store, &session()).await;
        assert!(state.items().is_empty());
    }

    #[tokio::test]
    async fn unauthenticated_refresh_is_reported() {
        let store = MemoryStore::new();
        let mut state = RegistryScreenState::<Client>::new();

        state.refresh(&store, &Session::anonymous()).await;

        assert!(state.error().unwrap().contains("no signed-in user"));
    }

    #[test]
    fn escape_leaves_the_screen() {
        let mut state = RegistryScreenState::<Service>::new();
        assert!(matches!(state.handle_key(KeyCode::Esc), Some(RegistryAction::Back)));
    }

    #[test]
    fn list_lines_show_the_useful_fields() {
        let service = Service {
            id: 1,
            name: "Design".to_string(),
            description: None,
            default_rate: 60.0,
            owner_id: "u-1".to_string(),
            created_at: chrono::Utc::now(),
        };
        assert_eq!(service.list_line(), "Design | $60/hr");
        assert_eq!(capitalize("client"), "Client");
    }
}
