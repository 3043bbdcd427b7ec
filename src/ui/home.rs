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

use crate::ui::components::{centered_rect, edit_text, render_error};

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Destination {
    InvoiceGenerator,
    ContractGenerator,
    Clients,
    Services,
}

const MENU: [(Destination, &str, &str); 4] = [
    (
        Destination::InvoiceGenerator,
        "Invoice Generator",
        "Create professional invoices for your clients",
    ),
    (
        Destination::ContractGenerator,
        "Contract Generator",
        "Generate a services agreement with its statement of work",
    ),
    (
        Destination::Clients,
        "Client Management",
        "Add and remove the clients you bill",
    ),
    (
        Destination::Services,
        "Service Management",
        "Keep a catalog of services and default hourly rates",
    ),
];

pub enum HomeAction {
    Open(Destination),
    SwitchUser(Option<String>),
    Exit,
}

pub struct HomeState {
    user_id: Option<String>,
    list_state: ListState,
    // Some while the switch-user prompt is open
    user_input: Option<String>,
    show_error: Option<String>,
}

impl HomeState {
    pub fn new(user_id: Option<String>) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            user_id,
            list_state,
            user_input: None,
            show_error: None,
        }
    }

    pub fn set_user(&mut self, user_id: Option<String>) {
        self.user_id = user_id;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.show_error = Some(message.into());
    }

    pub fn selected(&self) -> Destination {
        MENU[self.list_state.selected().unwrap_or(0)].0
    }

    pub fn next(&mut self) {
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < MENU.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let i = match self.list_state.selected() {
            Some(0) | None => MENU.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<HomeAction> {
        if self.show_error.take().is_some() {
            return None;
        }

        if let Some(input) = &mut self.user_input {
            match key {
                KeyCode::Enter => {
                    let user_id = input.trim().to_string();
                    self.user_input = None;
                    return Some(HomeAction::SwitchUser(Some(user_id).filter(|id| !id.is_empty())));
                }
                KeyCode::Esc => self.user_input = None,
                key => edit_text(input, key),
            }
            return None;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Esc => Some(HomeAction::Exit),
            KeyCode::Char('u') => {
                self.user_input = Some(self.user_id.clone().unwrap_or_default());
                None
            }
            KeyCode::Char('1') => Some(HomeAction::Open(Destination::InvoiceGenerator)),
            KeyCode::Char('2') => Some(HomeAction::Open(Destination::ContractGenerator)),
            KeyCode::Char('3') => Some(HomeAction::Open(Destination::Clients)),
            KeyCode::Char('4') => Some(HomeAction::Open(Destination::Services)),
            KeyCode::Down => {
                self.next();
                None
            }
            KeyCode::Up => {
                self.previous();
                None
            }
            KeyCode::Enter => Some(HomeAction::Open(self.selected())),
            _ => None,
        }
    }
}

pub fn handle_input(state: &mut HomeState) -> Result<Option<HomeAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(state.handle_key(key.code));
    }
    Ok(None)
}

pub fn render_home<B: Backend>(frame: &mut Frame<B>, state: &mut HomeState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(size);

    let user = match &state.user_id {
        Some(user_id) => Span::styled(format!("Signed in as {}", user_id), Style::default().fg(Color::Green)),
        None => Span::styled("Not signed in", Style::default().fg(Color::Red)),
    };
    let header = Paragraph::new(Spans::from(vec![
        Span::styled("Billing Desk  ", Style::default().add_modifier(Modifier::BOLD)),
        user,
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = MENU
        .iter()
        .enumerate()
        .map(|(i, (_, title, description))| {
            ListItem::new(vec![
                Spans::from(Span::styled(
                    format!("{}. {}", i + 1, title),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Spans::from(format!("   {}", description)),
            ])
        })
        .collect();

    let menu = List::new(items)
        .block(Block::default().title("Home").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_stateful_widget(menu, chunks[1], &mut state.list_state);

    let help = Paragraph::new("Enter/1-4 - Open | <U> Switch user | <Q> Quit")
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(help, chunks[2]);

    if let Some(input) = &state.user_input {
        let area = centered_rect(50, 20, size);
        let prompt = Paragraph::new(vec![
            Spans::from(format!("User id: {}_", input)),
            Spans::from(""),
            Spans::from("Enter - Switch | <Esc> Cancel | empty signs out"),
        ])
        .block(Block::default().title("Switch User").borders(Borders::ALL));
        frame.render_widget(Clear, area);
        frame.render_widget(prompt, area);
    }

    if let Some(error) = &state.show_error {
        render_error(frame, size, error);
    }
}
