use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::config::Letterhead;
use crate::contract::{select_clause_set, ContractWizard};
use crate::export::DocumentRenderer;
use crate::invoice::long_date;
use crate::ui::components::date_input::DateInputState;
use crate::ui::components::{edit_number, edit_text, render_error, render_notice};

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ContractField {
    ClientName,
    ClientAddress,
    Role,
    EmploymentType,
    Skills,
    StartDate,
    Rate,
    HoursPerWeek,
    Responsibilities,
}

const AGREEMENT_FIELDS: [ContractField; 2] = [ContractField::ClientName, ContractField::ClientAddress];

const SOW_FIELDS: [ContractField; 7] = [
    ContractField::Role,
    ContractField::EmploymentType,
    ContractField::Skills,
    ContractField::StartDate,
    ContractField::Rate,
    ContractField::HoursPerWeek,
    ContractField::Responsibilities,
];

impl ContractField {
    fn label(self) -> &'static str {
        match self {
            ContractField::ClientName => "Client Name",
            ContractField::ClientAddress => "Client Address",
            ContractField::Role => "Role",
            ContractField::EmploymentType => "Employment Type",
            ContractField::Skills => "Skills",
            ContractField::StartDate => "Start Date",
            ContractField::Rate => "Rate (USD/hour)",
            ContractField::HoursPerWeek => "Hours per Week",
            ContractField::Responsibilities => "Responsibilities",
        }
    }
}

pub enum ContractWizardAction {
    Back,
    Generate,
}

pub struct ContractWizardState {
    wizard: ContractWizard,
    letterhead: Letterhead,
    field_index: usize,
    editing: bool,
    start_date_state: DateInputState,
    show_error: Option<String>,
    notice: Option<String>,
}

impl ContractWizardState {
    pub fn new(wizard: ContractWizard, letterhead: Letterhead) -> Self {
        let agreement_date = wizard.draft().agreement_date;
        let start_date = wizard.draft().sow.start_date;
        Self {
            wizard,
            letterhead,
            field_index: 0,
            editing: false,
            start_date_state: DateInputState::new(start_date, agreement_date),
            show_error: None,
            notice: None,
        }
    }

    #[cfg(test)]
    pub fn wizard(&self) -> &ContractWizard {
        &self.wizard
    }

    #[cfg(test)]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn fields(&self) -> &'static [ContractField] {
        match self.wizard {
            ContractWizard::Agreement(_) => &AGREEMENT_FIELDS,
            ContractWizard::StatementOfWork(_) => &SOW_FIELDS,
        }
    }

    pub fn current_field(&self) -> ContractField {
        let fields = self.fields();
        fields[self.field_index.min(fields.len() - 1)]
    }

    fn next_step(&mut self) {
        self.wizard = self.wizard.clone().next();
        self.field_index = 0;
    }

    fn previous_step(&mut self) {
        self.wizard = self.wizard.clone().previous();
        self.field_index = 0;
    }

    /// Exports the contract. Only the statement-of-work step can do this.
    pub fn generate(&mut self, renderer: &dyn DocumentRenderer) -> Option<PathBuf> {
        let ContractWizard::StatementOfWork(step) = &self.wizard else {
            return None;
        };

        match step.generate(&self.letterhead, renderer) {
            Ok(path) => {
                self.notice = Some(format!("Contract saved to {}", path.display()));
                Some(path)
            }
            Err(err) => {
                tracing::error!(error = %err, "contract export failed");
                self.show_error = Some(err.to_string());
                None
            }
        }
    }

    fn start_editing(&mut self) {
        let field = self.current_field();
        let sow = &mut self.wizard.draft_mut().sow;
        match field {
            // Toggles flip in place
            ContractField::Role => sow.role = sow.role.toggle(),
            ContractField::EmploymentType => sow.employment_type = sow.employment_type.toggle(),
            ContractField::StartDate => {
                self.start_date_state.toggle_editing();
                self.editing = true;
            }
            _ => self.editing = true,
        }
    }

    fn stop_editing(&mut self) {
        if self.start_date_state.editing {
            self.start_date_state.toggle_editing();
        }
        self.wizard.draft_mut().sow.start_date = self.start_date_state.date;
        self.editing = false;
    }

    fn edit_key(&mut self, key: KeyCode) {
        let field = self.current_field();
        let draft = self.wizard.draft_mut();
        match field {
            ContractField::ClientName => edit_text(&mut draft.client_name, key),
            ContractField::ClientAddress => edit_text(&mut draft.client_address, key),
            ContractField::Skills => edit_text(&mut draft.sow.skills, key),
            ContractField::Responsibilities => edit_text(&mut draft.sow.responsibilities, key),
            ContractField::Rate => edit_number(&mut draft.sow.rate, key),
            ContractField::HoursPerWeek => edit_number(&mut draft.sow.hours_per_week, key),
            ContractField::StartDate => {
                self.start_date_state.handle_input(key);
                draft.sow.start_date = self.start_date_state.date;
                if !self.start_date_state.editing {
                    self.editing = false;
                }
            }
            ContractField::Role | ContractField::EmploymentType => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<ContractWizardAction> {
        if self.show_error.take().is_some() || self.notice.take().is_some() {
            return None;
        }

        if self.editing {
            match key {
                KeyCode::Enter | KeyCode::Esc => self.stop_editing(),
                key => self.edit_key(key),
            }
            return None;
        }

        let field_count = self.fields().len();
        let on_sow = matches!(self.wizard, ContractWizard::StatementOfWork(_));
        match (key, on_sow) {
            (KeyCode::Esc | KeyCode::Char('q'), _) => return Some(ContractWizardAction::Back),
            (KeyCode::Char('n'), false) => self.next_step(),
            (KeyCode::Char('p'), true) => self.previous_step(),
            (KeyCode::Char('g'), true) => {
                return Some(ContractWizardAction::Generate);
            }
            (KeyCode::Down | KeyCode::Tab, _) => self.field_index = (self.field_index + 1) % field_count,
            (KeyCode::Up | KeyCode::BackTab, _) => {
                self.field_index = (self.field_index + field_count - 1) % field_count;
            }
            (KeyCode::Enter, _) => self.start_editing(),
            _ => {}
        }
        None
    }
}

pub fn handle_input(state: &mut ContractWizardState) -> Result<Option<ContractWizardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(state.handle_key(key.code));
    }
    Ok(None)
}

fn display_value(state: &ContractWizardState, field: ContractField) -> String {
    let draft = state.wizard.draft();
    match field {
        ContractField::ClientName => draft.client_name.clone(),
        ContractField::ClientAddress => draft.client_address.clone(),
        ContractField::Role => format!("< {} >", draft.sow.role),
        ContractField::EmploymentType => format!("< {} >", draft.sow.employment_type),
        ContractField::Skills => draft.sow.skills.clone(),
        ContractField::StartDate => state.start_date_state.get_display_string(),
        ContractField::Rate => draft.sow.rate.clone(),
        ContractField::HoursPerWeek => draft.sow.hours_per_week.clone(),
        ContractField::Responsibilities => draft.sow.responsibilities.clone(),
    }
}

pub fn render_contract_wizard<B: Backend>(frame: &mut Frame<B>, state: &mut ContractWizardState) {
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

    let title = match state.wizard {
        ContractWizard::Agreement(_) => "General Services Agreement",
        ContractWizard::StatementOfWork(_) => "Statement of Work",
    };
    let header = Paragraph::new(format!(
        "Step {} of 2: {}    Agreement date: {}",
        state.wizard.step_number(),
        title,
        long_date(state.wizard.draft().agreement_date)
    ))
    .block(Block::default().title("Contract Generator").borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let current = state.current_field();
    let mut lines: Vec<Spans> = state
        .fields()
        .iter()
        .map(|field| {
            let style = if *field == current {
                if state.editing {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Yellow)
                }
            } else {
                Style::default()
            };
            Spans::from(vec![
                Span::styled(format!("{}: ", field.label()), style),
                Span::raw(display_value(state, *field)),
            ])
        })
        .collect();

    if let ContractWizard::StatementOfWork(_) = state.wizard {
        let sow = &state.wizard.draft().sow;
        lines.push(Spans::from(""));
        let clauses = match select_clause_set(sow.role, sow.employment_type) {
            Some(set) => Span::styled(format!("Clauses: {}", set.title()), Style::default().fg(Color::Green)),
            None => Span::styled(
                "Clauses: no template for this role and employment type",
                Style::default().fg(Color::Red),
            ),
        };
        lines.push(Spans::from(clauses));
    }

    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(form, chunks[1]);

    let help_text = match (&state.wizard, state.editing) {
        (_, true) if current == ContractField::StartDate => {
            "Digits - Type segment | Left/Right - Segment | <Del> Clear | Enter - Done"
        }
        (_, true) => "Type to edit | Enter/<Esc> Done",
        (ContractWizard::Agreement(_), false) => "Up/Down - Field | Enter - Edit | <N> Next step | <Esc> Back",
        (ContractWizard::StatementOfWork(_), false) => {
            "Up/Down - Field | Enter - Edit/Toggle | <P> Previous step | <G> Generate PDF | <Esc> Back"
        }
    };
    let help = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(help, chunks[2]);

    if let Some(error) = &state.show_error {
        render_error(frame, size, error);
    } else if let Some(notice) = &state.notice {
        render_notice(frame, size, "Contract Generated", notice);
    }
}
