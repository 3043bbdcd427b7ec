//! Contract generator: a two-step wizard over a transient contract draft.

mod clauses;

use std::fmt;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::config::Letterhead;
use crate::error::ExportError;
use crate::export::{Document, DocumentRenderer};

pub use clauses::{render_contract_markdown, select_clause_set};

pub const CONTRACT_FILENAME: &str = "contract";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Designer,
    Developer,
}

impl Role {
    pub fn toggle(self) -> Self {
        match self {
            Role::Designer => Role::Developer,
            Role::Developer => Role::Designer,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Designer => write!(f, "Designer"),
            Role::Developer => write!(f, "Developer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmploymentType {
    FullTime,
    PartTime,
}

impl EmploymentType {
    pub fn toggle(self) -> Self {
        match self {
            EmploymentType::FullTime => EmploymentType::PartTime,
            EmploymentType::PartTime => EmploymentType::FullTime,
        }
    }

    /// Capitalized form used in clause titles, e.g. "Full-Time".
    pub fn title(self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Full-Time",
            EmploymentType::PartTime => "Part-Time",
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmploymentType::FullTime => write!(f, "Full-time"),
            EmploymentType::PartTime => write!(f, "Part-time"),
        }
    }
}

/// Statement-of-work fields collected on the second wizard step.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementOfWork {
    pub role: Role,
    pub employment_type: EmploymentType,
    pub skills: String,
    pub start_date: Option<NaiveDate>,
    pub rate: String,
    pub hours_per_week: String,
    pub responsibilities: String,
}

impl Default for StatementOfWork {
    fn default() -> Self {
        Self {
            role: Role::Designer,
            employment_type: EmploymentType::FullTime,
            skills: String::new(),
            start_date: None,
            rate: String::new(),
            hours_per_week: String::new(),
            responsibilities: String::new(),
        }
    }
}

impl StatementOfWork {
    pub fn start_date_display(&self) -> String {
        self.start_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractDraft {
    pub agreement_date: NaiveDate,
    pub client_name: String,
    pub client_address: String,
    pub sow: StatementOfWork,
}

impl ContractDraft {
    pub fn new(agreement_date: NaiveDate) -> Self {
        Self {
            agreement_date,
            client_name: String::new(),
            client_address: String::new(),
            sow: StatementOfWork::default(),
        }
    }
}

/// Step 1: agreement date, client name and address.
#[derive(Debug, Clone, PartialEq)]
pub struct AgreementStep {
    draft: ContractDraft,
}

/// Step 2: statement of work. The only step that can generate a contract.
#[derive(Debug, Clone, PartialEq)]
pub struct SowStep {
    draft: ContractDraft,
}

impl AgreementStep {
    pub fn new(draft: ContractDraft) -> Self {
        Self { draft }
    }

    pub fn draft(&self) -> &ContractDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ContractDraft {
        &mut self.draft
    }

    pub fn next(self) -> SowStep {
        SowStep { draft: self.draft }
    }
}

impl SowStep {
    pub fn draft(&self) -> &ContractDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ContractDraft {
        &mut self.draft
    }

    pub fn previous(self) -> AgreementStep {
        AgreementStep { draft: self.draft }
    }

    pub fn document(&self, letterhead: &Letterhead) -> Document {
        Document {
            file_stem: CONTRACT_FILENAME.to_string(),
            markdown: render_contract_markdown(&self.draft, letterhead),
        }
    }

    pub fn generate(
        &self,
        letterhead: &Letterhead,
        renderer: &dyn DocumentRenderer,
    ) -> Result<PathBuf, ExportError> {
        renderer.render(&self.document(letterhead))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContractWizard {
    Agreement(AgreementStep),
    StatementOfWork(SowStep),
}

impl ContractWizard {
    pub fn new(agreement_date: NaiveDate) -> Self {
        ContractWizard::Agreement(AgreementStep::new(ContractDraft::new(agreement_date)))
    }

    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn step_number(&self) -> u8 {
        match self {
            ContractWizard::Agreement(_) => 1,
            ContractWizard::StatementOfWork(_) => 2,
        }
    }

    pub fn draft(&self) -> &ContractDraft {
        match self {
            ContractWizard::Agreement(step) => step.draft(),
            ContractWizard::StatementOfWork(step) => step.draft(),
        }
    }

    pub fn draft_mut(&mut self) -> &mut ContractDraft {
        match self {
            ContractWizard::Agreement(step) => step.draft_mut(),
            ContractWizard::StatementOfWork(step) => step.draft_mut(),
        }
    }

    /// Moves to step 2. A no-op on step 2.
    pub fn next(self) -> Self {
        match self {
            ContractWizard::Agreement(step) => ContractWizard::StatementOfWork(step.next()),
            sow => sow,
        }
    }

    /// Moves back to step 1. A no-op on step 1.
    pub fn previous(self) -> Self {
        match self {
            ContractWizard::StatementOfWork(step) => ContractWizard::Agreement(step.previous()),
            agreement => agreement,
        }
    }
}
