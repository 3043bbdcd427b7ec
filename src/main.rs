mod cli;
mod config;
mod contract;
mod db;
mod error;
mod export;
mod invoice;
mod models;
mod reference_data;
mod registry;
mod session;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::cli::{Cli, StartScreen};
use crate::config::Letterhead;
use crate::contract::ContractWizard;
use crate::export::PandocRenderer;
use crate::invoice::InvoiceDraft;
use crate::models::{Client, Service};
use crate::session::Session;
use crate::ui::{
    contract_wizard::{
        handle_input as handle_contract_input, render_contract_wizard,
        ContractWizardAction, ContractWizardState,
    },
    home::{handle_input as handle_home_input, render_home, Destination, HomeAction, HomeState},
    invoice_generator::{
        handle_input as handle_invoice_input, render_invoice_generator, InvoiceGeneratorAction,
        InvoiceGeneratorState,
    },
    registry_screen::{handle_input as handle_registry_input, render_registry, RegistryScreenState},
};

// Represents the current screen in the app
enum AppScreen {
    Home,
    Clients,
    Services,
    InvoiceGenerator,
    ContractWizard,
}

// Main application state
struct AppState {
    db: db::Database,
    session: Session,
    renderer: PandocRenderer,
    letterhead: Letterhead,
    screen: AppScreen,
    home_state: HomeState,
    clients_state: Option<RegistryScreenState<Client>>,
    services_state: Option<RegistryScreenState<Service>>,
    invoice_state: Option<InvoiceGeneratorState>,
    contract_state: Option<ContractWizardState>,
}

impl AppState {
    fn new(db: db::Database, session: Session, renderer: PandocRenderer, letterhead: Letterhead) -> Self {
        let home_state = HomeState::new(session.user_id().map(str::to_string));
        Self {
            db,
            session,
            renderer,
            letterhead,
            screen: AppScreen::Home,
            home_state,
            clients_state: None,
            services_state: None,
            invoice_state: None,
            contract_state: None,
        }
    }
}

fn init_tracing(log_file: &str) -> Result<()> {
    // The terminal belongs to the UI, so logs go to a file
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("could not open log file {}", log_file))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = config::init()?;
    cli.apply(&mut config);
    init_tracing(&config.log_file)?;
    println!("Initializing billing desk...");

    let session = Session::new(config.user_id.clone());
    if !session.is_authenticated() {
        tracing::warn!("starting without a signed-in user");
    }

    // Initialize database connection
    let db = db::init(&config).await?;
    println!("Database connection established");

    let renderer = PandocRenderer::new(&config.output_dir, config.pandoc_path.clone())?;

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app_state = AppState::new(db, session, renderer, config.letterhead());

    let start = match cli.screen {
        StartScreen::Home => None,
        StartScreen::Clients => Some(Destination::Clients),
        StartScreen::Services => Some(Destination::Services),
        StartScreen::Invoice => Some(Destination::InvoiceGenerator),
        StartScreen::Contract => Some(Destination::ContractGenerator),
    };
    if let Some(destination) = start {
        open_destination(&mut app_state, destination).await;
    }

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        tracing::error!(error = %err, "billing desk stopped");
        println!("Error: {}", err);
    }

    println!("Thanks for using Billing Desk!");

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| match app_state.screen {
            AppScreen::Home => render_home(f, &mut app_state.home_state),
            AppScreen::Clients => {
                if let Some(state) = &mut app_state.clients_state {
                    render_registry(f, state);
                }
            }
            AppScreen::Services => {
                if let Some(state) = &mut app_state.services_state {
                    render_registry(f, state);
                }
            }
            AppScreen::InvoiceGenerator => {
                if let Some(state) = &mut app_state.invoice_state {
                    render_invoice_generator(f, state);
                }
            }
            AppScreen::ContractWizard => {
                if let Some(state) = &mut app_state.contract_state {
                    render_contract_wizard(f, state);
                }
            }
        })?;

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Home => handle_home_screen(app_state).await?,
            AppScreen::Clients => handle_clients_screen(app_state).await?,
            AppScreen::Services => handle_services_screen(app_state).await?,
            AppScreen::InvoiceGenerator => handle_invoice_screen(app_state).await?,
            AppScreen::ContractWizard => handle_contract_screen(app_state)?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn open_destination(app_state: &mut AppState, destination: Destination) {
    match destination {
        Destination::Clients => {
            let mut state = RegistryScreenState::new();
            state.refresh(&app_state.db, &app_state.session).await;
            app_state.clients_state = Some(state);
            app_state.screen = AppScreen::Clients;
        }
        Destination::Services => {
            let mut state = RegistryScreenState::new();
            state.refresh(&app_state.db, &app_state.session).await;
            app_state.services_state = Some(state);
            app_state.screen = AppScreen::Services;
        }
        Destination::InvoiceGenerator => {
            // Fresh draft each visit; clients and services are fetched again
            let mut state = InvoiceGeneratorState::new(InvoiceDraft::today(), app_state.letterhead.clone());
            state.load(&app_state.db, &app_state.session).await;
            app_state.invoice_state = Some(state);
            app_state.screen = AppScreen::InvoiceGenerator;
        }
        Destination::ContractGenerator => {
            app_state.contract_state = Some(ContractWizardState::new(
                ContractWizard::today(),
                app_state.letterhead.clone(),
            ));
            app_state.screen = AppScreen::ContractWizard;
        }
    }
}

fn go_home(app_state: &mut AppState) {
    app_state.clients_state = None;
    app_state.services_state = None;
    app_state.invoice_state = None;
    app_state.contract_state = None;
    app_state.screen = AppScreen::Home;
}

async fn handle_home_screen(app_state: &mut AppState) -> Result<bool> {
    match handle_home_input(&mut app_state.home_state)? {
        Some(HomeAction::Exit) => return Ok(true),
        Some(HomeAction::Open(destination)) => open_destination(app_state, destination).await,
        Some(HomeAction::SwitchUser(user_id)) => {
            if app_state.session.switch_user(user_id) {
                app_state.home_state.set_user(app_state.session.user_id().map(str::to_string));
                if !app_state.session.is_authenticated() {
                    app_state.home_state.set_error("Signed out. Sign in again to reach your data.");
                }
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_clients_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.clients_state {
        if let Some(action) = handle_registry_input(state)? {
            if state.apply(action, &app_state.db, &app_state.session).await {
                go_home(app_state);
            }
        }
    }

    Ok(false)
}

async fn handle_services_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.services_state {
        if let Some(action) = handle_registry_input(state)? {
            if state.apply(action, &app_state.db, &app_state.session).await {
                go_home(app_state);
            }
        }
    }

    Ok(false)
}

async fn handle_invoice_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.invoice_state {
        match handle_invoice_input(state)? {
            Some(InvoiceGeneratorAction::Back) => go_home(app_state),
            Some(InvoiceGeneratorAction::Reload) => state.load(&app_state.db, &app_state.session).await,
            Some(InvoiceGeneratorAction::Generate) => {
                state.generate(&app_state.renderer);
            }
            None => {}
        }
    }

    Ok(false)
}

fn handle_contract_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.contract_state {
        match handle_contract_input(state)? {
            Some(ContractWizardAction::Back) => go_home(app_state),
            Some(ContractWizardAction::Generate) => {
                state.generate(&app_state.renderer);
            }
            None => {}
        }
    }

    Ok(false)
}
