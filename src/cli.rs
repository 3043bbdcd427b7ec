use clap::{Parser, ValueEnum};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "billing_desk", about = "Clients, services, invoices and contracts in the terminal")]
pub struct Cli {
    /// Sign in as this user (overrides USER_ID)
    #[arg(long)]
    pub user: Option<String>,

    /// Where generated documents are written (overrides OUTPUT_DIR)
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Screen to open first
    #[arg(long, value_enum, default_value_t = StartScreen::Home)]
    pub screen: StartScreen,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
pub enum StartScreen {
    Home,
    Clients,
    Services,
    Invoice,
    Contract,
}

impl Cli {
    /// Command-line values win over the environment.
    pub fn apply(&self, config: &mut Config) {
        if let Some(user) = &self.user {
            config.user_id = Some(user.clone());
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
    }
}
