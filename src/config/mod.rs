use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Identity of the signed-in user, if any
    #[serde(default)]
    pub user_id: Option<String>,

    /// Directory generated documents are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Executable used to turn Markdown documents into PDFs
    #[serde(default = "default_pandoc_path")]
    pub pandoc_path: String,

    #[serde(default = "default_log_file")]
    pub log_file: String,

    #[serde(default = "default_company_name")]
    pub company_name: String,
    #[serde(default = "default_company_location")]
    pub company_location: String,
    #[serde(default = "default_company_address")]
    pub company_address: String,
    #[serde(default = "default_company_phone")]
    pub company_phone: String,
    #[serde(default = "default_company_website")]
    pub company_website: String,
    #[serde(default = "default_company_jurisdiction")]
    pub company_jurisdiction: String,
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_pandoc_path() -> String {
    "pandoc".to_string()
}

fn default_log_file() -> String {
    "billing_desk.log".to_string()
}

fn default_company_name() -> String {
    "Value at Void LLC".to_string()
}

fn default_company_location() -> String {
    "Dubai, United Arab Emirates".to_string()
}

fn default_company_address() -> String {
    "904, ART XVIII, Business Bay, Dubai".to_string()
}

fn default_company_phone() -> String {
    "+971 567 010 999".to_string()
}

fn default_company_website() -> String {
    "www.atvoid.com".to_string()
}

fn default_company_jurisdiction() -> String {
    "Dubai, United Arab Emirates".to_string()
}

/// Provider details printed at the top of invoices and contracts
#[derive(Debug, Clone, PartialEq)]
pub struct Letterhead {
    pub name: String,
    pub location: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub jurisdiction: String,
}

impl Default for Letterhead {
    fn default() -> Self {
        Self {
            name: default_company_name(),
            location: default_company_location(),
            address: default_company_address(),
            phone: default_company_phone(),
            website: default_company_website(),
            jurisdiction: default_company_jurisdiction(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn letterhead(&self) -> Letterhead {
        Letterhead {
            name: self.company_name.clone(),
            location: self.company_location.clone(),
            address: self.company_address.clone(),
            phone: self.company_phone.clone(),
            website: self.company_website.clone(),
            jurisdiction: self.company_jurisdiction.clone(),
        }
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    dotenv().ok();

    let config = Config::load()?;

    Ok(config)
}
