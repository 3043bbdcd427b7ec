pub mod components;
pub mod contract_wizard;
pub mod home;
pub mod invoice_generator;
pub mod registry_screen;
