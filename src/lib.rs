// VergiNo - Core Library
// Tax identifier validation + taxpayer roster, used by the CLI and tests

pub mod validation;
pub mod error;
pub mod entities;
pub mod db;
pub mod store;
pub mod config;
pub mod backup;
pub mod exchange;
pub mod logging;

// Re-export commonly used types
pub use validation::{
    classify, is_same_tax_number, is_valid_tax_number, is_valid_tckn, is_valid_vkn,
    TaxNumberKind,
};
pub use error::{StoreError, StoreResult, ValidationError};
pub use entities::TaxPayer;
pub use store::{SqliteTaxPayerStore, TaxPayerRepository};
pub use config::AppConfig;
pub use backup::{backup_database, is_backup_due};
pub use exchange::{export_csv, read_csv, ExchangeError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
