pub mod draft;
pub mod holding;
pub mod portfolio;
pub mod quote;
pub mod settings;
pub mod valuation;
