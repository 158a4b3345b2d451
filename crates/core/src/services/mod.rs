pub mod holding_workflow;
pub mod spot_price_service;
pub mod valuation_service;
