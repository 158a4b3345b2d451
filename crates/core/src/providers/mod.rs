pub mod registry;
pub mod traits;

// Spot price sources
pub mod metals_dev;
pub mod stack_api;
