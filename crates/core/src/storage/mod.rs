pub mod encrypted;
pub mod encryption;
#[cfg(not(target_arch = "wasm32"))]
pub mod file;
pub mod format;
pub mod holdings_store;
pub mod memory;
pub mod settings;
pub mod traits;
