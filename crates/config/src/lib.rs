//! Configuration loading and schema.
//!
//! Config files: `slotgrab.toml`, `slotgrab.yaml`, or `slotgrab.json`,
//! searched in `./` then `~/.config/slotgrab/`.

pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, data_dir, discover_and_load, load_config},
    schema::{BookingDefaults, BrowserConfig, ServerConfig, SlotgrabConfig},
};
