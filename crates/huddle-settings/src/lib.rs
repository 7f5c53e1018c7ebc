//! # huddle-settings
//!
//! Configuration management with layered sources for the huddle hub.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`HuddleSettings::default()`]
//! 2. **Settings file**: `~/.huddle/settings.json` or an explicit path (deep-merged over defaults)
//! 3. **Environment variables**: `HUDDLE_*` overrides (highest priority)
//!
//! The binary applies CLI flags on top of the loaded value. There is no
//! global cache: the loaded [`HuddleSettings`] is passed explicitly to
//! whatever needs it.
//!
//! # Usage
//!
//! ```no_run
//! use huddle_settings::load_settings;
//!
//! let settings = load_settings().unwrap_or_default();
//! println!("listening on {}", settings.server.bind_addr());
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_settings, load_settings_from_path, settings_path,
};
pub use types::*;
