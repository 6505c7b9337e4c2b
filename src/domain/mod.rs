//! Domain models for QuickNotify Core

pub mod delivery;
pub mod profile;
pub mod record;
pub mod template;

pub use delivery::*;
pub use profile::*;
pub use record::*;
pub use template::*;
