//! Business logic layer

pub mod delivery;
pub mod profile;
pub mod template;

pub use delivery::DeliveryService;
pub use profile::ProfileService;
pub use template::TemplateService;
