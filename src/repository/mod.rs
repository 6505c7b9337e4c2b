//! Data access layer (Repository pattern)
//!
//! Only the storage contracts live here; the persistence schema belongs to the host application.

pub mod delivery_record;
pub mod profile;
pub mod template;

pub use delivery_record::DeliveryRecordRepository;
pub use profile::ProfileRepository;
pub use template::TemplateRepository;
