pub mod profile;
pub mod client;
pub mod session;

pub use profile::{Profile, Role};
pub use client::{ClientFormData, ClientRecord};
pub use session::PortalSession;
