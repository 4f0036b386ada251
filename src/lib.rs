pub mod api;
pub mod config;
pub mod draft;
pub mod error;
pub mod form;
pub mod geo;
pub mod models;
pub mod session;
pub mod status;

pub use api::{http_client, PortalClient};
pub use error::{ApiError, LocationError, TransportError};
pub use form::{ComplaintForm, FormPhase};
pub use session::{Session, SessionStore};
