//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports ([`UserGateway`]) are implemented by outbound adapters.
//! Driving ports ([`UserDirectory`]) are implemented by domain services and
//! called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod user_directory;
mod user_gateway;

#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::UserDirectory;
#[cfg(test)]
pub use user_gateway::MockUserGateway;
pub use user_gateway::{EMAIL_UNIQUE_CONSTRAINT, UserGateway, UserGatewayError};
