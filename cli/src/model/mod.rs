pub mod endpoint;
pub mod naming;
pub mod service;

pub use endpoint::{ApiEndpoint, BodyExample};
pub use service::{BuilderSettings, ServiceInfo, ServiceModelBuilder};
