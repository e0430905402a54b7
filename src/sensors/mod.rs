//! Sensor persistence: the [`SensorManager`] contract and its Postgres-backed
//! implementation.

mod context;
mod manager;

pub use context::RequestContext;
pub use manager::{
    NewSensor, PostgresSensorManager, SensorManager, QUERY_ALL, QUERY_CREATE, QUERY_DELETE,
    QUERY_GET, QUERY_UPDATE,
};

/// A sensor installed at a site.
pub type Sensor = crate::entity::sensors::Model;
