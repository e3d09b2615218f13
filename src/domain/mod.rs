// Domain layer: report model, raw service schema, batch types and ports.

pub mod analysis;
pub mod model;
pub mod ports;
pub mod raw;
