// Adapters layer: concrete implementations for external systems.

pub mod plant_id;
pub mod storage;
