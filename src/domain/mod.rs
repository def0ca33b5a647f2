// Domain layer: order models, result tables and ports. No I/O here.

pub mod model;
pub mod ports;
