// Domain layer: table model, stage state machine and ports (interfaces).

pub mod model;
pub mod ports;
