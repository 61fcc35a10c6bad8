// Domain layer: core models, run reports and ports (interfaces).

pub mod model;
pub mod ports;
pub mod report;
