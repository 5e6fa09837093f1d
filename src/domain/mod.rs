// Domain layer: models and the ports the discovery core talks through.

pub mod model;
pub mod ports;
