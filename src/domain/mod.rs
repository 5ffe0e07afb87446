// Domain layer: the tabular model and the ports readers talk through.

pub mod model;
pub mod ports;
