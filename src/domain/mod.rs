// Domain layer: fare series models, the historical event table and the ports
// the pipeline stages are written against.

pub mod events;
pub mod model;
pub mod ports;
