// Domain layer: descriptor views and the plugin/config/storage ports.

pub mod model;
pub mod ports;
