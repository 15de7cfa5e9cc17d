pub mod timeseries;
pub mod resolver;
