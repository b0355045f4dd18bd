pub mod models;
pub mod report;
pub mod spread;
pub mod transport;
pub mod venues;
