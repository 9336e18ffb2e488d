pub mod coerce;
pub mod error;
pub mod filter;
pub mod pawtner;
pub mod protocol;
pub mod resources;
pub mod seed;
pub mod stats;
pub mod store;
pub mod types;
