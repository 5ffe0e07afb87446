// Adapters layer: concrete client, catalog and extraction backends.

pub mod catalog;
pub mod session;
pub mod sources;
