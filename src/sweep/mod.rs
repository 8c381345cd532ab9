pub mod postgres_store;
pub mod rest_store;
pub mod sweep_handlers;
pub mod sweep_models;
pub mod sweep_scheduler;
pub mod sweep_service;
pub mod sweep_store;

#[cfg(test)]
pub mod memory_store;

pub use postgres_store::PgStore;
pub use rest_store::RestStore;
pub use sweep_handlers::run_expiration_sweep;
pub use sweep_models::SweepResponse;
pub use sweep_scheduler::start_sweep_scheduler;
pub use sweep_service::ExpirationSweeper;
pub use sweep_store::SweepStore;
