pub mod events;
pub mod manager;

pub use events::DrainOutcome;
pub use manager::TaskQueue;
