pub mod batch;
pub mod clock;
pub mod executor;
