pub mod bounds;
pub mod classifier;
pub mod indexer;
pub mod locator;
pub mod screen_model;
