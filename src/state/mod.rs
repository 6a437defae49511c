pub mod identity;
pub mod normalize;
