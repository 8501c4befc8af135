pub mod constants;
pub mod engine;
pub mod meter;
pub mod params;
pub mod smoother;
