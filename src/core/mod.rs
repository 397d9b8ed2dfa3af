pub mod color;
pub mod dataset;
pub mod engine;
pub mod fields;
pub mod imaging;
pub mod label;
pub mod model;
