pub mod buffer;
pub mod decimate;
pub mod notes;
pub mod peak;
pub mod preprocess;
pub mod window;
