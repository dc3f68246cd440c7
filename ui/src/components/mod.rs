pub mod controls;
pub mod describe;
mod histogram;

pub use histogram::histogram_widget;
