pub mod batch;
pub mod updater;
