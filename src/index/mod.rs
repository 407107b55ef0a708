pub mod operation;
pub mod client;
pub mod memory;
pub mod json_dump;
