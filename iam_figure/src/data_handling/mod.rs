pub mod ensemble;
pub mod historical;
pub mod study;
