pub mod poll_service;
pub mod slave_service;

pub use poll_service::PollService;
pub use slave_service::SlaveService;
