//! 核心：请求级错误、优雅关闭

pub mod error;
pub mod shutdown;

pub use error::InterviewError;
pub use shutdown::{ShutdownManager, ShutdownReason};
