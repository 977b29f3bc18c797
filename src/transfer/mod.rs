//! External copy tool execution

pub mod azcopy;
pub mod supervisor;

pub use azcopy::{AzCopy, TransferRequest};
pub use supervisor::{TransferEvent, start};
