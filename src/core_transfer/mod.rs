pub mod transfer;

pub use transfer::{copy_ascii, copy_binary, TransferType};
