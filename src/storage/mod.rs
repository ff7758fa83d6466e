pub mod manager;

pub use manager::{FileSystemStorage, LocalModelInfo, LocalModelState, Storage};
