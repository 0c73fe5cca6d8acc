mod storage;
mod types;

pub use storage::ChatStore;
pub use types::ChatRecord;
