pub mod clickhouse_store;
pub mod config_files;
pub mod memory;

pub use clickhouse_store::*;
pub use config_files::*;
pub use memory::*;
