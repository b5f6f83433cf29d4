pub mod pool;
pub mod schema;

pub use pool::{close_pool, create_pool, Backend};
