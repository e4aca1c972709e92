mod store_dir;

pub use store_dir::*;
