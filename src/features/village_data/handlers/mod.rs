pub mod village_data_handler;

pub use village_data_handler::*;
