pub mod reports;
pub mod village_data;
