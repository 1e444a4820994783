mod village_data_service;

pub use village_data_service::VillageDataService;
