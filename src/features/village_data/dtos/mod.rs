mod village_data_dto;

pub use village_data_dto::VillageDataResponseDto;
