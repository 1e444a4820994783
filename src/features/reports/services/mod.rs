mod geocoding_service;
pub mod report_assembler;
mod report_form_service;

pub use geocoding_service::{
    GeocodingService, NominatimAddress, NominatimReverseResponse, ReverseGeocoder,
};
pub use report_assembler::ReportPayload;
pub use report_form_service::ReportFormService;
