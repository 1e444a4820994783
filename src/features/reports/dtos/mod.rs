mod report_form_dto;

pub use report_form_dto::{DraftResponseDto, ReportFormResponseDto, UpdateDraftDto};
