mod report_category;
mod report_draft;
mod submission_state;

pub use report_category::ReportCategory;
pub use report_draft::{ReportDraft, ReportLocation};
pub use submission_state::SubmissionState;
