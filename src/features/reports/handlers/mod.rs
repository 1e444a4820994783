pub mod camera_handler;
pub mod report_form_handler;

pub use camera_handler::*;
pub use report_form_handler::*;
