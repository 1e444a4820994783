//! Citizen field report form.
//!
//! Holds the single in-progress draft, the camera used to attach a photo and
//! the submission workflow that geolocates, assembles and sends the report.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/report-form` | Current draft, camera and submission state |
//! | PUT | `/api/report-form/draft` | Edit draft fields |
//! | DELETE | `/api/report-form` | Discard the form and release the camera |
//! | POST | `/api/report-form/acknowledge` | Dismiss the outcome message |
//! | POST | `/api/report-form/submit` | Submit the report |
//! | GET | `/api/report-form/photo` | Attached photo |
//! | POST | `/api/report-form/camera/open` | Open the rear camera |
//! | GET | `/api/report-form/camera/preview` | Live frame |
//! | POST | `/api/report-form/camera/capture` | Capture and attach a photo |
//! | POST | `/api/report-form/camera/close` | Close the camera |

pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use clients::ReportApiClient;
pub use services::{GeocodingService, ReportFormService};
