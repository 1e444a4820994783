//! Read-only village directory: officials ("aparatur"), activities and events.
//!
//! The three lists are fetched from the village backend together and cached.
//! A failed refresh keeps the previous lists and records the error.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/village-data` | Cached directory lists |
//! | POST | `/api/village-data/refresh` | Re-fetch the lists from the backend |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::VillageDataService;
