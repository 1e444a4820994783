/// Identifies this client to the reverse geocoding service
pub const APP_USER_AGENT: &str = "DesaPelaporApp/1.0";

// =============================================================================
// PHOTO
// =============================================================================

/// Filename every captured photo is sent under
pub const PHOTO_FILENAME: &str = "photo.jpg";

/// Content type of every captured photo
pub const PHOTO_CONTENT_TYPE: &str = "image/jpeg";

// =============================================================================
// USER-FACING MESSAGES
// =============================================================================

pub const MSG_SUBMIT_SUCCEEDED: &str = "Laporan berhasil dikirim!";

pub const MSG_SUBMIT_FAILED: &str = "Gagal mengirim laporan";

pub const MSG_CAMERA_UNAVAILABLE: &str = "Kamera tidak bisa diakses";

pub const MSG_DIRECTORY_FETCH_FAILED: &str = "Failed to fetch data";
