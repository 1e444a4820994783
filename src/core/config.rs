use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub backend: BackendConfig,
    pub geocoding: GeocodingConfig,
    pub location: LocationConfig,
    pub camera: CameraConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

/// Village backend that persists submitted reports and serves directory lists
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// Reverse geocoding (Nominatim-compatible) endpoint
#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub base_url: String,
    pub user_agent: String,
}

/// Where the terminal gets its position from
#[derive(Debug, Clone, PartialEq)]
pub enum LocationProvider {
    /// gpsd daemon speaking its JSON protocol over TCP
    Gpsd { address: String },
    /// Terminal mounted at a known spot
    Fixed { latitude: f64, longitude: f64 },
    /// No geolocation capability on this platform
    None,
}

#[derive(Debug, Clone)]
pub struct LocationConfig {
    pub provider: LocationProvider,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// V4L2 device node of the rear ("environment") camera
    pub environment_device: String,
    /// V4L2 device node of the front ("user") camera, if the terminal has one
    pub user_device: Option<String>,
    pub width: u32,
    pub height: u32,
    pub ffmpeg_bin: String,
    pub jpeg_quality: u8,
    /// How long to wait for the first frame of a freshly opened stream
    pub frame_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            backend: BackendConfig::from_env()?,
            geocoding: GeocodingConfig::from_env()?,
            location: LocationConfig::from_env()?,
            camera: CameraConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl BackendConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("BACKEND_URL")
            .map_err(|_| "BACKEND_URL environment variable is required".to_string())?
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = env::var("BACKEND_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "BACKEND_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl GeocodingConfig {
    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("GEOCODING_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string())
            .trim_end_matches('/')
            .to_string();
        let user_agent = env::var("GEOCODING_USER_AGENT")
            .unwrap_or_else(|_| crate::shared::constants::APP_USER_AGENT.to_string());

        Ok(Self {
            base_url,
            user_agent,
        })
    }
}

impl LocationConfig {
    const DEFAULT_TIMEOUT_MS: u64 = 10_000;

    pub fn from_env() -> Result<Self, String> {
        let provider = match env::var("LOCATION_PROVIDER")
            .unwrap_or_else(|_| "gpsd".to_string())
            .to_lowercase()
            .as_str()
        {
            "gpsd" => LocationProvider::Gpsd {
                address: env::var("GPSD_ADDRESS")
                    .unwrap_or_else(|_| "127.0.0.1:2947".to_string()),
            },
            "fixed" => {
                let raw = env::var("LOCATION_FIXED").map_err(|_| {
                    "LOCATION_FIXED is required when LOCATION_PROVIDER=fixed".to_string()
                })?;
                let (latitude, longitude) = parse_lat_lon(&raw)?;
                LocationProvider::Fixed {
                    latitude,
                    longitude,
                }
            }
            "none" => LocationProvider::None,
            other => {
                return Err(format!(
                    "LOCATION_PROVIDER must be one of gpsd, fixed, none (got '{}')",
                    other
                ))
            }
        };

        let timeout_ms = env::var("LOCATION_TIMEOUT_MS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "LOCATION_TIMEOUT_MS must be a valid number".to_string())?;

        Ok(Self {
            provider,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

/// Parse a `"lat,lon"` pair
fn parse_lat_lon(raw: &str) -> Result<(f64, f64), String> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| format!("LOCATION_FIXED must be 'lat,lon' (got '{}')", raw))?;
    let latitude = lat
        .trim()
        .parse::<f64>()
        .map_err(|_| "LOCATION_FIXED latitude must be a number".to_string())?;
    let longitude = lon
        .trim()
        .parse::<f64>()
        .map_err(|_| "LOCATION_FIXED longitude must be a number".to_string())?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err("LOCATION_FIXED is out of range".to_string());
    }

    Ok((latitude, longitude))
}

/// Parses a frame dimension; zero is rejected since it yields empty frames
fn parse_dimension(name: &str, value: &str) -> Result<u32, String> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| format!("{} must be a positive number", name))
}

impl CameraConfig {
    const DEFAULT_WIDTH: u32 = 1280;
    const DEFAULT_HEIGHT: u32 = 720;
    const DEFAULT_JPEG_QUALITY: u8 = 85;
    const DEFAULT_FRAME_TIMEOUT_SECS: u64 = 5;

    pub fn from_env() -> Result<Self, String> {
        let environment_device =
            env::var("CAMERA_DEVICE").unwrap_or_else(|_| "/dev/video0".to_string());
        let user_device = env::var("CAMERA_USER_DEVICE").ok().filter(|s| !s.is_empty());

        let width = parse_dimension(
            "CAMERA_WIDTH",
            &env::var("CAMERA_WIDTH").unwrap_or_else(|_| Self::DEFAULT_WIDTH.to_string()),
        )?;

        let height = parse_dimension(
            "CAMERA_HEIGHT",
            &env::var("CAMERA_HEIGHT").unwrap_or_else(|_| Self::DEFAULT_HEIGHT.to_string()),
        )?;

        let ffmpeg_bin = env::var("CAMERA_FFMPEG_BIN").unwrap_or_else(|_| "ffmpeg".to_string());

        let jpeg_quality = env::var("CAMERA_JPEG_QUALITY")
            .unwrap_or_else(|_| Self::DEFAULT_JPEG_QUALITY.to_string())
            .parse::<u8>()
            .ok()
            .filter(|q| (1..=100).contains(q))
            .ok_or_else(|| "CAMERA_JPEG_QUALITY must be between 1 and 100".to_string())?;

        let frame_timeout_secs = env::var("CAMERA_FRAME_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_FRAME_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "CAMERA_FRAME_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            environment_device,
            user_device,
            width,
            height,
            ffmpeg_bin,
            jpeg_quality,
            frame_timeout: Duration::from_secs(frame_timeout_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Desa Pelapor Kiosk API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Report submission service for village reporting terminals".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}
