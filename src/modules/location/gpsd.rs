//! gpsd client speaking the JSON watch protocol over TCP.

use std::io::ErrorKind;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::modules::location::source::{
    Coordinate, LocationError, PositionOptions, PositionSource,
};

const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true,\"json\":true};\n";

/// Reports we care about; everything else (VERSION, DEVICES, SKY, ...) is skipped
#[derive(Debug, Deserialize)]
#[serde(tag = "class")]
enum GpsdMessage {
    #[serde(rename = "TPV")]
    Tpv(TpvReport),
    #[serde(rename = "ERROR")]
    Error { message: String },
    #[serde(other)]
    Other,
}

/// Time-position-velocity report
#[derive(Debug, Deserialize)]
struct TpvReport {
    /// 0/1 = no fix, 2 = 2D, 3 = 3D
    #[serde(default)]
    mode: u8,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl TpvReport {
    fn coordinate(&self) -> Option<Coordinate> {
        if self.mode < 2 {
            return None;
        }
        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Some(Coordinate {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// Position from a local gpsd daemon
pub struct GpsdPositionSource {
    address: String,
}

impl GpsdPositionSource {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl PositionSource for GpsdPositionSource {
    // gpsd only streams live receiver output after WATCH, so every accepted
    // TPV is fresh and maximum_age needs no filtering. The receiver is a GNSS
    // unit either way, so high accuracy changes nothing here.
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, LocationError> {
        let mut stream = TcpStream::connect(&self.address)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::ConnectionRefused | ErrorKind::NotFound => {
                    tracing::debug!("gpsd not reachable at {}: {}", self.address, e);
                    LocationError::Unsupported
                }
                ErrorKind::PermissionDenied => LocationError::PermissionDenied(e.to_string()),
                _ => LocationError::PositionUnavailable(e.to_string()),
            })?;

        stream
            .write_all(WATCH_COMMAND)
            .await
            .map_err(|e| LocationError::PositionUnavailable(e.to_string()))?;

        let mut lines = BufReader::new(stream).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| LocationError::PositionUnavailable(e.to_string()))?
        {
            match serde_json::from_str::<GpsdMessage>(&line) {
                Ok(GpsdMessage::Tpv(report)) => {
                    if let Some(coordinate) = report.coordinate() {
                        return Ok(coordinate);
                    }
                }
                Ok(GpsdMessage::Error { message }) => {
                    return Err(LocationError::PositionUnavailable(message));
                }
                Ok(GpsdMessage::Other) => {}
                Err(e) => tracing::debug!("Skipping unparseable gpsd line: {}", e),
            }
        }

        Err(LocationError::PositionUnavailable(
            "gpsd closed the connection".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn options() -> PositionOptions {
        PositionOptions {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }

    /// Accepts one client, waits for WATCH, then replays `lines`
    async fn fake_gpsd(lines: Vec<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 64];
            let n = socket.read(&mut buf).await.unwrap();
            assert!(std::str::from_utf8(&buf[..n]).unwrap().starts_with("?WATCH="));

            for line in lines {
                socket.write_all(line.as_bytes()).await.unwrap();
                socket.write_all(b"\n").await.unwrap();
            }
        });

        address
    }

    #[tokio::test]
    async fn test_first_tpv_with_fix_wins() {
        let address = fake_gpsd(vec![
            r#"{"class":"VERSION","release":"3.25"}"#,
            r#"{"class":"TPV","mode":1}"#,
            r#"{"class":"TPV","mode":2,"lat":-5.1,"lon":105.3}"#,
            r#"{"class":"TPV","mode":3,"lat":-6.0,"lon":106.0}"#,
        ])
        .await;

        let coordinate = GpsdPositionSource::new(address)
            .current_position(&options())
            .await
            .unwrap();

        assert_eq!(
            coordinate,
            Coordinate {
                latitude: -5.1,
                longitude: 105.3
            }
        );
    }

    #[tokio::test]
    async fn test_connection_closed_without_fix() {
        let address = fake_gpsd(vec![r#"{"class":"TPV","mode":1}"#, "not json"]).await;

        let result = GpsdPositionSource::new(address)
            .current_position(&options())
            .await;

        assert!(matches!(result, Err(LocationError::PositionUnavailable(_))));
    }

    #[tokio::test]
    async fn test_gpsd_error_report() {
        let address = fake_gpsd(vec![r#"{"class":"ERROR","message":"no devices"}"#]).await;

        let result = GpsdPositionSource::new(address)
            .current_position(&options())
            .await;

        assert!(
            matches!(result, Err(LocationError::PositionUnavailable(ref m)) if m == "no devices")
        );
    }

    #[tokio::test]
    async fn test_no_daemon_means_unsupported() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let result = GpsdPositionSource::new(address)
            .current_position(&options())
            .await;

        assert!(matches!(result, Err(LocationError::Unsupported)));
    }
}
