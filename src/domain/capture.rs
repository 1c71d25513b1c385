//! Attendance capture: the confirmation-gated process that turns a
//! check-in/out attempt into a verified photo artifact.
//!
//! `AwaitingLocation -> AwaitingCapture -> Processing -> Done`, with
//! `Failed(reason)` reachable from the first two states and a user-triggered
//! retry back to `AwaitingLocation`. The web client acts as the geolocation
//! and camera hardware; the traits below let tests (and a future real
//! liveness service) substitute every external dependency.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use chrono::NaiveTime;
use thiserror::Error;

use crate::domain::geo::{self, Coordinate};
use crate::models::{Branch, Direction};

#[derive(Debug, Clone, Error)]
pub enum CaptureFailure {
    #[error("Không thể truy cập vị trí. Vui lòng cấp quyền vị trí cho thiết bị. ({0})")]
    LocationUnavailable(String),

    #[error(
        "Bạn đang cách chi nhánh {distance}m. (Yêu cầu < {radius_m}m). Tọa độ GPS: {lat:.4}, {lng:.4}",
        distance = .distance_m.round(),
        lat = .position.lat,
        lng = .position.lng
    )]
    OutsideFence {
        distance_m: f64,
        radius_m: f64,
        position: Coordinate,
    },

    #[error("Không thể mở Camera. Vui lòng cấp quyền. ({0})")]
    DeviceUnavailable(String),

    #[error("Xác thực khuôn mặt thất bại: {0}")]
    VerificationRejected(String),
}

/// Position source. The provider must return a fresh fix on every call
/// (maximum-age zero), never a cached one.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinate, String>;
}

/// Camera source. A successful acquisition hands back a [`VideoStream`]
/// guard whose drop releases the device on every exit path.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    async fn acquire(&self) -> Result<VideoStream, String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    Accepted,
    Rejected(String),
}

/// The verification step between capture and completion. The production
/// default is [`SimulatedVerifier`]; a real biometric/liveness service plugs
/// in here without touching the state machine.
#[async_trait]
pub trait Verifier: Send + Sync {
    async fn verify(&self, frame: &str) -> VerificationResult;
}

/// RAII handle on an acquired capture device. Dropping the stream releases
/// the device, whether the session completed, failed, or was cancelled.
pub struct VideoStream {
    frame: String,
    released: Arc<AtomicBool>,
}

impl VideoStream {
    pub fn new(frame: String) -> Self {
        Self::with_release_flag(frame, Arc::new(AtomicBool::new(false)))
    }

    /// Devices that track hardware state share their release flag so the
    /// owner can observe the guarantee.
    pub fn with_release_flag(frame: String, released: Arc<AtomicBool>) -> Self {
        VideoStream { frame, released }
    }

    pub fn capture_frame(&self) -> String {
        self.frame.clone()
    }
}

impl Drop for VideoStream {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub enum CaptureState {
    AwaitingLocation,
    AwaitingCapture,
    Processing,
    Done,
    Failed(CaptureFailure),
}

/// The artifact a completed session emits: the captured frame and the
/// wall-clock capture time.
#[derive(Debug, Clone)]
pub struct CapturedShot {
    pub photo: String,
    pub taken_at: NaiveTime,
}

/// One capture attempt for one shift direction. At most one session exists
/// per user interaction; nothing is persisted unless the session reaches
/// `Done`.
pub struct CaptureSession {
    pub direction: Direction,
    fence: Coordinate,
    radius_m: f64,
    state: CaptureState,
}

impl CaptureSession {
    pub fn new(direction: Direction, branch: &Branch) -> Self {
        CaptureSession {
            direction,
            fence: Coordinate::new(branch.lat, branch.lng),
            radius_m: branch.radius,
            state: CaptureState::AwaitingLocation,
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// Drive the session to completion. Every failure parks the session in
    /// `Failed` so the caller can offer [`retry`](Self::retry); the stream
    /// guard is dropped on all paths, including cancellation of the returned
    /// future.
    pub async fn run(
        &mut self,
        location: &dyn LocationProvider,
        device: &dyn CaptureDevice,
        verifier: &dyn Verifier,
        now: NaiveTime,
    ) -> Result<CapturedShot, CaptureFailure> {
        let position = match location.current_position().await {
            Ok(position) => position,
            Err(reason) => return Err(self.fail(CaptureFailure::LocationUnavailable(reason))),
        };

        // Invalid coordinates fail closed: treated as outside the fence.
        let distance_m = geo::distance_meters(position, self.fence);
        let inside = position.is_valid() && self.fence.is_valid() && distance_m <= self.radius_m;
        if !inside {
            return Err(self.fail(CaptureFailure::OutsideFence {
                distance_m,
                radius_m: self.radius_m,
                position,
            }));
        }
        self.state = CaptureState::AwaitingCapture;

        let stream = match device.acquire().await {
            Ok(stream) => stream,
            Err(reason) => return Err(self.fail(CaptureFailure::DeviceUnavailable(reason))),
        };
        let frame = stream.capture_frame();
        self.state = CaptureState::Processing;

        let result = match verifier.verify(&frame).await {
            VerificationResult::Accepted => {
                self.state = CaptureState::Done;
                Ok(CapturedShot {
                    photo: frame,
                    taken_at: now,
                })
            }
            VerificationResult::Rejected(reason) => {
                Err(self.fail(CaptureFailure::VerificationRejected(reason)))
            }
        };
        drop(stream);
        result
    }

    /// User-triggered retry from any failure, back to the location gate.
    pub fn retry(&mut self) {
        if matches!(self.state, CaptureState::Failed(_)) {
            self.state = CaptureState::AwaitingLocation;
        }
    }

    fn fail(&mut self, failure: CaptureFailure) -> CaptureFailure {
        self.state = CaptureState::Failed(failure.clone());
        failure
    }
}

/// Location provider backed by the coordinates the client reported with the
/// request. `None` means the client never obtained a fix (permission denied
/// or timeout on its side).
pub struct ReportedPosition {
    pub position: Option<Coordinate>,
}

#[async_trait]
impl LocationProvider for ReportedPosition {
    async fn current_position(&self) -> Result<Coordinate, String> {
        self.position
            .ok_or_else(|| "thiết bị không gửi được tọa độ GPS".to_string())
    }
}

/// Capture device backed by the frame the client submitted with the
/// request. Rejects payloads that are not decodable image data URLs.
pub struct SubmittedFrame {
    pub photo: Option<String>,
}

#[async_trait]
impl CaptureDevice for SubmittedFrame {
    async fn acquire(&self) -> Result<VideoStream, String> {
        let photo = self
            .photo
            .as_deref()
            .ok_or_else(|| "thiết bị không gửi được ảnh chụp".to_string())?;
        validate_photo_data_url(photo)?;
        Ok(VideoStream::new(photo.to_string()))
    }
}

pub fn validate_photo_data_url(photo: &str) -> Result<(), String> {
    let payload = photo
        .strip_prefix("data:image/")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or_else(|| "ảnh chụp không đúng định dạng data URL".to_string())?;
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| "ảnh chụp không giải mã được".to_string())?;
    Ok(())
}

/// Stand-in for the biometric verification service: a fixed delay, then
/// acceptance.
pub struct SimulatedVerifier {
    delay: Duration,
}

impl SimulatedVerifier {
    pub fn new(delay: Duration) -> Self {
        SimulatedVerifier { delay }
    }
}

#[async_trait]
impl Verifier for SimulatedVerifier {
    async fn verify(&self, _frame: &str) -> VerificationResult {
        tokio::time::sleep(self.delay).await;
        VerificationResult::Accepted
    }
}
