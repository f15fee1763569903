//! One-shot, best-effort acquisition of the caller's position.

use std::fmt::{self, Display};

use geochat_model::Coordinates;
use tokio::sync::watch;

/// Why the position could not be acquired.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LocationError {
    /// The user or platform refused access.
    PermissionDenied,
    /// The environment has no way to locate the caller.
    Unsupported,
    /// Locating was attempted but failed.
    PositionUnavailable(Option<String>),
}

impl LocationError {
    /// Returns a short advisory suitable for showing to the user.
    pub fn advisory(&self) -> &'static str {
        match self {
            LocationError::Unsupported => {
                "Geolocation is not supported in this environment."
            }
            LocationError::PermissionDenied
            | LocationError::PositionUnavailable(_) => {
                "Could not access location. 'Nearby' searches may be less \
                 accurate."
            }
        }
    }
}

impl Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::PermissionDenied => write!(f, "permission denied"),
            LocationError::Unsupported => write!(f, "geolocation unsupported"),
            LocationError::PositionUnavailable(None) => {
                write!(f, "position unavailable")
            }
            LocationError::PositionUnavailable(Some(reason)) => {
                write!(f, "position unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for LocationError {}

/// The state of the location acquisition.
#[derive(Clone, Debug, PartialEq)]
pub enum LocationStatus {
    /// The acquisition has not finished yet.
    Acquiring,
    /// The position is known.
    Active(Coordinates),
    /// The acquisition failed, this is final for the session.
    Unavailable(LocationError),
}

impl LocationStatus {
    /// Returns the position if it is known.
    #[inline]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            LocationStatus::Active(coords) => Some(*coords),
            _ => None,
        }
    }

    /// Returns a short status label.
    pub fn indicator(&self) -> &'static str {
        match self {
            LocationStatus::Acquiring => "Locating...",
            LocationStatus::Active(_) => "GPS Active",
            LocationStatus::Unavailable(_) => "No GPS",
        }
    }
}

/// A one-shot source of the caller's position.
pub trait LocationSource: Send + 'static {
    /// Locates the caller. Called at most once.
    fn locate(
        self,
    ) -> impl Future<Output = Result<Coordinates, LocationError>> + Send + 'static;
}

/// A source whose position is known up front, e.g. from configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedLocation(pub Coordinates);

impl LocationSource for FixedLocation {
    fn locate(
        self,
    ) -> impl Future<Output = Result<Coordinates, LocationError>> + Send + 'static
    {
        std::future::ready(Ok(self.0))
    }
}

/// A source for environments that cannot locate the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoLocation;

impl LocationSource for NoLocation {
    fn locate(
        self,
    ) -> impl Future<Output = Result<Coordinates, LocationError>> + Send + 'static
    {
        std::future::ready(Err(LocationError::Unsupported))
    }
}

/// Exposes the outcome of a single location acquisition.
///
/// The acquisition runs on its own task and is never retried, refreshed
/// or cancelled. Readers only see the value current at the time they
/// look, so a position arriving late does not affect requests that were
/// already built.
#[derive(Clone, Debug)]
pub struct LocationProvider {
    status_rx: watch::Receiver<LocationStatus>,
}

impl LocationProvider {
    /// Starts acquiring the position from `source`.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn<S: LocationSource>(source: S) -> Self {
        let (status_tx, status_rx) = watch::channel(LocationStatus::Acquiring);
        let locate_fut = source.locate();
        tokio::spawn(async move {
            let status = match locate_fut.await {
                Ok(coords) => {
                    debug!(
                        "location acquired: {}, {}",
                        coords.latitude, coords.longitude
                    );
                    LocationStatus::Active(coords)
                }
                Err(err) => {
                    warn!("location unavailable: {err}");
                    LocationStatus::Unavailable(err)
                }
            };
            status_tx.send_replace(status);
        });
        Self { status_rx }
    }

    /// Creates a provider that already has a final status, without
    /// spawning anything.
    pub fn settled(status: LocationStatus) -> Self {
        let (_, status_rx) = watch::channel(status);
        Self { status_rx }
    }

    /// Returns the current status.
    #[inline]
    pub fn status(&self) -> LocationStatus {
        self.status_rx.borrow().clone()
    }

    /// Returns the position if it is known right now.
    #[inline]
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.status_rx.borrow().coordinates()
    }

    /// Waits until the acquisition has finished and returns the final
    /// status.
    pub async fn wait_settled(&self) -> LocationStatus {
        let mut status_rx = self.status_rx.clone();
        let result = status_rx
            .wait_for(|s| !matches!(s, LocationStatus::Acquiring))
            .await
            .map(|s| s.clone());
        match result {
            Ok(status) => status,
            Err(_) => {
                // The acquisition task went away without reporting.
                LocationStatus::Unavailable(LocationError::PositionUnavailable(
                    Some("acquisition aborted".to_owned()),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;

    struct DeniedLocation;

    impl LocationSource for DeniedLocation {
        fn locate(
            self,
        ) -> impl Future<Output = Result<Coordinates, LocationError>> + Send + 'static
        {
            std::future::ready(Err(LocationError::PermissionDenied))
        }
    }

    struct SlowLocation(Coordinates);

    impl LocationSource for SlowLocation {
        fn locate(
            self,
        ) -> impl Future<Output = Result<Coordinates, LocationError>> + Send + 'static
        {
            async move {
                sleep(Duration::from_millis(50)).await;
                Ok(self.0)
            }
        }
    }

    #[tokio::test]
    async fn test_fixed_location() {
        let coords = Coordinates::new(37.77, -122.41);
        let provider = LocationProvider::spawn(FixedLocation(coords));
        let status = provider.wait_settled().await;
        assert_eq!(status, LocationStatus::Active(coords));
        assert_eq!(provider.coordinates(), Some(coords));
        assert_eq!(provider.status().indicator(), "GPS Active");
    }

    #[tokio::test]
    async fn test_zero_is_a_valid_position() {
        let coords = Coordinates::new(0.0, 0.0);
        let provider = LocationProvider::spawn(FixedLocation(coords));
        provider.wait_settled().await;
        assert_eq!(provider.coordinates(), Some(coords));
    }

    #[tokio::test]
    async fn test_permission_denied_is_sticky() {
        let provider = LocationProvider::spawn(DeniedLocation);
        let status = provider.wait_settled().await;
        assert_eq!(
            status,
            LocationStatus::Unavailable(LocationError::PermissionDenied)
        );
        sleep(Duration::from_millis(10)).await;
        assert_eq!(provider.coordinates(), None);
        assert_eq!(provider.status().indicator(), "No GPS");
    }

    #[tokio::test]
    async fn test_unsupported() {
        let provider = LocationProvider::spawn(NoLocation);
        let LocationStatus::Unavailable(err) = provider.wait_settled().await
        else {
            panic!("expected the acquisition to fail");
        };
        assert_eq!(err, LocationError::Unsupported);
        assert!(err.advisory().contains("not supported"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquiring_until_resolved() {
        let coords = Coordinates::new(51.5, -0.12);
        let provider = LocationProvider::spawn(SlowLocation(coords));
        assert_eq!(provider.status(), LocationStatus::Acquiring);
        assert_eq!(provider.coordinates(), None);
        assert_eq!(provider.status().indicator(), "Locating...");

        assert_eq!(
            provider.wait_settled().await,
            LocationStatus::Active(coords)
        );
    }

    #[test]
    fn test_settled() {
        let provider = LocationProvider::settled(LocationStatus::Unavailable(
            LocationError::PositionUnavailable(Some("timeout".to_owned())),
        ));
        assert_eq!(provider.coordinates(), None);
        assert!(matches!(provider.status(), LocationStatus::Unavailable(_)));
    }
}
