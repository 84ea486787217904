//! Process-wide launch overrides.
//!
//! Overrides are set once, typically from the command line, before any
//! environment is created. They are read when a run config is resolved and
//! captured by value, so later writes only affect configs resolved later.
//!
//! Setting overrides while other threads resolve configs is allowed but
//! gives no ordering guarantee; set them before spawning concurrent
//! environments.

use std::sync::{PoisonError, RwLock};

use serde::Serialize;

use super::WindowPair;
use crate::error::LaunchError;

/// Launch options layered on top of every resolved run config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LaunchOverrides {
    /// Appended after any caller-supplied extra args.
    pub extra_args: Vec<String>,
    /// Used when the caller gives no window location.
    pub window_location: Option<WindowPair>,
    /// Used when the caller gives no window size.
    pub window_size: Option<WindowPair>,
}

impl LaunchOverrides {
    const EMPTY: Self = Self {
        extra_args: Vec::new(),
        window_location: None,
        window_size: None,
    };

    /// Whether no override is set.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.extra_args.is_empty() && self.window_location.is_none() && self.window_size.is_none()
    }

    /// Builder-style setter for extra args.
    #[must_use]
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style setter for the window location.
    #[must_use]
    pub fn with_window_location(mut self, location: WindowPair) -> Self {
        self.window_location = Some(location);
        self
    }

    /// Builder-style setter for the window size.
    #[must_use]
    pub fn with_window_size(mut self, size: WindowPair) -> Self {
        self.window_size = Some(size);
        self
    }
}

static GLOBAL_OVERRIDES: RwLock<LaunchOverrides> = RwLock::new(LaunchOverrides::EMPTY);

/// Validate an optional two-component window setting.
pub(crate) fn window_pair(
    value: Option<&[i32]>,
    label: &'static str,
) -> Result<Option<WindowPair>, LaunchError> {
    match value {
        None => Ok(None),
        Some(&[a, b]) => Ok(Some((a, b))),
        Some(other) => Err(LaunchError::InvalidWindowTuple {
            label,
            len: other.len(),
        }),
    }
}

/// Replace the extra binary arguments (e.g. `-norender`).
pub fn set_extra_args<I, S>(args: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    let mut guard = GLOBAL_OVERRIDES
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    guard.extra_args = args;
}

/// Replace the window placement used by subsequently resolved configs.
///
/// Each provided slice must hold exactly two integers. On error neither
/// value is changed.
pub fn set_window_config(
    location: Option<&[i32]>,
    size: Option<&[i32]>,
) -> Result<(), LaunchError> {
    let location = window_pair(location, "window_loc")?;
    let size = window_pair(size, "window_size")?;
    let mut guard = GLOBAL_OVERRIDES
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    guard.window_location = location;
    guard.window_size = size;
    Ok(())
}

/// Snapshot of the current process-wide overrides.
pub fn global_overrides() -> LaunchOverrides {
    GLOBAL_OVERRIDES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Clear every process-wide override.
pub fn reset_global_overrides() {
    let mut guard = GLOBAL_OVERRIDES
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *guard = LaunchOverrides::EMPTY;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_default() {
        assert!(LaunchOverrides::default().is_default());
        assert!(!LaunchOverrides::default()
            .with_extra_args(["-norender"])
            .is_default());
        assert!(!LaunchOverrides::default()
            .with_window_size((800, 600))
            .is_default());
    }

    #[test]
    fn test_window_pair_accepts_two() {
        assert_eq!(window_pair(None, "window_loc").unwrap(), None);
        assert_eq!(
            window_pair(Some(&[10, 20][..]), "window_loc").unwrap(),
            Some((10, 20))
        );
    }

    #[test]
    fn test_window_pair_rejects_other_lengths() {
        for bad in [&[][..], &[1][..], &[1, 2, 3][..]] {
            let err = window_pair(Some(bad), "window_size").unwrap_err();
            assert!(matches!(
                err,
                LaunchError::InvalidWindowTuple { label: "window_size", len } if len == bad.len()
            ));
            assert!(err.to_string().contains("exactly two integers"));
        }
    }
}
