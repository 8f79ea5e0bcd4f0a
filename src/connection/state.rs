// ABOUTME: Loading-state wrapper and the two data slices published by the connection state reader
// ABOUTME: Loading and Stale keep the previous value so views keep rendering the last known state
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::models::{AccountIdentity, ConnectionRecord, ProviderIdentity};

/// Freshness of one data slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loadable<T> {
    /// A fetch is in flight
    Loading {
        /// Last known value, if any
        previous: Option<T>,
    },
    /// Last fetch succeeded
    Fresh(T),
    /// Last fetch failed
    Stale {
        /// Last known value, if any
        previous: Option<T>,
        /// Why the fetch failed
        error: String,
    },
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self::Loading { previous: None }
    }
}

impl<T> Loadable<T> {
    /// Best value to display: fresh, or the one kept from before
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Fresh(value) => Some(value),
            Self::Loading { previous } | Self::Stale { previous, .. } => previous.as_ref(),
        }
    }

    /// Whether a fetch is in flight
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Whether the last fetch succeeded
    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }

    /// Error of the last fetch, if it failed
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Stale { error, .. } => Some(error),
            Self::Loading { .. } | Self::Fresh(_) => None,
        }
    }

    /// Enter `Loading`, keeping the current value
    #[must_use]
    pub fn into_loading(self) -> Self {
        Self::Loading {
            previous: self.into_value(),
        }
    }

    /// Enter `Stale`, keeping the current value
    #[must_use]
    pub fn into_stale(self, error: impl Into<String>) -> Self {
        Self::Stale {
            previous: self.into_value(),
            error: error.into(),
        }
    }

    fn into_value(self) -> Option<T> {
        match self {
            Self::Fresh(value) => Some(value),
            Self::Loading { previous } | Self::Stale { previous, .. } => previous,
        }
    }
}

/// Signed-in account slice
///
/// `Fresh(None)` means the configured provider has no account to show.
pub type AccountSlice = Loadable<Option<AccountIdentity>>;

impl AccountSlice {
    /// Whether the view should prompt the operator to (re)authorize
    #[must_use]
    pub const fn needs_authorization(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    /// Display name to show, if known
    ///
    /// A failed read clears the name; the previous identity is only kept for
    /// the loading fallback.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        if self.needs_authorization() {
            return None;
        }
        self.value()
            .and_then(Option::as_ref)
            .map(|account| account.display_name.as_str())
    }
}

/// Connection record plus the values derived from it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionView {
    /// Record as read from the backend
    pub record: ConnectionRecord,
    /// Folder path for folder-sync providers, empty otherwise
    pub folder: String,
}

impl ConnectionView {
    /// View of a target with nothing connected
    #[must_use]
    pub const fn disconnected() -> Self {
        Self {
            record: ConnectionRecord::disconnected(),
            folder: String::new(),
        }
    }

    /// Provider of the record
    #[must_use]
    pub const fn provider(&self) -> ProviderIdentity {
        self.record.provider_identity
    }
}

/// Connection record slice
pub type ConnectionSlice = Loadable<ConnectionView>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_keeps_previous_value() {
        let slice = Loadable::Fresh(3).into_loading();
        assert_eq!(slice, Loadable::Loading { previous: Some(3) });
        assert_eq!(slice.value(), Some(&3));

        let stale = slice.into_stale("boom");
        assert_eq!(stale.value(), Some(&3));
        assert_eq!(stale.error(), Some("boom"));
        assert!(!stale.is_loading());
    }

    #[test]
    fn test_account_needs_authorization_only_when_stale() {
        let fresh: AccountSlice = Loadable::Fresh(Some(AccountIdentity {
            provider: ProviderIdentity::Dropbox,
            display_name: "Ada".to_owned(),
        }));
        assert!(!fresh.needs_authorization());
        assert_eq!(fresh.display_name(), Some("Ada"));

        let loading = fresh.clone().into_loading();
        assert_eq!(loading.display_name(), Some("Ada"));

        let stale = fresh.into_stale("401");
        assert!(stale.needs_authorization());
        assert_eq!(stale.display_name(), None);
        assert!(stale.value().is_some());

        assert!(!AccountSlice::default().needs_authorization());
    }
}
