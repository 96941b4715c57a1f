//! History screen.

use super::{Busy, Screen, ScreenState};
use crate::api::{CancellationToken, HistoryAggregator};
use crate::models::HistoryListing;

/// What a loaded history screen renders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HistoryView<'a> {
    /// No verifications yet.
    Empty,
    /// Records plus summary counts.
    Loaded(&'a HistoryListing),
}

/// History listing with retry.
#[derive(Debug, Default)]
pub struct HistoryScreen {
    screen: Screen<HistoryListing>,
}

impl HistoryScreen {
    /// Creates a screen that has not loaded yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &ScreenState<HistoryListing> {
        self.screen.state()
    }

    /// The rendered view once loaded.
    #[must_use]
    pub fn view(&self) -> Option<HistoryView<'_>> {
        self.screen.value().map(|listing| {
            if listing.is_empty() {
                HistoryView::Empty
            } else {
                HistoryView::Loaded(listing)
            }
        })
    }

    /// Loads (or reloads) history. Also serves as retry after a failure.
    ///
    /// # Errors
    ///
    /// Returns [`Busy`] if a load is already in flight.
    pub async fn load(
        &mut self,
        aggregator: &HistoryAggregator,
    ) -> Result<&ScreenState<HistoryListing>, Busy> {
        self.screen.begin()?;
        let result = aggregator.list_history().await;
        Ok(self.screen.complete(result))
    }

    /// Like [`load`](Self::load), abandoning the request if `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`Busy`] if a load is already in flight.
    pub async fn load_cancellable(
        &mut self,
        aggregator: &HistoryAggregator,
        cancel: &CancellationToken,
    ) -> Result<&ScreenState<HistoryListing>, Busy> {
        self.screen.begin()?;
        let result = aggregator.list_history_cancellable(cancel).await;
        Ok(self.screen.complete(result))
    }
}
