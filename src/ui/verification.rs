//! Verification screen.

use super::{Busy, Screen, ScreenState};
use crate::api::{CancellationToken, VerificationClient};
use crate::models::{ImageFile, VerificationOutcome};

/// One of the two image inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    /// Left image.
    First,
    /// Right image.
    Second,
}

/// Two image slots plus the outcome of the last submission.
///
/// Changing either image dismisses the previous result or error.
#[derive(Debug, Default)]
pub struct VerificationScreen {
    image1: Option<ImageFile>,
    image2: Option<ImageFile>,
    screen: Screen<VerificationOutcome>,
}

impl VerificationScreen {
    /// Creates an empty screen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `image` into `slot`, replacing whatever was there.
    pub fn select_image(&mut self, slot: ImageSlot, image: ImageFile) {
        *self.slot_mut(slot) = Some(image);
        self.screen.dismiss();
    }

    /// Empties `slot`.
    pub fn remove_image(&mut self, slot: ImageSlot) {
        *self.slot_mut(slot) = None;
        self.screen.dismiss();
    }

    /// The image in `slot`, if any.
    #[must_use]
    pub const fn image(&self, slot: ImageSlot) -> Option<&ImageFile> {
        match slot {
            ImageSlot::First => self.image1.as_ref(),
            ImageSlot::Second => self.image2.as_ref(),
        }
    }

    /// True when both images are selected and nothing is in flight.
    #[must_use]
    pub const fn can_submit(&self) -> bool {
        self.image1.is_some() && self.image2.is_some() && !self.screen.is_loading()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &ScreenState<VerificationOutcome> {
        self.screen.state()
    }

    /// Submits the selected pair.
    ///
    /// Validation errors land in `Failed` like any other error.
    ///
    /// # Errors
    ///
    /// Returns [`Busy`] if a submission is already in flight.
    pub async fn submit(
        &mut self,
        client: &VerificationClient,
    ) -> Result<&ScreenState<VerificationOutcome>, Busy> {
        self.screen.begin()?;
        let result = client
            .verify(self.image1.as_ref(), self.image2.as_ref())
            .await;
        Ok(self.screen.complete(result))
    }

    /// Like [`submit`](Self::submit), abandoning the request if `cancel`
    /// fires.
    ///
    /// # Errors
    ///
    /// Returns [`Busy`] if a submission is already in flight.
    pub async fn submit_cancellable(
        &mut self,
        client: &VerificationClient,
        cancel: &CancellationToken,
    ) -> Result<&ScreenState<VerificationOutcome>, Busy> {
        self.screen.begin()?;
        let result = client
            .verify_cancellable(self.image1.as_ref(), self.image2.as_ref(), cancel)
            .await;
        Ok(self.screen.complete(result))
    }

    /// Clears both images and any result or error.
    pub fn reset(&mut self) {
        self.image1 = None;
        self.image2 = None;
        self.screen.dismiss();
    }

    fn slot_mut(&mut self, slot: ImageSlot) -> &mut Option<ImageFile> {
        match slot {
            ImageSlot::First => &mut self.image1,
            ImageSlot::Second => &mut self.image2,
        }
    }
}
