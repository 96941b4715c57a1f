//! Image-pair submission.

use super::{
    ApiClient, CancellationToken, NOT_AUTHENTICATED, expire_session, failure_detail,
    is_unauthorized, require_token, transport_error,
};
use crate::config::ClientConfig;
use crate::models::{ImageFile, ResultInterpreter, VerificationOutcome};
use crate::session::SessionStore;
use crate::{Error, Result};
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;

/// Returned when either image slot is empty.
pub const MISSING_IMAGES: &str = "Please upload both images";

/// Returned when a file's content type is not an image type.
pub const NOT_AN_IMAGE: &str = "Please select an image file";

/// Returned when a file exceeds the default size limit.
pub const FILE_TOO_LARGE: &str = "File size must be less than 10MB";

/// Fallback when `/verify/` fails without a backend message.
pub const VERIFICATION_FAILED: &str = "Verification failed";

/// Fallback when `/predict` fails without a backend message.
pub const PREDICTION_FAILED: &str = "Prediction failed";

/// Client for `/verify/` and `/predict`.
#[derive(Debug, Clone)]
pub struct VerificationClient {
    api: ApiClient,
    session: SessionStore,
    max_image_bytes: u64,
    interpreter: ResultInterpreter,
}

impl VerificationClient {
    /// Creates a verification client using the configured size limit.
    #[must_use]
    pub const fn new(api: ApiClient, session: SessionStore, config: &ClientConfig) -> Self {
        Self {
            api,
            session,
            max_image_bytes: config.max_image_bytes,
            interpreter: ResultInterpreter::new(),
        }
    }

    /// Overrides the per-image size limit.
    #[must_use]
    pub const fn with_max_image_bytes(mut self, max: u64) -> Self {
        self.max_image_bytes = max;
        self
    }

    /// Returns the per-image size limit in bytes.
    #[must_use]
    pub const fn max_image_bytes(&self) -> u64 {
        self.max_image_bytes
    }

    /// Checks a pair of images without touching the network.
    ///
    /// Checks run in order: both present, both image types, both within the
    /// size limit. The first failing check wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the failed check.
    pub fn validate<'a>(
        &self,
        image1: Option<&'a ImageFile>,
        image2: Option<&'a ImageFile>,
    ) -> Result<(&'a ImageFile, &'a ImageFile)> {
        let (Some(image1), Some(image2)) = (image1, image2) else {
            return Err(Error::Validation(MISSING_IMAGES.to_string()));
        };

        if !image1.is_image() || !image2.is_image() {
            return Err(Error::Validation(NOT_AN_IMAGE.to_string()));
        }

        if image1.size() > self.max_image_bytes || image2.size() > self.max_image_bytes {
            return Err(Error::Validation(file_too_large(self.max_image_bytes)));
        }

        Ok((image1, image2))
    }

    /// Validates and submits a pair of images for comparison.
    ///
    /// Validation failures and a missing session never reach the network.
    /// Failures are not retried.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for a bad or missing image
    /// - [`Error::Auth`] without a session, or on 401 (the session is cleared)
    /// - [`Error::Verification`] when the backend rejects the pair
    /// - [`Error::Transport`] on network failure or a malformed response
    pub async fn verify(
        &self,
        image1: Option<&ImageFile>,
        image2: Option<&ImageFile>,
    ) -> Result<VerificationOutcome> {
        self.verify_inner(image1, image2, None).await
    }

    /// Like [`verify`](Self::verify), abandoning the request if `cancel` fires.
    ///
    /// A cancelled request leaves the session untouched.
    ///
    /// # Errors
    ///
    /// As [`verify`](Self::verify), plus [`Error::Cancelled`].
    pub async fn verify_cancellable(
        &self,
        image1: Option<&ImageFile>,
        image2: Option<&ImageFile>,
        cancel: &CancellationToken,
    ) -> Result<VerificationOutcome> {
        self.verify_inner(image1, image2, Some(cancel)).await
    }

    async fn verify_inner(
        &self,
        image1: Option<&ImageFile>,
        image2: Option<&ImageFile>,
        cancel: Option<&CancellationToken>,
    ) -> Result<VerificationOutcome> {
        const OPERATION: &str = "verify";
        let (image1, image2) = self.validate(image1, image2)?;
        let token = require_token(&self.session, NOT_AUTHENTICATED)?;

        tracing::info!(
            image1 = %image1.file_name,
            image2 = %image2.file_name,
            "Submitting verification"
        );

        let request = self
            .api
            .post("/verify/")
            .bearer_auth(token.expose_secret())
            .multipart(pair_form(image1, image2)?);
        let response = self.api.dispatch(OPERATION, request, cancel).await?;
        let status = response.status();

        if is_unauthorized(status) {
            return Err(expire_session(&self.session, OPERATION));
        }
        if !status.is_success() {
            let detail = failure_detail(OPERATION, response).await;
            return Err(Error::Verification(
                detail.unwrap_or_else(|| VERIFICATION_FAILED.to_string()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(OPERATION, &e))?;
        let outcome = self.interpreter.interpret_bytes(&body)?;
        tracing::info!(
            is_match = outcome.is_match,
            confidence = outcome.confidence,
            "Verification complete"
        );
        Ok(outcome)
    }

    /// Submits a pair to the unauthenticated prediction endpoint.
    ///
    /// The stored token is attached when present. A 401 here does not clear
    /// the session.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for a bad or missing image
    /// - [`Error::Verification`] when the backend rejects the pair
    /// - [`Error::Transport`] on network failure or a malformed response
    pub async fn predict(
        &self,
        image1: Option<&ImageFile>,
        image2: Option<&ImageFile>,
    ) -> Result<VerificationOutcome> {
        const OPERATION: &str = "predict";
        let (image1, image2) = self.validate(image1, image2)?;

        let mut request = self
            .api
            .post("/predict")
            .multipart(pair_form(image1, image2)?);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = self.api.dispatch(OPERATION, request, None).await?;
        if !response.status().is_success() {
            let detail = failure_detail(OPERATION, response).await;
            return Err(Error::Verification(
                detail.unwrap_or_else(|| PREDICTION_FAILED.to_string()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(OPERATION, &e))?;
        self.interpreter.interpret_bytes(&body)
    }
}

/// Builds the `image1`/`image2` multipart body.
fn pair_form(image1: &ImageFile, image2: &ImageFile) -> Result<Form> {
    Ok(Form::new()
        .part("image1", image_part(image1)?)
        .part("image2", image_part(image2)?))
}

fn image_part(image: &ImageFile) -> Result<Part> {
    Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)
        .map_err(|e| Error::Validation(format!("invalid content type '{}': {e}", image.content_type)))
}

/// Size-limit message for `max` bytes, in the largest whole unit.
fn file_too_large(max: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;

    let limit = match max {
        0 => "0 bytes".to_string(),
        m if m % MIB == 0 => format!("{}MB", m / MIB),
        m if m % KIB == 0 => format!("{}KB", m / KIB),
        m => format!("{m} bytes"),
    };
    format!("File size must be less than {limit}")
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_MAX_IMAGE_BYTES, HttpConfig};
    use test_case::test_case;

    fn client() -> VerificationClient {
        let api = ApiClient::with_base_url("http://127.0.0.1:9", HttpConfig::default())
            .expect("client");
        VerificationClient::new(api, SessionStore::in_memory(), &ClientConfig::default())
    }

    fn png(size: usize) -> ImageFile {
        ImageFile::new("face.png", "image/png", vec![0_u8; size])
    }

    fn validation_message(result: Result<(&ImageFile, &ImageFile)>) -> String {
        match result {
            Err(Error::Validation(message)) => message,
            other => format!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_default_limit_is_ten_mib() {
        assert_eq!(client().max_image_bytes(), DEFAULT_MAX_IMAGE_BYTES);
    }

    #[test]
    fn test_missing_image() {
        let client = client();
        let image = png(10);
        assert_eq!(validation_message(client.validate(Some(&image), None)), MISSING_IMAGES);
        assert_eq!(validation_message(client.validate(None, Some(&image))), MISSING_IMAGES);
        assert_eq!(validation_message(client.validate(None, None)), MISSING_IMAGES);
    }

    #[test_case("application/pdf" ; "pdf")]
    #[test_case("text/plain" ; "text")]
    #[test_case("application/octet-stream" ; "unknown")]
    #[test_case("" ; "empty")]
    fn test_non_image_rejected(content_type: &str) {
        let client = client();
        let good = png(10);
        let bad = ImageFile::new("doc", content_type, vec![1, 2, 3]);
        assert_eq!(validation_message(client.validate(Some(&good), Some(&bad))), NOT_AN_IMAGE);
    }

    #[test]
    fn test_type_checked_before_size() {
        let client = client().with_max_image_bytes(4);
        let big = png(100);
        let pdf = ImageFile::new("doc.pdf", "application/pdf", vec![0; 2]);
        assert_eq!(validation_message(client.validate(Some(&big), Some(&pdf))), NOT_AN_IMAGE);
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let client = client().with_max_image_bytes(1024);
        let at_limit = png(1024);
        let over = png(1025);
        assert!(client.validate(Some(&at_limit), Some(&at_limit)).is_ok());
        assert_eq!(
            validation_message(client.validate(Some(&at_limit), Some(&over))),
            "File size must be less than 1KB"
        );
    }

    #[test_case(crate::config::DEFAULT_MAX_IMAGE_BYTES, FILE_TOO_LARGE ; "default limit")]
    #[test_case(2 * 1024 * 1024, "File size must be less than 2MB" ; "whole megabytes")]
    #[test_case(512 * 1024, "File size must be less than 512KB" ; "whole kilobytes")]
    #[test_case(1000, "File size must be less than 1000 bytes" ; "odd byte count")]
    fn test_size_message_follows_limit(max: u64, expected: &str) {
        assert_eq!(file_too_large(max), expected);
    }

    #[tokio::test]
    async fn test_verify_without_session_fails_after_validation() {
        let client = client();
        let image = png(10);
        let result = client.verify(Some(&image), Some(&image)).await;
        assert!(matches!(result, Err(Error::Auth(ref m)) if m == NOT_AUTHENTICATED));

        let result = client.verify(Some(&image), None).await;
        assert!(matches!(result, Err(Error::Validation(ref m)) if m == MISSING_IMAGES));
    }
}
