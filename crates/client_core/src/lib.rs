//! Client-side state for one visitor of the banner app: which view they are
//! looking at, whether they are signed in as admin, and the banner form they
//! are filling in.

pub mod capture;
pub mod form;
pub mod session;

pub use capture::{CaptureSource, ImageCapture, ImageFile, PreviewHandle, UploadedImage};
pub use form::{parse_price, validate_edit, BannerForm, FormError, Submission};
pub use session::{
    CredentialVerifier, SessionController, StaticCredentials, ViewOutcome, LOGIN_FAILED_MESSAGE,
};

/// Everything the app tracks for a single visitor.
#[derive(Debug, Default)]
pub struct ClientSession {
    pub controller: SessionController,
    pub form: BannerForm,
}

impl ClientSession {
    /// Logging out also discards the half-filled banner form and releases
    /// its image previews.
    pub fn logout(&mut self) {
        self.controller.logout();
        if !self.form.is_in_flight() {
            self.form.reset();
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
