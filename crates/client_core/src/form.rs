//! The "create banner" form and its submission lifecycle.
//!
//! A submission validates the draft locally, marks the form busy, makes one
//! generation call and then either resets the form (success) or records the
//! failure inline (error). While busy the form refuses a second submission
//! and any change to its staged images.

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use image_generation::{BannerImageGenerator, GenerationRequest};
use shared::domain::NewBanner;
use thiserror::Error;
use tracing::{error, info};

use crate::capture::ImageCapture;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("A banner is already being generated. Please wait for it to finish.")]
    InFlight,
    #[error("Please fill in all fields and upload at least one image.")]
    Incomplete,
    #[error("Title is required.")]
    MissingTitle,
    #[error("Price must be a valid number.")]
    InvalidPrice,
    #[error("{0}")]
    Generation(String),
}

/// Strict price parsing: the whole (trimmed) input must be a finite,
/// non-negative number.
pub fn parse_price(raw: &str) -> Result<f64, FormError> {
    let price: f64 = raw.trim().parse().map_err(|_| FormError::InvalidPrice)?;
    if !price.is_finite() || price < 0.0 {
        return Err(FormError::InvalidPrice);
    }
    // "-0" parses to negative zero
    Ok(if price == 0.0 { 0.0 } else { price })
}

/// Validates the edit dialog's fields.
pub fn validate_edit(title: &str, price: &str) -> Result<(String, f64), FormError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(FormError::MissingTitle);
    }
    Ok((title.to_string(), parse_price(price)?))
}

#[derive(Debug, Default)]
pub struct BannerForm {
    pub title: String,
    pub price: String,
    pub images: ImageCapture,
    error: Option<String>,
    in_flight: Arc<AtomicBool>,
}

impl BannerForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Fails while a generation is running; callers use it to keep the
    /// staged images untouched until the call completes.
    pub fn ensure_editable(&self) -> Result<(), FormError> {
        if self.is_in_flight() {
            return Err(FormError::InFlight);
        }
        Ok(())
    }

    pub fn set_draft(&mut self, title: impl Into<String>, price: impl Into<String>) {
        self.title = title.into();
        self.price = price.into();
    }

    pub fn begin_submission(&mut self) -> Result<Submission, FormError> {
        self.ensure_editable()?;

        if self.title.trim().is_empty() || self.price.trim().is_empty() || self.images.is_empty()
        {
            return Err(self.record(FormError::Incomplete));
        }
        let price = match parse_price(&self.price) {
            Ok(price) => price,
            Err(err) => return Err(self.record(err)),
        };

        self.error = None;
        self.in_flight.store(true, Ordering::SeqCst);
        Ok(Submission {
            request: GenerationRequest {
                title: self.title.trim().to_string(),
                price,
                images: self.images.source_images(),
            },
            _guard: InFlightGuard(self.in_flight.clone()),
        })
    }

    /// Applies the outcome of a submission: a success clears the draft and
    /// releases the staged images, a failure keeps the draft and shows the
    /// error's message.
    pub fn finish<T, E: fmt::Display>(&mut self, outcome: &Result<T, E>) {
        match outcome {
            Ok(_) => self.complete(),
            Err(err) => self.fail(err.to_string()),
        }
    }

    pub fn complete(&mut self) {
        self.reset();
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn reset(&mut self) {
        self.title.clear();
        self.price.clear();
        self.images.clear();
        self.error = None;
    }

    fn record(&mut self, err: FormError) -> FormError {
        self.error = Some(err.to_string());
        err
    }
}

/// A validated draft on its way to the generator. The form stays busy until
/// the submission is dropped.
#[derive(Debug)]
pub struct Submission {
    request: GenerationRequest,
    _guard: InFlightGuard,
}

impl Submission {
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    pub async fn run(self, generator: &dyn BannerImageGenerator) -> Result<NewBanner, FormError> {
        let Submission { request, _guard } = self;
        let title = request.title.clone();
        let price = request.price;

        match generator.generate(request).await {
            Ok(image_data) => {
                info!(%title, price, "banner image generated");
                Ok(NewBanner {
                    title,
                    price,
                    image_data,
                })
            }
            Err(err) => {
                error!(%title, error = %err, "banner image generation failed");
                Err(FormError::Generation(err.user_message()))
            }
        }
    }
}

#[derive(Debug)]
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
