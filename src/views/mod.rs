//! Headless view models. Each owns its transient state and exposes the same
//! flags a rendered form would bind to.

pub mod clone;
pub mod generator;
pub mod settings;

pub use clone::{CloneView, ClonePhase};
pub use generator::{GeneratorPhase, GeneratorView};
pub use settings::{SettingsView, Vocoder, VOCODERS};

/// What a select control should show.
#[derive(Debug, Clone, PartialEq)]
pub enum Choices<'a, T> {
    Available(&'a [T]),
    /// Nothing resolved; show this instead of an empty control.
    Unavailable(&'static str),
}

impl<'a, T> Choices<'a, T> {
    pub fn from_slice(items: &'a [T], empty_message: &'static str) -> Self {
        if items.is_empty() {
            Choices::Unavailable(empty_message)
        } else {
            Choices::Available(items)
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Choices::Available(_))
    }
}
