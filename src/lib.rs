//! Client for an XTTS speech backend: speech generation, voice cloning and
//! the speaker/model catalog, driven through headless view models.

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod store;
pub mod views;

pub use api::{HttpApi, TtsApi};
pub use audio::{AudioProbe, HttpAudioProbe};
pub use config::ClientConfig;
pub use error::{ClientError, ValidationError};
pub use store::CatalogStore;
