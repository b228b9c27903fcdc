//! Remote service clients for Parley.
//!
//! The conversation controller talks to two external collaborators over
//! HTTP: a query service that answers a text message with markdown, and a
//! transcription service that turns a recorded clip into text. Both sit
//! behind trait seams so tests can substitute scripted mocks.

pub mod error;
pub mod mock;
pub mod query;
pub mod transcribe;

pub use error::ClientError;
pub use mock::{MockQueryClient, MockTranscriptionClient};
pub use query::{HttpQueryClient, QueryClient};
pub use transcribe::{HttpTranscriptionClient, TranscriptionClient};
