//! Sonic upload processing
//!
//! Bounds and validates the files of one upload request, reconciles them with the
//! client-declared `fileOrder`, and reads them into memory for the audio engine.
//! Nothing here knows about HTTP: callers feed multipart parts in as byte chunks.

pub mod upload;
pub mod validator;

pub use upload::order::{order_files, OrderedFileSet, OrderingError};
pub use upload::payload::{read_cover, read_payloads, PayloadError};
pub use upload::spool::{PartSpooler, SpooledPart, UploadedFile};
pub use upload::UploadError;
pub use validator::{check_request_size, UploadLimits, ValidatedFileSet, ValidationError};
