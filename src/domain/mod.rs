//! Domain value types: documents, mime types, crypto values and signing parameters.

pub mod constants;
pub mod crypto;
pub mod document;
pub mod failure;
pub mod mime;
pub mod parameters;
