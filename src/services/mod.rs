//! Service layer module root.
//! Classification, previews, data container packing and parameter resolution.

pub mod classifier;
pub mod container;
pub mod parameters;
pub mod stylesheet;
pub mod transformation;
pub mod xml;

pub use classifier::{classify, DocumentClass};
pub use container::{pack, PackMode};
pub use parameters::{resolve, RawSigningParameters, ResolverDefaults};
pub use stylesheet::{default_processor, StylesheetProcessor, UnavailableProcessor};
pub use transformation::{extract_payload, TransformationEngine};
