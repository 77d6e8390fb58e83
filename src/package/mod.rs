//! Container adapter: staging-area extraction and transactional
//! repackaging of ODF packages (ZIP archives).

pub mod staging;
pub mod writer;

pub use staging::Staging;
pub use writer::repackage;
