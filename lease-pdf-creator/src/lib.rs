//! Lease Contract PDF Creator
//!
//! Turns structured lease data and a table of templated legal clauses into a
//! paginated A4 contract, with placeholder substitution, WinAnsi-safe
//! typography, embedded logo/signature images and a text layer recording
//! where every line was placed.

pub mod clauses;
pub mod config;
pub mod contract_generator;
pub mod error;
pub mod fonts;
pub mod images;
pub mod model;
pub mod placeholders;
pub mod text_layer;
pub mod typography;
pub mod validation;

// Re-export commonly used functions and types
pub use clauses::{ClauseOverrides, ClauseSet, ClauseTemplate};
pub use config::{GenerationOptions, LayoutConfig};
pub use contract_generator::{generate_lease_pdf, GeneratedContract, LeaseContractEngine};
pub use error::{AssetError, FieldError, GenerationError, ValidationErrors};
pub use fonts::FontContext;
pub use images::{DefaultImageSource, ImageSource, InMemoryImageSource};
pub use model::ContractData;
pub use placeholders::replace_placeholders;
pub use text_layer::{PageText, TextLayer};
pub use validation::validate_contract;
