//! Return preparation: normalization, GSTR-1, HSN and document summaries

pub mod documents;
pub mod gstr1;
pub mod hsn;
pub mod normalize;
pub mod service;
pub mod totals;

pub use documents::*;
pub use gstr1::*;
pub use hsn::*;
pub use normalize::*;
pub use service::*;
pub use totals::*;
