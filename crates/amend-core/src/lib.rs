pub mod akn;
pub mod annotate;
pub mod document;
pub mod error;
pub mod ident;
pub mod locate;
pub mod merge;
pub mod mutate;
pub mod number;
pub mod settings;
pub mod toc;
pub mod xml;

pub use annotate::Author;
pub use document::{AknDocument, EditOutcome, Position};
pub use error::{AmendError, Result};
pub use settings::EditSettings;
pub use toc::{TocItem, TocMode};
