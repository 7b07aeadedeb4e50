pub mod favorites;
pub mod filter;
pub mod record;

pub use favorites::FavoriteSet;
pub use filter::{FilterSpec, Selection, category_options, filter};
pub use record::{AlcoholicStatus, CanonicalRecord, SourceKind};
