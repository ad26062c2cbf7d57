//! Turns fetched bodies into [`BlogSnapshot`](crate::domain::BlogSnapshot)s.
//!
//! Feeds go through [`FeedNormalizer`]; pages without a feed go through the
//! selector cascade in [`HtmlNormalizer`].

pub mod date;
pub mod feed;
pub mod html;
pub mod identifier;

pub use date::parse_published;
pub use feed::FeedNormalizer;
pub use html::{HtmlConfig, HtmlNormalizer, SelectorRule};
pub use identifier::domain_name;
