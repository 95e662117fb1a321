//! Lazy pagination over collection endpoints.
//!
//! A [`Pager`] knows where a collection starts and which [`Strategy`] finds
//! the following pages:
//!
//! - [`Strategy::Single`]: one page, whatever it contains;
//! - [`Strategy::Linked`]: follow the `next` entry of a `[{rel, href}]` links array;
//! - [`Strategy::Marker`]: ask for the items after the last identifier seen.
//!
//! Traversal is sequential and stops at the first empty page, at the last
//! page, or when the handler returns [`std::ops::ControlFlow::Break`].

mod page;
mod pager;

pub use page::{LinkedPage, MarkerPage, Page, PageResult, SinglePage, Strategy};
pub use pager::Pager;
