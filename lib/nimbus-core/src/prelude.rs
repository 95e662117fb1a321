//! Prelude module for convenient imports.
//!
//! ```ignore
//! use nimbus_core::prelude::*;
//! ```

pub use crate::{
    Body, Error, Extended, HttpClient, HttpClientExt, IdLookup, NameTable, Page, Pager,
    RequestOptions, Response, Result, ServiceClient, Strategy, ToBody, ToQuery,
};
