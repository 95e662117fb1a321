//! Glob import for applications.
//!
//! ```ignore
//! use nimbus::prelude::*;
//! ```

pub use crate::{
    ApiClient, Body, ClientConfig, Error, Extended, HttpClient, HttpClientExt, HyperClient,
    IdLookup, NameTable, Options, Page, Pager, RequestOptions, Response, Result, ServiceClient,
    Strategy, ToBody, ToQuery,
};
pub use serde::{Deserialize, Serialize};
pub use std::ops::ControlFlow;
