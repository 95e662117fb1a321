//! Client surface for cloud-infrastructure HTTP APIs.
//!
//! Request parameters are plain structs annotated with `#[derive(Options)]`;
//! collections come back as lazy [`Pager`]s that fetch one page at a time.
//!
//! # Example
//!
//! ```ignore
//! use nimbus::prelude::*;
//! use nimbus::networking::vpcs;
//!
//! let http = HyperClient::builder().with_auth_token(token).with_logging().build();
//! let network = ApiClient::new(http, "https://vpc.example.com/v1/")?;
//!
//! let opts = vpcs::ListOpts { status: "ACTIVE".into(), ..Default::default() };
//! let all: Vec<vpcs::Vpc> = vpcs::list(&network, &opts)?.all_items().await?;
//!
//! let created = vpcs::create(&network, &vpcs::CreateOpts {
//!     name: "private".into(),
//!     cidr: "10.0.0.0/16".into(),
//!     ..Default::default()
//! }).await?;
//! ```
//!
//! # Declaring options
//!
//! ```ignore
//! #[derive(Default, nimbus::Options)]
//! #[opts(root = "subnet")]
//! pub struct CreateOpts {
//!     #[opts(required)]
//!     pub cidr: String,
//!     pub gateway_ip: Option<String>,
//!     #[opts(query, format = "csv")]
//!     pub fields: Vec<String>,
//! }
//! ```

extern crate self as nimbus;

mod api_client;
mod client;
pub mod clustering;
pub mod compute;
mod config;
mod connector;
pub mod middleware;
pub mod networking;
pub mod prelude;

pub use api_client::ApiClient;
pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_USER_AGENT};

pub use nimbus_core::{
    AsFieldValue, Body, BodyWriter, CollectionFormat, Described, Error, Extended, FieldDescriptor,
    FieldTarget, FieldValue, Fields, HttpClient, HttpClientExt, IdLookup, LookupSpec, Method,
    NameTable, Page, PageResult, Pager, QueryString, Request, RequestBuilder, RequestOptions,
    Response, Result, ServiceClient, StatusCode, Strategy, ToBody, ToQuery, build_body,
    build_body_with, build_query, encode_content, from_json, from_value, header, pagination,
    single_match, to_json,
};

pub use nimbus_macro::Options;

pub use tower;
pub use url;
