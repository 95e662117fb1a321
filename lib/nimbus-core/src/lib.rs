//! Core types and traits for the nimbus cloud API client.
//!
//! This crate holds everything that does not need a network stack:
//! - [`FieldDescriptor`], [`Described`] and [`AsFieldValue`] - the field tables behind option structs
//! - [`build_query`] / [`ToQuery`] - query strings from option structs
//! - [`build_body`] / [`ToBody`] - JSON request bodies from option structs
//! - [`Extended`] - extra attributes layered onto another resource's body
//! - [`IdLookup`] and [`NameTable`] - name to identifier resolution
//! - [`Pager`], [`Page`] and [`Strategy`] - lazy pagination
//! - [`HttpClient`], [`HttpClientExt`] and [`ServiceClient`] - the injected transport
//! - [`Request`], [`Response`], [`Method`], [`Error`] and [`Result`]

mod body;
mod client;
mod error;
mod extension;
mod json;
mod lookup;
mod method;
pub mod pagination;
pub mod prelude;
mod query;
mod request;
mod response;
mod tag;

pub use body::{Body, BodyWriter, ToBody, build_body, build_body_with, encode_content};
pub use client::{HttpClient, HttpClientExt, ServiceClient};
pub use error::{Error, Result};
pub use extension::Extended;
pub use json::{from_json, from_value, to_json};
pub use lookup::{IdLookup, NameTable, single_match};
pub use method::Method;
pub use pagination::{Page, PageResult, Pager, Strategy};
pub use query::{QueryString, ToQuery, build_query};
pub use request::{Request, RequestBuilder, RequestOptions};
pub use response::Response;
pub use tag::{
    AsFieldValue, CollectionFormat, Described, FieldDescriptor, FieldTarget, FieldValue, Fields,
    LookupSpec,
};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
