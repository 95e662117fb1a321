//! HTTP method types.

use derive_more::Display;

/// HTTP request method used by the service APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET method - retrieve a resource or a page of a collection.
    #[display("GET")]
    Get,
    /// POST method - create a resource or trigger an action.
    #[display("POST")]
    Post,
    /// PUT method - update a resource.
    #[display("PUT")]
    Put,
    /// PATCH method - partially update a resource.
    #[display("PATCH")]
    Patch,
    /// DELETE method - remove a resource.
    #[display("DELETE")]
    Delete,
    /// HEAD method - retrieve headers only.
    #[display("HEAD")]
    Head,
}

impl Method {
    /// Returns `true` if the method is safe (does not modify resources).
    #[must_use]
    pub const fn is_safe(&self) -> bool {
        matches!(self, Self::Get | Self::Head)
    }

    /// Returns `true` if the method is idempotent.
    #[must_use]
    pub const fn is_idempotent(&self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Put | Self::Delete)
    }

    /// Status codes accepted when the caller does not override them.
    #[must_use]
    pub const fn default_ok_codes(&self) -> &'static [u16] {
        match self {
            Self::Get => &[200],
            Self::Post | Self::Put => &[201, 202],
            Self::Patch => &[200, 202, 204],
            Self::Delete => &[202, 204],
            Self::Head => &[204],
        }
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Patch => Self::PATCH,
            Method::Delete => Self::DELETE,
            Method::Head => Self::HEAD,
        }
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = crate::Error;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        match *method {
            http::Method::GET => Ok(Self::Get),
            http::Method::POST => Ok(Self::Post),
            http::Method::PUT => Ok(Self::Put),
            http::Method::PATCH => Ok(Self::Patch),
            http::Method::DELETE => Ok(Self::Delete),
            http::Method::HEAD => Ok(Self::Head),
            ref other => Err(crate::Error::invalid_request(format!(
                "unsupported HTTP method: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_is_idempotent() {
        assert!(Method::Get.is_idempotent());
        assert!(Method::Head.is_idempotent());
        assert!(Method::Put.is_idempotent());
        assert!(Method::Delete.is_idempotent());
        assert!(!Method::Post.is_idempotent());
        assert!(!Method::Patch.is_idempotent());
    }

    #[test]
    fn method_default_ok_codes() {
        assert_eq!(Method::Get.default_ok_codes(), &[200]);
        assert_eq!(Method::Post.default_ok_codes(), &[201, 202]);
        assert_eq!(Method::Put.default_ok_codes(), &[201, 202]);
        assert_eq!(Method::Patch.default_ok_codes(), &[200, 202, 204]);
        assert_eq!(Method::Delete.default_ok_codes(), &[202, 204]);
        assert_eq!(Method::Head.default_ok_codes(), &[204]);
    }

    #[test]
    fn method_http_conversion() {
        assert_eq!(http::Method::from(Method::Patch), http::Method::PATCH);
        assert_eq!(
            Method::try_from(&http::Method::DELETE).expect("DELETE"),
            Method::Delete
        );
        assert!(Method::try_from(&http::Method::OPTIONS).is_err());
    }
}
