//! Layering extra attributes onto another resource's body.
//!
//! An extension adds keys to a body it does not own. The base options only
//! need to implement [`ToBody`]; the extension's own fields come from its
//! [`Described`] table and are written into the object under the root key.
//!
//! ```ignore
//! let opts = Extended::new(vpcs::CreateOpts { name: "private".into(), ..Default::default() },
//!     "vpc",
//!     PortSecurityOpts { port_security_enabled: Some(false) });
//! // {"vpc": {"name": "private", "port_security_enabled": false}}
//! let body = opts.to_body()?;
//! ```

use crate::{Body, Described, Error, IdLookup, Result, ToBody, build_body_with};

/// Base options plus an extension spliced under `root_key`.
///
/// `Extended` is itself [`ToBody`], so extensions stack:
/// `Extended<Extended<B, E1>, E2>`.
#[derive(Debug, Clone)]
pub struct Extended<B, E> {
    base: B,
    root_key: &'static str,
    extension: E,
}

impl<B, E> Extended<B, E> {
    /// Wrap `base`, adding `extension`'s fields under `root_key` (empty for the top level).
    #[must_use]
    pub const fn new(base: B, root_key: &'static str, extension: E) -> Self {
        Self {
            base,
            root_key,
            extension,
        }
    }

    /// The wrapped base options.
    #[must_use]
    pub const fn base(&self) -> &B {
        &self.base
    }

    /// The extension options.
    #[must_use]
    pub const fn extension(&self) -> &E {
        &self.extension
    }

    /// The key whose object receives the extension fields.
    #[must_use]
    pub const fn root_key(&self) -> &'static str {
        self.root_key
    }
}

impl<B: ToBody, E: Described> ToBody for Extended<B, E> {
    fn to_body_with(&self, lookup: Option<&dyn IdLookup>) -> Result<Body> {
        let mut body = self.base.to_body_with(lookup)?;
        let extra = build_body_with(&self.extension, "", lookup)?;

        let root = body.root_mut(self.root_key).ok_or_else(|| {
            Error::invalid_request(format!(
                "base body has no `{}` object to extend",
                self.root_key
            ))
        })?;
        for (key, value) in extra.as_map() {
            root.insert(key.clone(), value.clone());
        }
        Ok(body)
    }
}
