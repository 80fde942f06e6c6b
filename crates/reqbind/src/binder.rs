//! The binding entry points.
//!
//! A [`Binder`] carries the settings and the path-variable accessor used by
//! every bind call. Build one at startup and share it; it is cheap to clone.

use bytes::Bytes;
use http::{header, Method, Request};
use std::fmt;
use std::sync::Arc;

use crate::bind::{Bind, BindBody};
use crate::body::{self, BodyKind};
use crate::config::BindConfig;
use crate::error::{BindError, Source};
use crate::path::{ExtensionPathValues, PathLookup, PathValues};
use crate::values::{HeaderLookup, Values};

/// Binds request data into destination values.
///
/// # Example
///
/// ```rust
/// use reqbind::{Bind, Binder, PathParams};
/// use bytes::Bytes;
/// use http::Request;
///
/// #[derive(Debug, Default, Bind)]
/// struct GetUser {
///     #[bind(path = "id")]
///     id: u64,
///     #[bind(header = "X-Request-Id")]
///     request_id: String,
///     #[bind(query = "expand")]
///     expand: Vec<String>,
/// }
///
/// let mut req = Request::get("/users/42?expand=roles&expand=teams")
///     .header("x-request-id", "req-1")
///     .body(Bytes::new())
///     .unwrap();
/// req.extensions_mut().insert([("id", "42")].into_iter().collect::<PathParams>());
///
/// let binder = Binder::new();
/// let mut dest = GetUser::default();
/// binder.request(&req, &mut dest).unwrap();
///
/// assert_eq!(dest.id, 42);
/// assert_eq!(dest.request_id, "req-1");
/// assert_eq!(dest.expand, vec!["roles", "teams"]);
/// ```
#[derive(Clone)]
pub struct Binder {
    config: BindConfig,
    path_values: Arc<dyn PathValues>,
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl Binder {
    /// Creates a binder with default settings, reading path variables from
    /// the request extensions.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a customized binder.
    #[must_use]
    pub fn builder() -> BinderBuilder {
        BinderBuilder::default()
    }

    /// Returns the binder settings.
    #[must_use]
    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    /// Binds path, headers, then either the query string or the body.
    ///
    /// `GET`, `DELETE` and `HEAD` requests bind the query string; every
    /// other method binds the body. The first failing step aborts the call.
    ///
    /// The [`BindBody`] bound applies to every method, including those that
    /// never read a body; see [`Bind`] for how the derive provides it.
    pub fn request<T>(&self, req: &Request<Bytes>, dest: &mut T) -> Result<(), BindError>
    where
        T: Bind + for<'de> BindBody<'de>,
    {
        self.path(req, dest)?;
        self.header(req, dest)?;
        if reads_query(req.method()) {
            self.query(req, dest)
        } else {
            self.body(req, dest)
        }
    }

    /// Binds a fresh `T::default()` with [`request`](Self::request).
    pub fn extract<T>(&self, req: &Request<Bytes>) -> Result<T, BindError>
    where
        T: Bind + for<'de> BindBody<'de> + Default,
    {
        let mut dest = T::default();
        self.request(req, &mut dest)?;
        Ok(dest)
    }

    /// Binds fields tagged `path` from the path-variable accessor.
    ///
    /// Variables the route does not have leave their fields untouched.
    /// Path values are never vacuumed.
    pub fn path<T: Bind>(&self, req: &Request<Bytes>, dest: &mut T) -> Result<(), BindError> {
        let lookup = PathLookup {
            values: self.path_values.as_ref(),
            req,
        };
        dest.bind(Source::Path, &lookup)?;
        Ok(())
    }

    /// Binds fields tagged `header`.
    ///
    /// Header names are compared case-insensitively; repeated headers feed
    /// `Vec` fields with every value.
    pub fn header<T: Bind>(&self, req: &Request<Bytes>, dest: &mut T) -> Result<(), BindError> {
        let values = self.clean(Source::Header, Values::from_headers(req.headers()));
        dest.bind(Source::Header, &HeaderLookup(&values))?;
        Ok(())
    }

    /// Binds fields tagged `query` from the URL query string.
    pub fn query<T: Bind>(&self, req: &Request<Bytes>, dest: &mut T) -> Result<(), BindError> {
        let values = query_values(req)?;
        let values = self.clean(Source::Query, values);
        dest.bind(Source::Query, &values)?;
        Ok(())
    }

    /// Decodes the body according to its `Content-Type`.
    ///
    /// | Content type | Effect |
    /// |--------------|--------|
    /// | `application/json` | decode the object into `dest` through [`BindBody`] |
    /// | `application/xml`, `text/xml` | decode the root element into `dest` through [`BindBody`] |
    /// | `application/x-www-form-urlencoded` | bind `form` fields from the body followed by the query string |
    /// | `multipart/form-data` | bind `form` fields from text parts followed by the query string |
    /// | anything else, or none | nothing |
    ///
    /// Structured bodies only assign the fields whose keys are present, so
    /// values bound from the path or headers survive unless the body names
    /// them too. An empty body is not an error and binds nothing.
    pub fn body<T>(&self, req: &Request<Bytes>, dest: &mut T) -> Result<(), BindError>
    where
        T: Bind + for<'de> BindBody<'de>,
    {
        let payload = req.body();
        if payload.is_empty() {
            return Ok(());
        }
        if payload.len() > self.config.max_body_size {
            return Err(BindError::PayloadTooLarge {
                limit: self.config.max_body_size,
                actual: payload.len(),
            });
        }

        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

        match BodyKind::from_content_type(content_type.as_deref())? {
            BodyKind::Json => {
                tracing::debug!(content_type = ?content_type, "decoding json body");
                body::decode_json_into(payload, dest)
            }
            BodyKind::Xml => {
                tracing::debug!(content_type = ?content_type, "decoding xml body");
                body::decode_xml_into(payload, dest)
            }
            BodyKind::UrlEncoded => {
                tracing::debug!("decoding url-encoded form");
                let mut values = body::urlencoded_values(payload)?;
                values.extend(query_pairs(&query_values(req)?));
                self.bind_form(dest, values)
            }
            BodyKind::Multipart { boundary } => {
                tracing::debug!(%boundary, "decoding multipart form");
                let mut values = body::multipart_values(
                    payload.clone(),
                    &boundary,
                    self.config.max_multipart_fields,
                )?;
                values.extend(query_pairs(&query_values(req)?));
                self.bind_form(dest, values)
            }
            BodyKind::Other => {
                tracing::debug!(content_type = ?content_type, "no decoder for content type, body ignored");
                Ok(())
            }
        }
    }

    fn bind_form<T: Bind>(&self, dest: &mut T, values: Values) -> Result<(), BindError> {
        let values = self.clean(Source::Form, values);
        dest.bind(Source::Form, &values)?;
        Ok(())
    }

    fn clean(&self, source: Source, values: Values) -> Values {
        if self.config.vacuum {
            let cleaned = values.vacuum();
            tracing::trace!(
                %source,
                before = values.len(),
                after = cleaned.len(),
                "vacuumed values"
            );
            cleaned
        } else {
            values
        }
    }
}

fn reads_query(method: &Method) -> bool {
    *method == Method::GET || *method == Method::DELETE || *method == Method::HEAD
}

fn query_values(req: &Request<Bytes>) -> Result<Values, BindError> {
    Values::from_query(req.uri().query().unwrap_or(""))
        .map_err(|e| BindError::decode(Source::Query, e))
}

fn query_pairs(values: &Values) -> impl Iterator<Item = (String, String)> + '_ {
    values
        .iter()
        .flat_map(|(k, vs)| vs.iter().map(move |v| (k.to_owned(), v.clone())))
}

/// Builder for [`Binder`].
pub struct BinderBuilder {
    config: BindConfig,
    path_values: Arc<dyn PathValues>,
}

impl fmt::Debug for BinderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinderBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for BinderBuilder {
    fn default() -> Self {
        Self {
            config: BindConfig::default(),
            path_values: Arc::new(ExtensionPathValues),
        }
    }
}

impl BinderBuilder {
    /// Replaces all settings.
    #[must_use]
    pub fn config(mut self, config: BindConfig) -> Self {
        self.config = config;
        self
    }

    /// Enables or disables the vacuum pass.
    #[must_use]
    pub fn vacuum(mut self, vacuum: bool) -> Self {
        self.config.vacuum = vacuum;
        self
    }

    /// Sets the maximum accepted body size.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Sets the path-variable accessor.
    #[must_use]
    pub fn path_values<P: PathValues + 'static>(mut self, path_values: P) -> Self {
        self.path_values = Arc::new(path_values);
        self
    }

    /// Builds the binder.
    #[must_use]
    pub fn build(self) -> Binder {
        Binder {
            config: self.config,
            path_values: self.path_values,
        }
    }
}
