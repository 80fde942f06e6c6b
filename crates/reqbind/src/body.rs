//! Body decoders.
//!
//! The binder picks one decoder from the `Content-Type` essence. Structured
//! bodies (JSON, XML) decode into the existing destination, key by key; form
//! bodies (url-encoded, multipart) flatten into [`Values`].

use bytes::Bytes;
use futures::stream;
use mime::Mime;
use serde::de::{DeserializeSeed, Deserializer, IgnoredAny, MapAccess, Visitor};
use std::convert::Infallible;
use std::fmt;

use crate::bind::BindBody;
use crate::error::{BindError, Source};
use crate::values::Values;

/// Decoding strategy chosen from a `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BodyKind {
    Json,
    Xml,
    UrlEncoded,
    Multipart { boundary: String },
    /// No decoder applies; the body is ignored.
    Other,
}

impl BodyKind {
    /// Classifies a raw `Content-Type` value.
    pub(crate) fn from_content_type(content_type: Option<&str>) -> Result<Self, BindError> {
        let Some(raw) = content_type else {
            return Ok(Self::Other);
        };
        let mime: Mime = raw.parse().map_err(|_| BindError::InvalidContentType {
            value: raw.to_owned(),
        })?;

        let kind = match mime.essence_str() {
            "application/json" => Self::Json,
            "application/xml" | "text/xml" => Self::Xml,
            "application/x-www-form-urlencoded" => Self::UrlEncoded,
            "multipart/form-data" => {
                let boundary = multer::parse_boundary(raw).map_err(|_| {
                    BindError::InvalidContentType {
                        value: raw.to_owned(),
                    }
                })?;
                Self::Multipart { boundary }
            }
            _ => Self::Other,
        };
        Ok(kind)
    }
}

/// Decodes a body map into an existing value.
///
/// Keys the destination does not claim are skipped; fields whose keys are
/// absent keep their current values.
struct InPlace<'a, T>(&'a mut T);

impl<'de, T: BindBody<'de>> DeserializeSeed<'de> for InPlace<'_, T> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de, T: BindBody<'de>> Visitor<'de> for InPlace<'_, T> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of body fields")
    }

    fn visit_map<A>(self, mut map: A) -> Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        while let Some(key) = map.next_key::<String>()? {
            if self.0.bind_body_field(&key, &mut map)? {
                tracing::trace!(source = %Source::Body, field = %key, "bound field");
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(())
    }
}

/// Decodes a JSON object into `dest`.
pub(crate) fn decode_json_into<'de, T: BindBody<'de>>(
    body: &'de [u8],
    dest: &mut T,
) -> Result<(), BindError> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    InPlace(dest)
        .deserialize(&mut deserializer)
        .and_then(|()| deserializer.end())
        .map_err(|e| BindError::decode(Source::Body, e))
}

/// Decodes an XML document's root element into `dest`.
pub(crate) fn decode_xml_into<'de, T: BindBody<'de>>(
    body: &'de [u8],
    dest: &mut T,
) -> Result<(), BindError> {
    let mut deserializer = quick_xml::de::Deserializer::from_reader(body);
    InPlace(dest)
        .deserialize(&mut deserializer)
        .map_err(|e| BindError::decode(Source::Body, e))
}

/// Decodes a url-encoded body.
pub(crate) fn urlencoded_values(body: &[u8]) -> Result<Values, BindError> {
    Values::from_urlencoded(body).map_err(|e| BindError::decode(Source::Form, e))
}

/// Collects the text parts of a multipart body.
///
/// File parts (those with a filename) are skipped. Every part, text or file,
/// counts toward `max_fields`.
pub(crate) fn multipart_values(
    body: Bytes,
    boundary: &str,
    max_fields: usize,
) -> Result<Values, BindError> {
    let chunks = stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(chunks, boundary);

    futures::executor::block_on(async {
        let mut values = Values::new();
        let mut seen = 0_usize;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| BindError::decode(Source::Form, e))?
        {
            seen += 1;
            if seen > max_fields {
                return Err(BindError::TooManyFields { limit: max_fields });
            }
            if field.file_name().is_some() {
                continue;
            }
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let text = field
                .text()
                .await
                .map_err(|e| BindError::decode(Source::Form, e))?;
            values.add(name, text);
        }

        Ok(values)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, crate::Bind)]
    struct Item {
        name: String,
        qty: u32,
        #[bind(body = "-")]
        internal: u32,
    }

    fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, &str)]) -> Bytes {
        let mut body = String::new();
        for (name, filename, data) in parts {
            body.push_str(&format!("--{boundary}\r\n"));
            match filename {
                Some(file) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\n\
                     Content-Type: application/octet-stream\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n"
                )),
            }
            body.push_str("\r\n");
            body.push_str(data);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{boundary}--\r\n"));
        Bytes::from(body)
    }

    #[test]
    fn test_classify_json_with_charset() {
        let kind = BodyKind::from_content_type(Some("application/json; charset=utf-8")).unwrap();
        assert_eq!(kind, BodyKind::Json);
    }

    #[test]
    fn test_classify_xml_variants() {
        assert_eq!(
            BodyKind::from_content_type(Some("application/xml")).unwrap(),
            BodyKind::Xml
        );
        assert_eq!(
            BodyKind::from_content_type(Some("text/xml; charset=utf-8")).unwrap(),
            BodyKind::Xml
        );
    }

    #[test]
    fn test_classify_forms() {
        assert_eq!(
            BodyKind::from_content_type(Some("application/x-www-form-urlencoded")).unwrap(),
            BodyKind::UrlEncoded
        );
        assert_eq!(
            BodyKind::from_content_type(Some("multipart/form-data; boundary=XyZ")).unwrap(),
            BodyKind::Multipart {
                boundary: "XyZ".to_string()
            }
        );
    }

    #[test]
    fn test_classify_other_and_missing() {
        assert_eq!(
            BodyKind::from_content_type(Some("text/plain")).unwrap(),
            BodyKind::Other
        );
        assert_eq!(BodyKind::from_content_type(None).unwrap(), BodyKind::Other);
    }

    #[test]
    fn test_classify_invalid() {
        let err = BodyKind::from_content_type(Some("not a mime type")).unwrap_err();
        assert_eq!(err.source_kind(), Source::ContentType);
    }

    #[test]
    fn test_classify_multipart_without_boundary() {
        assert!(BodyKind::from_content_type(Some("multipart/form-data")).is_err());
    }

    #[test]
    fn test_decode_json_into() {
        let mut item = Item::default();
        decode_json_into(br#"{"name":"bolt","qty":3,"extra":[1,2]}"#, &mut item).unwrap();
        assert_eq!(
            item,
            Item {
                name: "bolt".to_string(),
                qty: 3,
                internal: 0,
            }
        );

        let err = decode_json_into(b"{not json", &mut item).unwrap_err();
        assert_eq!(err.error_code(), "DESERIALIZATION_FAILED");
    }

    #[test]
    fn test_decode_json_keeps_absent_fields() {
        let mut item = Item {
            name: "kept".to_string(),
            qty: 5,
            internal: 0,
        };
        decode_json_into(br#"{"qty":6}"#, &mut item).unwrap();

        assert_eq!(item.name, "kept");
        assert_eq!(item.qty, 6);
    }

    #[test]
    fn test_decode_json_ignores_excluded_key() {
        let mut item = Item::default();
        decode_json_into(br#"{"internal":9}"#, &mut item).unwrap();
        assert_eq!(item.internal, 0);
    }

    #[test]
    fn test_decode_json_matches_keys_case_insensitively() {
        let mut item = Item::default();
        decode_json_into(br#"{"Name":"nut","QTY":2}"#, &mut item).unwrap();
        assert_eq!(item.name, "nut");
        assert_eq!(item.qty, 2);
    }

    #[test]
    fn test_decode_json_rejects_non_object() {
        let mut item = Item::default();
        assert!(decode_json_into(b"[1,2]", &mut item).is_err());
        assert!(decode_json_into(br#"{"qty":1} trailing"#, &mut item).is_err());
    }

    #[test]
    fn test_decode_xml_into() {
        let mut item = Item {
            name: "kept".to_string(),
            ..Item::default()
        };
        decode_xml_into(b"<item><qty>12</qty><color>red</color></item>", &mut item).unwrap();
        assert_eq!(item.name, "kept");
        assert_eq!(item.qty, 12);

        assert!(decode_xml_into(b"<item><qty>many</qty></item>", &mut item).is_err());
    }

    #[test]
    fn test_urlencoded_values() {
        let values = urlencoded_values(b"a=1&a=2&b=hello+world").unwrap();
        assert_eq!(values.get_all("a").map(<[String]>::len), Some(2));
        assert_eq!(values.get("b"), Some("hello world"));
    }

    #[test]
    fn test_multipart_text_fields() {
        let body = multipart_body(
            "boundary42",
            &[
                ("name", None, "Alice"),
                ("tag", None, "x"),
                ("tag", None, "y"),
            ],
        );

        let values = multipart_values(body, "boundary42", 10).unwrap();

        assert_eq!(values.get("name"), Some("Alice"));
        assert_eq!(
            values.get_all("tag"),
            Some(&["x".to_string(), "y".to_string()][..])
        );
    }

    #[test]
    fn test_multipart_skips_files() {
        let body = multipart_body(
            "b",
            &[("avatar", Some("me.png"), "PNGDATA"), ("name", None, "Bob")],
        );

        let values = multipart_values(body, "b", 10).unwrap();

        assert!(!values.contains_key("avatar"));
        assert_eq!(values.get("name"), Some("Bob"));
    }

    #[test]
    fn test_multipart_too_many_fields() {
        let body = multipart_body("b", &[("a", None, "1"), ("b", None, "2"), ("c", None, "3")]);

        let err = multipart_values(body, "b", 2).unwrap_err();
        assert!(matches!(err, BindError::TooManyFields { limit: 2 }));
    }
}
