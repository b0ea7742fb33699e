//! Opaque references to externally stored binary content.
//!
//! Upload mechanics live outside this crate. A [`BlobRef`] is either a URL the
//! storage layer already serves, or bytes held in memory that have not been
//! uploaded yet. Either way it resolves to something an image tag can use.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Handle to external binary content such as an avatar image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BlobRef {
    /// Content already reachable at a direct URL.
    Url { url: String },
    /// Content held locally.
    #[serde(rename_all = "camelCase")]
    Inline {
        #[serde(with = "base64_bytes")]
        bytes: Vec<u8>,
        content_type: String,
    },
}

impl BlobRef {
    /// References content at a URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self::Url { url: url.into() }
    }

    /// Wraps raw bytes, guessing the content type from `file_name` when given.
    pub fn from_bytes(bytes: Vec<u8>, file_name: Option<&str>) -> Self {
        let content_type = file_name
            .and_then(|name| mime_guess::from_path(name).first())
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

        Self::Inline {
            bytes,
            content_type,
        }
    }

    /// Returns a URL that renders the content directly.
    ///
    /// Inline bytes become a base64 `data:` URL.
    pub fn direct_url(&self) -> String {
        match self {
            Self::Url { url } => url.clone(),
            Self::Inline {
                bytes,
                content_type,
            } => format!("data:{};base64,{}", content_type, STANDARD.encode(bytes)),
        }
    }

    /// Returns the bytes if they are held locally.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Url { .. } => None,
            Self::Inline { bytes, .. } => Some(bytes),
        }
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_blob_resolves_to_itself() {
        let blob = BlobRef::from_url("https://cdn.example.com/a.png");
        assert_eq!(blob.direct_url(), "https://cdn.example.com/a.png");
        assert!(blob.bytes().is_none());
    }

    #[test]
    fn test_inline_blob_becomes_data_url() {
        let blob = BlobRef::from_bytes(vec![1, 2, 3], Some("avatar.png"));
        assert_eq!(blob.direct_url(), "data:image/png;base64,AQID");
        assert_eq!(blob.bytes(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_unknown_extension_falls_back() {
        let blob = BlobRef::from_bytes(vec![0], None);
        assert!(blob.direct_url().starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn test_inline_blob_wire_format() {
        let blob = BlobRef::from_bytes(vec![1, 2, 3], Some("a.jpg"));
        let json = serde_json::to_value(&blob).unwrap();
        assert_eq!(json["kind"], "inline");
        assert_eq!(json["bytes"], "AQID");
        assert_eq!(json["contentType"], "image/jpeg");
    }
}
