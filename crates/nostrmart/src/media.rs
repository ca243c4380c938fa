//! MediaService: validated uploads through the blob client.
//!
//! An upload is checked locally (size, type, filename, and the signed
//! blob-auth event) before any server sees it. The bytes then go to the
//! first blob server that accepts them, and when a store is configured a
//! media record pointing at the blob is written.

use std::sync::Arc;

use bytes::Bytes;
use nostrmart_blob::{BlobClient, BlobDescriptor};
use nostrmart_core::{
    kinds, sha256_hex, unix_now, verify_event_detailed, Event, DEFAULT_MAX_CONTENT_BYTES,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::store::{MediaObject, NewMediaObject, Store};

/// Longest accepted filename, in characters.
pub const MAX_FILENAME_LEN: usize = 255;

/// Extensions refused regardless of the MIME allow-list.
pub const DANGEROUS_EXTENSIONS: &[&str] = &[".exe", ".bat", ".cmd", ".scr", ".pif", ".vbs", ".js"];

const UNSAFE_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Reasons an upload is rejected before it is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("file is {actual} bytes, maximum is {max}")]
    TooLarge { max: usize, actual: usize },

    #[error("content type not allowed: {0}")]
    MimeNotAllowed(String),

    #[error("invalid filename")]
    InvalidFilename,

    #[error("file extension not allowed: {0}")]
    DangerousExtension(String),

    #[error("upload authorization rejected: {0}")]
    Unauthorized(&'static str),
}

/// Upload limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    pub max_file_size: usize,
    /// When set, only these content types are accepted.
    pub allowed_mime: Option<Vec<String>>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_CONTENT_BYTES,
            allowed_mime: None,
        }
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub descriptor: BlobDescriptor,
    /// The stored media record, when a store is configured.
    pub record: Option<MediaObject>,
}

/// Uploads media and records it.
pub struct MediaService<S: Store> {
    blobs: BlobClient,
    store: Option<Arc<S>>,
    config: MediaConfig,
}

impl<S: Store> MediaService<S> {
    /// Service without a backing store; uploads are not recorded.
    pub fn new(blobs: BlobClient, config: MediaConfig) -> Self {
        Self {
            blobs,
            store: None,
            config,
        }
    }

    /// Record uploads in the given store.
    pub fn with_store(mut self, store: Arc<S>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn blobs(&self) -> &BlobClient {
        &self.blobs
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// Validate and upload a file.
    ///
    /// `auth_event` must be a signed kind-24242 upload event whose `x` tag
    /// names the SHA-256 of `data`. Without `content_type` the type is
    /// guessed from the filename.
    pub async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        content_type: Option<&str>,
        auth_event: &Event,
    ) -> Result<UploadedMedia> {
        let mime = content_type
            .map(str::to_string)
            .unwrap_or_else(|| content_type_for(filename));
        validate_upload(&self.config, data.len(), filename, &mime)?;

        let sha256 = sha256_hex(&data);
        check_upload_auth(auth_event, &sha256, unix_now())?;

        let filename = sanitize_filename(filename);
        let size = data.len();
        let descriptor = self
            .blobs
            .upload(data, &filename, auth_event, Some(mime.as_str()))
            .await?;

        let record = match &self.store {
            Some(store) => {
                let media = NewMediaObject {
                    url: descriptor.url.clone(),
                    uploader_pubkey: auth_event.pubkey.to_ascii_lowercase(),
                    size_bytes: size as u64,
                    mime_type: Some(mime.clone()),
                    checksum: sha256.clone(),
                };
                Some(store.insert_media_object(&media).await?)
            }
            None => None,
        };

        info!(
            sha256 = %sha256,
            filename = %filename,
            mime = %mime,
            size,
            recorded = record.is_some(),
            "Uploaded media"
        );
        Ok(UploadedMedia { descriptor, record })
    }

    /// Get a media record by id.
    pub async fn get_media(&self, id: &str) -> Result<Option<MediaObject>> {
        Ok(self.store()?.get_media_object(id).await?)
    }

    /// List media records by uploader, newest first.
    pub async fn list_by_uploader(
        &self,
        pubkey: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MediaObject>> {
        let pubkey = pubkey.to_ascii_lowercase();
        debug!(pubkey = %pubkey, limit, offset, "Listing media");
        Ok(self
            .store()?
            .list_media_by_uploader(&pubkey, limit, offset)
            .await?)
    }

    fn store(&self) -> Result<&S> {
        self.store.as_deref().ok_or(Error::StoreNotConfigured)
    }
}

/// Check size, content type and filename against the limits.
pub fn validate_upload(
    config: &MediaConfig,
    size: usize,
    filename: &str,
    mime: &str,
) -> std::result::Result<(), MediaError> {
    if size > config.max_file_size {
        return Err(MediaError::TooLarge {
            max: config.max_file_size,
            actual: size,
        });
    }

    if let Some(allowed) = &config.allowed_mime {
        if !allowed.iter().any(|m| m == mime) {
            return Err(MediaError::MimeNotAllowed(mime.to_string()));
        }
    }

    if filename.is_empty() || filename.chars().count() > MAX_FILENAME_LEN {
        return Err(MediaError::InvalidFilename);
    }

    let lower = filename.to_ascii_lowercase();
    if let Some(ext) = DANGEROUS_EXTENSIONS.iter().find(|ext| lower.ends_with(*ext)) {
        return Err(MediaError::DangerousExtension(ext.to_string()));
    }

    Ok(())
}

/// Check that `event` authorizes uploading the blob `sha256` at `now`.
fn check_upload_auth(event: &Event, sha256: &str, now: u64) -> Result<()> {
    if event.kind != kinds::BLOB_AUTH {
        return Err(MediaError::Unauthorized("not a blob authorization event").into());
    }
    if event.tag_value("t") != Some("upload") {
        return Err(MediaError::Unauthorized("action is not upload").into());
    }
    if !event
        .tag_value("x")
        .is_some_and(|x| x.eq_ignore_ascii_case(sha256))
    {
        return Err(MediaError::Unauthorized("hash does not match data").into());
    }
    let expiration = event.tag_value("expiration").and_then(|v| v.parse::<u64>().ok());
    if expiration.is_some_and(|exp| exp <= now) {
        return Err(MediaError::Unauthorized("authorization expired").into());
    }

    verify_event_detailed(event)?;
    Ok(())
}

/// Guess a content type from a filename's extension.
pub fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Make a filename safe to store.
///
/// Path and shell metacharacters become `_`, surrounding whitespace is
/// trimmed, and long names are cut to [`MAX_FILENAME_LEN`] characters while
/// keeping the extension.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if UNSAFE_FILENAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= MAX_FILENAME_LEN {
        return cleaned.to_string();
    }

    let shortened = match cleaned.rsplit_once('.') {
        Some((name, ext)) => {
            let keep = MAX_FILENAME_LEN.saturating_sub(ext.chars().count() + 1);
            format!("{}.{}", name.chars().take(keep).collect::<String>(), ext)
        }
        None => cleaned.to_string(),
    };
    let shortened: String = shortened.chars().take(MAX_FILENAME_LEN).collect();
    shortened.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nostrmart_testkit::TestFixture;
    use proptest::prelude::*;

    #[test]
    fn test_validate_size() {
        let config = MediaConfig {
            max_file_size: 10,
            allowed_mime: None,
        };
        assert!(validate_upload(&config, 10, "a.png", "image/png").is_ok());
        assert_eq!(
            validate_upload(&config, 11, "a.png", "image/png"),
            Err(MediaError::TooLarge { max: 10, actual: 11 })
        );
    }

    #[test]
    fn test_validate_mime_allow_list() {
        let config = MediaConfig {
            max_file_size: 100,
            allowed_mime: Some(vec!["image/png".into(), "image/jpeg".into()]),
        };
        assert!(validate_upload(&config, 1, "a.jpg", "image/jpeg").is_ok());
        assert_eq!(
            validate_upload(&config, 1, "a.gif", "image/gif"),
            Err(MediaError::MimeNotAllowed("image/gif".into()))
        );
    }

    #[test]
    fn test_validate_filename() {
        let config = MediaConfig::default();
        assert_eq!(
            validate_upload(&config, 1, "", "text/plain"),
            Err(MediaError::InvalidFilename)
        );
        let long = "a".repeat(256);
        assert_eq!(
            validate_upload(&config, 1, &long, "text/plain"),
            Err(MediaError::InvalidFilename)
        );
        assert_eq!(
            validate_upload(&config, 1, "setup.EXE", "application/octet-stream"),
            Err(MediaError::DangerousExtension(".exe".into()))
        );
        assert!(validate_upload(&config, 1, "notes.json", "application/json").is_ok());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("photo.JPG"), "image/jpeg");
        assert_eq!(content_type_for("clip.mp4"), "video/mp4");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("  a<b>:c.png "), "a_b__c.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");

        let long = format!("{}.jpeg", "x".repeat(300));
        let short = sanitize_filename(&long);
        assert_eq!(short.chars().count(), MAX_FILENAME_LEN);
        assert!(short.ends_with(".jpeg"));

        let no_ext = "y".repeat(300);
        assert_eq!(sanitize_filename(&no_ext).chars().count(), MAX_FILENAME_LEN);
    }

    #[test]
    fn test_upload_auth_checks() {
        let fixture = TestFixture::new();
        let data = b"hello";
        let sha256 = sha256_hex(data);
        let now = unix_now();

        let good = fixture.upload_auth(data);
        assert!(check_upload_auth(&good, &sha256, now).is_ok());

        let other = fixture.upload_auth(b"other");
        assert!(matches!(
            check_upload_auth(&other, &sha256, now),
            Err(Error::Media(MediaError::Unauthorized(_)))
        ));

        let delete = fixture.blob_auth("delete", Some(&sha256));
        assert!(matches!(
            check_upload_auth(&delete, &sha256, now),
            Err(Error::Media(MediaError::Unauthorized("action is not upload")))
        ));

        assert!(matches!(
            check_upload_auth(&good, &sha256, now + 3600),
            Err(Error::Media(MediaError::Unauthorized("authorization expired")))
        ));

        let mut forged = good.clone();
        forged.content = "Upload something else".into();
        assert!(matches!(
            check_upload_auth(&forged, &sha256, now),
            Err(Error::Verify(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_sanitized_names_are_safe(name in "\\PC{0,400}") {
            let clean = sanitize_filename(&name);
            prop_assert!(clean.chars().count() <= MAX_FILENAME_LEN);
            prop_assert!(!clean.contains(UNSAFE_FILENAME_CHARS));
            prop_assert_eq!(clean.trim(), clean.as_str());
        }
    }
}
