//! Static files and hashed client bundles.
//!
//! Every static file is reachable at its plain path (`/foo.txt`) and under
//! the build-hashed prefix (`/_noc/static/{build_id}/foo.txt`). Client
//! bundles only live under `/_noc/js/{build_id}/`. Hashed URLs change with
//! every build, so they are served as immutable; plain paths revalidate
//! through their ETag.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use sha2::{Digest, Sha256};

use crate::error::{NocturneError, NocturneResult};

pub const STATIC_PREFIX: &str = "/_noc/static";
pub const JS_PREFIX: &str = "/_noc/js";
pub const IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Where an asset's bytes come from.
#[derive(Debug, Clone)]
pub enum AssetSource {
    Memory(Bytes),
    /// Read from disk on every request; the ETag follows the bytes read.
    Disk(PathBuf),
}

/// A static file declaration, as handed to the manifest builder.
#[derive(Debug, Clone)]
pub struct StaticFile {
    path: String,
    source: AssetSource,
    content_type: Option<String>,
    etag: Option<String>,
}

impl StaticFile {
    pub fn memory(path: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        StaticFile {
            path: path.into(),
            source: AssetSource::Memory(bytes.into()),
            content_type: None,
            etag: None,
        }
    }

    pub fn disk(path: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        StaticFile {
            path: path.into(),
            source: AssetSource::Disk(file.into()),
            content_type: None,
            etag: None,
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Use a precomputed ETag (quoted) instead of hashing the content.
    pub fn etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A servable asset at one URL path.
#[derive(Debug, Clone)]
pub struct StaticAssetEntry {
    pub path: String,
    pub etag: String,
    pub content_type: String,
    pub source: AssetSource,
    /// Served with immutable caching.
    pub hashed: bool,
}

/// Strong ETag: the first 16 bytes of the SHA-256 of `content`, hex, quoted.
pub fn compute_etag(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    format!("\"{}\"", hex::encode(&digest[..16]))
}

/// Whether an `if-none-match` header value matches `etag`.
///
/// Accepts `*`, comma separated lists and weak tags (`W/"..."`).
pub fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    let strip = |t: &str| t.trim().trim_start_matches("W/").to_string();
    let wanted = strip(etag);
    if_none_match
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || strip(candidate) == wanted)
}

fn normalize(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

fn guess_type(path: &str) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Intercepts static paths ahead of routing.
#[derive(Debug, Default)]
pub struct StaticResponder {
    build_id: String,
    entries: HashMap<String, Arc<StaticAssetEntry>>,
}

impl StaticResponder {
    pub fn new(build_id: impl Into<String>) -> Self {
        StaticResponder {
            build_id: build_id.into(),
            entries: HashMap::new(),
        }
    }

    /// Register a static file at its plain path and its hashed path.
    ///
    /// Disk files are read once here. The hashed path serves that snapshot,
    /// so its bytes never change under an immutable URL; the plain path keeps
    /// reading the file and revalidates against the current content.
    pub fn add_file(&mut self, file: StaticFile) -> NocturneResult<()> {
        let path = normalize(&file.path);
        let snapshot = match &file.source {
            AssetSource::Memory(bytes) => bytes.clone(),
            AssetSource::Disk(file_path) => Bytes::from(std::fs::read(file_path)?),
        };
        let etag = file.etag.clone().unwrap_or_else(|| compute_etag(&snapshot));
        let content_type = file.content_type.clone().unwrap_or_else(|| guess_type(&path));

        let hashed_path = format!("{}/{}{}", STATIC_PREFIX, self.build_id, path);
        self.insert(StaticAssetEntry {
            path: path.clone(),
            etag: etag.clone(),
            content_type: content_type.clone(),
            source: file.source,
            hashed: false,
        })?;
        self.insert(StaticAssetEntry {
            path: hashed_path,
            etag,
            content_type,
            source: AssetSource::Memory(snapshot),
            hashed: true,
        })
    }

    /// Register a client bundle under `/_noc/js/{build_id}/{name}`.
    pub fn add_bundle(&mut self, name: &str, bytes: Bytes) -> NocturneResult<()> {
        let path = format!("{}/{}/{}", JS_PREFIX, self.build_id, name.trim_start_matches('/'));
        self.insert(StaticAssetEntry {
            content_type: guess_type(name),
            etag: compute_etag(&bytes),
            source: AssetSource::Memory(bytes),
            hashed: true,
            path,
        })
    }

    fn insert(&mut self, entry: StaticAssetEntry) -> NocturneResult<()> {
        if self.entries.contains_key(&entry.path) {
            return Err(NocturneError::Manifest(format!(
                "static asset `{}` declared twice",
                entry.path
            )));
        }
        self.entries.insert(entry.path.clone(), Arc::new(entry));
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&Arc<StaticAssetEntry>> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hashed URL of a known static file; other paths are returned unchanged.
    pub fn asset_url(&self, path: &str) -> String {
        match self.entries.get(path) {
            Some(entry) if !entry.hashed => {
                format!("{}/{}{}", STATIC_PREFIX, self.build_id, path)
            }
            _ => path.to_string(),
        }
    }

    /// Answer `path` if it names a known asset and the method is GET or HEAD.
    pub async fn respond(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Option<NocturneResult<Response>> {
        if *method != Method::GET && *method != Method::HEAD {
            return None;
        }
        let entry = self.entries.get(path)?;
        Some(serve(entry, headers).await)
    }
}

async fn serve(entry: &StaticAssetEntry, headers: &HeaderMap) -> NocturneResult<Response> {
    let (etag, body) = match &entry.source {
        AssetSource::Memory(bytes) => (entry.etag.clone(), bytes.clone()),
        AssetSource::Disk(file) => {
            let bytes = Bytes::from(tokio::fs::read(file).await?);
            (compute_etag(&bytes), bytes)
        }
    };
    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| etag_matches(v, &etag));

    let mut builder = Response::builder().header(header::ETAG, &etag);
    if entry.hashed {
        builder = builder.header(header::CACHE_CONTROL, IMMUTABLE);
    }

    let response = if not_modified {
        builder.status(StatusCode::NOT_MODIFIED).body(Body::empty())
    } else {
        builder
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, &entry.content_type)
            .body(Body::from(body))
    };
    response.map_err(|e| NocturneError::handler(e.to_string()))
}
