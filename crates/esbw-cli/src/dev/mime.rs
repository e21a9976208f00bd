//! Extension to content type table.

use phf::phf_map;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

static CONTENT_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "html" => "text/html; charset=utf-8",
    "htm" => "text/html; charset=utf-8",
    "css" => "text/css; charset=utf-8",
    "js" => "application/javascript; charset=utf-8",
    "mjs" => "application/javascript; charset=utf-8",
    "cjs" => "application/javascript; charset=utf-8",
    "map" => "application/json; charset=utf-8",
    "json" => "application/json; charset=utf-8",
    "txt" => "text/plain; charset=utf-8",
    "md" => "text/markdown; charset=utf-8",
    "xml" => "application/xml",
    "csv" => "text/csv; charset=utf-8",
    "wasm" => "application/wasm",
    "png" => "image/png",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "svg" => "image/svg+xml",
    "ico" => "image/x-icon",
    "webp" => "image/webp",
    "avif" => "image/avif",
    "bmp" => "image/bmp",
    "woff" => "font/woff",
    "woff2" => "font/woff2",
    "ttf" => "font/ttf",
    "otf" => "font/otf",
    "eot" => "application/vnd.ms-fontobject",
    "mp3" => "audio/mpeg",
    "wav" => "audio/wav",
    "ogg" => "audio/ogg",
    "mp4" => "video/mp4",
    "webm" => "video/webm",
    "pdf" => "application/pdf",
    "zip" => "application/zip",
    "webmanifest" => "application/manifest+json",
};

/// Content type for `path`, by its (case-insensitive) extension.
pub fn content_type(path: &str) -> &'static str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.')
        .and_then(|(_, ext)| CONTENT_TYPES.get(ext.to_ascii_lowercase().as_str()).copied())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}
