//! CERN SSO cookie files.
//!
//! `auth-get-sso-cookie` writes Netscape cookie jars:
//!
//! ```text
//! # Netscape HTTP Cookie File
//! #HttpOnly_cms-pdmv.cern.ch	FALSE	/	TRUE	0	mod_auth_openidc_session	abc123
//! ```
//!
//! A file holding a single `name=value` line is accepted too.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// A cookie from an SSO cookie file.
///
/// The file's domain column is ignored; cookies go to the configured McM
/// instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsoCookie {
    pub name: String,
    pub value: String,
    pub path: String,
}

impl SsoCookie {
    /// `Set-Cookie` style string for a cookie jar.
    pub fn to_set_cookie(&self) -> String {
        format!("{}={}; Path={}", self.name, self.value, self.path)
    }
}

/// Cookies found in `content`; empty when the format is not recognised.
pub fn parse_cookie_file(content: &str) -> Vec<SsoCookie> {
    let content = content.trim();

    if content.contains('\t') {
        return content.lines().filter_map(parse_netscape_line).collect();
    }

    match content.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => vec![SsoCookie {
            name: name.trim().to_string(),
            value: value.trim().to_string(),
            path: "/".to_string(),
        }],
        _ => Vec::new(),
    }
}

fn parse_netscape_line(line: &str) -> Option<SsoCookie> {
    let line = line.strip_prefix(HTTP_ONLY_PREFIX).unwrap_or(line);
    if line.trim().is_empty() || line.starts_with('#') {
        return None;
    }

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 7 {
        return None;
    }

    Some(SsoCookie {
        name: fields[5].to_string(),
        value: fields[6].trim_end().to_string(),
        path: fields[2].to_string(),
    })
}

/// The usual places for CERN SSO cookies, in lookup order.
pub fn default_cookie_files() -> Vec<PathBuf> {
    let Some(home) = std::env::var_os("HOME").map(PathBuf::from) else {
        return Vec::new();
    };

    vec![
        home.join(".cern-sso-cookie.txt"),
        home.join("private/prod-cookie.txt"),
        home.join("private/dev-cookie.txt"),
    ]
}

/// Cookies from the first readable file that contains any.
pub fn load_cookies(candidates: &[PathBuf]) -> Option<(PathBuf, Vec<SsoCookie>)> {
    for path in candidates {
        match read_cookie_file(path) {
            Some(cookies) if !cookies.is_empty() => return Some((path.clone(), cookies)),
            Some(_) => debug!("No cookies in {}", path.display()),
            None => {}
        }
    }
    None
}

fn read_cookie_file(path: &Path) -> Option<Vec<SsoCookie>> {
    if !path.exists() {
        return None;
    }
    match std::fs::read_to_string(path) {
        Ok(content) => Some(parse_cookie_file(&content)),
        Err(e) => {
            warn!("Failed to read cookie from {}: {}", path.display(), e);
            None
        }
    }
}
