use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::gviz::{self, GvizTable};

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "vroad_terminal";
const CACHE_FILE: &str = "sheet_cache.json";

/// The one cache tag shared by every sheet fetch; the revalidation endpoint
/// purges exactly this tag.
pub const REVALIDATE_TAG: &str = "tokens";

static CACHE: Mutex<Option<SheetCacheFile>> = Mutex::new(None);

/// One content domain served by the community spreadsheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Offensive,
    Defensive,
    Keeper,
    Shots,
    Tokens,
    Feves,
    Heroes,
    Players,
}

impl Domain {
    pub const ALL: [Domain; 8] = [
        Domain::Offensive,
        Domain::Defensive,
        Domain::Keeper,
        Domain::Shots,
        Domain::Tokens,
        Domain::Feves,
        Domain::Heroes,
        Domain::Players,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Domain::Offensive => "Offensive",
            Domain::Defensive => "Défensive",
            Domain::Keeper => "Gardien",
            Domain::Shots => "Tirs",
            Domain::Tokens => "Tokens",
            Domain::Feves => "Fèves",
            Domain::Heroes => "Héros",
            Domain::Players => "Joueurs",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Domain::Offensive => "offensive",
            Domain::Defensive => "defensive",
            Domain::Keeper => "gardien",
            Domain::Shots => "tirs",
            Domain::Tokens => "tokens",
            Domain::Feves => "feves",
            Domain::Heroes => "heroes",
            Domain::Players => "players",
        }
    }
}

/// Immutable per-domain source description, resolved once at startup from the
/// built-in defaults plus optional environment overrides.
#[derive(Debug, Clone)]
pub struct SheetSource {
    pub domain: Domain,
    pub sheet_id: String,
    pub gid: String,
    pub ttl: Duration,
}

impl SheetSource {
    pub fn gviz_url(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/gviz/tq?tqx=out:json&gid={}",
            self.sheet_id, self.gid
        )
    }

    /// Published-HTML rendition of the same tab; used by the player image
    /// scrape only.
    pub fn pubhtml_url(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/pubhtml?gid={}&single=true",
            self.sheet_id, self.gid
        )
    }
}

/// Records plus console notes produced by one domain fetch (column fallback
/// warnings and the like). Notes are forwarded to the UI console, never
/// treated as errors.
#[derive(Debug, Clone)]
pub struct FetchOutcome<T> {
    pub records: Vec<T>,
    pub notes: Vec<String>,
}

pub fn source(domain: Domain) -> SheetSource {
    let (sheet_default, gid_default, ttl_secs) = match domain {
        Domain::Offensive => ("1Qr4LSXr8W1DKJ_-HeGSTRj0Ef6J7gSPNYIvha9HwYpk", "465028935", 600),
        Domain::Defensive => ("19Nl2dAGQ0r05DyZUDnp26SjfOoVZ5vB1poFrENzXUmQ", "1821570578", 3600),
        Domain::Keeper => ("1vRZw0oXqNlyGmT4cJbUKe8HsD2fAPpti6EnYhB9kSMo", "1475583214", 3600),
        Domain::Shots => ("1pfHZJSLMyOIpkpXvbOplBJwiHj2TgQWZaEV0UhbX0ao", "0", 600),
        Domain::Tokens => ("187WKJIEtC3CsW5UnHLaw_lNXjlyh_Q13WgDWazDK5Sc", "297697533", 3600),
        Domain::Feves => ("1qomleD6MQ9B-o-i_ZyWSSOlDgJgR3UoiiCrDOCeddAY", "1188141609", 3600),
        Domain::Heroes => ("1Ec67gsprTu7LwHlPZ2jn6PKJcANMCxlblQ3HQvYTM0U", "1891329663", 3600),
        Domain::Players => ("11kA7nvhB4bl99ttgDQ8SOHDG2ocXvXyY_YZRRLyBWwA", "1730771214", 600),
    };

    let upper = domain.key().to_uppercase();
    let sheet_id = env_or(&format!("VROAD_SHEET_{upper}"), sheet_default);
    let gid = env_or(&format!("VROAD_GID_{upper}"), gid_default);

    SheetSource {
        domain,
        sheet_id,
        gid,
        ttl: Duration::from_secs(ttl_secs),
    }
}

fn env_or(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Fetch one domain's GVIZ tab through the response cache and decode it.
pub fn fetch_table(client: &Client, source: &SheetSource) -> Result<GvizTable> {
    let body = fetch_text_cached(client, &source.gviz_url(), source.ttl, &[REVALIDATE_TAG])
        .with_context(|| format!("fetching {} sheet", source.domain.key()))?;
    gviz::parse_gviz(&body)
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct SheetCacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    body: String,
    fetched_at: u64,
    ttl_secs: u64,
    tags: Vec<String>,
}

impl CacheEntry {
    fn is_fresh(&self, now: u64) -> bool {
        now.saturating_sub(self.fetched_at) < self.ttl_secs
    }
}

/// TTL-cached GET. A fresh cache entry short-circuits the request entirely;
/// a stale or missing one refetches and replaces the entry. Fetch failures
/// propagate — there is no stale-serving fallback.
pub fn fetch_text_cached(
    client: &Client,
    url: &str,
    ttl: Duration,
    tags: &[&str],
) -> Result<String> {
    let now = unix_now();
    {
        let mut guard = CACHE.lock().expect("sheet cache lock poisoned");
        let cache = guard.get_or_insert_with(load_cache_file);
        if let Some(entry) = cache.entries.get(url) {
            if entry.is_fresh(now) {
                return Ok(entry.body.clone());
            }
        }
    }

    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        anyhow::bail!("http {status}: {body}");
    }

    let entry = CacheEntry {
        body: body.clone(),
        fetched_at: now,
        ttl_secs: ttl.as_secs(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
    };
    store_entry(url, entry);
    Ok(body)
}

/// Drop every cache entry carrying `tag`. Returns how many were removed.
pub fn purge_tag(tag: &str) -> usize {
    let mut guard = CACHE.lock().expect("sheet cache lock poisoned");
    let cache = guard.get_or_insert_with(load_cache_file);
    let before = cache.entries.len();
    cache.entries.retain(|_, entry| !entry.tags.iter().any(|t| t == tag));
    let removed = before - cache.entries.len();
    if removed > 0 {
        let _ = save_cache_file(cache);
    }
    removed
}

fn store_entry(url: &str, entry: CacheEntry) {
    let mut guard = CACHE.lock().expect("sheet cache lock poisoned");
    let cache = guard.get_or_insert_with(load_cache_file);
    cache.version = CACHE_VERSION;
    cache.entries.insert(url.to_string(), entry);
    let _ = save_cache_file(cache);
}

fn load_cache_file() -> SheetCacheFile {
    let Some(path) = cache_path() else {
        return SheetCacheFile::default();
    };
    let Some(raw) = fs::read_to_string(path).ok() else {
        return SheetCacheFile::default();
    };
    let cache = serde_json::from_str::<SheetCacheFile>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return SheetCacheFile::default();
    }
    cache
}

fn save_cache_file(cache: &SheetCacheFile) -> Result<()> {
    let Some(path) = cache_path() else {
        return Ok(());
    };
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir).ok();
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize sheet cache")?;
    fs::write(&tmp, json).context("write sheet cache")?;
    fs::rename(&tmp, &path).context("swap sheet cache")?;
    Ok(())
}

/// Per-user cache directory, also used for downloaded images.
pub fn cache_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn cache_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(CACHE_FILE))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
