use std::collections::HashMap;
use std::env;
use std::fs;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use reqwest::blocking::Client;

use crate::demo;
use crate::feves::fetch_feves;
use crate::heroes::fetch_heroes;
use crate::http_client::http_client;
use crate::players::fetch_players;
use crate::relay::{handle_image_relay, RelayBody};
use crate::revalidate::handle_revalidate;
use crate::sheets::{self, Domain, SheetSource};
use crate::state::{Delta, ProviderCommand};
use crate::techniques::{fetch_techniques, TechniqueKind};
use crate::text::slugify;
use crate::tokens::fetch_tokens;

/// All outbound HTTP lives on this one thread. Each domain is fetched
/// independently; a failure surfaces as a per-domain error delta plus a
/// console warning and never degrades the other directories.
pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        if demo::is_offline() {
            run_offline(&tx, cmd_rx);
        } else {
            run_online(&tx, cmd_rx);
        }
    });
}

fn run_offline(tx: &Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    let _ = tx.send(Delta::Log("[INFO] offline mode: seeded demo records".to_string()));
    for delta in demo::seed_deltas() {
        if tx.send(delta).is_err() {
            return;
        }
    }
    // Commands still drain so keybindings stay responsive.
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            ProviderCommand::Revalidate => {
                let _ = tx.send(Delta::Log("[INFO] offline mode: nothing to revalidate".to_string()));
            }
            ProviderCommand::FetchImage { .. } => {
                let _ = tx.send(Delta::Log("[WARN] offline mode: image fetch unavailable".to_string()));
            }
        }
    }
}

fn run_online(tx: &Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    let client = match http_client() {
        Ok(client) => client,
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] http client unavailable: {err}")));
            return;
        }
    };
    let secret = env::var("REVALIDATE_SECRET").ok();

    let sources: Vec<SheetSource> = Domain::ALL.into_iter().map(sheets::source).collect();
    let mut last_fetch: HashMap<Domain, Instant> = HashMap::new();

    for source in &sources {
        fetch_domain(tx, client, source);
        last_fetch.insert(source.domain, Instant::now());
    }

    loop {
        thread::sleep(Duration::from_millis(900));

        // TTL-driven revalidation, one domain at a time.
        for source in &sources {
            let stale = last_fetch
                .get(&source.domain)
                .map(|at| at.elapsed() >= source.ttl)
                .unwrap_or(true);
            if stale {
                fetch_domain(tx, client, source);
                last_fetch.insert(source.domain, Instant::now());
            }
        }

        loop {
            match cmd_rx.try_recv() {
                Ok(ProviderCommand::Revalidate) => {
                    let resp = handle_revalidate(secret.as_deref(), secret.as_deref());
                    if resp.is_success() {
                        let _ = tx.send(Delta::Log("[INFO] cache tag purged, refetching".to_string()));
                        for source in &sources {
                            fetch_domain(tx, client, source);
                            last_fetch.insert(source.domain, Instant::now());
                        }
                    } else {
                        let _ = tx.send(Delta::Log(format!(
                            "[WARN] revalidation rejected (http {})",
                            resp.status
                        )));
                    }
                }
                Ok(ProviderCommand::FetchImage { name, src }) => {
                    match download_image(client, &name, &src) {
                        Ok(path) => {
                            let _ = tx.send(Delta::Log(format!("[INFO] image saved: {path}")));
                        }
                        Err(err) => {
                            let _ = tx.send(Delta::Log(format!("[WARN] image fetch failed: {err}")));
                        }
                    }
                }
                Err(std::sync::mpsc::TryRecvError::Empty) => break,
                // The UI side hung up; nothing left to feed.
                Err(std::sync::mpsc::TryRecvError::Disconnected) => return,
            }
        }
    }
}

fn fetch_domain(tx: &Sender<Delta>, client: &Client, source: &SheetSource) {
    let domain = source.domain;
    let outcome: Result<(Delta, Vec<String>, usize)> = match domain {
        Domain::Offensive | Domain::Defensive | Domain::Keeper | Domain::Shots => {
            let kind = match domain {
                Domain::Offensive => TechniqueKind::Offensive,
                Domain::Defensive => TechniqueKind::Defensive,
                Domain::Keeper => TechniqueKind::Keeper,
                _ => TechniqueKind::Shot,
            };
            fetch_techniques(client, source, kind).map(|o| {
                let count = o.records.len();
                (Delta::SetTechniques { domain, records: o.records }, o.notes, count)
            })
        }
        Domain::Tokens => fetch_tokens(client, source).map(|o| {
            let count = o.records.len();
            (Delta::SetTokens(o.records), o.notes, count)
        }),
        Domain::Feves => fetch_feves(client, source).map(|o| {
            let count = o.records.len();
            (Delta::SetFeves(o.records), o.notes, count)
        }),
        Domain::Heroes => fetch_heroes(client, source).map(|o| {
            let count = o.records.len();
            (Delta::SetHeroes(o.records), o.notes, count)
        }),
        Domain::Players => fetch_players(client, source).map(|o| {
            let count = o.records.len();
            (Delta::SetPlayers(o.records), o.notes, count)
        }),
    };

    match outcome {
        Ok((delta, notes, count)) => {
            for note in notes {
                let _ = tx.send(Delta::Log(note));
            }
            let _ = tx.send(delta);
            let _ = tx.send(Delta::Log(format!("[INFO] {}: {count} records", domain.key())));
        }
        Err(err) => {
            let _ = tx.send(Delta::FetchFailed { domain, error: err.to_string() });
            let _ = tx.send(Delta::Log(format!("[WARN] {} fetch error: {err}", domain.key())));
        }
    }
}

/// Download one record image through the relay handler and drop it in the
/// cache directory.
fn download_image(client: &Client, name: &str, src: &str) -> Result<String> {
    let resp = handle_image_relay(client, Some(src));
    if !resp.is_success() {
        anyhow::bail!("relay returned http {}", resp.status);
    }
    let RelayBody::Bytes(bytes) = resp.body else {
        anyhow::bail!("relay returned no image body");
    };

    let Some(dir) = sheets::cache_dir().map(|d| d.join("images")) else {
        anyhow::bail!("no cache directory available");
    };
    fs::create_dir_all(&dir)?;

    let ext = match resp.content_type.as_str() {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    };
    let stem = slugify(name);
    let stem = if stem.is_empty() { "image".to_string() } else { stem };
    let path = dir.join(format!("{stem}.{ext}"));
    fs::write(&path, bytes)?;
    Ok(path.display().to_string())
}
