// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

//! LinkShop relay entrypoint.
//!
//! Serves the editor relay over WebSocket at `ws://<listen>/ws`, backed by a file store
//! folder.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LISTEN: &str = "127.0.0.1:9090";
const DEFAULT_STORE_DIR: &str = "./linkshop-store";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<store-dir>] [--listen <addr>] [--durable-writes] [--allow-origin <origin>]...\n  {program} [--store <dir>] [--listen <addr>] [--durable-writes] [--allow-origin <origin>]...\n\nServes the relay at `ws://<addr>/ws` (default {DEFAULT_LISTEN}).\nIf store-dir/--store is omitted, {DEFAULT_STORE_DIR} is used.\n\n--allow-origin restricts WebSocket upgrades to the given Origin values (repeatable; default: any).\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\n\nLog verbosity follows RUST_LOG (default info)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    listen: Option<SocketAddr>,
    store_dir: Option<String>,
    durable_writes: bool,
    allow_origins: Vec<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--listen" => {
                if options.listen.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let addr: SocketAddr = raw.parse().map_err(|_| ())?;
                options.listen = Some(addr);
            }
            "--store" => {
                if options.store_dir.is_some() {
                    return Err(());
                }
                let dir = args.next().ok_or(())?;
                options.store_dir = Some(dir);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            "--allow-origin" => {
                let origin = args.next().ok_or(())?;
                if origin.is_empty() || options.allow_origins.contains(&origin) {
                    return Err(());
                }
                options.allow_origins.push(origin);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.store_dir.is_some() {
                    return Err(());
                }
                options.store_dir = Some(arg);
            }
        }
    }

    Ok(options)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler the server runs until killed.
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "linkshop".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
            .init();

        let listen = match options.listen {
            Some(addr) => addr,
            None => DEFAULT_LISTEN.parse()?,
        };
        let dir = options
            .store_dir
            .unwrap_or_else(|| DEFAULT_STORE_DIR.to_owned());
        let store = if options.durable_writes {
            linkshop::store::FileStore::new(&dir)
                .with_durability(linkshop::store::WriteDurability::Durable)
        } else {
            linkshop::store::FileStore::new(&dir)
        };
        info!(store = %dir, durable = options.durable_writes, "file store ready");

        let backend = Arc::new(linkshop::backend::FolderBackend::new(store));
        let state = linkshop::relay::RelayState::new(backend)
            .with_allowed_origins(options.allow_origins);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(listen).await?;
            linkshop::relay::serve(listener, state, shutdown_signal()).await?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("linkshop: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values
            .iter()
            .map(|value| (*value).to_owned())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_listen_addr() {
        let options = parse_options(args(&["--listen", "0.0.0.0:8080"])).expect("parse options");
        assert_eq!(options.listen, Some("0.0.0.0:8080".parse().unwrap()));
        assert!(options.store_dir.is_none());
    }

    #[test]
    fn rejects_invalid_listen_addr() {
        assert!(parse_options(args(&["--listen", "localhost"])).is_err());
        assert!(parse_options(args(&["--listen"])).is_err());
    }

    #[test]
    fn parses_store_dir() {
        let options = parse_options(args(&["--store", "some/dir"])).expect("parse options");
        assert_eq!(options.store_dir.as_deref(), Some("some/dir"));
    }

    #[test]
    fn parses_positional_store_dir() {
        let options =
            parse_options(args(&["some/dir", "--durable-writes"])).expect("parse options");
        assert_eq!(options.store_dir.as_deref(), Some("some/dir"));
        assert!(options.durable_writes);
    }

    #[test]
    fn collects_repeated_origins() {
        let options = parse_options(args(&[
            "--allow-origin",
            "http://localhost:3000",
            "--allow-origin",
            "http://127.0.0.1:3000",
        ]))
        .expect("parse options");
        assert_eq!(
            options.allow_origins,
            vec!["http://localhost:3000", "http://127.0.0.1:3000"]
        );
    }

    #[test]
    fn rejects_unknown_args() {
        assert!(parse_options(args(&["--nope"])).is_err());
    }

    #[test]
    fn rejects_duplicate_flags() {
        assert!(parse_options(args(&["--durable-writes", "--durable-writes"])).is_err());
        assert!(parse_options(args(&["--listen", "127.0.0.1:1", "--listen", "127.0.0.1:2"]))
            .is_err());
        assert!(parse_options(args(&["--allow-origin", "a", "--allow-origin", "a"])).is_err());
    }

    #[test]
    fn rejects_multiple_store_dirs() {
        assert!(parse_options(args(&["a", "b"])).is_err());
        assert!(parse_options(args(&["--store", "a", "b"])).is_err());
        assert!(parse_options(args(&["--store"])).is_err());
    }
}
