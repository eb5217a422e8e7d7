// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use linkshop::backend::{Backend, FolderBackend};
use linkshop::layout::Surface;
use linkshop::ops::{OntologyOp, Op};
use linkshop::relay::{ClientMessage, RelaySession, ServerMessage};
use linkshop::store::{FileStore, FileType};
use linkshop::sublinkograph::SelectionChange;
use linkshop::workspace::{Notice, Workspace};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!("linkshop_it_{prefix}_{pid}_{nanos}_{counter}"));
        std::fs::create_dir_all(&path).expect("create temp dir");

        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/relay_session")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|err| panic!("read {path:?}: {err}"))
}

/// One editor connected to one relay session; replies are applied and follow-ups sent
/// until the exchange settles.
struct Client {
    _tmp: TempDir,
    session: RelaySession,
    workspace: Workspace,
}

impl Client {
    fn connect(prefix: &str) -> Self {
        let tmp = TempDir::new(prefix);
        let store = FileStore::new(tmp.path().join("store"));
        let session = RelaySession::new(Arc::new(FolderBackend::new(store)));
        let mut client = Self {
            _tmp: tmp,
            session,
            workspace: Workspace::new(Surface::new(640.0, 480.0)),
        };
        let greeting = client.session.greeting();
        let follow_ups = client.receive(&greeting);
        client.pump(follow_ups);
        client
    }

    fn receive(&mut self, replies: &[ServerMessage]) -> Vec<ClientMessage> {
        replies
            .iter()
            .flat_map(|reply| self.workspace.apply(reply))
            .collect()
    }

    fn send(&mut self, request: ClientMessage) -> Vec<ServerMessage> {
        let replies = self.session.dispatch(request);
        let follow_ups = self.receive(&replies);
        self.pump(follow_ups);
        replies
    }

    fn pump(&mut self, requests: Vec<ClientMessage>) {
        let mut queue: VecDeque<ClientMessage> = requests.into();
        let mut budget = 64;
        while let Some(request) = queue.pop_front() {
            budget -= 1;
            assert!(budget > 0, "relay exchange does not settle");
            let replies = self.session.dispatch(request);
            queue.extend(self.receive(&replies));
        }
    }

    fn upload(&mut self, name: &str, fixture_name: &str) -> Vec<ServerMessage> {
        let request = self.workspace.save_file_request(name, &fixture(fixture_name));
        self.send(request)
    }
}

fn uploaded(prefix: &str) -> Client {
    let mut client = Client::connect(prefix);
    client.upload("session", "session.json");
    client.upload("shell", "shell_ontology.json");
    client.upload("shell", "shell_abstraction.json");
    client.workspace.take_notices();
    client
}

#[test]
fn greeting_lists_an_empty_store() {
    let client = Client::connect("greeting");
    let lists = client.workspace.lists();
    assert!(lists.commands.is_empty());
    assert!(lists.ontology.is_empty());
    assert!(lists.abstraction.is_empty());
    assert!(lists.linkograph.is_empty());
    assert!(client.workspace.notices().is_empty());
}

#[test]
fn uploads_are_typed_listed_and_loaded() {
    let mut client = Client::connect("uploads");
    let replies = client.upload("session", "session.json");
    assert!(matches!(
        replies.as_slice(),
        [ServerMessage::Lists { res, .. }] if res == "File session saved as type commands"
    ));
    client.upload("shell", "shell_ontology.json");
    client.upload("shell", "shell_abstraction.json");

    let ws = &client.workspace;
    assert_eq!(ws.lists().commands, vec!["session"]);
    assert_eq!(ws.lists().ontology, vec!["shell"]);
    assert_eq!(ws.lists().abstraction, vec!["shell"]);
    assert_eq!(ws.chosen().get(FileType::Ontology), Some("shell"));

    // The list refresh loads the chosen documents into the editors.
    let ontology = ws.documents().ontology();
    assert_eq!(ontology.node_count(), 3);
    assert_eq!(ontology.edge_count(), 4);
    assert!(ws.documents().abstraction().to_document().is_some());

    let again = client.upload("session", "session.json");
    assert!(matches!(
        again.as_slice(),
        [ServerMessage::Lists { res, .. }] if res == "We already have session"
    ));
}

#[test]
fn created_linkograph_is_drawn_and_named() {
    let mut client = uploaded("create");
    let request = client.workspace.create_linko_request(None);
    let replies = client.send(request);
    assert_eq!(replies.len(), 2);
    assert!(matches!(replies[1], ServerMessage::Lists { .. }));

    let ws = &client.workspace;
    assert_eq!(ws.linkograph_name(), Some("sessionshellshell"));
    assert_eq!(ws.lists().linkograph, vec!["sessionshellshell"]);

    let linkograph = ws.documents().linkograph();
    assert_eq!(linkograph.len(), 5);
    let links: Vec<(usize, usize)> = linkograph
        .links()
        .map(|link| (link.source(), link.target()))
        .collect();
    assert_eq!(links, vec![(0, 1), (1, 2), (2, 4)]);
    assert_eq!(
        linkograph.node(1).and_then(|node| node.command.as_deref()),
        Some("vim main.rs")
    );
    assert_eq!(
        linkograph.node(3).map(|node| node.labels.clone()),
        Some(vec!["NoLabel".to_owned()])
    );
}

#[test]
fn exported_range_asks_for_statistics() {
    let mut client = uploaded("stats");
    let request = client.workspace.create_linko_request(Some("morning"));
    client.send(request);
    assert_eq!(client.workspace.linkograph_name(), Some("morning"));

    assert_eq!(client.workspace.linkograph_click(Some(1)), SelectionChange::Anchored(1));
    assert!(matches!(
        client.workspace.linkograph_click(Some(4)),
        SelectionChange::Selected(_)
    ));
    let slot = client.workspace.export_selection("after cd").expect("export");
    let entry = client.workspace.board().get(slot).expect("board entry");
    assert_eq!(entry.source(), "morning");
    assert_eq!(entry.extraction().linkograph().len(), 4);
    assert_eq!(entry.extraction().linkograph().link_count(), 2);

    let request = client.workspace.stats_request(slot).expect("stats request");
    client.send(request);
    let notices = client.workspace.take_notices();
    assert_eq!(
        notices,
        vec![
            Notice::Info("after cd created on the analyze tab.".to_owned()),
            Notice::Error {
                command: "getStats".to_owned(),
                message: "getStats is not provided by this backend".to_owned(),
            },
        ]
    );
}

#[test]
fn edited_ontology_is_saved_back() {
    let mut client = uploaded("edit");
    let rev = client.workspace.documents().rev();
    client
        .workspace
        .apply_ops(
            rev,
            &[Op::Ontology(OntologyOp::AddEdge {
                source: "Build".to_owned(),
                target: "Edit".to_owned(),
            })],
        )
        .expect("add edge");

    let request = client.workspace.save_ontology_request("edited").expect("save request");
    client.send(request);
    assert_eq!(client.workspace.lists().ontology, vec!["edited", "shell"]);
    assert_eq!(client.workspace.chosen().get(FileType::Ontology), Some("shell"));
    assert_eq!(
        client.workspace.take_notices(),
        vec![Notice::Info("File edited saved as type ontology".to_owned())]
    );

    let record = client
        .session
        .backend()
        .load_file("edited", "ontology")
        .expect("load edited");
    let saved: serde_json::Value = serde_json::from_str(&record.content).expect("json");
    let mut targets: Vec<&str> = saved["Build"]
        .as_array()
        .expect("Build targets")
        .iter()
        .filter_map(serde_json::Value::as_str)
        .collect();
    targets.sort_unstable();
    assert_eq!(targets, vec!["Edit", "Navigate"]);
}

#[test]
fn missing_inputs_and_unknown_commands_are_reported() {
    let mut client = Client::connect("errors");
    let request = client.workspace.create_linko_request(None);
    let replies = client.send(request);
    assert_eq!(replies, vec![ServerMessage::error("createLinko", "Files missing!")]);

    let replies = client.session.handle(r#"{"command":"dance"}"#);
    assert_eq!(replies.len(), 2);
    assert!(replies[0].is_error());
    assert!(matches!(replies[1], ServerMessage::Lists { .. }));
    let follow_ups = client.receive(&replies);
    assert!(follow_ups.is_empty());
    assert_eq!(
        client.workspace.take_notices(),
        vec![
            Notice::Error {
                command: "createLinko".to_owned(),
                message: "Files missing!".to_owned(),
            },
            Notice::Error {
                command: "dance".to_owned(),
                message: "Command 'dance' unknown".to_owned(),
            },
        ]
    );
}
