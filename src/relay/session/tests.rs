// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use rstest::{fixture, rstest};
use serde_json::{json, Value};

use super::{parse_request, RelaySession};
use crate::backend::{
    Backend, BackendError, FolderBackend, LinkoRequest, LoadedFile, Refinement,
};
use crate::model::fixtures::{abstraction_shell, ontology_shell};
use crate::model::Linkograph;
use crate::relay::{RelayError, ServerMessage};
use crate::store::{FileStore, FileType};

const SESSION: &str = r#"[
    {"ts": "10:00", "cmd": "cd src"},
    {"ts": "10:01", "cmd": "vim main.rs"},
    {"ts": "10:02", "cmd": "make"}
]"#;

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("linkshop-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Folder backend plus canned analysis answers, recording refinement requests.
struct AnalysisBackend {
    folder: FolderBackend,
    refinements: Mutex<Vec<(String, String, Option<u64>)>>,
}

impl Backend for AnalysisBackend {
    fn file_list(&self, file_type: FileType) -> Result<Vec<String>, BackendError> {
        self.folder.file_list(file_type)
    }

    fn save_file(&self, name: &str, content: &str) -> Result<String, BackendError> {
        self.folder.save_file(name, content)
    }

    fn load_file(&self, name: &str, file_type: &str) -> Result<LoadedFile, BackendError> {
        self.folder.load_file(name, file_type)
    }

    fn create_linko(&self, request: &LinkoRequest) -> Result<String, BackendError> {
        self.folder.create_linko(request)
    }

    fn draw_linko(&self, name: &str) -> Result<Linkograph, BackendError> {
        self.folder.draw_linko(name)
    }

    fn perform_ontology_refinement(
        &self,
        linkograph: &str,
        ontology: &str,
        max_changes: Option<u64>,
    ) -> Result<Refinement, BackendError> {
        self.refinements.lock().unwrap().push((
            linkograph.to_owned(),
            ontology.to_owned(),
            max_changes,
        ));
        Ok(Refinement {
            o_prime: ontology_shell(),
            accuracy_prime: 0.87,
        })
    }

    fn get_stats(&self, name: &str, low: usize, high: usize) -> Result<Value, BackendError> {
        Ok(json!({
            "fileName": name,
            "startRange": low,
            "stopRange": high,
            "nodes": high - low + 1
        }))
    }
}

struct RelayTestCtx {
    _tmp: TempDir,
    backend: Arc<AnalysisBackend>,
    session: RelaySession,
}

#[fixture]
fn ctx() -> RelayTestCtx {
    let tmp = TempDir::new("relay");
    let folder = FolderBackend::new(FileStore::new(tmp.path.join("store")));
    folder.save_file("session", SESSION).unwrap();
    folder
        .save_file("shell", &serde_json::to_string(&ontology_shell()).unwrap())
        .unwrap();
    folder
        .save_file("shell", &serde_json::to_string(&abstraction_shell()).unwrap())
        .unwrap();
    let backend = Arc::new(AnalysisBackend {
        folder,
        refinements: Mutex::new(Vec::new()),
    });
    let session = RelaySession::new(backend.clone());
    RelayTestCtx {
        _tmp: tmp,
        backend,
        session,
    }
}

fn send(ctx: &RelayTestCtx, request: Value) -> Vec<Value> {
    ctx.session
        .handle(&request.to_string())
        .iter()
        .map(|message| serde_json::to_value(message).unwrap())
        .collect()
}

fn error(command: &str, err: &str) -> Value {
    json!({"command": command, "err": err})
}

#[rstest]
fn greets_with_the_file_lists(ctx: RelayTestCtx) {
    let greeting: Vec<Value> = ctx
        .session
        .greeting()
        .iter()
        .map(|message| serde_json::to_value(message).unwrap())
        .collect();
    assert_eq!(
        greeting,
        vec![json!({
            "command": "saveFile",
            "err": "",
            "res": "",
            "commands": ["session"],
            "ontology": ["shell"],
            "abstraction": ["shell"],
            "linkograph": []
        })]
    );
}

#[rstest]
fn save_answers_with_refreshed_lists(ctx: RelayTestCtx) {
    let replies = send(
        &ctx,
        json!({"command": "saveFile", "name": "other", "data": SESSION.replace("make", "ls")}),
    );
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["res"], "File other saved as type commands");
    assert_eq!(replies[0]["commands"], json!(["other", "session"]));

    let replies = send(&ctx, json!({"command": "saveFile", "name": "session", "data": SESSION}));
    assert_eq!(replies[0]["res"], "We already have session");
}

#[rstest]
fn save_reports_store_failures(ctx: RelayTestCtx) {
    assert_eq!(
        send(&ctx, json!({"command": "saveFile", "name": "notes", "data": "hello"})),
        vec![error("saveFile", "File type Unknown file not found!")]
    );
    assert_eq!(
        send(&ctx, json!({"command": "saveFile", "data": SESSION})),
        vec![error("saveFile", "File missing!")]
    );
}

#[rstest]
fn loads_files(ctx: RelayTestCtx) {
    let replies = send(
        &ctx,
        json!({"command": "loadFile", "fileName": "session", "fileType": "commands"}),
    );
    assert_eq!(
        replies,
        vec![json!({
            "command": "loadFile",
            "err": "",
            "res": "session of type commands loaded",
            "data": SESSION,
            "type": "commands"
        })]
    );

    let replies = send(
        &ctx,
        json!({"command": "loadFile", "fileName": "ghost", "fileType": "ontology"}),
    );
    assert_eq!(replies, vec![error("loadFile", "File ghost not found!")]);
}

#[rstest]
fn create_draws_and_refreshes(ctx: RelayTestCtx) {
    let replies = send(
        &ctx,
        json!({
            "command": "createLinko",
            "commands": "session",
            "ontology": "shell",
            "abstraction": "shell",
            "linkograph": null
        }),
    );
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["command"], "createLinko");
    assert_eq!(replies[0]["data"]["links"], json!([[0, 1], [1, 2]]));
    assert_eq!(replies[0]["data"]["nodes"][2]["command"], "make");
    assert_eq!(replies[1]["linkograph"], json!(["sessionshellshell"]));
}

#[rstest]
fn create_validates_before_building(ctx: RelayTestCtx) {
    let replies = send(
        &ctx,
        json!({
            "command": "createLinko",
            "commands": "session",
            "ontology": "",
            "abstraction": "shell"
        }),
    );
    assert_eq!(replies, vec![error("createLinko", "Files missing!")]);

    // A failing build still refreshes the lists.
    let replies = send(
        &ctx,
        json!({
            "command": "createLinko",
            "commands": "ghost",
            "ontology": "shell",
            "abstraction": "shell"
        }),
    );
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0], error("createLinko", "File ghost not found!"));
    assert_eq!(replies[1]["command"], "saveFile");
}

#[rstest]
fn draw_requires_a_name(ctx: RelayTestCtx) {
    assert_eq!(
        send(&ctx, json!({"command": "drawLinko", "linkograph": ""})),
        vec![error("drawLinko", "Files missing!")]
    );
    assert_eq!(
        send(&ctx, json!({"command": "drawLinko", "linkograph": "ghost"})),
        vec![error("drawLinko", "File ghost not found!")]
    );
}

#[rstest]
fn refinement_forwards_the_change_budget(ctx: RelayTestCtx) {
    assert_eq!(
        send(&ctx, json!({"command": "performOntologyRefinement", "linkograph": "[]"})),
        vec![error("performOntologyRefinement", "Files missing!")]
    );

    let replies = send(
        &ctx,
        json!({
            "command": "performOntologyRefinement",
            "linkograph": "[{\"Build\": [1]}]",
            "ontology": "shell",
            "max_changes": "4"
        }),
    );
    assert_eq!(replies[0]["data"]["accuracy_prime"], json!(0.87));
    assert_eq!(replies[0]["data"]["o_prime"]["Navigate"], json!(["Edit"]));
    assert_eq!(
        ctx.backend.refinements.lock().unwrap().as_slice(),
        &[("[{\"Build\": [1]}]".to_owned(), "shell".to_owned(), Some(4))]
    );
}

#[rstest]
fn stats_validate_the_range(ctx: RelayTestCtx) {
    assert_eq!(
        send(&ctx, json!({"command": "getStats", "startRange": 0, "stopRange": 1})),
        vec![error("getStats", "File missing!")]
    );
    for (start, stop) in [(json!("0"), json!(1)), (json!(3), json!(1)), (json!(-1), json!(1))] {
        let request = json!({
            "command": "getStats",
            "fileName": "l",
            "startRange": start,
            "stopRange": stop
        });
        assert_eq!(send(&ctx, request), vec![error("getStats", "Invalid range!")]);
    }

    let replies = send(
        &ctx,
        json!({"command": "getStats", "fileName": "l", "startRange": 1, "stopRange": 3}),
    );
    assert_eq!(replies[0]["command"], "getStats");
    assert_eq!(replies[0]["err"], "");
    assert_eq!(
        replies[0]["data"],
        json!({"fileName": "l", "startRange": 1, "stopRange": 3, "nodes": 3})
    );
}

#[rstest]
fn unknown_commands_are_reported_with_a_refresh(ctx: RelayTestCtx) {
    let replies = send(&ctx, json!({"command": "frobnicate"}));
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0], error("frobnicate", "Command 'frobnicate' unknown"));
    assert_eq!(replies[1]["command"], "saveFile");
}

#[rstest]
fn malformed_frames_get_one_error(ctx: RelayTestCtx) {
    let replies: Vec<ServerMessage> = ctx.session.handle("not json");
    assert_eq!(replies.len(), 1);
    assert!(replies[0].is_error());

    let replies = send(&ctx, json!({"command": "drawLinko", "linkograph": 7}));
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["command"], "drawLinko");
}

#[test]
fn parses_known_commands_only() {
    assert!(matches!(
        parse_request(r#"{"command": 3}"#),
        Err(RelayError::UnknownCommand { ref name }) if name == "3"
    ));
    assert!(matches!(
        parse_request(r#"{"name": "x"}"#),
        Err(RelayError::UnknownCommand { ref name }) if name.is_empty()
    ));
    assert!(parse_request(r#"{"command": "drawLinko", "linkograph": "x"}"#).is_ok());
}

#[test]
fn folder_backend_answers_analysis_with_errors() {
    let tmp = TempDir::new("relay-folder");
    let session = RelaySession::new(Arc::new(FolderBackend::new(FileStore::new(&tmp.path))));
    let replies = session.handle(
        &json!({"command": "getStats", "fileName": "l", "startRange": 0, "stopRange": 0})
            .to_string(),
    );
    assert_eq!(
        serde_json::to_value(&replies[0]).unwrap(),
        error("getStats", "getStats is not provided by this backend")
    );
}
