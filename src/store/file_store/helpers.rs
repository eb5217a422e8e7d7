// SPDX-FileCopyrightText: 2026 LinkShop contributors
// SPDX-License-Identifier: MIT
//
// This file is part of LinkShop.
// See the LICENSE file at the repository root for the full license text.

// Content detection, record reads, name encoding and safe writes for `FileStore`.

/// Classifies uploaded content by shape.
///
/// - commands: a list whose first item is an object with `ts` and `cmd`
/// - linkograph: the backend array form (string label header, then three-item rows), the typed
///   `{nodes, links}` document, or rendered markup
/// - ontology / abstraction: an object of lists, judged by the first item of its longest list
pub fn detect_file_type(content: &str) -> Option<FileType> {
    match serde_json::from_str::<Value>(content) {
        Ok(value) => detect_json_file_type(&value),
        Err(_) => detect_markup(content),
    }
}

fn detect_json_file_type(value: &Value) -> Option<FileType> {
    match value {
        Value::Array(items) => match items.first()? {
            Value::Object(first) => (first.contains_key("ts") && first.contains_key("cmd"))
                .then_some(FileType::Commands),
            Value::Array(labels) => {
                if labels.is_empty() || !labels.iter().all(Value::is_string) {
                    return None;
                }
                items[1..]
                    .iter()
                    .all(|row| row.as_array().is_some_and(|row| row.len() == 3))
                    .then_some(FileType::Linkograph)
            }
            _ => None,
        },
        Value::Object(map) => {
            if is_typed_linkograph(map) {
                return Some(FileType::Linkograph);
            }
            let mut longest: &[Value] = &[];
            for entry in map.values() {
                let list = entry.as_array()?;
                if list.len() > longest.len() {
                    longest = list;
                }
            }
            match longest.first()? {
                Value::String(_) => Some(FileType::Ontology),
                Value::Object(entry) if entry.contains_key("command") => {
                    Some(FileType::Abstraction)
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn is_typed_linkograph(map: &Map<String, Value>) -> bool {
    map.len() == 2
        && map.contains_key("nodes")
        && map.contains_key("links")
        && serde_json::from_value::<Linkograph>(Value::Object(map.clone())).is_ok()
}

fn detect_markup(content: &str) -> Option<FileType> {
    if !content.trim_start().starts_with("<svg") {
        return None;
    }
    let reader = MarkupReader::new().ok()?;
    reader
        .looks_like_linkograph(content)
        .then_some(FileType::Linkograph)
}

fn read_record_at(path: &Path) -> Result<FileRecord, StoreError> {
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Maps a file name to something every platform accepts as a path segment.
///
/// Unsafe names become `~` followed by the lowercase hex of their UTF-8 bytes; the `~` prefix
/// is reserved so encoded and plain names never collide.
fn encode_persisted_name_segment(segment: &str) -> String {
    if !needs_safe_filename_segment_encoding(segment) {
        return segment.to_owned();
    }

    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(1 + segment.len().saturating_mul(2));
    out.push('~');
    for &b in segment.as_bytes() {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

fn needs_safe_filename_segment_encoding(segment: &str) -> bool {
    if segment.is_empty() || segment.starts_with('~') || segment.starts_with('.') {
        return true;
    }
    if segment.ends_with(' ') || segment.ends_with('.') {
        return true;
    }

    let trimmed = segment.trim_end_matches([' ', '.']);
    let base = trimmed.split('.').next().unwrap_or(trimmed);
    if is_windows_device_name(base) {
        return true;
    }

    segment.chars().any(|ch| {
        matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
            || ch <= '\u{1f}'
            || ch == '\u{7f}'
    })
}

fn is_windows_device_name(base: &str) -> bool {
    let base = base.to_ascii_uppercase();
    match base.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => base
            .strip_prefix("COM")
            .or_else(|| base.strip_prefix("LPT"))
            .is_some_and(|num| matches!(num, "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9")),
    }
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

fn write_atomic(path: &Path, contents: &[u8], durability: WriteDurability) -> Result<(), StoreError> {
    let Some(parent) = path.parent() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no parent"),
        });
    };
    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    fs::create_dir_all(parent).map_err(|source| StoreError::Io {
        path: parent.to_path_buf(),
        source,
    })?;

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        "{TEMP_PREFIX}{}.{nanos}",
        file_name.to_string_lossy()
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    file.write_all(contents).map_err(|source| StoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;

    if durability == WriteDurability::Durable {
        file.sync_all().map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    }
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}
