// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Node.js `fs` module implementation
//!
//! Synchronous API only. Data is exchanged as UTF-8 text; OS failures are
//! thrown as errno exceptions naming the syscall and path involved.

use crate::engine::{HostEngine, args, define_function, settle};
use crate::errno;
use crate::error::{Exception, NodeError, ScriptResult};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Create the fs module exports
pub fn create_module<E: HostEngine>(engine: &mut E) -> ScriptResult<E::Value, E::Value> {
    let exports = engine.new_object();

    define_function(engine, &exports, "existsSync", 1, js_exists_sync::<E>)?;
    define_function(engine, &exports, "readFileSync", 2, js_read_file_sync::<E>)?;
    define_function(engine, &exports, "writeFileSync", 2, js_write_file_sync::<E>)?;
    define_function(engine, &exports, "appendFileSync", 2, js_append_file_sync::<E>)?;
    define_function(engine, &exports, "mkdirSync", 2, js_mkdir_sync::<E>)?;
    define_function(engine, &exports, "readdirSync", 1, js_readdir_sync::<E>)?;
    define_function(engine, &exports, "unlinkSync", 1, js_unlink_sync::<E>)?;
    define_function(engine, &exports, "rmdirSync", 2, js_rmdir_sync::<E>)?;
    define_function(engine, &exports, "renameSync", 2, js_rename_sync::<E>)?;
    define_function(engine, &exports, "realpathSync", 1, js_realpath_sync::<E>)?;

    Ok(exports)
}

// ============================================================================
// Synchronous API
// ============================================================================

/// fs.existsSync(path)
pub fn exists_sync(path: &str) -> bool {
    Path::new(path).exists()
}

/// fs.readFileSync(path, 'utf8')
pub fn read_file_sync(path: &str) -> io::Result<String> {
    let content = fs::read(path)?;
    Ok(String::from_utf8_lossy(&content).into_owned())
}

/// fs.writeFileSync(path, data)
pub fn write_file_sync(path: &str, data: &str) -> io::Result<()> {
    fs::write(path, data)
}

/// fs.appendFileSync(path, data)
pub fn append_file_sync(path: &str, data: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(data.as_bytes())
}

/// fs.mkdirSync(path, { recursive })
pub fn mkdir_sync(path: &str, recursive: bool) -> io::Result<()> {
    if recursive {
        fs::create_dir_all(path)
    } else {
        fs::create_dir(path)
    }
}

/// fs.readdirSync(path), entry names sorted
pub fn readdir_sync(path: &str) -> io::Result<Vec<String>> {
    let mut names = fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}

/// fs.unlinkSync(path)
pub fn unlink_sync(path: &str) -> io::Result<()> {
    fs::remove_file(path)
}

/// fs.rmdirSync(path, { recursive })
pub fn rmdir_sync(path: &str, recursive: bool) -> io::Result<()> {
    if recursive {
        fs::remove_dir_all(path)
    } else {
        fs::remove_dir(path)
    }
}

/// fs.renameSync(oldPath, newPath)
pub fn rename_sync(old_path: &str, new_path: &str) -> io::Result<()> {
    fs::rename(old_path, new_path)
}

/// fs.realpathSync(path)
pub fn realpath_sync(path: &str) -> io::Result<String> {
    Ok(fs::canonicalize(path)?.display().to_string())
}

// ============================================================================
// Script bindings
// ============================================================================

fn os_call<E: HostEngine, T>(
    engine: &mut E,
    result: io::Result<T>,
    syscall: &str,
    path: &str,
) -> ScriptResult<T, E::Value> {
    result.map_err(|err| errno::from_io_error(engine, &err, syscall, path))
}

/// `options.recursive` of an options object argument
fn recursive_option<E: HostEngine>(
    engine: &mut E,
    options: Option<&E::Value>,
) -> ScriptResult<bool, E::Value> {
    match options {
        Some(options) if engine.to_boolean(options) && engine.as_string(options).is_none() => {
            let recursive = engine
                .get_property(options, "recursive")
                .map_err(Exception::Thrown)?;
            Ok(engine.to_boolean(&recursive))
        }
        _ => Ok(false),
    }
}

/// Encoding from `'utf8'` or `{ encoding: 'utf8' }`; text is the only format
fn check_encoding<E: HostEngine>(
    engine: &mut E,
    options: Option<&E::Value>,
    function: &str,
) -> ScriptResult<(), E::Value> {
    let encoding = match options {
        None => None,
        Some(value) if engine.is_undefined(value) => None,
        Some(value) => match engine.as_string(value) {
            Some(encoding) => Some(encoding),
            None => {
                let encoding = engine
                    .get_property(value, "encoding")
                    .map_err(Exception::Thrown)?;
                engine.as_string(&encoding)
            }
        },
    };

    match encoding.as_deref() {
        None | Some("utf8") | Some("utf-8") => Ok(()),
        Some(other) => Err(NodeError::type_error(format!(
            "{function}: unsupported encoding '{other}'"
        ))
        .into()),
    }
}

fn js_exists_sync<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    // existsSync never throws
    let exists = args
        .first()
        .and_then(|value| engine.as_string(value))
        .is_some_and(|path| exists_sync(&path));
    Ok(engine.boolean(exists))
}

fn js_read_file_sync<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = read_file(engine, args);
    settle(engine, result)
}

fn read_file<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let path = args::string(engine, args, 0, "fs.readFileSync", "path")?;
    check_encoding(engine, args.get(1), "fs.readFileSync")?;
    let text = os_call(engine, read_file_sync(&path), "open", &path)?;
    Ok(engine.string(&text))
}

fn js_write_file_sync<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = write_file(engine, args, false);
    settle(engine, result)
}

fn js_append_file_sync<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = write_file(engine, args, true);
    settle(engine, result)
}

fn write_file<E: HostEngine>(
    engine: &mut E,
    args: &[E::Value],
    append: bool,
) -> ScriptResult<E::Value, E::Value> {
    let function = if append { "fs.appendFileSync" } else { "fs.writeFileSync" };
    let path = args::string(engine, args, 0, function, "path")?;
    let data = args::string(engine, args, 1, function, "data")?;
    check_encoding(engine, args.get(2), function)?;

    let result = if append {
        append_file_sync(&path, &data)
    } else {
        write_file_sync(&path, &data)
    };
    os_call(engine, result, "open", &path)?;
    Ok(engine.undefined())
}

fn js_mkdir_sync<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = make_dir(engine, args);
    settle(engine, result)
}

fn make_dir<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let path = args::string(engine, args, 0, "fs.mkdirSync", "path")?;
    let recursive = recursive_option(engine, args.get(1))?;
    os_call(engine, mkdir_sync(&path, recursive), "mkdir", &path)?;
    Ok(engine.undefined())
}

fn js_readdir_sync<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = read_dir(engine, args);
    settle(engine, result)
}

fn read_dir<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let path = args::string(engine, args, 0, "fs.readdirSync", "path")?;
    let names = os_call(engine, readdir_sync(&path), "scandir", &path)?;
    let names: Vec<_> = names.iter().map(|name| engine.string(name)).collect();
    Ok(engine.new_array(names))
}

fn js_unlink_sync<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = unlink(engine, args);
    settle(engine, result)
}

fn unlink<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let path = args::string(engine, args, 0, "fs.unlinkSync", "path")?;
    os_call(engine, unlink_sync(&path), "unlink", &path)?;
    Ok(engine.undefined())
}

fn js_rmdir_sync<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = remove_dir(engine, args);
    settle(engine, result)
}

fn remove_dir<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let path = args::string(engine, args, 0, "fs.rmdirSync", "path")?;
    let recursive = recursive_option(engine, args.get(1))?;
    os_call(engine, rmdir_sync(&path, recursive), "rmdir", &path)?;
    Ok(engine.undefined())
}

fn js_rename_sync<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = rename(engine, args);
    settle(engine, result)
}

fn rename<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let old_path = args::string(engine, args, 0, "fs.renameSync", "oldPath")?;
    let new_path = args::string(engine, args, 1, "fs.renameSync", "newPath")?;
    os_call(engine, rename_sync(&old_path, &new_path), "rename", &old_path)?;
    Ok(engine.undefined())
}

fn js_realpath_sync<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = realpath(engine, args);
    settle(engine, result)
}

fn realpath<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let path = args::string(engine, args, 0, "fs.realpathSync", "path")?;
    let resolved = os_call(engine, realpath_sync(&path), "realpath", &path)?;
    Ok(engine.string(&resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn path_in(dir: &tempfile::TempDir, name: &str) -> String {
        dir.path().join(name).display().to_string()
    }

    #[test]
    fn test_write_append_read() {
        let dir = tempdir().unwrap();
        let file = path_in(&dir, "notes.txt");

        write_file_sync(&file, "hello").unwrap();
        append_file_sync(&file, ", world").unwrap();
        assert_eq!(read_file_sync(&file).unwrap(), "hello, world");
        assert!(exists_sync(&file));

        write_file_sync(&file, "again").unwrap();
        assert_eq!(read_file_sync(&file).unwrap(), "again");
    }

    #[test]
    fn test_read_missing_file_keeps_os_code() {
        let dir = tempdir().unwrap();
        let err = read_file_sync(&path_in(&dir, "missing.txt")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.raw_os_error().is_some());
    }

    #[test]
    fn test_readdir_is_sorted() {
        let dir = tempdir().unwrap();
        for name in ["b.js", "c.js", "a.js"] {
            write_file_sync(&path_in(&dir, name), "").unwrap();
        }
        mkdir_sync(&path_in(&dir, "lib"), false).unwrap();

        let names = readdir_sync(&dir.path().display().to_string()).unwrap();
        assert_eq!(names, vec!["a.js", "b.js", "c.js", "lib"]);
    }

    #[test]
    fn test_mkdir_and_rmdir() {
        let dir = tempdir().unwrap();
        let nested = path_in(&dir, "a/b/c");

        assert!(mkdir_sync(&nested, false).is_err());
        mkdir_sync(&nested, true).unwrap();
        assert!(Path::new(&nested).is_dir());

        let top = path_in(&dir, "a");
        assert!(rmdir_sync(&top, false).is_err());
        rmdir_sync(&top, true).unwrap();
        assert!(!exists_sync(&top));
    }

    #[test]
    fn test_rename_unlink_realpath() {
        let dir = tempdir().unwrap();
        let from = path_in(&dir, "from.txt");
        let to = path_in(&dir, "to.txt");

        write_file_sync(&from, "x").unwrap();
        rename_sync(&from, &to).unwrap();
        assert!(!exists_sync(&from));

        let real = realpath_sync(&to).unwrap();
        assert!(Path::new(&real).is_absolute());
        assert!(real.ends_with("to.txt"));

        unlink_sync(&to).unwrap();
        assert!(!exists_sync(&to));
        assert!(unlink_sync(&to).is_err());
    }
}
