// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Node.js `path` module implementation
//!
//! POSIX semantics (`path.posix`): `/` separated, no drive letters.

use crate::engine::{HostEngine, args, define_function, define_value};
use crate::error::{Result, ScriptResult};

/// Path segment separator
pub const SEP: &str = "/";

/// PATH list delimiter
pub const DELIMITER: &str = ":";

/// Create the path module exports
pub fn create_module<E: HostEngine>(engine: &mut E) -> ScriptResult<E::Value, E::Value> {
    let exports = engine.new_object();

    let sep = engine.string(SEP);
    define_value(engine, &exports, "sep", sep)?;
    let delimiter = engine.string(DELIMITER);
    define_value(engine, &exports, "delimiter", delimiter)?;

    define_function(engine, &exports, "basename", 2, js_basename::<E>)?;
    define_function(engine, &exports, "dirname", 1, js_dirname::<E>)?;
    define_function(engine, &exports, "extname", 1, js_extname::<E>)?;
    define_function(engine, &exports, "isAbsolute", 1, js_is_absolute::<E>)?;
    define_function(engine, &exports, "join", 0, js_join::<E>)?;
    define_function(engine, &exports, "normalize", 1, js_normalize::<E>)?;
    define_function(engine, &exports, "resolve", 0, js_resolve::<E>)?;
    define_function(engine, &exports, "relative", 2, js_relative::<E>)?;

    Ok(exports)
}

/// path.basename(path, ext?)
pub fn basename(path: &str, ext: Option<&str>) -> String {
    let name = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    match ext {
        Some(ext) if !ext.is_empty() && name != ext => {
            name.strip_suffix(ext).unwrap_or(name).to_string()
        }
        _ => name.to_string(),
    }
}

/// path.dirname(path)
pub fn dirname(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return SEP.to_string();
    }

    match trimmed.rfind('/') {
        None => ".".to_string(),
        Some(index) => {
            let dir = trimmed[..index].trim_end_matches('/');
            if dir.is_empty() {
                SEP.to_string()
            } else {
                dir.to_string()
            }
        }
    }
}

/// path.extname(path)
pub fn extname(path: &str) -> String {
    let base = basename(path, None);
    match base.rfind('.') {
        // A leading dot names a hidden file, not an extension
        Some(0) | None => String::new(),
        Some(index) => base[index..].to_string(),
    }
}

/// path.isAbsolute(path)
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// path.normalize(path)
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let absolute = is_absolute(path);
    let trailing = path.ends_with('/');
    let mut components: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => continue,
            ".." => {
                if components.last().is_some_and(|last| *last != "..") {
                    components.pop();
                } else if !absolute {
                    components.push("..");
                }
            }
            c => components.push(c),
        }
    }

    let mut result = components.join(SEP);
    if absolute {
        result.insert_str(0, SEP);
    }
    if result.is_empty() {
        result.push('.');
    }
    if trailing && !result.ends_with('/') {
        result.push('/');
    }
    result
}

/// path.join(...paths)
pub fn join(paths: &[&str]) -> String {
    let joined = paths
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(SEP);
    normalize(&joined)
}

/// path.resolve(...paths) against an explicit working directory
pub fn resolve_from(cwd: &str, paths: &[&str]) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for p in paths.iter().rev().filter(|p| !p.is_empty()) {
        segments.push(*p);
        if is_absolute(p) {
            break;
        }
    }
    if !segments.last().is_some_and(|p| is_absolute(p)) {
        segments.push(cwd);
    }
    segments.reverse();

    let resolved = normalize(&segments.join(SEP));
    match resolved.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => resolved,
    }
}

/// path.resolve(...paths)
pub fn resolve(paths: &[&str]) -> String {
    resolve_from(&current_dir(), paths)
}

/// path.relative(from, to) against an explicit working directory
pub fn relative_from(cwd: &str, from: &str, to: &str) -> String {
    let from = resolve_from(cwd, &[from]);
    let to = resolve_from(cwd, &[to]);
    if from == to {
        return String::new();
    }

    let from_parts: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_parts: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();
    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts = vec![".."; from_parts.len() - common];
    parts.extend_from_slice(&to_parts[common..]);
    parts.join(SEP)
}

/// path.relative(from, to)
pub fn relative(from: &str, to: &str) -> String {
    relative_from(&current_dir(), from, to)
}

fn current_dir() -> String {
    std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|_| SEP.to_string())
}

fn text<E: HostEngine>(engine: &mut E, result: Result<String>) -> std::result::Result<E::Value, E::Value> {
    match result {
        Ok(text) => Ok(engine.string(&text)),
        Err(err) => Err(err.to_value(engine)),
    }
}

fn js_basename<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> std::result::Result<E::Value, E::Value> {
    let result = args::string(engine, args, 0, "path.basename", "path").and_then(|path| {
        let ext = args::optional_string(engine, args, 1, "path.basename", "ext")?;
        Ok(basename(&path, ext.as_deref()))
    });
    text(engine, result)
}

fn js_dirname<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> std::result::Result<E::Value, E::Value> {
    let result = args::string(engine, args, 0, "path.dirname", "path").map(|p| dirname(&p));
    text(engine, result)
}

fn js_extname<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> std::result::Result<E::Value, E::Value> {
    let result = args::string(engine, args, 0, "path.extname", "path").map(|p| extname(&p));
    text(engine, result)
}

fn js_is_absolute<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> std::result::Result<E::Value, E::Value> {
    match args::string(engine, args, 0, "path.isAbsolute", "path") {
        Ok(path) => Ok(engine.boolean(is_absolute(&path))),
        Err(err) => Err(err.to_value(engine)),
    }
}

fn js_join<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> std::result::Result<E::Value, E::Value> {
    let result = args::strings(engine, args, "path.join")
        .map(|paths| join(&paths.iter().map(String::as_str).collect::<Vec<_>>()));
    text(engine, result)
}

fn js_normalize<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> std::result::Result<E::Value, E::Value> {
    let result = args::string(engine, args, 0, "path.normalize", "path").map(|p| normalize(&p));
    text(engine, result)
}

fn js_resolve<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> std::result::Result<E::Value, E::Value> {
    let result = args::strings(engine, args, "path.resolve")
        .map(|paths| resolve(&paths.iter().map(String::as_str).collect::<Vec<_>>()));
    text(engine, result)
}

fn js_relative<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> std::result::Result<E::Value, E::Value> {
    let result = args::string(engine, args, 0, "path.relative", "from").and_then(|from| {
        let to = args::string(engine, args, 1, "path.relative", "to")?;
        Ok(relative(&from, &to))
    });
    text(engine, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename() {
        assert_eq!(basename("/foo/bar/baz.txt", None), "baz.txt");
        assert_eq!(basename("/foo/bar/baz.txt", Some(".txt")), "baz");
        assert_eq!(basename("/foo/bar/", None), "bar");
        assert_eq!(basename(".txt", Some(".txt")), ".txt");
        assert_eq!(basename("/", None), "");
    }

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("/foo/bar/baz.txt"), "/foo/bar");
        assert_eq!(dirname("/foo/bar/"), "/foo");
        assert_eq!(dirname("/foo"), "/");
        assert_eq!(dirname("/"), "/");
        assert_eq!(dirname("foo"), ".");
        assert_eq!(dirname(""), ".");
    }

    #[test]
    fn test_extname() {
        assert_eq!(extname("file.txt"), ".txt");
        assert_eq!(extname("file.tar.gz"), ".gz");
        assert_eq!(extname("file"), "");
        assert_eq!(extname(".hidden"), "");
        assert_eq!(extname("index."), ".");
        assert_eq!(extname("/dir.d/file"), "");
    }

    #[test]
    fn test_join() {
        assert_eq!(join(&["foo", "bar", "baz"]), "foo/bar/baz");
        assert_eq!(join(&["/foo", "bar", "baz/asdf", "quux", ".."]), "/foo/bar/baz/asdf");
        assert_eq!(join(&["foo", "../bar"]), "bar");
        assert_eq!(join(&["/a", "/b"]), "/a/b");
        assert_eq!(join(&["", ""]), ".");
        assert_eq!(join(&[]), ".");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/foo/bar//baz/asdf/quux/.."), "/foo/bar/baz/asdf");
        assert_eq!(normalize("foo/bar/../baz"), "foo/baz");
        assert_eq!(normalize("../../a"), "../../a");
        assert_eq!(normalize("/../a"), "/a");
        assert_eq!(normalize("a/"), "a/");
        assert_eq!(normalize("./"), "./");
        assert_eq!(normalize(""), ".");
    }

    #[test]
    fn test_is_absolute() {
        assert!(is_absolute("/foo/bar"));
        assert!(!is_absolute("foo/bar"));
        assert!(!is_absolute("./foo"));
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve_from("/home/user", &["foo/bar", "./baz"]), "/home/user/foo/bar/baz");
        assert_eq!(resolve_from("/home/user", &["/foo/bar", "./baz"]), "/foo/bar/baz");
        assert_eq!(resolve_from("/home/user", &["/foo/bar", "/tmp/file/"]), "/tmp/file");
        assert_eq!(resolve_from("/home/user", &[]), "/home/user");
        assert_eq!(resolve_from("/", &[".."]), "/");
    }

    #[test]
    fn test_relative() {
        assert_eq!(
            relative_from("/", "/data/orandea/test/aaa", "/data/orandea/impl/bbb"),
            "../../impl/bbb"
        );
        assert_eq!(relative_from("/home", "a/b", "a/b/c"), "c");
        assert_eq!(relative_from("/home", "/x", "/x"), "");
        assert_eq!(relative_from("/home", "/a/b", "/"), "../..");
    }
}
