// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! OS error exceptions
//!
//! Every native module that touches the OS reports failures the same way:
//! an `Error` whose message is the platform's description of the code,
//! carrying `errno`, `code` when the platform has a symbolic name for it,
//! and `syscall` / `path` only when they are known.

use crate::engine::{ErrorKind, HostEngine, define_value};
use crate::error::{Exception, ScriptResult};
use std::io;

/// Platform description of `errno`
pub fn error_message(errno: i32) -> String {
    #[cfg(unix)]
    {
        nix::errno::Errno::from_raw(errno).desc().to_string()
    }
    #[cfg(not(unix))]
    {
        let message = io::Error::from_raw_os_error(errno).to_string();
        let suffix = format!(" (os error {errno})");
        message
            .strip_suffix(&suffix)
            .map(str::to_string)
            .unwrap_or(message)
    }
}

/// Symbolic name of `errno` (`ENOENT`, ...), if the platform has one
pub fn error_code(errno: i32) -> Option<String> {
    #[cfg(unix)]
    {
        match nix::errno::Errno::from_raw(errno) {
            nix::errno::Errno::UnknownErrno => None,
            known => Some(format!("{known:?}")),
        }
    }
    #[cfg(not(unix))]
    {
        let _ = errno;
        None
    }
}

/// Build the exception for `errno`; empty `syscall` / `path` are left off
pub fn errno_exception<E: HostEngine>(
    engine: &mut E,
    errno: i32,
    syscall: &str,
    path: &str,
) -> Exception<E::Value> {
    match build(engine, errno, syscall, path) {
        Ok(value) => Exception::Thrown(value),
        Err(err) => err,
    }
}

/// Exception for a failed I/O operation.
///
/// Errors without an OS code (invalid UTF-8 data, for instance) use EIO.
pub fn from_io_error<E: HostEngine>(
    engine: &mut E,
    err: &io::Error,
    syscall: &str,
    path: &str,
) -> Exception<E::Value> {
    match err.raw_os_error() {
        Some(errno) => errno_exception(engine, errno, syscall, path),
        None => {
            let value = engine.new_error(ErrorKind::Error, &err.to_string());
            let errno = engine.number(f64::from(EIO));
            match define_value(engine, &value, "errno", errno) {
                Ok(()) => Exception::Thrown(value),
                Err(err) => err,
            }
        }
    }
}

#[cfg(unix)]
const EIO: i32 = nix::libc::EIO;
#[cfg(not(unix))]
const EIO: i32 = 5;

fn build<E: HostEngine>(
    engine: &mut E,
    errno: i32,
    syscall: &str,
    path: &str,
) -> ScriptResult<E::Value, E::Value> {
    let error = engine.new_error(ErrorKind::Error, &error_message(errno));

    let number = engine.number(f64::from(errno));
    define_value(engine, &error, "errno", number)?;

    if let Some(code) = error_code(errno) {
        let code = engine.string(&code);
        define_value(engine, &error, "code", code)?;
    }
    if !syscall.is_empty() {
        let syscall = engine.string(syscall);
        define_value(engine, &error, "syscall", syscall)?;
    }
    if !path.is_empty() {
        let path = engine.string(path);
        define_value(engine, &error, "path", path)?;
    }

    Ok(error)
}
