// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Minimal console object
//!
//! `log`, `info` and `debug` write to stdout; `warn` and `error` write to
//! stderr. Arguments are rendered with `util.format` rules.

use crate::engine::{HostEngine, define_function};
use crate::error::ScriptResult;
use crate::modules::util::{self, Directive};
use std::io::Write;

/// Where a console method writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Create the console object
pub fn create_console_object<E: HostEngine>(engine: &mut E) -> ScriptResult<E::Value, E::Value> {
    let console = engine.new_object();

    define_function(engine, &console, "log", 0, log::<E>)?;
    define_function(engine, &console, "info", 0, log::<E>)?;
    define_function(engine, &console, "debug", 0, log::<E>)?;
    define_function(engine, &console, "warn", 0, warn::<E>)?;
    define_function(engine, &console, "error", 0, warn::<E>)?;

    Ok(console)
}

/// Render console arguments into one line
pub fn format_args<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> String {
    match args.split_first() {
        Some((first, rest)) => match engine.as_string(first) {
            Some(fmt) => util::format(&fmt, rest, |directive, value| {
                util::render(engine, directive, value)
            }),
            None => args
                .iter()
                .map(|value| util::render(engine, Directive::Extra, value))
                .collect::<Vec<_>>()
                .join(" "),
        },
        None => String::new(),
    }
}

fn log<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    write_line(engine, Stream::Stdout, args);
    Ok(engine.undefined())
}

fn warn<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    write_line(engine, Stream::Stderr, args);
    Ok(engine.undefined())
}

fn write_line<E: HostEngine>(engine: &mut E, stream: Stream, args: &[E::Value]) {
    let line = format_args(engine, args);
    // Closed pipes are not a script error
    let _ = match stream {
        Stream::Stdout => writeln!(std::io::stdout().lock(), "{line}"),
        Stream::Stderr => writeln!(std::io::stderr().lock(), "{line}"),
    };
}
