// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Node.js `util` module implementation

use crate::engine::{HostEngine, define_function};
use crate::error::ScriptResult;

/// How a format argument is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `%s`
    String,
    /// `%d`
    Number,
    /// `%i`
    Integer,
    /// `%f`
    Float,
    /// `%j`
    Json,
    /// `%o` / `%O`
    Object,
    /// An argument left over after the format string ran out of directives
    Extra,
}

/// Create the util module exports
pub fn create_module<E: HostEngine>(engine: &mut E) -> ScriptResult<E::Value, E::Value> {
    let exports = engine.new_object();

    define_function(engine, &exports, "format", 1, js_format::<E>)?;
    define_function(engine, &exports, "inspect", 1, js_inspect::<E>)?;
    define_function(engine, &exports, "isFunction", 1, js_is_function::<E>)?;
    define_function(engine, &exports, "isNumber", 1, js_is_number::<E>)?;
    define_function(engine, &exports, "isString", 1, js_is_string::<E>)?;
    define_function(engine, &exports, "isUndefined", 1, js_is_undefined::<E>)?;

    Ok(exports)
}

/// util.format(fmt, ...args), with rendering left to `render`
pub fn format<A>(fmt: &str, args: &[A], mut render: impl FnMut(Directive, &A) -> String) -> String {
    let mut result = String::new();
    let mut remaining = args.iter();
    let mut chars = fmt.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            result.push(c);
            continue;
        }

        let directive = match chars.peek() {
            Some('s') => Directive::String,
            Some('d') => Directive::Number,
            Some('i') => Directive::Integer,
            Some('f') => Directive::Float,
            Some('j') => Directive::Json,
            Some('o') | Some('O') => Directive::Object,
            Some('%') => {
                chars.next();
                result.push('%');
                continue;
            }
            _ => {
                result.push('%');
                continue;
            }
        };

        let Some(&letter) = chars.peek() else {
            continue;
        };
        chars.next();
        match remaining.next() {
            Some(arg) => result.push_str(&render(directive, arg)),
            None => {
                result.push('%');
                result.push(letter);
            }
        }
    }

    for arg in remaining {
        result.push(' ');
        result.push_str(&render(Directive::Extra, arg));
    }

    result
}

/// Render a number the way JavaScript's `String(n)` does for common values
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i128)
    } else {
        format!("{}", n)
    }
}

/// Leading-number parse in the manner of `parseFloat`
pub fn parse_float(text: &str) -> f64 {
    let text = text.trim_start();
    let end = text
        .char_indices()
        .take_while(|&(_, c)| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);

    // Shrink until the prefix parses ("1e" or "1.2.3" are not numbers)
    (1..=end)
        .rev()
        .find_map(|len| text.get(..len).and_then(|prefix| prefix.parse::<f64>().ok()))
        .unwrap_or(f64::NAN)
}

/// Render one value for util.format / util.inspect
pub fn render<E: HostEngine>(engine: &mut E, directive: Directive, value: &E::Value) -> String {
    match directive {
        Directive::String => engine
            .as_string(value)
            .unwrap_or_else(|| engine.display(value)),
        Directive::Number => number_to_string(to_number(engine, value)),
        Directive::Integer => number_to_string(to_number(engine, value).trunc()),
        Directive::Float => number_to_string(to_number(engine, value)),
        Directive::Json => json(engine, value),
        Directive::Object => inspect(engine, value),
        Directive::Extra => match engine.as_string(value) {
            Some(text) => text,
            None => inspect(engine, value),
        },
    }
}

/// util.inspect(value)
pub fn inspect<E: HostEngine>(engine: &mut E, value: &E::Value) -> String {
    if let Some(text) = engine.as_string(value) {
        return format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"));
    }
    if let Some(n) = engine.as_number(value) {
        return number_to_string(n);
    }
    if engine.is_undefined(value) {
        return "undefined".to_string();
    }
    if engine.is_callable(value) {
        return "[Function]".to_string();
    }
    stringify(engine, value).unwrap_or_else(|| engine.display(value))
}

fn to_number<E: HostEngine>(engine: &mut E, value: &E::Value) -> f64 {
    match engine.as_number(value) {
        Some(n) => n,
        None => parse_float(&engine.display(value)),
    }
}

fn json<E: HostEngine>(engine: &mut E, value: &E::Value) -> String {
    if let Some(text) = engine.as_string(value) {
        return serde_json::Value::String(text).to_string();
    }
    if let Some(n) = engine.as_number(value) {
        return if n.is_finite() { number_to_string(n) } else { "null".to_string() };
    }
    if engine.is_undefined(value) {
        return "undefined".to_string();
    }
    stringify(engine, value).unwrap_or_else(|| engine.display(value))
}

/// `JSON.stringify(value)` through the engine's own JSON object
fn stringify<E: HostEngine>(engine: &mut E, value: &E::Value) -> Option<String> {
    let global = engine.global_object();
    let json = engine.get_property(&global, "JSON").ok()?;
    if engine.is_undefined(&json) {
        return None;
    }
    let stringify = engine.get_property(&json, "stringify").ok()?;
    if !engine.is_callable(&stringify) {
        return None;
    }
    let result = engine.call(&stringify, &json, std::slice::from_ref(value)).ok()?;
    engine.as_string(&result)
}

fn js_format<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let text = crate::globals::console::format_args(engine, args);
    Ok(engine.string(&text))
}

fn js_inspect<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let text = match args.first() {
        Some(value) => inspect(engine, value),
        None => "undefined".to_string(),
    };
    Ok(engine.string(&text))
}

fn js_is_function<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = args.first().is_some_and(|value| engine.is_callable(value));
    Ok(engine.boolean(result))
}

fn js_is_number<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = args.first().is_some_and(|value| engine.as_number(value).is_some());
    Ok(engine.boolean(result))
}

fn js_is_string<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = args.first().is_some_and(|value| engine.as_string(value).is_some());
    Ok(engine.boolean(result))
}

fn js_is_undefined<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = args.first().is_none_or(|value| engine.is_undefined(value));
    Ok(engine.boolean(result))
}
