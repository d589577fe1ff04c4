// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Node.js `Buffer` global
//!
//! Script-side buffers are plain objects holding one numeric property per
//! byte plus `length`, so they work with nothing but the object model of
//! [`HostEngine`]. Text encodings are `utf8`, `ascii` and `latin1`.

use crate::engine::{ErrorKind, HostEngine, args, define_function, define_value, settle};
use crate::error::{Exception, NodeError, ScriptResult};

/// Largest buffer scripts may allocate
pub const MAX_LENGTH: usize = 0x7fff_ffff;

/// Property marking an object as a buffer
const MARKER: &str = "_isBuffer";

/// Supported text encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `utf8` / `utf-8`
    Utf8,
    /// `ascii`
    Ascii,
    /// `latin1` / `binary`
    Latin1,
}

impl Encoding {
    /// Parse an encoding name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Some(Self::Utf8),
            "ascii" => Some(Self::Ascii),
            "latin1" | "binary" => Some(Self::Latin1),
            _ => None,
        }
    }
}

/// Rust representation of a Node.js Buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    data: Vec<u8>,
}

impl Buffer {
    /// A zero-filled buffer of `size` bytes
    pub fn alloc(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    /// A buffer holding a copy of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
        }
    }

    /// Encode `s`
    pub fn from_string(s: &str, encoding: Encoding) -> Self {
        let data = match encoding {
            Encoding::Utf8 => s.as_bytes().to_vec(),
            Encoding::Ascii | Encoding::Latin1 => s.chars().map(|c| c as u32 as u8).collect(),
        };
        Self { data }
    }

    /// Join several buffers
    pub fn concat(buffers: &[Buffer]) -> Self {
        Self {
            data: buffers.iter().flat_map(|b| b.data.iter().copied()).collect(),
        }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decode the bytes
    pub fn to_string(&self, encoding: Encoding) -> String {
        match encoding {
            Encoding::Utf8 => String::from_utf8_lossy(&self.data).into_owned(),
            Encoding::Ascii => self.data.iter().map(|&b| (b & 0x7f) as char).collect(),
            Encoding::Latin1 => self.data.iter().map(|&b| b as char).collect(),
        }
    }

    /// Bytes `start..end`, clamped to the buffer
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.data.len());
        let start = start.min(end);
        Self::from_bytes(&self.data[start..end])
    }

    /// The raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Create the `Buffer` global
pub fn create_buffer_class<E: HostEngine>(engine: &mut E) -> ScriptResult<E::Value, E::Value> {
    let class = engine.new_object();

    define_function(engine, &class, "from", 2, js_from::<E>)?;
    define_function(engine, &class, "alloc", 2, js_alloc::<E>)?;
    define_function(engine, &class, "byteLength", 2, js_byte_length::<E>)?;
    define_function(engine, &class, "isBuffer", 1, js_is_buffer::<E>)?;
    define_function(engine, &class, "concat", 1, js_concat::<E>)?;

    let pool_size = engine.number(8192.0);
    define_value(engine, &class, "poolSize", pool_size)?;

    Ok(class)
}

/// Build the script object for `buffer`
pub fn to_value<E: HostEngine>(engine: &mut E, buffer: &Buffer) -> ScriptResult<E::Value, E::Value> {
    let object = engine.new_object();

    for (index, &byte) in buffer.as_bytes().iter().enumerate() {
        let value = engine.number(f64::from(byte));
        define_value(engine, &object, &index.to_string(), value)?;
    }
    let length = engine.number(buffer.len() as f64);
    define_value(engine, &object, "length", length)?;
    let marker = engine.boolean(true);
    define_value(engine, &object, MARKER, marker)?;

    define_function(engine, &object, "toString", 1, js_to_string::<E>)?;
    define_function(engine, &object, "slice", 2, js_slice::<E>)?;
    define_function(engine, &object, "equals", 1, js_equals::<E>)?;

    Ok(object)
}

/// Whether `value` is a buffer built by this module
pub fn is_buffer<E: HostEngine>(engine: &mut E, value: &E::Value) -> bool {
    match engine.get_property(value, MARKER) {
        Ok(marker) => engine.to_boolean(&marker),
        Err(_) => false,
    }
}

/// Read the bytes of a buffer or any array-like object of numbers
pub fn read_bytes<E: HostEngine>(
    engine: &mut E,
    value: &E::Value,
    function: &str,
) -> ScriptResult<Buffer, E::Value> {
    let length = engine
        .get_property(value, "length")
        .map_err(Exception::Thrown)?;
    let Some(length) = engine.as_number(&length) else {
        return Err(NodeError::type_error(format!(
            "{function}: argument must be a Buffer or an array of bytes"
        ))
        .into());
    };
    let length = checked_length(engine, length, function)?;

    let mut data = Vec::with_capacity(length);
    for index in 0..length {
        let byte = engine
            .get_property(value, &index.to_string())
            .map_err(Exception::Thrown)?;
        data.push(to_byte(engine.as_number(&byte).unwrap_or(0.0)));
    }
    Ok(Buffer { data })
}

/// Byte value of a number, wrapping modulo 256
fn to_byte(n: f64) -> u8 {
    if n.is_finite() {
        (n.trunc() as i64).rem_euclid(256) as u8
    } else {
        0
    }
}

fn checked_length<E: HostEngine>(
    engine: &mut E,
    length: f64,
    function: &str,
) -> ScriptResult<usize, E::Value> {
    if length.is_finite() && length >= 0.0 && length.fract() == 0.0 && length <= MAX_LENGTH as f64 {
        return Ok(length as usize);
    }
    let message = format!("{function}: size must be an integer between 0 and {MAX_LENGTH}");
    Err(Exception::Thrown(engine.new_error(ErrorKind::RangeError, &message)))
}

fn encoding_arg<E: HostEngine>(
    engine: &mut E,
    args: &[E::Value],
    index: usize,
    function: &str,
) -> ScriptResult<Encoding, E::Value> {
    match args::optional_string(engine, args, index, function, "encoding")? {
        None => Ok(Encoding::Utf8),
        Some(name) => Encoding::from_name(&name).ok_or_else(|| {
            NodeError::type_error(format!("{function}: unknown encoding '{name}'")).into()
        }),
    }
}

fn index_arg<E: HostEngine>(engine: &mut E, args: &[E::Value], index: usize, default: usize, len: usize) -> usize {
    match args.get(index).and_then(|value| engine.as_number(value)) {
        Some(n) if n.is_nan() => 0,
        Some(n) if n < 0.0 => (len as f64 + n.trunc()).max(0.0) as usize,
        Some(n) => n.trunc().min(len as f64) as usize,
        None => default,
    }
}

fn js_from<E: HostEngine>(engine: &mut E, _this: &E::Value, args: &[E::Value]) -> Result<E::Value, E::Value> {
    let result = from(engine, args);
    settle(engine, result)
}

fn from<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let buffer = match args.first() {
        Some(value) => match engine.as_string(value) {
            Some(text) => {
                let encoding = encoding_arg(engine, args, 1, "Buffer.from")?;
                Buffer::from_string(&text, encoding)
            }
            None => read_bytes(engine, value, "Buffer.from")?,
        },
        None => {
            return Err(NodeError::type_error(
                "Buffer.from: first argument must be a string, Buffer or array",
            )
            .into());
        }
    };
    to_value(engine, &buffer)
}

fn js_alloc<E: HostEngine>(engine: &mut E, _this: &E::Value, args: &[E::Value]) -> Result<E::Value, E::Value> {
    let result = alloc(engine, args);
    settle(engine, result)
}

fn alloc<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let size = args::number(engine, args, 0, "Buffer.alloc", "size")?;
    let size = checked_length(engine, size, "Buffer.alloc")?;

    let mut buffer = Buffer::alloc(size);
    match args.get(1) {
        Some(fill) if engine.as_number(fill).is_some() => {
            let byte = to_byte(engine.as_number(fill).unwrap_or(0.0));
            buffer.data.fill(byte);
        }
        Some(fill) if engine.as_string(fill).is_some() => {
            let text = engine.as_string(fill).unwrap_or_default();
            let pattern = Buffer::from_string(&text, Encoding::Utf8);
            if !pattern.is_empty() {
                for (byte, value) in buffer.data.iter_mut().zip(pattern.data.iter().cycle()) {
                    *byte = *value;
                }
            }
        }
        _ => {}
    }
    to_value(engine, &buffer)
}

fn js_byte_length<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = byte_length(engine, args);
    settle(engine, result)
}

fn byte_length<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let length = match args.first() {
        Some(value) if engine.as_string(value).is_some() => {
            let text = engine.as_string(value).unwrap_or_default();
            let encoding = encoding_arg(engine, args, 1, "Buffer.byteLength")?;
            Buffer::from_string(&text, encoding).len()
        }
        Some(value) => read_bytes(engine, value, "Buffer.byteLength")?.len(),
        None => {
            return Err(NodeError::type_error("Buffer.byteLength: string must be a string or Buffer").into());
        }
    };
    Ok(engine.number(length as f64))
}

fn js_is_buffer<E: HostEngine>(
    engine: &mut E,
    _this: &E::Value,
    args: &[E::Value],
) -> Result<E::Value, E::Value> {
    let result = match args.first() {
        Some(value) => is_buffer(engine, value),
        None => false,
    };
    Ok(engine.boolean(result))
}

fn js_concat<E: HostEngine>(engine: &mut E, _this: &E::Value, args: &[E::Value]) -> Result<E::Value, E::Value> {
    let result = concat(engine, args);
    settle(engine, result)
}

fn concat<E: HostEngine>(engine: &mut E, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let Some(list) = args.first() else {
        return Err(NodeError::type_error("Buffer.concat: list must be an array").into());
    };
    let items = read_list(engine, list)?;
    let buffers = items
        .iter()
        .map(|item| read_bytes(engine, item, "Buffer.concat"))
        .collect::<ScriptResult<Vec<_>, _>>()?;
    to_value(engine, &Buffer::concat(&buffers))
}

fn read_list<E: HostEngine>(engine: &mut E, list: &E::Value) -> ScriptResult<Vec<E::Value>, E::Value> {
    let length = engine
        .get_property(list, "length")
        .map_err(Exception::Thrown)?;
    let Some(length) = engine.as_number(&length) else {
        return Err(NodeError::type_error("Buffer.concat: list must be an array").into());
    };
    let length = checked_length(engine, length, "Buffer.concat")?;
    (0..length)
        .map(|index| {
            engine
                .get_property(list, &index.to_string())
                .map_err(Exception::Thrown)
        })
        .collect()
}

fn js_to_string<E: HostEngine>(engine: &mut E, this: &E::Value, args: &[E::Value]) -> Result<E::Value, E::Value> {
    let result = to_string(engine, this, args);
    settle(engine, result)
}

fn to_string<E: HostEngine>(
    engine: &mut E,
    this: &E::Value,
    args: &[E::Value],
) -> ScriptResult<E::Value, E::Value> {
    let buffer = read_bytes(engine, this, "buffer.toString")?;
    let encoding = encoding_arg(engine, args, 0, "buffer.toString")?;
    let start = index_arg(engine, args, 1, 0, buffer.len());
    let end = index_arg(engine, args, 2, buffer.len(), buffer.len());
    let text = buffer.slice(start, end).to_string(encoding);
    Ok(engine.string(&text))
}

fn js_slice<E: HostEngine>(engine: &mut E, this: &E::Value, args: &[E::Value]) -> Result<E::Value, E::Value> {
    let result = slice(engine, this, args);
    settle(engine, result)
}

/// `buf.slice(start, end)`; the result is a copy
fn slice<E: HostEngine>(engine: &mut E, this: &E::Value, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let buffer = read_bytes(engine, this, "buffer.slice")?;
    let start = index_arg(engine, args, 0, 0, buffer.len());
    let end = index_arg(engine, args, 1, buffer.len(), buffer.len());
    to_value(engine, &buffer.slice(start, end))
}

fn js_equals<E: HostEngine>(engine: &mut E, this: &E::Value, args: &[E::Value]) -> Result<E::Value, E::Value> {
    let result = equals(engine, this, args);
    settle(engine, result)
}

fn equals<E: HostEngine>(engine: &mut E, this: &E::Value, args: &[E::Value]) -> ScriptResult<E::Value, E::Value> {
    let other = match args.first() {
        Some(other) if is_buffer(engine, other) => other.clone(),
        _ => return Err(NodeError::type_error("buffer.equals: otherBuffer must be a Buffer").into()),
    };
    let left = read_bytes(engine, this, "buffer.equals")?;
    let right = read_bytes(engine, &other, "buffer.equals")?;
    Ok(engine.boolean(left == right))
}
