// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Argument checking shared by native functions

use crate::engine::HostEngine;
use crate::error::{NodeError, Result};

/// `args[index]` if it is callable
pub fn callable<E: HostEngine>(
    engine: &E,
    args: &[E::Value],
    index: usize,
    function: &str,
    name: &str,
) -> Result<E::Value> {
    match args.get(index) {
        Some(value) if engine.is_callable(value) => Ok(value.clone()),
        Some(_) => Err(NodeError::type_error(format!(
            "{function}: {name} must be a function"
        ))),
        None => Err(missing(function)),
    }
}

/// `args[index]` as a number
pub fn number<E: HostEngine>(
    engine: &E,
    args: &[E::Value],
    index: usize,
    function: &str,
    name: &str,
) -> Result<f64> {
    match args.get(index) {
        Some(value) => engine.as_number(value).ok_or_else(|| {
            NodeError::type_error(format!("{function}: {name} must be a number"))
        }),
        None => Err(missing(function)),
    }
}

/// `args[index]` as a string
pub fn string<E: HostEngine>(
    engine: &E,
    args: &[E::Value],
    index: usize,
    function: &str,
    name: &str,
) -> Result<String> {
    match args.get(index) {
        Some(value) => engine.as_string(value).ok_or_else(|| {
            NodeError::type_error(format!("{function}: {name} must be a string"))
        }),
        None => Err(missing(function)),
    }
}

/// `args[index]` as a string, treating a missing or `undefined` argument as absent
pub fn optional_string<E: HostEngine>(
    engine: &E,
    args: &[E::Value],
    index: usize,
    function: &str,
    name: &str,
) -> Result<Option<String>> {
    match args.get(index) {
        None => Ok(None),
        Some(value) if engine.is_undefined(value) => Ok(None),
        Some(_) => string(engine, args, index, function, name).map(Some),
    }
}

/// Every argument as a string
pub fn strings<E: HostEngine>(engine: &E, args: &[E::Value], function: &str) -> Result<Vec<String>> {
    (0..args.len())
        .map(|index| string(engine, args, index, function, "path"))
        .collect()
}

fn missing(function: &str) -> NodeError {
    NodeError::type_error(format!("{function}: missing arguments"))
}
