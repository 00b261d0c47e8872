// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GojiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Payroll for employee {employee} already exists for {month:02}/{year}")]
    DuplicatePayroll {
        employee: String,
        month: u32,
        year: i32,
    },

    #[error("Invalid payroll status transition: {from} -> {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

pub type GojiResult<T> = Result<T, GojiError>;
