// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod budgets;
pub mod doctor;
pub mod employees;
pub mod expenses;
pub mod exporter;
pub mod importer;
pub mod insights;
pub mod payroll;
pub mod settings;
