// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for driving the webhook receiver end to end.
//!
//! Provides an in-process router with a recording deployer, request
//! generators, and attack simulation bookkeeping.
#![allow(dead_code)]

pub mod app;
pub mod attacks;
pub mod generators;
pub mod metrics;
