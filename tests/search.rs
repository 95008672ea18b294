// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! End-to-end search: queries in, ranked and re-ranked hits out.

mod common;

#[path = "search/ranking.rs"]
mod ranking;

#[path = "search/rewriting.rs"]
mod rewriting;

#[path = "search/rescoring.rs"]
mod rescoring;

#[path = "search/hits.rs"]
mod hits;
