// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Properties of the Vagrantfile renderer checked with proptest.

mod rendering;
