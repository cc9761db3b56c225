// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: detections, sessions, and video sources.

pub mod detection;
pub mod session;
pub mod video;
