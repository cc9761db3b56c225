// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: media, frame capture, remote detection, and
//! persisted credentials.

pub mod capture;
pub mod credentials;
pub mod detection;
pub mod media;
pub mod thumbnails;
