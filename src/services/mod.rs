// SPDX-License-Identifier: MIT

//! Deterministic offline collaborators for demos and local development

pub mod mock;
