// SPDX-License-Identifier: Apache-2.0
pub mod engine;
pub mod loader;
pub mod matcher;

#[cfg(test)]
pub mod fixtures;
