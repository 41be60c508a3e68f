// SPDX-License-Identifier: Apache-2.0
pub mod client;
pub mod digest;
pub mod reference;
