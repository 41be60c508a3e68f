// SPDX-License-Identifier: Apache-2.0
pub mod descriptor;
pub mod manifest;
pub mod reference_record;
pub mod types;
