// SPDX-License-Identifier: Apache-2.0
pub mod db_references;
pub mod pool;
