// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

pub mod logging;

pub use logging::{disable_logging, Log, LogLevel, Logger, LoggingOptions};
