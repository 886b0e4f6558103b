// Copyright (c) 2026 MCU-Debug Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Global debug flag settings and logger setup
use std::sync::OnceLock;

use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle};

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Initialize the debug flag. Must be called once at startup.
pub fn set_debug(enabled: bool) {
    DEBUG_ENABLED.set(enabled).ok();
}

/// Check if debug mode is enabled
pub fn is_debug() -> bool {
    *DEBUG_ENABLED.get().unwrap_or(&false)
}

/// Start logging to stderr; stdout carries the rendered view. `RUST_LOG`
/// overrides the level picked from the debug flag. Keep the handle alive for
/// the life of the program.
pub fn init_logging(debug: bool) -> Result<LoggerHandle, FlexiLoggerError> {
    set_debug(debug);
    let level = if is_debug() { "debug" } else { "info" };
    Logger::try_with_env_or_str(level)?.log_to_stderr().start()
}
