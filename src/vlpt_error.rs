// SPDX-License-Identifier: Apache-2.0

/// Failure that aborts reading a whole source unit (for example, a source file
/// that cannot be opened).
#[derive(Debug)]
pub struct VlptError(pub String);

impl std::fmt::Display for VlptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vlpt error: {}", self.0)
    }
}

impl std::error::Error for VlptError {}
