// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `glow-program`.
//
// `glow-program` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `glow-program` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `glow-program`. If not, see <https://www.gnu.org/licenses/>.

//! Where shader text comes from, and how it is prepared before compiling.

use crate::error::Error;
use crate::gpu_backend::{ContextVersion, ShaderStage};

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// The source text of one shader stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderSource {
    /// Read the text from a file when the program is built.
    File(PathBuf),

    /// Use this text directly.
    Inline(Cow<'static, str>),
}

impl ShaderSource {
    /// A source read from `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        ShaderSource::File(path.into())
    }

    /// A source given as text.
    pub fn inline(text: impl Into<Cow<'static, str>>) -> Self {
        ShaderSource::Inline(text.into())
    }

    /// Get the text of this source.
    ///
    /// Files are read fully into memory.
    pub(crate) fn load(&self, stage: ShaderStage) -> Result<Cow<'_, str>, Error> {
        match self {
            ShaderSource::Inline(text) => Ok(Cow::Borrowed(text)),
            ShaderSource::File(path) => {
                let text = fs::read_to_string(path).map_err(|source| Error::Io {
                    stage,
                    path: path.clone(),
                    source,
                })?;

                tracing::debug!(
                    "loaded {} shader from {} ({} bytes)",
                    stage,
                    path.display(),
                    text.len()
                );

                Ok(Cow::Owned(text))
            }
        }
    }
}

impl From<PathBuf> for ShaderSource {
    fn from(path: PathBuf) -> Self {
        ShaderSource::File(path)
    }
}

impl From<&Path> for ShaderSource {
    fn from(path: &Path) -> Self {
        ShaderSource::File(path.to_path_buf())
    }
}

/// How to handle the `#version` directive of each source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VersionHeader {
    /// Pass sources to the driver unchanged.
    #[default]
    Keep,

    /// Prepend the directive that matches the context if a source lacks one.
    Auto,

    /// Prepend this directive if a source lacks one.
    Custom(Cow<'static, str>),
}

impl VersionHeader {
    pub(crate) fn apply<'a>(&self, version: ContextVersion, source: Cow<'a, str>) -> Cow<'a, str> {
        let header = match self {
            VersionHeader::Keep => return source,
            VersionHeader::Auto => version.glsl_header(),
            VersionHeader::Custom(header) => header.as_ref(),
        };

        if has_version_directive(&source) {
            source
        } else {
            Cow::Owned(format!("{header}\n{source}"))
        }
    }
}

/// Whether `source` starts with a `#version` directive, after whitespace and comments.
fn has_version_directive(source: &str) -> bool {
    let mut rest = source;
    loop {
        rest = rest.trim_start();
        if let Some(comment) = rest.strip_prefix("//") {
            rest = comment.split_once('\n').map_or("", |(_, next)| next);
        } else if let Some(comment) = rest.strip_prefix("/*") {
            match comment.split_once("*/") {
                Some((_, next)) => rest = next,
                None => return false,
            }
        } else {
            return rest
                .strip_prefix('#')
                .map_or(false, |directive| directive.trim_start().starts_with("version"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = "void main() {}\n";

    #[test]
    fn keep_passes_sources_through() {
        let out = VersionHeader::Keep.apply(ContextVersion::desktop(4, 6), BARE.into());
        assert_eq!(out, BARE);
    }

    #[test]
    fn auto_prepends_matching_header() {
        let out = VersionHeader::Auto.apply(ContextVersion::embedded(3, 0), BARE.into());
        assert_eq!(out, format!("#version 300 es\n{BARE}"));
    }

    #[test]
    fn existing_directive_wins() {
        let source = "// blit\n\n  #version 410 core\nvoid main() {}\n";
        let out = VersionHeader::Custom("#version 450".into())
            .apply(ContextVersion::desktop(4, 6), source.into());
        assert_eq!(out, source);
    }

    #[test]
    fn directive_after_block_comment_is_found() {
        let source = "\
/* Copyright (c) someone.
 * All rights reserved.
 */
#version 150 core
void main() {}
";
        let out = VersionHeader::Auto.apply(ContextVersion::desktop(3, 2), source.into());
        assert_eq!(out, source);

        let commented_out = "/* #version 410 */\nvoid main() {}\n";
        let out = VersionHeader::Auto.apply(ContextVersion::desktop(3, 2), commented_out.into());
        assert_eq!(out, format!("#version 150 core\n{commented_out}"));

        assert!(!has_version_directive("/* never closed\n#version 330 core\n"));
    }

    #[test]
    fn inline_sources_borrow() {
        let source = ShaderSource::inline(BARE);
        let text = source.load(ShaderStage::Vertex).unwrap();
        assert!(matches!(text, Cow::Borrowed(_)));
    }

    #[test]
    fn missing_file_names_stage_and_path() {
        let path = std::env::temp_dir().join("glow_program_test_missing/nope.gs");
        let err = ShaderSource::file(&path)
            .load(ShaderStage::Geometry)
            .unwrap_err();

        match err {
            Error::Io {
                stage,
                path: failed,
                source,
            } => {
                assert_eq!(stage, ShaderStage::Geometry);
                assert_eq!(failed, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
