//! Generation error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error while turning targets into a Ninja build graph.
///
/// Every variant is fatal: generation stops at the first error and nothing
/// is written.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("unresolved variable `{{{token}}}` in `{template}`")]
    UnresolvedVariable { token: String, template: String },

    #[error("text cannot contain a line break: {text:?}")]
    InvalidText { text: String },

    #[error("multiple steps produce `{path}`")]
    DuplicateOutput {
        path: String,
        first: String,
        second: String,
    },

    #[error("toolchain profile has no compiler for {language_class} sources")]
    UnsupportedToolchain { language_class: String },

    #[error("cannot determine the language of source `{path}`")]
    UnrecognizedSource { path: String },

    #[error("target `{target}` has no sources")]
    EmptyTarget { target: String },

    #[error("in target `{target}`: {source}")]
    InTarget {
        target: String,
        #[source]
        source: Box<GenerationError>,
    },

    #[error("failed to write `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerationError {
    /// Attach the name of the target being expanded.
    ///
    /// Errors that already carry a target are returned unchanged.
    pub fn in_target(self, target: &str) -> Self {
        match self {
            e @ GenerationError::InTarget { .. } => e,
            e @ GenerationError::DuplicateOutput { .. } => e,
            e => GenerationError::InTarget {
                target: target.to_string(),
                source: Box::new(e),
            },
        }
    }

    /// The innermost error, with target context stripped.
    pub fn root(&self) -> &GenerationError {
        match self {
            GenerationError::InTarget { source, .. } => source.root(),
            e => e,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GenerationError::UnresolvedVariable { token, template } => {
                Diagnostic::error(format!("no binding for placeholder `{{{}}}`", token))
                    .with_context(format!("while expanding `{}`", template))
                    .with_suggestion(format!(
                        "Define it under [vars] in .dockyard/config.toml or pass `--var {}=...`",
                        token
                    ))
            }

            GenerationError::InvalidText { text } => {
                Diagnostic::error("text destined for build.ninja contains a line break")
                    .with_context(format!("offending text: {:?}", text))
                    .with_suggestion("Remove newlines from paths, flags and defines")
            }

            GenerationError::DuplicateOutput {
                path,
                first,
                second,
            } => Diagnostic::error(format!("`{}` is produced more than once", path))
                .with_context(format!("first produced by {}", first))
                .with_context(format!("also produced by {}", second))
                .with_suggestion("Give each target a distinct output path")
                .with_suggestion("Make sure no source is listed in two targets"),

            GenerationError::UnsupportedToolchain { language_class } => Diagnostic::error(
                format!("the selected toolchain cannot compile {} sources", language_class),
            )
            .with_suggestion(format!(
                "Configure a {} compiler under [toolchain] in .dockyard/config.toml",
                language_class
            )),

            GenerationError::UnrecognizedSource { path } => {
                Diagnostic::error(format!("`{}` is not a C or C++ source", path))
                    .with_context("recognized extensions: .c, .cc, .cpp, .cxx, .c++, .C")
                    .with_suggestion("Remove headers and other non-source files from `sources`")
            }

            GenerationError::EmptyTarget { target } => {
                Diagnostic::error(format!("target `{}` has no sources", target))
                    .with_suggestion("Check that the `sources` globs match existing files")
            }

            GenerationError::InTarget { target, source } => {
                let mut diag = source.to_diagnostic();
                diag.context.insert(0, format!("in target `{}`", target));
                diag
            }

            GenerationError::Io { path, source } => {
                Diagnostic::error(format!("failed to write `{}`", path.display()))
                    .with_context(source.to_string())
                    .with_location(path.clone())
            }
        }
    }
}
