//! Toolchain profiles for C/C++ compilers.
//!
//! A [`ToolchainProfile`] is a plain value describing one compiler family:
//! executable names, the object file extension and the flag conventions
//! used when writing Ninja rules. It is selected once per run and threaded
//! through expansion and emission, so supporting a new toolchain means
//! adding a profile constructor, nothing else.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::builder::errors::GenerationError;
use crate::ninja::escape;

mod gcc;
mod msvc;

pub use gcc::infer_cxx;

pub use crate::core::target::Language;

/// The platform/family of a toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolchainPlatform {
    /// GCC (GNU Compiler Collection)
    #[default]
    Gcc,
    /// Clang/LLVM
    Clang,
    /// Microsoft Visual C++
    Msvc,
}

impl ToolchainPlatform {
    /// Get the platform name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainPlatform::Gcc => "gcc",
            ToolchainPlatform::Clang => "clang",
            ToolchainPlatform::Msvc => "msvc",
        }
    }
}

impl fmt::Display for ToolchainPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolchainPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gcc" | "gnu" => Ok(ToolchainPlatform::Gcc),
            "clang" | "llvm" => Ok(ToolchainPlatform::Clang),
            "msvc" | "cl" => Ok(ToolchainPlatform::Msvc),
            _ => Err(format!(
                "unknown toolchain profile '{}', valid values: gcc, clang, msvc",
                s
            )),
        }
    }
}

/// How a tool is told where to write its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFlagStyle {
    /// `-o $out` for both compiler and linker
    Gnu,
    /// `/Fo$out` for the compiler, `/OUT:$out` for the linker and librarian
    Msvc,
}

impl OutputFlagStyle {
    /// Output argument for a compile command.
    pub fn compile_output(&self) -> &'static str {
        match self {
            OutputFlagStyle::Gnu => "-o $out",
            OutputFlagStyle::Msvc => "/Fo$out",
        }
    }

    /// Output argument for a link command.
    pub fn link_output(&self) -> &'static str {
        match self {
            OutputFlagStyle::Gnu => "-o $out",
            OutputFlagStyle::Msvc => "/OUT:$out",
        }
    }
}

/// How the compiler reports header dependencies to Ninja.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepsStyle {
    /// Makefile-style depfile written next to the object (`-MMD -MF`)
    Gcc,
    /// `/showIncludes` lines on stdout
    Msvc,
}

impl DepsStyle {
    /// Compiler arguments that produce dependency information.
    pub fn compile_args(&self) -> &'static str {
        match self {
            DepsStyle::Gcc => "-MMD -MF $out.d",
            DepsStyle::Msvc => "/showIncludes",
        }
    }

    /// Value of the rule's `depfile` attribute, if any.
    pub fn depfile(&self) -> Option<&'static str> {
        match self {
            DepsStyle::Gcc => Some("$out.d"),
            DepsStyle::Msvc => None,
        }
    }

    /// Value of the rule's `deps` attribute.
    pub fn deps(&self) -> &'static str {
        match self {
            DepsStyle::Gcc => "gcc",
            DepsStyle::Msvc => "msvc",
        }
    }
}

/// Build type (debug or release).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    #[default]
    Debug,
    Release,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "debug",
            BuildType::Release => "release",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" | "dev" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            _ => Err(format!(
                "unknown build type '{}', valid values: debug, release",
                s
            )),
        }
    }
}

/// Executable names and flag conventions for one compiler family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainProfile {
    /// Toolchain family
    pub platform: ToolchainPlatform,
    /// C compiler, `None` if C sources cannot be built
    pub c_compiler: Option<String>,
    /// C++ compiler, `None` if C++ sources cannot be built
    pub cxx_compiler: Option<String>,
    /// Linker driver for executables and shared libraries
    pub linker: String,
    /// Static library archiver
    pub archiver: String,
    /// Object file extension, including the dot
    pub object_extension: String,
    /// Prefix for include directories (`-I`, `/I`)
    pub include_flag_prefix: String,
    /// Prefix for preprocessor defines (`-D`, `/D`)
    pub define_flag_prefix: String,
    /// How outputs are named on the command line
    pub output_flag_style: OutputFlagStyle,
    /// Link flag that produces a shared library
    pub shared_flag: String,
    /// Header dependency discovery
    pub deps_style: DepsStyle,
    /// Compile flags added in debug builds
    pub debug_flags: Vec<String>,
    /// Compile flags added in release builds
    pub release_flags: Vec<String>,
}

impl ToolchainProfile {
    /// Profile for a toolchain family with its default executable names.
    pub fn for_platform(platform: ToolchainPlatform) -> Self {
        match platform {
            ToolchainPlatform::Gcc => gcc::gcc_profile(),
            ToolchainPlatform::Clang => gcc::clang_profile(),
            ToolchainPlatform::Msvc => msvc::msvc_profile(),
        }
    }

    /// GCC profile (`gcc`, `g++`, `ar`).
    pub fn gcc() -> Self {
        gcc::gcc_profile()
    }

    /// Clang profile (`clang`, `clang++`, `ar`).
    pub fn clang() -> Self {
        gcc::clang_profile()
    }

    /// MSVC profile (`cl`, `link`, `lib`).
    pub fn msvc() -> Self {
        msvc::msvc_profile()
    }

    /// Compiler for a language class.
    pub fn compiler(&self, lang: Language) -> Result<&str, GenerationError> {
        let compiler = match lang {
            Language::C => self.c_compiler.as_deref(),
            Language::Cxx => self.cxx_compiler.as_deref(),
        };
        compiler
            .filter(|c| !c.is_empty())
            .ok_or_else(|| GenerationError::UnsupportedToolchain {
                language_class: lang.as_str().to_string(),
            })
    }

    /// Compile flags contributed by the build type.
    pub fn build_type_flags(&self, build_type: BuildType) -> &[String] {
        match build_type {
            BuildType::Debug => &self.debug_flags,
            BuildType::Release => &self.release_flags,
        }
    }

    /// Format an include directory as a compiler argument.
    pub fn include_flag(&self, dir: &str) -> String {
        format!("{}{}", self.include_flag_prefix, dir)
    }

    /// Format a `NAME` or `NAME=VALUE` define as a compiler argument.
    pub fn define_flag(&self, define: &str) -> String {
        format!("{}{}", self.define_flag_prefix, define)
    }

    /// Ninja command for the compile rule of `lang`.
    pub fn compile_command(&self, lang: Language) -> Result<String, GenerationError> {
        let compiler = escape(self.compiler(lang)?)?;
        Ok(match self.platform {
            ToolchainPlatform::Msvc => format!(
                "{} /nologo {} $flags $incs $defines /c $in {}",
                compiler,
                self.deps_style.compile_args(),
                self.output_flag_style.compile_output()
            ),
            ToolchainPlatform::Gcc | ToolchainPlatform::Clang => format!(
                "{} {} $flags $incs $defines -c $in {}",
                compiler,
                self.deps_style.compile_args(),
                self.output_flag_style.compile_output()
            ),
        })
    }

    /// Ninja command for the link rule.
    pub fn link_command(&self) -> Result<String, GenerationError> {
        let linker = escape(&self.linker)?;
        Ok(match self.platform {
            ToolchainPlatform::Msvc => format!(
                "{} /nologo $ldflags {} $in $libs",
                linker,
                self.output_flag_style.link_output()
            ),
            ToolchainPlatform::Gcc | ToolchainPlatform::Clang => format!(
                "{} {} $in $libs $ldflags",
                linker,
                self.output_flag_style.link_output()
            ),
        })
    }

    /// Ninja command for the archive rule.
    pub fn archive_command(&self) -> Result<String, GenerationError> {
        let archiver = escape(&self.archiver)?;
        Ok(match self.platform {
            ToolchainPlatform::Msvc => format!(
                "{} /nologo {} $in",
                archiver,
                self.output_flag_style.link_output()
            ),
            ToolchainPlatform::Gcc | ToolchainPlatform::Clang => {
                format!("{} rcs $out $in", archiver)
            }
        })
    }

    /// Ninja command that writes a unity source including every input.
    pub fn unity_command(&self) -> &'static str {
        match self.platform {
            ToolchainPlatform::Msvc => msvc::UNITY_COMMAND,
            ToolchainPlatform::Gcc | ToolchainPlatform::Clang => gcc::UNITY_COMMAND,
        }
    }
}

impl Default for ToolchainProfile {
    fn default() -> Self {
        gcc::gcc_profile()
    }
}
