//! GCC/Clang toolchain profiles.

use std::path::{Path, PathBuf};

use super::{DepsStyle, OutputFlagStyle, ToolchainPlatform, ToolchainProfile};

/// Writes one `#include "<input>"` line per input into `$out`.
pub(super) const UNITY_COMMAND: &str = "printf '#include \"%s\"\\n' $in > $out";

fn gnu_profile(platform: ToolchainPlatform, cc: &str, cxx: &str) -> ToolchainProfile {
    ToolchainProfile {
        platform,
        c_compiler: Some(cc.to_string()),
        cxx_compiler: Some(cxx.to_string()),
        linker: cxx.to_string(),
        archiver: "ar".to_string(),
        object_extension: ".o".to_string(),
        include_flag_prefix: "-I".to_string(),
        define_flag_prefix: "-D".to_string(),
        output_flag_style: OutputFlagStyle::Gnu,
        shared_flag: "-shared".to_string(),
        deps_style: DepsStyle::Gcc,
        debug_flags: vec!["-g".to_string()],
        release_flags: vec!["-O2".to_string()],
    }
}

pub(super) fn gcc_profile() -> ToolchainProfile {
    gnu_profile(ToolchainPlatform::Gcc, "gcc", "g++")
}

pub(super) fn clang_profile() -> ToolchainProfile {
    gnu_profile(ToolchainPlatform::Clang, "clang", "clang++")
}

/// Infer C++ compiler path from C compiler path.
///
/// Handles common patterns:
/// - gcc, x86_64-linux-gnu-gcc -> g++, x86_64-linux-gnu-g++
/// - clang -> clang++
/// - cc, /usr/bin/cc -> c++, /usr/bin/c++
pub fn infer_cxx(cc: &Path) -> PathBuf {
    let cc_str = cc.to_string_lossy();

    if cc_str.ends_with("gcc") {
        return PathBuf::from(format!("{}++", &cc_str[..cc_str.len() - 2]));
    }

    if cc_str.ends_with("clang") {
        return PathBuf::from(format!("{}++", cc_str));
    }

    // Only match "cc" as a complete basename (not "mycc")
    let is_standalone_cc = cc_str == "cc"
        || cc_str.ends_with("/cc")
        || cc_str.ends_with("\\cc")
        || cc_str.ends_with("-cc");

    if is_standalone_cc {
        return PathBuf::from(format!("{}++", &cc_str[..cc_str.len() - 1]));
    }

    PathBuf::from(format!("{}++", cc_str))
}
