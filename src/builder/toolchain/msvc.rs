//! MSVC toolchain profile.

use super::{DepsStyle, OutputFlagStyle, ToolchainPlatform, ToolchainProfile};

/// Writes one `#include "<input>"` line per input into `$out`.
pub(super) const UNITY_COMMAND: &str =
    "cmd /c (for %f in ($in) do @echo #include \"%f\") > $out";

pub(super) fn msvc_profile() -> ToolchainProfile {
    ToolchainProfile {
        platform: ToolchainPlatform::Msvc,
        // MSVC uses the same cl.exe for both C and C++
        c_compiler: Some("cl".to_string()),
        cxx_compiler: Some("cl".to_string()),
        linker: "link".to_string(),
        archiver: "lib".to_string(),
        object_extension: ".obj".to_string(),
        include_flag_prefix: "/I".to_string(),
        define_flag_prefix: "/D".to_string(),
        output_flag_style: OutputFlagStyle::Msvc,
        shared_flag: "/DLL".to_string(),
        deps_style: DepsStyle::Msvc,
        debug_flags: vec!["/Od".to_string(), "/Zi".to_string()],
        release_flags: vec!["/O2".to_string()],
    }
}
