use std::{env, path::PathBuf};

// ffmpeg-next links FFmpeg through ffmpeg-sys-next, which on Windows only
// finds a vcpkg install when FFMPEG_DIR points at it.
fn main() {
    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    let is_windows = env::var("CARGO_CFG_TARGET_OS").is_ok_and(|os| os == "windows");
    if !is_windows || env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    let Some(vcpkg_root) = env::var_os("VCPKG_ROOT") else {
        println!("cargo:warning=clipsampler: FFMPEG_DIR is not set; point it at an FFmpeg install (e.g. vcpkg) to build on Windows.");
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = PathBuf::from(vcpkg_root).join("installed").join(triplet);
    if candidate.exists() {
        println!(
            "cargo:warning=clipsampler: found vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to use it.",
            candidate.display(),
        );
    } else {
        println!(
            "cargo:warning=clipsampler: VCPKG_ROOT is set but {} does not exist.",
            candidate.display(),
        );
    }
}
