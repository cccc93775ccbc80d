use std::env;
use std::path::PathBuf;

/// Where a vcpkg FFmpeg install is expected on Windows.
fn vcpkg_ffmpeg_dir(vcpkg_root: &str) -> PathBuf {
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    PathBuf::from(vcpkg_root).join("installed").join(triplet)
}

fn main() {
    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // ffmpeg-sys-next finds FFmpeg through pkg-config everywhere but Windows.
    if env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() != "windows"
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!(
            "cargo:warning=framegrab needs FFmpeg. Set FFMPEG_DIR, or install FFmpeg with vcpkg and set VCPKG_ROOT."
        );
        return;
    };

    let ffmpeg_dir = vcpkg_ffmpeg_dir(&vcpkg_root);
    if !ffmpeg_dir.exists() {
        println!(
            "cargo:warning=VCPKG_ROOT is set but {} does not exist.",
            ffmpeg_dir.display()
        );
        return;
    }

    println!(
        "cargo:warning=Found vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to skip this lookup.",
        ffmpeg_dir.display()
    );
    if env::var_os("VCPKGRS_DYNAMIC").is_none() {
        println!("cargo:warning=Set VCPKGRS_DYNAMIC=1 if that FFmpeg build is dynamic.");
    }
}
