//! Stamps the build time into the firmware as the initial wall clock; the
//! board has no battery-backed RTC.

use std::{env, fs::File, io, io::Write, path::PathBuf};

fn main() -> io::Result<()> {
    let out = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR not set"))?;

    File::create(out.join("build_time.rs"))?.write_fmt(format_args!(
        "const BUILD_UTC_EPOCH: i64 = {};\n",
        chrono::Utc::now().timestamp()
    ))?;

    Ok(())
}
