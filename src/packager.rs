use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::{Platform, UpdateJob};
use crate::errors::UpdaterError;

const IOS_BUNDLE: &str = "output/main.jsbundle.zip";
const ANDROID_BUNDLE: &str = "output/index.android.bundle.zip";
const DESKTOP_ARCHIVE: &str = "app.zip";
const ARCHIVE_ENTRY: &str = "app.asar";

pub fn prepare_artifact(job: &UpdateJob, workdir: &Path) -> Result<PathBuf, UpdaterError> {
    if job.is_mobile() {
        // Mobile bundles are produced by an external build step; this only
        // points at the conventional location. Existence is checked at upload.
        Ok(workdir.join(mobile_bundle(job)))
    } else {
        prepare_desktop(job, workdir, cfg!(target_os = "windows"))
    }
}

fn mobile_bundle(job: &UpdateJob) -> &'static str {
    if job.targets(Platform::Ios) {
        IOS_BUNDLE
    } else {
        ANDROID_BUNDLE
    }
}

fn prepare_desktop(
    job: &UpdateJob,
    workdir: &Path,
    windows_host: bool,
) -> Result<PathBuf, UpdaterError> {
    let source = workdir.join(desktop_bundle_path(job, windows_host)?);

    if !source.exists() {
        return Err(UpdaterError::Packaging(format!("missing {:?}", source)));
    }

    let archive = workdir.join(DESKTOP_ARCHIVE);
    compress(&source, &archive)?;

    Ok(archive)
}

fn desktop_bundle_path(job: &UpdateJob, windows_host: bool) -> Result<PathBuf, UpdaterError> {
    if windows_host {
        return Ok(PathBuf::from("dist/win-unpacked/resources/app.asar"));
    }

    match &job.product_name {
        Some(product) => Ok(PathBuf::from(format!(
            "dist/mac-arm64/{}.app/Contents/Resources/app.asar",
            product
        ))),
        None => Err(UpdaterError::Packaging(
            "missing parameter productName".to_string(),
        )),
    }
}

fn compress(source: &Path, archive: &Path) -> Result<(), UpdaterError> {
    info!("Compressing {:?}", source);

    let output = fs::File::create(archive)?;
    let mut writer = ZipWriter::new(output);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer
        .start_file(ARCHIVE_ENTRY, options)
        .map_err(|e| UpdaterError::Packaging(e.to_string()))?;

    let mut input = fs::File::open(source)?;
    io::copy(&mut input, &mut writer)?;

    writer
        .finish()
        .map_err(|e| UpdaterError::Packaging(e.to_string()))?;

    let size = fs::metadata(archive)?.len();
    info!("Compression completed, archive size: {} bytes", size);

    Ok(())
}
