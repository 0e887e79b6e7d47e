//! Writing, archiving and installing the rendered files.

use super::cli::{tool_error, ToolRunner};
use crate::config;
use crate::error::WgError;
use crate::output::{Artifact, ArtifactSet};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Write every artifact into `outdir`, creating it when needed.
pub fn write_artifacts(outdir: &Path, set: &ArtifactSet) -> Result<Vec<PathBuf>, WgError> {
    std::fs::create_dir_all(outdir).map_err(|e| WgError::io(outdir, e))?;
    set.all()
        .into_iter()
        .map(|artifact| write_artifact(outdir, artifact))
        .collect()
}

fn write_artifact(outdir: &Path, artifact: &Artifact) -> Result<PathBuf, WgError> {
    let path = outdir.join(&artifact.name);
    std::fs::write(&path, &artifact.contents).map_err(|e| WgError::io(&path, e))?;
    set_mode(&path, artifact.executable)?;
    log::debug!("wrote {} ({} bytes)", path.display(), artifact.contents.len());
    Ok(path)
}

#[cfg(unix)]
fn set_mode(path: &Path, executable: bool) -> Result<(), WgError> {
    use std::os::unix::fs::PermissionsExt;
    let mode = if executable { 0o755 } else { 0o600 };
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(|e| WgError::io(path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _executable: bool) -> Result<(), WgError> {
    Ok(())
}

fn remove_stale(path: &Path) -> Result<(), WgError> {
    if path.exists() {
        log::debug!("removing stale {}", path.display());
        std::fs::remove_file(path).map_err(|e| WgError::io(path, e))?;
    }
    Ok(())
}

/// Build `wg_server.tgz` and one `wg_client<N>.zip` per client.
///
/// Returns the archive names in creation order; the first failure aborts.
pub async fn package_artifacts<R: ToolRunner>(
    runner: &R,
    outdir: &Path,
    set: &ArtifactSet,
) -> Result<Vec<String>, WgError> {
    let mut archives = Vec::with_capacity(set.client_confs.len() + 1);

    remove_stale(&outdir.join(config::SERVER_ARCHIVE))?;
    let cmd = format!(
        "tar czf {} {}",
        config::SERVER_ARCHIVE,
        set.server_bundle().join(" ")
    );
    runner
        .run(&cmd, None, Some(outdir))
        .await
        .map_err(tool_error)?;
    log::info!("packaged {}", config::SERVER_ARCHIVE.green());
    archives.push(config::SERVER_ARCHIVE.to_string());

    for n in 1..=set.client_confs.len() {
        let archive = config::client_archive_name(n);
        let files = set
            .client_bundle(n)
            .ok_or_else(|| WgError::ExternalTool(format!("no files for client {n}")))?;
        remove_stale(&outdir.join(&archive))?;
        let cmd = format!("zip -q {archive} {}", files.join(" "));
        runner
            .run(&cmd, None, Some(outdir))
            .await
            .map_err(tool_error)?;
        log::info!("packaged {}", archive.green());
        archives.push(archive);
    }
    Ok(archives)
}

/// Run the server install script inside `outdir`.
pub async fn install_server<R: ToolRunner>(runner: &R, outdir: &Path) -> Result<(), WgError> {
    log::warn!("running {} on this host", config::SERVER_INSTALL_SH.on_blue());
    let cmd = format!("sh {}", config::SERVER_INSTALL_SH);
    match runner.run(&cmd, None, Some(outdir)).await {
        Ok(output) => {
            log::info!("install output:\n{}", output.trim_end());
            Ok(())
        }
        Err(e) => Err(WgError::InstallFailed(e.to_string())),
    }
}

/// Delete the loose files once they are archived.
pub fn remove_loose_files(outdir: &Path, set: &ArtifactSet) -> Result<(), WgError> {
    for artifact in set.all() {
        let path = outdir.join(&artifact.name);
        std::fs::remove_file(&path).map_err(|e| WgError::io(&path, e))?;
    }
    log::debug!("removed loose files from {}", outdir.display());
    Ok(())
}
