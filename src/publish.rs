use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread;
use std::time::Duration;
use uuid::Uuid;

use crate::config::RemoteConfig;

// The remote is eventually consistent: a delete or an upload needs a
// moment to land before the next operation can observe it.
const DELETE_SETTLE: Duration = Duration::from_secs(2);
const UPLOAD_SETTLE: Duration = Duration::from_secs(1);

/// Destination for filled documents.
///
/// All three operations are idempotent from the caller's perspective:
/// `exists` on a missing name is `false`, `delete` on a missing name
/// succeeds, and `put` on an existing name replaces it. Failures are
/// logged and reported as `false`; the sink never panics.
pub trait PublishSink {
    fn exists(&self, name: &str) -> bool;
    fn put(&self, local_path: &Path, name: &str) -> bool;
    fn delete(&self, name: &str) -> bool;
}

/// Publish sink shelling out to an `rclone` binary.
pub struct RcloneSink {
    rclone_path: String,
    remote_name: String,
    folder: String,
}

impl RcloneSink {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            rclone_path: config.rclone_path.clone(),
            remote_name: config.remote_name.clone(),
            folder: config.folder.clone(),
        }
    }

    fn remote_folder(&self) -> String {
        format!("{}:{}", self.remote_name, self.folder)
    }

    fn remote_file(&self, name: &str) -> String {
        format!("{}:{}/{}", self.remote_name, self.folder, name)
    }

    fn run(&self, args: &[&str]) -> Option<Output> {
        debug!("Running: {} {}", self.rclone_path, args.join(" "));
        match Command::new(&self.rclone_path).args(args).output() {
            Ok(output) => Some(output),
            Err(e) => {
                error!("Failed to spawn {}: {}", self.rclone_path, e);
                None
            }
        }
    }

    /// Unique scratch directory for staging one upload.
    fn staging_dir() -> PathBuf {
        let unique = Uuid::new_v4().simple().to_string();
        std::env::temp_dir().join(format!("docmerge_{}", &unique[..8]))
    }
}

impl PublishSink for RcloneSink {
    fn exists(&self, name: &str) -> bool {
        let remote = self.remote_file(name);
        let output = match self.run(&["lsf", &remote]) {
            Some(output) => output,
            None => return false,
        };
        let listed = output.status.success()
            && !String::from_utf8_lossy(&output.stdout).trim().is_empty();
        debug!("{} exists on remote: {}", name, listed);
        listed
    }

    fn delete(&self, name: &str) -> bool {
        if !self.exists(name) {
            info!("No delete needed, {} does not exist on remote", name);
            return true;
        }
        let remote = self.remote_file(name);
        let output = match self.run(&["deletefile", &remote]) {
            Some(output) => output,
            None => return false,
        };
        if output.status.success() {
            info!("Deleted {} from remote", name);
            thread::sleep(DELETE_SETTLE);
            true
        } else {
            error!(
                "Failed to delete {} from remote: {}",
                name,
                String::from_utf8_lossy(&output.stderr)
            );
            false
        }
    }

    fn put(&self, local_path: &Path, name: &str) -> bool {
        if !local_path.exists() {
            error!("Local file does not exist: {:?}", local_path);
            return false;
        }

        // The remote rejects same-name uploads on some backends, so clear
        // the slot first.
        if self.exists(name) && !self.delete(name) {
            warn!("Could not delete existing {}, upload may fail", name);
        }

        // Stage through a scratch directory so the uploaded file carries
        // exactly the requested name.
        let staging = Self::staging_dir();
        if let Err(e) = fs::create_dir_all(&staging) {
            error!("Failed to create staging directory {:?}: {}", staging, e);
            return false;
        }
        let staged = staging.join(name);
        if let Err(e) = fs::copy(local_path, &staged) {
            error!("Failed to stage {:?}: {}", local_path, e);
            let _ = fs::remove_dir_all(&staging);
            return false;
        }

        info!("Uploading {} to {}", name, self.remote_folder());
        let staged_str = staged.to_string_lossy().into_owned();
        let folder = format!("{}/", self.remote_folder());
        let mut success = match self.run(&[
            "copy",
            &staged_str,
            &folder,
            "--ignore-checksum",
            "--ignore-size",
        ]) {
            Some(output) if output.status.success() => true,
            Some(output) => {
                warn!(
                    "First upload attempt failed: {}",
                    String::from_utf8_lossy(&output.stderr)
                );
                // Retry with copyto to target the exact remote file.
                let remote = self.remote_file(name);
                match self.run(&[
                    "copyto",
                    &staged_str,
                    &remote,
                    "--ignore-checksum",
                    "--ignore-size",
                ]) {
                    Some(retry) if retry.status.success() => true,
                    Some(retry) => {
                        error!(
                            "All upload attempts failed: {}",
                            String::from_utf8_lossy(&retry.stderr)
                        );
                        false
                    }
                    None => false,
                }
            }
            None => false,
        };

        if success {
            thread::sleep(UPLOAD_SETTLE);
            if self.exists(name) {
                info!("Verified: {} exists on remote", name);
            } else {
                warn!("Verification failed: {} is not visible on remote", name);
                success = false;
            }
        }

        if let Err(e) = fs::remove_dir_all(&staging) {
            warn!("Failed to clean staging directory {:?}: {}", staging, e);
        }

        success
    }
}
