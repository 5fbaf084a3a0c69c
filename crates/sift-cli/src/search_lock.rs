use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use sift_core::keys::SubquestionKey;

/// Lock file held while one process searches one sub-question.
pub struct SearchLockGuard {
    path: PathBuf,
}

impl Drop for SearchLockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Take the per-key search lock, failing fast when another live process
/// holds it. Locks left behind by dead processes are reclaimed.
pub fn acquire_for_key(
    project_root: &Path,
    review_id: &str,
    key: &SubquestionKey,
) -> anyhow::Result<SearchLockGuard> {
    let lock_path = lock_path(project_root, review_id, key);

    for _ in 0..2 {
        match try_acquire(&lock_path) {
            Ok(guard) => return Ok(guard),
            Err(LockState::HeldBy(pid)) => {
                anyhow::bail!(
                    "a search for \"{key}\" is already running (pid {pid}); try again after it finishes"
                );
            }
            Err(LockState::Stale) => {
                tracing::debug!(path = %lock_path.display(), "removing stale search lock");
                let _ = std::fs::remove_file(&lock_path);
            }
            Err(LockState::Unknown) => break,
        }
    }

    anyhow::bail!(
        "could not acquire search lock at {}; remove it if no sift process is running",
        lock_path.display()
    )
}

fn lock_path(project_root: &Path, review_id: &str, key: &SubquestionKey) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(review_id.as_bytes());
    hasher.update(b"\n");
    hasher.update(key.as_str().as_bytes());
    let digest = hex::encode(hasher.finalize());
    project_root
        .join(sift_config::PROJECT_DIR)
        .join("locks")
        .join(format!("search-{}.lock", &digest[..16]))
}

#[derive(Debug)]
enum LockState {
    HeldBy(i32),
    Stale,
    Unknown,
}

fn try_acquire(lock_path: &Path) -> Result<SearchLockGuard, LockState> {
    if let Some(parent) = lock_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(lock_path)
    {
        Ok(mut file) => {
            let pid = std::process::id();
            let _ = writeln!(file, "{pid}");
            Ok(SearchLockGuard {
                path: lock_path.to_path_buf(),
            })
        }
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            let mut pid_buf = String::new();
            if OpenOptions::new()
                .read(true)
                .open(lock_path)
                .and_then(|mut file| file.read_to_string(&mut pid_buf))
                .is_err()
            {
                return Err(LockState::Unknown);
            }

            match pid_buf.trim().parse::<i32>().ok() {
                Some(pid) if is_process_running(pid) => Err(LockState::HeldBy(pid)),
                Some(_) => Err(LockState::Stale),
                None => Err(LockState::Unknown),
            }
        }
        Err(_) => Err(LockState::Unknown),
    }
}

fn is_process_running(pid: i32) -> bool {
    std::process::Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .status()
        .is_ok_and(|status| status.success())
}
