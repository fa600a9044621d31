//! Version-control collaborator.
//!
//! The reconciler never builds command lines itself; everything it needs from
//! version control goes through [`Vcs`]. [`GitCli`] implements it by running
//! the `git` binary with explicit argument vectors (no shell).

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::error::VcsError;

/// Version-control operations consumed by reintegration.
pub trait Vcs {
    /// Make `root` a repository unless it already is inside one.
    fn init(&self, root: &Path) -> Result<(), VcsError>;

    /// Tracked, modified and untracked-but-not-ignored files under `root`,
    /// relative to `root`.
    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>, VcsError>;

    /// Whether the two files differ in content or mode.
    fn has_diff(&self, a: &Path, b: &Path) -> Result<bool, VcsError>;

    /// Whether the working tree at `root` has deleted, modified or
    /// untracked-but-not-ignored files.
    fn has_unstaged_changes(&self, root: &Path) -> Result<bool, VcsError>;

    /// Stage hunks of `file` interactively, attached to the user's terminal.
    fn interactive_patch(&self, root: &Path, file: &Path) -> Result<(), VcsError>;

    /// Shallow-clone `url` into `dest`.
    fn clone_shallow(&self, url: &str, dest: &Path) -> Result<(), VcsError>;
}

// ---------------------------------------------------------------------------
// GitCli
// ---------------------------------------------------------------------------

/// [`Vcs`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: OsString,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, cwd: Option<&Path>, args: &[&OsStr]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn describe(&self, args: &[&OsStr]) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        parts.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    /// Run non-interactively and capture output; the exit status is left to
    /// the caller.
    fn output(&self, cwd: Option<&Path>, args: &[&OsStr]) -> Result<Output, VcsError> {
        tracing::debug!(command = %self.describe(args), cwd = ?cwd, "running git");
        self.command(cwd, args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| VcsError::Spawn {
                command: self.describe(args),
                source,
            })
    }

    /// Run non-interactively; a non-zero exit is an error.
    fn checked(&self, cwd: Option<&Path>, args: &[&OsStr]) -> Result<Vec<u8>, VcsError> {
        let output = self.output(cwd, args)?;
        if !output.status.success() {
            return Err(self.failure(args, &output));
        }
        Ok(output.stdout)
    }

    fn failure(&self, args: &[&OsStr], output: &Output) -> VcsError {
        VcsError::Failed {
            command: self.describe(args),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    fn is_work_tree(&self, root: &Path) -> Result<bool, VcsError> {
        let output = self.output(Some(root), &[os("rev-parse"), os("--is-inside-work-tree")])?;
        Ok(output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true")
    }
}

impl Vcs for GitCli {
    fn init(&self, root: &Path) -> Result<(), VcsError> {
        if self.is_work_tree(root)? {
            return Ok(());
        }
        self.checked(None, &[os("init"), os("--quiet"), root.as_os_str()])?;
        tracing::info!(path = %root.display(), "initialised git repository");
        Ok(())
    }

    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>, VcsError> {
        let stdout = self.checked(
            Some(root),
            &[
                os("ls-files"),
                os("--cached"),
                os("--modified"),
                os("--others"),
                os("--exclude-standard"),
                os("--deduplicate"),
                os("-z"),
            ],
        )?;
        Ok(split_nul(&stdout))
    }

    fn has_diff(&self, a: &Path, b: &Path) -> Result<bool, VcsError> {
        let args = [
            os("diff"),
            os("--no-index"),
            os("--quiet"),
            os("--"),
            a.as_os_str(),
            b.as_os_str(),
        ];
        let output = self.output(None, &args)?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(self.failure(&args, &output)),
        }
    }

    fn has_unstaged_changes(&self, root: &Path) -> Result<bool, VcsError> {
        let stdout = self.checked(
            Some(root),
            &[
                os("ls-files"),
                os("--deleted"),
                os("--modified"),
                os("--others"),
                os("--exclude-standard"),
                os("-z"),
            ],
        )?;
        let changes = split_nul(&stdout);
        tracing::debug!(path = %root.display(), count = changes.len(), "unstaged changes");
        Ok(!changes.is_empty())
    }

    fn interactive_patch(&self, root: &Path, file: &Path) -> Result<(), VcsError> {
        let args = [
            os("add"),
            os("--all"),
            os("--patch"),
            os("--"),
            file.as_os_str(),
        ];
        let status = self
            .command(Some(root), &args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| VcsError::Spawn {
                command: self.describe(&args),
                source,
            })?;
        if !status.success() {
            return Err(VcsError::Failed {
                command: self.describe(&args),
                status: status.to_string(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    fn clone_shallow(&self, url: &str, dest: &Path) -> Result<(), VcsError> {
        self.checked(
            None,
            &[
                os("clone"),
                os("--quiet"),
                os("--depth"),
                os("1"),
                os("--"),
                os(url),
                dest.as_os_str(),
            ],
        )?;
        Ok(())
    }
}

fn os(s: &str) -> &OsStr {
    OsStr::new(s)
}

fn split_nul(stdout: &[u8]) -> Vec<PathBuf> {
    stdout
        .split(|b| *b == 0)
        .filter(|entry| !entry.is_empty())
        .map(path_from_bytes)
        .collect()
}

/// Git prints file names as raw bytes; on unix they map onto paths as is.
#[cfg(unix)]
fn path_from_bytes(entry: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(entry))
}

#[cfg(not(unix))]
fn path_from_bytes(entry: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(entry).into_owned())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[test]
    fn split_nul_drops_empty_entries() {
        let parsed = split_nul(b"a.txt\0dir/b.txt\0\0");
        assert_eq!(parsed, vec![PathBuf::from("a.txt"), PathBuf::from("dir/b.txt")]);
        assert!(split_nul(b"").is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn split_nul_keeps_non_utf8_names_byte_exact() {
        use std::os::unix::ffi::OsStrExt;

        let parsed = split_nul(b"caf\xe9.txt\0ok.txt\0");
        assert_eq!(parsed[0].as_os_str().as_bytes(), b"caf\xe9.txt");
        assert_eq!(parsed[1], PathBuf::from("ok.txt"));
    }

    #[test]
    fn missing_binary_is_spawn_error() {
        let git = GitCli::new("stencil-no-such-git-binary");
        let dir = TempDir::new().unwrap();
        let err = git.list_files(dir.path()).unwrap_err();
        assert!(matches!(err, VcsError::Spawn { .. }), "got: {err}");
        assert!(err.to_string().contains("ls-files"));
    }

    #[test]
    fn init_is_idempotent_and_lists_untracked_files() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("b.txt"), "b").unwrap();
        fs::write(dir.path().join(".gitignore"), "ignored.log\n").unwrap();
        fs::write(dir.path().join("ignored.log"), "x").unwrap();

        let git = GitCli::default();
        git.init(dir.path()).expect("init");
        git.init(dir.path()).expect("second init");

        let mut files = git.list_files(dir.path()).expect("list");
        files.sort();
        assert_eq!(
            files,
            vec![
                PathBuf::from(".gitignore"),
                PathBuf::from("a.txt"),
                PathBuf::from("sub/b.txt"),
            ]
        );
        assert!(git.has_unstaged_changes(dir.path()).expect("status"));
    }

    #[test]
    fn has_diff_compares_content() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        let c = dir.path().join("c.txt");
        fs::write(&a, "same\n").unwrap();
        fs::write(&b, "same\n").unwrap();
        fs::write(&c, "different\n").unwrap();

        let git = GitCli::default();
        assert!(!git.has_diff(&a, &b).expect("diff a b"));
        assert!(git.has_diff(&a, &c).expect("diff a c"));
    }

    #[test]
    fn unstaged_check_outside_repository_fails() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let err = GitCli::default()
            .has_unstaged_changes(&dir.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, VcsError::Spawn { .. } | VcsError::Failed { .. }));
    }
}
