// Rust guideline compliant 2026-10-19

//! [`Vcs`] implementation backed by a real repository.
//!
//! Queries are answered through `git2`. Mutations run the `git` binary so that
//! conflicted rebases, merges and stash pops leave the repository in git's own
//! resumable state, exactly as if the operator had typed the commands.

use crate::vcs::{
    Integration, PushMode, RepoOperation, StashEntry, Vcs, WorktreeStatus,
};
use crate::{Error, Result};
use git2::{BranchType, ErrorCode, Oid, Repository, RepositoryState, StatusOptions};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Captured result of one `git` invocation.
#[derive(Debug)]
struct GitOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

impl GitOutput {
    /// Most useful single line of git's complaint.
    fn detail(&self) -> String {
        let text = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("hint:"))
            .collect();
        lines
            .iter()
            .find(|l| l.starts_with("error:") || l.starts_with("fatal:") || l.starts_with('!'))
            .or_else(|| lines.last())
            .map(|l| l.to_string())
            .unwrap_or_else(|| "no output".to_string())
    }
}

/// Directory holding refs and config shared by all worktrees.
///
/// A linked worktree's git dir carries a `commondir` file pointing at the main
/// repository's git dir, either absolute or relative to the worktree's git dir.
fn shared_git_dir(git_dir: &Path) -> Result<PathBuf> {
    let pointer = git_dir.join("commondir");
    if !pointer.is_file() {
        return Ok(git_dir.to_path_buf());
    }
    let target = std::fs::read_to_string(&pointer)?;
    let target = Path::new(target.trim());
    let joined = if target.is_absolute() {
        target.to_path_buf()
    } else {
        git_dir.join(target)
    };
    Ok(joined.canonicalize().unwrap_or(joined))
}

/// A repository driven through `git2` and the `git` command line.
pub struct GitCli {
    repo: Repository,
    workdir: PathBuf,
    git_dir: PathBuf,
    common_dir: PathBuf,
}

impl GitCli {
    /// Opens the repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARepository`] if no repository is found, or
    /// [`Error::BareRepository`] if it has no working tree.
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .map_err(|_| Error::NotARepository(path.to_path_buf()))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| Error::BareRepository(repo.path().to_path_buf()))?
            .to_path_buf();
        let git_dir = repo.path().to_path_buf();
        let common_dir = shared_git_dir(&git_dir)?;
        debug!(workdir = %workdir.display(), "opened repository");
        Ok(Self {
            repo,
            workdir,
            git_dir,
            common_dir,
        })
    }

    fn run(&self, args: &[&str]) -> Result<GitOutput> {
        debug!(args = %args.join(" "), "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .output()?;
        let result = GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if !result.success {
            debug!(args = %args.join(" "), stderr = %result.stderr.trim(), "git failed");
        }
        Ok(result)
    }

    fn run_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if !output.success {
            return Err(Error::Command {
                args: args.join(" "),
                detail: output.detail(),
            });
        }
        Ok(output.stdout)
    }

    fn resolve_oid(&self, rev: &str) -> Result<Option<Oid>> {
        match self.repo.revparse_single(rev) {
            Ok(object) => Ok(Some(object.peel_to_commit()?.id())),
            Err(err) if err.code() == ErrorCode::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn require_oid(&self, rev: &str) -> Result<Oid> {
        self.resolve_oid(rev)?.ok_or_else(|| Error::Command {
            args: format!("rev-parse {}", rev),
            detail: "unknown revision".to_string(),
        })
    }

    /// Classifies a failed rebase or merge: conflict if git left the operation open.
    fn stopped_or_failed(
        &self,
        args: &[&str],
        output: &GitOutput,
        expected: RepoOperation,
    ) -> Result<Integration> {
        if self.operation_in_progress()? == Some(expected) {
            warn!(args = %args.join(" "), "stopped on conflicts");
            return Ok(Integration::Conflicted);
        }
        Err(Error::Command {
            args: args.join(" "),
            detail: output.detail(),
        })
    }
}

impl Vcs for GitCli {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    fn common_dir(&self) -> &Path {
        &self.common_dir
    }

    fn remotes(&self) -> Result<Vec<String>> {
        let remotes = self.repo.remotes()?;
        Ok(remotes.iter().flatten().map(str::to_string).collect())
    }

    fn local_branches(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(err) if err.code() == ErrorCode::UnbornBranch => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if !head.is_branch() {
            return Ok(None);
        }
        Ok(head.shorthand().map(str::to_string))
    }

    fn operation_in_progress(&self) -> Result<Option<RepoOperation>> {
        let op = match self.repo.state() {
            RepositoryState::Clean => None,
            RepositoryState::Merge => Some(RepoOperation::Merge),
            RepositoryState::Rebase
            | RepositoryState::RebaseInteractive
            | RepositoryState::RebaseMerge
            | RepositoryState::ApplyMailboxOrRebase => Some(RepoOperation::Rebase),
            RepositoryState::ApplyMailbox => Some(RepoOperation::ApplyMailbox),
            RepositoryState::CherryPick | RepositoryState::CherryPickSequence => {
                Some(RepoOperation::CherryPick)
            }
            RepositoryState::Revert | RepositoryState::RevertSequence => {
                Some(RepoOperation::Revert)
            }
            RepositoryState::Bisect => Some(RepoOperation::Bisect),
        };
        Ok(op)
    }

    fn worktree_status(&self) -> Result<WorktreeStatus> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(false)
            .include_ignored(false);
        let statuses = self.repo.statuses(Some(&mut options))?;

        let mut summary = WorktreeStatus::default();
        for entry in statuses.iter() {
            let status = entry.status();
            if status.is_wt_new() {
                summary.untracked += 1;
                continue;
            }
            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                summary.staged += 1;
            }
            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
                || status.is_conflicted()
            {
                summary.modified += 1;
            }
        }
        Ok(summary)
    }

    fn resolve(&self, rev: &str) -> Result<Option<String>> {
        Ok(self.resolve_oid(rev)?.map(|oid| oid.to_string()))
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let ancestor = self.require_oid(ancestor)?;
        let descendant = self.require_oid(descendant)?;
        if ancestor == descendant {
            return Ok(true);
        }
        Ok(self.repo.graph_descendant_of(descendant, ancestor)?)
    }

    fn count_commits(&self, from: &str, to: &str) -> Result<usize> {
        let from = self.require_oid(from)?;
        let to = self.require_oid(to)?;
        let (ahead, _behind) = self.repo.graph_ahead_behind(to, from)?;
        Ok(ahead)
    }

    fn stash_push(&self, message: &str, include_untracked: bool) -> Result<()> {
        let mut args = vec!["stash", "push"];
        if include_untracked {
            args.push("--include-untracked");
        }
        args.extend(["--message", message]);
        self.run_checked(&args)?;
        Ok(())
    }

    fn stash_list(&self) -> Result<Vec<StashEntry>> {
        let stdout = self.run_checked(&["stash", "list", "--format=%gd%x09%gs"])?;
        Ok(stdout
            .lines()
            .filter_map(|line| {
                let (reference, message) = line.split_once('\t')?;
                Some(StashEntry {
                    reference: reference.to_string(),
                    message: message.to_string(),
                })
            })
            .collect())
    }

    fn stash_pop(&self, reference: &str) -> Result<Integration> {
        let output = self.run(&["stash", "pop", reference])?;
        if output.success {
            Ok(Integration::Clean)
        } else {
            warn!(reference, detail = %output.detail(), "stash pop failed");
            Ok(Integration::Conflicted)
        }
    }

    fn fetch(&self, remote: &str, branch: &str) -> Result<bool> {
        let refspec = format!("+refs/heads/{0}:refs/remotes/{1}/{0}", branch, remote);
        let output = self.run(&["fetch", "--no-tags", remote, &refspec])?;
        if output.success {
            return Ok(true);
        }
        if output.stderr.contains("couldn't find remote ref") {
            debug!(remote, branch, "remote branch does not exist");
            return Ok(false);
        }
        Err(Error::FetchFailed {
            remote: remote.to_string(),
            detail: output.detail(),
        })
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        let output = self.run(&["switch", branch])?;
        if output.success {
            Ok(())
        } else {
            Err(Error::CheckoutFailed {
                branch: branch.to_string(),
                detail: output.detail(),
            })
        }
    }

    fn abort(&self, operation: RepoOperation) -> Result<()> {
        let args: &[&str] = match operation {
            RepoOperation::Rebase => &["rebase", "--abort"],
            RepoOperation::Merge => &["merge", "--abort"],
            RepoOperation::CherryPick => &["cherry-pick", "--abort"],
            RepoOperation::Revert => &["revert", "--abort"],
            RepoOperation::Bisect => &["bisect", "reset"],
            RepoOperation::ApplyMailbox => &["am", "--abort"],
        };
        self.run_checked(args)?;
        Ok(())
    }

    fn rebase(&self, onto: &str) -> Result<Integration> {
        let args = ["rebase", onto];
        let output = self.run(&args)?;
        if output.success {
            return Ok(Integration::Clean);
        }
        self.stopped_or_failed(&args, &output, RepoOperation::Rebase)
    }

    fn merge(&self, rev: &str) -> Result<Integration> {
        let args = ["merge", "--no-edit", rev];
        let output = self.run(&args)?;
        if output.success {
            return Ok(Integration::Clean);
        }
        self.stopped_or_failed(&args, &output, RepoOperation::Merge)
    }

    fn push(&self, remote: &str, branch: &str, mode: &PushMode) -> Result<()> {
        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
        let lease = match mode {
            PushMode::FastForward => None,
            PushMode::Lease { expected } => Some(format!(
                "--force-with-lease=refs/heads/{}:{}",
                branch,
                expected.as_deref().unwrap_or("")
            )),
        };

        let mut args = vec!["push", "--porcelain"];
        if let Some(lease) = lease.as_deref() {
            args.push(lease);
        }
        args.extend([remote, refspec.as_str()]);

        let output = self.run(&args)?;
        if output.success {
            return Ok(());
        }
        Err(Error::PushRejected {
            remote: remote.to_string(),
            branch: branch.to_string(),
            detail: output.detail(),
        })
    }
}
