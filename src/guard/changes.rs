//! Change-set inspection: what would the next push contain that CI has not seen?

use super::probe::Probe;
use super::setup::{GateSetup, VcsKind};
use regex::Regex;
use std::sync::LazyLock;

// `jj status` lists working-copy changes as "<marker> <path>"
static JJ_STATUS_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[AMDRC] ").unwrap());

/// Unvalidated changes relative to trunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    /// Uncommitted working-copy modifications exist
    pub uncommitted: bool,
    /// Committed changesets ahead of trunk
    pub ahead: usize,
}

impl ChangeSummary {
    pub fn is_empty(&self) -> bool {
        !self.uncommitted && self.ahead == 0
    }
}

/// Answers "are there changes that haven't been validated".
///
/// Command failures fall back to "nothing found". This only drives an
/// advisory, so a miss costs one reminder and never a block.
pub struct ChangeInspector<'a> {
    probe: &'a dyn Probe,
}

impl<'a> ChangeInspector<'a> {
    pub fn new(probe: &'a dyn Probe) -> Self {
        Self { probe }
    }

    pub async fn inspect(&self, setup: &GateSetup) -> ChangeSummary {
        ChangeSummary {
            uncommitted: self.has_uncommitted(setup.vcs).await,
            ahead: self.count_ahead(setup).await,
        }
    }

    pub async fn has_uncommitted(&self, vcs: VcsKind) -> bool {
        match vcs {
            VcsKind::Jj => self
                .probe
                .run_ok("jj", &["status", "--color=never"])
                .await
                .is_some_and(|out| out.lines().any(|l| JJ_STATUS_LINE.is_match(l))),
            VcsKind::Git => self
                .probe
                .run_ok("git", &["status", "--porcelain"])
                .await
                .is_some_and(|out| !out.trim().is_empty()),
        }
    }

    /// Jj excludes empty changesets from the count; git counts every commit.
    pub async fn count_ahead(&self, setup: &GateSetup) -> usize {
        match setup.vcs {
            VcsKind::Jj => {
                let revset = format!("{}..@- ~ empty()", setup.trunk);
                self.probe
                    .run_ok(
                        "jj",
                        &[
                            "log",
                            "-r",
                            revset.as_str(),
                            "--no-graph",
                            "--color=never",
                            "-T",
                            r#"change_id ++ "\n""#,
                        ],
                    )
                    .await
                    .map(|out| out.lines().filter(|l| !l.trim().is_empty()).count())
                    .unwrap_or(0)
            }
            VcsKind::Git => {
                let range = format!("{}..HEAD", setup.trunk);
                self.probe
                    .run_ok("git", &["rev-list", "--count", range.as_str()])
                    .await
                    .and_then(|out| out.trim().parse().ok())
                    .unwrap_or(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::probe::fake::FakeProbe;

    const JJ_AHEAD: &str =
        r#"jj log -r main..@- ~ empty() --no-graph --color=never -T change_id ++ "\n""#;

    fn jj_setup() -> GateSetup {
        GateSetup {
            vcs: VcsKind::Jj,
            trunk: "main".to_string(),
        }
    }

    fn git_setup() -> GateSetup {
        GateSetup {
            vcs: VcsKind::Git,
            trunk: "main".to_string(),
        }
    }

    #[tokio::test]
    async fn test_jj_status_with_changes() {
        let probe = FakeProbe::new()
            .ok(
                "jj status --color=never",
                "Working copy changes:\nM src/lib.rs\nA src/new.rs\nWorking copy : abc\n",
            )
            .ok(JJ_AHEAD, "");

        let summary = ChangeInspector::new(&probe).inspect(&jj_setup()).await;
        assert!(summary.uncommitted);
        assert_eq!(summary.ahead, 0);
    }

    #[tokio::test]
    async fn test_jj_status_clean() {
        let probe = FakeProbe::new().ok(
            "jj status --color=never",
            "The working copy has no changes.\nWorking copy  (@) : abc 123 (empty) (no description set)\n",
        );

        assert!(!ChangeInspector::new(&probe).has_uncommitted(VcsKind::Jj).await);
    }

    #[tokio::test]
    async fn test_jj_ahead_counts_non_empty_lines() {
        let probe = FakeProbe::new().ok(JJ_AHEAD, "qpvuntsm\n\nkkmpptxz\n");

        assert_eq!(ChangeInspector::new(&probe).count_ahead(&jj_setup()).await, 2);
    }

    #[tokio::test]
    async fn test_git_porcelain_and_rev_list() {
        let probe = FakeProbe::new()
            .ok("git status --porcelain", " M src/main.rs\n?? notes.txt\n")
            .ok("git rev-list --count main..HEAD", "3\n");

        let summary = ChangeInspector::new(&probe).inspect(&git_setup()).await;
        assert_eq!(
            summary,
            ChangeSummary {
                uncommitted: true,
                ahead: 3
            }
        );
    }

    #[tokio::test]
    async fn test_git_clean() {
        let probe = FakeProbe::new()
            .ok("git status --porcelain", "")
            .ok("git rev-list --count main..HEAD", "0\n");

        let summary = ChangeInspector::new(&probe).inspect(&git_setup()).await;
        assert!(summary.is_empty());
    }

    #[tokio::test]
    async fn test_failures_default_to_no_changes() {
        let probe = FakeProbe::new()
            .fails("git status --porcelain", 128)
            .ok("git rev-list --count main..HEAD", "not a number");

        let summary = ChangeInspector::new(&probe).inspect(&git_setup()).await;
        assert_eq!(summary, ChangeSummary::default());

        let jj_probe = FakeProbe::new();
        let summary = ChangeInspector::new(&jj_probe).inspect(&jj_setup()).await;
        assert!(summary.is_empty());
    }
}
