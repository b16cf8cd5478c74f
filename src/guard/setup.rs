//! One-time detection of whether gating applies to this project.

use super::probe::Probe;
use std::path::PathBuf;
use tracing::{debug, info};

/// Supported version-control systems, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcsKind {
    Jj,
    Git,
}

impl VcsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VcsKind::Jj => "jj",
            VcsKind::Git => "git",
        }
    }
}

impl std::fmt::Display for VcsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fully resolved gate: the project opted in and both VCS and trunk are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSetup {
    pub vcs: VcsKind,
    pub trunk: String,
}

/// Resolves [`GateSetup`] from the working directory.
///
/// Every probe failure reads as "not found", so resolution degrades to
/// `None` (gating inactive) instead of erroring.
pub struct SetupResolver<'a> {
    probe: &'a dyn Probe,
    marker: PathBuf,
    trunk_candidates: Vec<String>,
}

impl<'a> SetupResolver<'a> {
    pub fn new(probe: &'a dyn Probe, marker: PathBuf, trunk_candidates: Vec<String>) -> Self {
        Self {
            probe,
            marker,
            trunk_candidates,
        }
    }

    pub async fn resolve(&self) -> Option<GateSetup> {
        if !self.probe.exists(&self.marker).await {
            debug!(marker = %self.marker.display(), "no gate marker, gating inactive");
            return None;
        }

        let Some(vcs) = self.detect_vcs().await else {
            info!("gate marker present but no jj or git repository found, gating inactive");
            return None;
        };

        let Some(trunk) = self.detect_trunk(vcs).await else {
            info!(%vcs, candidates = ?self.trunk_candidates, "no trunk found, gating inactive");
            return None;
        };

        info!(%vcs, %trunk, "gating active");
        Some(GateSetup { vcs, trunk })
    }

    pub async fn detect_vcs(&self) -> Option<VcsKind> {
        if self.probe.run_ok("jj", &["root"]).await.is_some() {
            return Some(VcsKind::Jj);
        }
        if self
            .probe
            .run_ok("git", &["rev-parse", "--git-dir"])
            .await
            .is_some()
        {
            return Some(VcsKind::Git);
        }
        None
    }

    pub async fn detect_trunk(&self, vcs: VcsKind) -> Option<String> {
        let listing = match vcs {
            VcsKind::Jj => {
                self.probe
                    .run_ok("jj", &["bookmark", "list", "-T", r#"name ++ "\n""#])
                    .await?
            }
            VcsKind::Git => {
                self.probe
                    .run_ok("git", &["branch", "--list", "--format=%(refname:short)"])
                    .await?
            }
        };

        let names: Vec<&str> = listing
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        self.trunk_candidates
            .iter()
            .find(|candidate| names.contains(&candidate.as_str()))
            .cloned()
    }
}
