//! Debug tracing infrastructure for development diagnostics
//!
//! Provides structured logging with scoped filtering for debugging docking,
//! gap closing and mode transitions.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=panes=debug,message=debug` - scoped filtering
//! - `RUST_LOG=wand_layout::docking=debug` - module-level filtering
//!
//! # Log Files
//!
//! Logs are written to `~/.config/wand-layout/logs/wand-layout.log` with daily
//! rotation. File logging uses debug level by default.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::engine::LayoutEngine;
use crate::panel::{PanelId, PanelKind};

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG and defaults to `warn`. File logging
/// writes to the config directory's `logs/` with daily rotation.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender =
                tracing_appender::rolling::daily(logs_dir, crate::config_paths::LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight snapshot of the pane stacks for diffing
#[derive(Debug, Clone, PartialEq)]
pub struct PaneSnapshot {
    pub origin: f32,
    pub panes: [Vec<SlotInfo>; 3],
    pub floating: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotInfo {
    pub id: PanelId,
    pub kind: PanelKind,
    pub stable: f32,
}

impl PaneSnapshot {
    pub fn from_engine(engine: &LayoutEngine) -> Self {
        let advanced = engine.advanced;
        let mut panes: [Vec<SlotInfo>; 3] = Default::default();
        let mut floating = 0;

        for panel in engine.panels.iter().filter(|p| p.visible && p.available(advanced)) {
            if !panel.in_pane(advanced) {
                if !panel.fixed && !panel.is_unique() {
                    floating += 1;
                }
                continue;
            }
            if let Some(index) = crate::panel::PaneSet::index_for_angle(panel.attach_angle) {
                panes[index].push(SlotInfo {
                    id: panel.id,
                    kind: panel.kind,
                    stable: panel.offset.stable,
                });
            }
        }
        for pane in &mut panes {
            pane.sort_by(|a, b| b.stable.total_cmp(&a.stable).then(a.id.cmp(&b.id)));
        }

        Self {
            origin: engine.rotation.origin(),
            panes,
            floating,
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &PaneSnapshot) -> Option<String> {
        let mut changes = Vec::new();

        if (self.origin - other.origin).abs() > f32::EPSILON {
            changes.push(format!("origin: {:.1} → {:.1}", self.origin, other.origin));
        }
        if self.floating != other.floating {
            changes.push(format!("floating: {} → {}", self.floating, other.floating));
        }

        for (index, (before, after)) in self.panes.iter().zip(&other.panes).enumerate() {
            if before == after {
                continue;
            }
            let describe = |slots: &[SlotInfo]| {
                slots
                    .iter()
                    .map(|s| format!("{}@{:.2}", s.kind, s.stable))
                    .collect::<Vec<_>>()
                    .join(",")
            };
            changes.push(format!(
                "pane {}: [{}] → [{}]",
                index,
                describe(before),
                describe(after)
            ));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;

    #[test]
    fn test_snapshot_diff_reports_moves() {
        let mut engine = LayoutEngine::new(LayoutConfig::default(), true);
        let before = PaneSnapshot::from_engine(&engine);
        assert_eq!(before.diff(&before), None);

        let labs = engine.find_kind(PanelKind::Labs).unwrap();
        engine.panels[labs.index()].offset.stable = -0.4;
        let after = PaneSnapshot::from_engine(&engine);

        let diff = before.diff(&after).unwrap();
        assert!(diff.starts_with("pane 2:"), "{diff}");
        assert!(diff.contains("Labs@-0.40"), "{diff}");
    }
}
