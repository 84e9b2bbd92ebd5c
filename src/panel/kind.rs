//! Panel kinds, capabilities and the static panel map

use std::fmt;
use std::str::FromStr;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::mode::Mode;

/// Tag identifying what a panel is
///
/// Used for persistence (by name), spawning and mode membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelKind {
    Admin,
    ToolsBasic,
    ToolsAdvanced,
    Color,
    Brush,
    Extra,
    Labs,
    Environment,
    Lights,
    Reference,
    GuideTools,
    CameraPath,
    Sketchbook,
    AppSettings,
    Camera,
    BrushLab,
    MemoryWarning,
}

impl PanelKind {
    pub const ALL: [PanelKind; 17] = [
        PanelKind::Admin,
        PanelKind::ToolsBasic,
        PanelKind::ToolsAdvanced,
        PanelKind::Color,
        PanelKind::Brush,
        PanelKind::Extra,
        PanelKind::Labs,
        PanelKind::Environment,
        PanelKind::Lights,
        PanelKind::Reference,
        PanelKind::GuideTools,
        PanelKind::CameraPath,
        PanelKind::Sketchbook,
        PanelKind::AppSettings,
        PanelKind::Camera,
        PanelKind::BrushLab,
        PanelKind::MemoryWarning,
    ];

    /// Name used in persisted layout records
    pub fn as_str(&self) -> &'static str {
        match self {
            PanelKind::Admin => "Admin",
            PanelKind::ToolsBasic => "ToolsBasic",
            PanelKind::ToolsAdvanced => "ToolsAdvanced",
            PanelKind::Color => "Color",
            PanelKind::Brush => "Brush",
            PanelKind::Extra => "Extra",
            PanelKind::Labs => "Labs",
            PanelKind::Environment => "Environment",
            PanelKind::Lights => "Lights",
            PanelKind::Reference => "Reference",
            PanelKind::GuideTools => "GuideTools",
            PanelKind::CameraPath => "CameraPath",
            PanelKind::Sketchbook => "Sketchbook",
            PanelKind::AppSettings => "AppSettings",
            PanelKind::Camera => "Camera",
            PanelKind::BrushLab => "BrushLab",
            PanelKind::MemoryWarning => "MemoryWarning",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, PanelKind::Admin)
    }

    /// Unique panels exist once and are shared by the basic and advanced sets
    pub fn is_unique(&self) -> bool {
        self.is_admin() || self.alt_mode().is_some()
    }

    /// Core panels make up the basic experience and cannot be dismissed
    pub fn is_core(&self) -> bool {
        matches!(
            self,
            PanelKind::Color
                | PanelKind::Brush
                | PanelKind::ToolsBasic
                | PanelKind::ToolsAdvanced
                | PanelKind::Extra
        )
    }

    /// Alternate mode this panel is shown in, if any
    pub fn alt_mode(&self) -> Option<Mode> {
        match self {
            PanelKind::Sketchbook => Some(Mode::Sketchbook),
            PanelKind::AppSettings => Some(Mode::Settings),
            PanelKind::Camera => Some(Mode::Camera),
            PanelKind::BrushLab => Some(Mode::BrushLab),
            PanelKind::MemoryWarning => Some(Mode::MemoryWarning),
            _ => None,
        }
    }

    /// Whether `open` may spawn this kind as a floating panel
    pub fn is_spawnable(&self) -> bool {
        !self.is_unique() && !matches!(self, PanelKind::Color | PanelKind::Brush)
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a panel kind name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown panel kind '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for PanelKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PanelKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Independently composed panel capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// May be pulled off its pane by the user
    pub can_detach: bool,
    /// May dock into a pane
    pub can_fix: bool,
}

impl Capabilities {
    pub const DOCKABLE: Capabilities = Capabilities {
        can_detach: true,
        can_fix: true,
    };
    pub const LOCKED: Capabilities = Capabilities {
        can_detach: false,
        can_fix: true,
    };
    pub const FREE: Capabilities = Capabilities {
        can_detach: true,
        can_fix: false,
    };
}

/// Which basic/advanced sets a panel spec instantiates into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelSets {
    Basic,
    Advanced,
    Both,
}

impl PanelSets {
    pub fn includes(&self, advanced: bool) -> bool {
        match self {
            PanelSets::Basic => !advanced,
            PanelSets::Advanced => advanced,
            PanelSets::Both => true,
        }
    }
}

/// Static description of a panel, as listed in the panel map
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSpec {
    pub kind: PanelKind,
    pub sets: PanelSets,
    pub begin_fixed: bool,
    pub attach_angle: f32,
    pub y_offset: f32,
    pub half_height: f32,
    pub capabilities: Capabilities,
    /// Half extents of the collision perimeter
    pub bounds: Vec2,
    pub sample_radius: f32,
    pub collision_radius: f32,
    /// World position when spawned floating without a saved layout
    pub spawn: Vec3,
}

impl PanelSpec {
    pub fn new(kind: PanelKind, sets: PanelSets) -> Self {
        Self {
            kind,
            sets,
            begin_fixed: false,
            attach_angle: 0.0,
            y_offset: 0.0,
            half_height: 0.15,
            capabilities: Capabilities::DOCKABLE,
            bounds: Vec2::new(0.2, 0.15),
            sample_radius: 0.05,
            collision_radius: 0.25,
            spawn: Vec3::new(0.0, 1.2, 1.0),
        }
    }

    /// Start docked at `angle` / `y_offset`
    pub fn fixed_at(mut self, angle: f32, y_offset: f32) -> Self {
        self.begin_fixed = true;
        self.attach_angle = angle;
        self.y_offset = y_offset;
        self
    }

    pub fn half_height(mut self, half_height: f32) -> Self {
        self.half_height = half_height;
        self.bounds.y = half_height;
        self
    }

    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn spawn(mut self, spawn: Vec3) -> Self {
        self.spawn = spawn;
        self
    }
}

/// The built-in panel map
pub fn default_panel_map() -> Vec<PanelSpec> {
    use PanelKind::*;
    use PanelSets::*;

    vec![
        PanelSpec::new(Admin, Both).capabilities(Capabilities {
            can_detach: false,
            can_fix: false,
        }),
        // Basic set: one panel per pane, locked in place
        PanelSpec::new(ToolsBasic, Basic)
            .fixed_at(0.0, 0.0)
            .half_height(0.3)
            .capabilities(Capabilities::LOCKED),
        PanelSpec::new(Color, Basic)
            .fixed_at(120.0, 0.0)
            .half_height(0.3)
            .capabilities(Capabilities::LOCKED),
        PanelSpec::new(Brush, Basic)
            .fixed_at(240.0, 0.0)
            .half_height(0.3)
            .capabilities(Capabilities::LOCKED),
        // Advanced set
        PanelSpec::new(ToolsAdvanced, Advanced)
            .fixed_at(0.0, 0.25)
            .half_height(0.2),
        PanelSpec::new(Extra, Advanced)
            .fixed_at(0.0, -0.2)
            .half_height(0.15),
        PanelSpec::new(Color, Advanced)
            .fixed_at(120.0, 0.2)
            .half_height(0.3),
        PanelSpec::new(Brush, Advanced)
            .fixed_at(240.0, 0.2)
            .half_height(0.3),
        PanelSpec::new(Labs, Advanced)
            .fixed_at(240.0, -0.35)
            .half_height(0.15),
        PanelSpec::new(Environment, Advanced).spawn(Vec3::new(-0.5, 1.3, 1.0)),
        PanelSpec::new(Lights, Advanced).spawn(Vec3::new(0.5, 1.3, 1.0)),
        PanelSpec::new(Reference, Advanced).spawn(Vec3::new(0.0, 1.6, 1.0)),
        PanelSpec::new(GuideTools, Advanced).spawn(Vec3::new(-0.5, 0.9, 1.0)),
        PanelSpec::new(CameraPath, Advanced).spawn(Vec3::new(0.5, 0.9, 1.0)),
        // Alternate mode panels
        PanelSpec::new(Sketchbook, Both).capabilities(Capabilities::FREE),
        PanelSpec::new(AppSettings, Both).capabilities(Capabilities::FREE),
        PanelSpec::new(Camera, Both).capabilities(Capabilities::FREE),
        PanelSpec::new(BrushLab, Both).capabilities(Capabilities::FREE),
        PanelSpec::new(MemoryWarning, Both).capabilities(Capabilities::FREE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_name_round_trip() {
        for kind in PanelKind::ALL {
            assert_eq!(kind.as_str().parse::<PanelKind>(), Ok(kind));
        }
        assert_eq!(
            "Toaster".parse::<PanelKind>(),
            Err(UnknownKind("Toaster".to_string()))
        );
    }

    #[test]
    fn test_kind_classification() {
        assert!(PanelKind::Admin.is_unique());
        assert!(PanelKind::Sketchbook.is_unique());
        assert!(!PanelKind::Color.is_unique());
        assert!(PanelKind::Color.is_core());
        assert!(!PanelKind::Lights.is_core());
        assert_eq!(PanelKind::AppSettings.alt_mode(), Some(Mode::Settings));
        assert_eq!(PanelKind::Labs.alt_mode(), None);
        assert!(!PanelKind::Brush.is_spawnable());
        assert!(PanelKind::Lights.is_spawnable());
    }

    #[test]
    fn test_default_map_panes_fit() {
        let map = default_panel_map();
        for advanced in [false, true] {
            for angle in [0.0, 120.0, 240.0] {
                let height: f32 = map
                    .iter()
                    .filter(|s| s.begin_fixed && s.sets.includes(advanced))
                    .filter(|s| s.attach_angle == angle)
                    .map(|s| s.half_height * 2.0)
                    .sum();
                assert!(height <= 1.2, "pane {} overfull: {}", angle, height);
            }
        }
    }
}
