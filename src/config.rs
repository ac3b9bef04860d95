//! Configuration for the UI system and the editor gizmo.
//!
//! Both are plain structs with sensible defaults; hosts override fields
//! directly before constructing [`UiState`](crate::ui::UiState) or
//! [`EditorGizmo`](crate::editor::EditorGizmo).

use crate::gfx::font::FontKind;
use crate::gfx::geometry::{AtlasRegion, NineSliceRegion};
use crate::gfx::renderer::{ShaderId, TextureHandle};

/// Layout of the shared UI atlas texture.
#[derive(Debug, Clone, PartialEq)]
pub struct UiAtlasLayout {
    pub texture: TextureHandle,
    /// Atlas size in pixels
    pub size: [u32; 2],
    /// On-screen size of nine-slice corners in pixels
    pub corner_size: [f32; 2],
    pub button_normal: NineSliceRegion,
    pub button_hover: NineSliceRegion,
    pub button_pressed: NineSliceRegion,
    pub textbox_normal: NineSliceRegion,
    pub textbox_focused: NineSliceRegion,
    /// Checkbox images, in the order enabled-unchecked, enabled-checked,
    /// disabled-unchecked, disabled-checked.
    pub checkbox: [AtlasRegion; 4],
}

impl Default for UiAtlasLayout {
    fn default() -> Self {
        let frame = |x: u32, y: u32| NineSliceRegion {
            atlas_min: [x, y],
            atlas_max: [x + 32, y + 32],
            corner_px: [8, 8],
        };
        let size = [512, 512];
        let check = |x: u32| AtlasRegion::from_pixels([x, 64], [x + 16, 80], size);
        Self {
            texture: TextureHandle(0),
            size,
            corner_size: [8.0, 8.0],
            button_normal: frame(0, 0),
            button_hover: frame(32, 0),
            button_pressed: frame(64, 0),
            textbox_normal: frame(0, 32),
            textbox_focused: frame(32, 32),
            checkbox: [check(0), check(16), check(32), check(48)],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiConfig {
    pub default_font_name: String,
    pub default_font_size: u16,
    pub default_font_kind: FontKind,
    /// Horizontal inset of textbox content
    pub textbox_padding: f32,
    pub cursor_width: f32,
    pub text_colour: [f32; 4],
    pub cursor_colour: [f32; 4],
    pub highlight_colour: [f32; 4],
    /// Pointer travel, in pixels, that turns a press into a drag
    pub drag_threshold: f32,
    /// Treat the super (command) key as control for shortcuts
    pub super_acts_as_control: bool,
    pub ui_shader: ShaderId,
    pub atlas: UiAtlasLayout,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_font_name: "mono".to_string(),
            default_font_size: 16,
            default_font_kind: FontKind::Bitmap,
            textbox_padding: 4.0,
            cursor_width: 2.0,
            text_colour: [1.0, 1.0, 1.0, 1.0],
            cursor_colour: [1.0, 1.0, 1.0, 1.0],
            highlight_colour: [0.3, 0.5, 0.9, 0.5],
            drag_threshold: 4.0,
            super_acts_as_control: cfg!(target_os = "macos"),
            ui_shader: ShaderId(0),
            atlas: UiAtlasLayout::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GizmoConfig {
    /// Apparent size of the gizmo on screen
    pub size_px: f32,
    pub axis_length: f32,
    /// Extent of the planar-move corner boxes along each axis
    pub corner_box_size: f32,
    /// Half-thickness of the axis pick volumes
    pub axis_pick_radius: f32,
    pub ring_radius: f32,
    pub ring_segments: u32,
    /// Accepted distance from the ring radius for rotate-mode hover hits
    pub ring_tolerance: f32,
    pub hover_colour: [f32; 4],
    pub neutral_colour: [f32; 4],
    pub axis_colours: [[f32; 4]; 3],
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            size_px: 100.0,
            axis_length: 2.0,
            corner_box_size: 0.4,
            axis_pick_radius: 0.1,
            ring_radius: 1.0,
            ring_segments: 32,
            ring_tolerance: 0.1,
            hover_colour: [1.0, 1.0, 0.0, 1.0],
            neutral_colour: [0.6, 0.6, 0.6, 1.0],
            axis_colours: [
                [1.0, 0.0, 0.0, 1.0],
                [0.0, 1.0, 0.0, 1.0],
                [0.0, 0.0, 1.0, 1.0],
            ],
        }
    }
}
