//! Frame composition: background, robot and status text.

use anyhow::Result;
use kinetic_engine::coords::{Rect, Vec2};
use kinetic_engine::core::Display;
use kinetic_engine::paint::Color;
use kinetic_engine::scene::{DrawList, ZIndex};
use kinetic_engine::text::{FontId, FontSystem};

use crate::asset::SpriteAsset;

pub const BACKGROUND: Color = Color::rgb8(240, 240, 240);
const BODY: Color = Color::rgb8(100, 120, 200);
const EYE: Color = Color::WHITE;
const PUPIL: Color = Color::BLACK;
const TEXT: Color = Color::rgb8(40, 40, 40);

const TEXT_SIZE: f32 = 20.0;
const TEXT_ANCHOR: Vec2 = Vec2::new(8.0, 8.0);
const LINE_GAP: f32 = 2.0;

/// System fonts tried in order for the status text.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// Loads the status font from the first available system font.
pub fn load_status_font(fonts: &mut FontSystem) -> Option<FontId> {
    let font = fonts.load_first(FONT_CANDIDATES);
    if font.is_none() {
        log::warn!("no system font found; status text is disabled");
    }
    font
}

/// The two status lines shown in the corner.
pub fn status_lines(position: Vec2, fps: f32) -> [String; 2] {
    [
        "WASD to move  |  ESC to quit".to_string(),
        format!(
            "Position: {},{}  |  FPS: {}",
            position.x as i32, position.y as i32, fps as i32
        ),
    ]
}

/// Draws one frame of the demo.
///
/// [`compose`](Self::compose) records the frame into a reusable [`DrawList`];
/// [`draw`](Self::draw) also presents it on a [`Display`].
pub struct Renderer {
    sprite_width: u32,
    sprite_height: u32,
    font: Option<FontId>,
    draw_list: DrawList,
}

impl Renderer {
    pub fn new(sprite_width: u32, sprite_height: u32, font: Option<FontId>) -> Self {
        Self {
            sprite_width,
            sprite_height,
            font,
            draw_list: DrawList::new(),
        }
    }

    pub fn draw(
        &mut self,
        display: &mut impl Display,
        fonts: &FontSystem,
        position: Vec2,
        sprite: &SpriteAsset,
        lines: &[String],
    ) -> Result<()> {
        self.compose(fonts, position, sprite, lines);
        display.present(BACKGROUND, &mut self.draw_list, fonts)
    }

    /// Records the robot centered on `position` and the status `lines`.
    ///
    /// The background is not recorded; it is the clear color at present time.
    pub fn compose(
        &mut self,
        fonts: &FontSystem,
        position: Vec2,
        sprite: &SpriteAsset,
        lines: &[String],
    ) -> &DrawList {
        self.draw_list.clear();

        // Whole pixels, so the sprite does not shimmer between frames.
        let center = position.trunc();
        match sprite {
            SpriteAsset::Loaded(bitmap) => {
                let size = Vec2::new(self.sprite_width as f32, self.sprite_height as f32);
                self.draw_list
                    .push_sprite(ZIndex::WORLD, bitmap, Rect::from_center_size(center, size));
            }
            SpriteAsset::Unavailable => self.push_fallback_robot(center),
        }

        if let Some(font) = self.font {
            let mut origin = TEXT_ANCHOR;
            for line in lines {
                self.draw_list
                    .push_text(ZIndex::OVERLAY, line.as_str(), font, TEXT_SIZE, TEXT, origin);
                origin.y += fonts.measure_text(line, font, TEXT_SIZE).y + LINE_GAP;
            }
        }

        &self.draw_list
    }

    /// Round robot: a body with one eye up and to the left.
    fn push_fallback_robot(&mut self, center: Vec2) {
        let r = (self.sprite_width.min(self.sprite_height) / 2) as i32;
        let eye = center + Vec2::new(-(r / 3) as f32, -(r / 4) as f32);

        self.draw_list.push_circle(ZIndex::WORLD, center, r as f32, BODY);
        self.draw_list.push_circle(ZIndex::DETAIL, eye, (r / 4) as f32, EYE);
        self.draw_list
            .push_circle(ZIndex::DETAIL.above(), eye, (r / 8) as f32, PUPIL);
    }
}
