use std::path::PathBuf;
use std::time::Duration;

use kinetic_engine::coords::Vec2;
use kinetic_engine::window::{LogicalSize, PlatformConfig};

use crate::motion::Bounds;

/// Fixed settings of the robot demo.
///
/// There is no runtime configuration surface; [`Default`] is the program.
#[derive(Debug, Clone)]
pub struct RobotConfig {
    /// Canvas size in pixels.
    pub canvas_width: u32,
    pub canvas_height: u32,

    /// Sprite bounding box in pixels.
    pub sprite_width: u32,
    pub sprite_height: u32,

    /// Movement speed in pixels per second.
    pub speed: f32,

    /// Frame rate the loop is paced to.
    pub target_fps: u32,

    pub title: String,

    /// Remote location of the sprite image.
    pub asset_url: String,

    /// Local cache of the sprite image.
    pub asset_path: PathBuf,

    pub fetch_timeout: Duration,
    pub user_agent: String,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            canvas_width: 640,
            canvas_height: 480,
            sprite_width: 64,
            sprite_height: 64,
            speed: 200.0,
            target_fps: 60,
            title: "Robot WASD demo".to_string(),
            asset_url: "https://upload.wikimedia.org/wikipedia/commons/6/6b/Robot_icon.svg"
                .to_string(),
            asset_path: PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("assets")
                .join("robot_icon.svg"),
            fetch_timeout: Duration::from_secs(8),
            user_agent: concat!("kinetic-robot/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl RobotConfig {
    /// Checks the settings for programming errors.
    ///
    /// # Panics
    ///
    /// Panics when a size is zero, the sprite does not fit the canvas, the
    /// speed is negative or not finite, or the target frame rate is zero.
    pub fn validate(&self) {
        assert!(
            self.canvas_width > 0 && self.canvas_height > 0,
            "canvas must have a positive size"
        );
        assert!(
            self.sprite_width > 0 && self.sprite_height > 0,
            "sprite must have a positive size"
        );
        assert!(
            self.sprite_width <= self.canvas_width && self.sprite_height <= self.canvas_height,
            "sprite {}x{} does not fit the {}x{} canvas",
            self.sprite_width,
            self.sprite_height,
            self.canvas_width,
            self.canvas_height
        );
        assert!(
            self.speed.is_finite() && self.speed >= 0.0,
            "speed must be finite and non-negative, got {}",
            self.speed
        );
        assert!(self.target_fps > 0, "target fps must be positive");
    }

    pub fn canvas_size(&self) -> Vec2 {
        Vec2::new(self.canvas_width as f32, self.canvas_height as f32)
    }

    pub fn sprite_size(&self) -> Vec2 {
        Vec2::new(self.sprite_width as f32, self.sprite_height as f32)
    }

    /// Canvas center, rounded down to whole pixels.
    pub fn start_position(&self) -> Vec2 {
        Vec2::new(
            (self.canvas_width / 2) as f32,
            (self.canvas_height / 2) as f32,
        )
    }

    /// Range the sprite center may occupy.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.canvas_size(), self.sprite_size())
    }

    pub fn platform_config(&self) -> PlatformConfig {
        PlatformConfig {
            title: self.title.clone(),
            size: LogicalSize::new(f64::from(self.canvas_width), f64::from(self.canvas_height)),
            resizable: false,
        }
    }
}
