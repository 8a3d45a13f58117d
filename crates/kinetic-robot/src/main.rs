use anyhow::Result;
use kinetic_engine::device::GpuInit;
use kinetic_engine::logging::{init_logging, LoggingConfig};
use kinetic_engine::text::FontSystem;
use kinetic_engine::window::Platform;

use kinetic_robot::app::AppLoop;
use kinetic_robot::asset::{self, FetchRequest, HttpTransport, SpriteAsset};
use kinetic_robot::config::RobotConfig;
use kinetic_robot::overlay::load_status_font;

fn main() {
    init_logging(LoggingConfig::default());

    if let Err(e) = run() {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = RobotConfig::default();
    config.validate();

    let sprite = provision_sprite(&config);
    if !sprite.is_loaded() {
        log::warn!("Robot image not available");
    }

    let mut fonts = FontSystem::new();
    let font = load_status_font(&mut fonts);

    let gpu_init = GpuInit {
        // Colors are given as plain 8-bit values; keep them unconverted.
        prefer_srgb: false,
        ..GpuInit::default()
    };
    let platform = Platform::open(config.platform_config(), gpu_init)?;

    AppLoop::new(&config, sprite, fonts, font).run(platform)
}

fn provision_sprite(config: &RobotConfig) -> SpriteAsset {
    let transport = match HttpTransport::new() {
        Ok(t) => t,
        Err(e) => {
            log::warn!("HTTP client unavailable: {e}");
            return SpriteAsset::Unavailable;
        }
    };

    let request = FetchRequest {
        url: &config.asset_url,
        user_agent: &config.user_agent,
        timeout: config.fetch_timeout,
    };

    if !asset::provision(&transport, &request, &config.asset_path) {
        return SpriteAsset::Unavailable;
    }
    asset::load_sprite(&config.asset_path, config.sprite_width, config.sprite_height)
}
