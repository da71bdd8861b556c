//! CLI entry point (spec §6): one positional argument, the asset mount
//! path (directory or zip archive). Wires the three concrete collaborators
//! into an `engine::Context` and runs the frame loop until the window
//! closes. `Tab` toggles the editor; no console chrome is rendered (the
//! config fields for it exist, but an on-screen console is out of scope).

mod fs;
mod texture;
mod window;

use ::platform::Filesystem;
use engine::{Context, UserConfig};
use map::{Camera, Vec3};
use render::frame::Framebuffer;
use std::env;
use std::path::PathBuf;

const FALLBACK_MAP: &str = r#"{
    "points": [[0,0],[256,0],[256,256],[0,256]],
    "sectors": [{
        "floor_height": 0, "ceil_height": 128,
        "floor_tex": -1, "ceil_tex": -1,
        "walls": [
            {"p1":0,"p2":1,"portal":-1,"tex":-1},
            {"p1":1,"p2":2,"portal":-1,"tex":-1},
            {"p1":2,"p2":3,"portal":-1,"tex":-1},
            {"p1":3,"p2":0,"portal":-1,"tex":-1}
        ]
    }],
    "entities": []
}"#;

fn user_data_root() -> PathBuf {
    dirs::data_local_dir().unwrap_or_else(env::temp_dir).join("portal-engine").join("data")
}

fn main() {
    pretty_env_logger::init();

    let mount_path = match env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("usage: app <mount-path>");
            std::process::exit(1);
        }
    };

    let data_root = user_data_root();
    let fs = match fs::MountedFs::open(&mount_path, data_root) {
        Ok(fs) => fs,
        Err(err) => {
            log::error!("failed to mount assets at {}: {}", mount_path.display(), err);
            std::process::exit(1);
        }
    };

    let config = fs
        .read_user_data("config.json")
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .map(|text| UserConfig::from_json(&text))
        .unwrap_or_default();

    let mut textures = texture::ImageStore::new(&fs);
    let mut entities = engine::entity::SlotTable::new();

    let map_text = fs.read("maps/start.json").and_then(|b| String::from_utf8(b).ok());
    let map = map_text
        .and_then(|text| match engine::load_map(&text, &mut textures, &mut entities) {
            Ok(map) => Some(map),
            Err(err) => {
                log::warn!("failed to load maps/start.json: {}", err);
                None
            }
        })
        .unwrap_or_else(|| {
            log::warn!("falling back to the builtin single-room map");
            engine::load_map(FALLBACK_MAP, &mut textures, &mut entities).expect("fallback map is well-formed")
        });

    let (logical_w, logical_h) = config.logical_resolution;
    let mut window = match window::MinifbPlatform::new(
        "portal-engine",
        logical_w as usize * config.window_size as usize,
        logical_h as usize * config.window_size as usize,
    ) {
        Ok(window) => window,
        Err(err) => {
            log::error!("platform initialization failed: {}", err);
            std::process::exit(1);
        }
    };

    let camera = Camera::new(Vec3::new(32.0, 32.0, 48.0), 0.0);
    let mut context = Context::new(map, camera, config.input);
    let mut frame = Framebuffer::new(logical_w as usize, logical_h as usize);

    while window.is_open() {
        context.tick(&mut window, &mut textures, &mut entities, &mut frame);
    }
}
