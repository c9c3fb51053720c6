// ==================== Imports ====================
use wasm_bindgen::prelude::*;

// browser first : its log!/error! macros are used by every module below
#[macro_use]
mod browser;
pub mod engine;
mod game;
pub mod physics;
pub mod player;
pub mod sprite;

use engine::GameLoop;
use game::Shooter;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - installs panic hook
/// - loads the scene
/// - starts the game loop
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(Shooter::new()).await {
            error!("Could not start game : {:#?}", err);
        }
    });

    Ok(())
}
