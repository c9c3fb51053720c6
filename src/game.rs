use crate::browser;
use crate::engine::input::{KeyState, PointerState};
#[cfg(debug_assertions)]
use crate::engine::DebugDraw;
use crate::engine::{self, Camera, Game, Placement, Point, Rect, Renderer, Size, FRAME_SIZE};
use crate::physics::ArcadeBody;
use crate::player::tuning::Tuning;
use crate::player::{Parts, Player, Senses};
use crate::sprite::clips::ClipTable;
use crate::sprite::{LayerSprite, SheetGrid, SpriteHandle};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::join;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::HtmlImageElement;

/// ┌──────────────────────── Update Flow ────────────────────────────┐
/// │                                                                 │
/// │   GameLoop (60 Hz fixed step)                                   │
/// │     └─► Shooter::update(keys, pointer)                          │
/// │           ├─► ArcadeBody::step      gravity, bounds, ground     │
/// │           ├─► Player::update        sync position, controls     │
/// │           └─► LayerSprite::tick     run clip playback           │
/// │                                                                 │
/// │   GameLoop (every animation frame)                              │
/// │     └─► Shooter::draw                                           │
/// │           └─► torso, head, hand, weapon at body + offset        │
/// └─────────────────────────────────────────────────────────────────┘
pub enum Shooter {
    /// Resources are being loaded
    Loading,

    /// Player spawned, assets in memory
    Loaded(Arena),
}

struct SpriteSheet {
    image: HtmlImageElement,
    grid: SheetGrid,
}

const TORSO_GRID: SheetGrid = SheetGrid {
    frame_size: Size {
        width: 100.0,
        height: 100.0,
    },
    columns: 11,
};

const HEAD_GRID: SheetGrid = SheetGrid {
    frame_size: Size {
        width: 29.0,
        height: 29.0,
    },
    columns: 2,
};

const HAND_GRID: SheetGrid = SheetGrid {
    frame_size: Size {
        width: 52.0,
        height: 31.0,
    },
    columns: 2,
};

const GUN_GRID: SheetGrid = SheetGrid {
    frame_size: Size {
        width: 48.0,
        height: 24.0,
    },
    columns: 2,
};

impl Shooter {
    const TUNING_PATH: &'static str = "player.json";
    const TORSO_PATH: &'static str = "player_body.png";
    const HEAD_PATH: &'static str = "player_head.png";
    const HAND_PATH: &'static str = "player_hand.png";
    const GUN_PATH: &'static str = "gun.png";

    pub fn new() -> Self {
        Shooter::Loading
    }

    /// A missing or broken tuning file is not fatal, the defaults are
    /// playable.
    async fn load_tuning() -> Tuning {
        match browser::fetch_json::<Tuning>(Self::TUNING_PATH).await {
            Ok(tuning) => tuning.validated(),
            Err(err) => {
                log!(
                    "Warning: using default tuning, could not load {} : {:#?}",
                    Self::TUNING_PATH,
                    err
                );
                Tuning::default()
            }
        }
    }

    async fn load_sheet(path: &'static str, grid: SheetGrid) -> Result<SpriteSheet> {
        let image = engine::load_image(path)
            .await
            .with_context(|| format!("Failed to load sprite sheet from : {}", path))?;
        Ok(SpriteSheet { image, grid })
    }
}

#[async_trait(?Send)]
impl Game for Shooter {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            Shooter::Loading => {
                // independent resources, total time is the slowest one
                let (tuning, torso, head, hand, gun) = join!(
                    Self::load_tuning(),
                    Self::load_sheet(Self::TORSO_PATH, TORSO_GRID),
                    Self::load_sheet(Self::HEAD_PATH, HEAD_GRID),
                    Self::load_sheet(Self::HAND_PATH, HAND_GRID),
                    Self::load_sheet(Self::GUN_PATH, GUN_GRID),
                );
                let sheets = Parts {
                    torso: torso?,
                    head: head?,
                    hand: hand?,
                    weapon: gun?,
                };
                Ok(Box::new(Shooter::Loaded(Arena::new(&tuning, sheets))))
            }
            Shooter::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, keystate: &KeyState, pointer: &PointerState) {
        if let Shooter::Loaded(arena) = self {
            arena.update(keystate, pointer);
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let Shooter::Loaded(arena) = self {
            arena.draw(renderer);
        }
    }
}

pub struct Arena {
    player: Player<ArcadeBody, LayerSprite>,
    sheets: Parts<SpriteSheet>,
    camera: Camera,
    world: Rect,
    // ms of simulated time
    time: f64,
}

impl Arena {
    fn new(tuning: &Tuning, sheets: Parts<SpriteSheet>) -> Self {
        let world = Rect::new(
            Point::default(),
            Size {
                width: tuning.world_width,
                height: tuning.world_height,
            },
        );
        let body = ArcadeBody::new(
            Point::new(tuning.spawn_x, tuning.spawn_y),
            Size {
                width: tuning.body_width,
                height: tuning.body_height,
            },
            world,
        );

        let clips = Rc::new(RefCell::new(ClipTable::new()));
        let parts = Parts {
            torso: LayerSprite::new(clips.clone(), Point::default()),
            head: LayerSprite::new(clips.clone(), Point::default()),
            hand: LayerSprite::new(clips.clone(), Point::default()),
            weapon: LayerSprite::new(clips.clone(), Point::default()),
        };
        let player = Player::new(body, parts, &mut *clips.borrow_mut(), tuning);

        Arena {
            player,
            sheets,
            camera: Camera::default(),
            world,
            time: 0.0,
        }
    }

    fn update(&mut self, keystate: &KeyState, pointer: &PointerState) {
        self.time += f64::from(FRAME_SIZE);

        // physics first, so ground contact is fresh when the controls read it
        self.player.body_mut().step(FRAME_SIZE);

        let senses = Senses {
            keys: keystate,
            pointer,
            camera: &self.camera,
        };
        self.player.update(self.time, &senses);

        for sprite in self.player.parts_mut().iter_mut() {
            sprite.tick(FRAME_SIZE);
        }
    }

    fn draw(&self, renderer: &Renderer) {
        renderer.clear(&self.world);

        let position = self.player.position();
        let parts = self.player.parts();
        // draw order matters : torso -> head -> hand -> weapon
        let layers = [
            (&self.sheets.torso, &parts.torso),
            (&self.sheets.head, &parts.head),
            (&self.sheets.hand, &parts.hand),
            (&self.sheets.weapon, &parts.weapon),
        ];
        for (sheet, sprite) in layers {
            renderer.draw_frame(
                &sheet.image,
                &sheet.grid.frame_rect(sprite.frame()),
                &Placement {
                    anchor: self.camera.world_to_screen(position + sprite.position()),
                    pivot: sprite.pivot(),
                    rotation: sprite.rotation(),
                    scale: sprite.scale() * self.camera.zoom,
                },
            );
        }

        #[cfg(debug_assertions)]
        {
            let bounds = self.player.body().bounds();
            Rect::new(
                self.camera.world_to_screen(bounds.position),
                Size {
                    width: bounds.size.width * self.camera.zoom,
                    height: bounds.size.height * self.camera.zoom,
                },
            )
            .draw_debug(renderer);
        }
    }
}
