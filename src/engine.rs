use crate::browser;
use anyhow::{anyhow, Error, Result};
// web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{
    // unchecked_ref (unsafe) cast from Javascript type to Rust type
    // - we control the closure creation and specify the expected type
    JsCast,
    JsValue,
};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use self::input::{KeyState, PointerState};

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self, keystate: &KeyState, pointer: &PointerState);
    fn draw(&self, renderer: &Renderer);
}

// length of a frame in milliseconds
pub const FRAME_SIZE: f32 = 1.0 / 60.0 * 1000.0;

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f32,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut receiver = input::prepare_input()?;
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
            accumulated_delta: 0.0,
        };
        let renderer = Renderer {
            context: browser::context()?,
        };
        let mut keystate = KeyState::new();
        let mut pointer = PointerState::default();
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            input::process_input(&mut keystate, &mut pointer, &mut receiver);

            game_loop.accumulated_delta += (perf - game_loop.last_frame) as f32;
            while game_loop.accumulated_delta > FRAME_SIZE {
                game.update(&keystate, &pointer);
                game_loop.accumulated_delta -= FRAME_SIZE;
            }
            game_loop.last_frame = perf;
            game.draw(&renderer);
            if let Some(next) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(next) {
                    error!("GameLoop: {:#?}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }
}

// ==================== Geometry ====================
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Rotation/scale origin, as a fraction of the frame size.
/// (0.5, 0.5) is the frame center; values outside 0..1 are legal.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pivot {
    pub x: f32,
    pub y: f32,
}

impl Pivot {
    pub const CENTER: Pivot = Pivot { x: 0.5, y: 0.5 };

    pub const fn new(x: f32, y: f32) -> Self {
        Pivot { x, y }
    }
}

impl Default for Pivot {
    fn default() -> Self {
        Pivot::CENTER
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.height
    }
}

// ==================== Camera ====================
/// Maps between canvas (screen) space and world space.
pub trait CameraProjection {
    fn screen_to_world(&self, screen: Point) -> Point;
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub scroll: Point,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            scroll: Point::default(),
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            (world.x - self.scroll.x) * self.zoom,
            (world.y - self.scroll.y) * self.zoom,
        )
    }
}

impl CameraProjection for Camera {
    fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            screen.x / self.zoom + self.scroll.x,
            screen.y / self.zoom + self.scroll.y,
        )
    }
}

// ==================== Rendering ====================
/// Where and how a single sheet frame lands on the canvas
pub struct Placement {
    pub anchor: Point,
    pub pivot: Pivot,
    pub rotation: f32,
    pub scale: f32,
}

pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.x().into(),
            rect.y().into(),
            rect.size.width.into(),
            rect.size.height.into(),
        );
    }

    /// Draw `frame` out of `image` so that the pivot point sits on
    /// `placement.anchor`, rotated around that pivot.
    pub fn draw_frame(&self, image: &HtmlImageElement, frame: &Rect, placement: &Placement) {
        let width = frame.size.width * placement.scale;
        let height = frame.size.height * placement.scale;

        self.context.save();
        let drawn = self
            .context
            .translate(placement.anchor.x.into(), placement.anchor.y.into())
            .and_then(|_| self.context.rotate(placement.rotation.into()))
            .and_then(|_| {
                self.context
                    .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                        image,
                        frame.x().into(),
                        frame.y().into(),
                        frame.size.width.into(),
                        frame.size.height.into(),
                        (-placement.pivot.x * width).into(),
                        (-placement.pivot.y * height).into(),
                        width.into(),
                        height.into(),
                    )
            });
        self.context.restore();

        if let Err(err) = drawn {
            error!("Renderer: could not draw frame {:?} : {:#?}", frame, err);
        }
    }

    pub fn draw_rect(&self, rect: &Rect) {
        self.context.stroke_rect(
            rect.x().into(),
            rect.y().into(),
            rect.size.width.into(),
            rect.size.height.into(),
        );
    }
}

#[cfg(debug_assertions)]
pub trait DebugDraw {
    fn draw_debug(&self, renderer: &Renderer);
}

#[cfg(debug_assertions)]
impl DebugDraw for Rect {
    fn draw_debug(&self, renderer: &Renderer) {
        renderer.draw_rect(self);
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[engine.rs::load_image] Error loading image: {:#?}",
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callback alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - Result<Result<(), Error>, oneshot::Canceled>
    // - first ? yields channel result : Result<(), Error>
    // - second ? yields image load result : () or propagating Error
    rx.await??;

    Ok(image)
}

pub mod input {
    //! Keyboard and pointer state, fed by DOM events over a channel and
    //! drained once per animation frame.
    use crate::browser;
    use crate::engine::Point;
    use anyhow::{anyhow, Result};
    use futures::channel::mpsc::{unbounded, UnboundedReceiver};
    use std::collections::HashSet;
    use wasm_bindgen::JsCast;
    use web_sys::{KeyboardEvent, MouseEvent};

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub enum Direction {
        Up,
        Down,
        Left,
        Right,
    }

    impl Direction {
        /// Arrow key and WASD code for this direction
        pub const fn bindings(self) -> [&'static str; 2] {
            match self {
                Direction::Up => ["ArrowUp", "KeyW"],
                Direction::Down => ["ArrowDown", "KeyS"],
                Direction::Left => ["ArrowLeft", "KeyA"],
                Direction::Right => ["ArrowRight", "KeyD"],
            }
        }
    }

    /// Pressed-state for the four movement directions, with every key
    /// mapping of a direction OR'ed together.
    pub trait InputSource {
        fn is_down(&self, direction: Direction) -> bool;
    }

    /// Current pointer position in canvas (screen) space.
    pub trait PointerSource {
        fn screen_position(&self) -> Point;
    }

    pub enum InputEvent {
        KeyDown(String),
        KeyUp(String),
        PointerMove(Point),
    }

    #[derive(Debug, Default)]
    pub struct KeyState {
        pressed_keys: HashSet<String>,
    }

    impl KeyState {
        pub fn new() -> Self {
            KeyState::default()
        }

        pub fn is_pressed(&self, code: &str) -> bool {
            self.pressed_keys.contains(code)
        }

        pub fn set_pressed(&mut self, code: &str) {
            self.pressed_keys.insert(code.to_string());
        }

        pub fn set_released(&mut self, code: &str) {
            self.pressed_keys.remove(code);
        }
    }

    impl InputSource for KeyState {
        fn is_down(&self, direction: Direction) -> bool {
            direction
                .bindings()
                .iter()
                .any(|code| self.is_pressed(code))
        }
    }

    /// Last known pointer position; it stays put while the mouse is idle
    /// or outside the canvas.
    #[derive(Debug, Default, Copy, Clone)]
    pub struct PointerState {
        position: Point,
    }

    impl PointerState {
        pub fn move_to(&mut self, position: Point) {
            self.position = position;
        }
    }

    impl PointerSource for PointerState {
        fn screen_position(&self) -> Point {
            self.position
        }
    }

    // codes the page would otherwise use to scroll
    const CAPTURED_CODES: [&str; 5] = ["ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight", "Space"];

    /// Hook keyboard events on the window and pointer events on the canvas.
    /// The closures are forgotten, they live as long as the page.
    pub fn prepare_input() -> Result<UnboundedReceiver<InputEvent>> {
        let (sender, receiver) = unbounded();

        let keydown_sender = sender.clone();
        let onkeydown = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
            if CAPTURED_CODES.contains(&event.code().as_str()) {
                event.prevent_default();
            }
            let _ = keydown_sender.unbounded_send(InputEvent::KeyDown(event.code()));
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let keyup_sender = sender.clone();
        let onkeyup = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
            let _ = keyup_sender.unbounded_send(InputEvent::KeyUp(event.code()));
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let onmousemove = browser::closure_wrap(Box::new(move |event: MouseEvent| {
            let position = Point::new(event.offset_x() as f32, event.offset_y() as f32);
            let _ = sender.unbounded_send(InputEvent::PointerMove(position));
        }) as Box<dyn FnMut(MouseEvent)>);

        let window = browser::window()?;
        window.set_onkeydown(Some(onkeydown.as_ref().unchecked_ref()));
        window.set_onkeyup(Some(onkeyup.as_ref().unchecked_ref()));
        browser::canvas()
            .map_err(|err| anyhow!("Cannot track pointer : {:#?}", err))?
            .set_onmousemove(Some(onmousemove.as_ref().unchecked_ref()));

        onkeydown.forget();
        onkeyup.forget();
        onmousemove.forget();

        Ok(receiver)
    }

    /// Drain every pending event into the key and pointer state
    pub fn process_input(
        keystate: &mut KeyState,
        pointer: &mut PointerState,
        receiver: &mut UnboundedReceiver<InputEvent>,
    ) {
        // Ok(None) : channel closed, Err : nothing pending
        while let Ok(Some(event)) = receiver.try_next() {
            match event {
                InputEvent::KeyDown(code) => keystate.set_pressed(&code),
                InputEvent::KeyUp(code) => keystate.set_released(&code),
                InputEvent::PointerMove(position) => pointer.move_to(position),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn arrow_and_wasd_are_merged() {
            let mut keys = KeyState::new();
            assert!(!keys.is_down(Direction::Left));

            keys.set_pressed("KeyA");
            assert!(keys.is_down(Direction::Left));

            keys.set_pressed("ArrowLeft");
            keys.set_released("KeyA");
            assert!(keys.is_down(Direction::Left));

            keys.set_released("ArrowLeft");
            assert!(!keys.is_down(Direction::Left));
        }

        #[test]
        fn unrelated_keys_press_no_direction() {
            let mut keys = KeyState::new();
            keys.set_pressed("Space");
            keys.set_pressed("KeyQ");
            for direction in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
                assert!(!keys.is_down(direction));
            }
        }

        #[test]
        fn process_input_drains_channel_in_order() {
            let (sender, mut receiver) = unbounded();
            let mut keys = KeyState::new();
            let mut pointer = PointerState::default();

            sender.unbounded_send(InputEvent::KeyDown("KeyW".into())).unwrap();
            sender.unbounded_send(InputEvent::PointerMove(Point::new(10.0, 20.0))).unwrap();
            sender.unbounded_send(InputEvent::KeyDown("KeyD".into())).unwrap();
            sender.unbounded_send(InputEvent::KeyUp("KeyW".into())).unwrap();
            sender.unbounded_send(InputEvent::PointerMove(Point::new(30.0, 40.0))).unwrap();

            process_input(&mut keys, &mut pointer, &mut receiver);

            assert!(!keys.is_down(Direction::Up));
            assert!(keys.is_down(Direction::Right));
            assert_eq!(pointer.screen_position(), Point::new(30.0, 40.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn camera_round_trips_through_scroll_and_zoom() {
        let camera = Camera {
            scroll: Point::new(120.0, -40.0),
            zoom: 2.0,
        };
        let world = camera.screen_to_world(Point::new(300.0, 100.0));
        assert_relative_eq!(world.x, 270.0);
        assert_relative_eq!(world.y, 10.0);

        let screen = camera.world_to_screen(world);
        assert_relative_eq!(screen.x, 300.0);
        assert_relative_eq!(screen.y, 100.0);
    }

    #[test]
    fn default_camera_is_identity() {
        let camera = Camera::default();
        let point = Point::new(42.5, 17.0);
        assert_eq!(camera.screen_to_world(point), point);
    }
}
