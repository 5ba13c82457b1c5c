/// Terminal front end: renders a demo scene as ASCII art and picks nodes
/// under the mouse
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use orrery_core::config::RenderConfig;
use orrery_core::{
    Camera, Demo, DemoKind, DirectionalLight, NodeId, PickHit, Picker, Result, SceneGraph,
};
use std::cell::RefCell;
use std::io::{stdout, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub mod logging;
pub mod renderer;
pub mod surface;

pub use renderer::AsciiRenderer;
pub use surface::TerminalSurface;

/// Last click and hover reported by the picker
#[derive(Debug, Default)]
pub struct Selection {
    pub clicked: Option<PickHit>,
    pub hovered: Option<(NodeId, String)>,
}

impl Selection {
    /// Record a hover; returns `false` when the node was already hovered
    pub fn hover(&mut self, hit: &PickHit) -> bool {
        if self.hovered.as_ref().map(|(id, _)| *id) == Some(hit.node) {
            return false;
        }
        self.hovered = Some((hit.node, hit.label().to_owned()));
        true
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    kind: DemoKind,
    scene: Rc<RefCell<SceneGraph>>,
    camera: Rc<RefCell<Camera>>,
    light: DirectionalLight,
    surface: Rc<RefCell<TerminalSurface>>,
    picker: Option<Picker<TerminalSurface>>,
    selection: Rc<RefCell<Selection>>,
    renderer: AsciiRenderer,
    options: RenderConfig,
    running: bool,
    paused: bool,
    time_scale: f32,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(demo: Demo, options: RenderConfig) -> Result<Self> {
        let (width, height) = terminal::size()?;
        Self::with_size(demo, options, width, height)
    }

    /// Build the app for a terminal of the given size without touching the tty
    pub fn with_size(demo: Demo, options: RenderConfig, width: u16, height: u16) -> Result<Self> {
        let Demo {
            kind,
            scene,
            mut camera,
            light,
        } = demo;
        camera.set_aspect(f32::from(width), f32::from(height) * options.cell_aspect);

        let scene = Rc::new(RefCell::new(scene));
        let camera = Rc::new(RefCell::new(camera));
        let surface = Rc::new(RefCell::new(TerminalSurface::new(width, height)));
        let selection = Rc::new(RefCell::new(Selection::default()));

        let clicked = Rc::clone(&selection);
        let hovered = Rc::clone(&selection);
        let picker = Picker::new(
            Rc::clone(&surface),
            Rc::clone(&scene),
            Rc::clone(&camera),
            move |hit: &PickHit| {
                info!(node = %hit.node, name = hit.label(), "clicked");
                clicked.borrow_mut().clicked = Some(hit.clone());
            },
            Some(Box::new(move |hit: &PickHit| {
                if hovered.borrow_mut().hover(hit) {
                    debug!(name = hit.label(), "hovering");
                }
            })),
        )?;

        Ok(Self {
            kind,
            scene,
            camera,
            light,
            surface,
            picker: Some(picker),
            selection,
            renderer: AsciiRenderer::new(usize::from(width), usize::from(height)),
            options,
            running: true,
            paused: false,
            time_scale: 1.0,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn scene(&self) -> Rc<RefCell<SceneGraph>> {
        Rc::clone(&self.scene)
    }

    pub fn selection(&self) -> Rc<RefCell<Selection>> {
        Rc::clone(&self.selection)
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;

        result
    }

    fn main_loop(&mut self) -> Result<()> {
        let target_frame_time = Duration::from_millis(1000 / u64::from(self.options.target_fps));
        let mut last_tick = Instant::now();
        info!(demo = self.kind.name(), "render loop started");

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            // Update
            let dt = (frame_start - last_tick).as_secs_f32();
            last_tick = frame_start;
            self.update(dt);

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        info!("render loop stopped");
        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent { code, .. }) => self.handle_key(code),
            Event::Mouse(mouse) => self.surface.borrow_mut().handle_mouse(mouse),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('w') | KeyCode::Up => self.rotate_view(0.1, 0.0, 0.0),
            KeyCode::Char('s') | KeyCode::Down => self.rotate_view(-0.1, 0.0, 0.0),
            KeyCode::Char('a') | KeyCode::Left => self.rotate_view(0.0, -0.1, 0.0),
            KeyCode::Char('d') | KeyCode::Right => self.rotate_view(0.0, 0.1, 0.0),
            KeyCode::Char('e') => self.rotate_view(0.0, 0.0, 0.1),
            KeyCode::Char('r') => self.rotate_view(0.0, 0.0, -0.1),
            KeyCode::Char(' ') => {
                self.paused = !self.paused;
            }
            KeyCode::Char('x') => {
                self.options.show_axes = !self.options.show_axes;
            }
            KeyCode::Char('f') => {
                self.options.flat_shading = !self.options.flat_shading;
            }
            KeyCode::Char('+') => {
                self.time_scale = (self.time_scale * 2.0).min(16.0);
            }
            KeyCode::Char('-') => {
                self.time_scale = (self.time_scale / 2.0).max(1.0 / 16.0);
            }
            _ => {}
        }
    }

    /// Tilt the whole scene by rotating its root
    fn rotate_view(&mut self, dx: f32, dy: f32, dz: f32) {
        let mut scene = self.scene.borrow_mut();
        let root = scene.root();
        if let Some(node) = scene.get_mut(root) {
            node.transform.rotation.rotate(dx, dy, dz);
        }
    }

    /// Follow a terminal resize: buffers, surface and camera aspect
    pub fn resize(&mut self, width: u16, height: u16) {
        if !self
            .renderer
            .resize(usize::from(width), usize::from(height))
        {
            return;
        }
        self.surface.borrow_mut().resize(width, height);
        self.camera
            .borrow_mut()
            .set_aspect(f32::from(width), f32::from(height) * self.options.cell_aspect);
        debug!(width, height, "terminal resized");
    }

    /// Advance the animation by `dt` seconds of wall time
    pub fn update(&mut self, dt: f32) {
        if !self.paused {
            self.scene.borrow_mut().advance(dt * self.time_scale);
        }
    }

    fn render(&mut self) -> Result<()> {
        // Clear renderer
        self.renderer.clear();

        // Render scene
        self.renderer.render_scene(
            &self.scene.borrow(),
            &self.camera.borrow(),
            &self.light,
            &self.options,
        );

        // Output to terminal
        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let status: String = self
            .status_line()
            .chars()
            .take(self.renderer.width())
            .collect();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }

    pub fn status_line(&self) -> String {
        let selection = self.selection.borrow();
        let clicked = selection.clicked.as_ref().map_or("-", PickHit::label);
        let hovered = selection.hovered.as_ref().map_or("-", |(_, name)| name.as_str());
        format!(
            "Orrery {} | FPS: {:.1} | x{} | clicked: {} | hover: {} | WASD=Rotate X=Axes F=Flat Space=Pause +/-=Speed Q=Quit",
            self.kind.name(),
            self.fps,
            self.time_scale,
            clicked,
            hovered
        )
    }

    /// Release the picker's mouse subscriptions
    pub fn detach_picker(&mut self) {
        if let Some(picker) = self.picker.take() {
            picker.dispose();
        }
    }

    pub fn surface(&self) -> Rc<RefCell<TerminalSurface>> {
        Rc::clone(&self.surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use orrery_core::{OrreryConfig, Surface};

    fn app(kind: DemoKind) -> TerminalApp {
        let demo = Demo::build(kind, &OrreryConfig::default(), [0.1, 0.5, 0.9]).unwrap();
        TerminalApp::with_size(demo, RenderConfig::default(), 80, 24).unwrap()
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn test_click_on_centre_picks_middle_box() {
        let mut app = app(DemoKind::Boxes);
        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 40, 12));

        let selection = app.selection();
        let clicked = selection.borrow().clicked.clone().unwrap();
        assert_eq!(clicked.label(), "middle");
        assert!(app.status_line().contains("clicked: middle"));
    }

    #[test]
    fn test_click_on_empty_space_keeps_previous_selection() {
        let mut app = app(DemoKind::Boxes);
        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 0, 23));
        assert!(app.selection().borrow().clicked.is_none());
    }

    #[test]
    fn test_hover_is_deduplicated() {
        let mut app = app(DemoKind::Solar);
        let selection = app.selection();
        app.handle_event(mouse(MouseEventKind::Moved, 40, 12));
        let first = selection.borrow().hovered.clone().unwrap();
        assert_eq!(first.1, "sun");
        assert!(!selection.borrow_mut().hover(&PickHit {
            node: first.0,
            name: Some("sun".to_owned()),
            distance: 1.0,
            point: nalgebra::Point3::origin(),
        }));
    }

    #[test]
    fn test_pause_stops_animation() {
        let mut app = app(DemoKind::Solar);
        let scene = app.scene();
        let sun = scene.borrow().find_by_name("sun").unwrap();

        app.update(0.5);
        let spun = scene.borrow().get(sun).unwrap().transform.rotation.z;
        assert!((spun - 0.5).abs() < 1e-6);

        app.handle_event(key(' '));
        app.update(0.5);
        assert_eq!(scene.borrow().get(sun).unwrap().transform.rotation.z, spun);

        app.handle_event(key(' '));
        app.handle_event(key('+'));
        app.update(0.5);
        let z = scene.borrow().get(sun).unwrap().transform.rotation.z;
        assert!((z - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_resize_updates_surface_and_camera() {
        let mut app = app(DemoKind::Boxes);
        app.handle_event(Event::Resize(120, 30));
        let aspect = app.camera.borrow().aspect;
        assert!((aspect - 2.0).abs() < 1e-6);
        assert_eq!(app.renderer.width(), 120);
        assert!((app.surface().borrow().rect().width - 120.0).abs() < 1e-6);
    }

    #[test]
    fn test_detach_picker_releases_subscriptions() {
        let mut app = app(DemoKind::Boxes);
        assert_eq!(app.surface().borrow().subscription_count(), 2);
        app.detach_picker();
        assert_eq!(app.surface().borrow().subscription_count(), 0);
    }

    #[test]
    fn test_quit_key() {
        let mut app = app(DemoKind::Boxes);
        app.handle_event(key('q'));
        assert!(!app.running);
    }
}
