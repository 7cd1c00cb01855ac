/// Terminal mesh viewer: renders into a frame buffer and prints it as ASCII
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::{debug, info};
use meshview_core::{FrameBuffer, KeyAction, Mesh, MeshRenderer, OrbitController, RenderConfig};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiPresenter;

/// Wheel units per scroll notch, as reported by most desktop mice.
const WHEEL_NOTCH: f32 = 120.0;
/// Radians per arrow key press.
const KEY_ROTATION_STEP: f32 = 0.1;
/// Rows taken by the status line.
const STATUS_ROWS: u16 = 1;

/// Map a key to a camera command.
pub fn key_action(code: KeyCode) -> Option<KeyAction> {
    match code {
        KeyCode::Char('w') => Some(KeyAction::MoveUp),
        KeyCode::Char('s') => Some(KeyAction::MoveDown),
        KeyCode::Char('a') => Some(KeyAction::MoveLeft),
        KeyCode::Char('d') => Some(KeyAction::MoveRight),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(KeyAction::ZoomIn),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(KeyAction::ZoomOut),
        KeyCode::Char('r') => Some(KeyAction::Reset),
        _ => None,
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    mesh: Mesh,
    renderer: MeshRenderer,
    orbit: OrbitController,
    frame: FrameBuffer,
    presenter: AsciiPresenter,
    /// Radians around Y added every frame.
    spin: f32,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mesh: Mesh, config: RenderConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let orbit = OrbitController::new(&config);

        Ok(Self {
            mesh,
            renderer: MeshRenderer::new(config),
            orbit,
            frame: FrameBuffer::new(width as usize, height.saturating_sub(STATUS_ROWS) as usize),
            presenter: AsciiPresenter::new(),
            spin: 0.0,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    /// Keep the model turning around Y by `radians` per frame.
    pub fn with_spin(mut self, radians: f32) -> Self {
        self.spin = radians;
        self
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        execute!(stdout(), cursor::Show, DisableMouseCapture, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Drain every pending event before drawing
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }
            if !self.running {
                break;
            }

            if self.spin != 0.0 {
                self.renderer.rotate(0.0, self.spin);
            }

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

        info!("Viewer closed");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                debug!("Terminal resized to {}x{}", width, height);
                self.frame
                    .resize(width as usize, height.saturating_sub(STATUS_ROWS) as usize);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, kind, .. }: KeyEvent) {
        if kind == KeyEventKind::Release {
            return;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Up => self.renderer.rotate(-KEY_ROTATION_STEP, 0.0),
            KeyCode::Down => self.renderer.rotate(KEY_ROTATION_STEP, 0.0),
            KeyCode::Left => self.renderer.rotate(0.0, -KEY_ROTATION_STEP),
            KeyCode::Right => self.renderer.rotate(0.0, KEY_ROTATION_STEP),
            code => {
                if let Some(action) = key_action(code) {
                    action.apply(&mut self.renderer);
                }
            }
        }
    }

    fn handle_mouse(&mut self, MouseEvent { kind, column, row, .. }: MouseEvent) {
        let (x, y) = (column as f32, row as f32);
        match kind {
            MouseEventKind::Down(MouseButton::Left) => self.orbit.mouse_down(x, y),
            MouseEventKind::Drag(MouseButton::Left) => {
                self.orbit.mouse_move(x, y, &mut self.renderer);
            }
            MouseEventKind::Up(MouseButton::Left) => self.orbit.mouse_up(),
            MouseEventKind::ScrollUp => self.orbit.wheel(WHEEL_NOTCH, &mut self.renderer),
            MouseEventKind::ScrollDown => self.orbit.wheel(-WHEEL_NOTCH, &mut self.renderer),
            _ => {}
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let mut stdout = stdout();

        // A failed frame is logged by the renderer; show the last good one
        let stats = self.renderer.render(&self.mesh, &mut self.frame);

        self.presenter.draw(&self.frame, STATUS_ROWS, &mut stdout)?;

        let camera = self.renderer.camera();
        let triangles = stats.map(|s| s.rasterized).unwrap_or(0);
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "meshview | FPS: {:.1} | tris: {} | zoom: {:.2} | Drag/Arrows=Rotate Wheel/+-=Zoom WASD=Pan R=Reset Q=Quit",
                self.fps, triangles, camera.zoom
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
