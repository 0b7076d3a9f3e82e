//! Playfield viewport.

use anyhow::Result;
use serde::Serialize;
use tracing::error;

use super::surface::{DragPayload, PlayfieldSurface};
use super::WidgetHandle;
use crate::constants::{VIEW_TITLE, VIEW_TITLE_INSPECTOR};
use crate::models::{DeviceRegistry, Point, SceneSize};

/// Application hooks the view calls when it closes.
pub trait ViewHost {
    /// Persists window and playfield settings.
    fn write_local_settings(&self) -> Result<()>;

    /// Lets the application decide whether closing this window quits.
    fn check_if_quit(&self);
}

/// Uniform scale plus centering offset mapping scene to viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewTransform {
    /// Scene units to viewport pixels
    pub scale: f64,
    /// Viewport position of the scene origin
    pub offset: Point,
}

impl ViewTransform {
    /// No scaling, no offset.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: Point::new(0.0, 0.0),
    };

    /// Largest transform that shows the whole scene inside the viewport
    /// without distorting it, centered on the spare axis.
    #[must_use]
    pub fn fit(scene: SceneSize, viewport: SceneSize) -> Self {
        if scene.width <= 0.0 || scene.height <= 0.0 {
            return Self::IDENTITY;
        }

        let scale = (viewport.width / scene.width).min(viewport.height / scene.height);
        let offset = Point::new(
            (viewport.width - scene.width * scale) / 2.0,
            (viewport.height - scene.height * scale) / 2.0,
        );
        Self { scale, offset }
    }

    /// Viewport point to scene point.
    #[must_use]
    pub fn map_to_scene(&self, viewport_pos: Point) -> Point {
        if self.scale == 0.0 {
            return viewport_pos;
        }
        Point::new(
            (viewport_pos.x - self.offset.x) / self.scale,
            (viewport_pos.y - self.offset.y) / self.scale,
        )
    }

    /// Scene point to viewport point.
    #[must_use]
    pub fn map_from_scene(&self, scene_pos: Point) -> Point {
        Point::new(
            scene_pos.x * self.scale + self.offset.x,
            scene_pos.y * self.scale + self.offset.y,
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Window showing the playfield surface.
pub struct PlayfieldView {
    surface: PlayfieldSurface,
    host: Box<dyn ViewHost>,
    title: String,
    viewport: SceneSize,
    transform: ViewTransform,
}

impl PlayfieldView {
    /// Creates a view with the plain title, mirroring the context's
    /// inspector flag.
    pub fn new(surface: PlayfieldSurface, host: impl ViewHost + 'static) -> Self {
        let mut view = Self {
            surface,
            host: Box::new(host),
            title: VIEW_TITLE.to_string(),
            viewport: SceneSize::default(),
            transform: ViewTransform::IDENTITY,
        };
        let inspect = view.surface.context().inspector_enabled();
        view.set_inspector_mode_title(inspect);
        view
    }

    /// The hosted surface.
    pub fn surface(&self) -> &PlayfieldSurface {
        &self.surface
    }

    /// Window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Current scene-to-viewport transform.
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Current viewport size.
    pub fn viewport(&self) -> SceneSize {
        self.viewport
    }

    /// Updates the title for inspector mode.
    pub fn set_inspector_mode_title(&mut self, inspect: bool) {
        self.title = if inspect {
            VIEW_TITLE_INSPECTOR
        } else {
            VIEW_TITLE
        }
        .to_string();
    }

    /// Turns inspector mode on or off and updates the title to match.
    pub fn set_inspector_enabled(&mut self, enabled: bool) {
        self.surface.context().set_inspector_enabled(enabled);
        self.set_inspector_mode_title(enabled);
    }

    /// Refits the whole playfield into the resized viewport.
    pub fn resize(&mut self, viewport: SceneSize) -> ViewTransform {
        self.viewport = viewport;
        self.transform = ViewTransform::fit(self.surface.scene_size(), viewport);
        self.transform
    }

    /// Drops a device at a viewport position.
    pub fn drop_at(
        &self,
        device_type: &str,
        device_name: &str,
        viewport_pos: Point,
        registry: &dyn DeviceRegistry,
    ) -> Result<Option<WidgetHandle>> {
        let payload = DragPayload::new(
            device_type,
            device_name,
            self.transform.map_to_scene(viewport_pos),
        );
        self.surface.drop(&payload, registry)
    }

    /// Window closed: persist settings, then let the application decide
    /// whether to quit. The quit check runs even if persisting failed.
    pub fn close(&self) -> Result<()> {
        let result = self.host.write_local_settings();
        if let Err(e) = &result {
            error!("failed to write local settings: {e:#}");
        }
        self.host.check_if_quit();
        result
    }
}
