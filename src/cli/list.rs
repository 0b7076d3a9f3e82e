//! List placed widgets.

use crate::cli::common::{parse_dimensions, CliError, CliResult, GlobalOptions, Session};
use crate::models::{Point, SceneSize};
use crate::playfield::{effective_shape, PlayfieldView};
use clap::Args;
use serde::Serialize;

/// List every widget placed on the playfield
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Also report positions inside a viewport of this size (e.g. 800x600)
    #[arg(long, value_name = "WxH", value_parser = parse_dimensions)]
    pub viewport: Option<(f64, f64)>,
}

/// One placed widget
#[derive(Debug, Serialize)]
struct ListedWidget {
    device_type: String,
    name: String,
    position: Point,
    shape: String,
    rotation: i32,
    size: f64,
    device_size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    viewport_position: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ListArgs {
    /// Execute the list command
    pub fn execute(&self, options: &GlobalOptions) -> CliResult<()> {
        let session = Session::open(options)?;
        let mut view = session.into_view();
        if let Some((width, height)) = self.viewport {
            view.resize(SceneSize::new(width, height));
        }

        let widgets = collect(&view, self.viewport.is_some());

        if self.json {
            let json = serde_json::to_string_pretty(&widgets)
                .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
            println!("{json}");
        } else {
            output_human_readable(&widgets);
        }

        Ok(())
    }
}

fn collect(view: &PlayfieldView, with_viewport: bool) -> Vec<ListedWidget> {
    let transform = view.transform();
    let scene = view.surface().scene().borrow();

    scene
        .widgets()
        .map(|widget| {
            let widget = widget.borrow();
            let (shape, error) = match effective_shape(widget.shape(), widget.device_type())
                .and_then(|shape| widget.colored_brush().map(|_| shape))
            {
                Ok(shape) => (shape.name().to_string(), None),
                Err(e) => (widget.shape().name().to_string(), Some(e.to_string())),
            };

            ListedWidget {
                device_type: widget.device_type().to_string(),
                name: widget.name().to_string(),
                position: widget.position(),
                shape,
                rotation: widget.rotation(),
                size: widget.size(),
                device_size: widget.device_size(),
                viewport_position: with_viewport.then(|| transform.map_from_scene(widget.position())),
                error,
            }
        })
        .collect()
}

fn output_human_readable(widgets: &[ListedWidget]) {
    if widgets.is_empty() {
        println!("No widgets placed.");
        return;
    }

    println!("Placed widgets ({}):", widgets.len());
    for widget in widgets {
        print!(
            "  {}: {} at ({:.1}, {:.1}) {} rot {} size {:.3}",
            widget.device_type,
            widget.name,
            widget.position.x,
            widget.position.y,
            widget.shape,
            widget.rotation,
            widget.size
        );
        if let Some(pos) = widget.viewport_position {
            print!(" viewport ({:.1}, {:.1})", pos.x, pos.y);
        }
        if let Some(error) = &widget.error {
            print!(" [{error}]");
        }
        println!();
    }
}
