//! Pure overlay-to-expression renderers.
//!
//! None of these functions know about stage labels or input indices; the
//! compiler wraps their output in `[label]` brackets.

use super::types::{BoxOverlay, ColorKeyOverlay, ImageOverlay, OverlayCommon};

/// Name of the total-duration placeholder substituted after probing
pub const VIDEO_LENGTH_TOKEN: &str = "VIDEO_LENGTH";

/// Seconds rounded to milliseconds, without a trailing `.0`
pub fn format_seconds(seconds: f64) -> String {
    ((seconds * 1000.0).round() / 1000.0).to_string()
}

/// Placeholder standing for `total duration - offset_seconds`
pub fn duration_placeholder(offset_seconds: f64) -> String {
    if offset_seconds == 0.0 {
        format!("{{{}}}", VIDEO_LENGTH_TOKEN)
    } else {
        format!("{{{}-{}}}", VIDEO_LENGTH_TOKEN, offset_seconds)
    }
}

/// `drawbox=x=..:y=..:w=..:h=..:color='..'[:enable=..]`
///
/// Missing position or dimension fall back to ffmpeg's defaults; the
/// session refuses such boxes before they get here.
pub fn draw_box(common: &OverlayCommon, draw_box: &BoxOverlay) -> String {
    let mut options = Vec::with_capacity(6);

    if let Some(position) = common.position {
        options.push(format!("x={}", position.x()));
        options.push(format!("y={}", position.y()));
    }

    if let Some(dimension) = common.dimension {
        options.push(format!("w={}", dimension.width()));
        options.push(format!("h={}", dimension.height()));
    }

    if let Some(color) = draw_box.color() {
        options.push(format!("color='{}'", color));
    }

    if let Some(time_range) = common.time_range {
        options.push(time_range.enable_clause());
    }

    format!("drawbox={}", options.join(":"))
}

/// `colorkey=<name>@<opacity>:<similarity>:<blend>`
pub fn color_key(color_key: &ColorKeyOverlay) -> String {
    let color = color_key
        .color()
        .map(|color| color.with_alpha())
        .unwrap_or_default();

    format!(
        "colorkey={}:{}:{}",
        color,
        color_key.similarity_value(),
        color_key.blend_value()
    )
}

/// Filters applied to an image input before it is composited
///
/// Plain `scale=w:h`, or with fades
/// `format=yuva420p,scale=w:h,fade=t=in:...,fade=t=out:...` so the fade acts
/// on the alpha channel.
pub fn image_source(common: &OverlayCommon) -> String {
    let scale = match common.dimension {
        Some(dimension) => format!("scale={}", dimension),
        None => "scale=iw:ih".to_string(),
    };

    if !common.has_fade() {
        return scale;
    }

    let mut chain = vec!["format=yuva420p".to_string(), scale];

    if let Some(seconds) = common.fade_in_duration() {
        chain.push(format!("fade=t=in:st=0:d={}:alpha='1'", seconds));
    }

    if let Some(seconds) = common.fade_out_duration() {
        chain.push(format!(
            "fade=t=out:st={}:d={}:alpha='1'",
            fade_out_start(common, seconds),
            seconds
        ));
    }

    chain.join(",")
}

/// `overlay=<x:y>[:shortest='1'][:enable='between(t,..)']`
pub fn image_composite(common: &OverlayCommon, image: &ImageOverlay) -> String {
    let mut composite = match common.position {
        Some(position) => format!("overlay={}", position),
        None => "overlay=0:0".to_string(),
    };

    // Stop still pictures together with the main video
    if image.is_still_image() {
        composite.push_str(":shortest='1'");
    }

    if let Some(time_range) = common.time_range {
        composite.push(':');
        composite.push_str(&time_range.enable_clause());
    }

    composite
}

/// Start of the fade-out, or a placeholder when the end is not known yet
fn fade_out_start(common: &OverlayCommon, fade_out_seconds: f64) -> String {
    match common.time_range {
        Some(time_range) => format_seconds((time_range.end() - fade_out_seconds).max(0.0)),
        None => duration_placeholder(fade_out_seconds),
    }
}
