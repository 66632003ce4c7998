//! Substitution of the `{VIDEO_LENGTH}` / `{VIDEO_LENGTH-<offset>}` tokens
//! left in a graph by fade-outs whose end time was unknown at render time.

use crate::overlay::{format_seconds, VIDEO_LENGTH_TOKEN};

fn token_prefix() -> String {
    format!("{{{}", VIDEO_LENGTH_TOKEN)
}

/// Offset encoded in the body of a token: `""` is 0, `"-2.5"` is 2.5
fn parse_offset(body: &str) -> Option<f64> {
    if body.is_empty() {
        return Some(0.0);
    }

    body.strip_prefix('-')?
        .parse::<f64>()
        .ok()
        .filter(|offset| offset.is_finite() && *offset >= 0.0)
}

/// First duration placeholder in the graph, if any
pub fn find_placeholder(graph: &str) -> Option<&str> {
    let prefix = token_prefix();
    let mut from = 0;

    while let Some(found) = graph[from..].find(&prefix) {
        let start = from + found;
        let body_start = start + prefix.len();
        let end = graph[body_start..].find('}').map(|close| body_start + close)?;

        if parse_offset(&graph[body_start..end]).is_some() {
            return Some(&graph[start..=end]);
        }
        from = body_start;
    }

    None
}

/// Replace every placeholder with `duration - offset`, floored at zero
///
/// Text that merely looks like the token prefix is copied through unchanged.
pub fn resolve_duration_placeholders(graph: &str, duration_seconds: f64) -> String {
    let prefix = token_prefix();
    let mut resolved = String::with_capacity(graph.len());
    let mut rest = graph;

    while let Some(start) = rest.find(&prefix) {
        resolved.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let body_start = prefix.len();

        let substitution = candidate[body_start..].find('}').and_then(|close| {
            let end = body_start + close;
            parse_offset(&candidate[body_start..end]).map(|offset| (offset, end))
        });

        match substitution {
            Some((offset, end)) => {
                resolved.push_str(&format_seconds((duration_seconds - offset).max(0.0)));
                rest = &candidate[end + 1..];
            }
            None => {
                resolved.push_str(&prefix);
                rest = &candidate[body_start..];
            }
        }
    }

    resolved.push_str(rest);
    resolved
}
