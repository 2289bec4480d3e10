use emath::{Pos2, Rect, Vec2};

/// Axis-clamped Manhattan distance from `rect` to `point`.
///
/// Per axis: 0 if the point falls within the rectangle's extent on that
/// axis, else the distance to the nearer of the two edges. The total is the
/// sum of the two per-axis distances, so any point inside the rectangle
/// (edges inclusive) is at distance 0.
pub fn rect_distance(rect: Rect, point: Pos2) -> f32 {
    axis_distance(rect.left(), rect.right(), point.x)
        + axis_distance(rect.top(), rect.bottom(), point.y)
}

fn axis_distance(lo: f32, hi: f32, v: f32) -> f32 {
    if lo <= v && v <= hi {
        0.0
    } else {
        (lo - v).abs().min((hi - v).abs())
    }
}

/// Normalize a raw pointer sample into document coordinates.
///
/// Some event sources deliver page-relative coordinates directly; others
/// only deliver client (viewport-relative) coordinates, which need the
/// current scroll offset added. All engine entry points expect the result of
/// this normalization.
pub fn document_point(page: Option<Pos2>, client: Pos2, scroll: Vec2) -> Pos2 {
    page.unwrap_or(client + scroll)
}

#[cfg(test)]
mod tests {
    use emath::{pos2, vec2};

    use super::*;

    fn unit_rect() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(10.0, 10.0))
    }

    #[test]
    fn distance_is_zero_inside() {
        assert_eq!(rect_distance(unit_rect(), pos2(5.0, 5.0)), 0.0);
        // Edges count as inside.
        assert_eq!(rect_distance(unit_rect(), pos2(0.0, 0.0)), 0.0);
        assert_eq!(rect_distance(unit_rect(), pos2(10.0, 10.0)), 0.0);
    }

    #[test]
    fn distance_clamps_per_axis() {
        // Outside on one axis only: that axis' edge distance.
        assert_eq!(rect_distance(unit_rect(), pos2(15.0, 5.0)), 5.0);
        // Outside on both axes: the distances add up.
        assert_eq!(rect_distance(unit_rect(), pos2(15.0, 15.0)), 10.0);
        // Nearer edge wins on each axis.
        assert_eq!(rect_distance(unit_rect(), pos2(-3.0, 4.0)), 3.0);
    }

    #[test]
    fn document_point_prefers_page_coordinates() {
        let page = pos2(120.0, 40.0);
        assert_eq!(
            document_point(Some(page), pos2(20.0, 10.0), vec2(100.0, 30.0)),
            page
        );
    }

    #[test]
    fn document_point_falls_back_to_client_plus_scroll() {
        assert_eq!(
            document_point(None, pos2(20.0, 10.0), vec2(100.0, 30.0)),
            pos2(120.0, 40.0)
        );
    }
}
